//! Shared test doubles for the integration tests

#![allow(dead_code)]

use ahfm_playback::{
    EngineError, EngineNotifier, PlaybackConfig, PlaybackController, PlaybackEvent,
    PlaybackStatus, PlayerEngine, PresentationEffect, PresentationSink,
};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Engine calls, in the order they were made
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    SetSource(String),
    PrepareAsync,
    Start,
    Stop,
    Reset,
    Release,
}

/// Which engine methods should fail
#[derive(Debug, Default)]
pub struct Faults {
    pub failing: HashSet<&'static str>,
}

/// Fake engine recording every call
pub struct RecordingEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    faults: Arc<Mutex<Faults>>,
}

impl RecordingEngine {
    fn fail_if(&self, name: &'static str) -> Result<(), EngineError> {
        if self.faults.lock().unwrap().failing.contains(name) {
            Err(EngineError::Rejected(format!("{name} refused")))
        } else {
            Ok(())
        }
    }
}

impl PlayerEngine for RecordingEngine {
    fn set_source(&mut self, address: &str) -> Result<(), EngineError> {
        self.calls
            .lock()
            .unwrap()
            .push(EngineCall::SetSource(address.to_string()));
        self.fail_if("set_source")
    }

    fn prepare_async(&mut self) -> Result<(), EngineError> {
        self.calls.lock().unwrap().push(EngineCall::PrepareAsync);
        self.fail_if("prepare_async")
    }

    fn start(&mut self) -> Result<(), EngineError> {
        self.calls.lock().unwrap().push(EngineCall::Start);
        self.fail_if("start")
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.calls.lock().unwrap().push(EngineCall::Stop);
        self.fail_if("stop")
    }

    fn reset(&mut self) {
        self.calls.lock().unwrap().push(EngineCall::Reset);
    }

    fn release(&mut self) {
        self.calls.lock().unwrap().push(EngineCall::Release);
    }
}

/// Sink recording every presentation effect
#[derive(Default)]
pub struct RecordingSink {
    effects: Mutex<Vec<PresentationEffect>>,
}

impl RecordingSink {
    pub fn effects(&self) -> Vec<PresentationEffect> {
        self.effects.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<PresentationEffect> {
        self.effects.lock().unwrap().last().cloned()
    }

    pub fn clear(&self) {
        self.effects.lock().unwrap().clear();
    }
}

impl PresentationSink for RecordingSink {
    fn apply(&self, effect: &PresentationEffect) {
        self.effects.lock().unwrap().push(effect.clone());
    }
}

/// Controller wired to recording doubles
pub struct Harness {
    pub controller: PlaybackController,
    pub notifier: EngineNotifier,
    pub sink: Arc<RecordingSink>,
    calls: Arc<Mutex<Vec<EngineCall>>>,
    faults: Arc<Mutex<Faults>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(&PlaybackConfig::default())
    }

    pub fn with_config(config: &PlaybackConfig) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let faults = Arc::new(Mutex::new(Faults::default()));
        let sink = Arc::new(RecordingSink::default());

        let mut notifier = None;
        let engine = RecordingEngine {
            calls: Arc::clone(&calls),
            faults: Arc::clone(&faults),
        };
        let controller = PlaybackController::new(config, sink.clone(), |n| {
            notifier = Some(n);
            Box::new(engine)
        })
        .expect("controller");

        Self {
            controller,
            notifier: notifier.expect("notifier handed to engine"),
            sink,
            calls,
            faults,
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn fail(&self, method: &'static str) {
        self.faults.lock().unwrap().failing.insert(method);
    }

    pub fn heal(&self, method: &'static str) {
        self.faults.lock().unwrap().failing.remove(method);
    }

    /// Record every event into a shared list
    pub fn record_events(&self) -> Arc<Mutex<Vec<PlaybackEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        self.controller
            .subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    /// Drive the controller to `Started` through the public API
    pub fn play(&self) {
        self.controller.prepare().expect("prepare");
        self.notifier.prepared();
        self.controller.start().expect("start");
        assert_eq!(self.controller.status(), PlaybackStatus::Started);
    }
}

/// Status changes only, as `(old, new)` pairs
pub fn transitions(events: &[PlaybackEvent]) -> Vec<(PlaybackStatus, PlaybackStatus)> {
    events
        .iter()
        .filter_map(|event| event.status_change())
        .map(|change| (change.old, change.new))
        .collect()
}
