//! Simulated stream engine
//!
//! Stands in for a real media player: buffering is a timer on a worker
//! thread, playback is a flag.

use crate::config::EngineSettings;
use ahfm_playback::{EngineError, EngineNotifier, PlayerEngine};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

pub struct SimulatedEngine {
    notifier: EngineNotifier,
    settings: EngineSettings,
    source: Option<String>,
    playing: bool,
    /// Bumped by `reset`; a worker whose generation is stale stays silent
    generation: Arc<AtomicU64>,
    released: bool,
}

impl SimulatedEngine {
    pub fn new(notifier: EngineNotifier, settings: EngineSettings) -> Self {
        Self {
            notifier,
            settings,
            source: None,
            playing: false,
            generation: Arc::new(AtomicU64::new(0)),
            released: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn ensure_alive(&self) -> Result<(), EngineError> {
        if self.released {
            Err(EngineError::Released)
        } else {
            Ok(())
        }
    }
}

impl PlayerEngine for SimulatedEngine {
    fn set_source(&mut self, address: &str) -> Result<(), EngineError> {
        self.ensure_alive()?;
        debug!("Source bound to {}", address);
        self.source = Some(address.to_string());
        Ok(())
    }

    fn prepare_async(&mut self) -> Result<(), EngineError> {
        self.ensure_alive()?;
        let Some(source) = self.source.clone() else {
            return Err(EngineError::Rejected("no source bound".to_string()));
        };

        let notifier = self.notifier.clone();
        let generation = Arc::clone(&self.generation);
        let started_at = generation.load(Ordering::SeqCst);
        let delay = Duration::from_millis(self.settings.prepare_delay_ms);
        let fail = self.settings.fail_prepare;

        thread::spawn(move || {
            thread::sleep(delay);
            if generation.load(Ordering::SeqCst) != started_at {
                debug!("Preparation of {} abandoned", source);
                return;
            }
            if fail {
                notifier.failed(format!("{} unreachable", source));
            } else {
                notifier.prepared();
            }
        });
        Ok(())
    }

    fn start(&mut self) -> Result<(), EngineError> {
        self.ensure_alive()?;
        self.playing = true;
        info!("Playing {}", self.source.as_deref().unwrap_or("<unbound>"));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        self.ensure_alive()?;
        self.playing = false;
        Ok(())
    }

    fn reset(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.source = None;
        self.playing = false;
    }

    fn release(&mut self) {
        self.reset();
        self.released = true;
        debug!("Engine released");
    }
}
