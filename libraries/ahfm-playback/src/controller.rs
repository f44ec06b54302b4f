//! Playback lifecycle state machine
//!
//! [`PlaybackController`] owns the backend status and the player engine. Every
//! status change goes through [`Shared::transition`], which validates against
//! the transition table, updates the status, queues the status-change event
//! and queues a presentation re-evaluation, in that order.
//!
//! # Delivery
//!
//! Queued events and presentation effects are delivered outside the state
//! lock by a single dispatching thread, in queue order:
//!
//! - the thread that queued them delivers them before its call returns;
//! - a call made from another thread while a delivery is running blocks until
//!   its own events have been delivered;
//! - a call made from inside an observer (the dispatching thread itself)
//!   applies its transition immediately and returns; its event is delivered
//!   once the current event has reached every observer, so all observers see
//!   transitions in the same order.
//!
//! An observer reading [`PlaybackController::status`] sees the newest status,
//! which is ahead of the event it is handling when an earlier observer made a
//! re-entrant call.

use crate::config::PlaybackConfig;
use crate::engine::{EngineNotifier, PlayerEngine};
use crate::error::{EngineError, PlaybackError, Result};
use crate::observer::{ObserverRegistry, SubscriptionId};
use crate::presentation::{PresentationCoordinator, PresentationEffect, PresentationSink};
use crate::types::{EngineFailure, Operation, PlaybackEvent, PlaybackStatus, StatusChangeEvent};
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};
use tracing::{debug, error, info, warn};

enum Outgoing {
    Event {
        event: PlaybackEvent,
        /// Only observers subscribed before this id receive the event
        watermark: SubscriptionId,
    },
    Present(PresentationEffect),
}

struct Core {
    status: PlaybackStatus,
    foreground: bool,
    engine: Option<Box<dyn PlayerEngine>>,
    observers: ObserverRegistry,

    outbox: VecDeque<(u64, Outgoing)>,
    /// Sequence number of the last queued item
    queued: u64,
    /// Sequence number of the last delivered item
    delivered: u64,
    dispatcher: Option<ThreadId>,
    /// Observer currently being called by the dispatcher
    in_flight: Option<SubscriptionId>,
}

impl Core {
    fn new(engine: Box<dyn PlayerEngine>) -> Self {
        Self {
            status: PlaybackStatus::Idle,
            foreground: false,
            engine: Some(engine),
            observers: ObserverRegistry::new(),
            outbox: VecDeque::new(),
            queued: 0,
            delivered: 0,
            dispatcher: None,
            in_flight: None,
        }
    }

    fn check(&self, operation: Operation) -> Result<PlaybackStatus> {
        self.status
            .after(operation)
            .ok_or(PlaybackError::InvalidTransition {
                from: self.status,
                operation,
            })
    }

    fn engine_mut(&mut self, operation: Operation) -> Result<&mut Box<dyn PlayerEngine>> {
        self.engine.as_mut().ok_or(PlaybackError::Engine {
            operation,
            source: EngineError::Released,
        })
    }

    fn queue(&mut self, item: Outgoing) {
        self.queued += 1;
        self.outbox.push_back((self.queued, item));
    }

    fn emit(&mut self, event: PlaybackEvent) {
        let watermark = self.observers.watermark();
        self.queue(Outgoing::Event { event, watermark });
    }
}

pub(crate) struct Shared {
    core: Mutex<Core>,
    delivery: Condvar,
    presentation: PresentationCoordinator,
    sink: Arc<dyn PresentationSink>,
    stream_address: String,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, core: MutexGuard<'a, Core>) -> MutexGuard<'a, Core> {
        self.delivery
            .wait(core)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate, mutate and queue the side effects of one transition
    fn transition(&self, core: &mut Core, operation: Operation) -> Result<StatusChangeEvent> {
        let new = core.check(operation)?;
        let change = StatusChangeEvent::new(core.status, new);
        core.status = new;

        debug!("Playback status {} -> {} ({})", change.old, change.new, operation);
        core.emit(PlaybackEvent::StatusChanged(change));
        self.present(core);
        Ok(change)
    }

    fn present(&self, core: &mut Core) {
        let effect = self.presentation.evaluate(core.status, core.foreground);
        core.queue(Outgoing::Present(effect));
    }

    fn report_failure(&self, core: &mut Core, operation: Operation, message: String) {
        error!("Engine failed during {}: {}", operation, message);
        core.emit(PlaybackEvent::EngineFailed(EngineFailure { operation, message }));
    }

    /// Reset the engine and bind it to the stream again so `prepare()` works
    fn rebind(&self, core: &mut Core, operation: Operation) {
        let Some(engine) = core.engine.as_deref_mut() else {
            return;
        };
        engine.reset();
        if let Err(e) = engine.set_source(&self.stream_address) {
            self.report_failure(core, operation, e.to_string());
        }
    }

    /// Deliver everything queued up to `ticket`
    fn deliver(&self, ticket: u64) {
        let me = thread::current().id();
        let mut core = self.lock();
        loop {
            if core.delivered >= ticket {
                return;
            }
            match core.dispatcher {
                Some(owner) if owner == me => return,
                Some(_) => core = self.wait(core),
                None => break,
            }
        }

        core.dispatcher = Some(me);
        let mut guard = Dispatching {
            shared: self,
            current: core.delivered,
        };

        loop {
            let Some((seq, item)) = core.outbox.pop_front() else {
                break;
            };
            guard.current = seq;
            match item {
                Outgoing::Event { event, watermark } => {
                    let targets = core.observers.snapshot(watermark);
                    for (id, observer) in targets {
                        if !core.observers.contains(id) {
                            continue;
                        }
                        core.in_flight = Some(id);
                        drop(core);
                        observer(&event);
                        core = self.lock();
                        core.in_flight = None;
                        self.delivery.notify_all();
                    }
                }
                Outgoing::Present(effect) => {
                    drop(core);
                    self.sink.apply(&effect);
                    core = self.lock();
                }
            }
            core.delivered = seq;
            self.delivery.notify_all();
        }

        core.dispatcher = None;
        drop(core);
    }
}

/// Releases the dispatcher role, also when an observer panics
struct Dispatching<'a> {
    shared: &'a Shared,
    current: u64,
}

impl Drop for Dispatching<'_> {
    fn drop(&mut self) {
        let mut core = self.shared.lock();
        if core.dispatcher == Some(thread::current().id()) {
            core.dispatcher = None;
        }
        core.delivered = core.delivered.max(self.current);
        core.in_flight = None;
        self.shared.delivery.notify_all();
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let core = self.core.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(mut engine) = core.engine.take() {
            engine.release();
            info!("Player engine released on drop");
        }
    }
}

/// Playback lifecycle controller
///
/// Created once per host lifetime. Cloning gives another handle to the same
/// controller. Public transitions should be issued from one control context;
/// the engine's callbacks may arrive from any thread.
///
/// # Example
///
/// ```rust
/// use ahfm_playback::{
///     EngineError, NullPresentationSink, PlaybackConfig, PlaybackController, PlaybackStatus,
///     PlayerEngine,
/// };
/// use std::sync::Arc;
///
/// struct SilentEngine;
///
/// impl PlayerEngine for SilentEngine {
///     fn set_source(&mut self, _address: &str) -> Result<(), EngineError> { Ok(()) }
///     fn prepare_async(&mut self) -> Result<(), EngineError> { Ok(()) }
///     fn start(&mut self) -> Result<(), EngineError> { Ok(()) }
///     fn stop(&mut self) -> Result<(), EngineError> { Ok(()) }
///     fn reset(&mut self) {}
///     fn release(&mut self) {}
/// }
///
/// let mut notifier = None;
/// let controller = PlaybackController::new(
///     &PlaybackConfig::default(),
///     Arc::new(NullPresentationSink),
///     |n| {
///         notifier = Some(n);
///         Box::new(SilentEngine)
///     },
/// )
/// .unwrap();
///
/// controller.prepare().unwrap();
/// notifier.unwrap().prepared();
/// controller.start().unwrap();
/// assert_eq!(controller.status(), PlaybackStatus::Started);
/// ```
#[derive(Clone)]
pub struct PlaybackController {
    shared: Arc<Shared>,
}

/// Non-owning controller handle, for observers that call back into it
#[derive(Clone)]
pub struct WeakPlaybackController {
    shared: Weak<Shared>,
}

impl WeakPlaybackController {
    pub fn upgrade(&self) -> Option<PlaybackController> {
        self.shared.upgrade().map(PlaybackController::from_shared)
    }
}

impl PlaybackController {
    /// Create the controller and bind the engine to the configured stream
    ///
    /// `build_engine` receives the notifier the engine must use to report
    /// readiness and failures.
    pub fn new<F>(
        config: &PlaybackConfig,
        sink: Arc<dyn PresentationSink>,
        build_engine: F,
    ) -> Result<Self>
    where
        F: FnOnce(EngineNotifier) -> Box<dyn PlayerEngine>,
    {
        config.validate()?;

        let shared = Arc::new_cyclic(|weak| {
            let engine = build_engine(EngineNotifier::new(weak.clone()));
            Shared {
                core: Mutex::new(Core::new(engine)),
                delivery: Condvar::new(),
                presentation: PresentationCoordinator::new(config.notification.clone()),
                sink,
                stream_address: config.stream_address.clone(),
            }
        });

        {
            let mut core = shared.lock();
            core.engine_mut(Operation::Prepare)?
                .set_source(&shared.stream_address)
                .map_err(|source| PlaybackError::Engine {
                    operation: Operation::Prepare,
                    source,
                })?;
        }

        info!("Playback controller ready for {}", shared.stream_address);
        Ok(Self { shared })
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    pub fn downgrade(&self) -> WeakPlaybackController {
        WeakPlaybackController {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Run `f` under the state lock, then deliver what it queued
    fn with_core<T>(&self, f: impl FnOnce(&Shared, &mut Core) -> T) -> T {
        let (result, ticket) = {
            let mut core = self.shared.lock();
            let result = f(&self.shared, &mut core);
            (result, core.queued)
        };
        self.shared.deliver(ticket);
        result
    }

    // ===== Transitions =====

    /// Ask the engine to start buffering: `Idle | Stopped -> Preparing`
    ///
    /// Returns as soon as the engine accepted the request. `Prepared` follows
    /// when the engine calls [`EngineNotifier::prepared`].
    pub fn prepare(&self) -> Result<()> {
        self.with_core(|shared, core| {
            core.check(Operation::Prepare)?;
            match core.engine_mut(Operation::Prepare)?.prepare_async() {
                Ok(()) => {
                    shared.transition(core, Operation::Prepare)?;
                    Ok(())
                }
                Err(source) => {
                    shared.report_failure(core, Operation::Prepare, source.to_string());
                    shared.rebind(core, Operation::Prepare);
                    Err(PlaybackError::Engine {
                        operation: Operation::Prepare,
                        source,
                    })
                }
            }
        })
    }

    /// Begin audible playback: `Prepared -> Started`
    ///
    /// If the engine refuses, it is reset and the status falls back to
    /// `Stopped` so the caller can prepare again.
    pub fn start(&self) -> Result<()> {
        self.with_core(|shared, core| {
            core.check(Operation::Start)?;
            if let Err(source) = core.engine_mut(Operation::Start)?.start() {
                shared.report_failure(core, Operation::Start, source.to_string());
                shared.rebind(core, Operation::Start);
                shared.transition(core, Operation::EngineFailed)?;
                return Err(PlaybackError::Engine {
                    operation: Operation::Start,
                    source,
                });
            }
            shared.transition(core, Operation::Start)?;
            Ok(())
        })
    }

    /// Halt playback: `Started -> Stopped`
    ///
    /// The engine is stopped, reset and bound to the stream again before the
    /// status changes. An engine error while halting is reported to observers
    /// but the stop still completes.
    pub fn stop(&self) -> Result<()> {
        self.with_core(|shared, core| {
            core.check(Operation::Stop)?;
            if let Err(e) = core.engine_mut(Operation::Stop)?.stop() {
                warn!("Engine did not halt cleanly: {}", e);
                shared.report_failure(core, Operation::Stop, e.to_string());
            }
            shared.rebind(core, Operation::Stop);
            shared.transition(core, Operation::Stop)?;
            Ok(())
        })
    }

    pub(crate) fn engine_prepared(&self) {
        let outcome = self.with_core(|shared, core| {
            if core.status != PlaybackStatus::Preparing {
                debug!("Ignoring stale engine ready signal in {}", core.status);
                return Ok(());
            }
            shared.transition(core, Operation::EngineReady).map(|_| ())
        });
        if let Err(e) = outcome {
            warn!("Engine ready signal rejected: {}", e);
        }
    }

    pub(crate) fn engine_failed(&self, message: String) {
        let outcome = self.with_core(|shared, core| {
            if core.status.after(Operation::EngineFailed).is_none() {
                debug!("Ignoring engine failure in {}: {}", core.status, message);
                return Ok(());
            }
            let operation = match core.status {
                PlaybackStatus::Started => Operation::Start,
                _ => Operation::Prepare,
            };
            shared.report_failure(core, operation, message);
            shared.rebind(core, operation);
            shared.transition(core, Operation::EngineFailed).map(|_| ())
        });
        if let Err(e) = outcome {
            warn!("Engine failure signal rejected: {}", e);
        }
    }

    // ===== Foreground =====

    /// Record whether the user-facing surface is visible and re-evaluate the
    /// notification
    pub fn set_foreground(&self, foreground: bool) {
        self.with_core(|shared, core| {
            core.foreground = foreground;
            debug!("Foreground set to {}", foreground);
            shared.present(core);
        });
    }

    pub fn is_foreground(&self) -> bool {
        self.shared.lock().foreground
    }

    // ===== Observers =====

    /// Register an observer for every future event
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&PlaybackEvent) + Send + Sync + 'static,
    {
        self.shared.lock().observers.add(Arc::new(observer))
    }

    /// Remove an observer
    ///
    /// Once this returns the observer is not called again. If another thread
    /// is calling it right now, this waits for that call to finish.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let me = thread::current().id();
        let mut core = self.shared.lock();
        let removed = core.observers.remove(id);
        while core.in_flight == Some(id) && core.dispatcher != Some(me) {
            core = self.shared.wait(core);
        }
        removed
    }

    pub fn observer_count(&self) -> usize {
        self.shared.lock().observers.len()
    }

    // ===== Lifecycle =====

    /// Release the engine and move to `Destroyed`
    ///
    /// Safe to call any number of times; only the first call releases.
    pub fn teardown(&self) {
        self.with_core(|shared, core| {
            let Some(mut engine) = core.engine.take() else {
                debug!("Teardown requested again, nothing to release");
                return;
            };
            engine.release();
            info!("Player engine released");

            let change = StatusChangeEvent::new(core.status, PlaybackStatus::Destroyed);
            core.status = PlaybackStatus::Destroyed;
            core.emit(PlaybackEvent::StatusChanged(change));
            shared.present(core);
        });
    }

    // ===== Accessors =====

    /// Current status
    ///
    /// Inside an observer this can already be past the event being delivered:
    /// with [`AutoStartPolicy`](crate::AutoStartPolicy) installed, observers
    /// after it receive `Preparing -> Prepared` while this returns `Started`.
    pub fn status(&self) -> PlaybackStatus {
        self.shared.lock().status
    }

    pub fn stream_address(&self) -> &str {
        &self.shared.stream_address
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("status", &self.status())
            .field("stream_address", &self.shared.stream_address)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::NullPresentationSink;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEngine {
        releases: Arc<AtomicUsize>,
    }

    impl PlayerEngine for CountingEngine {
        fn set_source(&mut self, _address: &str) -> std::result::Result<(), EngineError> {
            Ok(())
        }
        fn prepare_async(&mut self) -> std::result::Result<(), EngineError> {
            Ok(())
        }
        fn start(&mut self) -> std::result::Result<(), EngineError> {
            Ok(())
        }
        fn stop(&mut self) -> std::result::Result<(), EngineError> {
            Ok(())
        }
        fn reset(&mut self) {}
        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn controller(releases: &Arc<AtomicUsize>) -> (PlaybackController, EngineNotifier) {
        let mut notifier = None;
        let releases = Arc::clone(releases);
        let controller = PlaybackController::new(
            &PlaybackConfig::default(),
            Arc::new(NullPresentationSink),
            |n| {
                notifier = Some(n);
                Box::new(CountingEngine { releases })
            },
        )
        .unwrap();
        (controller, notifier.unwrap())
    }

    #[test]
    fn drop_releases_engine_once() {
        let releases = Arc::new(AtomicUsize::new(0));
        let (controller, _notifier) = controller(&releases);
        let clone = controller.clone();

        drop(controller);
        assert_eq!(releases.load(Ordering::SeqCst), 0);

        drop(clone);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn teardown_then_drop_releases_once() {
        let releases = Arc::new(AtomicUsize::new(0));
        let (controller, _notifier) = controller(&releases);

        controller.teardown();
        controller.teardown();
        drop(controller);

        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn notifier_outliving_controller_is_harmless() {
        let releases = Arc::new(AtomicUsize::new(0));
        let (controller, notifier) = controller(&releases);
        let weak = controller.downgrade();

        drop(controller);
        notifier.prepared();
        notifier.failed("late");

        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn stale_ready_signal_is_ignored() {
        let releases = Arc::new(AtomicUsize::new(0));
        let (controller, notifier) = controller(&releases);

        notifier.prepared();
        assert_eq!(controller.status(), PlaybackStatus::Idle);

        controller.prepare().unwrap();
        notifier.prepared();
        notifier.prepared();
        assert_eq!(controller.status(), PlaybackStatus::Prepared);
    }

    #[test]
    fn invalid_config_is_rejected_before_engine_is_built() {
        let mut built = false;
        let config = PlaybackConfig {
            stream_address: "mailto:radio@ah.fm".to_string(),
            ..Default::default()
        };

        let result = PlaybackController::new(&config, Arc::new(NullPresentationSink), |_| {
            built = true;
            Box::new(CountingEngine {
                releases: Arc::new(AtomicUsize::new(0)),
            })
        });

        assert!(matches!(result, Err(PlaybackError::Config(_))));
        assert!(!built);
    }
}
