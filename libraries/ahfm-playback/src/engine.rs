//! Player engine abstraction
//!
//! The engine does the actual stream decoding and output. The controller only
//! depends on this minimal contract, so any media library (or a test double)
//! can sit behind it.

use crate::controller::{PlaybackController, Shared};
use crate::error::EngineError;
use std::sync::Weak;

/// External player engine
///
/// Exclusively owned by [`PlaybackController`]; nothing else may call it.
/// Implementations report the outcome of [`prepare_async`](Self::prepare_async)
/// later, from their own execution context, through the [`EngineNotifier`]
/// they were built with. They must not call the notifier from inside a
/// `PlayerEngine` method: the controller holds its state lock during those
/// calls.
pub trait PlayerEngine: Send {
    /// Bind the engine to a stream address
    fn set_source(&mut self, address: &str) -> Result<(), EngineError>;

    /// Begin buffering without blocking
    ///
    /// `Ok` only means the request was accepted; readiness arrives later via
    /// [`EngineNotifier::prepared`].
    fn prepare_async(&mut self) -> Result<(), EngineError>;

    /// Begin audible playback
    fn start(&mut self) -> Result<(), EngineError>;

    /// Halt playback
    fn stop(&mut self) -> Result<(), EngineError>;

    /// Drop the current source binding
    fn reset(&mut self);

    /// Free the underlying resources. Called exactly once.
    fn release(&mut self);
}

/// Callback handle given to the engine at construction
///
/// Holds only a weak reference: signals arriving after the controller is
/// gone are dropped.
#[derive(Clone)]
pub struct EngineNotifier {
    shared: Weak<Shared>,
}

impl EngineNotifier {
    pub(crate) fn new(shared: Weak<Shared>) -> Self {
        Self { shared }
    }

    /// Buffering finished; playback can start
    pub fn prepared(&self) {
        match self.shared.upgrade() {
            Some(shared) => PlaybackController::from_shared(shared).engine_prepared(),
            None => tracing::debug!("Engine ready signal after teardown, ignored"),
        }
    }

    /// The engine failed asynchronously (stream unreachable, decoder error, ...)
    pub fn failed(&self, message: impl Into<String>) {
        let message = message.into();
        match self.shared.upgrade() {
            Some(shared) => PlaybackController::from_shared(shared).engine_failed(message),
            None => tracing::debug!("Engine failure after teardown, ignored: {}", message),
        }
    }
}

impl std::fmt::Debug for EngineNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineNotifier")
            .field("attached", &(self.shared.strong_count() > 0))
            .finish()
    }
}
