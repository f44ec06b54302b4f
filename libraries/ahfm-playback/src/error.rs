//! Error types for the playback lifecycle

use crate::types::{Operation, PlaybackStatus};
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The operation is not legal from the current status.
    ///
    /// Always a caller bug or a stale-state race. Recoverable: nothing changed.
    #[error("Cannot {operation} from the current state: {from}")]
    InvalidTransition {
        /// Status at the time of the call
        from: PlaybackStatus,
        /// Operation that was attempted
        operation: Operation,
    },

    /// The player engine rejected a request
    #[error("Engine failed during {operation}: {source}")]
    Engine {
        operation: Operation,
        #[source]
        source: EngineError,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlaybackError {
    /// True for errors the caller can ignore or surface without further action
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, PlaybackError::InvalidTransition { .. })
    }
}

/// Errors reported by a [`PlayerEngine`](crate::PlayerEngine) implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The stream endpoint could not be reached
    #[error("Stream unreachable: {0}")]
    Unreachable(String),

    /// The engine refused the request in its current state
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// The engine handle was already released
    #[error("Engine already released")]
    Released,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_names_state_and_operation() {
        let err = PlaybackError::InvalidTransition {
            from: PlaybackStatus::Preparing,
            operation: Operation::Stop,
        };

        assert_eq!(err.to_string(), "Cannot stop from the current state: Preparing");
        assert!(err.is_invalid_transition());
    }

    #[test]
    fn engine_error_keeps_source() {
        let err = PlaybackError::Engine {
            operation: Operation::Start,
            source: EngineError::Rejected("decoder busy".to_string()),
        };

        assert!(!err.is_invalid_transition());
        assert_eq!(
            err.to_string(),
            "Engine failed during start: Request rejected: decoder busy"
        );
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("Request rejected: decoder busy"));
    }
}
