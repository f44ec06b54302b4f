//! Core types for the playback lifecycle

use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend playback status
///
/// The single source of truth for what the player engine is doing.
/// Only [`PlaybackController`](crate::PlaybackController) transitions change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// Nothing requested yet
    Idle,

    /// Engine is buffering the stream
    Preparing,

    /// Engine is ready to play
    Prepared,

    /// Audible playback
    Started,

    /// Playback halted, engine re-bound to the stream
    Stopped,

    /// Controller torn down, engine released
    Destroyed,
}

impl PlaybackStatus {
    /// All status values, in declaration order
    pub const ALL: [PlaybackStatus; 6] = [
        PlaybackStatus::Idle,
        PlaybackStatus::Preparing,
        PlaybackStatus::Prepared,
        PlaybackStatus::Started,
        PlaybackStatus::Stopped,
        PlaybackStatus::Destroyed,
    ];

    /// Status reached by applying `operation` from `self`
    ///
    /// Returns `None` when the transition table has no entry, which callers
    /// report as [`PlaybackError::InvalidTransition`](crate::PlaybackError).
    pub fn after(self, operation: Operation) -> Option<PlaybackStatus> {
        use Operation as Op;
        use PlaybackStatus as S;

        match (self, operation) {
            (S::Idle | S::Stopped, Op::Prepare) => Some(S::Preparing),
            (S::Preparing, Op::EngineReady) => Some(S::Prepared),
            (S::Preparing | S::Prepared | S::Started, Op::EngineFailed) => Some(S::Stopped),
            (S::Prepared, Op::Start) => Some(S::Started),
            (S::Started, Op::Stop) => Some(S::Stopped),
            _ => None,
        }
    }

    /// Whether `prepare()` is legal from this status
    pub fn can_prepare(self) -> bool {
        self.after(Operation::Prepare).is_some()
    }

    /// `Destroyed` is never left once entered
    pub fn is_terminal(self) -> bool {
        self == PlaybackStatus::Destroyed
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackStatus::Idle => "Idle",
            PlaybackStatus::Preparing => "Preparing",
            PlaybackStatus::Prepared => "Prepared",
            PlaybackStatus::Started => "Started",
            PlaybackStatus::Stopped => "Stopped",
            PlaybackStatus::Destroyed => "Destroyed",
        };
        f.write_str(name)
    }
}

/// Operations that can move the status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Caller asks the engine to start buffering
    Prepare,

    /// Caller asks for audible playback
    Start,

    /// Caller asks playback to halt
    Stop,

    /// Engine signalled that buffering finished
    EngineReady,

    /// Engine failed while buffering or playing
    EngineFailed,
}

impl Operation {
    /// Operations a caller can invoke directly on the controller
    pub const PUBLIC: [Operation; 3] = [Operation::Prepare, Operation::Start, Operation::Stop];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Prepare => "prepare",
            Operation::Start => "start",
            Operation::Stop => "stop",
            Operation::EngineReady => "complete preparation",
            Operation::EngineFailed => "handle an engine failure",
        };
        f.write_str(name)
    }
}

/// One successful transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeEvent {
    /// Status before the transition
    pub old: PlaybackStatus,
    /// Status after the transition
    pub new: PlaybackStatus,
}

impl StatusChangeEvent {
    pub fn new(old: PlaybackStatus, new: PlaybackStatus) -> Self {
        Self { old, new }
    }

    /// True when this is the engine reporting it finished buffering
    pub fn is_prepared(&self) -> bool {
        self.old == PlaybackStatus::Preparing && self.new == PlaybackStatus::Prepared
    }
}

/// An engine failure reported to observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFailure {
    /// Operation during which the engine failed
    pub operation: Operation,
    /// Engine-provided description
    pub message: String,
}

/// Events delivered to playback observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Status changed
    StatusChanged(StatusChangeEvent),

    /// The engine failed; a `StatusChanged` back to a prepare-legal status
    /// follows when the failure forced a transition
    EngineFailed(EngineFailure),
}

impl PlaybackEvent {
    /// The status change carried by this event, if any
    pub fn status_change(&self) -> Option<&StatusChangeEvent> {
        match self {
            PlaybackEvent::StatusChanged(change) => Some(change),
            PlaybackEvent::EngineFailed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table() {
        use Operation as Op;
        use PlaybackStatus as S;

        assert_eq!(S::Idle.after(Op::Prepare), Some(S::Preparing));
        assert_eq!(S::Stopped.after(Op::Prepare), Some(S::Preparing));
        assert_eq!(S::Preparing.after(Op::EngineReady), Some(S::Prepared));
        assert_eq!(S::Prepared.after(Op::Start), Some(S::Started));
        assert_eq!(S::Started.after(Op::Stop), Some(S::Stopped));
        assert_eq!(S::Preparing.after(Op::EngineFailed), Some(S::Stopped));
        assert_eq!(S::Prepared.after(Op::EngineFailed), Some(S::Stopped));
        assert_eq!(S::Started.after(Op::EngineFailed), Some(S::Stopped));
        assert_eq!(S::Stopped.after(Op::EngineFailed), None);

        assert_eq!(S::Preparing.after(Op::Prepare), None);
        assert_eq!(S::Preparing.after(Op::Stop), None);
        assert_eq!(S::Idle.after(Op::Start), None);
        assert_eq!(S::Prepared.after(Op::Stop), None);
        assert_eq!(S::Started.after(Op::Start), None);
        assert_eq!(S::Idle.after(Op::EngineReady), None);
    }

    #[test]
    fn destroyed_is_terminal() {
        for op in [
            Operation::Prepare,
            Operation::Start,
            Operation::Stop,
            Operation::EngineReady,
            Operation::EngineFailed,
        ] {
            assert_eq!(PlaybackStatus::Destroyed.after(op), None);
        }
        assert!(PlaybackStatus::Destroyed.is_terminal());
        assert!(!PlaybackStatus::Stopped.is_terminal());
    }

    #[test]
    fn nothing_leads_into_idle_or_destroyed() {
        for from in PlaybackStatus::ALL {
            for op in [
                Operation::Prepare,
                Operation::Start,
                Operation::Stop,
                Operation::EngineReady,
                Operation::EngineFailed,
            ] {
                let to = from.after(op);
                assert_ne!(to, Some(PlaybackStatus::Idle));
                assert_ne!(to, Some(PlaybackStatus::Destroyed));
            }
        }
    }

    #[test]
    fn prepare_legality() {
        let legal: Vec<_> = PlaybackStatus::ALL
            .into_iter()
            .filter(|s| s.can_prepare())
            .collect();
        assert_eq!(legal, vec![PlaybackStatus::Idle, PlaybackStatus::Stopped]);
    }

    #[test]
    fn prepared_event_detection() {
        assert!(StatusChangeEvent::new(PlaybackStatus::Preparing, PlaybackStatus::Prepared).is_prepared());
        assert!(!StatusChangeEvent::new(PlaybackStatus::Prepared, PlaybackStatus::Started).is_prepared());
    }
}
