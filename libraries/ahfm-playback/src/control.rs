//! Control surface: what the single play/stop button does and shows

use crate::controller::PlaybackController;
use crate::error::Result;
use crate::types::PlaybackStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Action the toggle button performs for a given status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlAction {
    Prepare,
    Stop,
}

impl ControlAction {
    /// `None` while the button is disabled or pressing it would be a no-op
    pub fn for_status(status: PlaybackStatus) -> Option<Self> {
        match status {
            PlaybackStatus::Idle | PlaybackStatus::Stopped => Some(ControlAction::Prepare),
            PlaybackStatus::Started => Some(ControlAction::Stop),
            PlaybackStatus::Preparing | PlaybackStatus::Prepared | PlaybackStatus::Destroyed => {
                None
            }
        }
    }

    pub fn apply(self, controller: &PlaybackController) -> Result<()> {
        match self {
            ControlAction::Prepare => controller.prepare(),
            ControlAction::Stop => controller.stop(),
        }
    }
}

/// Press the toggle button
///
/// Returns the action taken, or `None` if the button had no effect in the
/// current status.
pub fn toggle(controller: &PlaybackController) -> Result<Option<ControlAction>> {
    let Some(action) = ControlAction::for_status(controller.status()) else {
        return Ok(None);
    };
    action.apply(controller)?;
    Ok(Some(action))
}

/// Button caption
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonLabel {
    Play,
    Stop,
}

impl fmt::Display for ButtonLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonLabel::Play => f.write_str("Play"),
            ButtonLabel::Stop => f.write_str("Stop"),
        }
    }
}

/// What the user-facing surface renders for a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub label: &'static str,
    pub button: ButtonLabel,
    pub enabled: bool,
}

impl StatusView {
    pub fn for_status(status: PlaybackStatus) -> Self {
        match status {
            PlaybackStatus::Preparing => Self {
                label: "Preparing",
                button: ButtonLabel::Play,
                enabled: false,
            },
            PlaybackStatus::Started => Self {
                label: "Started",
                button: ButtonLabel::Stop,
                enabled: true,
            },
            _ => Self {
                label: "Stopped",
                button: ButtonLabel::Play,
                enabled: true,
            },
        }
    }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.enabled {
            write!(f, "{} [{}]", self.label, self.button)
        } else {
            write!(f, "{} [{} disabled]", self.label, self.button)
        }
    }
}
