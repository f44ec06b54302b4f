//! Notification presentation
//!
//! Derives whether the background notification should be shown from the
//! playback status and the foreground flag. The derivation is pure; the
//! [`PresentationSink`] does the platform work.

use crate::config::NotificationSettings;
use crate::types::PlaybackStatus;
use serde::{Deserialize, Serialize};

/// Identity of the single playback notification
///
/// Posting again with the same id replaces the existing notification.
pub const NOTIFICATION_ID: i32 = 0;

/// What the background notification should look like
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSpec {
    pub id: i32,
    pub title: String,
    pub text: String,
    /// Status the notification reflects
    pub status: PlaybackStatus,
    /// Non-dismissable while audible playback is running
    pub ongoing: bool,
}

impl NotificationSpec {
    pub fn is_dismissable(&self) -> bool {
        !self.ongoing
    }
}

/// Outcome of a presentation re-evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationEffect {
    /// Cancel the notification (user is looking at the app, or teardown)
    SuppressNotification,

    /// Post or replace the notification
    ShowNotification(NotificationSpec),
}

impl PresentationEffect {
    /// The media session is active exactly while the notification is shown
    pub fn media_session_active(&self) -> bool {
        matches!(self, PresentationEffect::ShowNotification(_))
    }

    pub fn notification(&self) -> Option<&NotificationSpec> {
        match self {
            PresentationEffect::ShowNotification(shown) => Some(shown),
            PresentationEffect::SuppressNotification => None,
        }
    }
}

/// Receives presentation effects and displays/cancels the platform notification
///
/// Implementations must treat a repeated `ShowNotification` with the same id
/// as a replacement, and route the notification's dismissal back to
/// `PlaybackController::stop`.
pub trait PresentationSink: Send + Sync {
    fn apply(&self, effect: &PresentationEffect);
}

/// Sink that drops every effect, for hosts without a notification surface
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresentationSink;

impl PresentationSink for NullPresentationSink {
    fn apply(&self, _effect: &PresentationEffect) {}
}

/// Whether the notification is non-dismissable for `status`
pub fn is_ongoing(status: PlaybackStatus) -> bool {
    status == PlaybackStatus::Started
}

/// Pure `(status, foreground) -> effect` derivation
#[derive(Debug, Clone)]
pub struct PresentationCoordinator {
    settings: NotificationSettings,
}

impl PresentationCoordinator {
    pub fn new(settings: NotificationSettings) -> Self {
        Self { settings }
    }

    /// Evaluate the presentation for the given inputs
    ///
    /// Identical inputs always give identical effects.
    pub fn evaluate(&self, status: PlaybackStatus, foreground: bool) -> PresentationEffect {
        if foreground || status.is_terminal() {
            return PresentationEffect::SuppressNotification;
        }

        PresentationEffect::ShowNotification(NotificationSpec {
            id: NOTIFICATION_ID,
            title: self.settings.title.clone(),
            text: self.settings.text.clone(),
            status,
            ongoing: is_ongoing(status),
        })
    }
}

impl Default for PresentationCoordinator {
    fn default() -> Self {
        Self::new(NotificationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreground_suppresses_for_every_status() {
        let coordinator = PresentationCoordinator::default();
        for status in PlaybackStatus::ALL {
            assert_eq!(
                coordinator.evaluate(status, true),
                PresentationEffect::SuppressNotification
            );
        }
    }

    #[test]
    fn background_started_is_ongoing() {
        let coordinator = PresentationCoordinator::default();
        let effect = coordinator.evaluate(PlaybackStatus::Started, false);

        let shown = effect.notification().expect("notification shown");
        assert_eq!(shown.status, PlaybackStatus::Started);
        assert!(shown.ongoing);
        assert!(!shown.is_dismissable());
        assert_eq!(shown.id, NOTIFICATION_ID);
        assert!(effect.media_session_active());
    }

    #[test]
    fn background_non_started_is_dismissable() {
        let coordinator = PresentationCoordinator::default();
        for status in [
            PlaybackStatus::Idle,
            PlaybackStatus::Preparing,
            PlaybackStatus::Prepared,
            PlaybackStatus::Stopped,
        ] {
            let effect = coordinator.evaluate(status, false);
            let shown = effect.notification().expect("notification shown");
            assert_eq!(shown.status, status);
            assert!(shown.is_dismissable(), "{status} should be dismissable");
        }
    }

    #[test]
    fn destroyed_cancels_even_in_background() {
        let coordinator = PresentationCoordinator::default();
        let effect = coordinator.evaluate(PlaybackStatus::Destroyed, false);
        assert_eq!(effect, PresentationEffect::SuppressNotification);
        assert!(!effect.media_session_active());
    }

    #[test]
    fn evaluation_is_idempotent() {
        let coordinator = PresentationCoordinator::new(NotificationSettings {
            title: "Radio".to_string(),
            text: "On air".to_string(),
        });
        let first = coordinator.evaluate(PlaybackStatus::Stopped, false);
        let second = coordinator.evaluate(PlaybackStatus::Stopped, false);

        assert_eq!(first, second);
        assert_eq!(first.notification().map(|s| s.title.as_str()), Some("Radio"));
    }
}
