//! Consumer policies built on controller events

use crate::controller::PlaybackController;
use crate::observer::SubscriptionId;
use crate::types::PlaybackEvent;
use tracing::{debug, warn};

/// Starts playback as soon as the engine finished preparing
///
/// Lives outside the controller and only holds a weak handle, so installing
/// it does not keep the controller alive.
pub struct AutoStartPolicy;

impl AutoStartPolicy {
    /// Subscribe the policy to `controller`
    ///
    /// Returns the subscription so the host can uninstall it with
    /// [`PlaybackController::unsubscribe`].
    pub fn install(controller: &PlaybackController) -> SubscriptionId {
        let handle = controller.downgrade();
        controller.subscribe(move |event| {
            if !triggers_auto_start(event) {
                return;
            }
            let Some(controller) = handle.upgrade() else {
                debug!("Auto-start skipped, controller is gone");
                return;
            };

            match controller.start() {
                Ok(()) => debug!("Auto-start issued"),
                Err(e) if e.is_invalid_transition() => {
                    warn!("Auto-start no longer applicable: {}", e);
                }
                Err(e) => warn!("Auto-start failed: {}", e),
            }
        })
    }
}

/// True when `event` is the one [`AutoStartPolicy`] reacts to
pub fn triggers_auto_start(event: &PlaybackEvent) -> bool {
    event.status_change().is_some_and(|change| change.is_prepared())
}
