//! Process lifecycle host
//!
//! Owns the single [`PlaybackController`] for the lifetime of the host and
//! routes control commands to it from one control thread.

use crate::config::PlaybackConfig;
use crate::control::{self, ControlAction};
use crate::controller::PlaybackController;
use crate::engine::{EngineNotifier, PlayerEngine};
use crate::error::Result;
use crate::observer::SubscriptionId;
use crate::policy::AutoStartPolicy;
use crate::presentation::PresentationSink;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Commands sent to the control thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCommand {
    /// Press the play/stop button
    Toggle,

    Prepare,

    Start,

    Stop,

    /// User-facing surface became visible (`true`) or hidden (`false`)
    SetForeground(bool),

    /// Notification dismissed by the user
    CancelPlayback,

    /// Tear down and leave the run loop
    Shutdown,
}

/// Create the command queue for [`PlaybackService::run`]
pub fn command_channel() -> (Sender<ServiceCommand>, Receiver<ServiceCommand>) {
    bounded(32)
}

/// Lifecycle host for the playback controller
pub struct PlaybackService {
    controller: PlaybackController,
    auto_start: SubscriptionId,
    shut_down: bool,
}

impl PlaybackService {
    /// Create the controller and install [`AutoStartPolicy`]
    pub fn new<F>(
        config: &PlaybackConfig,
        sink: Arc<dyn PresentationSink>,
        build_engine: F,
    ) -> Result<Self>
    where
        F: FnOnce(EngineNotifier) -> Box<dyn PlayerEngine>,
    {
        let controller = PlaybackController::new(config, sink, build_engine)?;
        let auto_start = AutoStartPolicy::install(&controller);
        info!("Playback service created");

        Ok(Self {
            controller,
            auto_start,
            shut_down: false,
        })
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn auto_start_subscription(&self) -> SubscriptionId {
        self.auto_start
    }

    /// Route one command to the controller
    ///
    /// Returns `Ok(false)` once the service has shut down.
    pub fn handle(&mut self, command: ServiceCommand) -> Result<bool> {
        if self.shut_down {
            debug!("Ignoring {:?} after shutdown", command);
            return Ok(false);
        }

        match command {
            ServiceCommand::Toggle => {
                if control::toggle(&self.controller)?.is_none() {
                    debug!("Toggle has no effect in {}", self.controller.status());
                }
            }
            ServiceCommand::Prepare => ControlAction::Prepare.apply(&self.controller)?,
            ServiceCommand::Start => self.controller.start()?,
            ServiceCommand::Stop => ControlAction::Stop.apply(&self.controller)?,
            ServiceCommand::SetForeground(foreground) => {
                self.controller.set_foreground(foreground);
            }
            ServiceCommand::CancelPlayback => match self.controller.stop() {
                Err(e) if e.is_invalid_transition() => {
                    warn!("Cancel ignored: {}", e);
                }
                other => other?,
            },
            ServiceCommand::Shutdown => {
                self.shutdown();
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Process commands until `Shutdown` or until every sender is dropped
    ///
    /// Command errors are logged and do not stop the loop.
    pub fn run(&mut self, commands: &Receiver<ServiceCommand>) {
        while let Ok(command) = commands.recv() {
            match self.handle(command) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => warn!("Command {:?} failed: {}", command, e),
            }
        }
        self.shutdown();
    }

    /// Tear the controller down; only the first call has an effect
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.controller.unsubscribe(self.auto_start);
        self.controller.teardown();
        info!("Playback service shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

impl Drop for PlaybackService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
