//! AHFM Player - Playback Lifecycle
//!
//! Platform-agnostic playback lifecycle for a single internet radio stream.
//!
//! This crate provides:
//! - Playback status state machine (Idle, Preparing, Prepared, Started, Stopped, Destroyed)
//! - Ordered status-change events with explicit subscribe/unsubscribe
//! - Background notification derivation from status and foreground visibility
//! - Auto-start policy (start as soon as the stream is buffered)
//! - Play/stop control surface and a command-driven service host
//!
//! # Architecture
//!
//! `ahfm-playback` does no networking or decoding:
//! - The stream is played by a [`PlayerEngine`] supplied by the platform
//! - Notifications are posted by a [`PresentationSink`] supplied by the platform
//! - Policies (like [`AutoStartPolicy`]) are observers, not part of the controller
//!
//! # Example: Foreground/background
//!
//! ```rust
//! use ahfm_playback::{PlaybackStatus, PresentationCoordinator, PresentationEffect};
//!
//! let coordinator = PresentationCoordinator::default();
//!
//! // User is looking at the app: no notification
//! assert_eq!(
//!     coordinator.evaluate(PlaybackStatus::Started, true),
//!     PresentationEffect::SuppressNotification
//! );
//!
//! // App hidden while playing: ongoing notification
//! let effect = coordinator.evaluate(PlaybackStatus::Started, false);
//! assert!(effect.notification().unwrap().ongoing);
//! ```
//!
//! # Example: Service host
//!
//! ```rust,no_run
//! use ahfm_playback::{
//!     command_channel, EngineError, EngineNotifier, NullPresentationSink, PlaybackConfig,
//!     PlaybackService, PlayerEngine, ServiceCommand,
//! };
//! use std::sync::Arc;
//!
//! struct MyEngine {
//!     notifier: EngineNotifier,
//! }
//!
//! impl PlayerEngine for MyEngine {
//!     fn set_source(&mut self, _address: &str) -> Result<(), EngineError> { Ok(()) }
//!     fn prepare_async(&mut self) -> Result<(), EngineError> {
//!         // Buffer in the background, then call self.notifier.prepared()
//!         Ok(())
//!     }
//!     fn start(&mut self) -> Result<(), EngineError> { Ok(()) }
//!     fn stop(&mut self) -> Result<(), EngineError> { Ok(()) }
//!     fn reset(&mut self) {}
//!     fn release(&mut self) {}
//! }
//!
//! let mut service = PlaybackService::new(
//!     &PlaybackConfig::default(),
//!     Arc::new(NullPresentationSink),
//!     |notifier| Box::new(MyEngine { notifier }),
//! )?;
//!
//! let (commands, queue) = command_channel();
//! commands.send(ServiceCommand::Toggle).ok();
//! commands.send(ServiceCommand::Shutdown).ok();
//! service.run(&queue);
//! # Ok::<(), ahfm_playback::PlaybackError>(())
//! ```

mod config;
mod control;
mod controller;
mod engine;
mod error;
mod observer;
mod policy;
mod presentation;
mod service;
pub mod types;

// Public exports
pub use config::{NotificationSettings, PlaybackConfig, DEFAULT_STREAM_ADDRESS};
pub use control::{toggle, ButtonLabel, ControlAction, StatusView};
pub use controller::{PlaybackController, WeakPlaybackController};
pub use engine::{EngineNotifier, PlayerEngine};
pub use error::{EngineError, PlaybackError, Result};
pub use observer::{Observer, SubscriptionId};
pub use policy::{triggers_auto_start, AutoStartPolicy};
pub use presentation::{
    is_ongoing, NotificationSpec, NullPresentationSink, PresentationCoordinator,
    PresentationEffect, PresentationSink, NOTIFICATION_ID,
};
pub use service::{command_channel, PlaybackService, ServiceCommand};
pub use types::{
    EngineFailure, Operation, PlaybackEvent, PlaybackStatus, StatusChangeEvent,
};
