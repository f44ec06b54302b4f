//! AHFM Player - Terminal host
//!
//! Hosts the playback service in a terminal: keyboard commands stand in for
//! the play/stop button and the app's visibility, notifications are printed.

pub mod config;
pub mod engine;
pub mod input;
pub mod sink;
