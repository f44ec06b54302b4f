//! Terminal rendering of notifications and status changes

use ahfm_playback::{PlaybackEvent, PresentationEffect, PresentationSink, StatusView};
use serde::Serialize;
use std::io::{self, Write};
use std::sync::Mutex;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Line<'a> {
    Presentation { effect: &'a PresentationEffect },
    Event { event: &'a PlaybackEvent },
}

/// Render a presentation effect as a single line
pub fn render_effect(effect: &PresentationEffect) -> String {
    match effect {
        PresentationEffect::SuppressNotification => "[notification] hidden".to_string(),
        PresentationEffect::ShowNotification(shown) => {
            let kind = if shown.ongoing { "ongoing" } else { "dismissable" };
            format!(
                "[notification #{}] {}: {} ({}, {})",
                shown.id, shown.title, shown.text, shown.status, kind
            )
        }
    }
}

/// Render an event as a single line
pub fn render_event(event: &PlaybackEvent) -> String {
    match event {
        PlaybackEvent::StatusChanged(change) => format!(
            "[status] {} -> {}  {}",
            change.old,
            change.new,
            StatusView::for_status(change.new)
        ),
        PlaybackEvent::EngineFailed(failure) => format!(
            "[error] could not {}: {}",
            failure.operation, failure.message
        ),
    }
}

/// Writes notifications and events to a terminal
pub struct ConsoleSink<W: Write + Send> {
    mode: OutputMode,
    out: Mutex<W>,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout(mode: OutputMode) -> Self {
        Self::new(mode, io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(mode: OutputMode, out: W) -> Self {
        Self {
            mode,
            out: Mutex::new(out),
        }
    }

    /// Print an observer event
    pub fn event(&self, event: &PlaybackEvent) {
        let line = match self.mode {
            OutputMode::Text => render_event(event),
            OutputMode::Json => json_line(&Line::Event { event }),
        };
        self.write_line(&line);
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(out, "{}", line).and_then(|()| out.flush()) {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> PresentationSink for ConsoleSink<W> {
    fn apply(&self, effect: &PresentationEffect) {
        let line = match self.mode {
            OutputMode::Text => render_effect(effect),
            OutputMode::Json => json_line(&Line::Presentation { effect }),
        };
        self.write_line(&line);
    }
}

fn json_line(line: &Line<'_>) -> String {
    serde_json::to_string(line).unwrap_or_else(|e| format!(r#"{{"kind":"error","message":"{}"}}"#, e))
}
