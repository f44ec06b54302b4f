//! Keyboard commands

use ahfm_playback::ServiceCommand;

/// One line typed by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleInput {
    Command(ServiceCommand),
    Status,
    Help,
}

pub const HELP: &str = "\
commands:
  play | toggle | p   press the play/stop button
  stop | s            stop playback
  cancel | dismiss    dismiss the notification
  fg | show           bring the player to the foreground
  bg | hide           send the player to the background
  status              print the current status
  help                print this help
  quit | q            exit";

/// Parse a line; `None` for unknown input
pub fn parse_line(line: &str) -> Option<ConsoleInput> {
    let input = match line.trim().to_ascii_lowercase().as_str() {
        "play" | "toggle" | "p" => ConsoleInput::Command(ServiceCommand::Toggle),
        "stop" | "s" => ConsoleInput::Command(ServiceCommand::Stop),
        "cancel" | "dismiss" => ConsoleInput::Command(ServiceCommand::CancelPlayback),
        "fg" | "show" => ConsoleInput::Command(ServiceCommand::SetForeground(true)),
        "bg" | "hide" => ConsoleInput::Command(ServiceCommand::SetForeground(false)),
        "quit" | "exit" | "q" => ConsoleInput::Command(ServiceCommand::Shutdown),
        "status" => ConsoleInput::Status,
        "help" | "?" => ConsoleInput::Help,
        _ => return None,
    };
    Some(input)
}
