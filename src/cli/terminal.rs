//! Terminal capability detection and message styling

use owo_colors::{OwoColorize, colors::css};
use supports_color::Stream;

/// Terminals narrower than this get compact listings.
const NARROW_COLUMNS: u16 = 60;

/// Whether colored output should be written to `stream`.
pub fn supports_color(stream: Stream) -> bool {
    supports_color::on(stream).is_some()
}

/// Whether the attached terminal is too narrow for the full table.
///
/// Not a terminal at all counts as wide.
pub fn is_narrow() -> bool {
    terminal_size::terminal_size().is_some_and(|(width, _)| width.0 < NARROW_COLUMNS)
}

/// How a message should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Green, for completed actions.
    Success,
    /// Amber, for refusals and problems.
    Warning,
    /// Blue, for context the user asked to see.
    Info,
    /// Dimmed, for incidental notes.
    Muted,
}

impl Tone {
    /// Styles `message`, or returns it unchanged when `color` is off.
    pub fn paint(self, message: &str, color: bool) -> String {
        if !color {
            return message.to_owned();
        }
        match self {
            Self::Success => message.fg::<css::Green>().to_string(),
            Self::Warning => message.fg::<css::Orange>().to_string(),
            Self::Info => message.fg::<css::LightBlue>().to_string(),
            Self::Muted => message.dimmed().to_string(),
        }
    }

    /// Styles `message` for standard output.
    pub fn stdout(self, message: &str) -> String {
        self.paint(message, supports_color(Stream::Stdout))
    }
}
