//! Terminal capability detection and output styling

use owo_colors::{colors::css, OwoColorize};

/// Grids of hours are laid out for at least this many columns.
const NARROW_WIDTH: u16 = 48;

/// Whether stdout should get ANSI colours
fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

fn terminal_width() -> Option<u16> {
    terminal_size::terminal_size().map(|(w, _)| w.0)
}

/// Whether option labels should be shortened to fit the terminal
#[must_use]
pub fn is_narrow() -> bool {
    terminal_width().is_some_and(|w| w < NARROW_WIDTH)
}

/// Extension trait for styling CLI messages
pub trait Colorize {
    /// Confirmation of a completed action (green)
    fn success(&self) -> String;
    /// Something the user should notice but can recover from (amber)
    fn warning(&self) -> String;
    /// Headings and step titles (blue)
    fn info(&self) -> String;
    /// Secondary details and unavailable options
    fn dim(&self) -> String;
}

fn paint(text: &str, style: impl FnOnce(&str) -> String) -> String {
    if supports_color() {
        style(text)
    } else {
        text.to_string()
    }
}

impl Colorize for str {
    fn success(&self) -> String {
        paint(self, |s| s.fg::<css::SeaGreen>().to_string())
    }

    fn warning(&self) -> String {
        paint(self, |s| s.fg::<css::Orange>().to_string())
    }

    fn info(&self) -> String {
        paint(self, |s| s.fg::<css::LightBlue>().bold().to_string())
    }

    fn dim(&self) -> String {
        paint(self, |s| s.dimmed().to_string())
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn info(&self) -> String {
        self.as_str().info()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}
