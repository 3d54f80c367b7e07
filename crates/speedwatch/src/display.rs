//! Display surface for status, speed, and warnings.

use crate::estimator::SpeedReading;

/// Hints shown alongside recoverable provider failures.
pub const HINTS: &[&str] = &[
    "Check that the app is allowed to access your location.",
    "Move to an open area with better signal.",
    "Make sure the device's location service is turned on.",
];

/// An output surface the watch session renders to.
///
/// Implementations decide how status text, the current speed, warnings, and
/// the hint panel are presented.
pub trait DisplaySurface: Send {
    /// Render a status message.
    fn show_status(&mut self, status: &str);

    /// Render the current speed reading.
    fn show_speed(&mut self, reading: &SpeedReading);

    /// Raise a warning, or clear the current one when `None`.
    fn show_warning(&mut self, warning: Option<&str>);

    /// Render the hint panel.
    fn show_hints(&mut self);
}

/// Renders to the terminal, one line per update.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleDisplay;

impl ConsoleDisplay {
    /// Create a console display.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DisplaySurface for ConsoleDisplay {
    fn show_status(&mut self, status: &str) {
        println!("{status}");
    }

    fn show_speed(&mut self, reading: &SpeedReading) {
        match reading {
            SpeedReading::Kmh(v) => println!("Speed: {v:.2} km/h"),
            SpeedReading::Unavailable => println!("Speed: unavailable"),
        }
    }

    fn show_warning(&mut self, warning: Option<&str>) {
        if let Some(text) = warning {
            println!("{text}");
        }
    }

    fn show_hints(&mut self) {
        println!("Hints:");
        for hint in HINTS {
            println!("  - {hint}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints_are_not_empty() {
        assert!(!HINTS.is_empty());
        for hint in HINTS {
            assert!(!hint.is_empty());
        }
    }

    #[test]
    fn test_console_display_renders_without_panicking() {
        let mut display = ConsoleDisplay::new();
        display.show_status("Location acquired.");
        display.show_speed(&SpeedReading::Kmh(45.0));
        display.show_speed(&SpeedReading::Unavailable);
        display.show_warning(Some("Over the limit"));
        display.show_warning(None);
        display.show_hints();
    }

    #[test]
    fn test_console_display_debug() {
        let display = ConsoleDisplay::new();
        assert!(format!("{display:?}").contains("ConsoleDisplay"));
    }
}
