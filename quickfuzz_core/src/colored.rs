use serde::{Deserialize, Serialize};

/// Terminal colors used by the reporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Color {
    /// Informational lines
    White,
    /// Errors
    Red,
    /// Successful responses
    Green,
    /// Payload data and warnings
    Yellow,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::White => 37,
        }
    }
}

/// Wraps a string into ANSI color escape codes
pub trait Colored {
    /// Colors the string, `None` returns it unchanged
    fn paint(&self, color: Option<Color>) -> String;
}

impl Colored for String {
    fn paint(&self, color: Option<Color>) -> String {
        self.as_str().paint(color)
    }
}

impl Colored for &str {
    fn paint(&self, color: Option<Color>) -> String {
        match color {
            Some(color) => format!("\x1b[{}m{self}\x1b[0m", color.code()),
            None => (*self).to_string(),
        }
    }
}

/// Colors for the different kinds of output lines. `None` prints the line without escape codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    /// `[+] Payload:` and `[+] Response:` headers
    pub info: Option<Color>,
    /// The data that was sent
    pub payload: Option<Color>,
    /// The captured response
    pub success: Option<Color>,
    /// Failure reasons
    pub error: Option<Color>,
    /// Warnings
    pub warning: Option<Color>,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            info: Some(Color::White),
            payload: Some(Color::Yellow),
            success: Some(Color::Green),
            error: Some(Color::Red),
            warning: Some(Color::Yellow),
        }
    }
}

impl ColorScheme {
    /// Scheme without any colors
    #[must_use]
    pub fn plain() -> Self {
        Self {
            info: None,
            payload: None,
            success: None,
            error: None,
            warning: None,
        }
    }
}
