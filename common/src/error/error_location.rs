use serde::Serialize;

use std::fmt;
use std::panic::Location;

/// Source position captured where an error was constructed.
///
/// Every error variant in the workspace carries one of these, filled in via
/// `#[track_caller]` so the position names the conversion site rather than
/// the constructor.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ErrorLocation {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl ErrorLocation {
    #[must_use]
    pub const fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for ErrorLocation {
    // Rendered as "[file:line:column]", the suffix of every error Display
    // string in the workspace.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}:{}]", self.file, self.line, self.column)
    }
}
