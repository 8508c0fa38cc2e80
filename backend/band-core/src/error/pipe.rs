use common::ErrorLocation;

use std::io::Error as IoError;
use std::panic::Location;

use thiserror::Error as ThisError;

/// Errors raised by the control-pipe subsystem.
///
/// All of these are local to one listener worker: they end that worker's
/// session but are never escalated as fatal to the hosting process.
#[derive(Debug, ThisError)]
pub enum PipeError {
    /// Channel could not be established at start (endpoint taken,
    /// permission denied). The panel stays inert; the host may retry
    /// by restarting the worker.
    #[error("Connection Error: {message} {location}")]
    Connection {
        message: String,
        location: ErrorLocation,
    },

    /// Transport failure mid-session.
    #[error("IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },

    /// Malformed frame. The connection is closed without attempting to
    /// resynchronize mid-stream.
    #[error("Protocol Error: {message} {location}")]
    Protocol {
        message: String,
        location: ErrorLocation,
    },

    /// A synchronous forwarded-event round-trip expired. Recovered locally
    /// as "unhandled"; never surfaced to the host as a failure.
    #[error("Timeout Error: {message} {location}")]
    Timeout {
        message: String,
        location: ErrorLocation,
    },

    #[error("Send Error: {message} {location}")]
    Send {
        message: String,
        location: ErrorLocation,
    },

    #[error("Read Error: {message} {location}")]
    Read {
        message: String,
        location: ErrorLocation,
    },
}

impl From<IoError> for PipeError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        PipeError::Io {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
