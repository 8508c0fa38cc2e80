use common::ErrorLocation;

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the host harness.
///
/// These are reported as strings at the process boundary, but we maintain
/// structured error information and location tracking internally.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum BandhostError {
    /// Error from this harness (logging, filesystem, setup)
    #[error("Bandhost Error: {message} {location}")]
    Bandhost {
        message: String,
        location: ErrorLocation,
    },

    /// Error from band-core operations (channel bind, config)
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },
}
