pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod listener;
pub mod painter;
pub mod panel;
pub mod protocol;
pub mod transport;

#[cfg(test)]
mod tests;

/// Panels only ever listen on loopback; controllers are local processes.
pub const CHANNEL_HOSTNAME: &str = "127.0.0.1";

/// Prefix for generated channel names, so a controller can recognize
/// taskband endpoints among its own instance ids.
pub const CHANNEL_NAME_PREFIX: &str = "taskband-";

/// Channel name used when the host does not supply an instance id.
pub const DEFAULT_CHANNEL_NAME: &str = const_format::concatcp!(CHANNEL_NAME_PREFIX, "main");
