//! Panel configuration.
//!
//! Persisted as `config.json`, versioned, with serde defaults on every
//! field so older files keep loading. Carries the only tunables the core
//! has: channel endpoint derivation, the forwarded-event policy and its
//! round-trip timeout, and the frame length limit.

use crate::error::config::ConfigError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_VERSION: u32 = 1;

/// First port of the IANA dynamic range; derived endpoints stay inside it.
const DYNAMIC_PORT_BASE: u16 = 49152;
const DYNAMIC_PORT_RANGE: u16 = 16384;

// ============================================
// CONFIG STRUCTS
// ============================================

/// How a channel name maps to a loopback endpoint.
///
/// A controller that knows the panel's channel name and these two values
/// can derive the same endpoint; see `transport::derive_endpoint`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "default_port_base")]
    pub port_base: u16,
    #[serde(default = "default_port_range")]
    pub port_range: u16,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            port_base: default_port_base(),
            port_range: default_port_range(),
        }
    }
}

/// Which host window messages are offered to the controller, and how long
/// the panel waits for a handling decision before falling back to
/// "unhandled". The exact message set depends on the concrete host
/// integration, which is why it is configuration rather than code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardConfig {
    #[serde(default = "default_forward_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_forward_message_ids")]
    pub message_ids: Vec<u32>,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_forward_timeout_ms(),
            message_ids: default_forward_message_ids(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_frame_len: default_max_frame_len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub channel: ChannelConfig,

    #[serde(default)]
    pub forward: ForwardConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            channel: ChannelConfig::default(),
            forward: ForwardConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_port_base() -> u16 {
    DYNAMIC_PORT_BASE
}
fn default_port_range() -> u16 {
    DYNAMIC_PORT_RANGE
}
fn default_forward_timeout_ms() -> u64 {
    250
}
fn default_forward_message_ids() -> Vec<u32> {
    // Mouse button transitions (WM_LBUTTONDOWN/UP, WM_RBUTTONDOWN/UP);
    // everything else stays with the host's default handling.
    vec![0x0201, 0x0202, 0x0204, 0x0205]
}
fn default_max_frame_len() -> u32 {
    crate::protocol::DEFAULT_MAX_FRAME_LEN
}

// ============================================
// IMPLEMENTATION
// ============================================

impl PanelConfig {
    /// Load config from `{config_dir}/config.json`.
    ///
    /// A missing file yields defaults; a file that exists but is corrupted
    /// or invalid is an error so the host can decide what to do with it.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: PanelConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to `{config_dir}/config.json` using atomic write
    /// (temp file + rename, so a crash cannot leave a torn file).
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(validation_error(format!(
                "Invalid version: {} (expected 1-{})",
                self.version, CONFIG_VERSION
            )));
        }

        if self.channel.port_range == 0 {
            return Err(validation_error(String::from("port_range must be > 0")));
        }

        let highest = u32::from(self.channel.port_base) + u32::from(self.channel.port_range) - 1;
        if highest > u32::from(u16::MAX) {
            return Err(validation_error(format!(
                "port window {}..={} exceeds the valid port range",
                self.channel.port_base, highest
            )));
        }

        if self.render.max_frame_len < 16 {
            return Err(validation_error(format!(
                "max_frame_len {} too small for any complete frame",
                self.render.max_frame_len
            )));
        }

        Ok(())
    }

    /// Bounded wait for a forwarded-event response.
    pub fn forward_timeout(&self) -> Duration {
        Duration::from_millis(self.forward.timeout_ms)
    }
}

/// Default platform config directory for the panel.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskband"))
}

#[track_caller]
fn validation_error(reason: String) -> ConfigError {
    ConfigError::ValidationError {
        location: ErrorLocation::from(Location::caller()),
        reason,
    }
}
