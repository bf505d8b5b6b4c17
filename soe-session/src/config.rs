//! Session configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via SOE_CONFIG or --config)
//! 3. Environment variables

use crate::checksum::MAX_CRC_LENGTH;
use crate::{DEFAULT_BUFFER_SIZE, DEFAULT_CRC_LENGTH};
use serde::{Deserialize, Serialize};
use soe_protocol::FRAGMENT_SAFETY_MARGIN;
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-connection framing parameters.
    pub session: SessionConfig,
}

impl Config {
    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os("SOE_CONFIG").map(PathBuf::from);
        Self::load_from(path.as_deref())
    }

    /// Loads configuration from `path` when given, then applies environment
    /// variable overrides and validates the result.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.session.apply_env_overrides();
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session.validate()
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;
        Ok(())
    }

    /// Renders the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::ParseError(PathBuf::from("<memory>"), e.to_string()))
    }
}

/// Framing parameters negotiated for a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Transport buffer size in bytes.
    pub buffer_size: u32,
    /// Seed mixed into every CRC trailer.
    pub crc_seed: u32,
    /// Number of CRC bytes appended to a packet (0-4).
    pub crc_length: u8,
    /// Whether payloads may be compressed.
    pub compression: bool,
    /// Whether payloads are encrypted.
    pub encryption: bool,
    /// Key for the XOR chain cipher.
    pub encryption_key: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            crc_seed: 0,
            crc_length: DEFAULT_CRC_LENGTH,
            compression: true,
            encryption: false,
            encryption_key: 0,
        }
    }
}

impl SessionConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(size) = std::env::var("SOE_BUFFER_SIZE") {
            if let Ok(n) = size.parse() {
                self.buffer_size = n;
            }
        }

        if let Ok(seed) = std::env::var("SOE_CRC_SEED") {
            if let Some(n) = parse_u32(&seed) {
                self.crc_seed = n;
            }
        }

        if let Ok(length) = std::env::var("SOE_CRC_LENGTH") {
            if let Ok(n) = length.parse() {
                self.crc_length = n;
            }
        }

        if let Ok(enabled) = std::env::var("SOE_COMPRESSION") {
            self.compression = enabled == "1" || enabled.to_lowercase() == "true";
        }

        if let Ok(enabled) = std::env::var("SOE_ENCRYPTION") {
            self.encryption = enabled == "1" || enabled.to_lowercase() == "true";
        }

        if let Ok(key) = std::env::var("SOE_ENCRYPTION_KEY") {
            if let Some(n) = parse_u32(&key) {
                self.encryption_key = n;
            }
        }
    }

    /// Validates the framing parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size <= FRAGMENT_SAFETY_MARGIN {
            return Err(ConfigError::ValidationError(format!(
                "buffer_size must be larger than {} bytes, got {}",
                FRAGMENT_SAFETY_MARGIN, self.buffer_size
            )));
        }
        if self.crc_length > MAX_CRC_LENGTH {
            return Err(ConfigError::ValidationError(format!(
                "crc_length must be at most {}, got {}",
                MAX_CRC_LENGTH, self.crc_length
            )));
        }
        Ok(())
    }
}

/// Parses a decimal or `0x` prefixed hexadecimal number.
fn parse_u32(s: &str) -> Option<u32> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    IoError(PathBuf, std::io::Error),
    ParseError(PathBuf, String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::ValidationError(msg) => {
                write!(f, "configuration validation failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
