//! Ping configuration management

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Vendor ID of the pong firmware
pub const DEFAULT_VENDOR_ID: u16 = 0x1d6b;
/// Product ID of the pong firmware
pub const DEFAULT_PRODUCT_ID: u16 = 0x0104;
pub const DEFAULT_INTERFACE: u8 = 0;
pub const DEFAULT_ENDPOINT_IN: u8 = 0x81;
pub const DEFAULT_ENDPOINT_OUT: u8 = 0x01;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingConfig {
    #[serde(default)]
    pub device: DeviceSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Which device, interface and endpoints to talk to
///
/// # Example Configuration
/// ```toml
/// [device]
/// vendor_id = "0x1d6b"
/// product_id = "0x0104"
/// interface = 0
/// endpoint_in = "0x81"
/// endpoint_out = "0x01"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    #[serde(with = "hex_u16")]
    pub vendor_id: u16,
    #[serde(with = "hex_u16")]
    pub product_id: u16,
    pub interface: u8,
    /// Address of the IN endpoint the peer replies on (direction bit set)
    #[serde(with = "hex_u8")]
    pub endpoint_in: u8,
    /// Address of the OUT endpoint payloads are written to
    #[serde(with = "hex_u8")]
    pub endpoint_out: u8,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            vendor_id: DEFAULT_VENDOR_ID,
            product_id: DEFAULT_PRODUCT_ID,
            interface: DEFAULT_INTERFACE,
            endpoint_in: DEFAULT_ENDPOINT_IN,
            endpoint_out: DEFAULT_ENDPOINT_OUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when RUST_LOG is unset (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Serde helpers for "0x"-prefixed hex strings
mod hex_u16 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u16, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:#06x}", value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u16, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_hex(&s, 4).map_err(serde::de::Error::custom)
    }
}

mod hex_u8 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &u8, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{:#04x}", value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let value = super::parse_hex(&s, 2).map_err(serde::de::Error::custom)?;
        // parse_hex caps the digit count, so this cannot truncate
        Ok(value as u8)
    }
}

/// Parse "0x1234" with at most `max_digits` hex digits
fn parse_hex(id: &str, max_digits: usize) -> std::result::Result<u16, String> {
    let hex_part = id
        .strip_prefix("0x")
        .or_else(|| id.strip_prefix("0X"))
        .ok_or_else(|| format!("Invalid hex value '{}', must start with '0x'", id))?;

    if hex_part.is_empty() || hex_part.len() > max_digits {
        return Err(format!(
            "Invalid hex value '{}', hex part must be 1-{} digits",
            id, max_digits
        ));
    }

    u16::from_str_radix(hex_part, 16)
        .map_err(|_| format!("Invalid hex value '{}', not a valid hex number", id))
}

impl PingConfig {
    /// Load configuration from `path`, or from the default location
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => {
                let default = Self::default_path();
                if !default.exists() {
                    return Err(anyhow!(
                        "No configuration file found at {}",
                        default.display()
                    ));
                }
                default
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: PingConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config.validate()?;

        tracing::info!("Loaded configuration from: {}", config_path.display());
        Ok(config)
    }

    /// Load the default-location file if there is one, otherwise use defaults
    pub fn load_or_default() -> Self {
        let path = Self::default_path();
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load(Some(path)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {:#}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save configuration to the specified path
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!("Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("usb-ping").join("ping.toml")
        } else {
            PathBuf::from(".config/usb-ping/ping.toml")
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}', must be one of: {}",
                self.logging.level,
                VALID_LOG_LEVELS.join(", ")
            ));
        }

        if self.device.endpoint_in & 0x80 == 0 {
            return Err(anyhow!(
                "endpoint_in {:#04x} is not an IN endpoint (bit 7 must be set)",
                self.device.endpoint_in
            ));
        }

        if self.device.endpoint_out & 0x80 != 0 {
            return Err(anyhow!(
                "endpoint_out {:#04x} is not an OUT endpoint (bit 7 must be clear)",
                self.device.endpoint_out
            ));
        }

        Ok(())
    }
}

/// Expand a leading `~` in a user-supplied path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
