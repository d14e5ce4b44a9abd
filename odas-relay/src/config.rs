//! Configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use odas_framing::DEFAULT_MAX_PENDING_BYTES;

/// Port pair of one pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// TCP port the instance accepts source connections on
    pub listen_port: u16,

    /// UDP port reconstructed messages are relayed to
    pub relay_port: u16,
}

/// Relay configuration
///
/// Defaults match the ports ODAS has always used: tracking on 9000/9900,
/// potential sources on 9001/9901.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Path to configuration file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Host the UDP relay sends to
    pub relay_host: String,

    /// Per-connection pending-buffer cap in bytes
    pub max_pending_bytes: usize,

    /// Tracking-source pipeline
    pub tracking: EndpointConfig,

    /// Potential-source pipeline
    pub potential: EndpointConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
            relay_host: "127.0.0.1".to_string(),
            max_pending_bytes: DEFAULT_MAX_PENDING_BYTES,
            tracking: EndpointConfig {
                listen_port: 9000,
                relay_port: 9900,
            },
            potential: EndpointConfig {
                listen_port: 9001,
                relay_port: 9901,
            },
        }
    }
}

impl RelayConfig {
    /// Load configuration from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_config_path())
    }

    /// Load configuration from an explicit path, creating it with defaults
    /// when missing.
    pub fn load_from(config_path: PathBuf) -> Result<Self> {
        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let mut config: RelayConfig = toml::from_str(&contents)
                .context("Failed to parse config file")?;

            config.config_path = config_path;
            Ok(config)
        } else {
            let config = Self {
                config_path,
                ..Self::default()
            };
            config.save().context("Failed to save default config")?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&self.config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get default config path
    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("odas-relay")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_ports() {
        let config = RelayConfig::default();
        assert_eq!(config.tracking.listen_port, 9000);
        assert_eq!(config.tracking.relay_port, 9900);
        assert_eq!(config.potential.listen_port, 9001);
        assert_eq!(config.potential.relay_port, 9901);
        assert_eq!(config.relay_host, "127.0.0.1");
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = RelayConfig::default();
        config.tracking.listen_port = 19000;
        config.max_pending_bytes = 4096;

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: RelayConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.tracking.listen_port, 19000);
        assert_eq!(parsed.potential.relay_port, 9901);
        assert_eq!(parsed.max_pending_bytes, 4096);
    }

    #[test]
    fn load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = RelayConfig::load_from(path.clone()).unwrap();
        assert!(path.exists());
        assert_eq!(config.tracking.listen_port, 9000);

        // Second load reads the file it just wrote.
        let reloaded = RelayConfig::load_from(path).unwrap();
        assert_eq!(reloaded.potential.listen_port, 9001);
    }
}
