//! Configuration loading and validation

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use uplink_core::DeviceType;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    /// Devices registered at startup, in file order
    #[serde(default, rename = "device")]
    pub seed_devices: Vec<SeedDeviceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Bind address for web server
    #[serde(default = "default_bind")]
    pub bind: String,
    /// TLS configuration (optional - enables HTTPS when present)
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            tls: None,
        }
    }
}

/// TLS/HTTPS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM format)
    pub cert: String,
    /// Path to private key file (PEM format)
    pub key: String,
}

impl TlsConfig {
    /// Certificate and key paths, checked to exist on disk
    pub fn pem_paths(&self) -> Result<(PathBuf, PathBuf)> {
        let cert = PathBuf::from(&self.cert);
        let key = PathBuf::from(&self.key);
        ensure!(cert.is_file(), "TLS certificate {} does not exist", cert.display());
        ensure!(key.is_file(), "TLS private key {} does not exist", key.display());
        Ok((cert, key))
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

/// A device to register when the daemon starts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedDeviceConfig {
    pub device_type: DeviceType,
    pub mac_address: String,
    /// Uplink MAC address (omit for a root device)
    #[serde(default)]
    pub uplink_mac_address: Option<String>,
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(
            path = %path.display(),
            seed_devices = config.seed_devices.len(),
            "Loaded configuration"
        );
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}
