//! Application state management

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use uplink_core::{DeviceRegistry, InMemoryRegistry, MacAddress};

use crate::config::Config;

/// Shared application state
pub struct AppState {
    /// Device registry and topology
    pub registry: Arc<dyn DeviceRegistry>,
    /// Configuration
    pub config: Config,
}

impl AppState {
    /// Create new application state, registering any configured seed devices
    pub fn new(config: Config) -> Result<Arc<Self>> {
        let registry = Arc::new(InMemoryRegistry::new());

        for seed in &config.seed_devices {
            let mac = MacAddress::new(seed.mac_address.clone())
                .context("Invalid seed device in configuration")?;
            let uplink = seed.uplink_mac_address.clone().map(MacAddress::from_uplink);

            registry
                .register(Some(seed.device_type), mac, uplink)
                .with_context(|| format!("Failed to register seed device {}", seed.mac_address))?;
        }

        if !config.seed_devices.is_empty() {
            info!(count = config.seed_devices.len(), "Registered seed devices");
        }

        Ok(Self::with_registry(registry, config))
    }

    /// Build state around an existing registry
    pub fn with_registry(registry: Arc<dyn DeviceRegistry>, config: Config) -> Arc<Self> {
        Arc::new(Self { registry, config })
    }
}
