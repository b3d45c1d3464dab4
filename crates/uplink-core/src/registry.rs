//! Device registry: the device table and topology graph kept in lockstep
//!
//! [`DeviceRegistry`] is the contract the HTTP layer programs against.
//! [`InMemoryRegistry`] is the implementation: both structures live behind a
//! single `RwLock`, so every mutation is applied to the table and the graph as
//! one unit and readers never see one without the other.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, info};

use crate::device::{Device, DeviceType, DeviceUpdate, MacAddress};
use crate::topology::Topology;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("deviceType is required")]
    MissingDeviceType,
    #[error("Device with MAC {0} is already registered. Please use update or delete methods instead.")]
    DeviceAlreadyExists(String),
    #[error("Device with MAC {0} not found")]
    DeviceNotFound(String),
    #[error("{message}")]
    Validation { field: String, message: String },
}

/// Confirmation returned by a successful delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deleted {
    pub mac_address: MacAddress,
}

impl Deleted {
    pub fn message(&self) -> String {
        format!("Device with MAC {} successfully deleted.", self.mac_address)
    }
}

/// Operations over a set of devices and their uplink topology
pub trait DeviceRegistry: Send + Sync {
    /// Register a new device, linking it under its uplink or as a root
    fn register(
        &self,
        device_type: Option<DeviceType>,
        mac_address: MacAddress,
        uplink_mac_address: Option<MacAddress>,
    ) -> Result<Device, RegistryError>;

    /// Replace an existing device, re-linking it if its uplink changed
    fn update(&self, update: DeviceUpdate) -> Result<Device, RegistryError>;

    /// Remove a device and unlink it from its parent
    fn delete(&self, mac_address: &str) -> Result<Deleted, RegistryError>;

    /// Look up a single device
    fn get(&self, mac_address: &str) -> Result<Device, RegistryError>;

    /// All devices: gateways, then switches, then access points
    fn list_sorted_by_type(&self) -> Vec<Device>;

    /// Snapshot of the whole topology graph
    fn full_topology(&self) -> Topology;

    /// Topology below (and including) the given device
    fn subtree_topology(&self, mac_address: &str) -> Result<Topology, RegistryError>;
}

/// Device table and topology graph; only ever touched under the registry lock
#[derive(Debug, Default)]
struct RegistryState {
    devices: HashMap<MacAddress, Device>,
    topology: Topology,
}

impl RegistryState {
    /// Hook a device into the graph the way registration does
    fn link(&mut self, device: &Device) {
        match &device.uplink_mac_address {
            Some(uplink) => self.topology.add_child(uplink, &device.mac_address),
            None => self.topology.ensure_root(&device.mac_address),
        }
    }
}

/// In-memory device registry
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    state: RwLock<RegistryState>,
}

impl InMemoryRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    // No operation panics between its table and graph writes, so a poisoned
    // lock still guards a consistent state.
    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceRegistry for InMemoryRegistry {
    fn register(
        &self,
        device_type: Option<DeviceType>,
        mac_address: MacAddress,
        uplink_mac_address: Option<MacAddress>,
    ) -> Result<Device, RegistryError> {
        let Some(device_type) = device_type else {
            info!(mac = %mac_address, "Registration rejected: deviceType is not provided");
            return Err(RegistryError::MissingDeviceType);
        };

        let mut state = self.write();
        if state.devices.contains_key(&mac_address) {
            info!(mac = %mac_address, "Registration rejected: device already registered");
            return Err(RegistryError::DeviceAlreadyExists(mac_address.to_string()));
        }

        let device = Device::new(device_type, mac_address, uplink_mac_address);
        state.devices.insert(device.mac_address.clone(), device.clone());
        state.link(&device);

        info!(
            mac = %device.mac_address,
            device_type = %device.device_type,
            uplink = ?device.uplink_mac_address.as_ref().map(MacAddress::as_str),
            "Registered device"
        );
        Ok(device)
    }

    fn update(&self, update: DeviceUpdate) -> Result<Device, RegistryError> {
        let mut state = self.write();
        let Some(previous) = state.devices.get(&update.mac_address).cloned() else {
            info!(mac = %update.mac_address, "Update rejected: device not found");
            return Err(RegistryError::DeviceNotFound(update.mac_address.to_string()));
        };
        debug!(old = %previous, "Updating device");

        if previous.uplink_mac_address != update.uplink_mac_address {
            state.topology.detach(&update.mac_address);
        }

        let device = Device::new(
            update.device_type.unwrap_or(previous.device_type),
            update.mac_address,
            update.uplink_mac_address,
        );
        state.devices.insert(device.mac_address.clone(), device.clone());
        state.link(&device);

        info!(new = %device, "Updated device");
        Ok(device)
    }

    fn delete(&self, mac_address: &str) -> Result<Deleted, RegistryError> {
        let mut state = self.write();
        let Some(removed) = state.devices.remove(mac_address) else {
            info!(mac = %mac_address, "Delete rejected: device not found");
            return Err(RegistryError::DeviceNotFound(mac_address.to_string()));
        };

        // The device's own entry stays behind; its children keep pointing at it.
        state.topology.detach(&removed.mac_address);

        info!(mac = %removed.mac_address, "Deleted device");
        Ok(Deleted {
            mac_address: removed.mac_address,
        })
    }

    fn get(&self, mac_address: &str) -> Result<Device, RegistryError> {
        match self.read().devices.get(mac_address) {
            Some(device) => {
                debug!(device = %device, "Resolved device");
                Ok(device.clone())
            }
            None => {
                info!(mac = %mac_address, "Device not found");
                Err(RegistryError::DeviceNotFound(mac_address.to_string()))
            }
        }
    }

    fn list_sorted_by_type(&self) -> Vec<Device> {
        let mut devices: Vec<Device> = self.read().devices.values().cloned().collect();
        // Table order is arbitrary; the MAC tie-break keeps listings stable.
        devices.sort_by(|a, b| {
            a.device_type
                .cmp(&b.device_type)
                .then_with(|| a.mac_address.cmp(&b.mac_address))
        });
        devices
    }

    fn full_topology(&self) -> Topology {
        self.read().topology.clone()
    }

    fn subtree_topology(&self, mac_address: &str) -> Result<Topology, RegistryError> {
        let state = self.read();
        let Some((root, _)) = state.devices.get_key_value(mac_address) else {
            info!(mac = %mac_address, "Subtree query rejected: device not found");
            return Err(RegistryError::DeviceNotFound(mac_address.to_string()));
        };
        Ok(state.topology.subtree(root))
    }
}
