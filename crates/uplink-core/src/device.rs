//! Device types for tracking registered network hardware

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

use crate::registry::RegistryError;

/// Unique identifier for a device: its MAC address as reported by the client
///
/// A device's own address must be non-empty (see [`MacAddress::new`]). Uplink
/// references are taken as given, empty string included. Matching is exact
/// and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    /// Create a MAC address, rejecting empty strings
    pub fn new(mac: impl Into<String>) -> Result<Self, RegistryError> {
        let mac = mac.into();
        if mac.is_empty() {
            return Err(RegistryError::Validation {
                field: "macAddress".to_string(),
                message: "macAddress cannot be empty".to_string(),
            });
        }
        Ok(Self(mac))
    }

    /// Reference an uplink device; any string is accepted
    pub fn from_uplink(mac: impl Into<String>) -> Self {
        Self(mac.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MacAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

impl Borrow<str> for MacAddress {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MacAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of network element
///
/// Variant order is the listing order: gateways first, access points last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceType {
    Gateway,
    Switch,
    AccessPoint,
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DeviceType::Gateway => "GATEWAY",
            DeviceType::Switch => "SWITCH",
            DeviceType::AccessPoint => "ACCESS_POINT",
        };
        f.write_str(name)
    }
}

/// A registered device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Kind of device
    pub device_type: DeviceType,
    /// Unique device identifier
    pub mac_address: MacAddress,
    /// Parent device, `None` for a root
    pub uplink_mac_address: Option<MacAddress>,
}

impl Device {
    pub fn new(
        device_type: DeviceType,
        mac_address: MacAddress,
        uplink_mac_address: Option<MacAddress>,
    ) -> Self {
        Self {
            device_type,
            mac_address,
            uplink_mac_address,
        }
    }

    /// Whether this device has no uplink
    pub fn is_root(&self) -> bool {
        self.uplink_mac_address.is_none()
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Device [type={}, mac={}, uplink=", self.device_type, self.mac_address)?;
        match &self.uplink_mac_address {
            Some(uplink) => write!(f, "{}]", uplink),
            None => write!(f, "none]"),
        }
    }
}

/// Replacement values for an existing device
///
/// A missing `device_type` keeps the stored type. The uplink is replaced
/// wholesale, so `None` turns the device into a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceUpdate {
    pub device_type: Option<DeviceType>,
    pub mac_address: MacAddress,
    pub uplink_mac_address: Option<MacAddress>,
}
