//! Uplink Core - Device registry and topology engine
//!
//! This crate provides the foundational types for the Uplink service:
//! - Device value types (gateways, switches, access points) keyed by MAC address
//! - Topology graph mapping each uplink to the devices connected below it
//! - The device registry that keeps both consistent across register/update/delete

pub mod device;
pub mod registry;
pub mod topology;

pub use device::{Device, DeviceType, DeviceUpdate, MacAddress};
pub use registry::{Deleted, DeviceRegistry, InMemoryRegistry, RegistryError};
pub use topology::Topology;
