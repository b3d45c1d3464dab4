//! REST API handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};
use uplink_core::{Device, DeviceType, DeviceUpdate, MacAddress, RegistryError, Topology};

use crate::state::AppState;

/// Status/message body used for confirmations and domain errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiMessage {
    pub status: u16,
    pub message: String,
}

impl ApiMessage {
    fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: msg.into(),
        }
    }
}

/// API error response
#[derive(Debug)]
pub enum ApiError {
    /// Error reported by the registry
    Registry(RegistryError),
    /// Request body could not be parsed
    MalformedBody(String),
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        Self::Registry(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::MalformedBody(message) => {
                warn!(error = %message, "Malformed request body");
                let status = StatusCode::BAD_REQUEST;
                return (status, Json(ApiMessage::new(status, message))).into_response();
            }
            ApiError::Registry(err) => err,
        };

        let status = match &err {
            RegistryError::DeviceNotFound(_) => StatusCode::NOT_FOUND,
            RegistryError::DeviceAlreadyExists(_) => StatusCode::CONFLICT,
            RegistryError::MissingDeviceType | RegistryError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
        };
        error!(status = status.as_u16(), error = %err, "Request failed");

        match err {
            RegistryError::Validation { field, message } => {
                let errors: HashMap<String, String> = HashMap::from([(field, message)]);
                (status, Json(errors)).into_response()
            }
            other => (status, Json(ApiMessage::new(status, other.to_string()))).into_response(),
        }
    }
}

/// Device as sent by clients on register and update
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePayload {
    #[serde(default)]
    pub device_type: Option<DeviceType>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub uplink_mac_address: Option<String>,
}

impl DevicePayload {
    /// Check required fields and convert into registry types
    ///
    /// Only a missing or null uplink makes a root; an empty one is kept.
    fn validate(self) -> Result<DeviceUpdate, RegistryError> {
        let mac_address = match self.mac_address {
            Some(mac) => MacAddress::new(mac)?,
            None => {
                return Err(RegistryError::Validation {
                    field: "macAddress".to_string(),
                    message: "macAddress is required".to_string(),
                })
            }
        };
        let uplink_mac_address = self.uplink_mac_address.map(MacAddress::from_uplink);

        Ok(DeviceUpdate {
            device_type: self.device_type,
            mac_address,
            uplink_mac_address,
        })
    }
}

/// Register a new device
pub async fn register_device(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DevicePayload>, JsonRejection>,
) -> Result<Json<Device>, ApiError> {
    let Json(payload) = payload?;
    info!(?payload, "Registering device");

    let request = payload.validate()?;
    let device = state.registry.register(
        request.device_type,
        request.mac_address,
        request.uplink_mac_address,
    )?;
    Ok(Json(device))
}

/// List all registered devices, gateways first
pub async fn list_devices(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!("Resolving all registered devices");
    let devices = state.registry.list_sorted_by_type();
    info!(count = devices.len(), "Number of registered devices");
    Json(devices)
}

/// Get a specific device by MAC address
pub async fn get_device(
    State(state): State<Arc<AppState>>,
    Path(mac): Path<String>,
) -> Result<Json<Device>, ApiError> {
    info!(mac = %mac, "Receiving device");
    Ok(Json(state.registry.get(&mac)?))
}

/// Get the full device topology
pub async fn get_topology(State(state): State<Arc<AppState>>) -> Json<Topology> {
    info!("Receiving network topology");
    Json(state.registry.full_topology())
}

/// Get the topology below a specific device
pub async fn get_device_topology(
    State(state): State<Arc<AppState>>,
    Path(mac): Path<String>,
) -> Result<Json<Topology>, ApiError> {
    info!(mac = %mac, "Receiving topology for device");
    let topology = state.registry.subtree_topology(&mac)?;
    info!(mac = %mac, nodes = topology.len(), "Device topology received");
    Ok(Json(topology))
}

/// Remove a device from the registry
pub async fn delete_device(
    State(state): State<Arc<AppState>>,
    Path(mac): Path<String>,
) -> Result<Json<ApiMessage>, ApiError> {
    info!(mac = %mac, "Deleting device");
    let deleted = state.registry.delete(&mac)?;
    Ok(Json(ApiMessage::new(StatusCode::OK, deleted.message())))
}

/// Replace an existing device
pub async fn update_device(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DevicePayload>, JsonRejection>,
) -> Result<Json<Device>, ApiError> {
    let Json(payload) = payload?;
    info!(?payload, "Updating device");

    let device = state.registry.update(payload.validate()?)?;
    Ok(Json(device))
}
