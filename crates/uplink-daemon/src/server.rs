//! Web server setup and routing

use anyhow::Result;
use axum::{
    routing::{delete, get, post},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::api;
use crate::config::TlsConfig;
use crate::state::AppState;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/devices", get(api::list_devices))
        .route("/devices/register", post(api::register_device))
        .route("/devices/update", post(api::update_device))
        .route("/devices/topology", get(api::get_topology))
        .route("/devices/topology/{mac}", get(api::get_device_topology))
        .route("/devices/delete/{mac}", delete(api::delete_device))
        .route("/devices/{mac}", get(api::get_device))
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // State
        .with_state(state)
}

/// Serve the API on the configured address, over TLS when `[daemon.tls]` is set
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let daemon = state.config.daemon.clone();
    let app = router(state);

    match &daemon.tls {
        Some(tls) => run_https(app, &daemon.bind, tls).await,
        None => run_http(app, &daemon.bind).await,
    }
}

/// Serve plain HTTP
async fn run_http(app: Router, bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!(address = %listener.local_addr()?, protocol = "HTTP", "Starting web server");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Serve over TLS with the configured PEM certificate and key
async fn run_https(app: Router, bind: &str, tls: &TlsConfig) -> Result<()> {
    let (cert, key) = tls.pem_paths()?;
    let addr: SocketAddr = bind.parse()?;
    let rustls = RustlsConfig::from_pem_file(cert, key).await?;

    info!(address = %addr, protocol = "HTTPS", cert = %tls.cert, "Starting web server");
    axum_server::bind_rustls(addr, rustls)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uplink_core::InMemoryRegistry;

    fn test_app() -> Router {
        let state = AppState::with_registry(Arc::new(InMemoryRegistry::new()), Config::default());
        router(state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn register(app: &Router, device_type: &str, mac: &str, uplink: Option<&str>) {
        let (status, _) = send(
            app,
            "POST",
            "/devices/register",
            Some(json!({
                "deviceType": device_type,
                "macAddress": mac,
                "uplinkMacAddress": uplink,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let app = test_app();
        let (status, body) = send(
            &app,
            "POST",
            "/devices/register",
            Some(json!({ "deviceType": "GATEWAY", "macAddress": "G1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "deviceType": "GATEWAY", "macAddress": "G1", "uplinkMacAddress": null })
        );

        let (status, body) = send(&app, "GET", "/devices/G1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["macAddress"], "G1");
    }

    #[tokio::test]
    async fn test_register_errors() {
        let app = test_app();
        register(&app, "GATEWAY", "G1", None).await;

        let (status, body) = send(
            &app,
            "POST",
            "/devices/register",
            Some(json!({ "deviceType": "SWITCH", "macAddress": "G1" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status"], 409);

        let (status, body) = send(
            &app,
            "POST",
            "/devices/register",
            Some(json!({ "macAddress": "S1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "status": 400, "message": "deviceType is required" }));

        let (status, body) = send(
            &app,
            "POST",
            "/devices/register",
            Some(json!({ "deviceType": "SWITCH" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "macAddress": "macAddress is required" }));

        let (status, body) = send(
            &app,
            "POST",
            "/devices/register",
            Some(json!({ "deviceType": "SWITCH", "macAddress": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "macAddress": "macAddress cannot be empty" }));

        let (status, body) = send(
            &app,
            "POST",
            "/devices/register",
            Some(json!({ "deviceType": "ROUTER", "macAddress": "R1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], 400);
    }

    #[tokio::test]
    async fn test_get_unknown_device() {
        let app = test_app();
        let (status, body) = send(&app, "GET", "/devices/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({ "status": 404, "message": "Device with MAC nope not found" })
        );
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let app = test_app();
        register(&app, "ACCESS_POINT", "AP1", Some("S1")).await;
        register(&app, "GATEWAY", "G1", None).await;
        register(&app, "SWITCH", "S1", Some("G1")).await;

        let (status, body) = send(&app, "GET", "/devices", None).await;
        assert_eq!(status, StatusCode::OK);
        let types: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["deviceType"].as_str().unwrap())
            .collect();
        assert_eq!(types, ["GATEWAY", "SWITCH", "ACCESS_POINT"]);
    }

    #[tokio::test]
    async fn test_topology_routes() {
        let app = test_app();
        register(&app, "GATEWAY", "G1", None).await;
        register(&app, "SWITCH", "S1", Some("G1")).await;
        register(&app, "ACCESS_POINT", "AP1", Some("S1")).await;
        register(&app, "ACCESS_POINT", "AP2", Some("S1")).await;
        register(&app, "SWITCH", "S2", Some("G1")).await;

        let (status, body) = send(&app, "GET", "/devices/topology", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["G1"], json!(["S1", "S2"]));
        assert_eq!(body["S1"], json!(["AP1", "AP2"]));

        let (status, body) = send(&app, "GET", "/devices/topology/S1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "S1": ["AP1", "AP2"], "AP1": [], "AP2": [] })
        );

        let (status, _) = send(&app, "GET", "/devices/topology/X9", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_route() {
        let app = test_app();
        register(&app, "GATEWAY", "G1", None).await;

        let (status, body) = send(&app, "DELETE", "/devices/delete/G1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "status": 200, "message": "Device with MAC G1 successfully deleted." })
        );

        let (status, _) = send(&app, "GET", "/devices/G1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "DELETE", "/devices/delete/G1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_route() {
        let app = test_app();
        register(&app, "SWITCH", "S1", None).await;
        register(&app, "GATEWAY", "G1", Some("S1")).await;
        register(&app, "SWITCH", "S2", None).await;

        let (status, body) = send(
            &app,
            "POST",
            "/devices/update",
            Some(json!({ "macAddress": "G1", "uplinkMacAddress": "S2" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "deviceType": "GATEWAY", "macAddress": "G1", "uplinkMacAddress": "S2" })
        );

        let (_, body) = send(&app, "GET", "/devices/topology/S1", None).await;
        assert_eq!(body["S1"], json!([]));
        let (_, body) = send(&app, "GET", "/devices/topology/S2", None).await;
        assert_eq!(body["S2"], json!(["G1"]));

        let (status, _) = send(
            &app,
            "POST",
            "/devices/update",
            Some(json!({ "deviceType": "SWITCH", "macAddress": "missing" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = test_app();
        let req = Request::builder()
            .method("POST")
            .uri("/devices/register")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_validation() {
        let app = test_app();
        register(&app, "SWITCH", "S1", None).await;

        let (status, body) = send(
            &app,
            "POST",
            "/devices/update",
            Some(json!({ "deviceType": "SWITCH", "uplinkMacAddress": "G1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "macAddress": "macAddress is required" }));

        let (status, body) = send(
            &app,
            "POST",
            "/devices/update",
            Some(json!({ "deviceType": "SWITCH", "macAddress": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "macAddress": "macAddress cannot be empty" }));

        let (_, body) = send(&app, "GET", "/devices/S1", None).await;
        assert_eq!(body["uplinkMacAddress"], Value::Null);
    }

    #[tokio::test]
    async fn test_empty_uplink_round_trip() {
        let app = test_app();
        let device = json!({ "deviceType": "SWITCH", "macAddress": "S1", "uplinkMacAddress": "" });

        let (status, body) = send(&app, "POST", "/devices/register", Some(device.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, device);

        let (status, body) = send(&app, "GET", "/devices/S1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, device);

        let (_, body) = send(&app, "GET", "/devices/topology", None).await;
        assert_eq!(body, json!({ "": ["S1"] }));
    }
}
