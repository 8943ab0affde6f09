//! In-process mock of the remote add-on marketplace.
//!
//! Serves the handshake, token and catalog endpoints with `axum` on a
//! background thread with its own tokio runtime, so blocking clients can call
//! it from plain `#[test]` functions. Every call is recorded for assertions.

#![allow(dead_code, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use axum::extract::{Form, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

/// Instance identifier accepted by the handshake.
pub const GOOD_INSTANCE: &str = "instance-0001";
/// Checksum accepted by the handshake.
pub const GOOD_CHECKSUM: &str = "checksum-0001";
/// Payload served for any add-on file.
pub const ADDON_BYTES: &[u8] = &[0x50, 0x4b, 0x03, 0x04, 0x00, 0xff, 0x10, 0x80, 0x0a, 0x0d];

const CLIENT_ID: &str = "mock-client";
const CLIENT_SECRET: &str = "mock-secret";
const ACCESS_TOKEN: &str = "mock-token";

type Fields = HashMap<String, String>;

/// Recorded calls: ("METHOD /path", form fields).
type Calls = Arc<Mutex<Vec<(String, Fields)>>>;

/// Catalog returned by the listing endpoint.
pub fn addon_catalog() -> serde_json::Value {
    json!([
        {
            "id": 7,
            "title": "LDAP Authentication",
            "summary": "Sign in with directory credentials",
            "prices": [{"currency": "USD", "amount": 299.0}],
            "links": {"description": "/api/v1/addon/7/description", "file": "/files/ldap.zip"}
        },
        {
            "id": 8,
            "title": "Claims",
            "type": "free",
            "version": null
        }
    ])
}

/// Running mock marketplace.
pub struct MockMarketplace {
    addr: SocketAddr,
    calls: Calls,
}

impl MockMarketplace {
    /// Starts a server on an ephemeral port.
    pub fn start() -> Self {
        let calls: Calls = Arc::default();
        let state = Arc::clone(&calls);
        let (addr_tx, addr_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build runtime");

            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("failed to bind mock marketplace");
                addr_tx
                    .send(listener.local_addr().expect("no local addr"))
                    .expect("test dropped before server start");
                axum::serve(listener, router(state))
                    .await
                    .expect("mock marketplace stopped");
            });
        });

        let addr = addr_rx.recv().expect("mock marketplace failed to start");
        Self { addr, calls }
    }

    /// Base URL of the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of calls recorded for "METHOD /path".
    pub fn hits(&self, call: &str) -> usize {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .iter()
            .filter(|(name, _)| name == call)
            .count()
    }

    /// Form fields of the latest call recorded for "METHOD /path".
    pub fn last_form(&self, call: &str) -> Option<Fields> {
        self.calls
            .lock()
            .expect("calls lock poisoned")
            .iter()
            .rev()
            .find(|(name, _)| name == call)
            .map(|(_, form)| form.clone())
    }
}

fn router(calls: Calls) -> Router {
    Router::new()
        .route("/api/v1/handshake", post(handshake))
        .route("/oauth/v2/token", post(token))
        .route("/api/v1/addon", get(list_addons))
        .route("/api/v1/addon/{id}/description", get(description))
        .route("/api/v1/addon/{id}/request", post(purchase))
        .route("/files/{name}", get(file))
        .route("/slow", get(slow))
        .with_state(calls)
}

fn record(calls: &Calls, call: impl Into<String>, form: &Fields) {
    calls
        .lock()
        .expect("calls lock poisoned")
        .push((call.into(), form.clone()));
}

fn field<'a>(form: &'a Fields, name: &str) -> &'a str {
    form.get(name).map(String::as_str).unwrap_or("")
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", ACCESS_TOKEN))
}

async fn handshake(State(calls): State<Calls>, Form(form): Form<Fields>) -> Response {
    record(&calls, "POST /api/v1/handshake", &form);

    if field(&form, "instanceId") == GOOD_INSTANCE && field(&form, "checksum") == GOOD_CHECKSUM {
        Json(json!({"clientId": CLIENT_ID, "clientSecret": CLIENT_SECRET})).into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn token(State(calls): State<Calls>, Form(form): Form<Fields>) -> Response {
    record(&calls, "POST /oauth/v2/token", &form);

    let valid = field(&form, "grant_type") == "client_credentials"
        && field(&form, "client_id") == CLIENT_ID
        && field(&form, "client_secret") == CLIENT_SECRET;
    if !valid {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid_client"}))).into_response();
    }

    Json(json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "bearer",
        "expires_in": 3600
    }))
    .into_response()
}

async fn list_addons(State(calls): State<Calls>, headers: HeaderMap) -> Response {
    record(&calls, "GET /api/v1/addon", &Fields::new());

    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(addon_catalog()).into_response()
}

async fn description(
    State(calls): State<Calls>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    record(&calls, format!("GET /api/v1/addon/{}/description", id), &Fields::new());

    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let text = format!("Add-on {} description", id);
    Json(json!({"id": id, "description": text})).into_response()
}

async fn file(State(calls): State<Calls>, Path(name): Path<String>, headers: HeaderMap) -> Response {
    record(&calls, format!("GET /files/{}", name), &Fields::new());

    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        ADDON_BYTES.to_vec(),
    )
        .into_response()
}

async fn purchase(
    State(calls): State<Calls>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<Fields>,
) -> Response {
    record(&calls, format!("POST /api/v1/addon/{}/request", id), &form);

    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if id == "sold-out" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"error": "add-on unavailable"})),
        )
            .into_response();
    }
    StatusCode::OK.into_response()
}

async fn slow(State(calls): State<Calls>) -> Response {
    record(&calls, "GET /slow", &Fields::new());
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({})).into_response()
}
