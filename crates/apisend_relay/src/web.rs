/*
 * SPDX-FileCopyrightText: 2026 apisend project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! HTTP surface: the relay endpoint, the collection endpoints, health, and
//! optional static panel assets.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::{from_fn, from_fn_with_state, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use apisend_protocol::{RequestSpec, SaveCollection};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn};

use crate::config::RelayConfig;
use crate::relay::{self, RelayBody, RelayError, RelayResponse};
use crate::store::{self, CollectionStore};

static REQ_ID: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> String {
    let id = REQ_ID.fetch_add(1, Ordering::Relaxed);
    format!("req-{id}")
}

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<RelayConfig>,
    pub http: reqwest::Client,
    pub store: CollectionStore,
}

pub fn build_router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/api/proxy", post(api_proxy))
        .route("/api/save-data", post(save_data))
        .route("/api/load-data", get(load_data))
        .route("/api/list-files", get(list_files))
        .route("/healthz", get(healthz));

    if let Some(dir) = &state.cfg.ui_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(axum::extract::DefaultBodyLimit::max(state.cfg.max_body_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
                let request_id = req
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("req");
                info_span!(
                    "http",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id
                )
            }),
        )
        .layer(from_fn_with_state(state.clone(), add_security_headers))
        .layer(from_fn(ensure_request_id))
        .with_state(state)
}

async fn ensure_request_id(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let headers = req.headers_mut();
    if headers.get("x-request-id").is_none() {
        let request_id = next_request_id();
        headers.insert(
            "x-request-id",
            HeaderValue::from_str(&request_id).unwrap_or_else(|_| HeaderValue::from_static("req")),
        );
    }
    next.run(req).await
}

async fn add_security_headers(
    State(state): State<AppState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(next_request_id);
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();
    headers.insert(
        "X-Request-Id",
        HeaderValue::from_str(&request_id).unwrap_or_else(|_| HeaderValue::from_static("req")),
    );
    headers
        .entry("X-Content-Type-Options")
        .or_insert(HeaderValue::from_static("nosniff"));
    headers
        .entry("X-Frame-Options")
        .or_insert(HeaderValue::from_static("DENY"));
    headers
        .entry("Referrer-Policy")
        .or_insert(HeaderValue::from_static("no-referrer"));
    if let Some(csp) = &state.cfg.csp {
        headers.insert(
            "Content-Security-Policy",
            HeaderValue::from_str(csp)
                .unwrap_or_else(|_| HeaderValue::from_static("default-src 'none'")),
        );
    }
    resp
}

/// Shared-key gate for the `/api/*` endpoints. Open when no key is set.
fn check_api_key(cfg: &RelayConfig, headers: &HeaderMap) -> Result<(), Response> {
    let Some(expected) = &cfg.api_key else {
        return Ok(());
    };
    let auth = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    match auth.strip_prefix("Bearer ") {
        Some(token) if token == expected => Ok(()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"message": "unauthorized"})),
        )
            .into_response()),
    }
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn api_proxy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(spec): Json<RequestSpec>,
) -> Response {
    if let Err(resp) = check_api_key(&state.cfg, &headers) {
        return resp;
    }
    match relay::forward(&state.http, &spec).await {
        Ok(reply) => {
            info!(
                method = %spec.method,
                url = %spec.url,
                status = reply.status,
                status_text = %reply.status_text,
                "forwarded"
            );
            render_relay_response(reply)
        }
        Err(err) => {
            warn!(
                method = %spec.method,
                url = %spec.url,
                status = err.status(),
                "forward failed: {err}"
            );
            render_relay_error(err)
        }
    }
}

fn render_relay_response(reply: RelayResponse) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    match reply.body {
        RelayBody::Json(v) => (status, Json(v)).into_response(),
        RelayBody::Text(t) => {
            let mut resp = (status, t).into_response();
            let ct = reply
                .content_type
                .as_deref()
                .and_then(|ct| HeaderValue::from_str(ct).ok())
                .unwrap_or_else(|| HeaderValue::from_static("text/plain; charset=utf-8"));
            resp.headers_mut().insert(axum::http::header::CONTENT_TYPE, ct);
            resp
        }
    }
}

fn render_relay_error(err: RelayError) -> Response {
    let status =
        StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match err.upstream_body() {
        Some(body) => (status, Json(body.clone())).into_response(),
        None => (
            status,
            Json(serde_json::json!({"message": err.message()})),
        )
            .into_response(),
    }
}

async fn save_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SaveCollection>,
) -> Response {
    if let Err(resp) = check_api_key(&state.cfg, &headers) {
        return resp;
    }
    if !store::is_valid_name(&req.filename) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "invalid filename"})),
        )
            .into_response();
    }
    match state.store.save(&req.filename, &req.data).await {
        Ok(()) => {
            info!(collection = %req.filename, entries = req.data.len(), "collection saved");
            (StatusCode::OK, Json(serde_json::json!({"message": "saved"}))).into_response()
        }
        Err(e) => {
            warn!(collection = %req.filename, "save failed: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "save failed"})),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoadQuery {
    filename: String,
}

async fn load_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<LoadQuery>,
) -> Response {
    if let Err(resp) = check_api_key(&state.cfg, &headers) {
        return resp;
    }
    if !store::is_valid_name(&q.filename) {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "invalid filename"})),
        )
            .into_response();
    }
    match state.store.load(&q.filename).await {
        Ok(Some(records)) => (StatusCode::OK, Json(records)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "not found"})),
        )
            .into_response(),
        Err(e) => {
            warn!(collection = %q.filename, "load failed: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "load failed"})),
            )
                .into_response()
        }
    }
}

async fn list_files(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Err(resp) = check_api_key(&state.cfg, &headers) {
        return resp;
    }
    match state.store.list().await {
        Ok(names) => (StatusCode::OK, Json(names)).into_response(),
        Err(e) => {
            warn!("list failed: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "list failed"})),
            )
                .into_response()
        }
    }
}
