/*
 * SPDX-FileCopyrightText: 2026 apisend project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#![allow(dead_code)]

use apisend_relay::{build_router, AppState, CollectionExt, CollectionStore, RelayConfig};
use axum::{
    http::StatusCode,
    routing::{any, get},
    Json, Router,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

pub fn temp_data_dir() -> PathBuf {
    let n = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("apisend_it_{}_{n}", std::process::id()))
}

pub fn test_config(data_dir: PathBuf) -> RelayConfig {
    RelayConfig {
        bind: "127.0.0.1:0".parse().unwrap(),
        data_dir,
        ui_dir: None,
        collection_ext: CollectionExt::Json,
        api_key: None,
        csp: None,
        max_body_bytes: 1024 * 1024,
        http_timeout_secs: 10,
        http_connect_timeout_secs: 5,
    }
}

pub async fn spawn_app(cfg: RelayConfig) -> u16 {
    let http = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(cfg.http_timeout_secs))
        .connect_timeout(Duration::from_secs(cfg.http_connect_timeout_secs))
        .build()
        .unwrap();
    let store = CollectionStore::new(cfg.data_dir.clone(), cfg.collection_ext);
    let app = build_router(AppState {
        cfg: Arc::new(cfg),
        http,
        store,
    });
    serve(app).await
}

/// Mock upstream the relay forwards to in tests.
pub async fn spawn_upstream() -> u16 {
    let app = Router::new()
        .route(
            "/missing",
            get(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(serde_json::json!({"error": "not found"})),
                )
            }),
        )
        .route(
            "/plain",
            get(|| async {
                (
                    StatusCode::CREATED,
                    [("content-type", "text/plain; charset=utf-8")],
                    "hello there",
                )
            }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        )
        .route("/echo", any(echo));
    serve(app).await
}

async fn echo(
    method: axum::http::Method,
    headers: axum::http::HeaderMap,
    body: String,
) -> Json<serde_json::Value> {
    let probe = headers
        .get("x-probe")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let body_json: serde_json::Value =
        serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));
    Json(serde_json::json!({
        "method": method.as_str(),
        "probe": probe,
        "body": body_json,
    }))
}

async fn serve(app: Router) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    port
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub async fn proxy(port: u16, payload: serde_json::Value) -> reqwest::Response {
    client()
        .post(format!("http://127.0.0.1:{port}/api/proxy"))
        .json(&payload)
        .send()
        .await
        .unwrap()
}
