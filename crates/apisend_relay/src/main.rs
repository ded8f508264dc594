/*
 * SPDX-FileCopyrightText: 2026 apisend project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use apisend_relay::{build_router, load_config, AppState, CollectionStore};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .init();

    let cfg = load_config();
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.http_timeout_secs))
        .connect_timeout(Duration::from_secs(cfg.http_connect_timeout_secs))
        .build()
        .expect("http client init");
    let store = CollectionStore::new(cfg.data_dir.clone(), cfg.collection_ext);

    let addr = cfg.bind;
    info!(
        data_dir = %cfg.data_dir.display(),
        collection_ext = cfg.collection_ext.as_str(),
        api_key = cfg.api_key.is_some(),
        "apisend_relay listening on http://{addr}"
    );
    if let Some(ui) = &cfg.ui_dir {
        info!(ui_dir = %ui.display(), "serving panel assets");
    }

    let state = AppState {
        cfg: Arc::new(cfg),
        http,
        store,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down");
}
