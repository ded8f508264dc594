/*
 * SPDX-FileCopyrightText: 2026 apisend project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use std::net::SocketAddr;
use std::path::PathBuf;

/// On-disk format for saved collections.
///
/// Historically collections were written both as `.txt` and `.json`; the
/// extension is now a single explicit setting so old data stays readable.
/// The file content is JSON either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionExt {
    Json,
    Txt,
}

impl CollectionExt {
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionExt::Json => "json",
            CollectionExt::Txt => "txt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "json" => Some(CollectionExt::Json),
            "txt" => Some(CollectionExt::Txt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    pub ui_dir: Option<PathBuf>,
    pub collection_ext: CollectionExt,
    pub api_key: Option<String>,
    pub csp: Option<String>,
    pub max_body_bytes: usize,
    pub http_timeout_secs: u64,
    pub http_connect_timeout_secs: u64,
}

pub fn load_config() -> RelayConfig {
    let bind = std::env::var("APISEND_BIND").unwrap_or_else(|_| "0.0.0.0:7449".to_string());
    let bind: SocketAddr = bind.parse().expect("APISEND_BIND invalid");
    let data_dir = std::env::var("APISEND_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"));
    let ui_dir = std::env::var("APISEND_UI_DIR")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from);
    let collection_ext = std::env::var("APISEND_COLLECTION_EXT")
        .ok()
        .map(|v| CollectionExt::parse(&v).expect("APISEND_COLLECTION_EXT invalid"))
        .unwrap_or(CollectionExt::Json);
    let api_key = std::env::var("APISEND_API_KEY")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let csp = std::env::var("APISEND_CSP")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let max_body_bytes = std::env::var("APISEND_MAX_BODY_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(16 * 1024 * 1024);
    let http_timeout_secs = std::env::var("APISEND_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(30)
        .clamp(1, 300);
    let http_connect_timeout_secs = std::env::var("APISEND_HTTP_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(10)
        .clamp(1, 60);

    RelayConfig {
        bind,
        data_dir,
        ui_dir,
        collection_ext,
        api_key,
        csp,
        max_body_bytes,
        http_timeout_secs,
        http_connect_timeout_secs,
    }
}
