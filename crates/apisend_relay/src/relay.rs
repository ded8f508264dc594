/*
 * SPDX-FileCopyrightText: 2026 apisend project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! The forwarding core: one caller-described request in, the upstream's
//! response (or a normalized failure) out. Stateless; every call is
//! independent and concurrent calls share nothing but the reqwest client.

use apisend_protocol::RequestSpec;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use std::collections::HashMap;
use std::time::Duration;

/// Upstream response passed through verbatim. Any upstream status, 4xx and
/// 5xx included, lands here; only transport-level failure is an error.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: u16,
    pub status_text: String,
    pub content_type: Option<String>,
    pub body: RelayBody,
}

#[derive(Debug, Clone)]
pub enum RelayBody {
    Json(serde_json::Value),
    Text(String),
}

/// A forward that never produced a usable upstream response.
#[derive(Debug)]
pub enum RelayError {
    /// Bad RequestSpec; rejected before any network I/O.
    Invalid(String),
    /// The per-call or client-wide deadline fired.
    Timeout(String),
    /// DNS, connect, reset, or a body read that died mid-flight. `status`
    /// is set when a partial response was received before the failure.
    Transport {
        status: Option<u16>,
        message: String,
        body: Option<serde_json::Value>,
    },
}

impl RelayError {
    pub fn status(&self) -> u16 {
        match self {
            RelayError::Invalid(_) => 400,
            RelayError::Timeout(_) => 504,
            RelayError::Transport { status, .. } => status.unwrap_or(500),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RelayError::Invalid(m) | RelayError::Timeout(m) => m,
            RelayError::Transport { message, .. } => message,
        }
    }

    pub fn upstream_body(&self) -> Option<&serde_json::Value> {
        match self {
            RelayError::Transport { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for RelayError {}

fn parse_method(s: &str) -> Option<reqwest::Method> {
    match s.to_ascii_uppercase().as_str() {
        "GET" => Some(reqwest::Method::GET),
        "POST" => Some(reqwest::Method::POST),
        "PUT" => Some(reqwest::Method::PUT),
        "DELETE" => Some(reqwest::Method::DELETE),
        "PATCH" => Some(reqwest::Method::PATCH),
        "HEAD" => Some(reqwest::Method::HEAD),
        "OPTIONS" => Some(reqwest::Method::OPTIONS),
        _ => None,
    }
}

fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap, RelayError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (k, v) in headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .map_err(|_| RelayError::Invalid(format!("invalid header name: {k}")))?;
        let value = HeaderValue::from_str(v)
            .map_err(|_| RelayError::Invalid(format!("invalid value for header {k}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// A body is sent raw (not JSON-encoded) only when the caller both set a
/// non-JSON Content-Type and passed the body as a plain string.
fn raw_body(headers: &HeaderMap, data: &serde_json::Value) -> Option<String> {
    let ct = headers.get(CONTENT_TYPE)?.to_str().ok()?;
    if ct.to_ascii_lowercase().contains("json") {
        return None;
    }
    data.as_str().map(|s| s.to_string())
}

fn error_chain(e: &dyn std::error::Error) -> String {
    let mut msg = e.to_string();
    let mut src = e.source();
    while let Some(s) = src {
        msg.push_str(": ");
        msg.push_str(&s.to_string());
        src = s.source();
    }
    msg
}

fn classify_send_error(e: reqwest::Error) -> RelayError {
    if e.is_timeout() {
        return RelayError::Timeout(format!("upstream request timed out: {}", error_chain(&e)));
    }
    RelayError::Transport {
        status: e.status().map(|s| s.as_u16()),
        message: error_chain(&e),
        body: None,
    }
}

fn is_json_content_type(ct: Option<&str>) -> bool {
    ct.map(|c| c.to_ascii_lowercase().contains("json"))
        .unwrap_or(false)
}

/// Forward `spec` to its target and return the upstream's answer unchanged
/// in shape. Validation failures never reach the network.
pub async fn forward(
    client: &reqwest::Client,
    spec: &RequestSpec,
) -> Result<RelayResponse, RelayError> {
    let url = reqwest::Url::parse(&spec.url)
        .map_err(|e| RelayError::Invalid(format!("invalid url {:?}: {e}", spec.url)))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(RelayError::Invalid(format!(
            "unsupported url scheme: {}",
            url.scheme()
        )));
    }
    let method = parse_method(&spec.method)
        .ok_or_else(|| RelayError::Invalid(format!("unsupported method: {}", spec.method)))?;
    let headers = build_headers(&spec.headers)?;

    let mut req = client.request(method, url).headers(headers.clone());
    if let Some(data) = &spec.data {
        req = match raw_body(&headers, data) {
            Some(text) => req.body(text),
            None => req.json(data),
        };
    }
    if let Some(ms) = spec.timeout_ms {
        req = req.timeout(Duration::from_millis(ms));
    }

    let resp = req.send().await.map_err(classify_send_error)?;
    let status = resp.status();
    let status_text = status.canonical_reason().unwrap_or_default().to_string();
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let bytes = match resp.bytes().await {
        Ok(b) => b,
        Err(e) => {
            if e.is_timeout() {
                return Err(RelayError::Timeout(format!(
                    "upstream body read timed out: {}",
                    error_chain(&e)
                )));
            }
            // Partial response: keep the status we already have.
            return Err(RelayError::Transport {
                status: Some(status.as_u16()),
                message: error_chain(&e),
                body: None,
            });
        }
    };

    let body = if is_json_content_type(content_type.as_deref()) {
        match serde_json::from_slice(&bytes) {
            Ok(v) => RelayBody::Json(v),
            Err(_) => RelayBody::Text(String::from_utf8_lossy(&bytes).into_owned()),
        }
    } else {
        RelayBody::Text(String::from_utf8_lossy(&bytes).into_owned())
    };

    Ok(RelayResponse {
        status: status.as_u16(),
        status_text,
        content_type,
        body,
    })
}
