/*
 * SPDX-FileCopyrightText: 2026 apisend project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One outbound request as submitted to the relay endpoint.
///
/// `headers` keys are unique as given; case-insensitive merging is left to
/// the transport. `data`, when present, is sent as a JSON body unless the
/// caller's own `Content-Type` header says otherwise and `data` is a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSpec {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    /// Per-call deadline in milliseconds. Overrides the relay's client-wide
    /// timeout for this call only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Whether a saved entry accepts edits in the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryAccess {
    #[default]
    Editable,
    Locked,
    Disabled,
}

/// Whether a saved entry is shown expanded or folded away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDisplay {
    #[default]
    Expanded,
    Collapsed,
}

/// One entry of a saved request collection, as the panel persists it.
///
/// `body` is the entry's JSON body kept as serialized text so that a
/// half-written body survives a save/load round trip unchanged. Records
/// written before the state enums existed load with the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRequest {
    #[serde(default)]
    pub name: String,
    pub endpoint: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub access: EntryAccess,
    #[serde(default)]
    pub display: EntryDisplay,
}

/// Body of a save call: collection name plus its entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveCollection {
    pub filename: String,
    pub data: Vec<StoredRequest>,
}
