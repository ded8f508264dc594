/*
 * SPDX-FileCopyrightText: 2026 apisend project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod config;
pub mod relay;
pub mod store;
pub mod web;

pub use config::{load_config, CollectionExt, RelayConfig};
pub use relay::{forward, RelayBody, RelayError, RelayResponse};
pub use store::CollectionStore;
pub use web::{build_router, AppState};
