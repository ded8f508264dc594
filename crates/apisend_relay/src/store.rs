/*
 * SPDX-FileCopyrightText: 2026 apisend project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! File-backed storage of named request collections. One collection is one
//! JSON file in the data directory; the extension comes from config.

use anyhow::{Context, Result};
use apisend_protocol::StoredRequest;
use std::path::{Path, PathBuf};

use crate::config::CollectionExt;

#[derive(Debug, Clone)]
pub struct CollectionStore {
    dir: PathBuf,
    ext: CollectionExt,
}

/// Names are plain identifiers, never paths. Dots are allowed inside a name
/// but not at the front, so hidden files and `..` stay unreachable.
pub fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.len() > 128 || name.starts_with('.') {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
}

impl CollectionStore {
    pub fn new(dir: impl Into<PathBuf>, ext: CollectionExt) -> Self {
        Self {
            dir: dir.into(),
            ext,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{}", self.ext.as_str()))
    }

    /// Collection names present on disk, sorted. A missing data directory is
    /// an empty store, not an error.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut rd = match tokio::fs::read_dir(&self.dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("read data dir"),
        };
        let suffix = format!(".{}", self.ext.as_str());
        let mut names = Vec::new();
        while let Some(entry) = rd.next_entry().await.context("read data dir entry")? {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if let Some(stem) = file_name.strip_suffix(&suffix) {
                if is_valid_name(stem) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// `None` when no collection of that name exists.
    pub async fn load(&self, name: &str) -> Result<Option<Vec<StoredRequest>>> {
        let path = self.path_for(name);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context(format!("read collection {name}")),
        };
        let records: Vec<StoredRequest> =
            serde_json::from_str(&raw).context(format!("parse collection {name}"))?;
        Ok(Some(records))
    }

    pub async fn save(&self, name: &str, records: &[StoredRequest]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .context("create data dir")?;
        let raw = serde_json::to_string_pretty(records).context("encode collection")?;
        tokio::fs::write(self.path_for(name), raw)
            .await
            .context(format!("write collection {name}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apisend_protocol::{EntryAccess, EntryDisplay};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    static DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn temp_store(ext: CollectionExt) -> CollectionStore {
        let n = DIR_SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "apisend_store_test_{}_{n}",
            std::process::id()
        ));
        CollectionStore::new(dir, ext)
    }

    fn record(name: &str) -> StoredRequest {
        StoredRequest {
            name: name.to_string(),
            endpoint: "https://api.test/items".to_string(),
            method: "POST".to_string(),
            headers: HashMap::new(),
            body: r#"{"q":1}"#.to_string(),
            access: EntryAccess::Locked,
            display: EntryDisplay::Collapsed,
        }
    }

    #[test]
    fn name_validation() {
        assert!(is_valid_name("smoke-tests_v2.1"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name(".hidden"));
        assert!(!is_valid_name("../escape"));
        assert!(!is_valid_name("a/b"));
        assert!(!is_valid_name("a\\b"));
        assert!(!is_valid_name(&"x".repeat(129)));
    }

    #[tokio::test]
    async fn save_load_round_trip_keeps_entry_state() {
        let store = temp_store(CollectionExt::Json);
        store.save("regression", &[record("create item")]).await.unwrap();

        let loaded = store.load("regression").await.unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "create item");
        assert_eq!(loaded[0].access, EntryAccess::Locked);
        assert_eq!(loaded[0].display, EntryDisplay::Collapsed);

        let _ = tokio::fs::remove_dir_all(store.dir()).await;
    }

    #[tokio::test]
    async fn load_missing_is_none_and_empty_dir_lists_nothing() {
        let store = temp_store(CollectionExt::Json);
        assert!(store.load("nope").await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_only_matches_configured_extension() {
        let store = temp_store(CollectionExt::Txt);
        store.save("legacy", &[record("ping")]).await.unwrap();
        tokio::fs::write(store.dir().join("other.json"), "[]")
            .await
            .unwrap();

        let names = store.list().await.unwrap();
        assert_eq!(names, vec!["legacy".to_string()]);

        let _ = tokio::fs::remove_dir_all(store.dir()).await;
    }
}
