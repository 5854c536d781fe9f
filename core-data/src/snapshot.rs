//! # Offline Snapshot
//!
//! Read-only payloads bundled with the app, one set per supported language,
//! served while the session is in offline mode.
//!
//! Each language is a JSON object mapping a model key string (`KEY` or
//! `KEY/id`) to its payload. On disk the sets live side by side as
//! `<lang>_cache.json`.

use crate::error::{DataError, Result};
use core_runtime::logging::strip_path;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Languages a snapshot can be bundled for.
pub const SNAPSHOT_LANGUAGES: &[&str] = &["chs", "cht", "eng", "spa"];

/// File name of the snapshot for `language`.
pub fn snapshot_file_name(language: &str) -> String {
    format!("{}_cache.json", language)
}

/// Language-partitioned bundled payloads.
#[derive(Debug, Clone, Default)]
pub struct OfflineSnapshot {
    languages: HashMap<String, Map<String, Value>>,
}

impl OfflineSnapshot {
    /// Snapshot with no entries; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add (or replace) the entries for one language.
    pub fn with_entries(mut self, language: impl Into<String>, entries: Map<String, Value>) -> Self {
        self.languages.insert(language.into(), entries);
        self
    }

    /// Parse one language's snapshot document.
    pub fn with_json(self, language: impl Into<String>, document: &str) -> Result<Self> {
        let language = language.into();
        let entries = parse_document(&language, document)?;
        Ok(self.with_entries(language, entries))
    }

    /// Read `<lang>_cache.json` for every supported language under `dir`.
    ///
    /// Missing files are skipped; a file that is not a JSON object fails
    /// the whole load.
    pub async fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut snapshot = Self::empty();

        for language in SNAPSHOT_LANGUAGES {
            let path: PathBuf = dir.join(snapshot_file_name(language));
            let document = match tokio::fs::read_to_string(&path).await {
                Ok(document) => document,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                    warn!(
                        language = *language,
                        file = %strip_path(&path.to_string_lossy()),
                        "No offline snapshot bundled"
                    );
                    continue;
                }
                Err(err) => {
                    return Err(DataError::Snapshot(format!(
                        "failed to read {}: {}",
                        path.display(),
                        err
                    )))
                }
            };

            snapshot = snapshot.with_json(*language, &document)?;
            debug!(
                language = *language,
                entries = snapshot.len(language),
                "Loaded offline snapshot"
            );
        }

        Ok(snapshot)
    }

    /// Bundled payload for `key_string`, if any. Unknown languages always miss.
    pub fn get(&self, language: &str, key_string: &str) -> Option<&Value> {
        self.languages
            .get(language)
            .and_then(|entries| entries.get(key_string))
            // A bundled null counts as no entry.
            .filter(|value| !value.is_null())
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    pub fn len(&self, language: &str) -> usize {
        self.languages.get(language).map_or(0, Map::len)
    }

    pub fn is_empty(&self) -> bool {
        self.languages.values().all(Map::is_empty)
    }
}

fn parse_document(language: &str, document: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(document) {
        Ok(Value::Object(entries)) => Ok(entries),
        Ok(_) => Err(DataError::Snapshot(format!(
            "snapshot for {} is not a JSON object",
            language
        ))),
        Err(err) => Err(DataError::Snapshot(format!(
            "snapshot for {} is not valid JSON: {}",
            language, err
        ))),
    }
}
