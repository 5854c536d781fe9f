//! # Data Context
//!
//! Process-wide state shared by every load and save: the bridges, the
//! network client, the offline snapshot, the in-memory cache tier and the
//! per-key locks. Built once from [`CoreConfig`] and shared by `Arc`.

use crate::locks::KeyLocks;
use crate::network::NetworkClient;
use crate::reporter::ErrorReporter;
use crate::snapshot::OfflineSnapshot;
use bridge_traits::{PersistentStore, SessionContext};
use core_runtime::config::{CoreConfig, ReplicationConfig};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Process-lifetime cache tier, keyed by model key string.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Value>>,
}

impl MemoryCache {
    pub fn get(&self, key_string: &str) -> Option<Value> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key_string)
            .cloned()
    }

    pub fn insert(&self, key_string: impl Into<String>, value: Value) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key_string.into(), value);
    }

    /// Drop `model_key` and every `model_key/...` entry. Returns how many went.
    pub fn purge_model(&self, model_key: &str) -> usize {
        let prefix = format!("{}/", model_key);
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = entries.len();
        entries.retain(|key, _| key != model_key && !key.starts_with(&prefix));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct DataContext {
    store: Arc<dyn PersistentStore>,
    session: Arc<dyn SessionContext>,
    network: Arc<NetworkClient>,
    reporter: ErrorReporter,
    snapshot: OfflineSnapshot,
    memory: MemoryCache,
    locks: KeyLocks,
    replication: ReplicationConfig,
    default_language: String,
}

impl DataContext {
    pub fn new(config: &CoreConfig, snapshot: OfflineSnapshot) -> Self {
        let network = NetworkClient::new(
            Arc::clone(&config.http_client),
            config.device_identity.clone(),
            Arc::clone(&config.notifier),
            config.request_timeout,
        );

        Self {
            store: Arc::clone(&config.persistent_store),
            session: Arc::clone(&config.session_context),
            network: Arc::new(network),
            reporter: ErrorReporter::new(Arc::clone(&config.notifier)),
            snapshot,
            memory: MemoryCache::default(),
            locks: KeyLocks::new(),
            replication: config.replication,
            default_language: config.default_language.clone(),
        }
    }

    pub fn store(&self) -> &Arc<dyn PersistentStore> {
        &self.store
    }

    pub fn network(&self) -> &Arc<NetworkClient> {
        &self.network
    }

    pub fn reporter(&self) -> &ErrorReporter {
        &self.reporter
    }

    pub fn snapshot(&self) -> &OfflineSnapshot {
        &self.snapshot
    }

    pub fn memory(&self) -> &MemoryCache {
        &self.memory
    }

    pub fn locks(&self) -> &KeyLocks {
        &self.locks
    }

    pub fn replication(&self) -> ReplicationConfig {
        self.replication
    }

    /// Session language, or the configured default when the session has none.
    pub fn language(&self) -> String {
        let language = self.session.language();
        if language.trim().is_empty() {
            self.default_language.clone()
        } else {
            language
        }
    }

    pub fn is_offline_mode(&self) -> bool {
        self.session.is_offline_mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_purge_matches_whole_model_key() {
        let memory = MemoryCache::default();
        memory.insert("LESSON", json!(0));
        memory.insert("LESSON/1", json!(1));
        memory.insert("LESSON/2?lang=eng", json!(2));
        memory.insert("LESSONS/1", json!(3));

        assert_eq!(memory.purge_model("LESSON"), 3);
        assert_eq!(memory.get("LESSONS/1"), Some(json!(3)));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn test_memory_insert_replaces() {
        let memory = MemoryCache::default();
        memory.insert("BOOK", json!("old"));
        memory.insert("BOOK", json!("new"));

        assert_eq!(memory.get("BOOK"), Some(json!("new")));
        assert!(memory.get("PASSAGE").is_none());
    }
}
