//! Persistent Storage Abstraction
//!
//! Durable payload storage addressed by a namespace `key` and an optional
//! `id` inside that namespace, the shape used by mobile key-value stores
//! (AsyncStorage, SharedPreferences, UserDefaults).

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::error::Result;

/// Address of a stored payload.
///
/// The core hands over keys that are already encoded; stores compare them
/// byte-for-byte and never need to decode them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    pub key: String,
    pub id: Option<String>,
}

impl StorageKey {
    /// Build a key. An empty `id` is the same as no id.
    pub fn new(key: impl Into<String>, id: Option<impl Into<String>>) -> Self {
        let id: Option<String> = id.map(Into::into).filter(|id| !id.is_empty());
        Self {
            key: key.into(),
            id,
        }
    }

    /// Key addressing the namespace entry itself.
    pub fn namespace(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            id: None,
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}#{}", self.key, id),
            None => f.write_str(&self.key),
        }
    }
}

/// Durable key/id keyed payload store
///
/// # Contract
///
/// - `load` returns [`BridgeError::NotFound`](crate::BridgeError::NotFound)
///   when nothing is stored under the key
/// - `save` replaces any previous payload and completes only once the data
///   is durable
/// - `clear` removes the namespace entry and every id stored under `key`
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::{PersistentStore, StorageKey};
///
/// async fn remember(store: &dyn PersistentStore) -> Result<()> {
///     let key = StorageKey::new("LESSON", Some("2018-1"));
///     store.save(&key, &serde_json::json!({"title": "Genesis"})).await
/// }
/// ```
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Load the payload stored under `key`
    async fn load(&self, key: &StorageKey) -> Result<Value>;

    /// Store `raw_data` under `key`
    async fn save(&self, key: &StorageKey, raw_data: &Value) -> Result<()>;

    /// Remove everything stored in the `key` namespace
    async fn clear(&self, key: &str) -> Result<()>;
}
