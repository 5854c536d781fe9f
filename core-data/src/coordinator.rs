//! # Cache Coordinator
//!
//! Runs the load and save pipelines across the cache tiers.
//!
//! ## Load
//!
//! 1. Append the session language to the id for language-aware models
//! 2. Build the key string (`KEY` or `KEY/id`)
//! 3. Offline mode with remote backing: serve a snapshot hit straight away;
//!    a miss falls through
//! 4. Fetch from the network (silently); on success remember the payload in
//!    the model's tier and return it
//! 5. On network failure read the model's tier instead
//!
//! Only a missing model fails a load. Every other problem degrades to the
//! next tier and, at worst, to `Ok(None)`.
//!
//! ## Save
//!
//! The payload is written to the persistent store and the write is awaited.
//! On success it is submitted to the [`ReplicationQueue`] without waiting
//! for delivery. A failed store write is returned and nothing is replicated.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let coordinator = CacheCoordinator::new(context, Arc::new(NoopReplicator));
//! let lesson = registry.get("Lesson");
//!
//! coordinator.save(json!({"q1": "answer"}), registry.get("Answer"), Some("2018-1")).await?;
//! let payload = coordinator.load(lesson, Some("2018-1")).await?;
//! ```

use crate::context::DataContext;
use crate::error::{DataError, Result};
use crate::key_codec::{encode, storage_key};
use crate::models::{CachePolicy, Model};
use crate::query;
use crate::replication::{RemoteReplicator, ReplicationQueue};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::task::TaskTracker;
use tracing::{debug, instrument, warn};

pub struct CacheCoordinator {
    context: Arc<DataContext>,
    queue: ReplicationQueue,
    write_behind: TaskTracker,
}

impl CacheCoordinator {
    pub fn new(context: Arc<DataContext>, replicator: Arc<dyn RemoteReplicator>) -> Self {
        let queue = ReplicationQueue::new(replicator, context.replication());
        Self {
            context,
            queue,
            write_behind: TaskTracker::new(),
        }
    }

    pub fn context(&self) -> &Arc<DataContext> {
        &self.context
    }

    pub fn queue(&self) -> &ReplicationQueue {
        &self.queue
    }

    /// Load the payload for `model`/`id` from the best available tier.
    ///
    /// # Errors
    ///
    /// `Validation` when `model` is `None`. Nothing else fails a load.
    #[instrument(skip(self, model), fields(model = ?model.map(Model::key)))]
    pub async fn load(&self, model: Option<&Model>, id: Option<&str>) -> Result<Option<Value>> {
        let model = require_model(model)?;
        let id = id.filter(|id| !id.is_empty());

        let id = if model.use_language() {
            Some(query::with_language(id, &self.context.language()))
        } else {
            id.map(str::to_string)
        };
        let id = id.as_deref();
        let key_string = model.key_string(id);

        debug!(key = %key_string, "Start load");

        if model.has_remote() && self.context.is_offline_mode() {
            let language = self.context.language();
            if let Some(value) = self.context.snapshot().get(&language, &key_string) {
                debug!(key = %key_string, language = %language, "Offline snapshot hit");
                return Ok(Some(value.clone()));
            }
            debug!(key = %key_string, language = %language, "Offline snapshot miss");
        }

        if let Some(value) = self.context.network().load_from_cloud(model, id, true).await {
            self.remember(model, id, &key_string, &value);
            debug!(key = %key_string, "Finished load from network");
            return Ok(Some(value));
        }

        debug!(key = %key_string, policy = %model.cache_policy(), "Network load failed, reading cache");
        Ok(self.recall(model, id, &key_string).await)
    }

    /// Store `payload` durably, then schedule its replication.
    ///
    /// # Errors
    ///
    /// - `Validation` when `model` is `None`
    /// - `Storage` when the persistent write fails
    #[instrument(skip(self, payload, model), fields(model = ?model.map(Model::key)))]
    pub async fn save(&self, payload: Value, model: Option<&Model>, id: Option<&str>) -> Result<()> {
        let model = require_model(model)?;
        let id = id.filter(|id| !id.is_empty());
        let key = storage_key(model.key(), id);

        {
            let _guard = self.context.locks().lock(&key).await;
            self.context
                .store()
                .save(&key, &payload)
                .await
                .map_err(DataError::from_store)?;
        }

        debug!(key = %key, "Saved to storage");
        self.queue.submit(payload, model, id);
        Ok(())
    }

    /// Drop everything stored for `model`, durable and in memory.
    #[instrument(skip(self, model), fields(model = ?model.map(Model::key)))]
    pub async fn clear(&self, model: Option<&Model>) -> Result<()> {
        let model = require_model(model)?;

        self.context
            .store()
            .clear(&encode(model.key()))
            .await
            .map_err(DataError::from_store)?;

        let purged = self.context.memory().purge_model(model.key());
        debug!(purged, "Cleared storage");
        Ok(())
    }

    /// Wait for every write-behind started by earlier loads.
    pub async fn settle(&self) {
        self.write_behind.close();
        self.write_behind.wait().await;
        self.write_behind.reopen();
    }

    /// Number of write-behinds still running.
    pub fn pending_write_behinds(&self) -> usize {
        self.write_behind.len()
    }

    /// Deliver pending replications now.
    pub async fn flush(&self) {
        self.queue.flush().await;
    }

    fn remember(&self, model: &Model, id: Option<&str>, key_string: &str, value: &Value) {
        match model.cache_policy() {
            CachePolicy::None => {}
            CachePolicy::Memory => self.context.memory().insert(key_string, value.clone()),
            CachePolicy::Persistent => {
                let store = Arc::clone(self.context.store());
                let locks = self.context.locks().clone();
                let key = storage_key(model.key(), id);
                let value = value.clone();

                self.write_behind.spawn(async move {
                    let _guard = locks.lock(&key).await;
                    if let Err(err) = store.save(&key, &value).await {
                        warn!(key = %key, error = %err, "Write-behind to storage failed");
                    }
                });
            }
        }
    }

    async fn recall(&self, model: &Model, id: Option<&str>, key_string: &str) -> Option<Value> {
        match model.cache_policy() {
            CachePolicy::None => None,
            CachePolicy::Memory => self.context.memory().get(key_string),
            CachePolicy::Persistent => {
                let key = storage_key(model.key(), id);
                let _guard = self.context.locks().lock(&key).await;

                match self.context.store().load(&key).await {
                    Ok(value) => Some(value),
                    Err(err) if err.is_not_found() => {
                        debug!(key = %key, "Nothing in storage");
                        None
                    }
                    Err(err) => {
                        warn!(key = %key, error = %err, "Failed to read from storage");
                        None
                    }
                }
            }
        }
    }
}

fn require_model(model: Option<&Model>) -> Result<&Model> {
    model.ok_or_else(|| DataError::Validation("model is not defined".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_model() {
        assert!(matches!(require_model(None), Err(DataError::Validation(_))));

        let model = Model::new("BOOK", "", CachePolicy::None);
        assert_eq!(require_model(Some(&model)).unwrap().key(), "BOOK");
    }
}
