//! # Replication Queue
//!
//! Debounced delivery of local writes to the remote service.
//!
//! ## Overview
//!
//! Every successful save submits its payload here. Submissions are grouped
//! by a debounce key; each new submission for a key replaces the pending
//! one and restarts its quiet window. Once a window passes with no further
//! submissions, the latest payload for that key is handed to the
//! [`RemoteReplicator`] exactly once.
//!
//! With [`ReplicationScope::PerTarget`] the key is the `(model key, id)`
//! target, so bursts to different targets never drop each other. With
//! [`ReplicationScope::Global`] one timer covers every target and only the
//! last submission of a burst is delivered.
//!
//! Delivery failures are logged and dropped; there is no retry.

use crate::error::{DataError, Result};
use crate::models::Model;
use crate::network::NetworkClient;
use async_trait::async_trait;
use bridge_traits::HttpMethod;
use core_runtime::config::{ReplicationConfig, ReplicationScope};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Sends a saved payload to the remote service.
#[async_trait]
pub trait RemoteReplicator: Send + Sync {
    async fn replicate(&self, payload: &Value, model: &Model, id: Option<&str>) -> Result<()>;
}

/// Accepts every payload and sends nothing.
#[derive(Debug, Clone, Default)]
pub struct NoopReplicator;

#[async_trait]
impl RemoteReplicator for NoopReplicator {
    async fn replicate(&self, _payload: &Value, model: &Model, id: Option<&str>) -> Result<()> {
        debug!(model = model.key(), id = ?id, "Replication disabled, dropping payload");
        Ok(())
    }
}

/// `PUT`s the payload to the model's remote address.
pub struct HttpReplicator {
    network: Arc<NetworkClient>,
}

impl HttpReplicator {
    pub fn new(network: Arc<NetworkClient>) -> Self {
        Self { network }
    }
}

#[async_trait]
impl RemoteReplicator for HttpReplicator {
    async fn replicate(&self, payload: &Value, model: &Model, id: Option<&str>) -> Result<()> {
        let url = model.url(id).ok_or_else(|| {
            DataError::Replication(format!("model {} has no remote backing", model.key()))
        })?;

        let result = self
            .network
            .call_web_service(&url, "", HttpMethod::Put, &[], Some(payload))
            .await;

        if result.is_success() {
            return Ok(());
        }

        Err(DataError::Replication(match result.status {
            Some(status) => format!("HTTP status {}", status),
            None => "no response".to_string(),
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum DebounceKey {
    Global,
    Target { key: String, id: Option<String> },
}

#[derive(Debug, Clone)]
struct Submission {
    payload: Value,
    model: Model,
    id: Option<String>,
}

struct Pending {
    generation: u64,
    submission: Submission,
    timer: JoinHandle<()>,
}

struct QueueInner {
    replicator: Arc<dyn RemoteReplicator>,
    window: Duration,
    scope: ReplicationScope,
    pending: Mutex<HashMap<DebounceKey, Pending>>,
    next_generation: AtomicU64,
}

impl QueueInner {
    fn pending(&self) -> MutexGuard<'_, HashMap<DebounceKey, Pending>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Remove the entry for `key` if it still belongs to `generation`.
    fn take_if_current(&self, key: &DebounceKey, generation: u64) -> Option<Submission> {
        let mut pending = self.pending();
        match pending.get(key) {
            Some(entry) if entry.generation == generation => {
                pending.remove(key).map(|entry| entry.submission)
            }
            _ => None,
        }
    }

    async fn deliver(&self, submission: Submission) {
        let Submission { payload, model, id } = submission;
        debug!(model = model.key(), id = ?id, "Replicating payload");

        if let Err(err) = self
            .replicator
            .replicate(&payload, &model, id.as_deref())
            .await
        {
            warn!(model = model.key(), id = ?id, error = %err, "Replication failed");
        }
    }
}

/// Trailing-edge debouncer in front of a [`RemoteReplicator`].
#[derive(Clone)]
pub struct ReplicationQueue {
    inner: Arc<QueueInner>,
}

impl ReplicationQueue {
    pub fn new(replicator: Arc<dyn RemoteReplicator>, config: ReplicationConfig) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                replicator,
                window: config.debounce_window(),
                scope: config.scope,
                pending: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn window(&self) -> Duration {
        self.inner.window
    }

    pub fn scope(&self) -> ReplicationScope {
        self.inner.scope
    }

    /// Schedule `payload` for replication after the quiet window.
    ///
    /// Returns immediately. Models without remote backing are ignored. Must
    /// be called from within a Tokio runtime; outside one the submission is
    /// dropped with a warning.
    pub fn submit(&self, payload: Value, model: &Model, id: Option<&str>) {
        if !model.has_remote() {
            debug!(model = model.key(), "No remote backing, skipping replication");
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(model = model.key(), "No async runtime, replication skipped");
            return;
        };

        let id = id.filter(|id| !id.is_empty()).map(str::to_string);
        let key = match self.inner.scope {
            ReplicationScope::Global => DebounceKey::Global,
            ReplicationScope::PerTarget => DebounceKey::Target {
                key: model.key().to_string(),
                id: id.clone(),
            },
        };
        let submission = Submission {
            payload,
            model: model.clone(),
            id,
        };

        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);

        // The timer may only inspect the map after its own entry is in place.
        let mut pending = self.inner.pending();

        let inner = Arc::clone(&self.inner);
        let timer_key = key.clone();
        let timer = handle.spawn(async move {
            tokio::time::sleep(inner.window).await;
            if let Some(submission) = inner.take_if_current(&timer_key, generation) {
                inner.deliver(submission).await;
            }
        });

        let replaced = pending.insert(
            key,
            Pending {
                generation,
                submission,
                timer,
            },
        );
        drop(pending);

        if let Some(previous) = replaced {
            previous.timer.abort();
            debug!(
                model = previous.submission.model.key(),
                id = ?previous.submission.id,
                "Superseded pending replication"
            );
        }
    }

    /// Number of submissions waiting for their window to pass.
    pub fn pending_count(&self) -> usize {
        self.inner.pending().len()
    }

    /// Deliver every pending submission now instead of waiting.
    pub async fn flush(&self) {
        let drained: Vec<Pending> = self
            .inner
            .pending()
            .drain()
            .map(|(_, pending)| pending)
            .collect();

        for pending in drained {
            pending.timer.abort();
            self.inner.deliver(pending.submission).await;
        }
    }
}
