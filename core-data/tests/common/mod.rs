//! Shared fakes for the integration suites
#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{
    BridgeError, HttpClient, HttpRequest, HttpResponse, PersistentStore, SessionContext,
    StorageKey, UserNotifier,
};
use bytes::Bytes;
use core_data::{
    CacheCoordinator, DataContext, Model, OfflineSnapshot, RemoteReplicator,
};
use core_runtime::config::{CoreConfig, ReplicationScope};
use core_runtime::identity::DeviceIdentity;
use mockall::mock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

mock! {
    pub Http {}

    #[async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

pub fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    }
}

pub fn offline() -> BridgeError {
    BridgeError::NotAvailable("connection refused".to_string())
}

pub fn identity() -> DeviceIdentity {
    DeviceIdentity::new("device-1", "2.1.0")
        .with_session_id("session-1")
        .with_device_year_class("2016")
        .with_platform_os("ios")
}

/// Key/value store that records traffic and can be told to fail reads or writes.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<StorageKey, Value>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub saves: AtomicUsize,
    active_writers: AtomicUsize,
    pub max_concurrent_writers: AtomicUsize,
}

impl MemoryStore {
    pub fn get(&self, key: &StorageKey) -> Option<Value> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, key: StorageKey, value: Value) {
        self.entries.lock().unwrap().insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn load(&self, key: &StorageKey) -> BridgeResult<Value> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(BridgeError::DatabaseError("database is locked".to_string()));
        }

        self.get(key)
            .ok_or_else(|| BridgeError::NotFound(key.to_string()))
    }

    async fn save(&self, key: &StorageKey, raw_data: &Value) -> BridgeResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BridgeError::DatabaseError("disk full".to_string()));
        }

        let active = self.active_writers.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent_writers.fetch_max(active, Ordering::SeqCst);
        tokio::task::yield_now().await;

        self.put(key.clone(), raw_data.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.active_writers.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self, key: &str) -> BridgeResult<()> {
        self.entries.lock().unwrap().retain(|k, _| k.key != key);
        Ok(())
    }
}

pub struct TestSession {
    language: RwLock<String>,
    offline: AtomicBool,
}

impl TestSession {
    pub fn new(language: &str) -> Self {
        Self {
            language: RwLock::new(language.to_string()),
            offline: AtomicBool::new(false),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_language(&self, language: &str) {
        *self.language.write().unwrap() = language.to_string();
    }
}

impl SessionContext for TestSession {
    fn language(&self) -> String {
        self.language.read().unwrap().clone()
    }

    fn is_offline_mode(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub alerts: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.alerts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }
}

#[async_trait]
impl UserNotifier for RecordingNotifier {
    async fn alert(&self, title: &str, message: &str) {
        self.alerts
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Replicated {
    pub payload: Value,
    pub model: String,
    pub id: Option<String>,
}

#[derive(Default)]
pub struct RecordingReplicator {
    pub calls: Mutex<Vec<Replicated>>,
    pub fail: AtomicBool,
}

impl RecordingReplicator {
    pub fn calls(&self) -> Vec<Replicated> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteReplicator for RecordingReplicator {
    async fn replicate(
        &self,
        payload: &Value,
        model: &Model,
        id: Option<&str>,
    ) -> core_data::Result<()> {
        self.calls.lock().unwrap().push(Replicated {
            payload: payload.clone(),
            model: model.key().to_string(),
            id: id.map(str::to_string),
        });

        if self.fail.load(Ordering::SeqCst) {
            return Err(core_data::DataError::Replication("HTTP status 503".to_string()));
        }
        Ok(())
    }
}

/// A coordinator wired to fakes, with handles to inspect them.
pub struct Harness {
    pub coordinator: CacheCoordinator,
    pub store: Arc<MemoryStore>,
    pub session: Arc<TestSession>,
    pub notifier: Arc<RecordingNotifier>,
    pub replicator: Arc<RecordingReplicator>,
}

pub struct HarnessBuilder {
    http: MockHttp,
    snapshot: OfflineSnapshot,
    scope: ReplicationScope,
    store: Option<Arc<dyn PersistentStore>>,
}

impl HarnessBuilder {
    pub fn new(http: MockHttp) -> Self {
        Self {
            http,
            snapshot: OfflineSnapshot::empty(),
            scope: ReplicationScope::PerTarget,
            store: None,
        }
    }

    pub fn snapshot(mut self, snapshot: OfflineSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn scope(mut self, scope: ReplicationScope) -> Self {
        self.scope = scope;
        self
    }

    /// Use `store` instead of the recording [`MemoryStore`].
    pub fn store(mut self, store: Arc<dyn PersistentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Harness {
        let memory_store = Arc::new(MemoryStore::default());
        let session = Arc::new(TestSession::new("chs"));
        let notifier = Arc::new(RecordingNotifier::default());
        let replicator = Arc::new(RecordingReplicator::default());

        let store: Arc<dyn PersistentStore> = match self.store {
            Some(store) => store,
            None => memory_store.clone() as Arc<dyn PersistentStore>,
        };

        let config = CoreConfig::builder()
            .device_identity(identity())
            .http_client(Arc::new(self.http))
            .persistent_store(store)
            .session_context(session.clone())
            .notifier(notifier.clone())
            .replication_scope(self.scope)
            .build()
            .expect("test config is valid");

        let context = Arc::new(DataContext::new(&config, self.snapshot));
        let coordinator = CacheCoordinator::new(context, replicator.clone());

        Harness {
            coordinator,
            store: memory_store,
            session,
            notifier,
            replicator,
        }
    }
}
