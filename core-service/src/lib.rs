//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, persistent
//! store, session, notifier) into the data-access core and exposes the
//! operations hosts call by model name. Desktop apps typically enable the
//! `desktop-shims` feature (which depends on `bridge-desktop`); mobile hosts
//! inject their own adapters through [`CoreConfig`].
//!
//! ```ignore
//! let config = CoreConfig::builder()
//!     .device_identity(DeviceIdentity::new(device_id, "1.4.0"))
//!     .snapshot_dir(bundle_dir.join("offline"))
//!     .build()?;
//!
//! let service = DataService::bootstrap(config, ModelRegistry::standard(), Replication::Disabled).await?;
//! let lesson = service.load(names::LESSON, Some("2018-1")).await?;
//! service.shutdown().await;
//! ```

pub mod error;
pub mod version;

pub use error::{CoreError, Result};
pub use version::{version_number, UpdateStatus};

pub use core_data::models::names;
pub use core_data::{CallResult, Model, ModelRegistry, OfflineSnapshot};
pub use core_runtime::config::CoreConfig;
pub use core_runtime::identity::DeviceIdentity;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::{
    InMemorySessionContext, ReqwestHttpClient, SqlitePersistentStore, TracingNotifier,
};

pub use bridge_traits::HttpMethod;
use core_data::{
    CacheCoordinator, DataContext, HttpReplicator, NoopReplicator, RemoteReplicator,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// How saved payloads reach the remote service.
#[derive(Clone, Default)]
pub enum Replication {
    /// Saves stay local
    #[default]
    Disabled,
    /// `PUT` each payload to its model's remote address
    Http,
    Custom(Arc<dyn RemoteReplicator>),
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct DataService {
    registry: Arc<ModelRegistry>,
    coordinator: Arc<CacheCoordinator>,
}

impl DataService {
    /// Create a service from a validated config and an already loaded snapshot.
    pub fn new(
        config: &CoreConfig,
        registry: ModelRegistry,
        snapshot: OfflineSnapshot,
        replication: Replication,
    ) -> Self {
        let context = Arc::new(DataContext::new(config, snapshot));

        let replicator: Arc<dyn RemoteReplicator> = match replication {
            Replication::Disabled => Arc::new(NoopReplicator),
            Replication::Http => Arc::new(HttpReplicator::new(Arc::clone(context.network()))),
            Replication::Custom(replicator) => replicator,
        };

        Self {
            registry: Arc::new(registry),
            coordinator: Arc::new(CacheCoordinator::new(context, replicator)),
        }
    }

    /// Load the offline snapshot named by the config, then build the service.
    pub async fn bootstrap(
        config: CoreConfig,
        registry: ModelRegistry,
        replication: Replication,
    ) -> Result<Self> {
        let snapshot = match &config.snapshot_dir {
            Some(dir) => OfflineSnapshot::load_dir(dir).await?,
            None => OfflineSnapshot::empty(),
        };

        info!(
            models = registry.len(),
            languages = snapshot.languages().count(),
            "Data service ready"
        );
        Ok(Self::new(&config, registry, snapshot, replication))
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.registry.get(name)
    }

    /// Load the payload of model `name`. Unknown names are validation errors.
    pub async fn load(&self, name: &str, id: Option<&str>) -> Result<Option<Value>> {
        Ok(self.coordinator.load(self.model(name), id).await?)
    }

    /// [`load`](Self::load) into a typed value.
    pub async fn load_as<T: DeserializeOwned>(&self, name: &str, id: Option<&str>) -> Result<Option<T>> {
        match self.load(name, id).await? {
            Some(value) => Ok(Some(
                serde_json::from_value(value).map_err(core_data::DataError::from)?,
            )),
            None => Ok(None),
        }
    }

    pub async fn save(&self, name: &str, id: Option<&str>, payload: Value) -> Result<()> {
        Ok(self.coordinator.save(payload, self.model(name), id).await?)
    }

    pub async fn clear(&self, name: &str) -> Result<()> {
        Ok(self.coordinator.clear(self.model(name)).await?)
    }

    /// Generic call to `base_url + api`; see [`core_data::NetworkClient::call_web_service`].
    pub async fn call_web_service(
        &self,
        base_url: &str,
        api: &str,
        method: HttpMethod,
        headers: &[(&str, &str)],
        body: Option<&Value>,
    ) -> CallResult {
        self.coordinator
            .context()
            .network()
            .call_web_service(base_url, api, method, headers, body)
            .await
    }

    /// `true` when `result` has `expected_status`; otherwise alerts the user.
    pub async fn show_web_service_call_errors(
        &self,
        result: Option<&CallResult>,
        expected_status: u16,
    ) -> bool {
        self.coordinator
            .context()
            .reporter()
            .show_web_service_call_errors(result, expected_status)
            .await
    }

    /// Compare `current_version` with the `version` published at `manifest_url`.
    ///
    /// Returns `Ok(None)` when the manifest could not be fetched; the user
    /// has already been told why.
    #[instrument(skip(self))]
    pub async fn check_for_update(
        &self,
        manifest_url: &str,
        current_version: &str,
    ) -> Result<Option<UpdateStatus>> {
        let result = self
            .call_web_service(manifest_url, "", HttpMethod::Get, &[], None)
            .await;

        if !self.show_web_service_call_errors(Some(&result), 200).await {
            return Ok(None);
        }

        let latest = result
            .body
            .as_ref()
            .and_then(|body| body.get("version"))
            .and_then(Value::as_str)
            .ok_or_else(|| CoreError::InvalidVersion {
                version: String::new(),
                reason: "manifest has no version".to_string(),
            })?;

        let status = UpdateStatus::compare(current_version, latest)?;
        info!(current = current_version, latest, available = status.is_available(), "Checked for update");
        Ok(Some(status))
    }

    /// Deliver pending replications and wait for background writes.
    pub async fn shutdown(&self) {
        let pending = self.coordinator.queue().pending_count();
        if pending > 0 {
            warn!(pending, "Flushing replication before shutdown");
        }
        self.coordinator.flush().await;
        self.coordinator.settle().await;
    }
}
