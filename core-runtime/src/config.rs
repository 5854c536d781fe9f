//! # Core Configuration Module
//!
//! Provides configuration management for the data-access core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! holding every bridge and setting the core needs. It is built once at
//! process start; the resulting value is what gets turned into the shared
//! data context, so nothing in the core reaches for hidden globals.
//!
//! ## Required Dependencies
//!
//! - `DeviceIdentity` - Identity headers for every outbound call
//! - `PersistentStore` - Durable cache tier
//! - `SessionContext` - Current language and offline-mode flag
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - Transport (desktop default: reqwest)
//! - `UserNotifier` - Error surface (desktop default: tracing warnings)
//!
//! When the `desktop-shims` feature is enabled, every missing bridge is
//! replaced by its `bridge-desktop` implementation.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_runtime::identity::DeviceIdentity;
//!
//! let config = CoreConfig::builder()
//!     .device_identity(DeviceIdentity::new("device-123", "1.4.0"))
//!     .database_path("/path/to/store.db")
//!     .snapshot_dir("/path/to/offline")
//!     .debounce_ms(500)
//!     .build()
//!     .expect("Failed to build config");
//! ```
//!
//! ## Error Handling
//!
//! Missing bridges produce [`Error::CapabilityMissing`] with an actionable
//! message; out-of-range values produce [`Error::Config`].

use crate::error::{Error, Result};
use crate::identity::DeviceIdentity;
use bridge_traits::{HttpClient, PersistentStore, SessionContext, UserNotifier};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default quiet window before a debounced write is replicated.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Default per-request deadline for outbound calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Language used when the session does not report one.
pub const DEFAULT_LANGUAGE: &str = "chs";

/// Which submissions share a debounce timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplicationScope {
    /// One timer per composite `(model key, id)` target.
    #[default]
    PerTarget,
    /// A single timer for the whole process; only the latest submission of
    /// any target survives a burst.
    Global,
}

/// Outbound replication settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplicationConfig {
    /// Quiet window in milliseconds
    pub debounce_ms: u64,
    pub scope: ReplicationScope,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            scope: ReplicationScope::default(),
        }
    }
}

impl ReplicationConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.debounce_ms == 0 {
            return Err(Error::Config(
                "Debounce window must be greater than 0ms".to_string(),
            ));
        }

        if self.debounce_ms > 60_000 {
            return Err(Error::Config(
                "Debounce window exceeds maximum of 60 seconds (60,000ms)".to_string(),
            ));
        }

        Ok(())
    }
}

/// Core configuration for the data-access layer.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Identity attached to every outbound call
    pub device_identity: DeviceIdentity,

    /// Transport for remote calls
    pub http_client: Arc<dyn HttpClient>,

    /// Durable cache tier
    pub persistent_store: Arc<dyn PersistentStore>,

    /// Session read interface
    pub session_context: Arc<dyn SessionContext>,

    /// Where user-facing errors go
    pub notifier: Arc<dyn UserNotifier>,

    /// Directory holding `<lang>_cache.json` offline snapshots
    pub snapshot_dir: Option<PathBuf>,

    /// Deadline applied to every outbound request
    pub request_timeout: Duration,

    pub replication: ReplicationConfig,

    /// Language used when the session reports an empty one
    pub default_language: String,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("device_identity", &self.device_identity)
            .field("http_client", &"HttpClient { ... }")
            .field("persistent_store", &"PersistentStore { ... }")
            .field("session_context", &"SessionContext { ... }")
            .field("notifier", &"UserNotifier { ... }")
            .field("snapshot_dir", &self.snapshot_dir)
            .field("request_timeout", &self.request_timeout)
            .field("replication", &self.replication)
            .field("default_language", &self.default_language)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Device identity fields are present
    /// - Request timeout is within 1..=300 seconds
    /// - Debounce window is within 1..=60 000 ms
    /// - Default language is not empty
    pub fn validate(&self) -> Result<()> {
        self.device_identity.validate()?;

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than 0 seconds".to_string(),
            ));
        }

        if self.request_timeout > Duration::from_secs(300) {
            return Err(Error::Config(
                "Request timeout exceeds maximum of 300 seconds".to_string(),
            ));
        }

        self.replication.validate()?;

        if self.default_language.trim().is_empty() {
            return Err(Error::Config(
                "Default language cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn capability_missing(capability: &str, message: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: message.to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_timeout(timeout)
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(capability_missing(
        "HttpClient",
        "HttpClient implementation is required for remote loads. \
         Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
         Mobile: inject the platform-native networking adapter.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_session() -> Result<Arc<dyn SessionContext>> {
    Ok(Arc::new(bridge_desktop::InMemorySessionContext::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_session() -> Result<Arc<dyn SessionContext>> {
    Err(capability_missing(
        "SessionContext",
        "SessionContext implementation is required to read language and offline mode. \
         Desktop: enable the 'desktop-shims' feature to use InMemorySessionContext. \
         Mobile: expose the current user session through SessionContext.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_notifier() -> Result<Arc<dyn UserNotifier>> {
    Ok(Arc::new(bridge_desktop::TracingNotifier))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_notifier() -> Result<Arc<dyn UserNotifier>> {
    Err(capability_missing(
        "UserNotifier",
        "UserNotifier implementation is required to surface call errors. \
         Desktop: enable the 'desktop-shims' feature to use TracingNotifier. \
         Mobile: inject an adapter that shows an alert dialog.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_persistent_store(
    database_path: Option<PathBuf>,
) -> Result<Arc<dyn PersistentStore>> {
    use bridge_desktop::SqlitePersistentStore;
    use std::thread;
    use tokio::runtime::{Builder, Handle};

    let path = database_path
        .or_else(SqlitePersistentStore::default_path)
        .ok_or_else(|| {
            Error::Config(
                "No database path given and no user data directory available. \
                 Use .database_path() to set it."
                    .to_string(),
            )
        })?;

    let init_store = |path: PathBuf| -> Result<_> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                Error::Internal(format!(
                    "Failed to create Tokio runtime for default persistent store: {}",
                    e
                ))
            })?;

        runtime
            .block_on(SqlitePersistentStore::new(path))
            .map_err(|e| {
                Error::Internal(format!("Failed to initialize default PersistentStore: {}", e))
            })
    };

    // block_on panics inside a running runtime, so hop to a plain thread.
    let store = match Handle::try_current() {
        Ok(_) => thread::spawn(move || init_store(path))
            .join()
            .map_err(|_| {
                Error::Internal(
                    "Worker thread panicked while creating default PersistentStore".to_string(),
                )
            })??,
        Err(_) => init_store(path)?,
    };

    let store: Arc<dyn PersistentStore> = Arc::new(store);
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_persistent_store(
    _database_path: Option<PathBuf>,
) -> Result<Arc<dyn PersistentStore>> {
    Err(capability_missing(
        "PersistentStore",
        "PersistentStore implementation is required for the durable cache tier. \
         Desktop: enable the 'desktop-shims' feature to use SqlitePersistentStore. \
         Mobile: wrap AsyncStorage/SharedPreferences/UserDefaults in PersistentStore.",
    ))
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    device_identity: Option<DeviceIdentity>,
    http_client: Option<Arc<dyn HttpClient>>,
    persistent_store: Option<Arc<dyn PersistentStore>>,
    session_context: Option<Arc<dyn SessionContext>>,
    notifier: Option<Arc<dyn UserNotifier>>,
    database_path: Option<PathBuf>,
    snapshot_dir: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    replication: ReplicationConfig,
    default_language: Option<String>,
}

impl CoreConfigBuilder {
    /// Sets the identity attached to outbound calls (required).
    pub fn device_identity(mut self, identity: DeviceIdentity) -> Self {
        self.device_identity = Some(identity);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn persistent_store(mut self, store: Arc<dyn PersistentStore>) -> Self {
        self.persistent_store = Some(store);
        self
    }

    pub fn session_context(mut self, session: Arc<dyn SessionContext>) -> Self {
        self.session_context = Some(session);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn UserNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Location of the default SQLite store. Ignored when a store is injected.
    pub fn database_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.database_path = Some(path.into());
        self
    }

    pub fn snapshot_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.snapshot_dir = Some(path.into());
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    pub fn debounce_ms(mut self, millis: u64) -> Self {
        self.replication.debounce_ms = millis;
        self
    }

    pub fn replication_scope(mut self, scope: ReplicationScope) -> Self {
        self.replication.scope = scope;
        self
    }

    pub fn default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = Some(language.into());
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - The device identity is missing or incomplete
    /// - A required bridge is missing and no desktop default is available
    /// - Configuration values are out of range
    pub fn build(self) -> Result<CoreConfig> {
        let device_identity = self.device_identity.ok_or_else(|| {
            Error::Config(
                "Device identity is required. Use .device_identity() to set it.".to_string(),
            )
        })?;

        let request_timeout =
            Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS));

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let session_context = match self.session_context {
            Some(session) => session,
            None => provide_default_session()?,
        };

        let notifier = match self.notifier {
            Some(notifier) => notifier,
            None => provide_default_notifier()?,
        };

        let persistent_store = match self.persistent_store {
            Some(store) => store,
            None => provide_default_persistent_store(self.database_path)?,
        };

        let config = CoreConfig {
            device_identity,
            http_client,
            persistent_store,
            session_context,
            notifier,
            snapshot_dir: self.snapshot_dir,
            request_timeout,
            replication: self.replication,
            default_language: self
                .default_language
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        };

        config.validate()?;

        Ok(config)
    }
}
