//! # Core Data
//!
//! Local-first data access for the study app.
//!
//! ## Overview
//!
//! Payloads are fetched from the content services and cached per model in
//! memory or in the persistent store. When the network fails, the cache
//! answers; in offline mode a bundled snapshot answers first. Local writes
//! go to the persistent store and are replicated to the remote service
//! after a debounce window.
//!
//! ## Components
//!
//! - [`key_codec`] - Escaping of ids in composite storage keys
//! - [`models`] - The model catalog and cache policies
//! - [`snapshot`] - Language-partitioned offline payloads
//! - [`network`] - Identity-stamped HTTP calls with strict JSON parsing
//! - [`reporter`] - User-facing messages for failed calls
//! - [`replication`] - Debounced outbound replication
//! - [`context`] - Shared process-wide state
//! - [`coordinator`] - The load/save pipeline

pub mod context;
pub mod coordinator;
pub mod error;
pub mod key_codec;
pub mod locks;
pub mod models;
pub mod network;
pub mod query;
pub mod replication;
pub mod reporter;
pub mod snapshot;

pub use context::{DataContext, MemoryCache};
pub use coordinator::CacheCoordinator;
pub use error::{DataError, Result};
pub use models::{CachePolicy, Model, ModelRegistry, ModelRegistryBuilder};
pub use network::{CallResult, NetworkClient};
pub use replication::{HttpReplicator, NoopReplicator, RemoteReplicator, ReplicationQueue};
pub use reporter::{describe_call_failure, ErrorReporter};
pub use snapshot::OfflineSnapshot;
