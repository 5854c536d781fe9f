//! # Host Bridge Traits
//!
//! Capability contracts the data-access core needs from its host.
//!
//! ## Overview
//!
//! The core never talks to a transport, a storage engine or the UI directly.
//! Each of those is a trait defined here and implemented per platform
//! (`bridge-desktop` for desktop and tests, native adapters on mobile).
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Issue a single HTTP request and return the raw response
//!
//! ### Storage
//! - [`PersistentStore`](storage::PersistentStore) - Durable `{key, id}` keyed payload storage
//!
//! ### Session & UI
//! - [`SessionContext`](session::SessionContext) - Current language and offline-mode flag
//! - [`UserNotifier`](notify::UserNotifier) - Surface an error message to the user
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it and keep messages actionable.
//! A persistent-store miss is reported as [`BridgeError::NotFound`] so callers
//! can tell it apart from a real failure.
//!
//! ## Thread Safety
//!
//! Every bridge trait requires `Send + Sync` so a single instance can be
//! shared across concurrent loads and saves.
//!
//! ## Examples
//!
//! ### Implementing PersistentStore
//!
//! ```ignore
//! use bridge_traits::storage::{PersistentStore, StorageKey};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//! use serde_json::Value;
//!
//! pub struct MyStore;
//!
//! #[async_trait]
//! impl PersistentStore for MyStore {
//!     async fn load(&self, key: &StorageKey) -> Result<Value> { todo!() }
//!     async fn save(&self, key: &StorageKey, raw_data: &Value) -> Result<()> { todo!() }
//!     async fn clear(&self, key: &str) -> Result<()> { todo!() }
//! }
//! ```

pub mod error;
pub mod http;
pub mod notify;
pub mod session;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use notify::UserNotifier;
pub use session::SessionContext;
pub use storage::{PersistentStore, StorageKey};
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, SystemClock};
