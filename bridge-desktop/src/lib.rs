//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux) and for tests.
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `PersistentStore` using an SQLite table of JSON payloads
//! - `SessionContext` as an in-process, lock-guarded session
//! - `UserNotifier` that routes alerts to `tracing`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SqlitePersistentStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let http_client = ReqwestHttpClient::new().unwrap();
//!     let store = SqlitePersistentStore::in_memory().await.unwrap();
//!
//!     // Hand both to CoreConfig::builder()
//! }
//! ```

mod http;
mod notify;
mod session;
mod store;

pub use http::ReqwestHttpClient;
pub use notify::TracingNotifier;
pub use session::{InMemorySessionContext, DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES};
pub use store::SqlitePersistentStore;
