//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the data-access core:
//! - Logging and tracing infrastructure
//! - Configuration management and bridge wiring
//! - Device identity carried on outbound calls
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the data crates depend on.
//! It establishes the configuration, logging conventions and error types
//! used throughout the system.

pub mod config;
pub mod error;
pub mod identity;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder, ReplicationConfig, ReplicationScope};
pub use error::{Error, Result};
pub use identity::DeviceIdentity;
