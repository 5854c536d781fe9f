//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates. Host applications can depend on `study-core` and enable
//! `desktop-shims` for the bundled desktop bridges, or `headless` to inject
//! their own adapters, without wiring each crate individually.

#[cfg(any(feature = "desktop-shims", feature = "headless"))]
pub use core_service::*;
