//! # Device Identity
//!
//! The identity record attached to every outbound call. Built once at
//! process start and shared read-only afterwards.

use crate::error::{Error, Result};
use crate::logging::redact_if_sensitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub const HEADER_DEVICE_ID: &str = "deviceId";
pub const HEADER_SESSION_ID: &str = "sessionId";
pub const HEADER_DEVICE_YEAR_CLASS: &str = "deviceYearClass";
pub const HEADER_PLATFORM_OS: &str = "platformOS";
pub const HEADER_VERSION: &str = "version";

/// Identity of this install and process.
///
/// `Debug` output redacts the device and session ids so the identity can be
/// logged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceIdentity {
    /// Stable per-install identifier
    pub device_id: String,
    /// Identifier of this app launch
    pub session_id: String,
    /// Rough hardware generation reported by the host
    pub device_year_class: String,
    #[serde(rename = "platformOS")]
    pub platform_os: String,
    pub app_version: String,
}

impl DeviceIdentity {
    /// Identity for the current process with a fresh session id.
    pub fn new(device_id: impl Into<String>, app_version: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            session_id: Uuid::new_v4().to_string(),
            device_year_class: "unknown".to_string(),
            platform_os: std::env::consts::OS.to_string(),
            app_version: app_version.into(),
        }
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_device_year_class(mut self, year_class: impl Into<String>) -> Self {
        self.device_year_class = year_class.into();
        self
    }

    pub fn with_platform_os(mut self, platform_os: impl Into<String>) -> Self {
        self.platform_os = platform_os.into();
        self
    }

    /// Header name/value pairs in wire order.
    pub fn headers(&self) -> [(&'static str, &str); 5] {
        [
            (HEADER_DEVICE_ID, self.device_id.as_str()),
            (HEADER_SESSION_ID, self.session_id.as_str()),
            (HEADER_DEVICE_YEAR_CLASS, self.device_year_class.as_str()),
            (HEADER_PLATFORM_OS, self.platform_os.as_str()),
            (HEADER_VERSION, self.app_version.as_str()),
        ]
    }

    pub fn validate(&self) -> Result<()> {
        if self.device_id.trim().is_empty() {
            return Err(Error::Config("Device id cannot be empty".to_string()));
        }
        if self.app_version.trim().is_empty() {
            return Err(Error::Config("App version cannot be empty".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceIdentity")
            .field("device_id", &redact_if_sensitive("device_id", &self.device_id))
            .field("session_id", &redact_if_sensitive("session_id", &self.session_id))
            .field("device_year_class", &self.device_year_class)
            .field("platform_os", &self.platform_os)
            .field("app_version", &self.app_version)
            .finish()
    }
}
