//! App version comparison for the update check

use crate::error::{CoreError, Result};
use serde::Serialize;

/// Fold a dotted version into one comparable number.
///
/// Each component is worth 1000 of the next, so `"1.2.3.4"` becomes
/// `1_002_003_004`. Components are expected to stay below 1000.
pub fn version_number(version: &str) -> Result<u64> {
    let invalid = |reason: &str| CoreError::InvalidVersion {
        version: version.to_string(),
        reason: reason.to_string(),
    };

    if version.trim().is_empty() {
        return Err(invalid("empty version"));
    }

    version.trim().split('.').try_fold(0u64, |value, part| {
        let part: u64 = part
            .trim()
            .parse()
            .map_err(|_| invalid("component is not a number"))?;

        value
            .checked_mul(1000)
            .and_then(|value| value.checked_add(part))
            .ok_or_else(|| invalid("too many components"))
    })
}

/// Result of comparing the running version with the published one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum UpdateStatus {
    UpToDate { current: String },
    Available { current: String, latest: String },
}

impl UpdateStatus {
    pub fn compare(current: &str, latest: &str) -> Result<Self> {
        if version_number(current)? < version_number(latest)? {
            Ok(UpdateStatus::Available {
                current: current.to_string(),
                latest: latest.to_string(),
            })
        } else {
            Ok(UpdateStatus::UpToDate {
                current: current.to_string(),
            })
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, UpdateStatus::Available { .. })
    }
}
