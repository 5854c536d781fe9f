use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    /// A required argument was missing at the call boundary.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Nothing stored for {0}")]
    StorageMiss(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Replication failed: {0}")]
    Replication(String),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DataError {
    /// Map a persistent-store failure, keeping misses distinct from faults.
    pub fn from_store(err: BridgeError) -> Self {
        match err {
            BridgeError::NotFound(what) => DataError::StorageMiss(what),
            other => DataError::Storage(other.to_string()),
        }
    }

    pub fn is_storage_miss(&self) -> bool {
        matches!(self, DataError::StorageMiss(_))
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
