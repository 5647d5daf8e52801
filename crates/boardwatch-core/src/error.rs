//! Error types for boardwatch-core
//!
//! Nothing in the core is fatal: every variant maps to a degraded but
//! recoverable dashboard state.

use thiserror::Error;

/// Core error type for boardwatch operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // Validation Errors
    // ===================
    #[error("Invalid board identifier '{input}': {reason}")]
    Validation { input: String, reason: String },

    // ===================
    // Network Errors
    // ===================
    #[error("{operation} failed: {message}")]
    Network {
        operation: String,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    // ===================
    // Persistence Errors
    // ===================
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl CoreError {
    pub fn validation(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Network failure without an underlying transport error (e.g. non-2xx status)
    pub fn network(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            operation: operation.into(),
            message: message.into(),
            source: None,
        }
    }

    pub fn from_transport(operation: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            operation: operation.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, CoreError::Network { .. })
    }
}

/// Failures of the durable key/value backend.
///
/// These never reach the user: the persistence adapter logs them and
/// degrades to "absent" on read and "no-op" on write.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to read persisted key '{key}'")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write persisted key '{key}'")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt value for persisted key '{key}'")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },
}

impl PersistenceError {
    /// Key involved in the failure, if any
    pub fn key(&self) -> Option<&str> {
        match self {
            PersistenceError::Read { key, .. }
            | PersistenceError::Write { key, .. }
            | PersistenceError::Corrupt { key, .. } => Some(key),
            PersistenceError::Unavailable { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_message() {
        let err = CoreError::network("fetch_boards", "HTTP 500");
        assert_eq!(err.to_string(), "fetch_boards failed: HTTP 500");
        assert!(err.is_network());
    }

    #[test]
    fn test_persistence_error_converts() {
        let err: CoreError = PersistenceError::Unavailable {
            reason: "quota exceeded".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::Persistence(_)));
        assert_eq!(err.to_string(), "Storage unavailable: quota exceeded");
    }

    #[test]
    fn test_persistence_error_key() {
        let corrupt = serde_json::from_str::<Vec<String>>("[oops").unwrap_err();
        let err = PersistenceError::Corrupt {
            key: "boardwatch-selected-boards".to_string(),
            source: corrupt,
        };
        assert_eq!(err.key(), Some("boardwatch-selected-boards"));
    }
}
