// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for MAC driver operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for MAC driver operations
pub type Result<T> = std::result::Result<T, MacError>;

/// Errors that can occur while driving the accelerator
///
/// A wrong result is not an error: the runner reports it as a `FAIL`
/// verdict. These variants cover the plumbing around the device.
#[derive(Debug, Error)]
pub enum MacError {
    /// The device never raised `STATUS.DONE` within the configured poll bound
    #[error("Device did not complete after {polls} status polls")]
    PollTimeout {
        /// Number of status reads performed
        polls: u64,
    },

    /// Memory device node not present
    #[error("Memory device not found: {path}")]
    DeviceNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// Mapping the register window failed
    #[error("Failed to map register block: {reason}")]
    MapFailed {
        /// Reason for failure
        reason: String,
    },

    /// Configuration rejected before touching the device
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Reason for rejection
        reason: String,
    },

    /// I/O error on the output sink or device node
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

impl MacError {
    /// Create a device not found error
    pub fn device_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DeviceNotFound { path: path.into() }
    }

    /// Create a map failed error
    pub fn map_failed(reason: impl Into<String>) -> Self {
        Self::MapFailed {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
