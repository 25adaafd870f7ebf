//! Error types for profile storage operations

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while storing, loading or enumerating profiles
#[derive(Error, Debug)]
pub enum ProfileError {
    /// The file or directory does not exist
    #[error("Not found: {}", .path.display())]
    NotFound {
        /// The missing path
        path: PathBuf,
    },

    /// The file exists but does not decode as a cluster config
    #[error("Malformed profile config at {}: {source}", .path.display())]
    Malformed {
        /// Path of the unreadable file
        path: PathBuf,
        /// Decoder error
        source: serde_json::Error,
    },

    /// Filesystem failure
    #[error("Failed to {operation} {}: {source}", .path.display())]
    Io {
        /// The operation being performed
        operation: &'static str,
        /// The path involved
        path: PathBuf,
        /// Source error
        source: io::Error,
    },

    /// Encoding the record failed; nothing was written
    #[error("Failed to serialize profile config: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Profile name cannot be used as a directory name
    #[error("Invalid profile name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// No explicit root was given and no default could be determined
    #[error("Cannot determine storage root: set CLUSTERKIT_HOME or a home directory")]
    NoStorageRoot,
}

impl ProfileError {
    /// Wrap an I/O error, mapping `ErrorKind::NotFound` to [`ProfileError::NotFound`]
    pub fn io(operation: &'static str, path: impl AsRef<Path>, source: io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io {
                operation,
                path,
                source,
            }
        }
    }

    /// Create a malformed-config error
    pub fn malformed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Malformed {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid-name error
    pub fn invalid_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason,
        }
    }

    /// Check if the error means the target is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if the error means the file exists but cannot be decoded
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }

    /// Check if the error can be cleared without changing the request
    ///
    /// Missing and I/O failures may pass on retry. A malformed config is
    /// fixed only by recreating the profile, which replaces the file.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Malformed { .. } => true,
            Self::Io { .. } => true,
            Self::Serialization(_) => false,
            Self::InvalidName { .. } => false,
            Self::NoStorageRoot => false,
        }
    }
}
