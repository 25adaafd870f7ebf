//! Crash-safe storage and discovery of named cluster profiles
//!
//! Each profile lives in its own directory under the storage root:
//!
//! ```text
//! <root>/profiles/<name>/config.json
//! ```
//!
//! This crate provides:
//! - Create, load, enumerate and delete operations on profiles
//! - Atomic replace of existing config files (write to temp, then rename)
//! - Classification of discovered profiles into valid and invalid sets
//!
//! # Architecture
//!
//! - [`paths`]: storage root resolution and path derivation
//! - [`config`]: the persisted `ClusterConfig` record and `Profile`
//! - [`storage`]: durable single-file reads and writes
//! - [`validation`]: pure validity checks
//! - [`catalog`]: enumeration and classification of profiles
//! - [`lifecycle`]: `ProfileManager`, the public entry point
//! - [`error`]: error types
//!
//! # Error Recovery
//!
//! - A failed write never leaves a partially written config at the canonical path
//! - Listing reports unloadable profiles as invalid instead of failing
//! - Deleting a missing profile succeeds
//!
//! # Example
//!
//! ```no_run
//! use clusterkit_profiles::prelude::*;
//!
//! # fn example() -> clusterkit_profiles::Result<()> {
//! let manager = ProfileManager::from_home();
//!
//! manager.create("dev", &ClusterConfig::new("kvm2", "v1.18.0"), None)?;
//! assert!(manager.exists("dev", None));
//!
//! let listing = manager.list(None)?;
//! for profile in &listing.invalid {
//!     println!("{} is unusable and can be deleted", profile.name);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod paths;
pub mod prelude;
pub mod storage;
pub mod validation;

pub use catalog::{ProfileCatalog, ProfileListing};
pub use config::{ClusterConfig, KubernetesConfig, MachineConfig, Profile};
pub use error::ProfileError;
pub use lifecycle::ProfileManager;
pub use paths::{FixedRoot, HomeRoot, StorageRootProvider};
pub use storage::{ProfileStore, StagedWrite, StoreConfig};
pub use validation::{InvalidReason, is_valid};

/// Result type for profile operations
pub type Result<T> = std::result::Result<T, ProfileError>;
