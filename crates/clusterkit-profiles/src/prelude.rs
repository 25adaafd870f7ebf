//! Convenience re-exports for common types

pub use crate::catalog::{ProfileCatalog, ProfileListing};
pub use crate::config::{ClusterConfig, Profile};
pub use crate::error::ProfileError;
pub use crate::lifecycle::ProfileManager;
pub use crate::paths::{FixedRoot, HomeRoot, StorageRootProvider};
pub use crate::storage::{ProfileStore, StoreConfig};
pub use crate::validation::{InvalidReason, is_valid, validate};
