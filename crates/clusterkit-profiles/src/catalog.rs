//! Profile discovery
//!
//! Enumerates `<root>/profiles/*` and sorts each profile into the valid or
//! invalid set. A profile that cannot be loaded is reported as invalid rather
//! than failing the listing; only an unreadable `profiles/` directory is an
//! error.

use crate::config::Profile;
use crate::error::ProfileError;
use crate::paths::{
    CONFIG_FILE_NAME, HomeRoot, StorageRootProvider, profile_file_path, profiles_dir,
    resolve_root, validate_profile_name,
};
use crate::storage::ProfileStore;
use crate::validation::validate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of [`ProfileCatalog::list_profiles`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileListing {
    /// Profiles that loaded and have a driver and Kubernetes version
    pub valid: Vec<Profile>,
    /// Profiles that failed to load or are missing required fields
    pub invalid: Vec<Profile>,
}

impl ProfileListing {
    /// Total number of profile directories found
    pub fn len(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    /// True if no profile directories were found
    pub fn is_empty(&self) -> bool {
        self.valid.is_empty() && self.invalid.is_empty()
    }

    /// Names of the valid profiles, then the invalid ones
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.valid
            .iter()
            .chain(self.invalid.iter())
            .map(|p| p.name.as_str())
    }
}

/// Loads and classifies profiles under a storage root
#[derive(Debug, Clone, Default)]
pub struct ProfileCatalog<P = HomeRoot> {
    provider: P,
    store: ProfileStore,
}

impl<P: StorageRootProvider> ProfileCatalog<P> {
    /// Create a catalog with the default store
    pub fn new(provider: P) -> Self {
        Self::with_store(provider, ProfileStore::new())
    }

    /// Create a catalog sharing an existing store configuration
    pub fn with_store(provider: P, store: ProfileStore) -> Self {
        Self { provider, store }
    }

    /// Default storage root provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Store used to read config files
    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// List every profile, split into valid and invalid
    ///
    /// Order follows [`ProfileCatalog::profile_dirs`].
    ///
    /// # Errors
    ///
    /// Fails only if the root cannot be resolved or `<root>/profiles` cannot
    /// be read.
    pub fn list_profiles(&self, root: Option<&Path>) -> Result<ProfileListing, ProfileError> {
        let root = resolve_root(root, &self.provider)?;
        let dirs = read_profile_dirs(&root)?;

        let listing = dirs
            .into_iter()
            .fold(ProfileListing::default(), |mut listing, ProfileDir { name, path }| {
                match self.store.load(&path.join(CONFIG_FILE_NAME)) {
                    Ok(config) => match validate(&config) {
                        Ok(()) => listing.valid.push(Profile::new(name, config)),
                        Err(reasons) => {
                            let reasons: Vec<String> =
                                reasons.iter().map(ToString::to_string).collect();
                            debug!(profile = %name, reasons = %reasons.join(", "), "Profile is incomplete");
                            listing.invalid.push(Profile::new(name, config));
                        }
                    },
                    Err(e) => {
                        warn!(profile = %name, error = %e, "Profile config could not be loaded");
                        listing.invalid.push(Profile::unloaded(name));
                    }
                }
                listing
            });

        info!(
            valid = listing.valid.len(),
            invalid = listing.invalid.len(),
            "Profile listing completed"
        );
        Ok(listing)
    }

    /// Load a single profile by name
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidName`] for unusable names, otherwise the
    /// error from [`ProfileStore::load`].
    pub fn load_profile(&self, name: &str, root: Option<&Path>) -> Result<Profile, ProfileError> {
        validate_profile_name(name)?;
        let root = resolve_root(root, &self.provider)?;
        let config = self.store.load(&profile_file_path(&root, name))?;
        Ok(Profile::new(name, config))
    }

    /// Names of all profile directories, valid or not
    ///
    /// Names that are not valid UTF-8 are converted lossily.
    ///
    /// # Errors
    ///
    /// Fails if the root cannot be resolved or `<root>/profiles` cannot be read.
    pub fn profile_dirs(&self, root: Option<&Path>) -> Result<Vec<String>, ProfileError> {
        let root = resolve_root(root, &self.provider)?;
        Ok(read_profile_dirs(&root)?
            .into_iter()
            .map(|dir| dir.name)
            .collect())
    }
}

/// A subdirectory of `<root>/profiles`
#[derive(Debug)]
struct ProfileDir {
    /// Display name, lossy if the directory name is not UTF-8
    name: String,
    /// Actual directory path
    path: PathBuf,
}

/// Subdirectories of `<root>/profiles`, sorted by name
fn read_profile_dirs(root: &Path) -> Result<Vec<ProfileDir>, ProfileError> {
    let dir = profiles_dir(root);
    let entries = fs::read_dir(&dir).map_err(|e| ProfileError::io("read directory", &dir, e))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = ?dir, error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };

        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => {}
            Ok(_) => continue,
            Err(e) => {
                warn!(path = ?entry.path(), error = %e, "Skipping entry with unknown type");
                continue;
            }
        }

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                warn!(name = ?raw, "Profile directory name is not UTF-8");
                raw.to_string_lossy().into_owned()
            }
        };
        dirs.push(ProfileDir {
            name,
            path: entry.path(),
        });
    }

    dirs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(dirs)
}
