//! Profile lifecycle: existence checks, creation and deletion

use crate::catalog::{ProfileCatalog, ProfileListing};
use crate::config::{ClusterConfig, Profile};
use crate::error::ProfileError;
use crate::paths::{
    HomeRoot, StorageRootProvider, profile_file_path, profile_folder_path, resolve_root,
    validate_profile_name,
};
use crate::storage::{ProfileStore, StoreConfig};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Entry point for creating, inspecting and removing profiles
///
/// Every operation takes an optional storage root; `None` uses the provider.
/// Nothing is cached between calls.
#[derive(Debug, Clone, Default)]
pub struct ProfileManager<P = HomeRoot> {
    catalog: ProfileCatalog<P>,
}

impl ProfileManager<HomeRoot> {
    /// Manager rooted at `$CLUSTERKIT_HOME` or `~/.clusterkit`
    pub fn from_home() -> Self {
        Self::new(HomeRoot)
    }
}

impl<P: StorageRootProvider> ProfileManager<P> {
    /// Create a manager with the default store configuration
    pub fn new(provider: P) -> Self {
        Self {
            catalog: ProfileCatalog::new(provider),
        }
    }

    /// Create a manager with a custom store configuration
    pub fn with_store_config(provider: P, config: StoreConfig) -> Self {
        Self {
            catalog: ProfileCatalog::with_store(provider, ProfileStore::with_config(config)),
        }
    }

    /// Catalog used for listing and loading
    pub fn catalog(&self) -> &ProfileCatalog<P> {
        &self.catalog
    }

    fn store(&self) -> &ProfileStore {
        self.catalog.store()
    }

    /// True if the profile's config file exists, whether or not it is valid
    pub fn exists(&self, name: &str, root: Option<&Path>) -> bool {
        if validate_profile_name(name).is_err() {
            return false;
        }
        match resolve_root(root, self.catalog.provider()) {
            Ok(root) => fs::metadata(profile_file_path(&root, name)).is_ok(),
            Err(_) => false,
        }
    }

    /// Create a profile with an empty config
    ///
    /// # Errors
    ///
    /// See [`ProfileManager::create`].
    pub fn create_empty(&self, name: &str, root: Option<&Path>) -> Result<(), ProfileError> {
        self.create(name, &ClusterConfig::default(), root)
    }

    /// Create or fully replace a profile's config
    ///
    /// # Error Recovery
    ///
    /// An existing config is only replaced after the new one is completely
    /// written; on failure the previous file is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidName`], a root resolution error,
    /// [`ProfileError::Serialization`], or any error from
    /// [`ProfileStore::save_encoded`].
    pub fn create(
        &self,
        name: &str,
        config: &ClusterConfig,
        root: Option<&Path>,
    ) -> Result<(), ProfileError> {
        validate_profile_name(name)?;
        let root = resolve_root(root, self.catalog.provider())?;
        let path = profile_file_path(&root, name);

        let data = self.store().encode(config)?;
        info!(
            profile = %name,
            "Saving config:\n{}",
            String::from_utf8_lossy(&data)
        );

        self.store().save_encoded(&path, &data)?;
        info!(profile = %name, path = ?path, "Profile saved");
        Ok(())
    }

    /// Remove a profile's directory and everything in it
    ///
    /// A profile that does not exist is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidName`], a root resolution error, or
    /// [`ProfileError::Io`] if removal fails.
    pub fn delete(&self, name: &str, root: Option<&Path>) -> Result<(), ProfileError> {
        validate_profile_name(name)?;
        let root = resolve_root(root, self.catalog.provider())?;
        let folder = profile_folder_path(&root, name);

        match fs::remove_dir_all(&folder) {
            Ok(()) => {
                info!(profile = %name, "Profile deleted");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(profile = %name, path = ?folder, "Profile already absent");
                Ok(())
            }
            Err(e) => Err(ProfileError::io("remove directory", &folder, e)),
        }
    }

    /// Load a single profile
    ///
    /// # Errors
    ///
    /// See [`ProfileCatalog::load_profile`].
    pub fn load(&self, name: &str, root: Option<&Path>) -> Result<Profile, ProfileError> {
        self.catalog.load_profile(name, root)
    }

    /// List all profiles, split into valid and invalid
    ///
    /// # Errors
    ///
    /// See [`ProfileCatalog::list_profiles`].
    pub fn list(&self, root: Option<&Path>) -> Result<ProfileListing, ProfileError> {
        self.catalog.list_profiles(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::FixedRoot;
    use tempfile::TempDir;
    use tracing_test::traced_test;

    fn must<T, E: std::fmt::Debug>(r: Result<T, E>) -> T {
        match r {
            Ok(v) => v,
            Err(e) => panic!("unexpected Err: {e:?}"),
        }
    }

    fn create_test_manager() -> (ProfileManager<FixedRoot>, TempDir) {
        let temp_dir = must(TempDir::new());
        let manager = ProfileManager::new(FixedRoot::new(temp_dir.path()));
        (manager, temp_dir)
    }

    #[test]
    fn test_create_empty_then_exists() {
        let (manager, temp_dir) = create_test_manager();
        assert!(!manager.exists("alpha", None));

        must(manager.create_empty("alpha", None));

        assert!(manager.exists("alpha", None));
        assert!(temp_dir.path().join("profiles/alpha/config.json").is_file());
    }

    #[test]
    fn test_exists_ignores_bare_directory() {
        let (manager, temp_dir) = create_test_manager();
        must(fs::create_dir_all(temp_dir.path().join("profiles/hollow")));

        assert!(!manager.exists("hollow", None));
    }

    #[test]
    fn test_create_overwrites() {
        let (manager, _temp_dir) = create_test_manager();
        must(manager.create_empty("alpha", None));
        must(manager.create("alpha", &ClusterConfig::new("kvm2", "v1.18.0"), None));

        let profile = must(manager.load("alpha", None));
        assert_eq!(profile.config, ClusterConfig::new("kvm2", "v1.18.0"));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (manager, temp_dir) = create_test_manager();
        must(manager.create("beta", &ClusterConfig::new("kvm2", "v1.18.0"), None));
        must(fs::write(temp_dir.path().join("profiles/beta/machine.log"), "extra"));

        must(manager.delete("beta", None));
        assert!(!manager.exists("beta", None));
        assert!(!temp_dir.path().join("profiles/beta").exists());

        must(manager.delete("beta", None));
    }

    #[test]
    fn test_rejects_escaping_names() {
        let (manager, temp_dir) = create_test_manager();

        let result = manager.create_empty("../outside", None);
        assert!(matches!(result, Err(ProfileError::InvalidName { .. })));
        assert!(!temp_dir.path().join("outside").exists());

        let result = manager.delete("..", None);
        assert!(matches!(result, Err(ProfileError::InvalidName { .. })));
        assert!(temp_dir.path().exists());

        assert!(!manager.exists("", None));
    }

    #[test]
    fn test_explicit_root() {
        let (manager, default_root) = create_test_manager();
        let other = must(TempDir::new());

        must(manager.create_empty("gamma", Some(other.path())));

        assert!(manager.exists("gamma", Some(other.path())));
        assert!(!manager.exists("gamma", None));
        assert!(!default_root.path().join("profiles").exists());
    }

    #[traced_test]
    #[test]
    fn test_create_logs_payload() {
        let (manager, _temp_dir) = create_test_manager();
        must(manager.create("delta", &ClusterConfig::new("docker", "v1.20.0"), None));

        assert!(logs_contain("Saving config"));
        assert!(logs_contain("profile=delta"));
    }

    #[traced_test]
    #[test]
    fn test_logged_payload_matches_file() {
        let (manager, temp_dir) = create_test_manager();
        let config = ClusterConfig::new("kvm2", "v1.18.0");
        must(manager.create("epsilon", &config, None));

        let written = must(fs::read(temp_dir.path().join("profiles/epsilon/config.json")));
        let encoded = must(manager.catalog().store().encode(&config));
        assert_eq!(written, encoded);
        assert!(logs_contain("profile=epsilon"));
    }
}
