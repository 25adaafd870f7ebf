//! Storage root resolution and profile path derivation

use crate::error::ProfileError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable overriding the default storage root
pub const HOME_ENV_VAR: &str = "CLUSTERKIT_HOME";

/// Directory under the home directory used when [`HOME_ENV_VAR`] is unset
pub const DEFAULT_DIR_NAME: &str = ".clusterkit";

/// Directory under the storage root holding one subdirectory per profile
pub const PROFILES_DIR: &str = "profiles";

/// Name of the config file inside a profile directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Source of the default storage root
pub trait StorageRootProvider {
    /// Return the storage root used when a caller passes no override
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::NoStorageRoot`] if no root can be determined.
    fn storage_root(&self) -> Result<PathBuf, ProfileError>;
}

/// Resolves the root from `CLUSTERKIT_HOME`, falling back to `~/.clusterkit`
#[derive(Debug, Clone, Copy, Default)]
pub struct HomeRoot;

impl HomeRoot {
    /// Pick the root from an environment value and a home directory
    pub fn resolve_from(env_value: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
        match env_value {
            Some(value) if !value.is_empty() => Some(PathBuf::from(value)),
            _ => home.map(|home| home.join(DEFAULT_DIR_NAME)),
        }
    }
}

impl StorageRootProvider for HomeRoot {
    fn storage_root(&self) -> Result<PathBuf, ProfileError> {
        Self::resolve_from(std::env::var_os(HOME_ENV_VAR), dirs::home_dir())
            .ok_or(ProfileError::NoStorageRoot)
    }
}

/// Always resolves to the same root
#[derive(Debug, Clone)]
pub struct FixedRoot(pub PathBuf);

impl FixedRoot {
    /// Create a provider for `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self(root.into())
    }
}

impl StorageRootProvider for FixedRoot {
    fn storage_root(&self) -> Result<PathBuf, ProfileError> {
        Ok(self.0.clone())
    }
}

/// Return `root_override` if given, otherwise the provider's default root
///
/// # Errors
///
/// Propagates the provider's error when no override is given.
pub fn resolve_root<P>(root_override: Option<&Path>, provider: &P) -> Result<PathBuf, ProfileError>
where
    P: StorageRootProvider + ?Sized,
{
    match root_override {
        Some(root) => Ok(root.to_path_buf()),
        None => provider.storage_root(),
    }
}

/// `<root>/profiles`
pub fn profiles_dir(root: &Path) -> PathBuf {
    root.join(PROFILES_DIR)
}

/// `<root>/profiles/<name>`
pub fn profile_folder_path(root: &Path, name: &str) -> PathBuf {
    profiles_dir(root).join(name)
}

/// `<root>/profiles/<name>/config.json`
pub fn profile_file_path(root: &Path, name: &str) -> PathBuf {
    profile_folder_path(root, name).join(CONFIG_FILE_NAME)
}

/// Reject names that would not map to exactly one directory under `profiles/`
///
/// # Errors
///
/// Returns [`ProfileError::InvalidName`] describing the first problem found.
pub fn validate_profile_name(name: &str) -> Result<(), ProfileError> {
    if name.is_empty() {
        return Err(ProfileError::invalid_name(name, "name is empty"));
    }
    if name == "." || name == ".." {
        return Err(ProfileError::invalid_name(name, "name is a relative path"));
    }
    if name.contains(['/', '\\']) {
        return Err(ProfileError::invalid_name(
            name,
            "name contains a path separator",
        ));
    }
    if name.contains('\0') {
        return Err(ProfileError::invalid_name(name, "name contains a NUL byte"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_paths() {
        let root = Path::new("/var/lib/ck");
        assert_eq!(
            profile_folder_path(root, "alpha"),
            PathBuf::from("/var/lib/ck/profiles/alpha")
        );
        assert_eq!(
            profile_file_path(root, "alpha"),
            PathBuf::from("/var/lib/ck/profiles/alpha/config.json")
        );
    }

    #[test]
    fn test_resolve_root_prefers_override() {
        let provider = FixedRoot::new("/default");
        let resolved = resolve_root(Some(Path::new("/explicit")), &provider);
        assert!(matches!(resolved, Ok(p) if p == Path::new("/explicit")));

        let resolved = resolve_root(None, &provider);
        assert!(matches!(resolved, Ok(p) if p == Path::new("/default")));
    }

    #[test]
    fn test_home_root_prefers_env() {
        let root = HomeRoot::resolve_from(
            Some(OsString::from("/srv/ck")),
            Some(PathBuf::from("/home/user")),
        );
        assert_eq!(root, Some(PathBuf::from("/srv/ck")));
    }

    #[test]
    fn test_home_root_falls_back_to_home() {
        let root = HomeRoot::resolve_from(Some(OsString::new()), Some(PathBuf::from("/home/user")));
        assert_eq!(root, Some(PathBuf::from("/home/user/.clusterkit")));

        let root = HomeRoot::resolve_from(None, Some(PathBuf::from("/home/user")));
        assert_eq!(root, Some(PathBuf::from("/home/user/.clusterkit")));
    }

    #[test]
    fn test_home_root_without_home() {
        assert_eq!(HomeRoot::resolve_from(None, None), None);
    }

    #[test]
    fn test_validate_profile_name() {
        assert!(validate_profile_name("dev").is_ok());
        assert!(validate_profile_name("p1.dev-cluster_2").is_ok());

        for bad in ["", ".", "..", "a/b", "a\\b", "nul\0name"] {
            let result = validate_profile_name(bad);
            assert!(
                matches!(result, Err(ProfileError::InvalidName { .. })),
                "{bad:?} should be rejected"
            );
        }
    }
}
