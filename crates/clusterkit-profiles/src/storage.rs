//! Durable reads and writes of a single profile config file
//!
//! Writes are crash-safe: an existing config file is never truncated in place.
//! The new content is staged in a temporary file next to the target and moved
//! over it with a single rename, so readers observe either the old or the new
//! document. A sidecar `.<file>.lock` is held exclusively for the whole save,
//! which serializes writers that go through this module.

use crate::config::ClusterConfig;
use crate::error::ProfileError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, trace};

use fs4::fs_std::FileExt;

/// Store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Spaces per indent level in the written JSON
    pub indent: usize,
    /// Flush file contents (and the directory entry on Unix) before returning
    pub fsync: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            indent: 4,
            fsync: true,
        }
    }
}

impl StoreConfig {
    /// Set the indent width
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Enable or disable fsync
    pub fn with_fsync(mut self, enabled: bool) -> Self {
        self.fsync = enabled;
        self
    }
}

/// Reads and writes config files with atomic replace
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    config: StoreConfig,
}

impl ProfileStore {
    /// Create a store with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Get the store configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Serialize a record exactly as [`ProfileStore::save`] writes it
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Serialization`] if the record cannot be encoded.
    pub fn encode(&self, record: &ClusterConfig) -> Result<Vec<u8>, ProfileError> {
        let indent = vec![b' '; self.config.indent];
        let mut out = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
        record
            .serialize(&mut serializer)
            .map_err(ProfileError::Serialization)?;
        Ok(out)
    }

    /// Write `record` to `path`
    ///
    /// # Error Recovery
    ///
    /// - Missing parent directories are created with owner-only permissions
    /// - A new file is written directly under an exclusive lock
    /// - An existing file is replaced via temp file + rename; on any failure the
    ///   temp file is removed and the existing file is left untouched
    ///
    /// # Errors
    ///
    /// Returns the first serialization, directory, lock, write or rename failure.
    pub fn save(&self, path: &Path, record: &ClusterConfig) -> Result<(), ProfileError> {
        let data = self.encode(record)?;
        self.save_encoded(path, &data)
    }

    /// Write bytes produced by [`ProfileStore::encode`] to `path`
    ///
    /// Same locking and replace behavior as [`ProfileStore::save`]. The bytes
    /// are written as given.
    ///
    /// # Errors
    ///
    /// Returns the first directory, lock, write or rename failure.
    pub fn save_encoded(&self, path: &Path, data: &[u8]) -> Result<(), ProfileError> {
        let dir = parent_dir(path)?;
        create_private_dir(dir)?;

        let lock = SidecarLock::acquire(path)?;

        match fs::metadata(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?path, "Writing new config file");
                let mut file = open_private(path)?;
                write_locked(&mut file, path, data, self.config.fsync)?;
                if self.config.fsync {
                    sync_dir(dir)?;
                }
                return Ok(());
            }
            Err(e) => return Err(ProfileError::io("stat", path, e)),
            Ok(_) => {}
        }

        self.stage_bytes(path, dir, data, lock)?.commit()
    }

    /// Stage `record` in a temporary file next to `path` without replacing it
    ///
    /// The returned guard holds the write lock. [`StagedWrite::commit`] moves
    /// the staged file into place; dropping the guard discards it.
    ///
    /// # Errors
    ///
    /// Returns serialization, directory, lock or write failures. No temp file
    /// remains after an error.
    pub fn stage(&self, path: &Path, record: &ClusterConfig) -> Result<StagedWrite, ProfileError> {
        let data = self.encode(record)?;
        let dir = parent_dir(path)?;
        create_private_dir(dir)?;

        let lock = SidecarLock::acquire(path)?;
        self.stage_bytes(path, dir, &data, lock)
    }

    fn stage_bytes(
        &self,
        path: &Path,
        dir: &Path,
        data: &[u8],
        lock: SidecarLock,
    ) -> Result<StagedWrite, ProfileError> {
        let prefix = format!("{}.tmp", file_name(path));
        let mut temp = tempfile::Builder::new()
            .prefix(&prefix)
            .tempfile_in(dir)
            .map_err(|e| ProfileError::io("create temp file in", dir, e))?;

        let temp_path = temp.path().to_path_buf();
        write_locked(temp.as_file_mut(), &temp_path, data, self.config.fsync)?;
        trace!(temp = ?temp_path, target = ?path, bytes = data.len(), "Staged config");

        Ok(StagedWrite {
            temp,
            target: path.to_path_buf(),
            fsync: self.config.fsync,
            _lock: lock,
        })
    }

    /// Read and decode the config file at `path`
    ///
    /// # Errors
    ///
    /// - [`ProfileError::NotFound`] if the file does not exist
    /// - [`ProfileError::Malformed`] if it is not a valid config document
    /// - [`ProfileError::Io`] for other read failures
    pub fn load(&self, path: &Path) -> Result<ClusterConfig, ProfileError> {
        debug!(path = ?path, "Loading config file");

        let bytes = fs::read(path).map_err(|e| ProfileError::io("read", path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| ProfileError::malformed(path, e))
    }
}

/// A fully written temporary file waiting to replace its target
#[derive(Debug)]
pub struct StagedWrite {
    temp: NamedTempFile,
    target: PathBuf,
    fsync: bool,
    _lock: SidecarLock,
}

impl StagedWrite {
    /// Path of the staged temporary file
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Path the staged file will replace
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Move the staged file over the target in one rename
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Io`] if the rename fails; the temp file is then
    /// removed and the target is unchanged.
    pub fn commit(self) -> Result<(), ProfileError> {
        let Self {
            temp,
            target,
            fsync,
            _lock,
        } = self;

        temp.persist(&target)
            .map_err(|e| ProfileError::io("rename temp file to", &target, e.error))?;

        if fsync {
            sync_dir(parent_dir(&target)?)?;
        }
        debug!(path = ?target, "Replaced config file");
        Ok(())
    }
}

/// Exclusive advisory lock on `.<file>.lock` next to the config file
#[derive(Debug)]
struct SidecarLock {
    file: File,
    path: PathBuf,
}

impl SidecarLock {
    fn acquire(target: &Path) -> Result<Self, ProfileError> {
        let path = lock_path(target);
        let file = open_private(&path)?;
        FileExt::lock_exclusive(&file).map_err(|e| ProfileError::io("lock", &path, e))?;
        Ok(Self { file, path })
    }
}

impl Drop for SidecarLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!(path = ?self.path, error = %e, "Failed to release lock, closing handle");
        }
    }
}

fn lock_path(target: &Path) -> PathBuf {
    target.with_file_name(format!(".{}.lock", file_name(target)))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::paths::CONFIG_FILE_NAME.to_string())
}

fn parent_dir(path: &Path) -> Result<&Path, ProfileError> {
    path.parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .ok_or_else(|| {
            ProfileError::io(
                "resolve parent directory of",
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "path has no parent directory"),
            )
        })
}

fn create_private_dir(dir: &Path) -> Result<(), ProfileError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
        .create(dir)
        .map_err(|e| ProfileError::io("create directory", dir, e))
}

fn open_private(path: &Path) -> Result<File, ProfileError> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options
        .open(path)
        .map_err(|e| ProfileError::io("open", path, e))
}

/// Replace the whole content of `file` while holding an exclusive lock on it
fn write_locked(file: &mut File, path: &Path, data: &[u8], fsync: bool) -> Result<(), ProfileError> {
    FileExt::lock_exclusive(&*file).map_err(|e| ProfileError::io("lock", path, e))?;

    file.set_len(0)
        .map_err(|e| ProfileError::io("truncate", path, e))?;
    file.write_all(data)
        .map_err(|e| ProfileError::io("write", path, e))?;
    if fsync {
        file.sync_all()
            .map_err(|e| ProfileError::io("sync", path, e))?;
    }

    FileExt::unlock(&*file).map_err(|e| ProfileError::io("unlock", path, e))
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), ProfileError> {
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| ProfileError::io("sync directory", dir, e))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), ProfileError> {
    Ok(())
}
