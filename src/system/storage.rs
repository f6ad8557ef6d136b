// src/system/storage.rs

use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Failures reported by a [`Storage`] backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// An I/O error from the host filesystem.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// The directory to read does not exist.
    #[error("No such directory: '{0}'")]
    Missing(String),
    /// An entry could not be created under a non-directory.
    #[error("Cannot create '{path}': '{parent}' is not a directory")]
    ParentNotDirectory { path: String, parent: String },
}

/// The narrow view of a filesystem that `ls` and `cd` rely on.
///
/// Implementations only answer questions; nothing in the session core ever writes through
/// this trait. Any I/O failure is reported as a [`StorageError`].
pub trait Storage: Send + Sync {
    fn exists(&self, path: &str) -> bool;
    fn is_dir(&self, path: &str) -> bool;
    fn is_file(&self, path: &str) -> bool;

    /// Names of the entries directly under `path`, in the backend's native order.
    fn list_entries(&self, path: &str) -> Result<Vec<String>, StorageError>;

    /// Resolves `token` against `base` into an absolute path. Absolute tokens ignore `base`.
    fn resolve_absolute(&self, base: &str, token: &str) -> Result<String, StorageError>;
}

/// [`Storage`] backed by the host filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsStorage;

impl OsStorage {
    /// A handle on the host filesystem.
    pub fn new() -> Self {
        Self
    }
}

impl Storage for OsStorage {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn is_dir(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }

    fn is_file(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn list_entries(&self, path: &str) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn resolve_absolute(&self, base: &str, token: &str) -> Result<String, StorageError> {
        let token_path = Path::new(token);
        let joined = if token_path.is_absolute() {
            token_path.to_path_buf()
        } else {
            Path::new(base).join(token_path)
        };
        // `absolute` anchors relative bases at the process cwd without touching the disk.
        let absolute = std::path::absolute(&joined)?;
        let normalized = normalize_lexically(&absolute);
        Ok(dunce::simplified(&normalized).to_string_lossy().into_owned())
    }
}

/// Collapses `.` and `..` components without following symlinks.
/// `..` never climbs above the root or prefix.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            Component::Normal(name) => out.push(name),
        }
    }
    out
}
