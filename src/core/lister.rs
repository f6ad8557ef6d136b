// src/core/lister.rs

use crate::{
    models::{Entry, EntryKind},
    system::storage::{Storage, StorageError},
};
use thiserror::Error;

/// Why a directory could not be listed.
#[derive(Error, Debug)]
pub enum ListError {
    /// Nothing exists at the path.
    #[error("Path not found: {0}")]
    NotFound(String),
    /// The path exists but is a file or something else.
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    /// The storage itself failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Lists the entries of `path`, keeping the storage's own enumeration order.
pub fn list(storage: &dyn Storage, path: &str) -> Result<Vec<Entry>, ListError> {
    if !storage.exists(path) {
        return Err(ListError::NotFound(path.to_string()));
    }
    if !storage.is_dir(path) {
        return Err(ListError::NotADirectory(path.to_string()));
    }

    storage
        .list_entries(path)?
        .into_iter()
        .map(|name| -> Result<Entry, ListError> {
            let full_path = storage.resolve_absolute(path, &name)?;
            Ok(Entry {
                kind: classify(storage, &full_path),
                name,
            })
        })
        .collect()
}

/// Directory first, then regular file; everything else falls through to `Link`.
pub fn classify(storage: &dyn Storage, full_path: &str) -> EntryKind {
    if storage.is_dir(full_path) {
        EntryKind::Dir
    } else if storage.is_file(full_path) {
        EntryKind::File
    } else {
        EntryKind::Link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::memory_storage::MemoryStorage;

    #[test]
    fn test_list_keeps_enumeration_order_and_kinds() {
        let mut storage = MemoryStorage::new();
        storage.add_file("C:\\work\\zeta.txt").unwrap();
        storage.add_dir("C:\\work\\alpha").unwrap();
        storage.add_link("C:\\work\\current").unwrap();

        let entries = list(&storage, "C:\\work").unwrap();
        let summary: Vec<(&str, EntryKind)> =
            entries.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert_eq!(
            summary,
            vec![
                ("zeta.txt", EntryKind::File),
                ("alpha", EntryKind::Dir),
                ("current", EntryKind::Link),
            ]
        );
    }

    #[test]
    fn test_list_missing_path() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            list(&storage, "C:\\nowhere"),
            Err(ListError::NotFound(p)) if p == "C:\\nowhere"
        ));
    }

    #[test]
    fn test_list_file_is_not_a_directory() {
        let mut storage = MemoryStorage::new();
        storage.add_file("C:\\readme.md").unwrap();
        assert!(matches!(
            list(&storage, "C:\\readme.md"),
            Err(ListError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_empty_directory_lists_nothing() {
        let mut storage = MemoryStorage::new();
        storage.add_dir("C:\\empty").unwrap();
        assert!(list(&storage, "C:\\empty").unwrap().is_empty());
    }
}
