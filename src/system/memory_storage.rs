// src/system/memory_storage.rs

use crate::{
    core::navigator::is_drive_segment,
    constants::{DEFAULT_HOME_FOLDERS, DEFAULT_START_PATH, PARENT_DIR_TOKEN, PATH_SEPARATOR},
    models::EntryKind,
    system::storage::{Storage, StorageError},
};
use std::collections::HashMap;

const DEFAULT_DRIVE: &str = "C:";

#[derive(Debug, Clone)]
struct Node {
    kind: EntryKind,
    /// Child names in insertion order.
    children: Vec<String>,
}

impl Node {
    fn new(kind: EntryKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }
}

/// A synthetic filesystem living entirely in memory.
///
/// Paths use the `C:\a\b` convention with `\` as the only separator. Every node is keyed by
/// its normalized absolute path, and listings come back in insertion order.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    nodes: HashMap<String, Node>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// An empty tree holding only the `C:\` root.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(render(&[DEFAULT_DRIVE.to_string()]), Node::new(EntryKind::Dir));
        Self { nodes }
    }

    /// The tree a fresh session starts in: the default home with its usual folders.
    pub fn with_default_tree() -> Self {
        let mut storage = Self::new();
        for folder in DEFAULT_HOME_FOLDERS {
            // The default tree only contains directories, so this cannot collide with a file.
            let path = format!("{}{}{}", DEFAULT_START_PATH, PATH_SEPARATOR, folder);
            if let Err(e) = storage.add_dir(&path) {
                log::warn!("Could not seed '{}': {}", path, e);
            }
        }
        storage
    }

    /// Creates a directory and any missing parents.
    pub fn add_dir(&mut self, path: &str) -> Result<(), StorageError> {
        self.insert(path, EntryKind::Dir)
    }

    /// Creates a regular file, creating missing parent directories.
    pub fn add_file(&mut self, path: &str) -> Result<(), StorageError> {
        self.insert(path, EntryKind::File)
    }

    /// Creates an entry that is neither a directory nor a regular file.
    pub fn add_link(&mut self, path: &str) -> Result<(), StorageError> {
        self.insert(path, EntryKind::Link)
    }

    fn insert(&mut self, path: &str, kind: EntryKind) -> Result<(), StorageError> {
        let segments = normalize(&[DEFAULT_DRIVE.to_string()], path);
        let mut current = vec![segments.first().cloned().unwrap_or_else(|| DEFAULT_DRIVE.to_string())];
        self.nodes
            .entry(render(&current))
            .or_insert_with(|| Node::new(EntryKind::Dir));

        let last_index = segments.len().saturating_sub(1);
        for (index, name) in segments.iter().enumerate().skip(1) {
            let parent_key = render(&current);
            current.push(name.clone());
            let key = render(&current);
            let node_kind = if index == last_index { kind } else { EntryKind::Dir };

            if self.nodes.contains_key(&key) {
                continue;
            }
            match self.nodes.get_mut(&parent_key) {
                Some(parent) if parent.kind == EntryKind::Dir => parent.children.push(name.clone()),
                _ => {
                    return Err(StorageError::ParentNotDirectory {
                        path: path.to_string(),
                        parent: parent_key,
                    });
                }
            }
            self.nodes.insert(key, Node::new(node_kind));
        }
        Ok(())
    }

    fn node(&self, path: &str) -> Option<&Node> {
        let segments = normalize(&[DEFAULT_DRIVE.to_string()], path);
        self.nodes.get(&render(&segments))
    }
}

impl Storage for MemoryStorage {
    fn exists(&self, path: &str) -> bool {
        self.node(path).is_some()
    }

    fn is_dir(&self, path: &str) -> bool {
        self.node(path).is_some_and(|n| n.kind == EntryKind::Dir)
    }

    fn is_file(&self, path: &str) -> bool {
        self.node(path).is_some_and(|n| n.kind == EntryKind::File)
    }

    fn list_entries(&self, path: &str) -> Result<Vec<String>, StorageError> {
        match self.node(path) {
            Some(node) if node.kind == EntryKind::Dir => Ok(node.children.clone()),
            _ => Err(StorageError::Missing(path.to_string())),
        }
    }

    fn resolve_absolute(&self, base: &str, token: &str) -> Result<String, StorageError> {
        let base_segments = normalize(&[DEFAULT_DRIVE.to_string()], base);
        Ok(render(&normalize(&base_segments, token)))
    }
}

/// Splits a path into segments, dropping empty and `.` parts.
fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split(PATH_SEPARATOR).filter(|s| !s.is_empty() && *s != ".")
}

/// Resolves `token` against already-normalized `base` segments.
///
/// The result always starts with a drive segment. Tokens starting with a drive restart from
/// that drive; tokens starting with `\` restart from the base's drive.
fn normalize(base: &[String], token: &str) -> Vec<String> {
    let base_drive = base
        .first()
        .filter(|s| is_drive_segment(s))
        .cloned()
        .unwrap_or_else(|| DEFAULT_DRIVE.to_string());

    let first = split(token).next();
    let (mut segments, rest): (Vec<String>, Vec<&str>) = match first {
        Some(drive) if is_drive_segment(drive) => {
            (vec![drive.to_uppercase()], split(token).skip(1).collect())
        }
        _ if token.starts_with(PATH_SEPARATOR) => (vec![base_drive], split(token).collect()),
        _ => {
            let mut anchored = vec![base_drive];
            anchored.extend(base.iter().skip(1).cloned());
            (anchored, split(token).collect())
        }
    };

    for part in rest {
        if part == PARENT_DIR_TOKEN {
            if segments.len() > 1 {
                segments.pop();
            }
        } else {
            segments.push(part.to_string());
        }
    }
    segments
}

/// Joins segments back into a path; a lone drive renders as its root (`C:\`).
fn render(segments: &[String]) -> String {
    match segments {
        [] => format!("{}{}", DEFAULT_DRIVE, PATH_SEPARATOR),
        [drive] => format!("{}{}", drive, PATH_SEPARATOR),
        _ => segments.join(&PATH_SEPARATOR.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tree_has_home_folders_in_order() {
        let storage = MemoryStorage::with_default_tree();
        assert!(storage.is_dir("C:\\Users\\owner"));
        assert_eq!(
            storage.list_entries("C:\\Users\\owner").unwrap(),
            vec!["Desktop", "Documents", "Music", "Videos"]
        );
        assert_eq!(storage.list_entries("C:\\").unwrap(), vec!["Users"]);
    }

    #[test]
    fn test_add_entries_creates_parents_and_kinds() {
        let mut storage = MemoryStorage::new();
        storage.add_file("C:\\data\\report.txt").unwrap();
        storage.add_link("C:\\data\\shortcut").unwrap();

        assert!(storage.is_dir("C:\\data"));
        assert!(storage.is_file("C:\\data\\report.txt"));
        assert!(storage.exists("C:\\data\\shortcut"));
        assert!(!storage.is_dir("C:\\data\\shortcut"));
        assert!(!storage.is_file("C:\\data\\shortcut"));
    }

    #[test]
    fn test_cannot_create_under_a_file() {
        let mut storage = MemoryStorage::new();
        storage.add_file("C:\\notes").unwrap();
        let result = storage.add_dir("C:\\notes\\inner");
        assert!(matches!(result, Err(StorageError::ParentNotDirectory { .. })));
    }

    #[test]
    fn test_resolve_absolute_relative_and_absolute_tokens() {
        let storage = MemoryStorage::new();
        let base = "C:\\Users\\owner";
        assert_eq!(
            storage.resolve_absolute(base, "Documents").unwrap(),
            "C:\\Users\\owner\\Documents"
        );
        assert_eq!(storage.resolve_absolute(base, "..\\..").unwrap(), "C:\\");
        assert_eq!(storage.resolve_absolute(base, "..\\..\\..\\..").unwrap(), "C:\\");
        assert_eq!(storage.resolve_absolute(base, ".\\Music\\.").unwrap(), "C:\\Users\\owner\\Music");
        assert_eq!(storage.resolve_absolute(base, "\\Windows").unwrap(), "C:\\Windows");
        assert_eq!(storage.resolve_absolute(base, "d:\\games").unwrap(), "D:\\games");
        assert_eq!(storage.resolve_absolute(base, "").unwrap(), base);
    }

    #[test]
    fn test_list_entries_on_file_is_missing() {
        let mut storage = MemoryStorage::new();
        storage.add_file("C:\\a.txt").unwrap();
        assert!(matches!(
            storage.list_entries("C:\\a.txt"),
            Err(StorageError::Missing(_))
        ));
    }
}
