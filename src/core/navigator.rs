// src/core/navigator.rs

use crate::{
    constants::{FORBIDDEN_PATH_CHAR, PARENT_DIR_TOKEN, PATH_SEPARATOR, ROOT_PATH},
    system::storage::{Storage, StorageError},
};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    /// A bare drive segment such as `C:`.
    static ref DRIVE_SEGMENT: Regex =
        Regex::new(r"^[A-Za-z]:$").expect("drive pattern is a valid regex");
}

/// True for a bare drive segment like `C:`.
pub fn is_drive_segment(segment: &str) -> bool {
    DRIVE_SEGMENT.is_match(segment)
}

/// Why `cd` refused to move.
#[derive(Error, Debug)]
pub enum NavigationError {
    /// The token contains `/`.
    #[error("'/' is not a valid character when changing the path")]
    InvalidCharacter,
    /// The token does not name an existing directory. Carries the token as typed.
    #[error("Directory not found: {0}")]
    NotFound(String),
    /// The storage itself failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Computes the path `cd <token>` would move to from `current_path`.
///
/// The storage is only queried. Tokens containing `/` are always rejected, and `\` is the only
/// structural separator.
pub fn resolve(
    storage: &dyn Storage,
    current_path: &str,
    token: &str,
) -> Result<String, NavigationError> {
    if token.contains(FORBIDDEN_PATH_CHAR) {
        return Err(NavigationError::InvalidCharacter);
    }

    if token == PARENT_DIR_TOKEN {
        return Ok(parent_of(current_path));
    }

    let candidate = storage.resolve_absolute(current_path, token)?;
    if storage.exists(&candidate) && storage.is_dir(&candidate) {
        Ok(candidate)
    } else {
        Err(NavigationError::NotFound(token.to_string()))
    }
}

/// Normalizes the path a session starts in. Anything that is not an existing directory once
/// resolved against the root falls back to the root itself.
pub fn resolve_start(storage: &dyn Storage, requested: &str) -> String {
    let requested = requested.trim();
    if requested.contains(FORBIDDEN_PATH_CHAR) {
        log::warn!("Start path '{}' contains '/', starting at the root.", requested);
        return ROOT_PATH.to_string();
    }
    match storage.resolve_absolute(ROOT_PATH, requested) {
        Ok(path) if storage.is_dir(&path) => path,
        Ok(path) => {
            log::warn!("Start path '{}' is not a directory, starting at the root.", path);
            ROOT_PATH.to_string()
        }
        Err(e) => {
            log::warn!("Could not resolve start path '{}': {}", requested, e);
            ROOT_PATH.to_string()
        }
    }
}

/// Drops the last non-empty segment of `path`. The floor is the root of the path's own drive
/// (`D:\games` and `D:\` both give `D:\`); a path without a drive clamps to the root.
pub fn parent_of(path: &str) -> String {
    let mut segments: Vec<&str> = path.split(PATH_SEPARATOR).filter(|s| !s.is_empty()).collect();
    let drive = segments.first().copied().filter(|s| is_drive_segment(s));
    segments.pop();

    match (segments.as_slice(), drive) {
        ([], Some(drive)) | ([_], Some(drive)) => format!("{}{}", drive, PATH_SEPARATOR),
        ([], None) => ROOT_PATH.to_string(),
        _ => segments.join(&PATH_SEPARATOR.to_string()),
    }
}
