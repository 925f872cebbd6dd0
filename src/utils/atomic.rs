//! Atomic file operations
//!
//! The version file is rewritten as a whole on every mutation. Writes go
//! to a sibling `.tmp` file, are synced, then renamed over the target so a
//! crash leaves either the old or the new file, never a partial one.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Result type for atomic operations
pub type AtomicResult<T> = Result<T, AtomicError>;

/// Errors that can occur during atomic operations
#[derive(Debug, thiserror::Error)]
pub enum AtomicError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Atomically replace the content of `path`
///
/// Parent directories are created on demand.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> AtomicResult<()> {
    let path = path.as_ref();
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Remove the `.tmp` sibling an interrupted [`atomic_write`] to `path` leaves
///
/// Returns whether a leftover was found.
pub fn remove_temp_file<P: AsRef<Path>>(path: P) -> AtomicResult<bool> {
    let temp_path = path.as_ref().with_extension("tmp");

    match fs::remove_file(&temp_path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_replaces_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracking.jsonl");

        atomic_write(&path, "first\n").unwrap();
        atomic_write(&path, "second\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a").join("b").join("tracking.jsonl");

        atomic_write(&path, "{}").unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_remove_temp_file_only_touches_own_leftover() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracking.jsonl");
        fs::write(temp_dir.path().join("tracking.tmp"), "partial").unwrap();
        fs::write(temp_dir.path().join("other.tmp"), "keep").unwrap();
        fs::write(&path, "keep").unwrap();

        assert!(remove_temp_file(&path).unwrap());
        assert!(!remove_temp_file(&path).unwrap());
        assert!(path.exists());
        assert!(temp_dir.path().join("other.tmp").exists());
    }
}
