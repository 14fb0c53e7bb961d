//! Vault implementations.

use super::Vault;
use crate::models::Note;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// A vault backed by a directory.
///
/// Every regular file below the root is a note named after its file stem.
/// Hidden entries (such as the `.obsidian` settings folder) are skipped.
/// Notes are listed in path order so runs over the same directory see the
/// same pool.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    active: Option<Note>,
}

impl FsVault {
    /// Opens the vault at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::InvalidInput(format!(
                "vault path is not a directory: {}",
                root.display()
            )));
        }
        Ok(Self { root, active: None })
    }

    /// Marks `name` as the note currently open.
    #[must_use]
    pub fn with_active(mut self, name: impl Into<String>) -> Self {
        self.active = Some(Note::new(name));
        self
    }

    fn collect(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
        let entries = std::fs::read_dir(dir).map_err(|e| Error::OperationFailed {
            operation: "read_vault_dir".to_string(),
            cause: format!("{}: {e}", dir.display()),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| Error::OperationFailed {
                operation: "read_vault_entry".to_string(),
                cause: e.to_string(),
            })?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| Error::OperationFailed {
                operation: "read_vault_entry".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;
            if file_type.is_dir() {
                Self::collect(&path, paths)?;
            } else if file_type.is_file() {
                paths.push(path);
            }
        }
        Ok(())
    }
}

impl Vault for FsVault {
    fn files(&self) -> Result<Vec<Note>> {
        let mut paths = Vec::new();
        Self::collect(&self.root, &mut paths)?;
        paths.sort();

        let notes: Vec<Note> = paths
            .iter()
            .filter_map(|path| path.file_stem())
            .map(|stem| Note::new(stem.to_string_lossy()))
            .collect();
        tracing::debug!(root = %self.root.display(), notes = notes.len(), "Listed vault");
        Ok(notes)
    }

    fn active_note(&self) -> Option<Note> {
        self.active.clone()
    }
}

/// A vault held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryVault {
    notes: Vec<Note>,
    active: Option<Note>,
}

impl MemoryVault {
    /// Creates a vault from note names.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            notes: names.into_iter().map(Note::new).collect(),
            active: None,
        }
    }

    /// Marks `name` as the note currently open.
    #[must_use]
    pub fn with_active(mut self, name: impl Into<String>) -> Self {
        self.active = Some(Note::new(name));
        self
    }
}

impl Vault for MemoryVault {
    fn files(&self) -> Result<Vec<Note>> {
        Ok(self.notes.clone())
    }

    fn active_note(&self) -> Option<Note> {
        self.active.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fs_vault_lists_stems_recursively() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Apple.md"), "").unwrap();
        std::fs::create_dir(dir.path().join("fruit")).unwrap();
        std::fs::write(dir.path().join("fruit").join("Banana.md"), "").unwrap();
        std::fs::write(dir.path().join("PNG image 1.png"), "").unwrap();

        let vault = FsVault::open(dir.path()).unwrap();
        let names: Vec<_> = vault
            .files()
            .unwrap()
            .into_iter()
            .map(Note::into_name)
            .collect();

        assert_eq!(names, vec!["Apple", "PNG image 1", "Banana"]);
    }

    #[test]
    fn test_fs_vault_skips_hidden_entries() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(".obsidian")).unwrap();
        std::fs::write(dir.path().join(".obsidian").join("app.json"), "{}").unwrap();
        std::fs::write(dir.path().join("Cherry.md"), "").unwrap();

        let vault = FsVault::open(dir.path()).unwrap();
        assert_eq!(vault.files().unwrap(), vec![Note::new("Cherry")]);
    }

    #[test]
    fn test_fs_vault_rejects_missing_dir() {
        let dir = TempDir::new().unwrap();
        let err = FsVault::open(dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_active_note() {
        let vault = MemoryVault::new(["Apple"]).with_active("Apple");
        assert_eq!(vault.active_note(), Some(Note::new("Apple")));
        assert_eq!(MemoryVault::new(["Apple"]).active_note(), None);
    }
}
