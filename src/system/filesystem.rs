// src/system/filesystem.rs

//! File access behind a trait, so xcconfig loading and tool lookup can run against an
//! in-memory tree in tests.

use crate::system::paths;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilesystemError {
    #[error("File not found: '{0}'")]
    NotFound(String),
    #[error("Could not read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("File '{0}' is not valid UTF-8.")]
    InvalidUtf8(String),
}

pub trait Filesystem: Send + Sync {
    fn exists(&self, path: &str) -> bool;

    fn is_directory(&self, path: &str) -> bool;

    fn read(&self, path: &str) -> Result<Vec<u8>, FilesystemError>;

    fn write(&mut self, path: &str, contents: &[u8]) -> Result<(), FilesystemError>;

    fn read_to_string(&self, path: &str) -> Result<String, FilesystemError> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|_| FilesystemError::InvalidUtf8(path.to_string()))
    }

    fn is_file(&self, path: &str) -> bool {
        self.exists(path) && !self.is_directory(path)
    }
}

// --- DISK ---

#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFilesystem;

impl Filesystem for DiskFilesystem {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn is_directory(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, FilesystemError> {
        fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FilesystemError::NotFound(path.to_string()),
            _ => FilesystemError::Read {
                path: path.to_string(),
                source: e,
            },
        })
    }

    fn write(&mut self, path: &str, contents: &[u8]) -> Result<(), FilesystemError> {
        fs::write(path, contents).map_err(|e| FilesystemError::Write {
            path: path.to_string(),
            source: e,
        })
    }
}

// --- MEMORY ---

/// An in-memory tree keyed by normalized absolute path. Directories exist implicitly
/// as the parents of stored files.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, contents: impl AsRef<[u8]>) -> Self {
        self.files
            .insert(paths::normalize_path(path), contents.as_ref().to_vec());
        self
    }
}

impl Filesystem for MemoryFilesystem {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(&paths::normalize_path(path)) || self.is_directory(path)
    }

    fn is_directory(&self, path: &str) -> bool {
        let dir = paths::normalize_path(path);
        let prefix = if dir.ends_with('/') {
            dir
        } else {
            format!("{dir}/")
        };
        self.files.keys().any(|file| file.starts_with(&prefix))
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, FilesystemError> {
        self.files
            .get(&paths::normalize_path(path))
            .cloned()
            .ok_or_else(|| FilesystemError::NotFound(path.to_string()))
    }

    fn write(&mut self, path: &str, contents: &[u8]) -> Result<(), FilesystemError> {
        self.files
            .insert(paths::normalize_path(path), contents.to_vec());
        Ok(())
    }
}
