// src/system/paths.rs

//! # Path Utilities
//!
//! Build settings carry paths as plain `/`-separated strings, and the path operators
//! (`:dir`, `:base`, ...) must produce exactly the text a build log would show. The
//! helpers here therefore work on strings lexically and never touch the filesystem,
//! except for [`find_executable`] and the configuration directory lookup.

use crate::constants::{CONFIG_DIR_ENV, CONFIG_DIR_NAME};
use lazy_static::lazy_static;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

lazy_static! {
    static ref CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not create config directory at '{path}': {source}")]
    ConfigDirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not expand path '{path}': {message}")]
    Expansion { path: String, message: String },
}

// --- LEXICAL PATH ALGEBRA ---

pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// Collapses repeated separators and `.` components and resolves `..` lexically.
pub fn normalize_path(path: &str) -> String {
    let absolute = is_absolute(path);
    let mut components: Vec<&str> = Vec::new();

    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => match components.last() {
                Some(&last) if last != ".." => {
                    components.pop();
                }
                _ if absolute => {}
                _ => components.push(".."),
            },
            other => components.push(other),
        }
    }

    let joined = components.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

fn trim_trailing_separators(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && !path.is_empty() { "/" } else { trimmed }
}

/// The last path component: `/a/b.txt` is `b.txt`.
pub fn base_name(path: &str) -> &str {
    let trimmed = trim_trailing_separators(path);
    if trimmed == "/" {
        return trimmed;
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// The last path component without its extension: `/a/b.tar.gz` is `b.tar`.
pub fn base_name_without_extension(path: &str) -> &str {
    let base = base_name(path);
    match base.rfind('.') {
        Some(dot) if dot > 0 => base.get(..dot).unwrap_or(base),
        _ => base,
    }
}

/// Everything before the last component, without resolving `..`:
/// `/path/to/../file.ext` is `/path/to/..`.
pub fn directory_name(path: &str) -> &str {
    let trimmed = trim_trailing_separators(path);
    match trimmed.rfind('/') {
        Some(0) => "/",
        Some(slash) => trimmed.get(..slash).unwrap_or_default(),
        None => "",
    }
}

/// The text after the last `.` of the last component, or empty when there is none.
pub fn file_extension(path: &str) -> &str {
    let base = base_name(path);
    match base.rfind('.') {
        Some(dot) if dot > 0 => base.get(dot + 1..).unwrap_or_default(),
        _ => "",
    }
}

/// Joins a relative `path` onto `base`. Absolute paths, and any path when `base` is
/// empty, are returned unchanged.
pub fn resolve_relative_path(path: &str, base: &str) -> String {
    if is_absolute(path) || base.is_empty() {
        path.to_string()
    } else {
        normalize_path(&format!("{base}/{path}"))
    }
}

/// Expresses `path` relative to `base`, walking up with `..` where the two diverge.
pub fn relative_path(path: &str, base: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }

    let path = normalize_path(path);
    let base = normalize_path(base);
    let path_parts: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
    let base_parts: Vec<&str> = base.split('/').filter(|c| !c.is_empty()).collect();

    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; base_parts.len().saturating_sub(common)];
    parts.extend(path_parts.iter().skip(common));

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

// --- FILESYSTEM LOOKUPS ---

/// Searches `search_paths` in order for an executable file named `name`.
pub fn find_executable(name: &str, search_paths: &[PathBuf]) -> Option<PathBuf> {
    search_paths
        .iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
        .map(|found| dunce::simplified(&found).to_path_buf())
}

/// Splits a `PATH`-style value into directories.
pub fn split_search_paths(value: &str) -> Vec<PathBuf> {
    env::split_paths(value).collect()
}

/// Expands `~` and `$VAR` references in a user supplied path.
pub fn expand_user_path(path: &str) -> Result<PathBuf, PathError> {
    shellexpand::full(path)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| PathError::Expansion {
            path: path.to_string(),
            message: e.to_string(),
        })
}

/// Returns the configuration directory (`~/.config/xcsettings` unless overridden by
/// `XCSETTINGS_CONFIG_DIR`), creating it when missing. The result is cached.
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    let mut cached = CONFIG_DIR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    let config_path = match env::var_os(CONFIG_DIR_ENV) {
        Some(dir) => PathBuf::from(dir),
        None => dirs::config_dir()
            .ok_or(PathError::ConfigDirNotFound)?
            .join(CONFIG_DIR_NAME),
    };

    ensure_dir(&config_path)?;
    *cached = Some(config_path.clone());
    Ok(config_path)
}

fn ensure_dir(path: &Path) -> Result<(), PathError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| PathError::ConfigDirCreation {
            path: path.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}
