// src/system/user_config.rs

use crate::constants::CONFIG_FILENAME;
use crate::models::UserConfig;
use crate::system::paths::{self, PathError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UserConfigError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("Could not access config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Could not serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type UserConfigResult<T> = Result<T, UserConfigError>;

/// Path of `config.toml` inside the configuration directory.
pub fn config_path() -> UserConfigResult<PathBuf> {
    Ok(paths::get_config_dir()?.join(CONFIG_FILENAME))
}

/// Loads the user configuration, writing the defaults out first when the file is missing.
pub fn load_user_config() -> UserConfigResult<UserConfig> {
    load_or_create(&config_path()?)
}

pub fn load_or_create(path: &Path) -> UserConfigResult<UserConfig> {
    if !path.exists() {
        let config = UserConfig::default();
        write_config(path, &config)?;
        log::debug!("wrote default configuration to '{}'", path.display());
        return Ok(config);
    }

    let content = fs::read_to_string(path).map_err(|source| UserConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| UserConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_config(path: &Path, config: &UserConfig) -> UserConfigResult<()> {
    let toml_string = toml::to_string_pretty(config)?;
    fs::write(path, toml_string).map_err(|source| UserConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// The configured descriptor paths with `~` and `$VAR` expanded.
pub fn spec_paths(config: &UserConfig) -> UserConfigResult<Vec<PathBuf>> {
    config
        .spec_paths
        .iter()
        .map(|path| paths::expand_user_path(path).map_err(UserConfigError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);

        let config = load_or_create(&path).unwrap();
        assert_eq!(config, UserConfig::default());
        assert!(path.exists());
        assert_eq!(load_or_create(&path).unwrap(), config);
    }

    #[test]
    fn test_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        let config = UserConfig {
            spec_paths: vec!["/opt/specs".to_string()],
            domains: vec!["macosx".to_string(), "default".to_string()],
            developer_dir: Some("/Developer".to_string()),
            settings: BTreeMap::from([("SDKROOT".to_string(), "macosx".to_string())]),
        };
        write_config(&path, &config).unwrap();
        assert_eq!(load_or_create(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "spec_paths = [\"specs\"]\n").unwrap();

        let config = load_or_create(&path).unwrap();
        assert_eq!(config.spec_paths, ["specs"]);
        assert_eq!(config.domains, UserConfig::default().domains);
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "spec_paths = [").unwrap();
        assert!(matches!(
            load_or_create(&path),
            Err(UserConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_spec_paths_expand_home() {
        let config = UserConfig {
            spec_paths: vec!["/absolute".to_string(), "~/specs".to_string()],
            ..UserConfig::default()
        };
        let expanded = spec_paths(&config).unwrap();
        assert_eq!(expanded[0], PathBuf::from("/absolute"));
        assert!(!expanded[1].to_string_lossy().starts_with('~'));
    }
}
