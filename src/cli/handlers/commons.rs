// src/cli/handlers/commons.rs

// Shared helpers for the command handlers.

use crate::{
    CancellationToken,
    cli::args::EnvironmentArgs,
    core::{
        condition::Condition, defaults, environment::Environment, level::Level, setting::Setting,
        xcconfig::Config,
    },
    models::UserConfig,
    system::{filesystem::DiskFilesystem, paths, user_config},
    tool::registry::ToolRegistry,
};
use anyhow::{Context, Result, anyhow};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

/// Returns an error if the user asked to cancel.
pub fn check_for_cancellation(cancellation_token: &CancellationToken) -> Result<()> {
    if cancellation_token.load(Ordering::SeqCst) {
        return Err(anyhow!("Operation was cancelled by the user."));
    }
    Ok(())
}

/// Builds the settings environment described by `args`, highest priority first:
///
/// 1. `--set` overrides.
/// 2. `--xcconfig` files, the last one winning.
/// 3. Settings from the user configuration.
/// 4. The process environment, local directories and native architectures.
/// 5. `DEVELOPER_DIR` from the user configuration.
pub fn build_environment(args: &EnvironmentArgs, config: &UserConfig) -> Result<Environment> {
    let mut environment = Environment::new();

    if args.no_process_env {
        environment.insert_back(defaults::local_level(), true);
        environment.insert_back(defaults::architecture_level(), true);
    } else {
        for level in defaults::process_levels() {
            environment.insert_back(level, true);
        }
    }
    if let Some(developer_dir) = &config.developer_dir {
        environment.insert_back(
            Level::new(vec![Setting::create("DEVELOPER_DIR", developer_dir)]),
            true,
        );
    }

    if !config.settings.is_empty() {
        let level: Level = config
            .settings
            .iter()
            .map(|(name, value)| Setting::parse_pair(name, value))
            .collect();
        environment.insert_front(level, false);
    }

    for path in &args.xcconfigs {
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("Path '{}' is not valid UTF-8.", path.display()))?;
        let config = Config::load(&DiskFilesystem, &environment, path_str)
            .with_context(|| format!("Failed to load xcconfig '{}'", path.display()))?;
        log::debug!("loaded {} settings from '{}'", config.level().settings().len(), path_str);
        environment.insert_front(config.level(), false);
    }

    if !args.overrides.is_empty() {
        let level = args
            .overrides
            .iter()
            .map(|text| {
                Setting::parse(text).ok_or_else(|| anyhow!("Invalid setting override '{}'.", text))
            })
            .collect::<Result<Vec<Setting>>>()?;
        environment.insert_front(Level::new(level), false);
    }

    Ok(environment)
}

/// Parses `--condition KEY=VALUE` arguments into an evaluation context.
pub fn parse_conditions(conditions: &[String]) -> Result<Condition> {
    let values = conditions
        .iter()
        .map(|text| {
            text.split_once('=')
                .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| anyhow!("Invalid condition '{}', expected KEY=VALUE.", text))
        })
        .collect::<Result<BTreeMap<String, String>>>()?;
    Ok(Condition::new(values))
}

/// Loads the tool registry from `extra` paths followed by the configured ones.
pub fn load_registry(extra: &[PathBuf], config: &UserConfig) -> Result<ToolRegistry> {
    let mut spec_paths = extra.to_vec();
    spec_paths.extend(user_config::spec_paths(config)?);
    if spec_paths.is_empty() {
        return Err(anyhow!(
            "No tool descriptor paths configured. Pass --specs or add spec_paths to '{}'.",
            user_config::config_path()?.display()
        ));
    }

    let registry = ToolRegistry::load(&spec_paths).context("Failed to load tool descriptors")?;
    log::debug!("loaded {} tools", registry.len());
    Ok(registry)
}

/// The current directory as a string.
pub fn current_dir() -> Result<String> {
    let dir = std::env::current_dir().context("Could not determine the current directory")?;
    path_to_string(&dir)
}

pub fn path_to_string(path: &std::path::Path) -> Result<String> {
    let simplified = dunce::simplified(path);
    simplified
        .to_str()
        .map(paths::normalize_path)
        .ok_or_else(|| anyhow!("Path '{}' is not valid UTF-8.", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    fn args() -> EnvironmentArgs {
        EnvironmentArgs {
            no_process_env: true,
            ..EnvironmentArgs::default()
        }
    }

    #[test]
    fn test_environment_layers() {
        let dir = tempfile::tempdir().unwrap();
        let xcconfig = dir.path().join("Base.xcconfig");
        fs::write(&xcconfig, "NAME = from-xcconfig\nOTHER = $(inherited) -xc\n").unwrap();

        let config = UserConfig {
            developer_dir: Some("/Developer".to_string()),
            settings: BTreeMap::from([
                ("OTHER".to_string(), "-config".to_string()),
                ("NAME".to_string(), "from-config".to_string()),
            ]),
            ..UserConfig::default()
        };
        let mut environment_args = args();
        environment_args.xcconfigs = vec![xcconfig];
        environment_args.overrides = vec!["TOP = $(NAME)!".to_string()];

        let env = build_environment(&environment_args, &config).unwrap();
        assert_eq!(env.resolve("NAME"), "from-xcconfig");
        assert_eq!(env.resolve("OTHER"), "-config -xc");
        assert_eq!(env.resolve("TOP"), "from-xcconfig!");
        assert_eq!(env.resolve("DEVELOPER_DIR"), "/Developer");
        assert!(!env.resolve("NATIVE_ARCH_ACTUAL").is_empty());
    }

    #[test]
    fn test_invalid_override() {
        let mut environment_args = args();
        environment_args.overrides = vec!["NO_EQUALS".to_string()];
        assert!(build_environment(&environment_args, &UserConfig::default()).is_err());
    }

    #[test]
    fn test_missing_xcconfig() {
        let mut environment_args = args();
        environment_args.xcconfigs = vec![PathBuf::from("/definitely/missing.xcconfig")];
        assert!(build_environment(&environment_args, &UserConfig::default()).is_err());
    }

    #[test]
    fn test_parse_conditions() {
        let condition = parse_conditions(&["arch=arm64".to_string(), "sdk = iphoneos".to_string()])
            .unwrap();
        assert_eq!(condition.values().get("arch").map(String::as_str), Some("arm64"));
        assert_eq!(condition.values().get("sdk").map(String::as_str), Some("iphoneos"));
        assert!(parse_conditions(&["arch".to_string()]).is_err());
    }

    #[test]
    fn test_check_for_cancellation() {
        let token = Arc::new(AtomicBool::new(false));
        assert!(check_for_cancellation(&token).is_ok());
        token.store(true, Ordering::SeqCst);
        assert!(check_for_cancellation(&token).is_err());
    }
}
