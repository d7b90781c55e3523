// src/tool/search_paths.rs

//! Search path lists, with `/**` recursive entries expanded against the disk.

use crate::core::environment::Environment;
use crate::core::types;
use crate::system::paths;
use std::path::Path;
use walkdir::WalkDir;

const RECURSIVE_SUFFIX: &str = "**";

/// The search path lists a compiler or linker receives.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchPaths {
    pub header_search_paths: Vec<String>,
    pub user_header_search_paths: Vec<String>,
    pub framework_search_paths: Vec<String>,
    pub library_search_paths: Vec<String>,
}

impl SearchPaths {
    pub fn create(environment: &Environment, working_directory: &str) -> Self {
        let list = |names: &[&str]| -> Vec<String> {
            let entries: Vec<String> = names
                .iter()
                .flat_map(|name| types::parse_list(&environment.resolve(name)))
                .collect();
            expand_recursive(&entries, environment, working_directory)
        };

        Self {
            header_search_paths: list(&["PRODUCT_TYPE_HEADER_SEARCH_PATHS", "HEADER_SEARCH_PATHS"]),
            user_header_search_paths: list(&["USER_HEADER_SEARCH_PATHS"]),
            framework_search_paths: list(&[
                "FRAMEWORK_SEARCH_PATHS",
                "PRODUCT_TYPE_FRAMEWORK_SEARCH_PATHS",
            ]),
            library_search_paths: list(&["LIBRARY_SEARCH_PATHS"]),
        }
    }
}

/// Expands search path entries.
///
/// Entries under `/System` or `/usr` are moved into `SDKROOT` when that directory
/// exists. An entry ending in `**` becomes its root followed by every directory
/// below the root, in walk order.
pub fn expand_recursive(
    entries: &[String],
    environment: &Environment,
    working_directory: &str,
) -> Vec<String> {
    let mut result = Vec::new();

    for entry in entries {
        let path = sdk_relative(entry, environment);

        let Some(root) = path.strip_suffix(RECURSIVE_SUFFIX) else {
            result.push(path);
            continue;
        };

        let root = root.trim_end_matches('/');
        let root = if root.is_empty() && path.starts_with('/') { "/" } else { root };
        result.push(root.to_string());

        let absolute_root = paths::resolve_relative_path(root, working_directory);
        let mut subdirectories: Vec<String> = WalkDir::new(&absolute_root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_dir())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(&absolute_root)
                    .ok()
                    .and_then(Path::to_str)
                    .map(|relative| format!("{}/{}", root.trim_end_matches('/'), relative))
            })
            .collect();
        log::trace!(
            "expanded recursive search path '{}' to {} directories",
            entry,
            subdirectories.len()
        );
        result.append(&mut subdirectories);
    }

    result
}

fn sdk_relative(path: &str, environment: &Environment) -> String {
    if path.starts_with("/System") || path.starts_with("/usr") {
        let sdk_root = environment.resolve("SDKROOT");
        if !sdk_root.is_empty() {
            let sdk_path = paths::normalize_path(&format!("{sdk_root}{path}"));
            let directory = sdk_path.strip_suffix(RECURSIVE_SUFFIX).unwrap_or(&sdk_path);
            if Path::new(directory).is_dir() {
                return sdk_path;
            }
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level::Level;
    use crate::core::setting::Setting;
    use std::fs;

    #[test]
    fn test_plain_entries_pass_through() {
        let env = Environment::new();
        let entries = vec!["include".to_string(), "/opt/include".to_string()];
        assert_eq!(expand_recursive(&entries, &env, "/work"), entries);
    }

    #[test]
    fn test_recursive_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("headers/a/deep")).unwrap();
        fs::create_dir_all(dir.path().join("headers/b")).unwrap();
        fs::write(dir.path().join("headers/file.h"), "").unwrap();

        let work = dir.path().to_str().unwrap();
        let expanded = expand_recursive(&["headers/**".to_string()], &Environment::new(), work);
        assert_eq!(expanded, ["headers", "headers/a", "headers/a/deep", "headers/b"]);
    }

    #[test]
    fn test_create_reads_settings() {
        let mut env = Environment::new();
        env.insert_back(
            Level::new(vec![
                Setting::create("HEADER_SEARCH_PATHS", "one \"two words\""),
                Setting::create("PRODUCT_TYPE_HEADER_SEARCH_PATHS", "product"),
                Setting::create("LIBRARY_SEARCH_PATHS", "lib"),
            ]),
            false,
        );
        let paths = SearchPaths::create(&env, "/work");
        assert_eq!(paths.header_search_paths, ["product", "one", "two words"]);
        assert_eq!(paths.library_search_paths, ["lib"]);
        assert!(paths.framework_search_paths.is_empty());
    }

    #[test]
    fn test_system_paths_move_into_sdk() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("usr/include")).unwrap();
        let mut env = Environment::new();
        env.insert_back(
            Level::new(vec![Setting::create("SDKROOT", dir.path().to_str().unwrap())]),
            false,
        );

        let expanded = expand_recursive(
            &["/usr/include".to_string(), "/usr/missing".to_string()],
            &env,
            "/work",
        );
        assert_eq!(
            expanded,
            [
                format!("{}/usr/include", dir.path().to_str().unwrap()),
                "/usr/missing".to_string()
            ]
        );
    }
}
