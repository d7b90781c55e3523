// src/tool/invocation.rs

use crate::constants::BUILTIN_PREFIX;
use crate::system::paths;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// The program an invocation runs.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Executable {
    /// Implemented by the build system itself, e.g. `builtin-copy`.
    Builtin(String),
    /// A program on disk.
    External(String),
}

impl Executable {
    /// Classifies `name`: `builtin-` names are builtins, absolute paths are used as
    /// they are, anything else is searched for in `search_paths` and kept unchanged
    /// when not found there.
    pub fn determine(name: &str, search_paths: &[PathBuf]) -> Self {
        if name.starts_with(BUILTIN_PREFIX) {
            return Self::Builtin(name.to_string());
        }
        if paths::is_absolute(name) {
            return Self::External(name.to_string());
        }

        match paths::find_executable(name, search_paths)
            .as_deref()
            .and_then(|found| found.to_str())
        {
            Some(found) => Self::External(found.to_string()),
            None => {
                log::debug!("executable '{}' not found in search paths", name);
                Self::External(name.to_string())
            }
        }
    }

    /// The builtin name or the external path.
    pub fn path(&self) -> &str {
        match self {
            Self::Builtin(name) | Self::External(name) => name,
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin(_))
    }
}

impl fmt::Display for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DependencyInfoFormat {
    /// `ld64`-style binary dependency info.
    Binary,
    /// Every file below a directory.
    Directory,
    /// A makefile-style `.d` file.
    Makefile,
}

/// A file the executor reads after the run to learn extra dependencies.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DependencyInfo {
    pub format: DependencyInfoFormat,
    pub path: String,
}

impl DependencyInfo {
    pub fn new(format: DependencyInfoFormat, path: impl Into<String>) -> Self {
        Self {
            format,
            path: path.into(),
        }
    }
}

/// A fully resolved tool run.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub executable: Executable,
    pub arguments: Vec<String>,
    pub environment: BTreeMap<String, String>,
    pub working_directory: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub dependency_info: Vec<DependencyInfo>,
    pub log_message: String,
    pub priority: i32,
    pub success_exit_codes: Vec<i32>,
}

impl Invocation {
    /// The executable followed by the arguments.
    pub fn command_line(&self) -> Vec<&str> {
        std::iter::once(self.executable.path())
            .chain(self.arguments.iter().map(String::as_str))
            .collect()
    }
}
