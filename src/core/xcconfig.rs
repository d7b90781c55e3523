// src/core/xcconfig.rs

//! # xcconfig Files
//!
//! Loads `.xcconfig` files into a tree of [`ConfigEntry`] values. Each non-empty line
//! is either an assignment (parsed by [`Setting::parse`], with an optional trailing
//! `;`) or a preprocessor directive. The only directives are `#include "path"` and its
//! optional form `#include? "path"`, which skips files that do not exist.
//!
//! `//` starts a comment that runs to the end of the line and `/* ... */` comments may
//! span lines. Include paths starting with `<DEVELOPER_DIR>` are taken relative to the
//! `DEVELOPER_DIR` setting; other relative paths are relative to the including file.

use crate::constants::DEVELOPER_DIR_PREFIX;
use crate::core::environment::Environment;
use crate::core::level::Level;
use crate::core::setting::Setting;
use crate::core::value::Value;
use crate::system::filesystem::{Filesystem, FilesystemError};
use crate::system::paths;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref INCLUDE_DIRECTIVE: Regex = Regex::new(r#"^#include(\?)?\s*"([^"]*)"$"#).unwrap();
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: FilesystemError,
    },
    #[error("{path}:{line}: malformed include directive '{text}'")]
    InvalidInclude {
        path: String,
        line: usize,
        text: String,
    },
    #[error("{path}:{line}: unknown preprocessor directive '{text}'")]
    UnknownDirective {
        path: String,
        line: usize,
        text: String,
    },
    #[error("{path}:{line}: could not parse setting '{text}'")]
    InvalidSetting {
        path: String,
        line: usize,
        text: String,
    },
    #[error("Config file '{0}' includes itself.")]
    IncludeCycle(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEntry {
    Setting(Setting),
    /// An included file. `path` is the include path as written, before expansion.
    Include { path: Value, config: Box<Config> },
}

/// A loaded xcconfig file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    path: String,
    contents: Vec<ConfigEntry>,
}

impl Config {
    pub fn new(path: impl Into<String>, contents: Vec<ConfigEntry>) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }

    /// Reads and parses the file at `path` along with everything it includes.
    /// `environment` is only used to expand include paths.
    pub fn load(
        filesystem: &dyn Filesystem,
        environment: &Environment,
        path: &str,
    ) -> ConfigResult<Self> {
        let mut loader = Loader {
            filesystem,
            environment,
            stack: Vec::new(),
        };
        loader.load(path)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn contents(&self) -> &[ConfigEntry] {
        &self.contents
    }

    /// Flattens the file into a single level, splicing included files in place.
    pub fn level(&self) -> Level {
        let mut settings = Vec::new();
        self.collect_settings(&mut settings);
        Level::new(settings)
    }

    fn collect_settings(&self, settings: &mut Vec<Setting>) {
        for entry in &self.contents {
            match entry {
                ConfigEntry::Setting(setting) => settings.push(setting.clone()),
                ConfigEntry::Include { config, .. } => config.collect_settings(settings),
            }
        }
    }
}

// --- LOADING ---

struct Loader<'a> {
    filesystem: &'a dyn Filesystem,
    environment: &'a Environment,
    /// Files currently being loaded, outermost first.
    stack: Vec<String>,
}

impl Loader<'_> {
    fn load(&mut self, path: &str) -> ConfigResult<Config> {
        let normalized = paths::normalize_path(path);
        if self.stack.contains(&normalized) {
            return Err(ConfigError::IncludeCycle(path.to_string()));
        }

        let text = self
            .filesystem
            .read_to_string(path)
            .map_err(|source| ConfigError::Read {
                path: path.to_string(),
                source,
            })?;
        log::debug!("loading config file '{}'", path);

        self.stack.push(normalized);
        let contents = self.parse(path, &text);
        self.stack.pop();

        Ok(Config::new(path, contents?))
    }

    fn parse(&mut self, path: &str, text: &str) -> ConfigResult<Vec<ConfigEntry>> {
        let mut entries = Vec::new();
        for (index, line) in strip_comments(text).iter().enumerate() {
            if let Some(entry) = self.parse_line(path, index + 1, line)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn parse_line(
        &mut self,
        path: &str,
        number: usize,
        line: &str,
    ) -> ConfigResult<Option<ConfigEntry>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        if line.starts_with('#') {
            return self.parse_directive(path, number, line);
        }

        let assignment = line.strip_suffix(';').unwrap_or(line);
        match Setting::parse(assignment) {
            Some(setting) => Ok(Some(ConfigEntry::Setting(setting))),
            None => Err(ConfigError::InvalidSetting {
                path: path.to_string(),
                line: number,
                text: line.to_string(),
            }),
        }
    }

    fn parse_directive(
        &mut self,
        path: &str,
        number: usize,
        line: &str,
    ) -> ConfigResult<Option<ConfigEntry>> {
        let Some(captures) = INCLUDE_DIRECTIVE.captures(line) else {
            let error = if line.starts_with("#include") {
                ConfigError::InvalidInclude {
                    path: path.to_string(),
                    line: number,
                    text: line.to_string(),
                }
            } else {
                ConfigError::UnknownDirective {
                    path: path.to_string(),
                    line: number,
                    text: line.to_string(),
                }
            };
            return Err(error);
        };

        let optional = captures.get(1).is_some();
        let written = captures.get(2).map_or("", |m| m.as_str());
        let include = include_value(written);

        let expanded = self.environment.expand(&include);
        let resolved = paths::resolve_relative_path(&expanded, paths::directory_name(path));

        if optional && !self.filesystem.is_file(&resolved) {
            log::debug!("skipping missing optional include '{}'", resolved);
            return Ok(None);
        }

        let config = self.load(&resolved)?;
        Ok(Some(ConfigEntry::Include {
            path: include,
            config: Box::new(config),
        }))
    }
}

/// `<DEVELOPER_DIR>/x` becomes `$(DEVELOPER_DIR)/x`. Other paths stay literal.
fn include_value(written: &str) -> Value {
    match written.strip_prefix(DEVELOPER_DIR_PREFIX) {
        Some(relative) => Value::variable("DEVELOPER_DIR") + Value::string(relative),
        None => Value::string(written),
    }
}

/// Splits `text` into lines with comments removed. Line breaks inside block comments
/// are kept so line numbers stay accurate.
fn strip_comments(text: &str) -> Vec<String> {
    #[derive(PartialEq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
    }

    let mut lines = Vec::new();
    let mut line = String::new();
    let mut state = State::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            lines.push(std::mem::take(&mut line));
            if state == State::LineComment {
                state = State::Code;
            }
            continue;
        }
        if c == '\r' {
            continue;
        }

        match state {
            State::Code => match (c, chars.peek()) {
                ('/', Some('/')) => {
                    chars.next();
                    state = State::LineComment;
                }
                ('/', Some('*')) => {
                    chars.next();
                    state = State::BlockComment;
                }
                _ => line.push(c),
            },
            State::LineComment => {}
            State::BlockComment => {
                if c == '*' && chars.next_if_eq(&'/').is_some() {
                    state = State::Code;
                }
            }
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::filesystem::MemoryFilesystem;

    fn load(fs: &MemoryFilesystem, path: &str) -> ConfigResult<Config> {
        Config::load(fs, &Environment::new(), path)
    }

    #[test]
    fn test_empty() {
        let fs = MemoryFilesystem::new().with_file("/work/empty.xcconfig", "");
        let config = load(&fs, "/work/empty.xcconfig").unwrap();
        assert_eq!(config.path(), "/work/empty.xcconfig");
        assert!(config.contents().is_empty());
    }

    #[test]
    fn test_settings() {
        let fs = MemoryFilesystem::new().with_file(
            "/work/settings.xcconfig",
            "NAME1 = VALUE1\nNAME2 = VALUE2\n",
        );
        let config = load(&fs, "/work/settings.xcconfig").unwrap();
        assert_eq!(config.contents().len(), 2);
        assert!(matches!(config.contents()[0], ConfigEntry::Setting(_)));

        let level = config.level();
        let settings = level.settings();
        assert_eq!(settings.len(), 2);
        assert_eq!(settings[0].name(), "NAME1");
        assert_eq!(settings[0].value(), &Value::string("VALUE1"));
        assert_eq!(settings[1].name(), "NAME2");
        assert_eq!(settings[1].value(), &Value::string("VALUE2"));
    }

    #[test]
    fn test_include() {
        let fs = MemoryFilesystem::new()
            .with_file("/work/common.xcconfig", "NAME = VALUE")
            .with_file("/work/include.xcconfig", "#include \"common.xcconfig\"");
        let config = load(&fs, "/work/include.xcconfig").unwrap();
        assert_eq!(config.contents().len(), 1);

        let ConfigEntry::Include { path, config: included } = &config.contents()[0] else {
            panic!("expected an include entry");
        };
        assert_eq!(path, &Value::string("common.xcconfig"));
        assert_eq!(included.path(), "/work/common.xcconfig");
        assert_eq!(included.contents().len(), 1);
        assert_eq!(
            config.level().settings(),
            &[Setting::create("NAME", "VALUE")]
        );
    }

    #[test]
    fn test_include_order_is_depth_first() {
        let fs = MemoryFilesystem::new()
            .with_file("/work/base/inner.xcconfig", "B = 2")
            .with_file("/work/base.xcconfig", "A = 1\n#include \"base/inner.xcconfig\"\nC = 3")
            .with_file("/work/top.xcconfig", "#include \"base.xcconfig\"\nD = 4;\n");
        let level = load(&fs, "/work/top.xcconfig").unwrap().level();
        let names: Vec<&str> = level.settings().iter().map(Setting::name).collect();
        assert_eq!(names, ["A", "B", "C", "D"]);
        assert_eq!(level.settings()[3].value(), &Value::string("4"));
    }

    #[test]
    fn test_developer_dir_include() {
        let fs = MemoryFilesystem::new()
            .with_file("/Developer/Base.xcconfig", "SDK = macosx")
            .with_file("/work/app.xcconfig", "#include \"<DEVELOPER_DIR>/Base.xcconfig\"");
        let mut env = Environment::new();
        env.insert_back(
            Level::new(vec![Setting::create("DEVELOPER_DIR", "/Developer")]),
            false,
        );

        let config = Config::load(&fs, &env, "/work/app.xcconfig").unwrap();
        let ConfigEntry::Include { path, config: included } = &config.contents()[0] else {
            panic!("expected an include entry");
        };
        assert_eq!(path.raw(), "$(DEVELOPER_DIR)/Base.xcconfig");
        assert_eq!(included.path(), "/Developer/Base.xcconfig");
    }

    #[test]
    fn test_comments() {
        let fs = MemoryFilesystem::new().with_file(
            "/work/comments.xcconfig",
            "// header\nA = 1 // trailing\n/* block\nstill comment */ B = 2\nC = http:/x\n",
        );
        let level = load(&fs, "/work/comments.xcconfig").unwrap().level();
        assert_eq!(level.settings().len(), 3);
        assert_eq!(level.settings()[0].value(), &Value::string("1"));
        assert_eq!(level.settings()[1].name(), "B");
        assert_eq!(level.settings()[2].value(), &Value::string("http:/x"));
    }

    #[test]
    fn test_invalid_setting_reports_line() {
        let fs = MemoryFilesystem::new().with_file("/work/bad.xcconfig", "A = 1\n\nNOT A SETTING\n");
        let error = load(&fs, "/work/bad.xcconfig").unwrap_err();
        assert!(matches!(error, ConfigError::InvalidSetting { line: 3, .. }));
    }

    #[test]
    fn test_directive_errors() {
        let fs = MemoryFilesystem::new()
            .with_file("/work/unknown.xcconfig", "#define X 1")
            .with_file("/work/malformed.xcconfig", "#include common.xcconfig")
            .with_file("/work/missing.xcconfig", "#include \"nowhere.xcconfig\"");
        assert!(matches!(
            load(&fs, "/work/unknown.xcconfig"),
            Err(ConfigError::UnknownDirective { line: 1, .. })
        ));
        assert!(matches!(
            load(&fs, "/work/malformed.xcconfig"),
            Err(ConfigError::InvalidInclude { .. })
        ));
        assert!(matches!(
            load(&fs, "/work/missing.xcconfig"),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_optional_include() {
        let fs = MemoryFilesystem::new()
            .with_file("/work/app.xcconfig", "#include? \"local.xcconfig\"\nA = 1");
        let config = load(&fs, "/work/app.xcconfig").unwrap();
        assert_eq!(config.contents().len(), 1);
    }

    #[test]
    fn test_include_cycle() {
        let fs = MemoryFilesystem::new()
            .with_file("/work/a.xcconfig", "#include \"b.xcconfig\"")
            .with_file("/work/b.xcconfig", "#include \"./a.xcconfig\"");
        assert!(matches!(
            load(&fs, "/work/a.xcconfig"),
            Err(ConfigError::IncludeCycle(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let fs = MemoryFilesystem::new();
        assert!(matches!(
            load(&fs, "/work/none.xcconfig"),
            Err(ConfigError::Read { .. })
        ));
    }
}
