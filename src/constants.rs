// src/constants.rs

/// The name of the directory holding user configuration (inside the platform config dir).
pub const CONFIG_DIR_NAME: &str = "xcsettings";

/// The name of the user configuration file.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Overrides the user configuration directory when set.
pub const CONFIG_DIR_ENV: &str = "XCSETTINGS_CONFIG_DIR";

/// The spec domain used for descriptor files that do not name one.
pub const DEFAULT_DOMAIN: &str = "default";

/// Command-line template used when a tool does not declare one.
pub const DEFAULT_COMMAND_LINE: &str = "[exec-path] [options] [special-args]";

/// Prefix of executables implemented inside the build system itself.
pub const BUILTIN_PREFIX: &str = "builtin-";

/// Prefix of a `#include` path relative to the developer directory.
pub const DEVELOPER_DIR_PREFIX: &str = "<DEVELOPER_DIR>";

/// Key of the fallback entry in a value-keyed `CommandLineArgs` table.
pub const OTHERWISE_KEY: &str = "<<otherwise>>";

/// The self-reference keyword inside a setting value.
pub const INHERITED: &str = "inherited";

/// The setting holding the current option value while expanding option arguments.
pub const OPTION_VALUE_SETTING: &str = "value";

// Command-line token classes.
pub const TOKEN_INPUT: &str = "input";
pub const TOKEN_OUTPUT: &str = "output";
pub const TOKEN_INPUTS: &str = "inputs";
pub const TOKEN_OUTPUTS: &str = "outputs";
pub const TOKEN_OPTIONS: &str = "options";
pub const TOKEN_EXEC_PATH: &str = "exec-path";
pub const TOKEN_SPECIAL_ARGS: &str = "special-args";

/// Identifier of the lipo tool, whose descriptor declares a flag the tool rejects.
pub const LIPO_TOOL_IDENTIFIER: &str = "com.apple.pbx.linkers.lipo";
