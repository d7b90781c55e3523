// src/core/defaults.rs

//! Default levels that sit at the bottom of every environment.

use crate::core::level::Level;
use crate::core::setting::Setting;
use crate::system::paths;
use std::env;

/// Builds a level from process environment variables.
///
/// Variables starting with `_` are shell bookkeeping and are skipped. `USER` and `HOME`
/// are filled in from the user's home directory when the process does not define them.
pub fn environment_level<I, K, V>(vars: I) -> Level
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut settings: Vec<Setting> = vars
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .filter(|(name, _)| !name.is_empty() && !name.starts_with('_'))
        .map(|(name, value)| Setting::create(name, value))
        .collect();

    let defines = |settings: &[Setting], name: &str| settings.iter().any(|s| s.name() == name);

    if let Some(home) = dirs::home_dir().and_then(|dir| dir.to_str().map(str::to_string)) {
        if !defines(&settings, "USER") {
            let user = paths::base_name(&home).to_string();
            settings.push(Setting::create("USER", user));
        }
        if !defines(&settings, "HOME") {
            settings.push(Setting::create("HOME", home));
        }
    }

    settings.push(Setting::parse_pair("USER_APPS_DIR", "$(HOME)/Applications"));
    settings.push(Setting::parse_pair("USER_LIBRARY_DIR", "$(HOME)/Library"));
    settings.push(Setting::parse_pair("TEMP_FILES_DIR", "$(TEMP_DIR)"));

    Level::new(settings)
}

/// Native architecture names for the machine this binary was built for.
pub fn architecture_level() -> Level {
    let (arch_32, arch_64, actual) = if cfg!(target_arch = "x86_64") {
        ("i386", "x86_64", "x86_64")
    } else if cfg!(target_arch = "x86") {
        ("i386", "x86_64", "i386")
    } else if cfg!(target_arch = "aarch64") {
        ("armv7", "arm64", "arm64")
    } else if cfg!(target_arch = "arm") {
        ("armv7", "arm64", "armv7")
    } else {
        ("UNKNOWN", "UNKNOWN", "UNKNOWN")
    };

    Level::new(vec![
        Setting::create("NATIVE_ARCH_32_BIT", arch_32),
        Setting::create("NATIVE_ARCH_64_BIT", arch_64),
        Setting::create("NATIVE_ARCH_ACTUAL", actual),
    ])
}

/// Fixed locations of the local machine.
pub fn local_level() -> Level {
    Level::new(vec![
        Setting::create("LOCAL_ADMIN_APPS_DIR", "/Applications/Utilities"),
        Setting::create("LOCAL_APPS_DIR", "/Applications"),
        Setting::create("LOCAL_DEVELOPER_DIR", "/Library/Developer"),
        Setting::create("LOCAL_LIBRARY_DIR", "/Library"),
    ])
}

/// The default levels for the running process, highest priority first.
pub fn process_levels() -> Vec<Level> {
    vec![
        environment_level(env::vars()),
        local_level(),
        architecture_level(),
    ]
}
