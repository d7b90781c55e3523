// src/core/operations.rs

//! Transforms applied by `$(NAME:operation)` suffixes.

use crate::system::paths;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `identifier` and `c99extidentifier`.
    Identifier,
    Rfc1034Identifier,
    Quote,
    Lower,
    Upper,
    StandardizePath,
    Base,
    Dir,
    File,
    Suffix,
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "identifier" | "c99extidentifier" => Ok(Self::Identifier),
            "rfc1034identifier" => Ok(Self::Rfc1034Identifier),
            "quote" => Ok(Self::Quote),
            "lower" => Ok(Self::Lower),
            "upper" => Ok(Self::Upper),
            "standardizepath" => Ok(Self::StandardizePath),
            "base" => Ok(Self::Base),
            "dir" => Ok(Self::Dir),
            "file" => Ok(Self::File),
            "suffix" => Ok(Self::Suffix),
            other => Err(other.to_string()),
        }
    }
}

impl Operation {
    pub fn apply(self, value: &str) -> String {
        match self {
            Self::Identifier => replace_outside(value, |c| c.is_ascii_alphanumeric() || c == '_', '_'),
            Self::Rfc1034Identifier => replace_outside(value, |c| c.is_ascii_alphanumeric(), '-'),
            Self::Quote => shell_quote(value),
            Self::Lower => value.to_ascii_lowercase(),
            Self::Upper => value.to_ascii_uppercase(),
            Self::StandardizePath => paths::normalize_path(value),
            Self::Base => paths::base_name_without_extension(value).to_string(),
            Self::Dir => paths::directory_name(value).to_string(),
            Self::File => paths::base_name(value).to_string(),
            Self::Suffix => format!(".{}", paths::file_extension(value)),
        }
    }
}

/// Applies the operation named `name`. Unknown operations leave the value untouched.
pub fn apply_named(value: &str, name: &str) -> String {
    match name.parse::<Operation>() {
        Ok(operation) => operation.apply(value),
        Err(unknown) => {
            log::warn!("unknown build setting operation '{}'", unknown);
            value.to_string()
        }
    }
}

fn replace_outside(value: &str, keep: impl Fn(char) -> bool, replacement: char) -> String {
    value
        .chars()
        .map(|c| if keep(c) { c } else { replacement })
        .collect()
}

/// Quotes `value` for a POSIX shell. Values made only of safe characters pass through.
fn shell_quote(value: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || "@%_-+=:,./".contains(c);
    if value.chars().all(safe) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', "'\"'\"'"))
}
