// src/models.rs

use crate::constants::DEFAULT_DOMAIN;
use crate::core::types;
use crate::core::value::Value;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// --- SETTING LITERALS ---

/// A scalar or list as written in a descriptor file, before it becomes a [`Value`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SettingLiteral {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    List(Vec<String>),
}

impl SettingLiteral {
    /// The literal as setting text: booleans become `YES`/`NO`, lists are re-escaped.
    pub fn into_text(self) -> String {
        match self {
            Self::Boolean(b) => types::format_boolean(b),
            Self::Integer(i) => types::format_integer(i),
            Self::Real(r) => r.to_string(),
            Self::Text(s) => s,
            Self::List(items) => {
                let flattened: Vec<String> = items
                    .iter()
                    .flat_map(|item| types::parse_list(item))
                    .collect();
                types::format_list(&flattened)
            }
        }
    }
}

impl From<SettingLiteral> for Value {
    fn from(literal: SettingLiteral) -> Self {
        match literal {
            SettingLiteral::Text(text) => Self::parse(&text),
            SettingLiteral::List(_) => Self::parse(&literal.into_text()),
            other => Self::string(other.into_text()),
        }
    }
}

/// Accepts `true`, `"YES"`, `"true"` and friends for boolean descriptor keys.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let literal = SettingLiteral::deserialize(deserializer)?;
    Ok(types::parse_boolean(&literal.into_text()))
}

fn deserialize_optional_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let literal = Option::<SettingLiteral>::deserialize(deserializer)?;
    Ok(literal.map(|l| types::parse_boolean(&l.into_text())))
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(SettingLiteral::deserialize(deserializer)?.into_text())
}

// --- PROPERTY OPTIONS ---

/// The declared type of a property option. Both the capitalized and the lowercase
/// spellings found in specifications are accepted.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(from = "String")]
pub enum OptionType {
    Boolean,
    #[default]
    String,
    Enumeration,
    Path,
    StringList,
    PathList,
    Other(String),
}

impl From<String> for OptionType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Boolean" | "bool" => Self::Boolean,
            "String" | "string" => Self::String,
            "Enumeration" | "enum" => Self::Enumeration,
            "Path" | "path" => Self::Path,
            "StringList" | "stringlist" => Self::StringList,
            "PathList" | "pathlist" => Self::PathList,
            _ => Self::Other(name),
        }
    }
}

impl OptionType {
    /// List types contribute one argument group per list item.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::StringList | Self::PathList)
    }
}

/// `CommandLineArgs` / `AdditionalLinkerArgs`: either a fixed argument list or
/// argument lists keyed by the option's value, with `<<otherwise>>` as fallback.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum OptionArgs {
    List(Vec<Value>),
    ByValue(BTreeMap<String, Vec<Value>>),
}

/// One entry of an option's `Values` or `AllowedValues` array.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct ValueMapping {
    #[serde(deserialize_with = "deserialize_text")]
    pub value: String,
    pub command_line_flag: Option<Value>,
    pub command_line_args: Option<Vec<Value>>,
}

/// Declarative description of one tool flag.
#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct PropertyOption {
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: OptionType,
    pub default_value: Option<Value>,
    pub condition: Option<String>,
    pub command_line_condition: Option<String>,
    pub command_line_flag: Option<Value>,
    pub command_line_flag_if_false: Option<Value>,
    pub command_line_prefix_flag: Option<Value>,
    pub command_line_args: Option<OptionArgs>,
    pub additional_linker_args: Option<OptionArgs>,
    pub values: Vec<ValueMapping>,
    pub allowed_values: Vec<ValueMapping>,
    pub architectures: Vec<String>,
    pub file_types: Vec<String>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub avoid_empty_values: bool,
    pub set_value_in_environment_variable: Option<Value>,
    #[serde(deserialize_with = "deserialize_flag")]
    pub flatten_recursive_search_paths_in_value: bool,
}

// --- TOOL DESCRIPTORS ---

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolKind {
    #[default]
    Tool,
    Compiler,
    Linker,
}

/// A tool as written in a descriptor file. Every field is optional so that a
/// `BasedOn` child only states what it changes.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct ToolSpec {
    pub identifier: String,
    #[serde(rename = "Type")]
    pub kind: Option<ToolKind>,
    pub based_on: Option<String>,
    pub name: Option<String>,
    pub exec_path: Option<Value>,
    pub exec_description: Option<Value>,
    pub command_line: Option<Value>,
    pub rule_name: Option<Value>,
    pub rule_format: Option<Value>,
    pub file_types: Option<Vec<String>>,
    pub input_file_types: Option<Vec<String>>,
    pub architectures: Option<Vec<String>>,
    pub outputs: Option<Vec<Value>>,
    pub output_path: Option<Value>,
    pub environment_variables: Option<BTreeMap<String, Value>>,
    pub deleted_properties: Option<Vec<String>>,
    pub success_exit_codes: Option<Vec<i32>>,
    #[serde(deserialize_with = "deserialize_optional_flag")]
    pub is_abstract: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_flag")]
    pub is_architecture_neutral: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_flag")]
    pub deeply_stat_input_directories: Option<bool>,
    pub dependency_info_file: Option<Value>,
    pub options: Option<Vec<PropertyOption>>,
}

/// The top level of a descriptor file.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct SpecFile {
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default)]
    pub tools: Vec<ToolSpec>,
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

// --- USER CONFIGURATION ---

/// Contents of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UserConfig {
    /// Files or directories holding tool descriptors.
    pub spec_paths: Vec<String>,
    /// Spec domains searched, in order, when looking up a tool.
    pub domains: Vec<String>,
    /// Value of `DEVELOPER_DIR` when the environment does not set one.
    pub developer_dir: Option<String>,
    /// Extra settings layered beneath everything else.
    pub settings: BTreeMap<String, String>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            spec_paths: Vec::new(),
            domains: vec![DEFAULT_DOMAIN.to_string()],
            developer_dir: None,
            settings: BTreeMap::new(),
        }
    }
}
