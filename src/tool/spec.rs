// src/tool/spec.rs

//! # Resolved Tools
//!
//! A [`Tool`] is a descriptor with its `BasedOn` chain already applied. Inheritance is
//! explicit and per field:
//!
//! - Scalars and lists: the child's value replaces the base's when the child states one.
//! - `EnvironmentVariables` and `DeletedProperties`: the base's entries are kept and the
//!   child's are added, with the child winning on a name clash.
//! - `Options`: merged by name. A redefined option replaces the inherited one in place,
//!   so the command line keeps the base's flag order; new options are appended.

use crate::core::condition::Condition;
use crate::core::level::Level;
use crate::core::setting::Setting;
use crate::core::value::Value;
use crate::models::{PropertyOption, ToolKind, ToolSpec};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tool {
    pub identifier: String,
    pub domain: String,
    pub kind: ToolKind,
    pub name: Option<String>,
    pub exec_path: Option<Value>,
    pub exec_description: Option<Value>,
    pub command_line: Option<Value>,
    pub rule_name: Option<Value>,
    pub rule_format: Option<Value>,
    pub file_types: Vec<String>,
    pub input_file_types: Vec<String>,
    pub architectures: Vec<String>,
    pub outputs: Vec<Value>,
    pub output_path: Option<Value>,
    pub environment_variables: BTreeMap<String, Value>,
    pub deleted_properties: BTreeSet<String>,
    pub success_exit_codes: Vec<i32>,
    pub is_abstract: bool,
    pub is_architecture_neutral: bool,
    pub deeply_stat_input_directories: bool,
    pub dependency_info_file: Option<Value>,
    pub options: Vec<PropertyOption>,
}

impl Tool {
    /// Builds a tool from a descriptor with no base.
    pub fn from_spec(spec: &ToolSpec, domain: &str) -> Self {
        let root = Self {
            domain: domain.to_string(),
            ..Self::default()
        };
        root.derive(spec)
    }

    /// Builds the tool described by `spec` on top of this one.
    pub fn derive(&self, spec: &ToolSpec) -> Self {
        let mut environment_variables = self.environment_variables.clone();
        if let Some(vars) = &spec.environment_variables {
            environment_variables.extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        let mut deleted_properties = self.deleted_properties.clone();
        deleted_properties.extend(spec.deleted_properties.iter().flatten().cloned());

        Self {
            identifier: spec.identifier.clone(),
            domain: self.domain.clone(),
            kind: spec.kind.unwrap_or(self.kind),
            name: spec.name.clone().or_else(|| self.name.clone()),
            exec_path: spec.exec_path.clone().or_else(|| self.exec_path.clone()),
            exec_description: spec
                .exec_description
                .clone()
                .or_else(|| self.exec_description.clone()),
            command_line: spec.command_line.clone().or_else(|| self.command_line.clone()),
            rule_name: spec.rule_name.clone().or_else(|| self.rule_name.clone()),
            rule_format: spec.rule_format.clone().or_else(|| self.rule_format.clone()),
            file_types: spec.file_types.clone().unwrap_or_else(|| self.file_types.clone()),
            input_file_types: spec
                .input_file_types
                .clone()
                .unwrap_or_else(|| self.input_file_types.clone()),
            architectures: spec
                .architectures
                .clone()
                .unwrap_or_else(|| self.architectures.clone()),
            outputs: spec.outputs.clone().unwrap_or_else(|| self.outputs.clone()),
            output_path: spec.output_path.clone().or_else(|| self.output_path.clone()),
            environment_variables,
            deleted_properties,
            success_exit_codes: spec
                .success_exit_codes
                .clone()
                .unwrap_or_else(|| self.success_exit_codes.clone()),
            // Abstract-ness describes one descriptor and is never inherited.
            is_abstract: spec.is_abstract.unwrap_or(false),
            is_architecture_neutral: spec
                .is_architecture_neutral
                .unwrap_or(self.is_architecture_neutral),
            deeply_stat_input_directories: spec
                .deeply_stat_input_directories
                .unwrap_or(self.deeply_stat_input_directories),
            dependency_info_file: spec
                .dependency_info_file
                .clone()
                .or_else(|| self.dependency_info_file.clone()),
            options: merge_options(&self.options, spec.options.as_deref().unwrap_or_default()),
        }
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = domain.to_string();
        self
    }

    /// One setting per option that declares a default value.
    pub fn default_settings(&self) -> Level {
        self.options
            .iter()
            .filter_map(|option| {
                option
                    .default_value
                    .as_ref()
                    .map(|value| Setting::new(&option.name, Condition::empty(), value.clone()))
            })
            .collect()
    }

    /// A tool without declared file types accepts any input.
    pub fn accepts_file_type(&self, file_type: &str) -> bool {
        (self.file_types.is_empty() && self.input_file_types.is_empty())
            || self
                .file_types
                .iter()
                .chain(&self.input_file_types)
                .any(|t| t == file_type)
    }

    pub fn supports_architecture(&self, architecture: &str) -> bool {
        self.is_architecture_neutral
            || architecture.is_empty()
            || self.architectures.is_empty()
            || self.architectures.iter().any(|arch| arch == architecture)
    }

    /// Codes treated as success when running the tool. Defaults to `[0]`.
    pub fn success_exit_codes(&self) -> Vec<i32> {
        if self.success_exit_codes.is_empty() {
            vec![0]
        } else {
            self.success_exit_codes.clone()
        }
    }
}

fn merge_options(base: &[PropertyOption], child: &[PropertyOption]) -> Vec<PropertyOption> {
    let mut merged = base.to_vec();
    let mut used: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(index, option)| (option.name.clone(), index))
        .collect();

    for option in child {
        match used.get(&option.name) {
            Some(&index) => {
                if let Some(slot) = merged.get_mut(index) {
                    *slot = option.clone();
                }
            }
            None => {
                used.insert(option.name.clone(), merged.len());
                merged.push(option.clone());
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionType;

    fn option(name: &str, default: Option<&str>) -> PropertyOption {
        PropertyOption {
            name: name.to_string(),
            default_value: default.map(Value::parse),
            ..PropertyOption::default()
        }
    }

    fn base_spec() -> ToolSpec {
        ToolSpec {
            identifier: "com.example.base".to_string(),
            kind: Some(ToolKind::Compiler),
            exec_path: Some(Value::string("cc")),
            rule_name: Some(Value::parse("Compile $(InputFile)")),
            environment_variables: Some(BTreeMap::from([
                ("LANG".to_string(), Value::string("C")),
                ("TMP".to_string(), Value::string("/tmp")),
            ])),
            deleted_properties: Some(vec!["A".to_string()]),
            is_abstract: Some(true),
            options: Some(vec![
                option("FIRST", Some("1")),
                option("SECOND", None),
                option("THIRD", Some("3")),
            ]),
            ..ToolSpec::default()
        }
    }

    #[test]
    fn test_from_spec() {
        let tool = Tool::from_spec(&base_spec(), "default");
        assert_eq!(tool.identifier, "com.example.base");
        assert_eq!(tool.domain, "default");
        assert_eq!(tool.kind, ToolKind::Compiler);
        assert!(tool.is_abstract);
        assert_eq!(tool.options.len(), 3);
        assert_eq!(tool.success_exit_codes(), vec![0]);
    }

    #[test]
    fn test_scalars_override() {
        let base = Tool::from_spec(&base_spec(), "default");
        let child = base.derive(&ToolSpec {
            identifier: "com.example.child".to_string(),
            exec_path: Some(Value::string("clang")),
            ..ToolSpec::default()
        });
        assert_eq!(child.identifier, "com.example.child");
        assert_eq!(child.exec_path, Some(Value::string("clang")));
        assert_eq!(child.rule_name, base.rule_name);
        assert_eq!(child.kind, ToolKind::Compiler);
        assert!(!child.is_abstract);
    }

    #[test]
    fn test_maps_combine() {
        let base = Tool::from_spec(&base_spec(), "default");
        let child = base.derive(&ToolSpec {
            identifier: "com.example.child".to_string(),
            environment_variables: Some(BTreeMap::from([(
                "LANG".to_string(),
                Value::string("en_US.UTF-8"),
            )])),
            deleted_properties: Some(vec!["B".to_string()]),
            ..ToolSpec::default()
        });
        assert_eq!(child.environment_variables.len(), 2);
        assert_eq!(
            child.environment_variables.get("LANG"),
            Some(&Value::string("en_US.UTF-8"))
        );
        assert_eq!(
            child.deleted_properties,
            BTreeSet::from(["A".to_string(), "B".to_string()])
        );
    }

    #[test]
    fn test_options_merge_in_place() {
        let base = Tool::from_spec(&base_spec(), "default");
        let mut replacement = option("SECOND", Some("2"));
        replacement.kind = OptionType::Boolean;
        let child = base.derive(&ToolSpec {
            identifier: "com.example.child".to_string(),
            options: Some(vec![option("FOURTH", None), replacement]),
            ..ToolSpec::default()
        });

        let names: Vec<&str> = child.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["FIRST", "SECOND", "THIRD", "FOURTH"]);
        assert_eq!(child.options[1].kind, OptionType::Boolean);
    }

    #[test]
    fn test_default_settings() {
        let tool = Tool::from_spec(&base_spec(), "default");
        let defaults = tool.default_settings();
        let names: Vec<&str> = defaults.settings().iter().map(Setting::name).collect();
        assert_eq!(names, ["FIRST", "THIRD"]);
        assert_eq!(
            defaults.get("THIRD", &Condition::empty()),
            Some(&Value::string("3"))
        );
    }

    #[test]
    fn test_file_types_and_architectures() {
        let any = Tool::default();
        assert!(any.accepts_file_type("sourcecode.c.c"));
        assert!(any.supports_architecture("arm64"));

        let compiler = Tool {
            file_types: vec!["sourcecode.c.c".to_string()],
            input_file_types: vec!["sourcecode.c.h".to_string()],
            architectures: vec!["x86_64".to_string()],
            ..Tool::default()
        };
        assert!(compiler.accepts_file_type("sourcecode.c.c"));
        assert!(compiler.accepts_file_type("sourcecode.c.h"));
        assert!(!compiler.accepts_file_type("sourcecode.swift"));
        assert!(compiler.supports_architecture("x86_64"));
        assert!(!compiler.supports_architecture("arm64"));
        assert!(compiler.supports_architecture(""));

        let neutral = Tool {
            is_architecture_neutral: true,
            ..compiler
        };
        assert!(neutral.supports_architecture("arm64"));
    }
}
