// src/tool/options.rs

//! # Options Result
//!
//! Turns a tool's property options into command-line arguments, linker arguments and
//! environment variables. Options are visited in declaration order and every option
//! contributes in a fixed sequence:
//!
//! 1. `CommandLineFlag` (or `CommandLineFlagIfFalse` for booleans).
//! 2. The matching `Values` entry, then the matching `AllowedValues` entry.
//! 3. `CommandLinePrefixFlag` joined with the value.
//! 4. `CommandLineArgs`, then `AdditionalLinkerArgs`.
//! 5. `SetValueInEnvironmentVariable`.
//!
//! Inside argument templates `$(value)` names the option's value, or the current item
//! for list-typed options.

use crate::constants::{OPTION_VALUE_SETTING, OTHERWISE_KEY};
use crate::core::condition::Condition;
use crate::core::environment::Environment;
use crate::core::level::Level;
use crate::core::setting::Setting;
use crate::core::types;
use crate::core::value::Value;
use crate::models::{OptionArgs, OptionType, PropertyOption, ValueMapping};
use crate::tool::environment::ToolEnvironment;
use crate::tool::search_paths;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

lazy_static! {
    static ref COMPARISON: Regex = Regex::new(r"^(.*?) (==|!=) (.*)$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OptionsResult {
    arguments: Vec<String>,
    environment: BTreeMap<String, String>,
    linker_args: Vec<String>,
}

impl OptionsResult {
    /// Evaluates `options` against `environment`.
    ///
    /// Options named in `deleted` are skipped. When `file_type` is given, an option
    /// restricted to other file types is skipped.
    pub fn create(
        environment: &Environment,
        working_directory: &str,
        options: &[PropertyOption],
        file_type: Option<&str>,
        deleted: &BTreeSet<String>,
    ) -> Self {
        let environment = with_option_defaults(environment, options);
        let architecture = environment.resolve("arch");
        let mut result = Self::default();

        for option in options {
            if deleted.contains(&option.name) {
                log::trace!("option '{}' is deleted", option.name);
                continue;
            }

            if !evaluate_condition(option.condition.as_deref(), &environment)
                || !evaluate_condition(option.command_line_condition.as_deref(), &environment)
            {
                continue;
            }

            if !option.architectures.is_empty() && !option.architectures.contains(&architecture) {
                continue;
            }

            if file_type.is_some_and(|file_type| {
                !option.file_types.is_empty() && !option.file_types.iter().any(|t| t == file_type)
            }) {
                continue;
            }

            let value = environment.resolve(&option.name);
            if option.avoid_empty_values && value.is_empty() {
                continue;
            }

            let arguments = OptionArguments {
                environment: &environment,
                working_directory,
                option,
            };

            if option.kind == OptionType::Boolean {
                let flag = if types::parse_boolean(&value) {
                    &option.command_line_flag
                } else {
                    &option.command_line_flag_if_false
                };
                // Boolean flags never take the value, which would only be YES or NO.
                if let Some(flag) = flag.as_ref().filter(|flag| !flag.is_empty()) {
                    result.arguments.push(environment.expand(flag));
                }
            } else if !value.is_empty() {
                if let Some(flag) = option.command_line_flag.as_ref().filter(|f| !f.is_empty()) {
                    arguments.add(
                        &mut result.arguments,
                        &[flag.clone(), Value::variable(OPTION_VALUE_SETTING)],
                    );
                }
            }

            arguments.add_values(&mut result.arguments, &option.values, &value);
            arguments.add_values(&mut result.arguments, &option.allowed_values, &value);

            if !value.is_empty() {
                if let Some(prefix) = &option.command_line_prefix_flag {
                    let joined = prefix.clone() + Value::variable(OPTION_VALUE_SETTING);
                    arguments.add(&mut result.arguments, &[joined]);
                }
            }

            if let Some(args) = &option.command_line_args {
                arguments.add_args(&mut result.arguments, args, &value);
            }
            if let Some(args) = &option.additional_linker_args {
                arguments.add_args(&mut result.linker_args, args, &value);
            }

            if let Some(variable) = &option.set_value_in_environment_variable {
                let variable = environment.expand(variable);
                if !variable.is_empty() {
                    result.environment.entry(variable).or_insert_with(|| value.clone());
                }
            }
        }

        log::debug!(
            "options produced {} arguments and {} linker arguments",
            result.arguments.len(),
            result.linker_args.len()
        );
        result
    }

    /// Evaluates the options of the tool behind `tool_environment`.
    ///
    /// The result's environment also receives the tool's `EnvironmentVariables`, unless
    /// an option already set them, and the `PATH` and `DEVELOPER_DIR` settings.
    pub fn create_with_tool_environment(
        tool_environment: &ToolEnvironment,
        working_directory: &str,
        file_type: Option<&str>,
    ) -> Self {
        let tool = tool_environment.tool();
        let environment = tool_environment.environment();

        let mut result = Self::create(
            environment,
            working_directory,
            &tool.options,
            file_type,
            &tool.deleted_properties,
        );

        for (name, value) in &tool.environment_variables {
            result
                .environment
                .entry(name.clone())
                .or_insert_with(|| environment.expand(value));
        }
        for name in ["PATH", "DEVELOPER_DIR"] {
            result.environment.insert(name.to_string(), environment.resolve(name));
        }

        result
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    pub fn linker_args(&self) -> &[String] {
        &self.linker_args
    }
}

/// Places option defaults beneath everything else, so an explicitly set value (even an
/// empty one) wins over the declared default.
fn with_option_defaults(environment: &Environment, options: &[PropertyOption]) -> Environment {
    let defaults: Level = options
        .iter()
        .filter_map(|option| {
            option
                .default_value
                .as_ref()
                .map(|value| Setting::new(&option.name, Condition::empty(), value.clone()))
        })
        .collect();

    let mut environment = environment.clone();
    if !defaults.is_empty() {
        environment.insert_back(defaults, true);
    }
    environment
}

/// Evaluates `lhs == rhs`, `lhs != rhs`, or a bare expression that holds unless it is `NO`.
/// The expression is expanded first.
fn evaluate_condition(condition: Option<&str>, environment: &Environment) -> bool {
    let Some(condition) = condition.filter(|c| !c.is_empty()) else {
        return true;
    };

    let expression = environment.expand(&Value::parse(condition));
    match COMPARISON.captures(&expression) {
        Some(captures) => {
            let lhs = captures.get(1).map_or("", |m| m.as_str());
            let rhs = captures.get(3).map_or("", |m| m.as_str());
            match captures.get(2).map(|m| m.as_str()) {
                Some("==") => lhs == rhs,
                _ => lhs != rhs,
            }
        }
        None => expression != "NO",
    }
}

struct OptionArguments<'a> {
    environment: &'a Environment,
    working_directory: &'a str,
    option: &'a PropertyOption,
}

impl OptionArguments<'_> {
    /// Expands `templates` once per value of the option, or once per item for list types.
    fn add(&self, out: &mut Vec<String>, templates: &[Value]) {
        if self.option.kind.is_list() {
            let mut items = types::parse_list(&self.environment.resolve(&self.option.name));
            if self.option.flatten_recursive_search_paths_in_value {
                items = search_paths::expand_recursive(
                    &items,
                    self.environment,
                    self.working_directory,
                );
            }
            for item in &items {
                self.add_one(out, templates, item);
            }
        } else {
            let value = self.environment.resolve(&self.option.name);
            self.add_one(out, templates, &value);
        }
    }

    fn add_one(&self, out: &mut Vec<String>, templates: &[Value], value: &str) {
        let mut environment = self.environment.clone();
        environment.insert_front(
            Level::new(vec![Setting::create(OPTION_VALUE_SETTING, value)]),
            false,
        );
        out.extend(templates.iter().map(|template| environment.expand(template)));
    }

    fn add_values(&self, out: &mut Vec<String>, mappings: &[ValueMapping], value: &str) {
        for mapping in mappings.iter().filter(|mapping| mapping.value == value) {
            if let Some(flag) = &mapping.command_line_flag {
                self.add(out, std::slice::from_ref(flag));
            } else if let Some(args) = &mapping.command_line_args {
                self.add(out, args);
            }
        }
    }

    fn add_args(&self, out: &mut Vec<String>, args: &OptionArgs, value: &str) {
        match args {
            OptionArgs::List(templates) => self.add(out, templates),
            OptionArgs::ByValue(table) => {
                if let Some(templates) = table.get(value).or_else(|| table.get(OTHERWISE_KEY)) {
                    self.add(out, templates);
                }
            }
        }
    }
}
