// src/tool/tokens.rs

//! # Command-Line Tokens
//!
//! A tool's command line is a whitespace separated template. A token written exactly as
//! `[name]` is replaced by the whole list bound to that name:
//!
//! | Token            | Values                          |
//! |------------------|---------------------------------|
//! | `[input]`        | the first input, or empty       |
//! | `[output]`       | the first output, or empty      |
//! | `[inputs]`       | every input                     |
//! | `[outputs]`      | every output                    |
//! | `[options]`      | the evaluated option arguments  |
//! | `[exec-path]`    | the executable                  |
//! | `[special-args]` | arguments supplied by the caller|
//!
//! Every other token is a setting expression expanded on its own. Substituted values are
//! never split or expanded again.

use crate::constants::{
    DEFAULT_COMMAND_LINE, TOKEN_EXEC_PATH, TOKEN_INPUT, TOKEN_INPUTS, TOKEN_OPTIONS,
    TOKEN_OUTPUT, TOKEN_OUTPUTS, TOKEN_SPECIAL_ARGS,
};
use crate::core::environment::Environment;
use crate::core::value::Value;
use crate::tool::environment::ToolEnvironment;
use crate::tool::options::OptionsResult;

/// What to do with a bracketed token that names no token class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownTokenPolicy {
    /// Emit the token unchanged, brackets included.
    #[default]
    Literal,
    /// Expand `[name]` as if it were `$(name)`.
    Reference,
}

/// The lists bound to the token classes.
#[derive(Debug, Clone, Default)]
pub struct TokenValues<'a> {
    pub executable: &'a str,
    pub options: &'a [String],
    pub special_args: &'a [String],
    pub inputs: &'a [String],
    pub outputs: &'a [String],
}

impl TokenValues<'_> {
    fn lookup(&self, token: &str) -> Option<Vec<String>> {
        let first = |list: &[String]| vec![list.first().cloned().unwrap_or_default()];
        match token {
            TOKEN_INPUT => Some(first(self.inputs)),
            TOKEN_OUTPUT => Some(first(self.outputs)),
            TOKEN_INPUTS => Some(self.inputs.to_vec()),
            TOKEN_OUTPUTS => Some(self.outputs.to_vec()),
            TOKEN_OPTIONS => Some(self.options.to_vec()),
            TOKEN_EXEC_PATH => Some(vec![self.executable.to_string()]),
            TOKEN_SPECIAL_ARGS => Some(self.special_args.to_vec()),
            _ => None,
        }
    }
}

/// Expands `template` token by token.
pub fn expand(
    template: &str,
    values: &TokenValues<'_>,
    environment: &Environment,
    policy: UnknownTokenPolicy,
) -> Vec<String> {
    let mut result = Vec::new();

    for token in template.split_whitespace() {
        let name = token
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'));

        if let Some(name) = name {
            if let Some(substituted) = values.lookup(name) {
                result.extend(substituted);
                continue;
            }
            if policy == UnknownTokenPolicy::Literal {
                log::trace!("leaving unknown token '{}' as written", token);
                result.push(token.to_string());
                continue;
            }
        }

        let value = match name {
            Some(name) => Value::variable(name),
            None => Value::parse(token),
        };
        result.push(environment.expand(&value));
    }

    result
}

/// The command line and log message of one tool run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolExpansions {
    pub executable: String,
    pub arguments: Vec<String>,
    pub log_message: String,
}

/// Expands the command line and log message of the tool behind `tool_environment`.
///
/// A non-empty `executable` replaces the tool's `ExecPath`. The first expanded token
/// becomes the executable and the rest its arguments.
pub fn expand_tool(
    tool_environment: &ToolEnvironment,
    options: &OptionsResult,
    executable: &str,
    special_args: &[String],
    policy: UnknownTokenPolicy,
) -> ToolExpansions {
    let tool = tool_environment.tool();
    let environment = tool_environment.environment();

    let template = tool
        .command_line
        .as_ref()
        .map(Value::raw)
        .filter(|line| !line.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_COMMAND_LINE.to_string());

    let exec_path = if executable.is_empty() {
        tool.exec_path
            .as_ref()
            .map(|path| environment.expand(path))
            .unwrap_or_default()
    } else {
        executable.to_string()
    };

    let values = TokenValues {
        executable: &exec_path,
        options: options.arguments(),
        special_args,
        inputs: tool_environment.raw_inputs(),
        outputs: tool_environment.raw_outputs(),
    };

    let mut tokens = expand(&template, &values, environment, policy).into_iter();
    let command = tokens.next().unwrap_or_default();
    let arguments: Vec<String> = tokens.collect();

    let log_template = [&tool.rule_name, &tool.rule_format, &tool.exec_description]
        .into_iter()
        .flatten()
        .map(Value::raw)
        .find(|template| !template.trim().is_empty())
        .unwrap_or_default();
    let log_message = expand(&log_template, &values, environment, policy).join(" ");

    log::debug!(
        "expanded '{}' to '{}' with {} arguments",
        tool.identifier,
        command,
        arguments.len()
    );

    ToolExpansions {
        executable: command,
        arguments,
        log_message,
    }
}
