// src/tool/resolver.rs

//! # Tool Resolver
//!
//! Runs the whole pipeline for one tool: tool environment, options, token expansion and
//! finally the [`Invocation`].

use crate::constants::LIPO_TOOL_IDENTIFIER;
use crate::core::environment::Environment;
use crate::models::ToolKind;
use crate::system::paths;
use crate::tool::environment::{ToolEnvironment, ToolInput};
use crate::tool::invocation::{DependencyInfo, DependencyInfoFormat, Executable, Invocation};
use crate::tool::options::OptionsResult;
use crate::tool::registry::ToolRegistry;
use crate::tool::spec::Tool;
use crate::tool::tokens::{self, UnknownTokenPolicy};
use std::sync::Arc;

/// Arguments dropped from the final command line of specific tools. Lipo's descriptor
/// declares `-arch_only`, which lipo itself rejects.
const REMOVED_ARGUMENTS: &[(&str, &[&str])] = &[(LIPO_TOOL_IDENTIFIER, &["-arch_only"])];

/// Optional inputs to [`ToolResolver::resolve`].
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Identifier of the input's file type, for options restricted to file types.
    pub file_type: Option<String>,
    /// Replaces the tool's `ExecPath` when set.
    pub executable: Option<String>,
    /// Values of the `[special-args]` token.
    pub special_args: Vec<String>,
    /// Replaces the log message derived from `RuleName` / `RuleFormat` when set.
    pub log_message: Option<String>,
    pub priority: i32,
}

#[derive(Debug, Clone)]
pub struct ToolResolver {
    tool: Arc<Tool>,
    token_policy: UnknownTokenPolicy,
}

impl ToolResolver {
    pub fn new(tool: Arc<Tool>) -> Self {
        Self {
            tool,
            token_policy: UnknownTokenPolicy::default(),
        }
    }

    /// Looks `identifier` up in `domains`. A missing tool is reported as a warning.
    pub fn create(registry: &ToolRegistry, domains: &[String], identifier: &str) -> Option<Self> {
        match registry.lookup(identifier, domains) {
            Some(tool) => Some(Self::new(tool)),
            None => {
                log::warn!("could not find tool {}", identifier);
                None
            }
        }
    }

    pub fn with_token_policy(mut self, policy: UnknownTokenPolicy) -> Self {
        self.token_policy = policy;
        self
    }

    pub fn tool(&self) -> &Arc<Tool> {
        &self.tool
    }

    /// Builds the invocation that runs the tool on `inputs`.
    pub fn resolve(
        &self,
        environment: &Environment,
        working_directory: &str,
        inputs: &[ToolInput],
        outputs: &[String],
        options: &ResolveOptions,
    ) -> Invocation {
        let tool_environment = ToolEnvironment::create(
            Arc::clone(&self.tool),
            environment,
            working_directory,
            inputs,
            outputs,
        );
        let settings = tool_environment.environment();

        if let Some(file_type) = options.file_type.as_deref() {
            if !self.tool.accepts_file_type(file_type) {
                log::warn!("tool {} does not accept files of type {}", self.tool.identifier, file_type);
            }
        }
        let architecture = settings.resolve("arch");
        if !self.tool.supports_architecture(&architecture) {
            log::warn!("tool {} does not support architecture {}", self.tool.identifier, architecture);
        }

        let option_result = OptionsResult::create_with_tool_environment(
            &tool_environment,
            working_directory,
            options.file_type.as_deref(),
        );

        let mut special_args = options.special_args.clone();
        let mut dependency_info = Vec::new();

        if self.tool.deeply_stat_input_directories {
            dependency_info.extend(
                tool_environment
                    .inputs(working_directory)
                    .into_iter()
                    .map(|input| DependencyInfo::new(DependencyInfoFormat::Directory, input)),
            );
        }

        if self.tool.kind == ToolKind::Linker {
            if let Some(file) = &self.tool.dependency_info_file {
                let path = settings.expand(file);
                if !path.is_empty() {
                    special_args.extend([
                        "-Xlinker".to_string(),
                        "-dependency_info".to_string(),
                        "-Xlinker".to_string(),
                        path.clone(),
                    ]);
                    dependency_info.push(DependencyInfo::new(DependencyInfoFormat::Binary, path));
                }
            }
        }

        let expansions = tokens::expand_tool(
            &tool_environment,
            &option_result,
            options.executable.as_deref().unwrap_or_default(),
            &special_args,
            self.token_policy,
        );

        let removed = removed_arguments(&self.tool.identifier);
        let mut arguments = expansions.arguments;
        arguments.retain(|argument| !removed.contains(&argument.as_str()));

        let search_paths = paths::split_search_paths(&settings.resolve("PATH"));
        let log_message = options
            .log_message
            .clone()
            .filter(|message| !message.is_empty())
            .unwrap_or(expansions.log_message);

        log::debug!(
            "resolved '{}' to '{}' with {} arguments",
            self.tool.identifier,
            expansions.executable,
            arguments.len()
        );

        Invocation {
            executable: Executable::determine(&expansions.executable, &search_paths),
            arguments,
            environment: option_result.environment().clone(),
            working_directory: working_directory.to_string(),
            inputs: tool_environment.inputs(working_directory),
            outputs: tool_environment.outputs(working_directory),
            dependency_info,
            log_message,
            priority: options.priority,
            success_exit_codes: self.tool.success_exit_codes(),
        }
    }

    /// The `AdditionalLinkerArgs` this tool's options contribute, for passing on to the
    /// linker that consumes its outputs.
    pub fn linker_args(
        &self,
        environment: &Environment,
        working_directory: &str,
        file_type: Option<&str>,
    ) -> Vec<String> {
        let tool_environment = ToolEnvironment::create(
            Arc::clone(&self.tool),
            environment,
            working_directory,
            &[],
            &[],
        );
        OptionsResult::create_with_tool_environment(&tool_environment, working_directory, file_type)
            .linker_args()
            .to_vec()
    }
}

fn removed_arguments(identifier: &str) -> &'static [&'static str] {
    REMOVED_ARGUMENTS
        .iter()
        .find(|(tool, _)| *tool == identifier)
        .map(|(_, removed)| *removed)
        .unwrap_or_default()
}
