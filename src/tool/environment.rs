// src/tool/environment.rs

//! # Tool Environment
//!
//! The settings environment for one invocation of one tool. On top of the caller's
//! environment it layers, from lowest to highest priority:
//!
//! 1. The tool's option defaults, as a default level.
//! 2. Directories every tool may refer to (`DerivedFilesDir`, `ObjectsDir`, ...).
//! 3. `DependencyInfoFile`, when the tool declares one.
//! 4. Positional settings for the first input (`InputPath`, `InputFileBase`, ...).
//! 5. Positional settings for the first output (`OutputPath`, `OutputFileName`, ...).

use crate::core::condition::Condition;
use crate::core::environment::Environment;
use crate::core::level::Level;
use crate::core::setting::Setting;
use crate::system::paths;
use crate::tool::spec::Tool;
use std::sync::Arc;

/// One file handed to a tool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolInput {
    pub path: String,
    /// Localization name, e.g. `en` for a file inside `en.lproj`.
    pub localization: Option<String>,
    /// Distinguishes inputs that share a base name.
    pub disambiguator: Option<String>,
}

impl ToolInput {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolEnvironment {
    tool: Arc<Tool>,
    environment: Environment,
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl ToolEnvironment {
    /// Builds the environment for running `tool` on `inputs`.
    ///
    /// Outputs come from the tool's own `Outputs` when it declares them (the passed-in
    /// outputs are still visible to those templates), then from its `OutputPath`, and
    /// only then from `outputs`.
    pub fn create(
        tool: Arc<Tool>,
        base: &Environment,
        working_directory: &str,
        inputs: &[ToolInput],
        outputs: &[String],
    ) -> Self {
        let mut environment = base.clone();
        environment.insert_front(tool.default_settings(), true);

        let first_input = inputs.first();
        let mut product_resources = format!(
            "{}/{}",
            environment.resolve("TARGET_BUILD_DIR"),
            environment.resolve("UNLOCALIZED_RESOURCES_FOLDER_PATH")
        );
        let mut temp_resources = environment.resolve("TARGET_TEMP_DIR");
        if let Some(localization) = first_input.and_then(|input| input.localization.as_ref()) {
            let lproj = format!("{localization}.lproj");
            product_resources = format!("{product_resources}/{lproj}");
            temp_resources = format!("{temp_resources}/{lproj}");
        }

        environment.insert_front(
            Level::new(vec![
                Setting::parse_pair("DerivedFilesDir", "$(DERIVED_FILES_DIR)"),
                Setting::parse_pair("ObjectsDir", "$(OBJECT_FILE_DIR_$(variant))/$(arch)"),
                Setting::create("ProductResourcesDir", product_resources),
                Setting::create("TempResourcesDir", temp_resources),
            ]),
            false,
        );

        if let Some(file) = &tool.dependency_info_file {
            environment.insert_front(
                Level::new(vec![Setting::new(
                    "DependencyInfoFile",
                    Condition::empty(),
                    file.clone(),
                )]),
                false,
            );
        }

        if let Some(input) = first_input {
            environment.insert_front(input_level(input, working_directory), false);
        }
        let input_paths = inputs.iter().map(|input| input.path.clone()).collect();

        let mut output_paths = Vec::new();
        if !tool.outputs.is_empty() {
            if let Some(output) = outputs.first() {
                environment.insert_front(output_level(output), false);
            }
            for (index, output) in tool.outputs.iter().enumerate() {
                let path = environment.expand(output);
                if index == 0 {
                    environment.insert_front(output_level(&path), false);
                }
                output_paths.push(path);
            }
        } else if let Some(output_path) = &tool.output_path {
            let path = environment.expand(output_path);
            environment.insert_front(output_level(&path), false);
            output_paths.push(path);
        } else if let Some(output) = outputs.first() {
            environment.insert_front(output_level(output), false);
            output_paths.extend(outputs.iter().cloned());
        }

        log::debug!(
            "tool environment for '{}': {} inputs, {} outputs",
            tool.identifier,
            inputs.len(),
            output_paths.len()
        );

        Self {
            tool,
            environment,
            inputs: input_paths,
            outputs: output_paths,
        }
    }

    pub fn tool(&self) -> &Arc<Tool> {
        &self.tool
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Input paths as given.
    pub fn raw_inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Output paths as given or computed.
    pub fn raw_outputs(&self) -> &[String] {
        &self.outputs
    }

    /// Input paths made absolute against `working_directory`.
    pub fn inputs(&self, working_directory: &str) -> Vec<String> {
        resolve_all(&self.inputs, working_directory)
    }

    /// Output paths made absolute against `working_directory`.
    pub fn outputs(&self, working_directory: &str) -> Vec<String> {
        resolve_all(&self.outputs, working_directory)
    }
}

fn resolve_all(list: &[String], working_directory: &str) -> Vec<String> {
    list.iter()
        .map(|path| paths::resolve_relative_path(path, working_directory))
        .collect()
}

fn input_level(input: &ToolInput, working_directory: &str) -> Level {
    let absolute = paths::resolve_relative_path(&input.path, working_directory);
    let relative = paths::relative_path(&absolute, working_directory);

    Level::new(vec![
        Setting::create("Input", &input.path),
        Setting::create("InputPath", &input.path),
        Setting::create("InputFile", &input.path),
        Setting::parse_pair("InputFileName", "$(InputFile:file)"),
        Setting::parse_pair("InputFileBase", "$(InputFile:base)"),
        Setting::parse_pair("InputFileSuffix", "$(InputFile:suffix)"),
        Setting::create("InputFileRelativePath", relative),
        Setting::create(
            "InputFileBaseUniquefier",
            input.disambiguator.clone().unwrap_or_default(),
        ),
        Setting::create("InputFileTextEncoding", ""),
    ])
}

fn output_level(output: &str) -> Level {
    Level::new(vec![
        Setting::create("Output", output),
        Setting::create("OutputPath", output),
        Setting::create("OutputFile", output),
        Setting::parse_pair("OutputDir", "$(OutputFile:dir)"),
        Setting::parse_pair("OutputFileName", "$(OutputFile:file)"),
        Setting::parse_pair("OutputFileBase", "$(OutputFile:base)"),
    ])
}
