// src/cli/args.rs
use clap::{Args, Parser};
use std::path::PathBuf;

/// Options shared by every command that builds a settings environment.
#[derive(Args, Debug, Default, Clone)]
pub struct EnvironmentArgs {
    /// Load settings from an xcconfig file. Later files take precedence.
    #[arg(long = "xcconfig", short = 'x', value_name = "PATH")]
    pub xcconfigs: Vec<PathBuf>,

    /// Override a setting (e.g. "SDKROOT=macosx" or "ARCHS[sdk=iphoneos*]=arm64").
    #[arg(long = "set", short = 's', value_name = "NAME=VALUE")]
    pub overrides: Vec<String>,

    /// Evaluation context for conditional settings (e.g. "arch=arm64").
    #[arg(long = "condition", short = 'c', value_name = "KEY=VALUE")]
    pub conditions: Vec<String>,

    /// Do not include the process environment variables as default settings.
    #[arg(long)]
    pub no_process_env: bool,
}

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Resolves build settings by name."
)]
pub struct ResolveArgs {
    /// The settings to resolve.
    pub names: Vec<String>,

    /// Print every setting known to the environment.
    #[arg(long, short)]
    pub all: bool,

    /// Print the levels of the environment instead of resolving.
    #[arg(long)]
    pub dump: bool,

    #[command(flatten)]
    pub environment: EnvironmentArgs,
}

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Expands a setting expression such as '$(SRCROOT)/include'."
)]
pub struct ExpandArgs {
    /// The expressions to expand. Each is printed on its own line.
    #[arg(required = true)]
    pub expressions: Vec<String>,

    #[command(flatten)]
    pub environment: EnvironmentArgs,
}

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Builds the invocation of one tool and prints or runs it."
)]
pub struct InvokeArgs {
    /// Identifier of the tool (e.g. "com.apple.compilers.gcc").
    pub tool: String,

    /// An input file. May be repeated.
    #[arg(long = "input", short = 'i', value_name = "PATH")]
    pub inputs: Vec<String>,

    /// An output file. May be repeated.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub outputs: Vec<String>,

    /// Working directory of the invocation. Defaults to the current directory.
    #[arg(long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// A tool descriptor file or directory, searched before the configured ones.
    #[arg(long = "specs", value_name = "PATH")]
    pub spec_paths: Vec<PathBuf>,

    /// A spec domain to search, in order. Defaults to the configured domains.
    #[arg(long = "domain", short = 'd', value_name = "NAME")]
    pub domains: Vec<String>,

    /// File type identifier of the input, for options restricted to file types.
    #[arg(long, value_name = "IDENTIFIER")]
    pub file_type: Option<String>,

    /// Replace the tool's executable.
    #[arg(long, value_name = "PATH")]
    pub executable: Option<String>,

    /// A value for the [special-args] token. May be repeated.
    #[arg(long = "special-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub special_args: Vec<String>,

    /// A tool whose options' linker arguments are appended to the special args.
    /// May be repeated.
    #[arg(long = "linker-args-from", value_name = "TOOL")]
    pub linker_args_from: Vec<String>,

    /// Expand unknown [name] tokens as $(name) instead of keeping them literally.
    #[arg(long)]
    pub expand_unknown_tokens: bool,

    /// Print the invocation as JSON.
    #[arg(long)]
    pub json: bool,

    /// Run the invocation instead of printing it.
    #[arg(long)]
    pub run: bool,

    #[command(flatten)]
    pub environment: EnvironmentArgs,
}

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Shows the user configuration."
)]
pub struct ConfigArgs {
    /// Print only the path of the configuration file.
    #[arg(long)]
    pub path: bool,

    /// List the tools found in the configured descriptor paths.
    #[arg(long)]
    pub tools: bool,
}
