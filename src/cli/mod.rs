// src/cli/mod.rs

use clap::Parser;

pub mod args;
pub mod handlers;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

Commands:
  resolve <NAME>...     Resolve build settings by name
  expand <EXPR>...      Expand setting expressions
  invoke <TOOL>         Print or run the invocation of one tool
  config                Show the user configuration

Run '{name} <command> --help' for the options of a command.
{after-help}";

/// xcsettings: build-setting resolution and tool invocations for xcconfig-based builds.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = HELP_TEMPLATE,
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// The command to run.
    pub command: Option<String>,

    /// Arguments for the command, parsed by the command itself.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_and_arguments() {
        let cli = Cli::try_parse_from(["xcsettings", "resolve", "-s", "A=1", "A"]).unwrap();
        assert_eq!(cli.command.as_deref(), Some("resolve"));
        assert_eq!(cli.args, ["-s", "A=1", "A"]);
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::try_parse_from(["xcsettings"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.args.is_empty());
    }

    #[test]
    fn test_command_arguments_parse() {
        let resolve = args::ResolveArgs::try_parse_from(["-s", "A=1", "--condition", "arch=arm64", "A"])
            .unwrap();
        assert_eq!(resolve.names, ["A"]);
        assert_eq!(resolve.environment.overrides, ["A=1"]);
        assert_eq!(resolve.environment.conditions, ["arch=arm64"]);

        let invoke = args::InvokeArgs::try_parse_from([
            "com.example.cc",
            "-i",
            "a.c",
            "-o",
            "a.o",
            "--special-arg",
            "-DDEBUG",
            "--linker-args-from",
            "com.example.swift",
            "--json",
        ])
        .unwrap();
        assert_eq!(invoke.tool, "com.example.cc");
        assert_eq!(invoke.inputs, ["a.c"]);
        assert_eq!(invoke.outputs, ["a.o"]);
        assert_eq!(invoke.special_args, ["-DDEBUG"]);
        assert_eq!(invoke.linker_args_from, ["com.example.swift"]);
        assert!(invoke.json);
    }
}
