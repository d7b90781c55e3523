// src/bin/xcsettings.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};
use colored::*;
use log::Level;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use xcsettings::{
    CancellationToken,
    cli::{Cli, handlers},
    system::executor,
};

// --- Command Definition and Registry ---

/// A command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &CancellationToken) -> Result<()>,
}

/// Every command the binary understands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "config",
        aliases: &[],
        handler: handlers::config::handle,
    },
    CommandDefinition {
        name: "expand",
        aliases: &["x"],
        handler: handlers::expand::handle,
    },
    CommandDefinition {
        name: "invoke",
        aliases: &["tool"],
        handler: handlers::invoke::handle,
    },
    CommandDefinition {
        name: "resolve",
        aliases: &["get"],
        handler: handlers::resolve::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format(|buf, record| match record.level() {
            Level::Error => writeln!(buf, "{}: {}", "error".red().bold(), record.args()),
            Level::Warn => writeln!(buf, "{}: {}", "warning".yellow().bold(), record.args()),
            _ => writeln!(buf, "[{}] {}", record.level(), record.args()),
        })
        .init();
}

fn main() {
    let cancellation_token = Arc::new(AtomicBool::new(false));
    init_logging();

    if let Err(e) = run_cli(Cli::parse(), cancellation_token) {
        if let Some(executor::ExecutionError::Cancelled) = e.downcast_ref::<executor::ExecutionError>() {
            std::process::exit(130);
        }

        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli, cancellation_token: CancellationToken) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let Some(name) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match find_command(&name) {
        Some(command) => (command.handler)(cli.args, &cancellation_token),
        None => Err(anyhow::anyhow!(
            "Unknown command '{}'. Available commands: {}.",
            name,
            COMMAND_REGISTRY
                .iter()
                .map(|cmd| cmd.name)
                .collect::<Vec<_>>()
                .join(", ")
        )),
    }
}
