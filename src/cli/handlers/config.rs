// src/cli/handlers/config.rs

use crate::{
    CancellationToken,
    cli::{args::ConfigArgs, handlers::commons},
    system::user_config,
};
use anyhow::Result;
use clap::Parser;
use colored::*;

/// The handler for `xcsettings config`.
pub fn handle(args: Vec<String>, _cancellation_token: &CancellationToken) -> Result<()> {
    let config_args = ConfigArgs::try_parse_from(&args)?;
    let path = user_config::config_path()?;

    if config_args.path {
        println!("{}", path.display());
        return Ok(());
    }

    let config = user_config::load_user_config()?;

    println!("\n--- {} '{}' ---", "Configuration".bold(), path.display().to_string().yellow());
    println!("  {:<15} {}", "domains".blue(), config.domains.join(", "));
    println!(
        "  {:<15} {}",
        "developer dir".blue(),
        config.developer_dir.as_deref().unwrap_or("(from environment)")
    );
    println!("  {}", "spec paths".blue());
    for spec_path in &config.spec_paths {
        println!("    - {}", spec_path);
    }
    println!("  {}", "settings".blue());
    for (name, value) in &config.settings {
        println!("    {} = {}", name.cyan(), value);
    }

    if config_args.tools {
        let registry = commons::load_registry(&[], &config)?;
        println!("  {}", "tools".blue());
        for identifier in registry.identifiers() {
            println!("    {}", identifier);
        }
    }

    println!("\n---------------------------------");
    Ok(())
}
