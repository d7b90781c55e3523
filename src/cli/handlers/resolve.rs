// src/cli/handlers/resolve.rs

use crate::{
    CancellationToken,
    cli::{args::ResolveArgs, handlers::commons},
    system::user_config,
};
use anyhow::Result;
use clap::Parser;
use colored::*;

/// The handler for `xcsettings resolve`.
pub fn handle(args: Vec<String>, cancellation_token: &CancellationToken) -> Result<()> {
    let resolve_args = ResolveArgs::try_parse_from(&args)?;
    let config = user_config::load_user_config()?;
    let environment = commons::build_environment(&resolve_args.environment, &config)?;
    let context = commons::parse_conditions(&resolve_args.environment.conditions)?;

    if resolve_args.dump {
        print!("{}", environment.dump());
        return Ok(());
    }

    if resolve_args.all {
        let values = environment.compute_values(&context);
        let mut names: Vec<&String> = values.keys().collect();
        names.sort();
        for name in names {
            commons::check_for_cancellation(cancellation_token)?;
            let value = values.get(name).map(String::as_str).unwrap_or_default();
            println!("{} = {}", name.cyan(), value);
        }
        return Ok(());
    }

    for name in &resolve_args.names {
        let value = environment.resolve_with(name, &context);
        if resolve_args.names.len() == 1 {
            println!("{value}");
        } else {
            println!("{} = {}", name.cyan(), value);
        }
    }
    Ok(())
}
