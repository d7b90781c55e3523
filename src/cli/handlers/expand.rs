// src/cli/handlers/expand.rs

use crate::{
    CancellationToken,
    cli::{args::ExpandArgs, handlers::commons},
    core::value::Value,
    system::user_config,
};
use anyhow::Result;
use clap::Parser;

/// The handler for `xcsettings expand`.
pub fn handle(args: Vec<String>, _cancellation_token: &CancellationToken) -> Result<()> {
    let expand_args = ExpandArgs::try_parse_from(&args)?;
    let config = user_config::load_user_config()?;
    let environment = commons::build_environment(&expand_args.environment, &config)?;
    let context = commons::parse_conditions(&expand_args.environment.conditions)?;

    for expression in &expand_args.expressions {
        println!("{}", environment.expand_with(&Value::parse(expression), &context));
    }
    Ok(())
}
