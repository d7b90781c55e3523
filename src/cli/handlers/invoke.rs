// src/cli/handlers/invoke.rs

use crate::{
    CancellationToken,
    cli::{args::InvokeArgs, handlers::commons},
    system::{executor, user_config},
    tool::{
        environment::ToolInput,
        invocation::Invocation,
        resolver::{ResolveOptions, ToolResolver},
        tokens::UnknownTokenPolicy,
    },
};
use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::*;

/// The handler for `xcsettings invoke`.
/// Resolves one tool against the settings environment, then prints or runs the result.
pub fn handle(args: Vec<String>, cancellation_token: &CancellationToken) -> Result<()> {
    let invoke_args = InvokeArgs::try_parse_from(&args)?;
    let config = user_config::load_user_config()?;

    let environment = commons::build_environment(&invoke_args.environment, &config)?;
    let registry = commons::load_registry(&invoke_args.spec_paths, &config)?;
    let domains = if invoke_args.domains.is_empty() {
        config.domains.clone()
    } else {
        invoke_args.domains.clone()
    };

    let policy = if invoke_args.expand_unknown_tokens {
        UnknownTokenPolicy::Reference
    } else {
        UnknownTokenPolicy::Literal
    };
    let resolver = ToolResolver::create(&registry, &domains, &invoke_args.tool)
        .ok_or_else(|| anyhow!("Tool '{}' was not found in domains {:?}.", invoke_args.tool, domains))?
        .with_token_policy(policy);

    let working_directory = match &invoke_args.working_dir {
        Some(dir) => commons::path_to_string(dir)?,
        None => commons::current_dir()?,
    };
    let inputs: Vec<ToolInput> = invoke_args.inputs.iter().map(ToolInput::new).collect();

    let mut special_args = invoke_args.special_args.clone();
    for identifier in &invoke_args.linker_args_from {
        let producer = ToolResolver::create(&registry, &domains, identifier)
            .ok_or_else(|| anyhow!("Tool '{}' was not found in domains {:?}.", identifier, domains))?;
        special_args.extend(producer.linker_args(
            &environment,
            &working_directory,
            invoke_args.file_type.as_deref(),
        ));
    }

    let options = ResolveOptions {
        file_type: invoke_args.file_type.clone(),
        executable: invoke_args.executable.clone(),
        special_args,
        ..ResolveOptions::default()
    };

    commons::check_for_cancellation(cancellation_token)?;
    let invocation = resolver.resolve(
        &environment,
        &working_directory,
        &inputs,
        &invoke_args.outputs,
        &options,
    );

    if invoke_args.run {
        if !invocation.log_message.is_empty() {
            println!("{}", invocation.log_message.bold());
        }
        return executor::execute_invocation(&invocation, cancellation_token)
            .with_context(|| format!("Tool '{}' failed", invoke_args.tool));
    }

    if invoke_args.json {
        println!("{}", serde_json::to_string_pretty(&invocation)?);
    } else {
        print_invocation(&invocation);
    }
    Ok(())
}

fn print_invocation(invocation: &Invocation) {
    if !invocation.log_message.is_empty() {
        println!("{}", invocation.log_message.bold());
    }
    println!("    cd {}", invocation.working_directory);
    for (name, value) in &invocation.environment {
        println!("    export {}={}", name, value);
    }
    println!("    {}", executor::format_command_line(invocation));

    if !invocation.inputs.is_empty() {
        println!("  {} {}", "inputs:".blue(), invocation.inputs.join(" "));
    }
    if !invocation.outputs.is_empty() {
        println!("  {} {}", "outputs:".blue(), invocation.outputs.join(" "));
    }
    for info in &invocation.dependency_info {
        println!("  {} {:?} {}", "dependency info:".blue(), info.format, info.path);
    }
}
