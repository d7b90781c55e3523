// src/system/executor.rs

use crate::CancellationToken;
use crate::tool::invocation::{Executable, Invocation};
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use std::sync::atomic::Ordering;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("No executable specified to run.")]
    EmptyCommand,
    #[error("'{0}' is implemented by the build system and cannot be run directly.")]
    BuiltinUnsupported(String),
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    #[error("Command '{command}' exited with status {}.", code.map_or("unknown".to_string(), |c| c.to_string()))]
    ExitStatus { command: String, code: Option<i32> },
    #[error("Operation was cancelled by the user.")]
    Cancelled,
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// Renders the invocation as a shell-quoted command line.
pub fn format_command_line(invocation: &Invocation) -> String {
    let parts = invocation.command_line();
    shlex::try_join(parts.iter().copied()).unwrap_or_else(|_| parts.join(" "))
}

/// Runs `invocation` and waits for it, killing the child if `cancellation_token` is set.
///
/// The child inherits this process's environment with the invocation's variables on
/// top. An exit code listed in the invocation's success codes counts as success.
pub fn execute_invocation(
    invocation: &Invocation,
    cancellation_token: &CancellationToken,
) -> ExecutionResult<()> {
    let program = match &invocation.executable {
        Executable::Builtin(name) => return Err(ExecutionError::BuiltinUnsupported(name.clone())),
        Executable::External(path) if path.is_empty() => return Err(ExecutionError::EmptyCommand),
        Executable::External(path) => path,
    };
    let display = format_command_line(invocation);

    let mut command = StdCommand::new(program);
    command
        .args(&invocation.arguments)
        .envs(&invocation.environment)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    if !invocation.working_directory.is_empty() {
        command.current_dir(dunce::simplified(Path::new(&invocation.working_directory)));
    }

    log::debug!("running: {}", display);
    let mut child = command
        .spawn()
        .map_err(|e| ExecutionError::CommandFailed(display.clone(), e))?;

    // Poll so that cancellation can interrupt a long-running tool.
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                let code = status.code();
                let success_codes: &[i32] = if invocation.success_exit_codes.is_empty() {
                    &[0]
                } else {
                    invocation.success_exit_codes.as_slice()
                };
                return match code {
                    Some(code) if success_codes.contains(&code) => Ok(()),
                    _ => Err(ExecutionError::ExitStatus {
                        command: display,
                        code,
                    }),
                };
            }
            Ok(None) => {
                if cancellation_token.load(Ordering::SeqCst) {
                    log::debug!("cancellation requested, killing child process {}", child.id());
                    if let Err(e) = child.kill() {
                        log::warn!("failed to kill child process {}: {}", child.id(), e);
                    }
                    child.wait().ok();
                    return Err(ExecutionError::Cancelled);
                }
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(e) => return Err(ExecutionError::CommandFailed(display, e)),
        }
    }
}
