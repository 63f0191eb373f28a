// src/system/executor.rs

use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    #[error("Command '{0}' exited with a non-zero error code.")]
    NonZeroExitStatus(String),
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Executes a command and captures its standard output.
///
/// `command_line` is split with shell rules; `extra_args` are appended verbatim, so
/// values coming from user input (a hostname, for instance) are never re-parsed.
/// Stderr is captured and logged at debug level. This call blocks until the command exits.
pub fn execute_and_capture_output(
    command_line: &str,
    extra_args: &[&str],
) -> Result<String, ExecutionError> {
    let trimmed_command = command_line.trim();
    if trimmed_command.is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }

    let parts = shlex::split(trimmed_command)
        .ok_or_else(|| ExecutionError::CommandParse(trimmed_command.to_string()))?;
    let (program, args) = parts.split_first().ok_or(ExecutionError::EmptyCommand)?;

    let display_command = if extra_args.is_empty() {
        trimmed_command.to_string()
    } else {
        format!("{} {}", trimmed_command, extra_args.join(" "))
    };
    log::debug!("Executing for capture: '{}'", display_command);

    let command_output = StdCommand::new(program)
        .args(args)
        .args(extra_args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| ExecutionError::CommandFailed(display_command.clone(), e))?;

    if !command_output.stderr.is_empty() {
        log::debug!(
            "'{}' stderr: {}",
            display_command,
            String::from_utf8_lossy(&command_output.stderr).trim()
        );
    }

    if !command_output.status.success() {
        return Err(ExecutionError::NonZeroExitStatus(display_command));
    }

    String::from_utf8(command_output.stdout).map_err(|e| ExecutionError::InvalidUtf8Output {
        command: display_command,
        source: e,
    })
}
