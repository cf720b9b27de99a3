// src/system/executor.rs

use crate::CancellationToken;
use std::io::Read;
use std::path::Path;
use std::process::{Command as StdCommand, ExitStatus, Stdio};
use std::sync::atomic::Ordering;
use thiserror::Error;

/// Failures of an external program.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// The program could not be started or waited for.
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    /// The program exited with a failure code.
    #[error("Command '{command}' exited with a non-zero error code ({code}).")]
    NonZeroExitStatus {
        /// Command line that was run.
        command: String,
        /// Its exit code.
        code: i32,
    },
    /// The program was killed by a signal.
    #[error("Command '{command}' did not terminate normally (signal {signal}).")]
    Signaled {
        /// Command line that was run.
        command: String,
        /// Signal number, 0 when unknown.
        signal: i32,
    },
    /// The program succeeded but printed nothing.
    #[error("Command '{0}' produced no output.")]
    EmptyOutput(String),
    /// The program printed something that is not UTF-8.
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        /// Command line that was run.
        command: String,
        /// Decoding failure.
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Which output stream of a child process carries the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

/// How the final command of a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// The shell exited on its own with this code.
    Exited(i32),
    /// The shell was stopped by SIGINT.
    Interrupted,
}

fn describe(program: &Path, args: &[&str]) -> String {
    let mut parts = vec![program.display().to_string()];
    parts.extend(args.iter().map(|a| a.to_string()));
    parts.join(" ")
}

/// Maps an exit status to a code, or to an error when the process was killed.
fn status_code(command: &str, status: ExitStatus) -> Result<i32, ExecutionError> {
    if let Some(code) = status.code() {
        return Ok(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(ExecutionError::Signaled {
                command: command.to_string(),
                signal,
            });
        }
    }
    Err(ExecutionError::Signaled {
        command: command.to_string(),
        signal: 0,
    })
}

/// Runs a program to completion and returns everything it printed on `stream`.
/// The other stream is passed through to the user's terminal.
///
/// A program that exits non-zero or is killed is an error, whatever it printed.
pub fn capture_output(
    program: &Path,
    args: &[&str],
    env_vars: &[(String, String)],
    stream: OutputStream,
) -> Result<String, ExecutionError> {
    let command_line = describe(program, args);
    log::debug!("Capturing {:?} of: {}", stream, command_line);

    let mut command = StdCommand::new(program);
    command
        .args(args)
        .envs(env_vars.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::null());
    match stream {
        OutputStream::Stdout => command.stdout(Stdio::piped()).stderr(Stdio::inherit()),
        OutputStream::Stderr => command.stdout(Stdio::null()).stderr(Stdio::piped()),
    };

    let mut child = command
        .spawn()
        .map_err(|e| ExecutionError::CommandFailed(command_line.clone(), e))?;

    let mut captured = Vec::new();
    let pipe_result = match stream {
        OutputStream::Stdout => child.stdout.take().map(|mut p| p.read_to_end(&mut captured)),
        OutputStream::Stderr => child.stderr.take().map(|mut p| p.read_to_end(&mut captured)),
    };
    let status = child
        .wait()
        .map_err(|e| ExecutionError::CommandFailed(command_line.clone(), e))?;
    if let Some(Err(e)) = pipe_result {
        return Err(ExecutionError::CommandFailed(command_line, e));
    }

    let code = status_code(&command_line, status)?;
    if code != 0 {
        return Err(ExecutionError::NonZeroExitStatus {
            command: command_line,
            code,
        });
    }

    String::from_utf8(captured).map_err(|e| ExecutionError::InvalidUtf8Output {
        command: command_line,
        source: e,
    })
}

/// Runs a program with inherited stdio and returns its exit code.
pub fn run_status(
    program: &Path,
    args: &[&str],
    env_vars: &[(String, String)],
    quiet: bool,
) -> Result<i32, ExecutionError> {
    let command_line = describe(program, args);
    log::debug!("Running: {}", command_line);

    let mut command = StdCommand::new(program);
    command.args(args).envs(env_vars.iter().map(|(k, v)| (k, v)));
    if quiet {
        command.stdout(Stdio::null()).stderr(Stdio::null());
    }
    let status = command
        .status()
        .map_err(|e| ExecutionError::CommandFailed(command_line.clone(), e))?;
    status_code(&command_line, status)
}

/// Interprets `script` with `shell` in a child process and waits for it.
///
/// The child shares our terminal, so Ctrl+C reaches it directly; the binary's
/// handler only records the request in `cancellation_token` so we outlive the
/// child and can report the outcome.
pub fn run_script(
    shell: &Path,
    script: &Path,
    env_vars: &[(String, String)],
    cancellation_token: &CancellationToken,
) -> Result<ScriptOutcome, ExecutionError> {
    let script_str = script.to_string_lossy();
    let command_line = describe(shell, &[script_str.as_ref()]);
    log::debug!("Spawning: {}", command_line);

    let status = StdCommand::new(shell)
        .arg(script)
        .envs(env_vars.iter().map(|(k, v)| (k, v)))
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| ExecutionError::CommandFailed(command_line.clone(), e))?;

    match status_code(&command_line, status) {
        Ok(code) => {
            if cancellation_token.load(Ordering::SeqCst) {
                log::debug!("Ctrl+C seen while the command ran; it exited with {}.", code);
            }
            Ok(ScriptOutcome::Exited(code))
        }
        #[cfg(unix)]
        Err(ExecutionError::Signaled { signal, .. }) if signal == libc::SIGINT => {
            Ok(ScriptOutcome::Interrupted)
        }
        Err(e) => Err(e),
    }
}

/// Replaces the current process image with `shell script`.
///
/// Only returns when the replacement could not happen, so anything that must
/// be cleaned up has to be arranged before calling it.
#[cfg(unix)]
pub fn replace_process(shell: &Path, script: &Path, env_vars: &[(String, String)]) -> ExecutionError {
    use std::os::unix::process::CommandExt;

    let script_str = script.to_string_lossy();
    let command_line = describe(shell, &[script_str.as_ref()]);
    log::debug!("Replacing process with: {}", command_line);
    let error = StdCommand::new(shell)
        .arg(script)
        .envs(env_vars.iter().map(|(k, v)| (k, v)))
        .exec();
    ExecutionError::CommandFailed(command_line, error)
}
