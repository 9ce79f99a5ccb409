//! Subprocess execution boundary.

use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::process::Command;
use std::sync::Mutex;
use std::sync::PoisonError;

use tracing::debug;

use crate::error::{BatchError, BatchResult};

/// Captured output of one finished subprocess.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    /// Captured standard output, decoded lossily as UTF-8.
    pub stdout: String,
    /// Captured standard error, decoded lossily as UTF-8.
    pub stderr: String,
    /// Process exit code (-1 when terminated by a signal).
    pub exit_code: i32,
}

impl CommandOutput {
    /// Whether the process exited cleanly.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Abstraction over "run argv, capture stdout/stderr/exit code".
///
/// The system implementation shells out synchronously; tests substitute a
/// [`ScriptedRunner`] so command composition can be verified without a
/// scheduler installed.
pub trait CommandRunner: Send + Sync {
    /// Run a command, overlaying `env` on the inherited environment.
    fn run(&self, argv: &[String], env: &BTreeMap<String, String>) -> BatchResult<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for std::sync::Arc<R> {
    fn run(&self, argv: &[String], env: &BTreeMap<String, String>) -> BatchResult<CommandOutput> {
        (**self).run(argv, env)
    }
}

/// Runner backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String], env: &BTreeMap<String, String>) -> BatchResult<CommandOutput> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| BatchError::InvalidArgument("empty command line".to_string()))?;

        let mut command = Command::new(program);
        command.args(args);
        for (key, value) in env {
            command.env(key, value);
        }

        let output = command.output()?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

/// Split a rendered command line on whitespace and run it, treating a
/// nonzero exit as fatal.
///
/// Returns trimmed stdout on success.
pub(crate) fn run_command(
    runner: &dyn CommandRunner,
    command_line: &str,
    env: &BTreeMap<String, String>,
) -> BatchResult<String> {
    let argv: Vec<String> = command_line
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if argv.is_empty() {
        return Err(BatchError::InvalidArgument("empty command line".to_string()));
    }

    debug!("Running command: {}", command_line);
    let output = runner.run(&argv, env)?;

    if !output.success() {
        return Err(BatchError::CommandFailed {
            command: command_line.to_string(),
            exit_code: output.exit_code,
            stderr: output.stderr.trim().to_string(),
        });
    }

    Ok(output.stdout.trim().to_string())
}

/// One registered expectation on a [`ScriptedRunner`].
#[derive(Debug, Clone)]
struct ScriptedCall {
    argv: Vec<String>,
    output: CommandOutput,
}

/// Command runner for tests: expected commands are registered up front in
/// call order, each paired with the output to fake. Running anything else,
/// or running past the end of the script, is an error.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    calls: Mutex<VecDeque<ScriptedCall>>,
    envs: Mutex<Vec<BTreeMap<String, String>>>,
}

impl ScriptedRunner {
    /// Create a runner with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the next expected command together with its faked output.
    pub fn expect(&self, command_line: &str, output: CommandOutput) {
        let argv = command_line
            .split_whitespace()
            .map(str::to_string)
            .collect();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(ScriptedCall { argv, output });
    }

    /// Register an expected command that succeeds with the given stdout.
    pub fn expect_stdout(&self, command_line: &str, stdout: &str) {
        self.expect(
            command_line,
            CommandOutput {
                stdout: stdout.to_string(),
                ..CommandOutput::default()
            },
        );
    }

    /// Register an expected command that fails.
    pub fn expect_failure(&self, command_line: &str, exit_code: i32, stderr: &str) {
        self.expect(
            command_line,
            CommandOutput {
                stderr: stderr.to_string(),
                exit_code,
                ..CommandOutput::default()
            },
        );
    }

    /// Whether every registered expectation has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Environment overlays observed so far, one per executed command.
    pub fn seen_envs(&self) -> Vec<BTreeMap<String, String>> {
        self.envs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, argv: &[String], env: &BTreeMap<String, String>) -> BatchResult<CommandOutput> {
        let call = self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| {
                BatchError::InvalidArgument(format!(
                    "unexpected command (script exhausted): {}",
                    argv.join(" ")
                ))
            })?;

        if call.argv != argv {
            return Err(BatchError::InvalidArgument(format!(
                "unexpected command: got `{}`, expected `{}`",
                argv.join(" "),
                call.argv.join(" ")
            )));
        }

        self.envs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(env.clone());
        Ok(call.output)
    }
}
