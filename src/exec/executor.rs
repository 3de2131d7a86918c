use std::borrow::Cow;
use std::fmt;
use std::process::{Command, Stdio};
use std::sync::{Mutex, PoisonError};

use crate::foundation::error::{MagickError, MagickResult};

/// Captured result of one external tool invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub success: bool,
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// Successful run with the given stdout.
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    /// Failed run with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: Vec::new(),
            stderr: stderr.into(),
        }
    }

    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    /// Turn a non-zero exit into [`MagickError::ExternalTool`] carrying stderr.
    pub fn into_result(self) -> MagickResult<Self> {
        if self.success {
            return Ok(self);
        }
        let status = match self.code {
            Some(code) => format!("exit status: {code}"),
            None => "terminated by signal".to_string(),
        };
        Err(MagickError::external_tool(
            status,
            self.stderr_lossy().trim().to_string(),
        ))
    }
}

/// Runs one fully built argv (`argv[0]` is the program) and blocks until it exits.
///
/// Implementations must pass the arguments through in order, without reordering or
/// deduplicating, and must not retry. A non-zero exit is reported through
/// [`ToolOutput::success`], not as an `Err`; `Err` is reserved for failing to run at all.
pub trait Executor: Send + Sync + fmt::Debug {
    fn execute(&self, argv: &[String]) -> MagickResult<ToolOutput>;
}

/// Executor spawning real processes with `std::process::Command`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(&self, argv: &[String]) -> MagickResult<ToolOutput> {
        let Some((program, args)) = argv.split_first() else {
            return Err(MagickError::invalid_argument("cannot execute an empty argv"));
        };

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                MagickError::external_tool(
                    "spawn failed",
                    format!("failed to spawn '{program}' (is it installed and on PATH?): {e}"),
                )
            })?;

        Ok(ToolOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

type Responder = dyn Fn(&[String]) -> MagickResult<ToolOutput> + Send + Sync;

/// Executor that answers from a closure and records every argv it receives.
///
/// Intended for tests and for inspecting command lines without running the tool.
pub struct RecordingExecutor {
    responder: Box<Responder>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingExecutor {
    pub fn new(
        responder: impl Fn(&[String]) -> MagickResult<ToolOutput> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Executor that succeeds with empty output for every call.
    pub fn succeeding() -> Self {
        Self::new(|_| Ok(ToolOutput::ok(Vec::new())))
    }

    /// Snapshot of the argv of every call so far, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_call(&self) -> Option<Vec<String>> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for RecordingExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingExecutor")
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

impl Executor for RecordingExecutor {
    fn execute(&self, argv: &[String]) -> MagickResult<ToolOutput> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(argv.to_vec());
        (self.responder)(argv)
    }
}

/// Return `true` when `program -version` can be invoked from `PATH`.
pub fn is_tool_on_path(program: &str) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/exec/executor.rs"]
mod tests;
