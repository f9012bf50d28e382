//! Launching toolkit commands as child processes.
//!
//! [`ToolExecutor`] is the seam between the runner and the operating system:
//! [`TokioExecutor`] spawns real processes, tests substitute fakes that record
//! the [`ToolInvocation`] they receive.

pub mod tokio_process;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::{Duration, SystemTime};

use crate::models::{CoreError, CoreErrorKind, Resolution, TaskId};

pub use tokio_process::TokioExecutor;

pub type ExecutionResult<T> = Result<T, CoreError>;

pub type ToolWaitFuture = Pin<Box<dyn Future<Output = ExecutionResult<ToolOutput>> + Send>>;

/// Program, argv tail, extra environment and working directory of one command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub work_dir: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            work_dir: None,
        }
    }

    /// The resolved command line of `resolution`, run from `work_dir`.
    pub fn from_resolution(resolution: &Resolution, work_dir: &Path) -> Self {
        Self::new(resolution.program)
            .args(resolution.arguments.iter().skip(1).cloned())
            .work_dir(work_dir)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(work_dir.into());
        self
    }

    fn check(&self, task: TaskId) -> ExecutionResult<()> {
        if self.program.as_os_str().is_empty() {
            return Err(rejected(task, "program must not be empty"));
        }

        if let Some(arg) = self
            .args
            .iter()
            .find(|arg| arg.is_empty() || arg.contains('\0'))
        {
            return Err(rejected(
                task,
                format!("argument {arg:?} is empty or contains a NUL byte"),
            ));
        }

        if let Some(key) = self.env.iter().find_map(|(key, value)| {
            let bad = key.is_empty() || key.contains(['=', '\0']) || value.contains('\0');
            bad.then_some(key)
        }) {
            return Err(rejected(
                task,
                format!("environment variable {key:?} is not a valid name/value pair"),
            ));
        }

        Ok(())
    }
}

/// A command launched on behalf of one task.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToolInvocation {
    pub task: TaskId,
    pub command: ToolCommand,
    pub timeout: Option<Duration>,
}

impl ToolInvocation {
    pub fn new(task: TaskId, command: ToolCommand) -> Self {
        Self {
            task,
            command,
            timeout: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Rejects empty programs, empty or NUL-carrying arguments, malformed
    /// environment entries and zero timeouts before anything is spawned.
    pub fn check(&self) -> ExecutionResult<()> {
        self.command.check(self.task)?;

        if self.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(rejected(self.task, "timeout must be greater than zero"));
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StopMode {
    /// SIGTERM, letting the tool flush partial results.
    Terminate,
    /// SIGKILL.
    Kill,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ToolExitStatus {
    Exited(i32),
    /// Killed by a signal; the number is unavailable on non-unix platforms.
    Signaled(Option<i32>),
}

impl ToolExitStatus {
    pub fn success(self) -> bool {
        self == Self::Exited(0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ToolOutput {
    pub status: ToolExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub started_at: SystemTime,
    pub finished_at: SystemTime,
}

impl ToolOutput {
    pub fn stderr_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    pub fn elapsed(&self) -> Duration {
        self.finished_at
            .duration_since(self.started_at)
            .unwrap_or_default()
    }
}

pub trait ToolProcess: Send + Sync {
    fn pid(&self) -> Option<u32>;

    fn stop(&self, mode: StopMode) -> ExecutionResult<()>;

    fn wait(self: Box<Self>) -> ToolWaitFuture;
}

pub trait ToolExecutor: Send + Sync {
    fn launch(&self, invocation: ToolInvocation) -> ExecutionResult<Box<dyn ToolProcess>>;
}

/// Checks `invocation` and hands it to `executor`.
pub fn launch_checked(
    executor: &dyn ToolExecutor,
    invocation: ToolInvocation,
) -> ExecutionResult<Box<dyn ToolProcess>> {
    invocation.check()?;
    executor.launch(invocation)
}

fn rejected(task: TaskId, message: impl Into<String>) -> CoreError {
    CoreError::new(CoreErrorKind::InvalidInput, message).task(task)
}
