use std::process::{ExitStatus, Stdio};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use crate::execution::{
    ExecutionResult, StopMode, ToolExecutor, ToolExitStatus, ToolInvocation, ToolOutput,
    ToolProcess, ToolWaitFuture,
};
use crate::models::{CoreError, CoreErrorKind, TaskId};

/// How long to keep draining pipes after the child has been reaped.
const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(250);
/// How long to wait for a timed-out child to die after SIGKILL.
const KILL_REAP_GRACE: Duration = Duration::from_secs(1);

/// Spawns toolkit commands with tokio, each in its own process group so that
/// stopping a task also stops the helpers the toolkit forks.
pub struct TokioExecutor;

impl ToolExecutor for TokioExecutor {
    fn launch(&self, invocation: ToolInvocation) -> ExecutionResult<Box<dyn ToolProcess>> {
        let ToolInvocation {
            task,
            command,
            timeout,
        } = invocation;

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(&command.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &command.work_dir {
            cmd.current_dir(dir);
        }
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|error| {
            launch_failure(
                task,
                format!("could not start '{}': {error}", command.program.display()),
            )
        })?;

        let pid = child.id();
        tracing::debug!(
            task = %task,
            pid = ?pid,
            program = %command.program.display(),
            "launched tool"
        );

        Ok(Box::new(TokioToolProcess {
            task,
            pid,
            timeout,
            started_at: SystemTime::now(),
            child: Mutex::new(Some(child)),
        }))
    }
}

struct TokioToolProcess {
    task: TaskId,
    pid: Option<u32>,
    timeout: Option<Duration>,
    started_at: SystemTime,
    child: Mutex<Option<Child>>,
}

impl ToolProcess for TokioToolProcess {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    #[cfg(unix)]
    fn stop(&self, mode: StopMode) -> ExecutionResult<()> {
        let signal = match mode {
            StopMode::Terminate => libc::SIGTERM,
            StopMode::Kill => libc::SIGKILL,
        };
        signal_group(self.pid, signal).map_err(|error| {
            launch_failure(
                self.task,
                format!("could not signal process group {:?}: {error}", self.pid),
            )
        })
    }

    #[cfg(not(unix))]
    fn stop(&self, _mode: StopMode) -> ExecutionResult<()> {
        let mut guard = self
            .child
            .lock()
            .map_err(|_| launch_failure(self.task, "child handle lock poisoned".to_string()))?;
        match guard.as_mut() {
            Some(child) => child.start_kill().map_err(|error| {
                launch_failure(self.task, format!("could not kill tool: {error}"))
            }),
            None => Ok(()),
        }
    }

    fn wait(self: Box<Self>) -> ToolWaitFuture {
        let Self {
            task,
            pid,
            timeout,
            started_at,
            child,
        } = *self;
        let child = child.into_inner().ok().flatten();

        Box::pin(async move {
            let mut child = child
                .ok_or_else(|| launch_failure(task, "tool process already awaited".to_string()))?;
            let stdout = drain(child.stdout.take());
            let stderr = drain(child.stderr.take());

            // Reap first; grandchildren can hold the pipes open past the child's exit.
            let reaped = match timeout {
                Some(limit) => tokio::time::timeout(limit, child.wait()).await.ok(),
                None => Some(child.wait().await),
            };
            let Some(reaped) = reaped else {
                stdout.abort();
                stderr.abort();
                return Err(kill_after_timeout(task, pid, &mut child, timeout).await);
            };
            let status = reaped.map_err(|error| {
                launch_failure(task, format!("could not wait for tool: {error}"))
            })?;

            Ok(ToolOutput {
                status: exit_status(status),
                stdout: collect(stdout).await,
                stderr: collect(stderr).await,
                started_at,
                finished_at: SystemTime::now(),
            })
        })
    }
}

fn drain<R>(pipe: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer).await;
        }
        buffer
    })
}

async fn collect(reader: JoinHandle<Vec<u8>>) -> Vec<u8> {
    match tokio::time::timeout(PIPE_DRAIN_GRACE, reader).await {
        Ok(Ok(buffer)) => buffer,
        _ => Vec::new(),
    }
}

async fn kill_after_timeout(
    task: TaskId,
    pid: Option<u32>,
    child: &mut Child,
    timeout: Option<Duration>,
) -> CoreError {
    #[cfg(unix)]
    let _ = signal_group(pid, libc::SIGKILL);
    #[cfg(not(unix))]
    let _ = pid;
    let _ = child.start_kill();
    let _ = tokio::time::timeout(KILL_REAP_GRACE, child.wait()).await;

    let limit = timeout.unwrap_or_default();
    tracing::warn!(task = %task, timeout_ms = limit.as_millis() as u64, "tool timed out");
    CoreError::new(
        CoreErrorKind::Timeout,
        format!("tool did not finish within {}ms", limit.as_millis()),
    )
    .task(task)
}

#[cfg(unix)]
fn exit_status(status: ExitStatus) -> ToolExitStatus {
    use std::os::unix::process::ExitStatusExt;

    match status.code() {
        Some(code) => ToolExitStatus::Exited(code),
        None => ToolExitStatus::Signaled(status.signal()),
    }
}

#[cfg(not(unix))]
fn exit_status(status: ExitStatus) -> ToolExitStatus {
    match status.code() {
        Some(code) => ToolExitStatus::Exited(code),
        None => ToolExitStatus::Signaled(None),
    }
}

/// Signals the process group led by `pid`; a group that is already gone is not an error.
#[cfg(unix)]
fn signal_group(pid: Option<u32>, signal: libc::c_int) -> std::io::Result<()> {
    let Some(pid) = pid else {
        return Ok(());
    };
    let result = unsafe { libc::kill(-(pid as libc::pid_t), signal) };
    if result == 0 {
        return Ok(());
    }
    let error = std::io::Error::last_os_error();
    if error.raw_os_error() == Some(libc::ESRCH) {
        Ok(())
    } else {
        Err(error)
    }
}

fn launch_failure(task: TaskId, message: String) -> CoreError {
    CoreError::new(CoreErrorKind::ProcessFailure, message).task(task)
}
