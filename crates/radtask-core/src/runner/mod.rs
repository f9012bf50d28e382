pub mod config;
pub mod outputs;
pub mod staging;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::execution::{
    ExecutionResult, ToolCommand, ToolExecutor, ToolExitStatus, ToolInvocation, launch_checked,
};
use crate::models::{CoreError, CoreErrorKind, Resolution, TaskId};

pub use config::RunConfig;
pub use outputs::{CollectedOutput, collect_outputs};
pub use staging::stage_inputs;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaskOutcome {
    pub task: TaskId,
    pub work_dir: PathBuf,
    pub outputs: Vec<CollectedOutput>,
    pub stdout: Vec<u8>,
    pub started_at: SystemTime,
    pub finished_at: SystemTime,
}

/// Stages a resolution's inputs, runs its command, and collects its outputs.
pub struct TaskRunner {
    executor: Arc<dyn ToolExecutor>,
    config: RunConfig,
}

impl TaskRunner {
    pub fn new(executor: Arc<dyn ToolExecutor>, config: RunConfig) -> Self {
        Self { executor, config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The invocation [`TaskRunner::run`] would launch for `resolution`.
    pub fn invocation(&self, resolution: &Resolution, work_dir: &Path) -> ToolInvocation {
        let command = ToolCommand::from_resolution(resolution, work_dir);
        self.config.apply(ToolInvocation::new(resolution.task, command))
    }

    pub async fn run(
        &self,
        resolution: &Resolution,
        work_dir: &Path,
    ) -> ExecutionResult<TaskOutcome> {
        let task = resolution.task;
        let work_dir = std::path::absolute(work_dir).map_err(|error| {
            CoreError::new(
                CoreErrorKind::Staging,
                format!("cannot resolve work dir '{}': {error}", work_dir.display()),
            )
            .task(task)
        })?;
        let work_dir = work_dir.as_path();
        tracing::info!(
            task = %task,
            work_dir = %work_dir.display(),
            command = %resolution.command,
            "running task"
        );

        stage_inputs(task, &resolution.staged_inputs, work_dir)?;

        let invocation = self.invocation(resolution, work_dir);
        let process = launch_checked(self.executor.as_ref(), invocation)?;
        let output = process.wait().await.inspect_err(|error| {
            tracing::error!(
                task = %task,
                kind = ?error.kind,
                message = %error.message,
                "task process did not complete"
            );
        })?;

        if !output.status.success() {
            let stderr = output.stderr_text();
            let reason = match output.status {
                ToolExitStatus::Exited(code) => format!("process exited with code {code}"),
                ToolExitStatus::Signaled(Some(signal)) => {
                    format!("process was killed by signal {signal}")
                }
                ToolExitStatus::Signaled(None) => "process was killed by a signal".to_string(),
            };
            tracing::error!(
                task = %task,
                status = ?output.status,
                stderr = %stderr.trim(),
                "task failed"
            );
            let message = match stderr.trim() {
                "" => reason,
                detail => format!("{reason}: {detail}"),
            };
            return Err(CoreError::new(CoreErrorKind::ProcessFailure, message).task(task));
        }

        let outputs = collect_outputs(task, resolution.outputs, work_dir)?;
        tracing::info!(
            task = %task,
            outputs = outputs.len(),
            elapsed_ms = output.elapsed().as_millis() as u64,
            "task completed"
        );

        Ok(TaskOutcome {
            task,
            work_dir: work_dir.to_path_buf(),
            outputs,
            stdout: output.stdout,
            started_at: output.started_at,
            finished_at: output.finished_at,
        })
    }
}
