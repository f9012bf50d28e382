use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use radtask_core::execution::{
    ExecutionResult, StopMode, ToolCommand, ToolExecutor, ToolExitStatus, ToolInvocation,
    ToolOutput, ToolProcess, ToolWaitFuture, launch_checked,
};
use radtask_core::models::{CoreError, CoreErrorKind, InputValues, TaskId};
use radtask_core::registry::Registry;

#[derive(Clone)]
struct RecordingExecutor {
    launched: Arc<Mutex<Option<ToolInvocation>>>,
    output: ToolOutput,
    stops: Arc<Mutex<Vec<StopMode>>>,
}

impl RecordingExecutor {
    fn new(output: ToolOutput) -> Self {
        Self {
            launched: Arc::new(Mutex::new(None)),
            output,
            stops: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn launched(&self) -> Option<ToolInvocation> {
        self.launched.lock().ok()?.clone()
    }

    fn stops(&self) -> Vec<StopMode> {
        self.stops
            .lock()
            .map(|stops| stops.clone())
            .unwrap_or_default()
    }
}

struct RecordedProcess {
    output: ToolOutput,
    stops: Arc<Mutex<Vec<StopMode>>>,
}

impl ToolProcess for RecordedProcess {
    fn pid(&self) -> Option<u32> {
        Some(4242)
    }

    fn stop(&self, mode: StopMode) -> ExecutionResult<()> {
        self.stops
            .lock()
            .map_err(|_| CoreError::new(CoreErrorKind::Internal, "stop lock poisoned"))?
            .push(mode);
        Ok(())
    }

    fn wait(self: Box<Self>) -> ToolWaitFuture {
        let output = self.output;
        Box::pin(async move { Ok(output) })
    }
}

impl ToolExecutor for RecordingExecutor {
    fn launch(&self, invocation: ToolInvocation) -> ExecutionResult<Box<dyn ToolProcess>> {
        *self
            .launched
            .lock()
            .map_err(|_| CoreError::new(CoreErrorKind::Internal, "launch lock poisoned"))? =
            Some(invocation);

        Ok(Box::new(RecordedProcess {
            output: self.output.clone(),
            stops: self.stops.clone(),
        }))
    }
}

fn finished(status: ToolExitStatus) -> ToolOutput {
    let now = SystemTime::now();
    ToolOutput {
        status,
        stdout: b"ok".to_vec(),
        stderr: Vec::new(),
        started_at: now,
        finished_at: now,
    }
}

#[test]
fn check_rejects_empty_program() {
    let invocation = ToolInvocation::new(TaskId::SumRow, ToolCommand::new(""));

    let error = invocation.check().expect_err("expected check failure");
    assert_eq!(error.kind, CoreErrorKind::InvalidInput);
    assert_eq!(error.task, Some(TaskId::SumRow));
}

#[test]
fn check_rejects_empty_arguments() {
    let invocation = ToolInvocation::new(
        TaskId::AverageRow,
        ToolCommand::new("honeybee-radiance").args(["post-process", ""]),
    );

    let error = invocation.check().expect_err("expected check failure");
    assert_eq!(error.kind, CoreErrorKind::InvalidInput);
}

#[test]
fn check_rejects_malformed_environment_names() {
    let invocation = ToolInvocation::new(
        TaskId::Count,
        ToolCommand::new("honeybee-radiance").env("RAY=PATH", "/opt/radiance/lib"),
    );

    let error = invocation.check().expect_err("expected check failure");
    assert_eq!(error.kind, CoreErrorKind::InvalidInput);
    assert!(error.message.contains("RAY=PATH"));
}

#[test]
fn check_rejects_zero_timeout() {
    let invocation = ToolInvocation::new(
        TaskId::ParseSunUpHours,
        ToolCommand::new("honeybee-radiance").args(["sunpath", "parse-hours", "suns.mod"]),
    )
    .timeout(Duration::ZERO);

    let error = invocation.check().expect_err("expected timeout failure");
    assert_eq!(error.kind, CoreErrorKind::InvalidInput);
    assert_eq!(error.task, Some(TaskId::ParseSunUpHours));
}

#[test]
fn command_from_resolution_drops_the_program_from_argv() {
    let registry = Registry::load().expect("registry should load");
    let resolution = registry
        .resolve(
            TaskId::CreateSunMatrix,
            &InputValues::new().with("wea", "/data/Boston.wea"),
        )
        .expect("resolution should succeed");

    let command = ToolCommand::from_resolution(&resolution, Path::new("/tmp/sun"));

    assert_eq!(command.program, PathBuf::from("gendaymtx"));
    assert_eq!(command.args, resolution.arguments[1..].to_vec());
    assert_eq!(command.work_dir, Some(PathBuf::from("/tmp/sun")));
    assert!(command.env.is_empty());
}

#[test]
fn only_exit_code_zero_is_success() {
    assert!(ToolExitStatus::Exited(0).success());
    assert!(!ToolExitStatus::Exited(1).success());
    assert!(!ToolExitStatus::Signaled(Some(9)).success());
    assert!(!ToolExitStatus::Signaled(None).success());
}

#[tokio::test]
async fn checked_launch_passes_structured_command_and_supports_stop() {
    let output = finished(ToolExitStatus::Exited(0));
    let executor = RecordingExecutor::new(output.clone());

    let invocation = ToolInvocation::new(
        TaskId::CreateSunMatrix,
        ToolCommand::new("gendaymtx")
            .args(["-n", "-D", "sunpath.mtx", "-M", "suns.mod", "-O0"])
            .env("RAYPATH", "/usr/local/lib/ray")
            .work_dir("/tmp"),
    )
    .timeout(Duration::from_secs(10));

    let process = launch_checked(&executor, invocation).expect("checked launch should succeed");
    assert_eq!(process.pid(), Some(4242));

    process.stop(StopMode::Terminate).expect("stop should succeed");

    let result = process.wait().await.expect("wait should succeed");
    assert_eq!(result, output);

    let launched = executor.launched().expect("executor should record the invocation");
    assert_eq!(launched.command.program, PathBuf::from("gendaymtx"));
    assert_eq!(
        launched.command.args,
        vec!["-n", "-D", "sunpath.mtx", "-M", "suns.mod", "-O0"]
    );
    assert_eq!(
        launched.command.env.get("RAYPATH").map(String::as_str),
        Some("/usr/local/lib/ray")
    );
    assert_eq!(launched.command.work_dir, Some(PathBuf::from("/tmp")));
    assert_eq!(launched.timeout, Some(Duration::from_secs(10)));
    assert_eq!(executor.stops(), vec![StopMode::Terminate]);
}

#[test]
fn rejected_invocations_never_reach_the_executor() {
    let executor = RecordingExecutor::new(finished(ToolExitStatus::Exited(0)));
    let invocation = ToolInvocation::new(TaskId::SumRow, ToolCommand::new(""));

    assert!(launch_checked(&executor, invocation).is_err());
    assert!(executor.launched().is_none());
}
