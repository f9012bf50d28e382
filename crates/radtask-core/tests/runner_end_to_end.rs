use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use radtask_core::execution::{
    ExecutionResult, StopMode, ToolExecutor, ToolExitStatus, ToolInvocation, ToolOutput,
    ToolProcess, ToolWaitFuture,
};
use radtask_core::models::{CoreError, CoreErrorKind, InputValues, PathKind, TaskId};
use radtask_core::registry::Registry;
use radtask_core::runner::{RunConfig, TaskRunner};

/// Stands in for the toolkit: records the request and writes the given artifacts.
struct ToolkitFakeExecutor {
    produces: Vec<(&'static str, PathKind)>,
    status: ToolExitStatus,
    stderr: &'static str,
    captured: Mutex<Vec<ToolInvocation>>,
}

impl ToolkitFakeExecutor {
    fn producing(produces: Vec<(&'static str, PathKind)>) -> Self {
        Self {
            produces,
            status: ToolExitStatus::Exited(0),
            stderr: "",
            captured: Mutex::new(Vec::new()),
        }
    }

    fn failing(status: ToolExitStatus, stderr: &'static str) -> Self {
        Self {
            produces: Vec::new(),
            status,
            stderr,
            captured: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<ToolInvocation> {
        self.captured
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl ToolExecutor for ToolkitFakeExecutor {
    fn launch(&self, request: ToolInvocation) -> ExecutionResult<Box<dyn ToolProcess>> {
        let work_dir = request
            .command
            .work_dir
            .clone()
            .ok_or_else(|| CoreError::new(CoreErrorKind::Internal, "missing working dir"))?;

        for (path, kind) in &self.produces {
            let target = work_dir.join(path);
            let result = match kind {
                PathKind::Folder => fs::create_dir_all(&target),
                PathKind::File => {
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent).ok();
                    }
                    fs::write(&target, "0.0\n")
                }
            };
            result.map_err(|error| {
                CoreError::new(CoreErrorKind::Internal, format!("fake write failed: {error}"))
            })?;
        }

        self.captured
            .lock()
            .map_err(|_| CoreError::new(CoreErrorKind::Internal, "capture lock poisoned"))?
            .push(request);

        let now = SystemTime::now();
        Ok(Box::new(FinishedProcess {
            output: ToolOutput {
                status: self.status,
                stdout: b"done\n".to_vec(),
                stderr: self.stderr.as_bytes().to_vec(),
                started_at: now,
                finished_at: now,
            },
        }))
    }
}

struct FinishedProcess {
    output: ToolOutput,
}

impl ToolProcess for FinishedProcess {
    fn pid(&self) -> Option<u32> {
        Some(7)
    }

    fn stop(&self, _mode: StopMode) -> ExecutionResult<()> {
        Ok(())
    }

    fn wait(self: Box<Self>) -> ToolWaitFuture {
        let output = self.output;
        Box::pin(async move { Ok(output) })
    }
}

fn scratch_dir(test_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!("radtask-{test_name}-{nanos}"));
    fs::create_dir_all(&dir).expect("scratch dir should be created");
    dir
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("parent should be created");
    }
    fs::write(path, contents).expect("file should be written");
}

#[tokio::test]
async fn sum_row_stages_input_runs_and_collects_output() {
    let scratch = scratch_dir("sum-row");
    let source = scratch.join("inputs/grid.ill");
    write_file(&source, "1 2 3\n4 5 6\n");
    let work_dir = scratch.join("work");

    let registry = Registry::load().expect("registry should load");
    let resolution = registry
        .resolve(
            TaskId::SumRow,
            &InputValues::new().with("input_mtx", source.as_path()).with("divisor", 2),
        )
        .expect("resolution should succeed");

    let executor = Arc::new(ToolkitFakeExecutor::producing(vec![("sum.mtx", PathKind::File)]));
    let runner = TaskRunner::new(
        executor.clone(),
        RunConfig::new().timeout(Duration::from_secs(30)),
    );

    let outcome = runner
        .run(&resolution, &work_dir)
        .await
        .expect("run should succeed");

    assert_eq!(
        fs::read_to_string(work_dir.join("input.mtx")).expect("staged input"),
        "1 2 3\n4 5 6\n"
    );
    assert_eq!(outcome.task, TaskId::SumRow);
    assert_eq!(outcome.outputs.len(), 1);
    assert_eq!(outcome.outputs[0].name, "output_mtx");
    assert_eq!(outcome.outputs[0].path, work_dir.join("sum.mtx"));
    assert_eq!(outcome.stdout, b"done\n".to_vec());

    let requests = executor.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].command.program, PathBuf::from("honeybee-radiance"));
    assert_eq!(
        requests[0].command.args,
        vec![
            "post-process",
            "sum-row",
            "input.mtx",
            "--divisor",
            "2",
            "--output",
            "sum.mtx"
        ]
    );
    assert_eq!(requests[0].command.work_dir, Some(work_dir.clone()));
    assert_eq!(requests[0].timeout, Some(Duration::from_secs(30)));

    fs::remove_dir_all(&scratch).ok();
}

#[tokio::test]
async fn folder_inputs_are_copied_recursively() {
    let scratch = scratch_dir("leed");
    let results = scratch.join("leed_project");
    write_file(&results.join("9AM/results/grids_info.json"), "[]");
    write_file(&results.join("3PM/results/grid.res"), "310\n");
    let work_dir = scratch.join("work");

    let registry = Registry::load().expect("registry should load");
    let resolution = registry
        .resolve(
            TaskId::LeedIlluminanceCredits,
            &InputValues::new().with("folder", results.as_path()),
        )
        .expect("resolution should succeed");

    let executor = Arc::new(ToolkitFakeExecutor::producing(vec![
        ("pass_fail", PathKind::Folder),
        ("credit_summary.json", PathKind::File),
    ]));
    let runner = TaskRunner::new(executor, RunConfig::new());

    let outcome = runner
        .run(&resolution, &work_dir)
        .await
        .expect("run should succeed");

    assert!(work_dir.join("raw_results/9AM/results/grids_info.json").is_file());
    assert_eq!(
        fs::read_to_string(work_dir.join("raw_results/3PM/results/grid.res")).expect("copied"),
        "310\n"
    );
    let kinds: Vec<PathKind> = outcome.outputs.iter().map(|output| output.kind).collect();
    assert_eq!(kinds, vec![PathKind::Folder, PathKind::File]);

    fs::remove_dir_all(&scratch).ok();
}

#[tokio::test]
async fn nonzero_exit_is_an_execution_error() {
    let scratch = scratch_dir("exit-code");
    let source = scratch.join("suns.mod");
    write_file(&source, "solar1\n");

    let registry = Registry::load().expect("registry should load");
    let resolution = registry
        .resolve(
            TaskId::ParseSunUpHours,
            &InputValues::new().with("sun_modifiers", source.as_path()),
        )
        .expect("resolution should succeed");

    let executor = Arc::new(ToolkitFakeExecutor::failing(
        ToolExitStatus::Exited(2),
        "Error: no sun modifiers found\n",
    ));
    let runner = TaskRunner::new(executor, RunConfig::new());

    let error = runner
        .run(&resolution, &scratch.join("work"))
        .await
        .expect_err("run should fail");

    assert_eq!(error.kind, CoreErrorKind::ProcessFailure);
    assert_eq!(error.task, Some(TaskId::ParseSunUpHours));
    assert!(error.message.contains("exited with code 2"));
    assert!(error.message.contains("no sun modifiers found"));

    fs::remove_dir_all(&scratch).ok();
}

#[tokio::test]
async fn signal_termination_is_an_execution_error() {
    let scratch = scratch_dir("signal");
    let source = scratch.join("avg.mtx");
    write_file(&source, "1\n");

    let registry = Registry::load().expect("registry should load");
    let resolution = registry
        .resolve(
            TaskId::AverageRow,
            &InputValues::new().with("input_mtx", source.as_path()),
        )
        .expect("resolution should succeed");

    let executor = Arc::new(ToolkitFakeExecutor::failing(ToolExitStatus::Signaled(Some(9)), ""));
    let runner = TaskRunner::new(executor, RunConfig::new());

    let error = runner
        .run(&resolution, &scratch.join("work"))
        .await
        .expect_err("run should fail");
    assert_eq!(error.kind, CoreErrorKind::ProcessFailure);
    assert_eq!(error.message, "process was killed by signal 9");

    fs::remove_dir_all(&scratch).ok();
}

#[tokio::test]
async fn missing_declared_output_is_reported() {
    let scratch = scratch_dir("missing-output");
    let source = scratch.join("sky.wea");
    write_file(&source, "place Boston\n");

    let registry = Registry::load().expect("registry should load");
    let resolution = registry
        .resolve(
            TaskId::CreateSunMtx,
            &InputValues::new().with("wea", source.as_path()),
        )
        .expect("resolution should succeed");

    let executor = Arc::new(ToolkitFakeExecutor::producing(vec![(
        "sunpath.mtx",
        PathKind::File,
    )]));
    let runner = TaskRunner::new(executor, RunConfig::new());

    let error = runner
        .run(&resolution, &scratch.join("work"))
        .await
        .expect_err("sunpath.mod is never written");

    assert_eq!(error.kind, CoreErrorKind::MissingOutput);
    assert!(error.message.contains("sun_modifiers"));

    fs::remove_dir_all(&scratch).ok();
}

#[tokio::test]
async fn unreadable_input_fails_before_spawning() {
    let scratch = scratch_dir("staging");

    let registry = Registry::load().expect("registry should load");
    let resolution = registry
        .resolve(
            TaskId::AverageRow,
            &InputValues::new().with("input_mtx", scratch.join("missing.mtx")),
        )
        .expect("resolution does not touch the filesystem");

    let executor = Arc::new(ToolkitFakeExecutor::producing(vec![(
        "average.mtx",
        PathKind::File,
    )]));
    let runner = TaskRunner::new(executor.clone(), RunConfig::new());

    let error = runner
        .run(&resolution, &scratch.join("work"))
        .await
        .expect_err("staging should fail");

    assert_eq!(error.kind, CoreErrorKind::Staging);
    assert_eq!(error.input.as_deref(), Some("input_mtx"));
    assert!(executor.requests().is_empty());

    fs::remove_dir_all(&scratch).ok();
}

#[tokio::test]
async fn folder_bound_to_file_slot_fails_staging() {
    let scratch = scratch_dir("kind-mismatch");
    let folder = scratch.join("not-a-file");
    fs::create_dir_all(&folder).expect("folder should be created");

    let registry = Registry::load().expect("registry should load");
    let resolution = registry
        .resolve(
            TaskId::AverageRow,
            &InputValues::new().with("input_mtx", folder.as_path()),
        )
        .expect("resolution should succeed");

    let runner = TaskRunner::new(
        Arc::new(ToolkitFakeExecutor::producing(Vec::new())),
        RunConfig::new(),
    );

    let error = runner
        .run(&resolution, &scratch.join("work"))
        .await
        .expect_err("staging should fail");
    assert_eq!(error.kind, CoreErrorKind::Staging);
    assert!(error.message.contains("is not a file"));

    fs::remove_dir_all(&scratch).ok();
}

#[tokio::test]
async fn relative_work_dir_yields_absolute_output_paths() {
    let scratch = scratch_dir("relative-work");
    let source = scratch.join("grid.ill");
    write_file(&source, "1 2 3\n");
    let relative = PathBuf::from(
        scratch
            .file_name()
            .expect("scratch dir has a name")
            .to_os_string(),
    );
    let expected = std::env::current_dir()
        .expect("cwd should be readable")
        .join(&relative);

    let registry = Registry::load().expect("registry should load");
    let resolution = registry
        .resolve(
            TaskId::SumRow,
            &InputValues::new().with("input_mtx", source.as_path()),
        )
        .expect("resolution should succeed");

    let executor = Arc::new(ToolkitFakeExecutor::producing(vec![("sum.mtx", PathKind::File)]));
    let runner = TaskRunner::new(executor.clone(), RunConfig::new());

    let outcome = runner.run(&resolution, &relative).await;
    fs::remove_dir_all(&expected).ok();
    fs::remove_dir_all(&scratch).ok();
    let outcome = outcome.expect("run should succeed");

    assert_eq!(outcome.work_dir, expected);
    assert!(outcome.outputs[0].path.is_absolute());
    assert_eq!(outcome.outputs[0].path, expected.join("sum.mtx"));
    let requests = executor.requests();
    assert_eq!(requests[0].command.work_dir, Some(expected));
}

#[tokio::test]
async fn folder_input_cannot_be_staged_into_itself() {
    let scratch = scratch_dir("nested-target");
    let project = scratch.join("leed_project");
    write_file(&project.join("9AM/results/grid.res"), "310\n");

    let registry = Registry::load().expect("registry should load");
    let resolution = registry
        .resolve(
            TaskId::LeedIlluminanceCredits,
            &InputValues::new().with("folder", project.as_path()),
        )
        .expect("resolution should succeed");

    let executor = Arc::new(ToolkitFakeExecutor::producing(vec![
        ("pass_fail", PathKind::Folder),
        ("credit_summary.json", PathKind::File),
    ]));
    let runner = TaskRunner::new(executor.clone(), RunConfig::new());

    let error = runner
        .run(&resolution, &project)
        .await
        .expect_err("target inside the input folder should be rejected");

    assert_eq!(error.kind, CoreErrorKind::Staging);
    assert_eq!(error.input.as_deref(), Some("folder"));
    assert!(error.message.contains("lies inside the folder"));
    assert!(!project.join("raw_results").exists());
    assert!(executor.requests().is_empty());

    fs::remove_dir_all(&scratch).ok();
}
