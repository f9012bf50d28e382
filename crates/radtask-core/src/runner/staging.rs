use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::execution::ExecutionResult;
use crate::models::{CoreError, CoreErrorKind, PathKind, StagedInput, TaskId};

/// Copies every bound input to `work_dir/<alias>` and returns the staged paths.
pub fn stage_inputs(
    task: TaskId,
    inputs: &[StagedInput],
    work_dir: &Path,
) -> ExecutionResult<Vec<PathBuf>> {
    fs::create_dir_all(work_dir).map_err(|error| {
        staging_error(
            task,
            format!("failed to create work dir '{}': {error}", work_dir.display()),
        )
    })?;

    let mut staged = Vec::with_capacity(inputs.len());
    for input in inputs {
        let target = work_dir.join(input.alias);
        stage_one(task, input, &target).map_err(|error| error.input(input.name))?;
        tracing::debug!(
            task = %task,
            input = input.name,
            source = %input.source.display(),
            target = %target.display(),
            "staged task input"
        );
        staged.push(target);
    }
    Ok(staged)
}

fn stage_one(task: TaskId, input: &StagedInput, target: &Path) -> ExecutionResult<()> {
    let metadata = fs::metadata(&input.source).map_err(|error| {
        staging_error(
            task,
            format!(
                "cannot read input '{}' at '{}': {error}",
                input.name,
                input.source.display()
            ),
        )
    })?;

    let matches_kind = match input.kind {
        PathKind::File => metadata.is_file(),
        PathKind::Folder => metadata.is_dir(),
    };
    if !matches_kind {
        return Err(staging_error(
            task,
            format!(
                "input '{}' at '{}' is not a {}",
                input.name,
                input.source.display(),
                input.kind.as_str()
            ),
        ));
    }

    if is_same_path(&input.source, target) {
        return Ok(());
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|error| io_error(task, parent, error))?;
    }

    if input.kind == PathKind::Folder && lies_within(target, &input.source) {
        return Err(staging_error(
            task,
            format!(
                "cannot stage folder '{}' at '{}': the target lies inside the folder",
                input.source.display(),
                target.display()
            ),
        ));
    }

    match input.kind {
        PathKind::File => {
            fs::copy(&input.source, target).map_err(|error| io_error(task, target, error))?;
        }
        PathKind::Folder => copy_folder(task, &input.source, target)?,
    }
    Ok(())
}

fn copy_folder(task: TaskId, source: &Path, target: &Path) -> ExecutionResult<()> {
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(|error| {
            staging_error(
                task,
                format!("failed to walk '{}': {error}", source.display()),
            )
        })?;
        let relative = entry.path().strip_prefix(source).map_err(|error| {
            staging_error(
                task,
                format!("unexpected path '{}': {error}", entry.path().display()),
            )
        })?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)
                .map_err(|error| io_error(task, &destination, error))?;
        } else {
            fs::copy(entry.path(), &destination)
                .map_err(|error| io_error(task, &destination, error))?;
        }
    }
    Ok(())
}

fn is_same_path(left: &Path, right: &Path) -> bool {
    match (left.canonicalize(), right.canonicalize()) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

/// Whether `target` (whose parent exists) would be created inside `folder`.
fn lies_within(target: &Path, folder: &Path) -> bool {
    let (Some(parent), Some(name)) = (target.parent(), target.file_name()) else {
        return false;
    };
    match (parent.canonicalize(), folder.canonicalize()) {
        (Ok(parent), Ok(folder)) => parent.join(name).starts_with(folder),
        _ => false,
    }
}

fn io_error(task: TaskId, path: &Path, error: std::io::Error) -> CoreError {
    staging_error(task, format!("failed to stage '{}': {error}", path.display()))
}

fn staging_error(task: TaskId, message: String) -> CoreError {
    CoreError::new(CoreErrorKind::Staging, message).task(task)
}
