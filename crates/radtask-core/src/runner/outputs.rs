use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::execution::ExecutionResult;
use crate::models::{CoreError, CoreErrorKind, OutputSlot, PathKind, TaskId};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CollectedOutput {
    pub name: &'static str,
    pub kind: PathKind,
    pub path: PathBuf,
}

/// Resolves each declared output against `work_dir`; every one must exist with its declared kind.
pub fn collect_outputs(
    task: TaskId,
    outputs: &[OutputSlot],
    work_dir: &Path,
) -> ExecutionResult<Vec<CollectedOutput>> {
    outputs
        .iter()
        .map(|slot| {
            let path = work_dir.join(slot.path);
            let present = match slot.kind {
                PathKind::File => path.is_file(),
                PathKind::Folder => path.is_dir(),
            };
            if !present {
                return Err(CoreError::new(
                    CoreErrorKind::MissingOutput,
                    format!(
                        "expected {} output '{}' at '{}'",
                        slot.kind.as_str(),
                        slot.name,
                        path.display()
                    ),
                )
                .task(task));
            }
            Ok(CollectedOutput {
                name: slot.name,
                kind: slot.kind,
                path,
            })
        })
        .collect()
}
