use std::path::PathBuf;

use serde::Serialize;

use crate::models::{OutputSlot, PathKind, TaskId};

/// A bound file or folder input and the alias it must be staged at.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct StagedInput {
    pub name: &'static str,
    pub kind: PathKind,
    pub source: PathBuf,
    pub alias: &'static str,
}

/// Result of binding input values to a descriptor.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Resolution {
    pub task: TaskId,
    pub program: &'static str,
    pub command: String,
    /// `command` split on whitespace; the first entry is `program`.
    pub arguments: Vec<String>,
    pub staged_inputs: Vec<StagedInput>,
    pub outputs: &'static [OutputSlot],
}

impl Resolution {
    pub fn output_paths(&self) -> Vec<&'static str> {
        self.outputs.iter().map(|slot| slot.path).collect()
    }
}
