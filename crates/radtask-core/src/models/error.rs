use thiserror::Error;

use crate::models::TaskId;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CoreErrorKind {
    UnknownTask,
    /// A bound input is missing or violates its declared constraint.
    InvalidInput,
    /// A descriptor is malformed (bad placeholder, duplicate slot, ...).
    Template,
    /// The invoked command exited non-zero or was killed by a signal.
    ProcessFailure,
    Timeout,
    Staging,
    MissingOutput,
    Internal,
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{kind:?}: {message}")]
pub struct CoreError {
    pub task: Option<TaskId>,
    pub input: Option<String>,
    pub kind: CoreErrorKind,
    pub message: String,
}

impl CoreError {
    pub fn new(kind: CoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            task: None,
            input: None,
            kind,
            message: message.into(),
        }
    }

    pub fn task(mut self, task: TaskId) -> Self {
        self.task = Some(task);
        self
    }

    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }

    pub fn is_validation(&self) -> bool {
        self.kind == CoreErrorKind::InvalidInput
    }
}
