pub mod error;
pub mod resolution;
pub mod slot;
pub mod task;
pub mod value;

pub use error::{CoreError, CoreErrorKind};
pub use resolution::{Resolution, StagedInput};
pub use slot::{Bound, InputKind, InputSlot, OutputSlot, PathKind, ValueRange};
pub use task::{TaskDescriptor, TaskFamily, TaskId};
pub use value::{InputValue, InputValues, format_number};
