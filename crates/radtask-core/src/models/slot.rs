use std::fmt::{Display, Formatter};

use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    File,
    Folder,
}

impl PathKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Folder => "folder",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Bound<T> {
    Unbounded,
    Inclusive(T),
    Exclusive(T),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct ValueRange<T> {
    pub minimum: Bound<T>,
    pub maximum: Bound<T>,
}

impl<T> ValueRange<T> {
    pub const UNBOUNDED: Self = Self {
        minimum: Bound::Unbounded,
        maximum: Bound::Unbounded,
    };

    pub const fn inclusive(minimum: T, maximum: T) -> Self {
        Self {
            minimum: Bound::Inclusive(minimum),
            maximum: Bound::Inclusive(maximum),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(
            (&self.minimum, &self.maximum),
            (Bound::Unbounded, Bound::Unbounded)
        )
    }
}

impl<T: PartialOrd + Copy> ValueRange<T> {
    pub fn contains(&self, value: T) -> bool {
        let above_minimum = match self.minimum {
            Bound::Unbounded => true,
            Bound::Inclusive(minimum) => value >= minimum,
            Bound::Exclusive(minimum) => value > minimum,
        };
        let below_maximum = match self.maximum {
            Bound::Unbounded => true,
            Bound::Inclusive(maximum) => value <= maximum,
            Bound::Exclusive(maximum) => value < maximum,
        };
        above_minimum && below_maximum
    }
}

impl<T: Display> Display for ValueRange<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let lower = match &self.minimum {
            Bound::Unbounded => "(-inf".to_string(),
            Bound::Inclusive(value) => format!("[{value}"),
            Bound::Exclusive(value) => format!("({value}"),
        };
        let upper = match &self.maximum {
            Bound::Unbounded => "+inf)".to_string(),
            Bound::Inclusive(value) => format!("{value}]"),
            Bound::Exclusive(value) => format!("{value})"),
        };
        write!(f, "{lower}, {upper}")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputKind {
    File {
        alias: &'static str,
        /// Accepted source extensions without the dot; empty accepts any.
        extensions: &'static [&'static str],
    },
    Folder {
        alias: &'static str,
    },
    Number {
        default: Option<f64>,
        range: ValueRange<f64>,
    },
    Integer {
        default: Option<i64>,
        range: ValueRange<i64>,
    },
    Choice {
        default: Option<&'static str>,
        choices: &'static [&'static str],
    },
    Text {
        default: Option<&'static str>,
    },
}

impl InputKind {
    pub fn path_kind(&self) -> Option<PathKind> {
        match self {
            Self::File { .. } => Some(PathKind::File),
            Self::Folder { .. } => Some(PathKind::Folder),
            _ => None,
        }
    }

    pub fn alias(&self) -> Option<&'static str> {
        match self {
            Self::File { alias, .. } | Self::Folder { alias } => Some(*alias),
            _ => None,
        }
    }

    pub fn has_default(&self) -> bool {
        match self {
            Self::File { .. } | Self::Folder { .. } => false,
            Self::Number { default, .. } => default.is_some(),
            Self::Integer { default, .. } => default.is_some(),
            Self::Choice { default, .. } | Self::Text { default } => default.is_some(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::File { .. } => "file",
            Self::Folder { .. } => "folder",
            Self::Number { .. } => "number",
            Self::Integer { .. } => "integer",
            Self::Choice { .. } => "choice",
            Self::Text { .. } => "text",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InputSlot {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: InputKind,
    /// Optional slots without a default may stay unbound.
    pub optional: bool,
}

impl InputSlot {
    pub fn is_required(&self) -> bool {
        !self.optional && !self.kind.has_default()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct OutputSlot {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: PathKind,
    pub path: &'static str,
}
