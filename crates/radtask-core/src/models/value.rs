use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq)]
pub enum InputValue {
    Number(f64),
    Integer(i64),
    Text(String),
    Path(PathBuf),
}

impl Display for InputValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => f.write_str(&format_number(*value)),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Path(value) => write!(f, "{}", value.display()),
        }
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for InputValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for InputValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<PathBuf> for InputValue {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Path> for InputValue {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

/// Per-call record of bound input values, keyed by slot name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputValues {
    values: BTreeMap<String, InputValue>,
}

impl InputValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<InputValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.values.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<InputValue>> FromIterator<(K, V)> for InputValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = InputValues::new();
        for (name, value) in iter {
            values.insert(name, value);
        }
        values
    }
}

/// Renders a number the way the command line expects it: integral values
/// without a fractional part, very large magnitudes in exponent form.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        if value.abs() < 1e16 {
            return format!("{}", value as i64);
        }
        return format!("{value:e}");
    }
    format!("{value}")
}
