use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use lazy_static::lazy_static;
use radtask_core::models::{CoreError, CoreErrorKind, InputValue, InputValues, TaskId};
use radtask_core::registry::Registry;
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

lazy_static! {
    static ref REGISTRY: Result<Registry, CoreError> = {
        let filter =
            EnvFilter::try_from_env("RADTASK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
        Registry::load()
    };
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    kind: String,
    task: Option<&'static str>,
    input: Option<&'a str>,
    message: &'a str,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: ErrorBody<'a>,
}

fn registry() -> Result<&'static Registry, CoreError> {
    REGISTRY.as_ref().map_err(Clone::clone)
}

fn into_c_string(json: String) -> *mut c_char {
    match CString::new(json) {
        Ok(c) => c.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn error_json(error: &CoreError) -> String {
    let envelope = ErrorEnvelope {
        error: ErrorBody {
            kind: format!("{:?}", error.kind),
            task: error.task.map(TaskId::as_str),
            input: error.input.as_deref(),
            message: &error.message,
        },
    };
    serde_json::to_string(&envelope).unwrap_or_else(|_| String::from(r#"{"error":{}}"#))
}

/// Reads a NUL-terminated UTF-8 argument; `None` for null or invalid UTF-8.
unsafe fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Converts a JSON object of `name -> value` into bound inputs.
fn parse_inputs(task: TaskId, raw: &str) -> Result<InputValues, CoreError> {
    let invalid = |message: String| CoreError::new(CoreErrorKind::InvalidInput, message).task(task);

    let parsed: Value = serde_json::from_str(raw)
        .map_err(|error| invalid(format!("inputs are not valid JSON: {error}")))?;
    let Value::Object(map) = parsed else {
        return Err(invalid("inputs must be a JSON object".to_string()));
    };

    let mut values = InputValues::new();
    for (name, value) in map {
        let bound = match &value {
            Value::Number(number) => match number.as_i64() {
                Some(integer) => InputValue::Integer(integer),
                None => InputValue::Number(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(text) => InputValue::Text(text.clone()),
            other => {
                return Err(invalid(format!(
                    "input '{name}' must be a number or string, got {other}"
                ))
                .input(name));
            }
        };
        values.insert(name, bound);
    }
    Ok(values)
}

fn resolve_json(name: &str, inputs: Option<&str>) -> String {
    let result = registry().and_then(|registry| {
        let task: TaskId = name.parse()?;
        let values = match inputs {
            Some(raw) => parse_inputs(task, raw)?,
            None => InputValues::new(),
        };
        registry.resolve(task, &values)
    });

    match result {
        Ok(resolution) => serde_json::to_string(&resolution).unwrap_or_else(|error| {
            error_json(&CoreError::new(CoreErrorKind::Internal, error.to_string()))
        }),
        Err(error) => error_json(&error),
    }
}

/// List every registered task descriptor as a JSON array.
#[unsafe(no_mangle)]
pub extern "C" fn radtask_list_descriptors() -> *mut c_char {
    let registry = match registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Failed to load task registry: {e}");
            return std::ptr::null_mut();
        }
    };

    let descriptors: Vec<_> = registry.descriptors().collect();
    match serde_json::to_string(&descriptors) {
        Ok(json) => into_c_string(json),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Describe one task as JSON, or return null if the name is unknown.
///
/// # Safety
///
/// `name` must be null or a valid pointer to a NUL-terminated UTF-8 C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn radtask_describe(name: *const c_char) -> *mut c_char {
    let Some(name) = (unsafe { read_str(name) }) else {
        return std::ptr::null_mut();
    };
    let Ok(registry) = registry() else {
        return std::ptr::null_mut();
    };
    let Some(descriptor) = name.parse().ok().and_then(|id| registry.descriptor(id)) else {
        return std::ptr::null_mut();
    };

    match serde_json::to_string(descriptor) {
        Ok(json) => into_c_string(json),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Resolve a task against a JSON object of inputs.
///
/// Returns the resolution as JSON, or `{"error": {...}}` when the task is
/// unknown or an input is rejected. `inputs_json` may be null for no inputs.
///
/// # Safety
///
/// `name` must be a valid pointer to a NUL-terminated UTF-8 C string.
/// `inputs_json` must be null or a valid pointer to a NUL-terminated UTF-8 C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn radtask_resolve(
    name: *const c_char,
    inputs_json: *const c_char,
) -> *mut c_char {
    let Some(name) = (unsafe { read_str(name) }) else {
        return std::ptr::null_mut();
    };
    let inputs = if inputs_json.is_null() {
        None
    } else {
        match unsafe { read_str(inputs_json) } {
            Some(raw) => Some(raw),
            None => return std::ptr::null_mut(),
        }
    };

    into_c_string(resolve_json(name, inputs))
}

/// Free a string previously returned by a `radtask_*` function.
///
/// # Safety
///
/// `s` must be a pointer previously returned by a `radtask_*` function, or null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn radtask_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    unsafe {
        let _ = CString::from_raw(s);
    }
}
