use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::models::{
    CoreError, CoreErrorKind, InputKind, InputSlot, InputValue, InputValues, PathKind,
    Resolution, StagedInput, TaskDescriptor, format_number,
};
use crate::template::CommandTemplate;

pub type ResolveResult<T> = Result<T, CoreError>;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum BoundSlot {
    Scalar(String),
    Path {
        kind: PathKind,
        alias: &'static str,
        source: PathBuf,
    },
    Unbound,
}

/// Binds `values` to `descriptor` and renders its command line.
///
/// Parses the command template on every call; [`crate::registry::Registry`]
/// parses each template once at load time instead.
pub fn resolve(descriptor: &TaskDescriptor, values: &InputValues) -> ResolveResult<Resolution> {
    let template =
        CommandTemplate::parse(descriptor.command).map_err(|error| error.task(descriptor.id))?;
    resolve_with_template(descriptor, &template, values)
}

pub(crate) fn resolve_with_template(
    descriptor: &TaskDescriptor,
    template: &CommandTemplate<'_>,
    values: &InputValues,
) -> ResolveResult<Resolution> {
    if let Some(unknown) = values.names().find(|name| descriptor.input(name).is_none()) {
        return Err(CoreError::new(
            CoreErrorKind::InvalidInput,
            format!("task {} has no input named '{unknown}'", descriptor.id),
        )
        .task(descriptor.id)
        .input(unknown));
    }

    let mut rendered: BTreeMap<&'static str, String> = BTreeMap::new();
    let mut staged_inputs = Vec::new();

    for slot in descriptor.inputs {
        let bound = bind_slot(slot, values.get(slot.name))
            .map_err(|error| error.task(descriptor.id).input(slot.name))?;

        match bound {
            BoundSlot::Scalar(text) => {
                rendered.insert(slot.name, text);
            }
            BoundSlot::Path {
                kind,
                alias,
                source,
            } => {
                staged_inputs.push(StagedInput {
                    name: slot.name,
                    kind,
                    source,
                    alias,
                });
                rendered.insert(slot.name, alias.to_string());
            }
            BoundSlot::Unbound => {
                let placeholder = slot.kind.alias().unwrap_or_default();
                rendered.insert(slot.name, placeholder.to_string());
            }
        }
    }

    let command = template
        .render(|name| rendered.get(name).cloned())
        .map_err(|error| error.task(descriptor.id))?;
    let arguments: Vec<String> = command.split_whitespace().map(str::to_string).collect();

    if arguments.first().map(String::as_str) != Some(descriptor.program) {
        return Err(CoreError::new(
            CoreErrorKind::Template,
            format!(
                "resolved command for {} does not start with '{}'",
                descriptor.id, descriptor.program
            ),
        )
        .task(descriptor.id));
    }

    tracing::debug!(
        task = %descriptor.id,
        command = %command,
        staged = staged_inputs.len(),
        "resolved task command"
    );

    Ok(Resolution {
        task: descriptor.id,
        program: descriptor.program,
        command,
        arguments,
        staged_inputs,
        outputs: descriptor.outputs,
    })
}

pub(crate) fn bind_slot(slot: &InputSlot, bound: Option<&InputValue>) -> ResolveResult<BoundSlot> {
    match &slot.kind {
        InputKind::File { alias, extensions } => {
            let Some(value) = bound else {
                return unbound(slot);
            };
            let source = path_value(slot, value)?;
            if !extensions.is_empty() && !has_extension(&source, extensions) {
                return Err(invalid_input(format!(
                    "input '{}' must have one of the extensions [{}], got '{}'",
                    slot.name,
                    extensions.join(", "),
                    source.display()
                )));
            }
            Ok(BoundSlot::Path {
                kind: PathKind::File,
                alias: *alias,
                source,
            })
        }
        InputKind::Folder { alias } => {
            let Some(value) = bound else {
                return unbound(slot);
            };
            Ok(BoundSlot::Path {
                kind: PathKind::Folder,
                alias: *alias,
                source: path_value(slot, value)?,
            })
        }
        InputKind::Number { default, range } => {
            let number = match bound {
                Some(InputValue::Number(number)) => *number,
                Some(InputValue::Integer(integer)) => *integer as f64,
                Some(InputValue::Text(text)) => text.trim().parse::<f64>().map_err(|_| {
                    invalid_input(format!("input '{}' expects a number, got '{text}'", slot.name))
                })?,
                Some(InputValue::Path(path)) => {
                    return Err(invalid_input(format!(
                        "input '{}' expects a number, got path '{}'",
                        slot.name,
                        path.display()
                    )));
                }
                None => match default {
                    Some(number) => *number,
                    None => return unbound(slot),
                },
            };

            if !number.is_finite() {
                return Err(invalid_input(format!(
                    "input '{}' must be a finite number",
                    slot.name
                )));
            }
            if !range.contains(number) {
                return Err(invalid_input(format!(
                    "input '{}' = {} is outside {}",
                    slot.name,
                    format_number(number),
                    range
                )));
            }
            Ok(BoundSlot::Scalar(format_number(number)))
        }
        InputKind::Integer { default, range } => {
            let integer = match bound {
                Some(InputValue::Integer(integer)) => *integer,
                Some(InputValue::Number(number)) => integral(*number).ok_or_else(|| {
                    invalid_input(format!(
                        "input '{}' expects an integer, got {number}",
                        slot.name
                    ))
                })?,
                Some(InputValue::Text(text)) => text.trim().parse::<i64>().map_err(|_| {
                    invalid_input(format!(
                        "input '{}' expects an integer, got '{text}'",
                        slot.name
                    ))
                })?,
                Some(InputValue::Path(path)) => {
                    return Err(invalid_input(format!(
                        "input '{}' expects an integer, got path '{}'",
                        slot.name,
                        path.display()
                    )));
                }
                None => match default {
                    Some(integer) => *integer,
                    None => return unbound(slot),
                },
            };

            if !range.contains(integer) {
                return Err(invalid_input(format!(
                    "input '{}' = {integer} is outside {range}",
                    slot.name
                )));
            }
            Ok(BoundSlot::Scalar(integer.to_string()))
        }
        InputKind::Choice { default, choices } => {
            let choice = match bound {
                Some(InputValue::Path(path)) => {
                    return Err(invalid_input(format!(
                        "input '{}' expects one of [{}], got path '{}'",
                        slot.name,
                        choices.join(", "),
                        path.display()
                    )));
                }
                Some(value) => value.to_string(),
                None => match default {
                    Some(choice) => choice.to_string(),
                    None => return unbound(slot),
                },
            };

            if !choices.contains(&choice.as_str()) {
                return Err(invalid_input(format!(
                    "input '{}' must be one of [{}], got '{choice}'",
                    slot.name,
                    choices.join(", ")
                )));
            }
            Ok(BoundSlot::Scalar(choice))
        }
        InputKind::Text { default } => match bound {
            Some(value) => Ok(BoundSlot::Scalar(value.to_string())),
            None => match default {
                Some(text) => Ok(BoundSlot::Scalar(text.to_string())),
                None => unbound(slot),
            },
        },
    }
}

fn path_value(slot: &InputSlot, value: &InputValue) -> ResolveResult<PathBuf> {
    let path = match value {
        InputValue::Path(path) => path.clone(),
        InputValue::Text(text) => PathBuf::from(text),
        InputValue::Number(_) | InputValue::Integer(_) => {
            return Err(invalid_input(format!(
                "input '{}' expects a {} path, got {value}",
                slot.name,
                slot.kind.type_name()
            )));
        }
    };

    if path.as_os_str().is_empty() {
        return Err(invalid_input(format!(
            "input '{}' path must not be empty",
            slot.name
        )));
    }
    Ok(path)
}

fn has_extension(path: &std::path::Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(extension))
        })
}

fn integral(number: f64) -> Option<i64> {
    if number.is_finite() && number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Some(number as i64)
    } else {
        None
    }
}

fn unbound(slot: &InputSlot) -> ResolveResult<BoundSlot> {
    if slot.optional {
        Ok(BoundSlot::Unbound)
    } else {
        Err(missing_input(slot))
    }
}

fn missing_input(slot: &InputSlot) -> CoreError {
    invalid_input(format!("missing required input '{}'", slot.name))
}

fn invalid_input(message: String) -> CoreError {
    CoreError::new(CoreErrorKind::InvalidInput, message)
}
