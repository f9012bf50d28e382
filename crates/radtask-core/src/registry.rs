use std::collections::HashSet;
use std::path::Path;

use crate::catalogue::{post_process, sun};
use crate::models::{
    CoreError, CoreErrorKind, InputKind, InputValues, Resolution, TaskDescriptor, TaskFamily,
    TaskId,
};
use crate::resolve::{ResolveResult, bind_slot, resolve_with_template};
use crate::template::CommandTemplate;

static ALL_TASKS: [TaskDescriptor; 12] = [
    post_process::CONVERT_TO_BINARY,
    post_process::COUNT,
    post_process::SUM_ROW,
    post_process::AVERAGE_ROW,
    post_process::CUMULATIVE_RADIATION,
    post_process::ANNUAL_IRRADIANCE_METRICS,
    post_process::ANNUAL_DAYLIGHT_METRICS,
    post_process::LEED_ILLUMINANCE_CREDITS,
    post_process::SOLAR_TRACKING_SYNTHESIS,
    sun::CREATE_SUN_MATRIX,
    sun::CREATE_SUN_MTX,
    sun::PARSE_SUN_UP_HOURS,
];

pub fn tasks() -> &'static [TaskDescriptor] {
    &ALL_TASKS
}

pub fn task(id: TaskId) -> Option<&'static TaskDescriptor> {
    ALL_TASKS.iter().find(|descriptor| descriptor.id == id)
}

pub fn tasks_in(family: TaskFamily) -> impl Iterator<Item = &'static TaskDescriptor> {
    ALL_TASKS
        .iter()
        .filter(move |descriptor| descriptor.family == family)
}

struct RegisteredTask {
    descriptor: &'static TaskDescriptor,
    template: CommandTemplate<'static>,
}

/// Validated catalogue of descriptors with their command templates parsed once.
pub struct Registry {
    entries: Vec<RegisteredTask>,
}

impl Registry {
    /// Loads the built-in catalogue.
    pub fn load() -> ResolveResult<Self> {
        Self::from_descriptors(tasks())
    }

    /// Fails with [`CoreErrorKind::Template`] on the first malformed descriptor.
    pub fn from_descriptors<I>(descriptors: I) -> ResolveResult<Self>
    where
        I: IntoIterator<Item = &'static TaskDescriptor>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for descriptor in descriptors {
            if !seen.insert(descriptor.id) {
                return Err(malformed(descriptor, "is registered more than once".to_string()));
            }
            let template = validate_descriptor(descriptor)?;
            entries.push(RegisteredTask {
                descriptor,
                template,
            });
        }

        tracing::debug!(tasks = entries.len(), "task registry loaded");
        Ok(Self { entries })
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &'static TaskDescriptor> + '_ {
        self.entries.iter().map(|entry| entry.descriptor)
    }

    pub fn descriptor(&self, id: TaskId) -> Option<&'static TaskDescriptor> {
        self.entry(id).map(|entry| entry.descriptor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resolve(&self, id: TaskId, values: &InputValues) -> ResolveResult<Resolution> {
        let entry = self.entry(id).ok_or_else(|| {
            CoreError::new(
                CoreErrorKind::UnknownTask,
                format!("task {id} is not registered"),
            )
            .task(id)
        })?;
        resolve_with_template(entry.descriptor, &entry.template, values)
    }

    /// Same as [`Registry::resolve`], looking the task up by name or CLI key.
    pub fn resolve_named(&self, name: &str, values: &InputValues) -> ResolveResult<Resolution> {
        let id: TaskId = name.parse()?;
        self.resolve(id, values)
    }

    /// JSON array of every registered descriptor, in registration order.
    pub fn schema(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self.descriptors().collect::<Vec<_>>())
    }

    fn entry(&self, id: TaskId) -> Option<&RegisteredTask> {
        self.entries.iter().find(|entry| entry.descriptor.id == id)
    }
}

fn validate_descriptor(
    descriptor: &'static TaskDescriptor,
) -> ResolveResult<CommandTemplate<'static>> {
    let template =
        CommandTemplate::parse(descriptor.command).map_err(|error| error.task(descriptor.id))?;

    if descriptor.command.split_whitespace().next() != Some(descriptor.program) {
        return Err(malformed(
            descriptor,
            format!("command template must start with '{}'", descriptor.program),
        ));
    }

    let mut input_names = HashSet::new();
    for slot in descriptor.inputs {
        if !input_names.insert(slot.name) {
            return Err(malformed(descriptor, format!("declares input '{}' twice", slot.name)));
        }

        if let Some(alias) = slot.kind.alias()
            && !is_relative_path(alias)
        {
            return Err(malformed(
                descriptor,
                format!("input '{}' alias '{alias}' must be a relative path", slot.name),
            ));
        }

        if let InputKind::Choice { choices, .. } = &slot.kind
            && choices.is_empty()
        {
            return Err(malformed(
                descriptor,
                format!("choice input '{}' declares no choices", slot.name),
            ));
        }

        if slot.kind.has_default()
            && let Err(error) = bind_slot(slot, None)
        {
            return Err(malformed(
                descriptor,
                format!("default of input '{}' is invalid: {}", slot.name, error.message),
            ));
        }
    }

    if let Some(unknown) = template
        .placeholders()
        .find(|name| !input_names.contains(name))
    {
        return Err(malformed(
            descriptor,
            format!("references placeholder '{unknown}' with no corresponding input slot"),
        )
        .input(unknown));
    }

    let mut output_names = HashSet::new();
    let mut output_paths = HashSet::new();
    for slot in descriptor.outputs {
        if !output_names.insert(slot.name) {
            return Err(malformed(descriptor, format!("declares output '{}' twice", slot.name)));
        }
        if !output_paths.insert(slot.path) {
            return Err(malformed(
                descriptor,
                format!("output '{}' reuses path '{}'", slot.name, slot.path),
            ));
        }
        if !is_relative_path(slot.path) {
            return Err(malformed(
                descriptor,
                format!("output '{}' path '{}' must be a relative path", slot.name, slot.path),
            ));
        }
    }

    Ok(template)
}

fn is_relative_path(path: &str) -> bool {
    !path.is_empty() && Path::new(path).is_relative()
}

fn malformed(descriptor: &TaskDescriptor, message: String) -> CoreError {
    CoreError::new(
        CoreErrorKind::Template,
        format!("task {} {message}", descriptor.id),
    )
    .task(descriptor.id)
}
