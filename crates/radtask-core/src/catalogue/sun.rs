use crate::models::{
    InputKind, InputSlot, OutputSlot, PathKind, TaskDescriptor, TaskFamily, TaskId, ValueRange,
};

pub(crate) const NORTH: InputSlot = InputSlot {
    name: "north",
    description: "Angle of the north direction in degrees.",
    kind: InputKind::Integer {
        default: Some(0),
        range: ValueRange::inclusive(0, 360),
    },
    optional: false,
};

const SKY_WEA: InputSlot = InputSlot {
    name: "wea",
    description: "Path to a wea file.",
    kind: InputKind::File {
        alias: "sky.wea",
        extensions: &["wea"],
    },
    optional: false,
};

const SUNPATH_MTX: OutputSlot = OutputSlot {
    name: "sunpath",
    description: "Output sunpath matrix.",
    kind: PathKind::File,
    path: "sunpath.mtx",
};

pub const CREATE_SUN_MATRIX: TaskDescriptor = TaskDescriptor {
    id: TaskId::CreateSunMatrix,
    description: "Generate a Radiance sun matrix (sun-path) with gendaymtx.",
    family: TaskFamily::SunPath,
    program: "gendaymtx",
    inputs: &[
        NORTH,
        SKY_WEA,
        InputSlot {
            name: "output_type",
            description: "Output type. 0 is visible and 1 is solar.",
            kind: InputKind::Integer {
                default: Some(0),
                range: ValueRange::inclusive(0, 1),
            },
            optional: false,
        },
    ],
    command: "gendaymtx -n -D sunpath.mtx -M suns.mod -O{{output_type}} -r {{north}} -v sky.wea",
    outputs: &[
        SUNPATH_MTX,
        OutputSlot {
            name: "sun_modifiers",
            description: "List of sun modifiers in the sunpath.",
            kind: PathKind::File,
            path: "suns.mod",
        },
    ],
};

pub const CREATE_SUN_MTX: TaskDescriptor = TaskDescriptor {
    id: TaskId::CreateSunMtx,
    description: "Generate a Radiance sun matrix using honeybee-radiance.",
    family: TaskFamily::SunPath,
    program: "honeybee-radiance",
    inputs: &[
        NORTH,
        SKY_WEA,
        InputSlot {
            name: "output_type",
            description: "Output type, visible or solar.",
            kind: InputKind::Choice {
                default: Some("visible"),
                choices: &["visible", "solar"],
            },
            optional: false,
        },
    ],
    command: "honeybee-radiance sunpath radiance sky.wea --name sunpath \
              --{{output_type}} --north {{north}}",
    outputs: &[
        SUNPATH_MTX,
        OutputSlot {
            name: "sun_modifiers",
            description: "List of sun modifiers in the sunpath.",
            kind: PathKind::File,
            path: "sunpath.mod",
        },
    ],
};

pub const PARSE_SUN_UP_HOURS: TaskDescriptor = TaskDescriptor {
    id: TaskId::ParseSunUpHours,
    description: "Parse sun-up hours from a sun modifiers file.",
    family: TaskFamily::SunPath,
    program: "honeybee-radiance",
    inputs: &[InputSlot {
        name: "sun_modifiers",
        description: "Path to the sun modifiers file.",
        kind: InputKind::File {
            alias: "suns.mod",
            extensions: &[],
        },
        optional: false,
    }],
    command: "honeybee-radiance sunpath parse-hours suns.mod --name sun-up-hours.txt",
    outputs: &[OutputSlot {
        name: "sun_up_hours",
        description: "Sun-up hours, one per line.",
        kind: PathKind::File,
        path: "sun-up-hours.txt",
    }],
};
