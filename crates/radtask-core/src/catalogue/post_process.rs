use crate::models::{
    InputKind, InputSlot, OutputSlot, PathKind, TaskDescriptor, TaskFamily, TaskId, ValueRange,
};

const PROGRAM: &str = "honeybee-radiance";

const INCLUDE_EXCLUDE: &[&str] = &["include", "exclude"];
const COMPLY_REVERSE: &[&str] = &["comply", "reverse"];

const INPUT_MTX: InputSlot = InputSlot {
    name: "input_mtx",
    description: "Input Radiance matrix in ASCII format.",
    kind: InputKind::File {
        alias: "input.mtx",
        extensions: &[],
    },
    optional: false,
};

const WEA: InputSlot = InputSlot {
    name: "wea",
    description: "The .wea file used in the simulation. Determines the duration of the analysis.",
    kind: InputKind::File {
        alias: "weather.wea",
        extensions: &[],
    },
    optional: false,
};

const TIMESTEP: InputSlot = InputSlot {
    name: "timestep",
    description: "Timestep of the Wea file, used to turn summed irradiance into cumulative \
                  radiation over the Wea period.",
    kind: InputKind::Integer {
        default: Some(1),
        range: ValueRange::UNBOUNDED,
    },
    optional: false,
};

const RAW_RESULTS: InputSlot = InputSlot {
    name: "folder",
    description: "Results folder produced by an upstream simulation recipe.",
    kind: InputKind::Folder {
        alias: "raw_results",
    },
    optional: false,
};

const INCLUDE_MIN: InputSlot = InputSlot {
    name: "include_min",
    description: "Whether the minimum threshold itself is part of the selection.",
    kind: InputKind::Choice {
        default: Some("include"),
        choices: INCLUDE_EXCLUDE,
    },
    optional: false,
};

const INCLUDE_MAX: InputSlot = InputSlot {
    name: "include_max",
    description: "Whether the maximum threshold itself is part of the selection.",
    kind: InputKind::Choice {
        default: Some("include"),
        choices: INCLUDE_EXCLUDE,
    },
    optional: false,
};

const REVERSE: InputSlot = InputSlot {
    name: "reverse",
    description: "Reverse the selection logic to select values outside the range.",
    kind: InputKind::Choice {
        default: Some("comply"),
        choices: COMPLY_REVERSE,
    },
    optional: false,
};

const fn threshold(name: &'static str, description: &'static str, default: f64) -> InputSlot {
    InputSlot {
        name,
        description,
        kind: InputKind::Number {
            default: Some(default),
            range: ValueRange::UNBOUNDED,
        },
        optional: false,
    }
}

const fn file_output(
    name: &'static str,
    description: &'static str,
    path: &'static str,
) -> OutputSlot {
    OutputSlot {
        name,
        description,
        kind: PathKind::File,
        path,
    }
}

const fn folder_output(
    name: &'static str,
    description: &'static str,
    path: &'static str,
) -> OutputSlot {
    OutputSlot {
        name,
        description,
        kind: PathKind::Folder,
        path,
    }
}

pub const CONVERT_TO_BINARY: TaskDescriptor = TaskDescriptor {
    id: TaskId::ConvertToBinary,
    description: "Convert a Radiance matrix to a new matrix with 0-1 values.",
    family: TaskFamily::PostProcess,
    program: PROGRAM,
    inputs: &[
        INPUT_MTX,
        threshold(
            "minimum",
            "Minimum of the range of values converted to 1.",
            -1e100,
        ),
        threshold(
            "maximum",
            "Maximum of the range of values converted to 1.",
            1e100,
        ),
        INCLUDE_MIN,
        INCLUDE_MAX,
        REVERSE,
    ],
    command: "honeybee-radiance post-process convert-to-binary input.mtx \
              --output binary.mtx --maximum {{maximum}} --minimum {{minimum}} \
              --{{reverse}} --{{include_min}}-min --{{include_max}}-max",
    outputs: &[file_output(
        "output_mtx",
        "Newly created binary matrix.",
        "binary.mtx",
    )],
};

pub const COUNT: TaskDescriptor = TaskDescriptor {
    id: TaskId::Count,
    description: "Count values in a row that meet a certain criteria.",
    family: TaskFamily::PostProcess,
    program: PROGRAM,
    inputs: &[
        INPUT_MTX,
        threshold("minimum", "Minimum of the range of values counted.", -1e100),
        threshold("maximum", "Maximum of the range of values counted.", 1e100),
        INCLUDE_MIN,
        INCLUDE_MAX,
        REVERSE,
    ],
    command: "honeybee-radiance post-process count input.mtx \
              --output counter.mtx --maximum {{maximum}} --minimum {{minimum}} \
              --{{reverse}} --{{include_min}}-min --{{include_max}}-max",
    outputs: &[file_output(
        "output_mtx",
        "Matrix with the count of matching values per row.",
        "counter.mtx",
    )],
};

pub const SUM_ROW: TaskDescriptor = TaskDescriptor {
    id: TaskId::SumRow,
    description: "Add all the numbers in each row of a Radiance matrix. The header of the \
                  input file is ignored.",
    family: TaskFamily::PostProcess,
    program: PROGRAM,
    inputs: &[
        INPUT_MTX,
        InputSlot {
            name: "divisor",
            description: "Number each summed row is divided by, e.g. a timestep so summed \
                          irradiance yields cumulative radiation.",
            kind: InputKind::Number {
                default: Some(1.0),
                range: ValueRange::UNBOUNDED,
            },
            optional: false,
        },
    ],
    command: "honeybee-radiance post-process sum-row input.mtx \
              --divisor {{divisor}} --output sum.mtx",
    outputs: &[file_output(
        "output_mtx",
        "Newly created sum matrix.",
        "sum.mtx",
    )],
};

pub const AVERAGE_ROW: TaskDescriptor = TaskDescriptor {
    id: TaskId::AverageRow,
    description: "Average all the numbers in each row of a Radiance matrix.",
    family: TaskFamily::PostProcess,
    program: PROGRAM,
    inputs: &[INPUT_MTX],
    command: "honeybee-radiance post-process average-row input.mtx --output average.mtx",
    outputs: &[file_output(
        "output_mtx",
        "Newly created average matrix.",
        "average.mtx",
    )],
};

pub const CUMULATIVE_RADIATION: TaskDescriptor = TaskDescriptor {
    id: TaskId::CumulativeRadiation,
    description: "Turn average irradiance (W/m2) into cumulative radiation (kWh/m2).",
    family: TaskFamily::PostProcess,
    program: PROGRAM,
    inputs: &[
        InputSlot {
            name: "average_irradiance",
            description: "Single-column matrix of average irradiance values in ASCII format.",
            kind: InputKind::File {
                alias: "avg_irr.mtx",
                extensions: &[],
            },
            optional: false,
        },
        WEA,
        TIMESTEP,
    ],
    command: "honeybee-radiance post-process cumulative-radiation avg_irr.mtx weather.wea \
              --timestep {{timestep}} --output radiation.mtx",
    outputs: &[file_output(
        "radiation",
        "Matrix of cumulative radiation.",
        "radiation.mtx",
    )],
};

pub const ANNUAL_IRRADIANCE_METRICS: TaskDescriptor = TaskDescriptor {
    id: TaskId::AnnualIrradianceMetrics,
    description: "Calculate annual irradiance metrics for an annual irradiance simulation.",
    family: TaskFamily::PostProcess,
    program: PROGRAM,
    inputs: &[RAW_RESULTS, WEA, TIMESTEP],
    command: "honeybee-radiance post-process annual-irradiance raw_results weather.wea \
              --timestep {{timestep}} --sub-folder ../metrics",
    outputs: &[
        folder_output(
            "metrics",
            "Annual irradiance metrics folder holding every metric sub-folder.",
            "metrics",
        ),
        folder_output(
            "average_irradiance",
            "Average irradiance in W/m2 for each sensor over the Wea period.",
            "metrics/average_irradiance",
        ),
        folder_output(
            "peak_irradiance",
            "Highest irradiance in W/m2 for each sensor during the Wea period.",
            "metrics/peak_irradiance",
        ),
        folder_output(
            "cumulative_radiation",
            "Cumulative radiation in kWh/m2 for each sensor over the Wea period.",
            "metrics/cumulative_radiation",
        ),
        file_output(
            "timestep_file",
            "Timestep of the results, kept for further post-processing.",
            "raw_results/timestep.txt",
        ),
    ],
};

pub const ANNUAL_DAYLIGHT_METRICS: TaskDescriptor = TaskDescriptor {
    id: TaskId::AnnualDaylightMetrics,
    description: "Calculate annual daylight metrics for an annual daylight simulation.",
    family: TaskFamily::PostProcess,
    program: PROGRAM,
    inputs: &[
        InputSlot {
            name: "folder",
            description: "Output folder of an annual daylight recipe. Must include \
                          grids_info.json and sun-up-hours.txt.",
            kind: InputKind::Folder {
                alias: "raw_results",
            },
            optional: false,
        },
        InputSlot {
            name: "schedule",
            description: "Annual occupancy schedule with 0-1 values separated by new lines. \
                          An 8-5 schedule is used when missing.",
            kind: InputKind::File {
                alias: "schedule.txt",
                extensions: &[],
            },
            optional: true,
        },
        InputSlot {
            name: "thresholds",
            description: "Daylight autonomy (-t) and useful daylight illuminance lower (-lt) \
                          and upper (-ut) thresholds, in any order.",
            kind: InputKind::Text {
                default: Some("-t 300 -lt 100 -ut 3000"),
            },
            optional: false,
        },
    ],
    command: "honeybee-radiance post-process annual-daylight raw_results \
              --schedule schedule.txt {{thresholds}} --sub_folder ../metrics",
    outputs: &[
        folder_output(
            "annual_metrics",
            "Annual metrics folder holding every metric sub-folder.",
            "metrics",
        ),
        file_output(
            "metrics_info",
            "Config file describing the metric sub-folders for visualization.",
            "metrics/config.json",
        ),
        folder_output(
            "daylight_autonomy",
            "Daylight autonomy results.",
            "metrics/da",
        ),
        folder_output(
            "continuous_daylight_autonomy",
            "Continuous daylight autonomy results.",
            "metrics/cda",
        ),
        folder_output(
            "useful_daylight_illuminance_lower",
            "Lower useful daylight illuminance results.",
            "metrics/udi_lower",
        ),
        folder_output(
            "useful_daylight_illuminance",
            "Useful daylight illuminance results.",
            "metrics/udi",
        ),
        folder_output(
            "useful_daylight_illuminance_upper",
            "Upper useful daylight illuminance results.",
            "metrics/udi_upper",
        ),
    ],
};

pub const LEED_ILLUMINANCE_CREDITS: TaskDescriptor = TaskDescriptor {
    id: TaskId::LeedIlluminanceCredits,
    description: "Estimate LEED daylight credits from two point-in-time illuminance folders.",
    family: TaskFamily::PostProcess,
    program: PROGRAM,
    inputs: &[
        InputSlot {
            name: "folder",
            description: "LEED illuminance project folder with a HBJSON model and complete \
                          9AM and 3PM point-in-time results.",
            kind: InputKind::Folder {
                alias: "raw_results",
            },
            optional: false,
        },
        InputSlot {
            name: "glare_control_devices",
            description: "Whether the model has view-preserving automatic glare-control \
                          devices, which drops the 3000 lux upper limit.",
            kind: InputKind::Choice {
                default: Some("glare-control"),
                choices: &["glare-control", "no-glare-control"],
            },
            optional: false,
        },
    ],
    command: "honeybee-radiance post-process leed-illuminance raw_results \
              --{{glare_control_devices}} --sub-folder ../pass_fail \
              --output-file credit_summary.json",
    outputs: &[
        folder_output(
            "pass_fail_results",
            "Per-sensor pass/fail results against the LEED criteria.",
            "pass_fail",
        ),
        file_output(
            "credit_summary",
            "JSON summary of the LEED credits achieved and passing floor area.",
            "credit_summary.json",
        ),
    ],
};

pub const SOLAR_TRACKING_SYNTHESIS: TaskDescriptor = TaskDescriptor {
    id: TaskId::SolarTrackingSynthesis,
    description: "Synthesize a list of result folders to account for dynamic solar tracking.",
    family: TaskFamily::PostProcess,
    program: PROGRAM,
    inputs: &[
        InputSlot {
            name: "folder",
            description: "Results folder with one sub-folder of .ill files per tracking state.",
            kind: InputKind::Folder {
                alias: "raw_results",
            },
            optional: false,
        },
        InputSlot {
            name: "sun_up_hours",
            description: "Sun-up hours that were simulated.",
            kind: InputKind::File {
                alias: "sun-up-hours.txt",
                extensions: &[],
            },
            optional: false,
        },
        InputSlot {
            name: "wea",
            description: "The .wea file used to determine the solar positions.",
            kind: InputKind::File {
                alias: "weather.wea",
                extensions: &[],
            },
            optional: false,
        },
        super::sun::NORTH,
        InputSlot {
            name: "tracking_increment",
            description: "Increment angle of each tracking state in degrees.",
            kind: InputKind::Integer {
                default: Some(5),
                range: ValueRange::inclusive(1, 90),
            },
            optional: false,
        },
    ],
    command: "honeybee-radiance post-process solar-tracking raw_results sun-up-hours.txt \
              weather.wea --north {{north}} --tracking-increment {{tracking_increment}} \
              --sub-folder ../final",
    outputs: &[folder_output(
        "results",
        "Synthesized .ill files matching the tracking behavior.",
        "final",
    )],
};
