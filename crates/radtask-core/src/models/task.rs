use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use crate::models::{CoreError, CoreErrorKind, InputSlot, OutputSlot};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize)]
pub enum TaskId {
    ConvertToBinary,
    Count,
    SumRow,
    AverageRow,
    CumulativeRadiation,
    AnnualIrradianceMetrics,
    AnnualDaylightMetrics,
    LeedIlluminanceCredits,
    SolarTrackingSynthesis,
    CreateSunMatrix,
    CreateSunMtx,
    ParseSunUpHours,
}

impl TaskId {
    pub const ALL: [TaskId; 12] = [
        TaskId::ConvertToBinary,
        TaskId::Count,
        TaskId::SumRow,
        TaskId::AverageRow,
        TaskId::CumulativeRadiation,
        TaskId::AnnualIrradianceMetrics,
        TaskId::AnnualDaylightMetrics,
        TaskId::LeedIlluminanceCredits,
        TaskId::SolarTrackingSynthesis,
        TaskId::CreateSunMatrix,
        TaskId::CreateSunMtx,
        TaskId::ParseSunUpHours,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConvertToBinary => "ConvertToBinary",
            Self::Count => "Count",
            Self::SumRow => "SumRow",
            Self::AverageRow => "AverageRow",
            Self::CumulativeRadiation => "CumulativeRadiation",
            Self::AnnualIrradianceMetrics => "AnnualIrradianceMetrics",
            Self::AnnualDaylightMetrics => "AnnualDaylightMetrics",
            Self::LeedIlluminanceCredits => "LeedIlluminanceCredits",
            Self::SolarTrackingSynthesis => "SolarTrackingSynthesis",
            Self::CreateSunMatrix => "CreateSunMatrix",
            Self::CreateSunMtx => "CreateSunMtx",
            Self::ParseSunUpHours => "ParseSunUpHours",
        }
    }

    /// Kebab-case alias accepted on the command line, e.g. `convert-to-binary`.
    pub fn cli_key(self) -> String {
        let mut key = String::new();
        for (index, ch) in self.as_str().char_indices() {
            if ch.is_ascii_uppercase() {
                if index > 0 {
                    key.push('-');
                }
                key.push(ch.to_ascii_lowercase());
            } else {
                key.push(ch);
            }
        }
        key
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskId {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        TaskId::ALL
            .into_iter()
            .find(|id| id.as_str() == value || id.cli_key() == value)
            .ok_or_else(|| {
                CoreError::new(CoreErrorKind::UnknownTask, format!("unknown task '{value}'"))
            })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFamily {
    PostProcess,
    SunPath,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaskDescriptor {
    #[serde(rename = "name")]
    pub id: TaskId,
    pub description: &'static str,
    pub family: TaskFamily,
    /// Executable the command template invokes; always its first token.
    pub program: &'static str,
    pub inputs: &'static [InputSlot],
    pub command: &'static str,
    pub outputs: &'static [OutputSlot],
}

impl TaskDescriptor {
    pub fn input(&self, name: &str) -> Option<&'static InputSlot> {
        self.inputs.iter().find(|slot| slot.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&'static OutputSlot> {
        self.outputs.iter().find(|slot| slot.name == name)
    }

    pub fn output_paths(&self) -> Vec<&'static str> {
        self.outputs.iter().map(|slot| slot.path).collect()
    }
}
