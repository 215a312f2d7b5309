// Measured parameters reported by SMS station devices
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Temperature,
    StaticPressure,
    DifferentialPressure,
    Volume,
    TotalVolumeFlow,
    Battery,
}

impl Parameter {
    pub const ALL: [Parameter; 6] = [
        Parameter::Temperature,
        Parameter::StaticPressure,
        Parameter::DifferentialPressure,
        Parameter::Volume,
        Parameter::TotalVolumeFlow,
        Parameter::Battery,
    ];

    /// Resolve a backend parameter name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "temperature" => Some(Self::Temperature),
            "static_pressure" => Some(Self::StaticPressure),
            "differential_pressure" => Some(Self::DifferentialPressure),
            "volume" => Some(Self::Volume),
            "total_volume_flow" | "volume_flow" | "flow" => Some(Self::TotalVolumeFlow),
            "battery" => Some(Self::Battery),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::StaticPressure => "static_pressure",
            Self::DifferentialPressure => "differential_pressure",
            Self::Volume => "volume",
            Self::TotalVolumeFlow => "total_volume_flow",
            Self::Battery => "battery",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
