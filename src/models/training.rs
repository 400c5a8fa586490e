use std::{fmt, str::FromStr};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TrainingType {
    /// Theta/beta ratio down-training.
    Tbr,
    /// Sensorimotor rhythm up-training.
    Smr,
    Alpha,
    /// Paced breathing. Needs no headset.
    Breathing,
}

impl TrainingType {
    pub const ALL: [TrainingType; 4] = [
        TrainingType::Tbr,
        TrainingType::Smr,
        TrainingType::Alpha,
        TrainingType::Breathing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingType::Tbr => "tbr",
            TrainingType::Smr => "smr",
            TrainingType::Alpha => "alpha",
            TrainingType::Breathing => "breathing",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TrainingType::Tbr => "Focus (Theta/Beta)",
            TrainingType::Smr => "Calm Focus (SMR)",
            TrainingType::Alpha => "Relaxation (Alpha)",
            TrainingType::Breathing => "Paced Breathing",
        }
    }

    pub fn requires_device(&self) -> bool {
        !matches!(self, TrainingType::Breathing)
    }

    /// Playlist section offered before a session of this type.
    pub fn playlist_section(&self) -> &'static str {
        match self {
            TrainingType::Tbr | TrainingType::Smr => "focus",
            TrainingType::Alpha => "relax",
            TrainingType::Breathing => "breathing",
        }
    }
}

impl fmt::Display for TrainingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrainingType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        TrainingType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == value)
            .ok_or_else(|| anyhow!("unknown training type '{value}'"))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EndReason {
    Completed,
    Early,
    Technical,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::Completed => "completed",
            EndReason::Early => "early",
            EndReason::Technical => "technical",
        }
    }
}

impl FromStr for EndReason {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "completed" => Ok(EndReason::Completed),
            "early" => Ok(EndReason::Early),
            "technical" => Ok(EndReason::Technical),
            other => Err(anyhow!("unknown end reason '{other}'")),
        }
    }
}

/// Terminal report of one training attempt, as produced by either timer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResult {
    pub training_type: TrainingType,
    pub planned_secs: u64,
    pub elapsed_secs: u64,
    /// Percentage 0..=100.
    pub time_in_zone: u8,
    pub end_reason: EndReason,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub technical_issue: Option<String>,
}

/// Pre-session check-in answers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    /// Self-reported energy, 1..=5.
    pub energy: u8,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub intention: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_breathing_skips_the_headset() {
        for ty in TrainingType::ALL {
            assert_eq!(ty.requires_device(), ty != TrainingType::Breathing);
        }
    }

    #[test]
    fn training_type_parses_its_own_name() {
        for ty in TrainingType::ALL {
            assert_eq!(ty.as_str().parse::<TrainingType>().unwrap(), ty);
        }
        assert!("theta".parse::<TrainingType>().is_err());
    }
}
