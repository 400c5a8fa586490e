use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::breathing::BreathingPhase;
use crate::models::EndReason;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Running,
    Stopped,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("planned duration must be greater than zero")]
    ZeroDuration,
    #[error("{} phase duration must be greater than zero", .0.as_str())]
    ZeroPhase(BreathingPhase),
    #[error("target cycle count must be greater than zero")]
    ZeroCycles,
}

/// What the active training screen needs to draw.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSnapshot {
    pub status: TimerStatus,
    pub planned_secs: u64,
    pub elapsed_secs: u64,
    pub remaining_secs: u64,
    pub time_in_zone: u8,
}

/// Continuous breathing state for animation.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreathingSnapshot {
    pub status: TimerStatus,
    pub phase: BreathingPhase,
    pub cycle: u32,
    /// Position within the current phase, 0.0..=1.0.
    pub progress: f64,
    pub target_cycles: Option<u32>,
}

/// Terminal report of the fixed-duration timer.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub end_reason: EndReason,
    pub elapsed_secs: u64,
    pub time_in_zone: u8,
    pub technical_issue: Option<String>,
}
