//! Training history records.
//!
//! The serialized form of [`TrainingSessionRecord`] is the export shape
//! handed to persistence collaborators:
//! `{id, date, type, duration, timeElapsed, timeInZone, endReason,
//! technicalIssue?, points?, rating?, mood?, concentration?}`.

use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::training::{EndReason, TrainingType};

/// Creation timestamp in milliseconds; unique within a store.
pub type RecordId = i64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Mood {
    Better,
    Same,
    Worse,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Better => "better",
            Mood::Same => "same",
            Mood::Worse => "worse",
        }
    }
}

impl FromStr for Mood {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "better" => Ok(Mood::Better),
            "same" => Ok(Mood::Same),
            "worse" => Ok(Mood::Worse),
            other => Err(anyhow!("unknown mood '{other}'")),
        }
    }
}

/// Post-session check-out answers. Every field is optional because the
/// user may answer only part of the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutData {
    pub rating: Option<u8>,
    pub mood: Option<Mood>,
    pub concentration: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSessionRecord {
    pub id: RecordId,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub training_type: TrainingType,
    #[serde(rename = "duration")]
    pub planned_secs: u64,
    #[serde(rename = "timeElapsed")]
    pub elapsed_secs: u64,
    pub time_in_zone: u8,
    pub end_reason: EndReason,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub technical_issue: Option<String>,
    /// Present iff `end_reason` is `Completed`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub points: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mood: Option<Mood>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub concentration: Option<u8>,
    #[serde(skip)]
    pub profile_id: Option<String>,
}

impl TrainingSessionRecord {
    pub fn is_completed(&self) -> bool {
        self.end_reason == EndReason::Completed
    }
}
