//! Session Record Store.
//!
//! Append-only training history kept newest-first, with per-profile
//! streaks and points. The only in-place mutation is attaching check-out
//! answers to a record, located by the id handed out at creation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::{debug, info};
use thiserror::Error;

use crate::models::{CheckoutData, EndReason, RecordId, TrainingResult, TrainingSessionRecord};

const SCORE_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("no session record with id {0}")]
    UnknownRecord(RecordId),
    #[error("{field} must be between 1 and 5, got {value}")]
    OutOfRange { field: &'static str, value: u8 },
}

/// Validates the 1..=5 scales of a check-out form.
pub fn validate_checkout(data: &CheckoutData) -> Result<(), RecordError> {
    for (field, value) in [("rating", data.rating), ("concentration", data.concentration)] {
        if let Some(value) = value {
            if !SCORE_RANGE.contains(&value) {
                return Err(RecordError::OutOfRange { field, value });
            }
        }
    }
    Ok(())
}

/// Linear scoring over whole elapsed minutes.
pub fn points_for(elapsed_secs: u64, points_per_minute: u32) -> u32 {
    let minutes = u32::try_from(elapsed_secs / 60).unwrap_or(u32::MAX);
    minutes.saturating_mul(points_per_minute)
}

/// Changes a persistence collaborator has not yet seen.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordChange {
    Inserted(TrainingSessionRecord),
    Amended(TrainingSessionRecord),
}

#[derive(Debug)]
pub struct SessionRecordStore {
    history: Vec<TrainingSessionRecord>,
    streaks: HashMap<Option<String>, u32>,
    points_per_minute: u32,
    pending: Vec<RecordChange>,
}

impl SessionRecordStore {
    pub fn new(points_per_minute: u32) -> Self {
        Self {
            history: Vec::new(),
            streaks: HashMap::new(),
            points_per_minute,
            pending: Vec::new(),
        }
    }

    /// Rebuilds a store from persisted records. Streaks never decay, so
    /// each profile's streak equals its number of completed sessions.
    pub fn from_history(points_per_minute: u32, mut records: Vec<TrainingSessionRecord>) -> Self {
        records.sort_by(|a, b| b.id.cmp(&a.id));

        let mut streaks = HashMap::new();
        for record in records.iter().filter(|record| record.is_completed()) {
            *streaks.entry(record.profile_id.clone()).or_insert(0) += 1;
        }

        Self {
            history: records,
            streaks,
            points_per_minute,
            pending: Vec::new(),
        }
    }

    /// Appends a record for a finished attempt and returns its id.
    ///
    /// Ids come from the creation time but are forced strictly increasing,
    /// so two records created in the same millisecond stay distinct and
    /// newest-first order holds.
    pub fn record_session(
        &mut self,
        result: &TrainingResult,
        profile_id: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> RecordId {
        let mut id = created_at.timestamp_millis();
        if let Some(latest) = self.history.first() {
            if id <= latest.id {
                id = latest.id + 1;
            }
        }

        let points = match result.end_reason {
            EndReason::Completed => Some(points_for(result.elapsed_secs, self.points_per_minute)),
            EndReason::Early | EndReason::Technical => None,
        };

        let record = TrainingSessionRecord {
            id,
            date: created_at,
            training_type: result.training_type,
            planned_secs: result.planned_secs,
            elapsed_secs: result.elapsed_secs,
            time_in_zone: result.time_in_zone.min(100),
            end_reason: result.end_reason,
            technical_issue: result.technical_issue.clone(),
            points,
            rating: None,
            mood: None,
            concentration: None,
            profile_id: profile_id.map(str::to_string),
        };

        let streak = self.streaks.entry(record.profile_id.clone()).or_insert(0);
        if record.is_completed() {
            *streak += 1;
        }

        info!(
            "Recorded {} session {} ({}s of {}s, {})",
            record.training_type,
            record.id,
            record.elapsed_secs,
            record.planned_secs,
            record.end_reason.as_str()
        );

        self.history.insert(0, record.clone());
        self.pending.push(RecordChange::Inserted(record));
        id
    }

    /// Merges check-out answers into the record created with `id`.
    ///
    /// The caller passes the id it captured when the record was created;
    /// the store never guesses "most recent" by position.
    pub fn amend_most_recent(
        &mut self,
        id: RecordId,
        checkout: &CheckoutData,
    ) -> Result<&TrainingSessionRecord, RecordError> {
        validate_checkout(checkout)?;

        let record = self
            .history
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(RecordError::UnknownRecord(id))?;

        if checkout.rating.is_some() {
            record.rating = checkout.rating;
        }
        if checkout.mood.is_some() {
            record.mood = checkout.mood;
        }
        if checkout.concentration.is_some() {
            record.concentration = checkout.concentration;
        }

        debug!("Attached check-out to session {id}");
        self.pending.push(RecordChange::Amended(record.clone()));
        Ok(record)
    }

    pub fn history(&self) -> &[TrainingSessionRecord] {
        &self.history
    }

    pub fn history_for(&self, profile_id: Option<&str>) -> Vec<TrainingSessionRecord> {
        self.history
            .iter()
            .filter(|record| record.profile_id.as_deref() == profile_id)
            .cloned()
            .collect()
    }

    pub fn get(&self, id: RecordId) -> Option<&TrainingSessionRecord> {
        self.history.iter().find(|record| record.id == id)
    }

    pub fn latest(&self) -> Option<&TrainingSessionRecord> {
        self.history.first()
    }

    pub fn streak(&self, profile_id: Option<&str>) -> u32 {
        self.streaks
            .get(&profile_id.map(str::to_string))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_points(&self, profile_id: Option<&str>) -> u32 {
        self.history
            .iter()
            .filter(|record| record.profile_id.as_deref() == profile_id)
            .filter_map(|record| record.points)
            .sum()
    }

    /// Drains the changes recorded since the last call.
    pub fn take_changes(&mut self) -> Vec<RecordChange> {
        std::mem::take(&mut self.pending)
    }
}
