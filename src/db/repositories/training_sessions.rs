use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension, Row};

use crate::{
    db::{
        connection::Database,
        helpers::{parse_datetime, to_i64, to_small, to_u64},
    },
    models::{CheckoutData, RecordId, TrainingSessionRecord},
};

const COLUMNS: &str = "id, profile_id, date, training_type, planned_secs, elapsed_secs, time_in_zone,
     end_reason, technical_issue, points, rating, mood, concentration";

fn row_to_record(row: &Row) -> Result<TrainingSessionRecord> {
    let date: String = row.get("date")?;
    let training_type: String = row.get("training_type")?;
    let end_reason: String = row.get("end_reason")?;
    let planned_secs: i64 = row.get("planned_secs")?;
    let elapsed_secs: i64 = row.get("elapsed_secs")?;
    let time_in_zone: i64 = row.get("time_in_zone")?;
    let points: Option<i64> = row.get("points")?;
    let rating: Option<i64> = row.get("rating")?;
    let mood: Option<String> = row.get("mood")?;
    let concentration: Option<i64> = row.get("concentration")?;

    Ok(TrainingSessionRecord {
        id: row.get("id")?,
        date: parse_datetime(&date, "date")?,
        training_type: training_type.parse()?,
        planned_secs: to_u64(planned_secs, "planned_secs")?,
        elapsed_secs: to_u64(elapsed_secs, "elapsed_secs")?,
        time_in_zone: to_small(time_in_zone, "time_in_zone")?,
        end_reason: end_reason.parse()?,
        technical_issue: row.get("technical_issue")?,
        points: points
            .map(|value| u32::try_from(value).context("points out of range"))
            .transpose()?,
        rating: rating.map(|value| to_small(value, "rating")).transpose()?,
        mood: mood.map(|value| value.parse()).transpose()?,
        concentration: concentration
            .map(|value| to_small(value, "concentration"))
            .transpose()?,
        profile_id: row.get("profile_id")?,
    })
}

impl Database {
    pub async fn insert_record(&self, record: &TrainingSessionRecord) -> Result<()> {
        let record = record.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO training_sessions (id, profile_id, date, training_type, planned_secs, elapsed_secs,
                     time_in_zone, end_reason, technical_issue, points, rating, mood, concentration)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    record.id,
                    record.profile_id,
                    record.date.to_rfc3339(),
                    record.training_type.as_str(),
                    to_i64(record.planned_secs)?,
                    to_i64(record.elapsed_secs)?,
                    record.time_in_zone,
                    record.end_reason.as_str(),
                    record.technical_issue,
                    record.points,
                    record.rating,
                    record.mood.map(|mood| mood.as_str()),
                    record.concentration,
                ],
            )
            .with_context(|| format!("failed to insert training session {}", record.id))?;
            Ok(())
        })
        .await
    }

    /// Writes check-out answers; absent answers keep their stored value.
    pub async fn update_checkout(&self, id: RecordId, checkout: &CheckoutData) -> Result<()> {
        let checkout = checkout.clone();
        self.execute(move |conn| {
            let updated = conn.execute(
                "UPDATE training_sessions
                 SET rating = COALESCE(?1, rating),
                     mood = COALESCE(?2, mood),
                     concentration = COALESCE(?3, concentration)
                 WHERE id = ?4",
                params![
                    checkout.rating,
                    checkout.mood.map(|mood| mood.as_str()),
                    checkout.concentration,
                    id,
                ],
            )?;
            if updated == 0 {
                anyhow::bail!("no training session with id {id}");
            }
            Ok(())
        })
        .await
    }

    /// Every stored record, newest first.
    pub async fn list_records(&self) -> Result<Vec<TrainingSessionRecord>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM training_sessions ORDER BY id DESC"
            ))?;

            let mut rows = stmt.query([])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_record(row)?);
            }
            Ok(records)
        })
        .await
    }

    pub async fn get_record(&self, id: RecordId) -> Result<Option<TrainingSessionRecord>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM training_sessions WHERE id = ?1"
            ))?;

            stmt.query_row(params![id], |row| Ok(row_to_record(row)))
                .optional()?
                .transpose()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::models::{EndReason, Mood, TrainingType};

    fn record(id: RecordId, end_reason: EndReason) -> TrainingSessionRecord {
        TrainingSessionRecord {
            id,
            date: Utc.timestamp_millis_opt(id).unwrap(),
            training_type: TrainingType::Smr,
            planned_secs: 960,
            elapsed_secs: 960,
            time_in_zone: 64,
            end_reason,
            technical_issue: None,
            points: (end_reason == EndReason::Completed).then_some(160),
            rating: None,
            mood: None,
            concentration: None,
            profile_id: Some("p-leo".into()),
        }
    }

    #[tokio::test]
    async fn insert_then_list_newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.insert_record(&record(1_700_000_000_000, EndReason::Completed))
            .await
            .unwrap();
        db.insert_record(&record(1_700_000_100_000, EndReason::Early))
            .await
            .unwrap();

        let records = db.list_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1_700_000_100_000);
        assert_eq!(records[0].points, None);
        assert_eq!(records[1], record(1_700_000_000_000, EndReason::Completed));
    }

    #[tokio::test]
    async fn checkout_keeps_unanswered_fields() {
        let db = Database::open_in_memory().unwrap();
        let id = 1_700_000_000_000;
        db.insert_record(&record(id, EndReason::Completed)).await.unwrap();

        db.update_checkout(
            id,
            &CheckoutData {
                rating: Some(5),
                mood: Some(Mood::Better),
                concentration: None,
            },
        )
        .await
        .unwrap();
        db.update_checkout(
            id,
            &CheckoutData {
                concentration: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let stored = db.get_record(id).await.unwrap().unwrap();
        assert_eq!(stored.rating, Some(5));
        assert_eq!(stored.mood, Some(Mood::Better));
        assert_eq!(stored.concentration, Some(3));
    }

    #[tokio::test]
    async fn unknown_ids() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_record(7).await.unwrap().is_none());
        assert!(db
            .update_checkout(7, &CheckoutData::default())
            .await
            .is_err());
    }
}
