//! Active Training Timer.
//!
//! Fixed-duration countdown advanced by discrete one-second ticks so the
//! elapsed value is always a whole number of seconds. The timer stops at
//! its first terminal report; every later call is a no-op.

use std::time::Duration;

use super::state::{TimerError, TimerStatus, TrainingReport, TrainingSnapshot};
use crate::models::EndReason;

pub const TRAINING_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ActiveTrainingTimer {
    planned_secs: u64,
    elapsed_secs: u64,
    status: TimerStatus,
    feedback_samples: u32,
    in_zone_samples: u32,
}

impl ActiveTrainingTimer {
    pub fn new(planned_secs: u64) -> Result<Self, TimerError> {
        if planned_secs == 0 {
            return Err(TimerError::ZeroDuration);
        }

        Ok(Self {
            planned_secs,
            elapsed_secs: 0,
            status: TimerStatus::Running,
            feedback_samples: 0,
            in_zone_samples: 0,
        })
    }

    pub fn tick(&mut self) -> Option<TrainingReport> {
        if self.status != TimerStatus::Running {
            return None;
        }

        self.elapsed_secs += 1;
        if self.elapsed_secs >= self.planned_secs {
            self.elapsed_secs = self.planned_secs;
            return Some(self.finish(EndReason::Completed, None));
        }
        None
    }

    /// User abort; reports whatever elapsed value was reached.
    pub fn abort(&mut self) -> Option<TrainingReport> {
        if self.status != TimerStatus::Running {
            return None;
        }
        Some(self.finish(EndReason::Early, None))
    }

    /// Externally detected technical failure.
    pub fn fault(&mut self, issue: impl Into<String>) -> Option<TrainingReport> {
        if self.status != TimerStatus::Running {
            return None;
        }
        Some(self.finish(EndReason::Technical, Some(issue.into())))
    }

    /// One neurofeedback sample: was the reading inside the target zone.
    pub fn record_feedback(&mut self, in_zone: bool) {
        if self.status != TimerStatus::Running {
            return;
        }
        self.feedback_samples += 1;
        if in_zone {
            self.in_zone_samples += 1;
        }
    }

    pub fn time_in_zone(&self) -> u8 {
        if self.feedback_samples == 0 {
            return 0;
        }
        let percent = u64::from(self.in_zone_samples) * 100 / u64::from(self.feedback_samples);
        percent.min(100) as u8
    }

    pub fn planned_secs(&self) -> u64 {
        self.planned_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.planned_secs - self.elapsed_secs
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn snapshot(&self) -> TrainingSnapshot {
        TrainingSnapshot {
            status: self.status,
            planned_secs: self.planned_secs,
            elapsed_secs: self.elapsed_secs,
            remaining_secs: self.remaining_secs(),
            time_in_zone: self.time_in_zone(),
        }
    }

    fn finish(&mut self, end_reason: EndReason, technical_issue: Option<String>) -> TrainingReport {
        self.status = TimerStatus::Stopped;
        TrainingReport {
            end_reason,
            elapsed_secs: self.elapsed_secs,
            time_in_zone: self.time_in_zone(),
            technical_issue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_is_rejected() {
        assert_eq!(ActiveTrainingTimer::new(0).unwrap_err(), TimerError::ZeroDuration);
    }

    #[test]
    fn completes_exactly_once_at_planned_duration() {
        for planned in [1, 2, 7, 60] {
            let mut timer = ActiveTrainingTimer::new(planned).unwrap();
            let mut previous = 0;
            let mut reports = Vec::new();

            for _ in 0..planned + 5 {
                if let Some(report) = timer.tick() {
                    reports.push(report);
                }
                assert!(timer.elapsed_secs() >= previous);
                assert!(timer.elapsed_secs() <= planned);
                assert!(timer.elapsed_secs() - previous <= 1);
                previous = timer.elapsed_secs();
            }

            assert_eq!(reports.len(), 1);
            assert_eq!(reports[0].end_reason, EndReason::Completed);
            assert_eq!(reports[0].elapsed_secs, planned);
        }
    }

    #[test]
    fn abort_reports_elapsed_at_request() {
        let mut timer = ActiveTrainingTimer::new(960).unwrap();
        for _ in 0..90 {
            assert!(timer.tick().is_none());
        }

        let report = timer.abort().unwrap();
        assert_eq!(report.end_reason, EndReason::Early);
        assert_eq!(report.elapsed_secs, 90);

        assert!(timer.tick().is_none());
        assert_eq!(timer.elapsed_secs(), 90);
        assert!(timer.abort().is_none());
        assert!(timer.fault("late").is_none());
    }

    #[test]
    fn fault_carries_issue_and_stops() {
        let mut timer = ActiveTrainingTimer::new(300).unwrap();
        timer.tick();
        timer.tick();

        let report = timer.fault("Bluetooth connection lost").unwrap();
        assert_eq!(report.end_reason, EndReason::Technical);
        assert_eq!(report.elapsed_secs, 2);
        assert_eq!(report.technical_issue.as_deref(), Some("Bluetooth connection lost"));
        assert!(!timer.is_running());
        assert!(timer.tick().is_none());
    }

    #[test]
    fn time_in_zone_is_share_of_samples() {
        let mut timer = ActiveTrainingTimer::new(10).unwrap();
        assert_eq!(timer.time_in_zone(), 0);
        for in_zone in [true, true, false, true] {
            timer.record_feedback(in_zone);
        }
        assert_eq!(timer.time_in_zone(), 75);
    }
}
