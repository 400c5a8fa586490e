//! Paced Breathing Timer.
//!
//! Four phases in fixed order, each with its own duration. Progress is
//! derived from wall-clock time since the phase began rather than from a
//! tick count, so a late tick never makes the animation stutter. Phase
//! boundaries are anchored to the previous boundary, not to the tick that
//! observed them, so phases do not drift either.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::state::{BreathingSnapshot, TimerError, TimerStatus};
use crate::models::EndReason;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum BreathingPhase {
    Inhale,
    Hold,
    Exhale,
    Hold2,
}

impl BreathingPhase {
    pub const ALL: [BreathingPhase; 4] = [
        BreathingPhase::Inhale,
        BreathingPhase::Hold,
        BreathingPhase::Exhale,
        BreathingPhase::Hold2,
    ];

    pub fn next(self) -> Self {
        match self {
            BreathingPhase::Inhale => BreathingPhase::Hold,
            BreathingPhase::Hold => BreathingPhase::Exhale,
            BreathingPhase::Exhale => BreathingPhase::Hold2,
            BreathingPhase::Hold2 => BreathingPhase::Inhale,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BreathingPhase::Inhale => "inhale",
            BreathingPhase::Hold => "hold",
            BreathingPhase::Exhale => "exhale",
            BreathingPhase::Hold2 => "hold2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreathingPattern {
    pub inhale: Duration,
    pub hold: Duration,
    pub exhale: Duration,
    pub hold2: Duration,
}

impl BreathingPattern {
    pub fn duration_of(&self, phase: BreathingPhase) -> Duration {
        match phase {
            BreathingPhase::Inhale => self.inhale,
            BreathingPhase::Hold => self.hold,
            BreathingPhase::Exhale => self.exhale,
            BreathingPhase::Hold2 => self.hold2,
        }
    }

    pub fn cycle_length(&self) -> Duration {
        self.inhale + self.hold + self.exhale + self.hold2
    }

    pub fn validate(&self) -> Result<(), TimerError> {
        match BreathingPhase::ALL
            .into_iter()
            .find(|phase| self.duration_of(*phase).is_zero())
        {
            Some(phase) => Err(TimerError::ZeroPhase(phase)),
            None => Ok(()),
        }
    }
}

impl Default for BreathingPattern {
    fn default() -> Self {
        Self {
            inhale: Duration::from_secs(4),
            hold: Duration::from_secs(4),
            exhale: Duration::from_secs(4),
            hold2: Duration::from_secs(4),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreathingReport {
    pub end_reason: EndReason,
    /// Wall-clock time since the exercise began.
    pub elapsed: Duration,
    pub cycles: u32,
}

#[derive(Debug, Clone)]
pub struct PacedBreathingTimer {
    pattern: BreathingPattern,
    target_cycles: Option<u32>,
    started_at: Instant,
    phase: BreathingPhase,
    phase_started_at: Instant,
    cycle: u32,
    progress: f64,
    status: TimerStatus,
}

impl PacedBreathingTimer {
    pub fn new(
        pattern: BreathingPattern,
        target_cycles: Option<u32>,
        now: Instant,
    ) -> Result<Self, TimerError> {
        pattern.validate()?;
        if target_cycles == Some(0) {
            return Err(TimerError::ZeroCycles);
        }

        Ok(Self {
            pattern,
            target_cycles,
            started_at: now,
            phase: BreathingPhase::Inhale,
            phase_started_at: now,
            cycle: 0,
            progress: 0.0,
            status: TimerStatus::Running,
        })
    }

    /// Recomputes phase and progress for `now`. Returns a report when the
    /// target cycle count has just been reached.
    pub fn tick(&mut self, now: Instant) -> Option<BreathingReport> {
        if self.status != TimerStatus::Running {
            return None;
        }

        let mut since = now.saturating_duration_since(self.phase_started_at);
        let mut length = self.pattern.duration_of(self.phase);

        if since < length {
            self.progress = (since.as_secs_f64() / length.as_secs_f64()).clamp(0.0, 1.0);
            return None;
        }

        // A late tick may cross several boundaries; walk each one so no
        // cycle edge is skipped.
        while since >= length {
            self.phase_started_at += length;
            since -= length;

            let completed_cycle = self.phase == BreathingPhase::Hold2;
            self.phase = self.phase.next();
            if completed_cycle {
                self.cycle += 1;
                if self.target_cycles.is_some_and(|target| self.cycle >= target) {
                    self.progress = 0.0;
                    return Some(self.finish(EndReason::Completed, now));
                }
            }
            length = self.pattern.duration_of(self.phase);
        }

        // Zero on an exact boundary; otherwise the overshoot into the new phase.
        self.progress = (since.as_secs_f64() / length.as_secs_f64()).clamp(0.0, 1.0);
        None
    }

    /// Manual abort. Elapsed time runs from the start of the exercise,
    /// not from the start of the current phase.
    pub fn abort(&mut self, now: Instant) -> Option<BreathingReport> {
        if self.status != TimerStatus::Running {
            return None;
        }
        Some(self.finish(EndReason::Early, now))
    }

    pub fn phase(&self) -> BreathingPhase {
        self.phase
    }

    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn planned_duration(&self) -> Option<Duration> {
        self.target_cycles
            .map(|cycles| self.pattern.cycle_length() * cycles)
    }

    pub fn snapshot(&self) -> BreathingSnapshot {
        BreathingSnapshot {
            status: self.status,
            phase: self.phase,
            cycle: self.cycle,
            progress: self.progress,
            target_cycles: self.target_cycles,
        }
    }

    fn finish(&mut self, end_reason: EndReason, now: Instant) -> BreathingReport {
        self.status = TimerStatus::Stopped;
        BreathingReport {
            end_reason,
            elapsed: now.saturating_duration_since(self.started_at),
            cycles: self.cycle,
        }
    }
}
