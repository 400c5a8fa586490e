pub mod breathing;
pub mod clock;
pub mod handle;
pub mod state;
pub mod training;

pub use breathing::{BreathingPattern, BreathingPhase, BreathingReport, PacedBreathingTimer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use handle::{
    Cadence, ManualScheduler, Scheduler, TimerFired, TimerHandle, TimerId, TokioScheduler,
    MIN_PERIOD,
};
pub use state::{BreathingSnapshot, TimerError, TimerStatus, TrainingReport, TrainingSnapshot};
pub use training::{ActiveTrainingTimer, TRAINING_TICK};
