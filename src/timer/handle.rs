//! Cancellable scheduled tasks.
//!
//! Every timer in the engine is a [`TimerHandle`] obtained from a
//! [`Scheduler`]. A firing arrives as a [`TimerFired`] message carrying the
//! handle's id; owners compare that id with the handle they hold so a
//! message that was already queued when the handle was cancelled is
//! recognised as stale. Dropping a handle cancels it.

use std::{
    cell::RefCell,
    fmt,
    rc::Rc,
    time::Duration,
};

use tokio::{
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Once,
    Repeating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerFired {
    pub id: TimerId,
}

#[derive(Debug)]
pub struct TimerHandle {
    id: TimerId,
    token: CancellationToken,
}

impl TimerHandle {
    pub fn new(id: TimerId, token: CancellationToken) -> Self {
        Self { id, token }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Shortest period a scheduler arms; shorter requests are raised to it.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

pub trait Scheduler {
    /// Starts a timer whose first firing is one `period` from now.
    fn start(&mut self, period: Duration, cadence: Cadence) -> TimerHandle;
}

/// Spawns one tokio task per timer, delivering firings over a channel.
pub struct TokioScheduler {
    sender: mpsc::UnboundedSender<TimerFired>,
    next_id: u64,
}

impl TokioScheduler {
    pub fn new(sender: mpsc::UnboundedSender<TimerFired>) -> Self {
        Self { sender, next_id: 1 }
    }
}

impl Scheduler for TokioScheduler {
    fn start(&mut self, period: Duration, cadence: Cadence) -> TimerHandle {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let period = period.max(MIN_PERIOD);
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let sender = self.sender.clone();

        tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => {
                        if cancelled.is_cancelled() || sender.send(TimerFired { id }).is_err() {
                            break;
                        }
                        if cadence == Cadence::Once {
                            break;
                        }
                    }
                }
            }
        });

        TimerHandle::new(id, token)
    }
}

#[derive(Debug, Clone)]
pub struct ArmedTimer {
    pub id: TimerId,
    pub period: Duration,
    pub cadence: Cadence,
    token: CancellationToken,
}

impl ArmedTimer {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn fired(&self) -> TimerFired {
        TimerFired { id: self.id }
    }
}

/// Scheduler that only records what was armed. Firings are delivered by
/// hand, which keeps flow tests deterministic.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualInner>>,
}

#[derive(Debug, Default)]
struct ManualInner {
    next_id: u64,
    armed: Vec<ArmedTimer>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timers that were started and not cancelled, oldest first.
    pub fn active(&self) -> Vec<ArmedTimer> {
        self.inner
            .borrow()
            .armed
            .iter()
            .filter(|timer| !timer.is_cancelled())
            .cloned()
            .collect()
    }

    /// Every timer ever started, including cancelled ones.
    pub fn all(&self) -> Vec<ArmedTimer> {
        self.inner.borrow().armed.clone()
    }

    pub fn latest(&self) -> Option<ArmedTimer> {
        self.inner.borrow().armed.last().cloned()
    }
}

impl Scheduler for ManualScheduler {
    fn start(&mut self, period: Duration, cadence: Cadence) -> TimerHandle {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        let id = TimerId(inner.next_id);
        let token = CancellationToken::new();
        inner.armed.push(ArmedTimer {
            id,
            period: period.max(MIN_PERIOD),
            cadence,
            token: token.clone(),
        });
        TimerHandle::new(id, token)
    }
}
