//! Tokio-backed repeating timers.
//!
//! Each armed timer is a task that sleeps on a [`tokio::time::Interval`] and
//! sends its [`TimerId`] down a channel on every tick. The session task owns
//! the receiving end and hands ids to the controller, so all playback state
//! stays on one task.

use std::collections::HashMap;
use std::time::Duration;

use galaxy_core::playback::{Scheduler, TimerId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Receiving end for timer ticks.
pub type TickReceiver = mpsc::UnboundedReceiver<TimerId>;

/// Scheduler spawning one interval task per armed timer.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct IntervalScheduler {
    next_id: u64,
    ticks: mpsc::UnboundedSender<TimerId>,
    tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl IntervalScheduler {
    /// Create a scheduler and the channel its ticks arrive on.
    #[must_use]
    pub fn new() -> (Self, TickReceiver) {
        let (ticks, receiver) = mpsc::unbounded_channel();
        let scheduler = Self {
            next_id: 0,
            ticks,
            tasks: HashMap::new(),
        };
        (scheduler, receiver)
    }

    /// Number of timers currently armed.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.tasks.len()
    }
}

impl Scheduler for IntervalScheduler {
    fn arm(&mut self, period: Duration) -> TimerId {
        // Interval panics on a zero period.
        let period = period.max(Duration::from_millis(1));
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let ticks = self.ticks.clone();

        let task = tokio::spawn(async move {
            // First tick one full period from now, not immediately.
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if ticks.send(id).is_err() {
                    break;
                }
            }
        });

        self.tasks.insert(id, task);
        tracing::trace!(timer = %id, period_ms = period.as_millis() as u64, "Interval armed");
        id
    }

    fn disarm(&mut self, id: TimerId) {
        if let Some(task) = self.tasks.remove(&id) {
            task.abort();
            tracing::trace!(timer = %id, "Interval disarmed");
        }
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}
