//! In-memory stand-ins for the controller's renderer and scheduler.

use std::collections::BTreeSet;
use std::time::Duration;

use galaxy_core::playback::{PlaybackController, Renderer, Scheduler, TimerId};

/// Renderer that records every step it is asked to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingRenderer {
    frames: Vec<usize>,
}

impl RecordingRenderer {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps rendered so far, oldest first.
    #[must_use]
    pub fn frames(&self) -> &[usize] {
        &self.frames
    }

    /// Forget recorded frames.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn render_step(&mut self, step: usize) {
        self.frames.push(step);
    }
}

/// Scheduler whose timers only fire when a test says so.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    next_id: u64,
    live: BTreeSet<TimerId>,
    periods: Vec<Duration>,
}

impl ManualScheduler {
    /// Create a scheduler with no timers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of armed timers.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.live.len()
    }

    /// Ids of armed timers.
    #[must_use]
    pub fn live_timers(&self) -> Vec<TimerId> {
        self.live.iter().copied().collect()
    }

    /// Period of every `arm` call, in order.
    #[must_use]
    pub fn armed_periods(&self) -> &[Duration] {
        &self.periods
    }
}

impl Scheduler for ManualScheduler {
    fn arm(&mut self, period: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.live.insert(id);
        self.periods.push(period);
        tracing::trace!(timer = %id, "Manual timer armed");
        id
    }

    fn disarm(&mut self, id: TimerId) {
        self.live.remove(&id);
        tracing::trace!(timer = %id, "Manual timer disarmed");
    }
}

/// Controller wired to the recording collaborators.
pub type TestController = PlaybackController<RecordingRenderer, ManualScheduler>;

/// Fire every armed timer once, returning how many ticks advanced playback.
pub fn fire_timers(controller: &mut TestController) -> usize {
    let timers = controller.scheduler().live_timers();
    timers
        .into_iter()
        .filter(|id| controller.on_tick(*id))
        .count()
}

/// Fire the armed timers `n` times.
pub fn tick_n(controller: &mut TestController, n: usize) {
    for _ in 0..n {
        fire_timers(controller);
    }
}
