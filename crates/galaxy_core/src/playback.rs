//! Playback controller for stepping through a trace.
//!
//! The controller is a two-state machine (`Playing` / `Paused`) that owns the
//! current step and the single repeating timer. It knows nothing about what a
//! step looks like: it only tells a [`Renderer`] which step to show, and asks a
//! [`Scheduler`] to arm or disarm the timer.
//!
//! # Tick delivery
//!
//! Timer ticks come back to the controller through [`PlaybackController::on_tick`]
//! carrying the [`TimerId`] that produced them. Ticks from a timer that is no
//! longer armed are dropped, so a tick already queued when [`PlaybackController::stop`]
//! ran never renders a frame.
//!
//! # Stepping
//!
//! Steps wrap in both directions: stepping forward from the last turn shows
//! the first, stepping back from the first shows the last.

use std::fmt;
use std::time::Duration;

use crate::error::{GalaxyError, Result};

/// Period between automatic steps when none is configured.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(500);

/// Shows one step of the trace.
///
/// Implementations own their failure handling; nothing is reported back.
pub trait Renderer {
    /// Render the turn at `step`. Always called with `step < len`.
    fn render_step(&mut self, step: usize);
}

impl<F: FnMut(usize)> Renderer for F {
    fn render_step(&mut self, step: usize) {
        self(step);
    }
}

/// Identifier of an armed repeating timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Source of repeating timers.
///
/// Each tick of an armed timer must eventually be delivered to
/// [`PlaybackController::on_tick`] with the id returned by [`Scheduler::arm`].
pub trait Scheduler {
    /// Start a repeating timer firing every `period`.
    fn arm(&mut self, period: Duration) -> TimerId;

    /// Cancel a timer. Unknown ids are ignored.
    fn disarm(&mut self, id: TimerId);
}

/// Whether the timer is driving playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackMode {
    /// Timer armed; every tick advances one step.
    Playing,
    /// Timer disarmed; steps change only on explicit input.
    Paused,
}

/// Observable playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    /// Step currently shown, always in `[0, len)`.
    pub current_step: usize,
    /// Playing or paused.
    pub mode: PlaybackMode,
}

impl PlaybackState {
    /// Whether the timer is driving playback.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        matches!(self.mode, PlaybackMode::Playing)
    }
}

/// Looping playback controller over a trace of `len` steps.
#[derive(Debug)]
pub struct PlaybackController<R, S> {
    len: usize,
    period: Duration,
    state: PlaybackState,
    timer: Option<TimerId>,
    renderer: R,
    scheduler: S,
}

impl<R: Renderer, S: Scheduler> PlaybackController<R, S> {
    /// Create a controller and begin playing.
    ///
    /// Step 0 is rendered immediately and the timer is armed.
    ///
    /// # Errors
    /// Returns [`GalaxyError::EmptyTrace`] if `len` is zero.
    pub fn new(len: usize, period: Duration, renderer: R, scheduler: S) -> Result<Self> {
        let mut controller = Self::paused(len, period, renderer, scheduler)?;
        controller.start();
        Ok(controller)
    }

    /// Create a controller that shows step 0 without arming the timer.
    ///
    /// # Errors
    /// Returns [`GalaxyError::EmptyTrace`] if `len` is zero.
    pub fn paused(len: usize, period: Duration, renderer: R, scheduler: S) -> Result<Self> {
        if len == 0 {
            return Err(GalaxyError::EmptyTrace);
        }

        let mut controller = Self {
            len,
            period,
            state: PlaybackState {
                current_step: 0,
                mode: PlaybackMode::Paused,
            },
            timer: None,
            renderer,
            scheduler,
        };
        controller.renderer.render_step(0);
        Ok(controller)
    }

    /// Begin playing. No-op if already playing.
    pub fn start(&mut self) {
        if self.timer.is_some() {
            return;
        }
        let id = self.scheduler.arm(self.period);
        self.timer = Some(id);
        self.state.mode = PlaybackMode::Playing;
        tracing::debug!(timer = %id, period_ms = self.period.as_millis() as u64, "Playback started");
    }

    /// Pause playback. No-op if already paused.
    pub fn stop(&mut self) {
        let Some(id) = self.timer.take() else {
            return;
        };
        self.scheduler.disarm(id);
        self.state.mode = PlaybackMode::Paused;
        tracing::debug!(timer = %id, step = self.state.current_step, "Playback paused");
    }

    /// Pause if playing, play if paused.
    pub fn toggle(&mut self) {
        match self.state.mode {
            PlaybackMode::Playing => self.stop(),
            PlaybackMode::Paused => self.start(),
        }
    }

    /// Move `delta` steps with wraparound and render the result.
    pub fn advance(&mut self, delta: isize) {
        // Reduce first; a raw `step + delta` overflows near the isize limits.
        let forward = delta.rem_euclid(self.len as isize) as usize;
        self.state.current_step = (self.state.current_step + forward) % self.len;
        self.renderer.render_step(self.state.current_step);
    }

    /// Jump to `step` and render it.
    ///
    /// # Errors
    /// Returns [`GalaxyError::StepOutOfRange`] if `step >= len`; the current
    /// step is left unchanged and nothing is rendered.
    pub fn seek(&mut self, step: usize) -> Result<()> {
        if step >= self.len {
            return Err(GalaxyError::StepOutOfRange {
                step,
                len: self.len,
            });
        }
        self.state.current_step = step;
        self.renderer.render_step(step);
        Ok(())
    }

    /// Deliver a timer tick.
    ///
    /// Returns true if the tick advanced playback; ticks from a timer that is
    /// not the armed one are dropped.
    pub fn on_tick(&mut self, id: TimerId) -> bool {
        if self.timer != Some(id) {
            tracing::trace!(timer = %id, "Dropping tick from inactive timer");
            return false;
        }
        self.advance(1);
        true
    }

    /// Change the tick period, re-arming the timer if playing.
    pub fn set_period(&mut self, period: Duration) {
        self.period = period;
        if let Some(old) = self.timer.take() {
            self.scheduler.disarm(old);
            let id = self.scheduler.arm(period);
            self.timer = Some(id);
            tracing::debug!(timer = %id, period_ms = period.as_millis() as u64, "Timer re-armed");
        }
    }

    /// Current step.
    #[must_use]
    pub const fn current_step(&self) -> usize {
        self.state.current_step
    }

    /// Snapshot of the playback state.
    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether the timer is driving playback.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    /// Number of steps; never zero.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always false; construction rejects empty traces.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Configured tick period.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Id of the armed timer, if playing.
    #[must_use]
    pub const fn active_timer(&self) -> Option<TimerId> {
        self.timer
    }

    /// Position as a percentage (0-100), the last step reading 100.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        if self.len == 1 {
            100.0
        } else {
            (self.state.current_step as f64 / (self.len - 1) as f64) * 100.0
        }
    }

    /// Shared access to the renderer.
    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable access to the renderer.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Shared access to the scheduler.
    #[must_use]
    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Stop playback and hand back the collaborators.
    pub fn into_parts(mut self) -> (R, S) {
        self.stop();
        (self.renderer, self.scheduler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[derive(Debug, Default)]
    struct Frames(Vec<usize>);

    impl Renderer for Frames {
        fn render_step(&mut self, step: usize) {
            self.0.push(step);
        }
    }

    #[derive(Debug, Default)]
    struct Timers {
        next: u64,
        live: BTreeSet<TimerId>,
    }

    impl Scheduler for Timers {
        fn arm(&mut self, _period: Duration) -> TimerId {
            self.next += 1;
            let id = TimerId(self.next);
            self.live.insert(id);
            id
        }

        fn disarm(&mut self, id: TimerId) {
            self.live.remove(&id);
        }
    }

    fn controller(len: usize) -> PlaybackController<Frames, Timers> {
        PlaybackController::new(len, DEFAULT_TICK_PERIOD, Frames::default(), Timers::default())
            .unwrap()
    }

    #[test]
    fn test_empty_trace_rejected() {
        let result =
            PlaybackController::new(0, DEFAULT_TICK_PERIOD, Frames::default(), Timers::default());
        assert_eq!(result.unwrap_err(), GalaxyError::EmptyTrace);
    }

    #[test]
    fn test_new_renders_first_step_and_plays() {
        let c = controller(3);
        assert_eq!(c.renderer().0, vec![0]);
        assert!(c.is_playing());
        assert_eq!(c.scheduler().live.len(), 1);
    }

    #[test]
    fn test_paused_constructor_arms_nothing() {
        let c = PlaybackController::paused(3, DEFAULT_TICK_PERIOD, Frames::default(), Timers::default())
            .unwrap();
        assert!(!c.is_playing());
        assert!(c.scheduler().live.is_empty());
        assert_eq!(c.renderer().0, vec![0]);
    }

    #[test]
    fn test_wraparound_both_directions() {
        let mut c = controller(4);
        c.advance(-1);
        assert_eq!(c.current_step(), 3);
        c.advance(1);
        assert_eq!(c.current_step(), 0);
        c.advance(9);
        assert_eq!(c.current_step(), 1);
        c.advance(-6);
        assert_eq!(c.current_step(), 3);
    }

    #[test]
    fn test_advance_extreme_deltas() {
        let mut c = controller(5);
        c.advance(1);
        // isize::MAX is 2 mod 5
        c.advance(isize::MAX);
        assert_eq!(c.current_step(), 3);
        // isize::MIN is 2 mod 5 as well
        c.advance(isize::MIN);
        assert_eq!(c.current_step(), 0);
        assert_eq!(c.renderer().0, vec![0, 1, 3, 0]);
    }

    #[test]
    fn test_start_twice_keeps_one_timer() {
        let mut c = controller(4);
        c.start();
        c.start();
        assert_eq!(c.scheduler().live.len(), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut c = controller(4);
        c.stop();
        c.stop();
        assert!(!c.is_playing());
        assert!(c.scheduler().live.is_empty());
        assert_eq!(c.active_timer(), None);
    }

    #[test]
    fn test_toggle_involution() {
        let mut c = controller(4);
        let before = (c.state().mode, c.scheduler().live.len());
        c.toggle();
        assert_eq!(c.state().mode, PlaybackMode::Paused);
        c.toggle();
        assert_eq!((c.state().mode, c.scheduler().live.len()), before);
    }

    #[test]
    fn test_seek_out_of_range_leaves_state() {
        let mut c = controller(4);
        c.advance(2);
        let frames = c.renderer().0.len();
        assert_eq!(
            c.seek(4),
            Err(GalaxyError::StepOutOfRange { step: 4, len: 4 })
        );
        assert_eq!(c.current_step(), 2);
        assert_eq!(c.renderer().0.len(), frames);
    }

    #[test]
    fn test_stale_tick_dropped() {
        let mut c = controller(4);
        let id = c.active_timer().unwrap();
        assert!(c.on_tick(id));
        c.stop();
        assert!(!c.on_tick(id));
        assert_eq!(c.renderer().0, vec![0, 1]);
    }

    #[test]
    fn test_set_period_rearms_when_playing() {
        let mut c = controller(4);
        let old = c.active_timer().unwrap();
        c.set_period(Duration::from_millis(250));
        let new = c.active_timer().unwrap();
        assert_ne!(old, new);
        assert_eq!(c.scheduler().live.len(), 1);
        assert!(!c.on_tick(old));
        assert_eq!(c.period(), Duration::from_millis(250));
    }

    #[test]
    fn test_set_period_while_paused_arms_nothing() {
        let mut c = controller(4);
        c.stop();
        c.set_period(Duration::from_millis(100));
        assert!(c.scheduler().live.is_empty());
        c.start();
        assert_eq!(c.scheduler().live.len(), 1);
    }

    #[test]
    fn test_closure_renderer() {
        let mut seen: Vec<usize> = Vec::new();
        {
            let mut c = PlaybackController::paused(
                2,
                DEFAULT_TICK_PERIOD,
                |step: usize| seen.push(step),
                Timers::default(),
            )
            .unwrap();
            c.advance(1);
        }
        assert_eq!(seen, vec![0, 1]);
    }

    #[test]
    fn test_progress_percent() {
        let mut c = controller(5);
        assert!((c.progress_percent() - 0.0).abs() < 0.01);
        c.seek(2).unwrap();
        assert!((c.progress_percent() - 50.0).abs() < 0.01);
        c.seek(4).unwrap();
        assert!((c.progress_percent() - 100.0).abs() < 0.01);
        assert!((controller(1).progress_percent() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_into_parts_disarms() {
        let c = controller(3);
        let (_, timers) = c.into_parts();
        assert!(timers.live.is_empty());
    }
}
