//! Interactive viewer session.
//!
//! Binds user input lines and timer ticks to one playback controller. Both
//! sources are multiplexed on the current task, so the controller is only
//! ever touched from one place.

use std::io::ErrorKind;

use galaxy_core::playback::{PlaybackController, Renderer, Scheduler};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::{MAX_TICK_PERIOD, MIN_TICK_PERIOD};
use crate::controls::{ControlInput, HELP_TEXT};
use crate::scheduler::TickReceiver;

/// What happened to one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// The controller acted on it.
    Applied,
    /// The input was refused; the message says why.
    Rejected(String),
    /// The user asked for the command list.
    Help,
    /// The user asked to leave.
    Quit,
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Timer ticks that advanced playback.
    pub ticks_applied: u64,
    /// Inputs the controller acted on.
    pub inputs_applied: u64,
    /// Inputs that failed to parse or were refused.
    pub inputs_rejected: u64,
    /// Step shown when the session ended.
    pub final_step: usize,
}

/// Apply one parsed input to the controller.
///
/// Single steps are refused while playing, matching the disabled step
/// buttons of a running player.
pub fn apply_input<R: Renderer, S: Scheduler>(
    controller: &mut PlaybackController<R, S>,
    input: ControlInput,
) -> InputOutcome {
    match input {
        ControlInput::Toggle => controller.toggle(),
        ControlInput::Next | ControlInput::Previous if controller.is_playing() => {
            return InputOutcome::Rejected("pause playback before stepping".to_string());
        }
        ControlInput::Next => controller.advance(1),
        ControlInput::Previous => controller.advance(-1),
        ControlInput::Seek(step) => {
            if let Err(e) = controller.seek(step) {
                return InputOutcome::Rejected(e.to_string());
            }
        }
        ControlInput::First => {
            if let Err(e) = controller.seek(0) {
                return InputOutcome::Rejected(e.to_string());
            }
        }
        ControlInput::Last => {
            if let Err(e) = controller.seek(controller.len() - 1) {
                return InputOutcome::Rejected(e.to_string());
            }
        }
        ControlInput::Faster => {
            let period = (controller.period() / 2).max(MIN_TICK_PERIOD);
            controller.set_period(period);
        }
        ControlInput::Slower => {
            let period = controller
                .period()
                .saturating_mul(2)
                .min(MAX_TICK_PERIOD);
            controller.set_period(period);
        }
        ControlInput::Help => return InputOutcome::Help,
        ControlInput::Quit => return InputOutcome::Quit,
    }
    InputOutcome::Applied
}

enum Flow {
    Continue,
    Stop,
}

fn handle_line<R: Renderer, S: Scheduler>(
    controller: &mut PlaybackController<R, S>,
    line: &str,
    summary: &mut SessionSummary,
) -> Flow {
    let input = match ControlInput::parse_line(line) {
        Ok(Some(input)) => input,
        Ok(None) => return Flow::Continue,
        Err(e) => {
            summary.inputs_rejected += 1;
            tracing::warn!(input = line.trim(), "{e}");
            return Flow::Continue;
        }
    };

    match apply_input(controller, input) {
        InputOutcome::Applied => {
            summary.inputs_applied += 1;
            tracing::debug!(
                %input,
                step = controller.current_step(),
                playing = controller.is_playing(),
                period_ms = controller.period().as_millis() as u64,
                "Input applied"
            );
        }
        InputOutcome::Rejected(reason) => {
            summary.inputs_rejected += 1;
            tracing::warn!(%input, "Input rejected: {reason}");
        }
        InputOutcome::Help => eprintln!("{HELP_TEXT}"),
        InputOutcome::Quit => return Flow::Stop,
    }
    Flow::Continue
}

/// Run a session until `quit` or end of input.
///
/// Ticks arriving on `ticks` are handed to the controller; lines read from
/// `input` are parsed as [`ControlInput`]s.
pub async fn run_session<R, S, I>(
    controller: &mut PlaybackController<R, S>,
    ticks: &mut TickReceiver,
    input: I,
) -> SessionSummary
where
    R: Renderer,
    S: Scheduler,
    I: AsyncBufRead + Unpin,
{
    let mut summary = SessionSummary::default();
    let mut lines = input.lines();

    tracing::info!(
        steps = controller.len(),
        playing = controller.is_playing(),
        "Session started"
    );

    loop {
        tokio::select! {
            Some(id) = ticks.recv() => {
                if controller.on_tick(id) {
                    summary.ticks_applied += 1;
                }
            }
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if let Flow::Stop = handle_line(controller, &line, &mut summary) {
                            break;
                        }
                    }
                    Ok(None) => {
                        tracing::debug!("Input closed");
                        break;
                    }
                    Err(e) if e.kind() == ErrorKind::InvalidData => {
                        summary.inputs_rejected += 1;
                        tracing::warn!(error = %e, "Skipping unreadable input line");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read input");
                        break;
                    }
                }
            }
        }
    }

    controller.stop();
    summary.final_step = controller.current_step();
    tracing::info!(
        final_step = summary.final_step,
        progress_pct = controller.progress_percent(),
        ticks = summary.ticks_applied,
        inputs = summary.inputs_applied,
        rejected = summary.inputs_rejected,
        "Session ended"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use galaxy_core::playback::DEFAULT_TICK_PERIOD;
    use galaxy_test_utils::{ManualScheduler, RecordingRenderer};

    fn paused(len: usize) -> PlaybackController<RecordingRenderer, ManualScheduler> {
        PlaybackController::paused(
            len,
            DEFAULT_TICK_PERIOD,
            RecordingRenderer::new(),
            ManualScheduler::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_steps_refused_while_playing() {
        let mut controller = paused(4);
        controller.start();
        assert!(matches!(
            apply_input(&mut controller, ControlInput::Next),
            InputOutcome::Rejected(_)
        ));
        assert_eq!(controller.current_step(), 0);
    }

    #[test]
    fn test_steps_when_paused() {
        let mut controller = paused(4);
        assert_eq!(apply_input(&mut controller, ControlInput::Previous), InputOutcome::Applied);
        assert_eq!(controller.current_step(), 3);
        assert_eq!(apply_input(&mut controller, ControlInput::Next), InputOutcome::Applied);
        assert_eq!(controller.current_step(), 0);
    }

    #[test]
    fn test_seek_bounds_reported() {
        let mut controller = paused(4);
        let outcome = apply_input(&mut controller, ControlInput::Seek(4));
        assert_eq!(
            outcome,
            InputOutcome::Rejected("Step 4 is out of range for a trace of 4 turns".to_string())
        );
        assert_eq!(apply_input(&mut controller, ControlInput::Last), InputOutcome::Applied);
        assert_eq!(controller.current_step(), 3);
        assert_eq!(apply_input(&mut controller, ControlInput::First), InputOutcome::Applied);
        assert_eq!(controller.current_step(), 0);
    }

    #[test]
    fn test_speed_limits() {
        let mut controller = paused(4);
        for _ in 0..10 {
            apply_input(&mut controller, ControlInput::Faster);
        }
        assert_eq!(controller.period(), MIN_TICK_PERIOD);
        for _ in 0..10 {
            apply_input(&mut controller, ControlInput::Slower);
        }
        assert_eq!(controller.period(), MAX_TICK_PERIOD);
    }

    #[test]
    fn test_speed_change_keeps_one_timer() {
        let mut controller = paused(4);
        controller.start();
        apply_input(&mut controller, ControlInput::Faster);
        assert_eq!(controller.scheduler().active_count(), 1);
        assert_eq!(
            controller.scheduler().armed_periods(),
            &[DEFAULT_TICK_PERIOD, Duration::from_millis(250)]
        );
    }

    #[test]
    fn test_toggle_and_quit() {
        let mut controller = paused(4);
        assert_eq!(apply_input(&mut controller, ControlInput::Toggle), InputOutcome::Applied);
        assert!(controller.is_playing());
        assert_eq!(apply_input(&mut controller, ControlInput::Help), InputOutcome::Help);
        assert_eq!(apply_input(&mut controller, ControlInput::Quit), InputOutcome::Quit);
    }

    #[tokio::test]
    async fn test_session_counts_inputs() {
        let mut controller = paused(5);
        let (_tx, mut ticks) = tokio::sync::mpsc::unbounded_channel();
        let input = &b"n\nn\n\nseek 9\nwarp\nq\nn\n"[..];

        let summary = run_session(&mut controller, &mut ticks, input).await;

        assert_eq!(
            summary,
            SessionSummary {
                ticks_applied: 0,
                inputs_applied: 2,
                inputs_rejected: 2,
                final_step: 2,
            }
        );
        assert_eq!(controller.renderer().frames(), &[0, 1, 2]);
    }

    #[tokio::test]
    async fn test_session_skips_non_utf8_line() {
        let mut controller = paused(5);
        let (_tx, mut ticks) = tokio::sync::mpsc::unbounded_channel();
        let input = &b"n\n\xff\xfe\nn\n"[..];

        let summary = run_session(&mut controller, &mut ticks, input).await;

        assert_eq!(summary.inputs_applied, 2);
        assert_eq!(summary.inputs_rejected, 1);
        assert_eq!(summary.final_step, 2);
    }

    #[tokio::test]
    async fn test_session_ends_on_eof_and_stops_timer() {
        let mut controller = paused(3);
        let (_tx, mut ticks) = tokio::sync::mpsc::unbounded_channel();

        let summary = run_session(&mut controller, &mut ticks, &b"p\n"[..]).await;

        assert_eq!(summary.inputs_applied, 1);
        assert!(!controller.is_playing());
        assert_eq!(controller.scheduler().active_count(), 0);
    }

}
