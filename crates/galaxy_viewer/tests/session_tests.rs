//! End-to-end viewer sessions.
//!
//! Real interval timers on a paused tokio clock, ASCII frames written to an
//! in-memory buffer, and commands fed through an in-memory pipe.

use std::sync::Arc;
use std::time::Duration;

use galaxy_core::playback::PlaybackController;
use galaxy_test_utils::fixtures::skirmish_trace;
use galaxy_viewer::{
    run_session, AsciiConfig, AsciiRenderer, IntervalScheduler, SessionSummary,
};
use tokio::io::{AsyncWriteExt, BufReader};

fn plain_config() -> AsciiConfig {
    AsciiConfig {
        width: 40,
        height: 10,
        use_color: false,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_plays_until_paused_then_quits() {
    let trace = Arc::new(skirmish_trace());
    let (scheduler, mut ticks) = IntervalScheduler::new();
    let renderer = AsciiRenderer::new(Arc::clone(&trace), plain_config(), Vec::new());
    let mut controller = PlaybackController::new(
        trace.len(),
        Duration::from_millis(500),
        renderer,
        scheduler,
    )
    .unwrap();

    let (mut commands, input) = tokio::io::duplex(64);
    let typist = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1600)).await;
        commands.write_all(b"p\n").await.unwrap();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        commands.write_all(b"q\n").await.unwrap();
        commands
    });

    let summary = run_session(&mut controller, &mut ticks, BufReader::new(input)).await;
    drop(typist.await.unwrap());

    assert_eq!(
        summary,
        SessionSummary {
            ticks_applied: 3,
            inputs_applied: 1,
            inputs_rejected: 0,
            final_step: 3,
        }
    );
    assert!(!controller.is_playing());
    assert_eq!(controller.scheduler().active_timers(), 0);

    let (renderer, _) = controller.into_parts();
    assert_eq!(renderer.frames_written(), 4);
    let output = String::from_utf8(renderer.into_inner()).unwrap();
    assert!(output.contains("Step: 1/4"));
    assert!(output.contains("Step: 4/4"));
    assert!(!output.contains("Step: 5/4"));
}

#[tokio::test(start_paused = true)]
async fn test_wraps_back_to_first_turn() {
    let trace = Arc::new(skirmish_trace());
    let (scheduler, mut ticks) = IntervalScheduler::new();
    let renderer = AsciiRenderer::new(Arc::clone(&trace), plain_config(), Vec::new());
    let mut controller = PlaybackController::new(
        trace.len(),
        Duration::from_millis(100),
        renderer,
        scheduler,
    )
    .unwrap();

    let (mut commands, input) = tokio::io::duplex(64);
    let typist = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(450)).await;
        commands.write_all(b"quit\n").await.unwrap();
        commands
    });

    let summary = run_session(&mut controller, &mut ticks, BufReader::new(input)).await;
    drop(typist.await.unwrap());

    // Four ticks over four turns lands back on the first one.
    assert_eq!(summary.ticks_applied, 4);
    assert_eq!(summary.final_step, 0);
}

#[tokio::test(start_paused = true)]
async fn test_paused_session_steps_and_seeks() {
    let trace = Arc::new(skirmish_trace());
    let (scheduler, mut ticks) = IntervalScheduler::new();
    let renderer = AsciiRenderer::new(Arc::clone(&trace), plain_config(), Vec::new());
    let mut controller = PlaybackController::paused(
        trace.len(),
        Duration::from_millis(500),
        renderer,
        scheduler,
    )
    .unwrap();

    let input = &b"b\nseek 1\nseek 40\nnope\nlast\n"[..];
    let summary = run_session(&mut controller, &mut ticks, input).await;

    assert_eq!(summary.ticks_applied, 0);
    assert_eq!(summary.inputs_applied, 3);
    assert_eq!(summary.inputs_rejected, 2);
    assert_eq!(summary.final_step, 3);

    let (renderer, _) = controller.into_parts();
    // Initial frame plus one per applied move.
    assert_eq!(renderer.frames_written(), 4);
    let output = String::from_utf8(renderer.into_inner()).unwrap();
    assert!(output.contains("Galaxy: skirmish"));
    assert!(output.contains("Step: 2/4"));
    assert_eq!(output.matches("Step: 4/4").count(), 2);
}
