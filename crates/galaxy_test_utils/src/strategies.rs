//! Property-based testing strategies for playback.

use proptest::prelude::*;

use crate::collaborators::{fire_timers, TestController};

/// One externally driven playback operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOp {
    /// `advance(delta)`.
    Advance(isize),
    /// `seek(step)`; may be out of range.
    Seek(usize),
    /// `start()`.
    Start,
    /// `stop()`.
    Stop,
    /// `toggle()`.
    Toggle,
    /// Fire every armed timer once.
    Tick,
}

/// Apply an operation, ignoring out-of-range seek errors.
pub fn apply_op(controller: &mut TestController, op: PlaybackOp) {
    match op {
        PlaybackOp::Advance(delta) => controller.advance(delta),
        PlaybackOp::Seek(step) => {
            let _ = controller.seek(step);
        }
        PlaybackOp::Start => controller.start(),
        PlaybackOp::Stop => controller.stop(),
        PlaybackOp::Toggle => controller.toggle(),
        PlaybackOp::Tick => {
            fire_timers(controller);
        }
    }
}

/// Trace lengths, biased towards the small sizes where wraparound bites.
pub fn arb_trace_len() -> impl Strategy<Value = usize> {
    prop_oneof![3 => 1usize..=4, 1 => 5usize..=500]
}

/// A single operation with deltas and seek targets around typical lengths,
/// plus deltas at the isize extremes.
pub fn arb_op() -> impl Strategy<Value = PlaybackOp> {
    prop_oneof![
        (-1000isize..=1000).prop_map(PlaybackOp::Advance),
        (-1isize..=1).prop_map(PlaybackOp::Advance),
        prop_oneof![Just(isize::MIN), Just(isize::MAX), any::<isize>()]
            .prop_map(PlaybackOp::Advance),
        (0usize..600).prop_map(PlaybackOp::Seek),
        Just(PlaybackOp::Start),
        Just(PlaybackOp::Stop),
        Just(PlaybackOp::Toggle),
        Just(PlaybackOp::Tick),
    ]
}

/// Sequences of operations.
pub fn arb_ops(max_len: usize) -> impl Strategy<Value = Vec<PlaybackOp>> {
    proptest::collection::vec(arb_op(), 0..max_len)
}
