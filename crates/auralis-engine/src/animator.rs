//! Spatial animation.
//!
//! The animator is a recurring frame task with a single outstanding token.
//! Each step recomputes every branch position from the elapsed time since
//! the animation origin, so irregular frame spacing never accumulates error.
//!
//! ```text
//!         start (enabled, branches, running)
//!   Idle ────────────────────────────────▶ Scheduled(frame)
//!    ▲                                        │
//!    │  cancel / precondition lost            │ step(frame) ─┐
//!    └────────────────────────────────────────┘              │
//!                                             ▲  reschedule  │
//!                                             └──────────────┘
//! ```

use auralis_core::ParamKey;
use auralis_io::{AudioContext, ContextState, FrameId, FrameScheduler};

use crate::branch::BranchSet;

/// Animator state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnimatorState {
    /// No frame pending.
    #[default]
    Idle,
    /// Waiting for this frame.
    Scheduled(FrameId),
}

/// Result of delivering a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The frame was not the scheduled one and was ignored.
    Stale,
    /// Positions were written.
    Stepped {
        /// Whether another frame was requested.
        rescheduled: bool,
    },
}

/// Drives the orbit of every live branch.
#[derive(Debug, Default)]
pub struct SpatialAnimator {
    state: AnimatorState,
    origin: Option<f64>,
}

impl SpatialAnimator {
    /// Creates an idle animator with no origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> AnimatorState {
        self.state
    }

    /// Context time the animation started at, if started.
    pub fn origin(&self) -> Option<f64> {
        self.origin
    }

    /// Returns `true` if a frame is pending.
    pub fn is_scheduled(&self) -> bool {
        matches!(self.state, AnimatorState::Scheduled(_))
    }

    /// Requests the first frame if the animation can run.
    ///
    /// Needs a running context and a non-empty branch set. Keeps an existing
    /// origin so a rebuilt set continues the same motion. Returns whether a
    /// frame is pending afterwards.
    pub fn start(
        &mut self,
        scheduler: &mut dyn FrameScheduler,
        context_state: ContextState,
        now: f64,
        branches: &BranchSet,
    ) -> bool {
        if self.is_scheduled() {
            return true;
        }
        if context_state != ContextState::Running || branches.is_empty() {
            tracing::debug!(state = %context_state, branches = branches.len(), "animation not started");
            return false;
        }
        let origin = *self.origin.get_or_insert(now);
        let frame = scheduler.request_frame();
        self.state = AnimatorState::Scheduled(frame);
        tracing::debug!(%frame, origin, "animation started");
        true
    }

    /// Handles a delivered frame.
    ///
    /// Writes bass positions and voice pans at the context clock, then
    /// requests the next frame while `enabled`, the set is non-empty and the
    /// context runs.
    pub fn step<C: AudioContext + ?Sized>(
        &mut self,
        frame: FrameId,
        ctx: &mut C,
        branches: &BranchSet,
        scheduler: &mut dyn FrameScheduler,
        enabled: bool,
    ) -> StepOutcome {
        if self.state != AnimatorState::Scheduled(frame) {
            tracing::trace!(%frame, "stale frame ignored");
            return StepOutcome::Stale;
        }
        self.state = AnimatorState::Idle;

        let now = ctx.current_time();
        let elapsed = now - *self.origin.get_or_insert(now);
        for branch in branches.iter() {
            let orbit = branch.layout.frame_at(elapsed);
            let [x, y, z] = orbit.bass_position;
            for (param, value) in [
                (ParamKey::PositionX, x),
                (ParamKey::PositionY, y),
                (ParamKey::PositionZ, z),
            ] {
                if let Err(e) = ctx.schedule_param(branch.bass_panner, param, value, now) {
                    tracing::debug!(index = branch.layout.index, %param, error = %e, "position update failed");
                }
            }
            if let Err(e) = ctx.schedule_param(branch.voice_panner, ParamKey::Pan, orbit.voice_pan, now) {
                tracing::debug!(index = branch.layout.index, error = %e, "pan update failed");
            }
        }

        let rescheduled = enabled && !branches.is_empty() && ctx.state() == ContextState::Running;
        if rescheduled {
            self.state = AnimatorState::Scheduled(scheduler.request_frame());
        }
        StepOutcome::Stepped { rescheduled }
    }

    /// Cancels the pending frame, keeping the origin.
    pub fn cancel(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let AnimatorState::Scheduled(frame) = std::mem::take(&mut self.state) {
            scheduler.cancel_frame(frame);
            tracing::trace!(%frame, "animation frame cancelled");
        }
    }

    /// Cancels the pending frame and forgets the origin.
    pub fn reset(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.cancel(scheduler);
        self.origin = None;
    }
}
