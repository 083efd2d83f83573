//! Foreground rendering state machine.
//!
//! Each `process()` call advances at most one state transition or pushes at
//! most one sample, so the foreground loop stays responsive to commands. The
//! machine waits (without blocking) whenever the step queue is full or no
//! waypoints exist, and consumes frame-swap requests only at frame
//! boundaries so the tick context always drains a complete frame before the
//! next one starts.

use crate::config::Config;
use crate::render::frame::{FrameBuffer, FrameError, FramePair, FrameSelect, Waypoint};
use crate::render::interpolator::Interpolator;
use crate::render::step_queue::StepProducer;
use crate::render::Transition;

/// Renderer state. See `process()` for the transition rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderState {
    /// No waypoints anywhere; waiting for the command layer.
    IdleEmpty,
    /// Active frame has waypoints; about to seed the first transition.
    IdleReady,
    /// Active frame empty but the inactive one is not; waiting for a swap
    /// request to adopt it.
    IdleBufferSwap,
    /// Fetching the next waypoint and preparing its transition.
    GetPoint,
    /// Holding the beam at the transition start while the laser settles.
    Dwell,
    /// Emitting interpolated sub-steps.
    Interpolate,
    /// Walked past the last waypoint; at the frame boundary.
    BufferEnd,
    /// Swap requested and at the boundary; adopting the inactive frame.
    BufferSwap,
    /// Interpolator invariant violated. Recovers to `IdleReady`.
    InterpFault,
    /// Swap produced an empty active frame. Recovers to `IdleEmpty`.
    BufferFault,
}

/// Diagnostic counters. Wait counters reset whenever the wait ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Calls spent idle because no waypoints (or no swap) were available.
    pub point_buf_wait: u16,
    /// Frames re-rendered because no swap request had arrived.
    pub point_buf_repeat: u16,
    /// Calls spent waiting for step-queue space.
    pub step_buf_wait: u16,
    /// Interpolator fault recoveries.
    pub interp_faults: u16,
    /// Buffer fault recoveries.
    pub buffer_faults: u16,
}

/// The foreground rendering engine.
///
/// Owns both waypoint frames, the transition/interpolator pair and the
/// producer port of the step queue. The consumer port never passes through
/// here — the tick context gets it at split time and sees only the queue.
pub struct Renderer<'q> {
    steps: StepProducer<'q>,
    frames: FramePair,
    point_index: usize,
    swap_requested: bool,
    transition: Transition,
    interp: Interpolator,
    dwell: u8,
    state: RenderState,
    stats: RenderStats,
    config: Config,
}

impl<'q> Renderer<'q> {
    pub fn new(steps: StepProducer<'q>, config: Config) -> Self {
        Self {
            steps,
            frames: FramePair::new(),
            point_index: 0,
            swap_requested: false,
            transition: Transition::new(),
            interp: Interpolator::new(),
            dwell: 0,
            state: RenderState::IdleEmpty,
            stats: RenderStats::default(),
            config,
        }
    }

    /// Advance the state machine by one step.
    pub fn process(&mut self) {
        match self.state {
            RenderState::IdleEmpty => {
                if self.frames.active().is_empty() && self.frames.inactive().is_empty() {
                    self.stats.point_buf_wait = self.stats.point_buf_wait.saturating_add(1);
                    return;
                }
                self.state = if self.frames.active().is_empty() {
                    RenderState::IdleBufferSwap
                } else {
                    RenderState::IdleReady
                };
            }

            RenderState::IdleReady => {
                self.point_index = 0;
                // Load waypoint 0 as the end of a seed transition. Nothing is
                // emitted for it; the first interpolated transition runs from
                // waypoint 0 to waypoint 1.
                if self.load_next_transition() {
                    self.state = RenderState::GetPoint;
                } else {
                    self.state = RenderState::BufferFault;
                }
            }

            RenderState::IdleBufferSwap => {
                if !self.swap_requested {
                    self.stats.point_buf_wait = self.stats.point_buf_wait.saturating_add(1);
                    return;
                }
                self.swap_requested = false;
                self.frames.swap();
                self.stats.point_buf_wait = 0;
                self.state = if self.frames.active().is_empty() {
                    RenderState::BufferFault
                } else {
                    RenderState::IdleReady
                };
            }

            RenderState::GetPoint => {
                if !self.load_next_transition() {
                    self.state = RenderState::BufferEnd;
                    return;
                }
                self.interp.init(
                    &self.transition,
                    self.config.max_step_size,
                    self.config.acc_factor,
                    self.config.dec_factor,
                );
                self.dwell = self.dwell_for_transition();
                self.state = if self.dwell > 0 {
                    RenderState::Dwell
                } else {
                    RenderState::Interpolate
                };
            }

            RenderState::Dwell => {
                if self.steps.is_full() {
                    self.stats.step_buf_wait = self.stats.step_buf_wait.saturating_add(1);
                    return;
                }
                self.stats.step_buf_wait = 0;
                // Hold position at the transition start, already asserting
                // the outgoing laser state.
                self.steps
                    .push(self.transition.current, self.transition.current_laser());
                self.dwell -= 1;
                if self.dwell == 0 {
                    self.state = RenderState::Interpolate;
                }
            }

            RenderState::Interpolate => {
                if self.steps.is_full() {
                    self.stats.step_buf_wait = self.stats.step_buf_wait.saturating_add(1);
                    return;
                }
                self.stats.step_buf_wait = 0;
                if self.interp.next_step(&mut self.transition).is_err() {
                    self.state = RenderState::InterpFault;
                    return;
                }
                self.steps
                    .push(self.transition.current, self.transition.current_laser());
                if !self.interp.is_active() {
                    self.state = RenderState::GetPoint;
                }
            }

            RenderState::BufferEnd => {
                self.point_index = 0;
                if self.swap_requested {
                    self.state = RenderState::BufferSwap;
                } else {
                    self.stats.point_buf_repeat = self.stats.point_buf_repeat.saturating_add(1);
                    self.state = RenderState::GetPoint;
                }
            }

            RenderState::BufferSwap => {
                // The request is consumed here either way: a swap to an empty
                // frame is dropped and the current frame repeats.
                self.swap_requested = false;
                if self.frames.inactive().is_empty() {
                    self.stats.point_buf_repeat = self.stats.point_buf_repeat.saturating_add(1);
                } else {
                    self.frames.swap();
                }
                self.state = RenderState::GetPoint;
            }

            RenderState::InterpFault => {
                self.stats.interp_faults = self.stats.interp_faults.saturating_add(1);
                self.interp.clear();
                self.state = RenderState::IdleReady;
            }

            RenderState::BufferFault => {
                self.stats.buffer_faults = self.stats.buffer_faults.saturating_add(1);
                self.state = RenderState::IdleEmpty;
            }
        }
    }

    /// Fetch the waypoint at the walk index as the next transition end.
    /// False at the end of the frame (or with no active waypoints).
    fn load_next_transition(&mut self) -> bool {
        let active = self.frames.active();
        if self.point_index >= active.point_count() {
            return false;
        }
        let Some(waypoint) = active.point(self.point_index) else {
            return false;
        };
        self.transition
            .set_next(waypoint.to_fixed(), waypoint.laser_on());
        self.point_index += 1;
        true
    }

    /// Dwell length for the pending transition: only laser edges dwell, and
    /// on-to-off and off-to-on settle times are configured independently.
    fn dwell_for_transition(&self) -> u8 {
        match (self.transition.start_laser(), self.transition.end_laser()) {
            (true, false) => self.config.laser_off_dwell,
            (false, true) => self.config.laser_on_dwell,
            _ => 0,
        }
    }

    // --- Command-layer surface -------------------------------------------

    /// Request adoption of the inactive frame at the next frame boundary.
    pub fn request_swap(&mut self) {
        self.swap_requested = true;
    }

    pub fn swap_pending(&self) -> bool {
        self.swap_requested
    }

    /// Write a waypoint into the inactive frame.
    pub fn write_point(&mut self, index: usize, point: Waypoint) -> Result<(), FrameError> {
        self.frames.inactive_mut().set_point(index, point)
    }

    /// Set the inactive frame's point count.
    pub fn set_point_count(&mut self, count: usize) -> Result<(), FrameError> {
        self.frames.inactive_mut().set_point_count(count)
    }

    /// Clear a frame. Clearing the active frame abandons the current walk
    /// and returns the machine to idle; queued samples still drain.
    pub fn clear_frame(&mut self, which: FrameSelect) {
        self.frames.buffer_mut(which).clear();
        if which == FrameSelect::Active {
            self.point_index = 0;
            self.dwell = 0;
            self.interp.clear();
            self.state = RenderState::IdleEmpty;
        }
    }

    pub fn frame(&self, which: FrameSelect) -> &FrameBuffer {
        self.frames.buffer(which)
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    /// True when the step queue has no space; the foreground loop can back
    /// off instead of spinning on `process()`.
    pub fn step_queue_full(&self) -> bool {
        self.steps.is_full()
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = RenderStats::default();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }
}
