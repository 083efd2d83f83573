//! Transition sub-stepping.
//!
//! Refines one transition into evenly spaced Q12.4 sub-steps. The step count
//! comes from the Chebyshev distance between the endpoints (ceiling-divided
//! by the configured step size), so the faster axis moves at most one step
//! size per sample and the slower axis scales down proportionally.
//!
//! Optional geometric ramps ease the galvos in and out: an acceleration
//! factor of `n` front-loads sub-steps of `step >> n`, `step >> n-1`, ...
//! in place of the leading full step, and a deceleration factor halves the
//! step repeatedly at the tail. The final sub-step always snaps exactly to
//! the transition end so no rounding error accumulates across a frame.

use crate::config;
use crate::math::fixed::{FixedPoint, FRACT_BITS};
use crate::render::Transition;

/// Interpolator phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterpState {
    /// Initialised, no sub-step produced yet.
    Ready,
    /// Producing the acceleration ramp / leading full step.
    First,
    /// Producing evenly spaced full steps.
    Interpolate,
    /// Producing the deceleration ramp / endpoint snap.
    Last,
    /// Transition complete; stepping again is a fault.
    Finished,
}

/// Stepped a finished interpolator. Should be unreachable from the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepExhausted;

pub struct Interpolator {
    step: FixedPoint,
    current_step: u8,
    total_steps: u8,
    acc_factor: u8,
    dec_factor: u8,
    state: InterpState,
}

impl Interpolator {
    pub const fn new() -> Self {
        Self {
            step: FixedPoint::ZERO,
            current_step: 0,
            total_steps: 0,
            acc_factor: 0,
            dec_factor: 0,
            state: InterpState::Finished,
        }
    }

    /// Reset to the finished state, discarding any transition in progress.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Prepare to sub-step `transition`. Parameters outside their legal
    /// ranges are clamped at entry.
    ///
    /// When the whole move is shorter than one step (or exactly one step),
    /// a single sub-step covers it and the ramps are suppressed.
    pub fn init(&mut self, transition: &Transition, step_size: u8, acc_factor: u8, dec_factor: u8) {
        let step_size = step_size.clamp(config::MIN_STEP_SIZE, config::MAX_STEP_SIZE);
        let step_width = (step_size as u16) << FRACT_BITS;

        self.acc_factor = acc_factor.min(config::MAX_ACC_FACTOR);
        self.dec_factor = dec_factor.min(config::MAX_DEC_FACTOR);
        self.current_step = 0;

        let delta = transition.end - transition.start;
        let max_distance = transition.start.chebyshev(transition.end);

        let total = if max_distance < step_width {
            1
        } else {
            // Ceiling division in 32 bits; the step count is capped at the
            // u8 range the waypoint domain guarantees.
            let wide = (max_distance as u32 + step_width as u32 - 1) / step_width as u32;
            wide.min(u8::MAX as u32) as u16
        };

        if total <= 1 {
            // Degenerate or single-step move: one sub-step of the full delta,
            // ramps suppressed.
            self.total_steps = 1;
            self.step = delta;
            self.acc_factor = 0;
            self.dec_factor = 0;
            self.state = InterpState::Last;
        } else {
            self.total_steps = total as u8;
            self.step = delta.div_steps(self.total_steps);
            self.state = InterpState::First;
        }
    }

    /// Advance `transition.current` by one sub-step.
    ///
    /// Errors only when called past `Finished`; the caller treats that as an
    /// internal fault and reinitialises.
    pub fn next_step(&mut self, transition: &mut Transition) -> Result<(), StepExhausted> {
        match self.state {
            InterpState::Ready | InterpState::First => {
                self.state = InterpState::First;
                if self.acc_factor > 0 {
                    // Ramp-up: each point advances by a fraction of the full
                    // step, halving the shortfall every sample.
                    transition.current += self.step >> self.acc_factor as u32;
                    self.acc_factor -= 1;
                } else {
                    transition.current += self.step;
                    self.current_step = 1;
                    self.state = InterpState::Interpolate;
                }
                Ok(())
            }
            InterpState::Interpolate => {
                if self.current_step < self.total_steps - 1 {
                    transition.current += self.step;
                    self.current_step += 1;
                    Ok(())
                } else {
                    self.state = InterpState::Last;
                    self.last_step(transition)
                }
            }
            InterpState::Last => self.last_step(transition),
            InterpState::Finished => Err(StepExhausted),
        }
    }

    fn last_step(&mut self, transition: &mut Transition) -> Result<(), StepExhausted> {
        if self.dec_factor > 0 {
            // Ramp-down: halve the step in place and creep toward the end.
            self.step >>= 1;
            transition.current += self.step;
            self.dec_factor -= 1;
        } else {
            // Snap exactly onto the endpoint so no rounding error survives.
            transition.current = transition.end;
            self.current_step = self.total_steps;
            self.state = InterpState::Finished;
        }
        Ok(())
    }

    /// True while the current transition still has sub-steps to produce.
    pub fn is_active(&self) -> bool {
        self.state != InterpState::Finished
    }

    pub fn state(&self) -> InterpState {
        self.state
    }

    pub fn current_step(&self) -> u8 {
        self.current_step
    }

    pub fn total_steps(&self) -> u8 {
        self.total_steps
    }

    /// The per-sample delta for the transition being stepped.
    pub fn step(&self) -> FixedPoint {
        self.step
    }
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::new()
    }
}
