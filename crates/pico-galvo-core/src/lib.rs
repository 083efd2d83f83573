//! Real-time rendering core for a two-axis laser galvanometer controller.
//!
//! Connects an asynchronous producer (commands writing waypoint frames) to a
//! strict real-time consumer (the sample-clock tick emitting to the DACs):
//! double-buffered waypoint frames are interpolated into Q12.4 sub-steps and
//! pushed through a lock-free SPSC step queue that the tick context drains at
//! the configured points-per-second rate.
//!
//! The crate is `no_std` and allocation-free; platform crates supply the DAC,
//! laser gate and sample clock behind the `pico-galvo-hal` traits.

#![no_std]

pub mod config;
pub mod dac;
pub mod fault;
pub mod math;
pub mod output;
pub mod render;

pub use config::{Config, ConfigError, Param};
pub use dac::DacDriver;
pub use fault::{FaultCode, FaultFlag};
pub use math::fixed::FixedPoint;
pub use render::renderer::{Renderer, RenderState, RenderStats};
pub use render::step_queue::{StepConsumer, StepProducer, StepQueue, StepSample};
