#![no_std]

/// Abstracts the two-channel DAC bus over any SPI implementation.
///
/// One call transfers one 16-bit frame (command nibble + 12-bit value).
/// Implementations handle CS assertion per frame internally.
pub trait DacTransport {
    type Error: core::fmt::Debug;

    /// Transfer a single 16-bit frame to the DAC, toggling CS around it.
    fn write_frame(&mut self, frame: u16) -> Result<(), Self::Error>;
}

/// Abstracts the laser gate output.
///
/// Called once per emitted sample from the tick context, so implementations
/// must be non-blocking.
pub trait LaserGate {
    /// Drive the gate: `true` = beam on.
    fn set(&mut self, on: bool);
}

/// Abstracts the fixed-rate sample clock driving the output stage.
///
/// Implementations fire their tick (interrupt or thread wakeup) at the
/// configured points-per-second rate.
pub trait SampleTimer {
    type Error: core::fmt::Debug;

    /// Reconfigure the tick rate. Rates the hardware cannot achieve are
    /// reported as an error and leave the previous rate in effect.
    fn set_pps(&mut self, pps: u16) -> Result<(), Self::Error>;

    /// Start delivering ticks.
    fn enable(&mut self);

    /// Stop delivering ticks. Outputs hold their last state.
    fn disable(&mut self);
}
