//! Runtime parameters with validated ranges.
//!
//! Typed fields for the renderer and output stage, plus a generic
//! `get`/`set` pair so a command layer can address parameters by name.
//! Rejected values leave the previous value in effect.

/// Points-per-second limits (upper bound is the 16-bit timer range).
pub const MIN_PPS: u16 = 1;
pub const MAX_PPS: u16 = u16::MAX;
pub const DEFAULT_PPS: u16 = 10_000;

/// Interpolation step size limits, in integer coordinate units.
pub const MIN_STEP_SIZE: u8 = 1;
pub const MAX_STEP_SIZE: u8 = 50;
pub const DEFAULT_STEP_SIZE: u8 = 4;

/// Acceleration/deceleration ramp factors (right-shift amounts).
pub const MAX_ACC_FACTOR: u8 = 7;
pub const MAX_DEC_FACTOR: u8 = 7;
pub const DEFAULT_ACC_FACTOR: u8 = 0;
pub const DEFAULT_DEC_FACTOR: u8 = 0;

/// Laser settle dwell limits, in samples.
pub const MIN_DWELL: u8 = 1;
pub const MAX_DWELL: u8 = u8::MAX;
pub const DEFAULT_DWELL: u8 = 10;

/// Default DAC channel command bytes (channel A / channel B).
pub const DEFAULT_CHANNEL_A: u8 = 0x10;
pub const DEFAULT_CHANNEL_B: u8 = 0x90;

/// Parameter names for generic access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Param {
    Pps,
    StepSize,
    AccFactor,
    DecFactor,
    DwellOn,
    DwellOff,
    FlipX,
    FlipY,
    SwapXy,
}

impl Param {
    /// Parse a parameter name as used by the command protocol.
    pub fn parse(name: &str) -> Option<Self> {
        let param = if name.eq_ignore_ascii_case("pps") {
            Self::Pps
        } else if name.eq_ignore_ascii_case("step-size") {
            Self::StepSize
        } else if name.eq_ignore_ascii_case("acc") {
            Self::AccFactor
        } else if name.eq_ignore_ascii_case("dec") {
            Self::DecFactor
        } else if name.eq_ignore_ascii_case("dwell-on") {
            Self::DwellOn
        } else if name.eq_ignore_ascii_case("dwell-off") {
            Self::DwellOff
        } else if name.eq_ignore_ascii_case("flip-x") {
            Self::FlipX
        } else if name.eq_ignore_ascii_case("flip-y") {
            Self::FlipY
        } else if name.eq_ignore_ascii_case("swap-xy") {
            Self::SwapXy
        } else {
            return None;
        };
        Some(param)
    }

    /// The protocol name of this parameter.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pps => "pps",
            Self::StepSize => "step-size",
            Self::AccFactor => "acc",
            Self::DecFactor => "dec",
            Self::DwellOn => "dwell-on",
            Self::DwellOff => "dwell-off",
            Self::FlipX => "flip-x",
            Self::FlipY => "flip-y",
            Self::SwapXy => "swap-xy",
        }
    }
}

/// Rejected configuration write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    OutOfRange(Param),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Sample rate in points per second.
    pub pps: u16,
    /// Maximum interpolation step size, integer coordinate units.
    pub max_step_size: u8,
    /// Acceleration ramp factor (0 = no ramp).
    pub acc_factor: u8,
    /// Deceleration ramp factor (0 = no ramp).
    pub dec_factor: u8,
    /// Samples to dwell when the laser turns on.
    pub laser_on_dwell: u8,
    /// Samples to dwell when the laser turns off.
    pub laser_off_dwell: u8,
    /// Mirror the X axis before DAC emission.
    pub flip_x: bool,
    /// Mirror the Y axis before DAC emission.
    pub flip_y: bool,
    /// Exchange the axes before DAC emission (applied before the flips).
    pub swap_xy: bool,
    /// DAC channel A command byte.
    pub channel_a: u8,
    /// DAC channel B command byte.
    pub channel_b: u8,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            pps: DEFAULT_PPS,
            max_step_size: DEFAULT_STEP_SIZE,
            acc_factor: DEFAULT_ACC_FACTOR,
            dec_factor: DEFAULT_DEC_FACTOR,
            laser_on_dwell: DEFAULT_DWELL,
            laser_off_dwell: DEFAULT_DWELL,
            flip_x: false,
            flip_y: false,
            swap_xy: false,
            channel_a: DEFAULT_CHANNEL_A,
            channel_b: DEFAULT_CHANNEL_B,
        }
    }

    /// Read a parameter. Booleans read as 0/1.
    pub fn get(&self, param: Param) -> u16 {
        match param {
            Param::Pps => self.pps,
            Param::StepSize => self.max_step_size as u16,
            Param::AccFactor => self.acc_factor as u16,
            Param::DecFactor => self.dec_factor as u16,
            Param::DwellOn => self.laser_on_dwell as u16,
            Param::DwellOff => self.laser_off_dwell as u16,
            Param::FlipX => self.flip_x as u16,
            Param::FlipY => self.flip_y as u16,
            Param::SwapXy => self.swap_xy as u16,
        }
    }

    /// Write a parameter, validating its range. On rejection the previous
    /// value is unchanged.
    pub fn set(&mut self, param: Param, value: u16) -> Result<(), ConfigError> {
        let reject = ConfigError::OutOfRange(param);
        match param {
            Param::Pps => {
                if value < MIN_PPS {
                    return Err(reject);
                }
                self.pps = value;
            }
            Param::StepSize => {
                if value < MIN_STEP_SIZE as u16 || value > MAX_STEP_SIZE as u16 {
                    return Err(reject);
                }
                self.max_step_size = value as u8;
            }
            Param::AccFactor => {
                if value > MAX_ACC_FACTOR as u16 {
                    return Err(reject);
                }
                self.acc_factor = value as u8;
            }
            Param::DecFactor => {
                if value > MAX_DEC_FACTOR as u16 {
                    return Err(reject);
                }
                self.dec_factor = value as u8;
            }
            Param::DwellOn => {
                if value < MIN_DWELL as u16 || value > MAX_DWELL as u16 {
                    return Err(reject);
                }
                self.laser_on_dwell = value as u8;
            }
            Param::DwellOff => {
                if value < MIN_DWELL as u16 || value > MAX_DWELL as u16 {
                    return Err(reject);
                }
                self.laser_off_dwell = value as u8;
            }
            Param::FlipX => self.flip_x = bool_param(value).ok_or(reject)?,
            Param::FlipY => self.flip_y = bool_param(value).ok_or(reject)?,
            Param::SwapXy => self.swap_xy = bool_param(value).ok_or(reject)?,
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn bool_param(value: u16) -> Option<bool> {
    match value {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}
