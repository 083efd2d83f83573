//! Lock-free error channel out of the tick context.
//!
//! The tick handler may not log, allocate or block, so it reports problems
//! by raising a flag + code pair that the foreground loop polls, maps to a
//! diagnostic and clears. A second fault before the first is taken simply
//! overwrites the code; fault kinds here are coarse enough that losing an
//! intermediate one does not matter.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// What went wrong in the tick context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// Tick fired with an empty step queue; outputs were left unchanged.
    StepUnderrun = 1,
    /// DAC transport rejected a frame transfer.
    DacTransfer = 2,
}

impl FaultCode {
    fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Self::StepUnderrun),
            2 => Some(Self::DacTransfer),
            _ => None,
        }
    }

    /// Human-readable diagnostic for the foreground log.
    pub fn describe(self) -> &'static str {
        match self {
            Self::StepUnderrun => "step queue underrun: tick found no sample",
            Self::DacTransfer => "DAC frame transfer failed",
        }
    }
}

/// One-slot fault mailbox, const-constructible for placement in a `static`.
pub struct FaultFlag {
    raised: AtomicBool,
    code: AtomicU8,
}

impl FaultFlag {
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
            code: AtomicU8::new(0),
        }
    }

    /// Record a fault. Tick-safe: two atomic stores, no waiting.
    pub fn raise(&self, code: FaultCode) {
        self.code.store(code as u8, Ordering::Relaxed);
        self.raised.store(true, Ordering::Release);
    }

    /// Consume the pending fault, if any. Called from the foreground loop.
    pub fn take(&self) -> Option<FaultCode> {
        if self.raised.swap(false, Ordering::Acquire) {
            FaultCode::from_raw(self.code.load(Ordering::Relaxed))
        } else {
            None
        }
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Relaxed)
    }
}

impl Default for FaultFlag {
    fn default() -> Self {
        Self::new()
    }
}
