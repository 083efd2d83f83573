//! Sample clock on TIMER0 alarm 0.
//!
//! The alarm interrupt is the consumer tick. Its period lives in an atomic
//! so the foreground can retune PPS without touching the alarm itself; the
//! handler picks the new period up when it reschedules.

use core::sync::atomic::{AtomicU32, Ordering};

use pico_galvo_hal::SampleTimer;
use rp235x_hal as hal;

/// Tick period in microseconds, read by the alarm handler on reschedule.
pub static TICK_PERIOD_US: AtomicU32 = AtomicU32::new(100);

/// Rejected sample clock configuration.
#[derive(Debug, defmt::Format)]
pub enum TimerError {
    PpsOutOfRange,
}

/// `SampleTimer` over the alarm interrupt: rate via the shared period,
/// enable/disable via the NVIC.
pub struct TickClock;

impl SampleTimer for TickClock {
    type Error = TimerError;

    fn set_pps(&mut self, pps: u16) -> Result<(), Self::Error> {
        if pps == 0 {
            return Err(TimerError::PpsOutOfRange);
        }
        let period_us = (1_000_000u32 / pps as u32).max(1);
        TICK_PERIOD_US.store(period_us, Ordering::Relaxed);
        Ok(())
    }

    fn enable(&mut self) {
        unsafe { cortex_m::peripheral::NVIC::unmask(hal::pac::Interrupt::TIMER0_IRQ_0) };
    }

    fn disable(&mut self) {
        cortex_m::peripheral::NVIC::mask(hal::pac::Interrupt::TIMER0_IRQ_0);
    }
}
