//! Sample clock thread: the PC stand-in for the hardware timer interrupt.
//!
//! A dedicated thread pops one sample per tick and forwards it to the
//! simulated DAC and laser gate, pacing itself against a monotonic deadline
//! so rate error does not accumulate. The `SampleClock` handle implements
//! the `SampleTimer` trait; rate and run state changes take effect on the
//! next tick.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pico_galvo_core::config::Config;
use pico_galvo_core::dac::DacDriver;
use pico_galvo_core::fault::FaultFlag;
use pico_galvo_core::output::emit_next_sample;
use pico_galvo_core::render::step_queue::StepConsumer;
use pico_galvo_hal::SampleTimer;

use crate::transport;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Sleep period while the clock is disabled.
const DISABLED_POLL: Duration = Duration::from_millis(1);

/// Rejected sample clock configuration.
#[derive(Debug)]
pub enum ClockError {
    PpsOutOfRange,
}

/// Handle to the clock thread. Dropping it leaves the thread running; it
/// ends with the process.
pub struct SampleClock {
    period_ns: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
}

impl SampleClock {
    /// Spawn the consumer thread. The thread owns the queue's consumer port
    /// and the output drivers; nothing else ever touches them.
    pub fn spawn(
        steps: StepConsumer<'static>,
        faults: &'static FaultFlag,
        config: Config,
        csv_path: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let period_ns = Arc::new(AtomicU64::new(NANOS_PER_SEC / u64::from(config.pps.max(1))));
        let running = Arc::new(AtomicBool::new(false));

        let thread_period = period_ns.clone();
        let thread_running = running.clone();

        // Probe the CSV path here so failures surface before the thread starts.
        if let Some(path) = &csv_path {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    anyhow::bail!("sample output directory {} does not exist", parent.display());
                }
            }
        }

        thread::Builder::new()
            .name("sample-clock".into())
            .spawn(move || {
                let (dac_bus, mut laser) = match transport::sample_sink(csv_path.as_deref()) {
                    Ok(pair) => pair,
                    Err(err) => {
                        log::error!("sample sink setup failed: {err}");
                        return;
                    }
                };
                let mut dac = DacDriver::from_config(dac_bus, &config);
                let mut steps = steps;

                let mut next_tick = Instant::now();
                loop {
                    if !thread_running.load(Ordering::Relaxed) {
                        thread::sleep(DISABLED_POLL);
                        next_tick = Instant::now();
                        continue;
                    }

                    emit_next_sample(&mut steps, &mut dac, &mut laser, faults);

                    next_tick += Duration::from_nanos(thread_period.load(Ordering::Relaxed));
                    let now = Instant::now();
                    if next_tick > now {
                        thread::sleep(next_tick - now);
                    } else {
                        // Fell behind (scheduler hiccup); rebase rather than
                        // bursting to catch up.
                        next_tick = now;
                    }
                }
            })?;

        Ok(Self { period_ns, running })
    }
}

impl SampleTimer for SampleClock {
    type Error = ClockError;

    fn set_pps(&mut self, pps: u16) -> Result<(), Self::Error> {
        if pps == 0 {
            return Err(ClockError::PpsOutOfRange);
        }
        self.period_ns
            .store(NANOS_PER_SEC / u64::from(pps), Ordering::Relaxed);
        Ok(())
    }

    fn enable(&mut self) {
        self.running.store(true, Ordering::Relaxed);
    }

    fn disable(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}
