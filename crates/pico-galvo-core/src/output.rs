//! The sample-clock tick body.
//!
//! Runs in the consumer context (timer interrupt on hardware, clock thread
//! on the PC). It must not allocate, log, block or call back into the
//! renderer; it sees only the queue's consumer port, the output drivers and
//! the fault mailbox.

use pico_galvo_hal::{DacTransport, LaserGate};

use crate::dac::DacDriver;
use crate::fault::{FaultCode, FaultFlag};
use crate::render::step_queue::StepConsumer;

/// Emit the next pre-computed sample to the DAC and laser gate.
///
/// On an empty queue the outputs are left unchanged (galvos park at their
/// last position) and an underrun fault is raised for the foreground to
/// report. Transport failures likewise surface as a fault code; the tick
/// never retries.
pub fn emit_next_sample<T, L>(
    steps: &mut StepConsumer<'_>,
    dac: &mut DacDriver<T>,
    laser: &mut L,
    faults: &FaultFlag,
) where
    T: DacTransport,
    L: LaserGate,
{
    let Some(sample) = steps.pop() else {
        faults.raise(FaultCode::StepUnderrun);
        return;
    };

    if dac.write_sample(sample.point).is_err() {
        faults.raise(FaultCode::DacTransfer);
        return;
    }
    laser.set(sample.laser);
}
