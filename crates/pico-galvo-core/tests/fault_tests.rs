//! Fault mailbox tests, including the tick-context emit path end to end.

use std::cell::RefCell;
use std::rc::Rc;

use pico_galvo_core::dac::DacDriver;
use pico_galvo_core::fault::{FaultCode, FaultFlag};
use pico_galvo_core::math::fixed::FixedPoint;
use pico_galvo_core::output::emit_next_sample;
use pico_galvo_core::render::step_queue::StepQueue;
use pico_galvo_hal::{DacTransport, LaserGate};

#[derive(Clone, Default)]
struct RecordingDac {
    frames: Rc<RefCell<Vec<u16>>>,
    fail: Rc<RefCell<bool>>,
}

#[derive(Debug)]
struct DacDown;

impl DacTransport for RecordingDac {
    type Error = DacDown;

    fn write_frame(&mut self, frame: u16) -> Result<(), Self::Error> {
        if *self.fail.borrow() {
            return Err(DacDown);
        }
        self.frames.borrow_mut().push(frame);
        Ok(())
    }
}

#[derive(Clone, Default)]
struct RecordingLaser {
    states: Rc<RefCell<Vec<bool>>>,
}

impl LaserGate for RecordingLaser {
    fn set(&mut self, on: bool) {
        self.states.borrow_mut().push(on);
    }
}

#[test]
fn raise_take_round_trip() {
    let flag = FaultFlag::new();
    assert!(!flag.is_raised());
    assert_eq!(flag.take(), None);

    flag.raise(FaultCode::StepUnderrun);
    assert!(flag.is_raised());
    assert_eq!(flag.take(), Some(FaultCode::StepUnderrun));

    // Taking consumes the fault.
    assert!(!flag.is_raised());
    assert_eq!(flag.take(), None);
}

#[test]
fn later_fault_overwrites_the_code() {
    let flag = FaultFlag::new();
    flag.raise(FaultCode::StepUnderrun);
    flag.raise(FaultCode::DacTransfer);
    assert_eq!(flag.take(), Some(FaultCode::DacTransfer));
}

#[test]
fn emit_forwards_point_and_laser() {
    let queue = Box::leak(Box::new(StepQueue::new()));
    let (mut producer, mut consumer) = queue.split();
    let faults = FaultFlag::new();

    let bus = RecordingDac::default();
    let laser = RecordingLaser::default();
    let mut dac = DacDriver::new(bus.clone());
    let mut gate = laser.clone();

    producer.push(FixedPoint::new(0x640, 0x120), true);
    emit_next_sample(&mut consumer, &mut dac, &mut gate, &faults);

    assert_eq!(bus.frames.borrow().as_slice(), &[0x1064, 0x9012]);
    assert_eq!(laser.states.borrow().as_slice(), &[true]);
    assert_eq!(faults.take(), None);
}

#[test]
fn underrun_raises_a_fault_and_leaves_outputs_alone() {
    let queue = Box::leak(Box::new(StepQueue::new()));
    let (_producer, mut consumer) = queue.split();
    let faults = FaultFlag::new();

    let bus = RecordingDac::default();
    let laser = RecordingLaser::default();
    let mut dac = DacDriver::new(bus.clone());
    let mut gate = laser.clone();

    emit_next_sample(&mut consumer, &mut dac, &mut gate, &faults);

    assert_eq!(faults.take(), Some(FaultCode::StepUnderrun));
    assert!(bus.frames.borrow().is_empty(), "DAC must hold its last value");
    assert!(laser.states.borrow().is_empty(), "laser must be unchanged");
}

#[test]
fn transport_failure_raises_a_fault_and_skips_the_laser() {
    let queue = Box::leak(Box::new(StepQueue::new()));
    let (mut producer, mut consumer) = queue.split();
    let faults = FaultFlag::new();

    let bus = RecordingDac::default();
    *bus.fail.borrow_mut() = true;
    let laser = RecordingLaser::default();
    let mut dac = DacDriver::new(bus.clone());
    let mut gate = laser.clone();

    producer.push(FixedPoint::ZERO, true);
    emit_next_sample(&mut consumer, &mut dac, &mut gate, &faults);

    assert_eq!(faults.take(), Some(FaultCode::DacTransfer));
    assert!(laser.states.borrow().is_empty());
}
