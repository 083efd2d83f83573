//! SPSC queue of pre-computed samples between the renderer and the tick
//! context.
//!
//! 16 slots, 15 usable: heapless keeps one slot permanently empty so that
//! `head == tail` unambiguously means empty without any extra shared state.
//! The producer half lives in the renderer (foreground); the consumer half is
//! handed to the sample-clock tick and sees nothing but the queue.
//!
//! Memory: 16 x 6 bytes per slot. Each slot carries its own laser flag
//! rather than sharing a packed flag word, so neither side ever writes state
//! the other side reads mid-update.

use heapless::spsc::{Consumer, Producer, Queue};

use crate::math::fixed::FixedPoint;

/// Slot count of the step queue. Power of two; usable capacity is one less.
pub const STEP_QUEUE_SLOTS: usize = 16;

/// Samples the queue can actually hold.
pub const STEP_QUEUE_CAPACITY: usize = STEP_QUEUE_SLOTS - 1;

/// One pre-computed output sample: interpolated position plus laser state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepSample {
    pub point: FixedPoint,
    pub laser: bool,
}

/// The statically allocatable step queue. Split once into its two ports.
pub struct StepQueue {
    inner: Queue<StepSample, STEP_QUEUE_SLOTS>,
}

impl StepQueue {
    pub const fn new() -> Self {
        Self {
            inner: Queue::new(),
        }
    }

    /// Split into the producer port (renderer side) and consumer port (tick
    /// side). Call exactly once, before the tick source starts.
    pub fn split(&mut self) -> (StepProducer<'_>, StepConsumer<'_>) {
        let (producer, consumer) = self.inner.split();
        (StepProducer { inner: producer }, StepConsumer { inner: consumer })
    }

    /// Drop all queued samples. Requires exclusive access, so it is only
    /// callable while the queue is unsplit and the consumer cannot exist.
    pub fn clear(&mut self) {
        while self.inner.dequeue().is_some() {}
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }
}

impl Default for StepQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Renderer-side port: push only.
pub struct StepProducer<'a> {
    inner: Producer<'a, StepSample, STEP_QUEUE_SLOTS>,
}

impl StepProducer<'_> {
    /// Push one sample. Returns false (sample dropped) when the queue is
    /// full — the renderer treats that as backpressure, not an error.
    pub fn push(&mut self, point: FixedPoint, laser: bool) -> bool {
        self.inner.enqueue(StepSample { point, laser }).is_ok()
    }

    pub fn is_full(&self) -> bool {
        !self.inner.ready()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Tick-side port: pop only.
pub struct StepConsumer<'a> {
    inner: Consumer<'a, StepSample, STEP_QUEUE_SLOTS>,
}

impl StepConsumer<'_> {
    /// Pop the oldest sample, or `None` when the queue is empty.
    pub fn pop(&mut self) -> Option<StepSample> {
        self.inner.dequeue()
    }

    /// Read the oldest sample without consuming it.
    pub fn peek(&self) -> Option<&StepSample> {
        self.inner.peek()
    }

    pub fn is_empty(&self) -> bool {
        !self.inner.ready()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}
