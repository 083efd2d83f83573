//! Step queue contract tests: FIFO order, bounded capacity, and the
//! producer/consumer split under a real second thread.

use pico_galvo_core::math::fixed::FixedPoint;
use pico_galvo_core::render::step_queue::{StepQueue, STEP_QUEUE_CAPACITY, STEP_QUEUE_SLOTS};

fn leaked_queue() -> &'static mut StepQueue {
    Box::leak(Box::new(StepQueue::new()))
}

#[test]
fn slots_leave_one_empty() {
    assert_eq!(STEP_QUEUE_CAPACITY, STEP_QUEUE_SLOTS - 1);
}

#[test]
fn pops_return_pushes_in_order() {
    let queue = leaked_queue();
    let (mut producer, mut consumer) = queue.split();

    for i in 0..10i16 {
        assert!(producer.push(FixedPoint::new(i, -i), i % 2 == 0));
    }

    for i in 0..10i16 {
        let sample = consumer.pop().expect("sample should be queued");
        assert_eq!(sample.point, FixedPoint::new(i, -i));
        assert_eq!(sample.laser, i % 2 == 0);
    }
    assert!(consumer.pop().is_none());
}

#[test]
fn full_queue_rejects_push_until_a_pop() {
    let queue = leaked_queue();
    let (mut producer, mut consumer) = queue.split();

    for i in 0..STEP_QUEUE_CAPACITY {
        assert!(
            producer.push(FixedPoint::new(i as i16, 0), false),
            "push {i} should fit"
        );
    }
    assert!(producer.is_full());
    assert!(!producer.push(FixedPoint::new(99, 99), true), "16th push must be rejected");
    assert_eq!(producer.len(), STEP_QUEUE_CAPACITY);

    // One pop frees exactly one slot.
    assert_eq!(consumer.pop().unwrap().point, FixedPoint::new(0, 0));
    assert!(!producer.is_full());
    assert!(producer.push(FixedPoint::new(99, 99), true));
    assert!(producer.is_full());
}

#[test]
fn empty_queue_rejects_pop() {
    let queue = leaked_queue();
    let (mut producer, mut consumer) = queue.split();

    assert!(consumer.is_empty());
    assert!(consumer.pop().is_none());
    assert!(consumer.peek().is_none());

    producer.push(FixedPoint::new(1, 2), true);
    assert!(!consumer.is_empty());
}

#[test]
fn peek_does_not_consume() {
    let queue = leaked_queue();
    let (mut producer, mut consumer) = queue.split();

    producer.push(FixedPoint::new(7, 8), true);
    producer.push(FixedPoint::new(9, 10), false);

    let peeked = *consumer.peek().unwrap();
    assert_eq!(peeked.point, FixedPoint::new(7, 8));
    assert!(peeked.laser);
    assert_eq!(consumer.len(), 2);

    assert_eq!(consumer.pop().unwrap(), peeked);
    assert_eq!(consumer.peek().unwrap().point, FixedPoint::new(9, 10));
}

#[test]
fn clear_resets_an_unsplit_queue() {
    let mut queue = StepQueue::new();
    {
        let (mut producer, _consumer) = queue.split();
        producer.push(FixedPoint::new(1, 1), true);
        producer.push(FixedPoint::new(2, 2), false);
    }
    assert_eq!(queue.len(), 2);
    queue.clear();
    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);
}

#[test]
fn len_tracks_push_and_pop() {
    let queue = leaked_queue();
    let (mut producer, mut consumer) = queue.split();

    for i in 0..5i16 {
        producer.push(FixedPoint::new(i, i), false);
    }
    assert_eq!(producer.len(), 5);
    assert_eq!(consumer.len(), 5);

    consumer.pop();
    consumer.pop();
    assert_eq!(consumer.len(), 3);
}

#[test]
fn order_survives_a_real_producer_thread() {
    const SAMPLES: i16 = 2000;

    let queue = leaked_queue();
    let (mut producer, mut consumer) = queue.split();

    let handle = std::thread::spawn(move || {
        for i in 0..SAMPLES {
            // Spin on backpressure the same way the renderer waits.
            while !producer.push(FixedPoint::new(i, i.wrapping_mul(3)), i % 5 == 0) {
                std::thread::yield_now();
            }
        }
    });

    let mut expected = 0i16;
    while expected < SAMPLES {
        if let Some(sample) = consumer.pop() {
            assert_eq!(sample.point, FixedPoint::new(expected, expected.wrapping_mul(3)));
            assert_eq!(sample.laser, expected % 5 == 0);
            expected += 1;
        } else {
            std::thread::yield_now();
        }
    }

    handle.join().unwrap();
    assert!(consumer.pop().is_none());
}
