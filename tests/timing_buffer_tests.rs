//! Timing buffer tests

use lighthouse_sensor::{PulseRecord, TimingBuffer};

fn pulse(start: u32) -> PulseRecord {
    PulseRecord::new(start, start + 10)
}

#[test]
fn test_buffer_empty() {
    let buf: TimingBuffer<8> = TimingBuffer::new();
    assert!(!buf.has_data());
    assert_eq!(buf.lag(), 0);
    assert_eq!(buf.latest(), None);
    assert_eq!(buf.pop(), None);
}

#[test]
fn test_latest_returns_newest_once() {
    let buf: TimingBuffer<8> = TimingBuffer::new();

    buf.publish(pulse(100));
    buf.publish(pulse(200));

    assert_eq!(buf.latest(), Some(pulse(200)));
    assert_eq!(buf.latest(), None);
    assert_eq!(buf.dropped(), 1);
}

#[test]
fn test_wrap_around_many_laps() {
    let buf: TimingBuffer<4> = TimingBuffer::new();

    // Consumer keeps up across many laps of the ring
    for i in 0..100u32 {
        buf.publish(pulse(i * 1_000));
        assert_eq!(buf.pop(), Some(pulse(i * 1_000)));
    }

    assert_eq!(buf.dropped(), 0);
    assert!(!buf.has_data());
}

#[test]
fn test_exactly_full_ring_still_readable() {
    let buf: TimingBuffer<4> = TimingBuffer::new();

    for i in 0..4 {
        buf.publish(pulse(i));
    }

    assert!(buf.has_data());
    assert!(!buf.is_overrun());
    for i in 0..4 {
        assert_eq!(buf.pop(), Some(pulse(i)));
    }
    assert_eq!(buf.dropped(), 0);
}

#[test]
fn test_overrun_skips_to_oldest_surviving() {
    let buf: TimingBuffer<4> = TimingBuffer::new();

    for i in 0..6 {
        buf.publish(pulse(i));
    }
    assert!(buf.is_overrun());

    // 0 and 1 were overwritten
    assert_eq!(buf.pop(), Some(pulse(2)));
    assert_eq!(buf.dropped(), 2);
    assert_eq!(buf.pop(), Some(pulse(3)));
    assert_eq!(buf.pop(), Some(pulse(4)));
    assert_eq!(buf.pop(), Some(pulse(5)));
    assert_eq!(buf.pop(), None);
}

#[test]
fn test_read_does_not_consume() {
    let buf: TimingBuffer<4> = TimingBuffer::new();
    buf.publish(pulse(7));

    assert_eq!(buf.read(0), Some(pulse(7)));
    assert_eq!(buf.read(0), Some(pulse(7)));
    assert_eq!(buf.read(1), None);
    assert_eq!(buf.read_head(), 0);
}

#[test]
fn test_timestamps_near_rollover() {
    let buf: TimingBuffer<4> = TimingBuffer::new();

    // Timestamps near rollover are stored untouched
    let start = u32::MAX - 3;
    let record = PulseRecord::new(start, start.wrapping_add(8));
    buf.publish(record);

    let got = buf.latest().unwrap();
    assert_eq!(got, record);
    assert_eq!(got.length(), 8);
}

#[test]
fn test_spsc_threads_latest_is_monotonic() {
    use std::sync::Arc;
    use std::thread;

    let buf = Arc::new(TimingBuffer::<8>::new());
    let producer = {
        let buf = Arc::clone(&buf);
        thread::spawn(move || {
            for i in 1..=20_000u32 {
                buf.publish(PulseRecord::new(i, i + 5));
            }
        })
    };

    let mut last = 0u32;
    let mut seen = 0u32;
    while !producer.is_finished() || buf.has_data() {
        if let Some(record) = buf.latest() {
            // Every record read is whole and newer than the previous one
            assert_eq!(record.length(), 5);
            assert!(record.start > last, "{} after {}", record.start, last);
            last = record.start;
            seen += 1;
        }
    }
    producer.join().unwrap();

    assert_eq!(last, 20_000);
    assert_eq!(seen + buf.dropped(), 20_000);
}

#[test]
fn test_spsc_threads_pop_in_order() {
    use std::sync::Arc;
    use std::thread;

    let buf = Arc::new(TimingBuffer::<16>::new());
    let producer = {
        let buf = Arc::clone(&buf);
        thread::spawn(move || {
            for i in 1..=20_000u32 {
                buf.publish(PulseRecord::new(i, i + 5));
            }
        })
    };

    let mut last = 0u32;
    while !producer.is_finished() || buf.has_data() {
        if let Some(record) = buf.pop() {
            assert_eq!(record.length(), 5);
            assert!(record.start > last);
            last = record.start;
        }
    }
    producer.join().unwrap();

    assert_eq!(last, 20_000);
}
