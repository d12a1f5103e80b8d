//! Lock-free SPSC (Single Producer, Single Consumer) pulse timing buffer.
//!
//! The only state shared between the edge interrupt and the poll loop.
//!
//! # Architecture
//!
//! ```text
//! Edge ISR ──publish()──▶ TimingBuffer ──latest()/pop()──▶ poll loop
//!                         (lock-free)
//!                         (lossy on overrun)
//! ```
//!
//! # Rules
//!
//! - Only the producer writes `write_idx`, only the consumer writes `read_idx`
//! - The producer never reads `read_idx`: it never waits, it overwrites
//! - `read_idx != write_idx` is the sole "data available" condition
//! - Indices are free-running `u32`; N divides 2^32 so masking needs no branch
//! - Each slot carries a sequence stamp: odd = record published, even = being
//!   written. Readers accept a copy only if the stamp is odd, matches the
//!   index they asked for, and is unchanged after the copy

use core::cell::UnsafeCell;
use core::sync::atomic::{fence, AtomicU32, Ordering};

use crate::pulse::PulseRecord;

/// Default buffer length: 8 pulses.
///
/// A lighthouse emits at most two pulses (sync + beam) per 8.33ms rotation
/// per station, so 8 covers several rotations of consumer latency.
pub const DEFAULT_BUFFER_LENGTH: usize = 8;

/// Lock-free SPSC ring of completed pulses.
///
/// # Safety
///
/// This type uses `UnsafeCell` internally but is safe to use because:
/// - Single producer (the edge interrupt), enforced by `EdgeTimestamper`
/// - Single consumer (the sensor), enforced by the channel claim
/// - A slot's stamp is marked "writing" before its payload is touched and
///   set to "published" after, so a copy that overlaps a producer write
///   (interrupt on the same core, or a producer on another core) is
///   discarded, never returned
///
/// # Memory Ordering
///
/// - Producer: stamp store, `Release` fence, payload, `Release` stamp store,
///   `Release` store of `write_idx`
/// - Consumer: `Acquire` stamp load, payload copy, `Acquire` fence, stamp
///   re-load
pub struct TimingBuffer<const N: usize = DEFAULT_BUFFER_LENGTH> {
    /// Ring buffer of pulses.
    slots: UnsafeCell<[PulseRecord; N]>,

    /// Per-slot sequence stamp (see [`published_stamp`]).
    stamps: [AtomicU32; N],

    /// Next slot the producer writes (free-running, wraps via mask).
    write_idx: AtomicU32,

    /// Next slot the consumer reads (free-running, wraps via mask).
    read_idx: AtomicU32,

    /// Records passed over by the consumer (overrun or newest-only reads).
    dropped: AtomicU32,
}

// SAFETY: Single producer, single consumer, atomic index coordination.
// Slot payloads are single-writer and validated on read.
unsafe impl<const N: usize> Sync for TimingBuffer<N> {}
unsafe impl<const N: usize> Send for TimingBuffer<N> {}

impl<const N: usize> TimingBuffer<N> {
    /// Mask for wrapping index to buffer size.
    const MASK: usize = N - 1;

    /// Create a new empty buffer.
    ///
    /// # Panics
    ///
    /// Panics at compile time if N is not a power of 2.
    pub const fn new() -> Self {
        assert!(N.is_power_of_two(), "Timing buffer length must be power of 2");
        assert!(N <= (1 << 31), "Timing buffer length must fit the index range");

        Self {
            slots: UnsafeCell::new([PulseRecord::EMPTY; N]),
            stamps: [const { AtomicU32::new(0) }; N],
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Publish a completed pulse (producer only).
    ///
    /// # Timing
    ///
    /// O(1): one slot write and a few plain atomic stores, no
    /// read-modify-write. Never blocks, never allocates, never waits for
    /// the consumer.
    #[inline]
    pub fn publish(&self, record: PulseRecord) {
        // Producer owns write_idx, a plain load is enough.
        let idx = self.write_idx.load(Ordering::Relaxed);
        let slot = (idx as usize) & Self::MASK;
        let stamp = &self.stamps[slot];

        stamp.store(writing_stamp(idx), Ordering::Relaxed);
        fence(Ordering::Release);

        // SAFETY: Single producer. Readers racing on this slot see the
        // "writing" stamp before or after their copy and reject it.
        unsafe {
            let base = self.slots.get().cast::<PulseRecord>();
            base.add(slot).write_volatile(record);
        }

        stamp.store(published_stamp(idx), Ordering::Release);
        self.write_idx.store(idx.wrapping_add(1), Ordering::Release);
    }

    /// Read the record at the given free-running index without consuming.
    ///
    /// Returns `None` if:
    /// - Index is at or ahead of write head (not yet written)
    /// - Index is too far behind (overwritten)
    /// - The producer rewrote the slot before or during the copy
    #[inline]
    pub fn read(&self, idx: u32) -> Option<PulseRecord> {
        let write = self.write_idx.load(Ordering::Acquire);
        let behind = write.wrapping_sub(idx);

        if behind == 0 || behind > N as u32 {
            return None;
        }

        let slot = (idx as usize) & Self::MASK;
        let stamp = &self.stamps[slot];
        let expected = published_stamp(idx);

        if stamp.load(Ordering::Acquire) != expected {
            return None;
        }

        // SAFETY: Slot index is masked into range. A concurrent producer
        // write to this slot changes the stamp, detected below.
        let record = unsafe {
            let base = self.slots.get().cast::<PulseRecord>();
            base.add(slot).read_volatile()
        };

        fence(Ordering::Acquire);
        if stamp.load(Ordering::Relaxed) != expected {
            // Rewritten while copying
            return None;
        }

        Some(record)
    }

    /// Take the most recently completed record, discarding older unread ones.
    ///
    /// Advances `read_idx` to the write head observed on entry. Passed-over
    /// records are added to [`dropped`](Self::dropped).
    #[inline]
    pub fn latest(&self) -> Option<PulseRecord> {
        let write = self.write_idx.load(Ordering::Acquire);
        let read = self.read_idx.load(Ordering::Relaxed);

        if read == write {
            return None;
        }

        let newest = write.wrapping_sub(1);
        let passed = newest.wrapping_sub(read);
        let record = self.read(newest);

        let lost = if record.is_some() { passed } else { passed.wrapping_add(1) };
        if lost > 0 {
            self.dropped.fetch_add(lost, Ordering::Relaxed);
        }

        self.read_idx.store(write, Ordering::Release);
        record
    }

    /// Take the oldest unread record (FIFO).
    ///
    /// If the consumer has been lapped, skips forward to the oldest record
    /// still in the ring. Returns `None` when caught up, or when the slot was
    /// lapped during the copy (the index still advances; call again).
    #[inline]
    pub fn pop(&self) -> Option<PulseRecord> {
        let write = self.write_idx.load(Ordering::Acquire);
        let mut read = self.read_idx.load(Ordering::Relaxed);

        if read == write {
            return None;
        }

        let behind = write.wrapping_sub(read);
        if behind > N as u32 {
            self.dropped.fetch_add(behind - N as u32, Ordering::Relaxed);
            read = write.wrapping_sub(N as u32);
        }

        let record = self.read(read);
        if record.is_none() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        record
    }

    /// Get the current write head index.
    #[inline]
    pub fn write_head(&self) -> u32 {
        self.write_idx.load(Ordering::Acquire)
    }

    /// Get the current read head index.
    #[inline]
    pub fn read_head(&self) -> u32 {
        self.read_idx.load(Ordering::Acquire)
    }

    /// Check if unread records are waiting.
    #[inline]
    pub fn has_data(&self) -> bool {
        self.read_head() != self.write_head()
    }

    /// How many records the consumer is behind the producer.
    #[inline]
    pub fn lag(&self) -> u32 {
        self.write_head().wrapping_sub(self.read_head())
    }

    /// Check if the consumer has been lapped (unread records overwritten).
    #[inline]
    pub fn is_overrun(&self) -> bool {
        self.lag() > N as u32
    }

    /// Get count of records the consumer passed over.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Get the buffer capacity.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }
}

/// Stamp of a slot holding the published record `idx` (always odd).
#[inline]
const fn published_stamp(idx: u32) -> u32 {
    idx.wrapping_mul(2).wrapping_add(1)
}

/// Stamp of a slot the producer is filling with record `idx` (always even).
#[inline]
const fn writing_stamp(idx: u32) -> u32 {
    idx.wrapping_mul(2)
}

impl<const N: usize> Default for TimingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
