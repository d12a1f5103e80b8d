//! Edge timestamper: the interrupt-side half of a sensor channel.
//!
//! One `EdgeTimestamper` lives in a `static` per sensor pin. The edge
//! interrupt calls [`EdgeTimestamper::on_edge`]; the sensor claims the
//! channel and consumes its [`TimingBuffer`].
//!
//! # Rules
//!
//! - `on_edge` does no floating point, no allocation, no logging
//! - `on_edge` uses no read-modify-write atomics (plain load/store only)
//! - One channel per pin, one sensor per channel (see [`claim`](EdgeTimestamper::claim))

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::pulse::PulseRecord;
use crate::timing::{TimingBuffer, DEFAULT_BUFFER_LENGTH};

/// Interrupt-side state of one sensor channel.
///
/// # Usage
///
/// ```ignore
/// static CHANNEL: EdgeTimestamper = EdgeTimestamper::new();
///
/// // In the GPIO any-edge ISR:
/// CHANNEL.on_edge(gpio_is_high(), clock_now());
/// ```
pub struct EdgeTimestamper<const N: usize = DEFAULT_BUFFER_LENGTH> {
    buffer: TimingBuffer<N>,

    // Producer-only
    rise: AtomicU32,
    armed: AtomicBool,
    orphan_edges: AtomicU32,

    // Consumer-side flags
    claimed: AtomicBool,
    updating: AtomicBool,
}

impl<const N: usize> EdgeTimestamper<N> {
    /// Create an idle channel.
    pub const fn new() -> Self {
        Self {
            buffer: TimingBuffer::new(),
            rise: AtomicU32::new(0),
            armed: AtomicBool::new(false),
            orphan_edges: AtomicU32::new(0),
            claimed: AtomicBool::new(false),
            updating: AtomicBool::new(false),
        }
    }

    /// Record one transition of the sensor line (interrupt context).
    ///
    /// * `level_high` - line level after the transition
    /// * `now` - monotonic timestamp in ticks of the configured time base
    ///
    /// A rising edge remembers `now` as the pulse start. A falling edge
    /// closes the pulse and publishes it. A falling edge with no rising edge
    /// before it (line already high at startup) is counted and dropped.
    ///
    /// # Timing
    ///
    /// O(1), a handful of loads and stores. Never blocks.
    #[inline]
    pub fn on_edge(&self, level_high: bool, now: u32) {
        if level_high {
            self.rise.store(now, Ordering::Relaxed);
            self.armed.store(true, Ordering::Relaxed);
        } else if self.armed.load(Ordering::Relaxed) {
            self.armed.store(false, Ordering::Relaxed);
            let start = self.rise.load(Ordering::Relaxed);
            self.buffer.publish(PulseRecord::new(start, now));
        } else {
            let orphans = self.orphan_edges.load(Ordering::Relaxed);
            self.orphan_edges.store(orphans.wrapping_add(1), Ordering::Relaxed);
        }
    }

    /// The pulse ring fed by this channel.
    #[inline]
    pub fn buffer(&self) -> &TimingBuffer<N> {
        &self.buffer
    }

    /// Falling edges seen without a preceding rising edge.
    #[inline]
    pub fn orphan_edges(&self) -> u32 {
        self.orphan_edges.load(Ordering::Relaxed)
    }

    /// Claim the consumer side of this channel.
    ///
    /// Returns `false` if another sensor already owns it.
    #[inline]
    pub fn claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::AcqRel)
    }

    /// Release the consumer side (sensor dropped).
    #[inline]
    pub fn release(&self) {
        self.claimed.store(false, Ordering::Release);
    }

    /// Check if a sensor currently owns this channel.
    #[inline]
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    /// True while the owning sensor is inside `process_pulses()`.
    #[inline]
    pub fn is_updating(&self) -> bool {
        self.updating.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn set_updating(&self, updating: bool) {
        self.updating.store(updating, Ordering::Release);
    }
}

impl<const N: usize> Default for EdgeTimestamper<N> {
    fn default() -> Self {
        Self::new()
    }
}
