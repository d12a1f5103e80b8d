//! Module: pulse
//!
//! Purpose: Value types for one observed high pulse on the photodiode line
//! and for the result of classifying it.
//!
//! Architecture:
//! - PulseRecord is written whole by the edge timestamper, read-only after
//! - Timestamps are raw ticks of the configured time base (see config::TimeBase)
//! - All arithmetic on timestamps is wrapping (counters roll over)
//!
//! Safety: Safe. No unsafe blocks. Copy types only.

/// One completed high pulse on the sensor line.
///
/// Size: 8 bytes.
///
/// Memory layout:
/// ```text
/// [start:4][end:4] = 8 bytes
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PulseRecord {
    /// Timestamp of the rising edge, in ticks.
    pub start: u32,

    /// Timestamp of the falling edge, in ticks.
    pub end: u32,
}

impl PulseRecord {
    /// Record with both timestamps zero. Used to initialise ring slots.
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    /// Create a record from rising and falling edge timestamps.
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Pulse duration in ticks.
    ///
    /// Wrapping: a pulse straddling a counter rollover still measures correctly.
    #[inline]
    pub const fn length(&self) -> u32 {
        self.end.wrapping_sub(self.start)
    }
}

/// Rotation plane of the base station rotor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Axis {
    /// Horizontal sweep (reported as X).
    Sweep = 0,
    /// Vertical sweep (reported as Y).
    Creep = 1,
}

impl Axis {
    /// Number of axes.
    pub const COUNT: usize = 2;

    /// Index into per-axis arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl Default for Axis {
    fn default() -> Self {
        Axis::Sweep
    }
}

/// Decoded sync pulse code (0..=7).
///
/// Bit layout:
/// - Bit 0: axis (0 = sweep, 1 = creep)
/// - Bit 1: data (OOTX payload bit, not decoded here)
/// - Bit 2: skip (rotor beam not emitted this cycle)
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncCode(u8);

impl SyncCode {
    /// Axis bit mask (bit 0)
    pub const AXIS: u8 = 0x01;

    /// Data bit mask (bit 1)
    pub const DATA: u8 = 0x02;

    /// Skip bit mask (bit 2)
    pub const SKIP: u8 = 0x04;

    /// Number of distinct sync codes.
    pub const COUNT: usize = 8;

    /// Create a code from its window index. Bits above bit 2 are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x07)
    }

    /// Raw code value.
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Check if the upcoming beam on this axis is absent this rotation.
    pub const fn skip(&self) -> bool {
        (self.0 & Self::SKIP) != 0
    }

    /// OOTX data bit. Carried through, never interpreted.
    pub const fn data(&self) -> bool {
        (self.0 & Self::DATA) != 0
    }

    /// Axis the following beam belongs to.
    pub const fn axis(&self) -> Axis {
        if (self.0 & Self::AXIS) != 0 {
            Axis::Creep
        } else {
            Axis::Sweep
        }
    }
}

/// Outcome of classifying a pulse by its duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PulseClass {
    /// Duration fell inside one of the calibrated sync windows.
    Sync(SyncCode),
    /// Short pulse: the rotor beam crossed the sensor.
    Beam,
    /// Matches no sync window and is too long for a beam. Dropped.
    Unclassified,
}
