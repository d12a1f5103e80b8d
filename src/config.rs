//! Module: config
//!
//! Purpose: Sensor configuration: the timestamp time base and the physical
//! constants of the base station timing protocol.
//!
//! Architecture:
//! - All protocol constants are stored in nanoseconds
//! - `TimeBase` is the single ns -> tick conversion, applied once when the
//!   calibration table is built (see classifier::Calibration)
//! - `SensorConfig` is `Copy` and const-constructible for `static` use
//!
//! Safety: Safe. No unsafe blocks.

use crate::classifier::Calibration;

/// Nominal sync pulse lengths in nanoseconds, indexed by sync code.
///
/// Base station v1 timing: 62.5µs + code * 10.42µs.
pub const SYNC_CENTERS_NS: [u32; 8] = [
    62_500, 72_900, 83_300, 93_750, 104_200, 114_600, 125_000, 135_400,
];

/// Half-width of each sync window.
pub const DEFAULT_SYNC_TOLERANCE_NS: u32 = 4_000;

/// Longest pulse still accepted as a beam hit. Wide beams at grazing angles
/// and close range stay well below this.
pub const DEFAULT_BEAM_CEILING_NS: u32 = 20_000;

/// Time after sync during which no beam can physically arrive.
pub const DEFAULT_DEAD_ZONE_NS: u32 = 1_222_222;

/// Time the rotor takes to cross the usable field of view.
pub const DEFAULT_SWEEP_WINDOW_NS: u32 = 5_555_555;

/// Angular field covered by the sweep window, centred on 0°.
pub const DEFAULT_FIELD_OF_VIEW_DEG: f32 = 120.0;

/// Timestamp unit of the platform clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeBase {
    /// Timestamp ticks per microsecond.
    pub ticks_per_us: u32,
}

impl TimeBase {
    /// Coarse microsecond counter (1 tick = 1µs).
    pub const MICROS: Self = Self { ticks_per_us: 1 };

    /// Cycle counter scaled to nanoseconds (1 tick = 1ns).
    pub const NANOS: Self = Self { ticks_per_us: 1_000 };

    /// Raw CPU cycle counter running at `mhz`.
    pub const fn cycles(mhz: u32) -> Self {
        Self { ticks_per_us: mhz }
    }

    /// Convert nanoseconds to ticks, rounding to nearest.
    ///
    /// Saturates at `u32::MAX`.
    #[inline]
    pub const fn ticks_from_ns(&self, ns: u32) -> u32 {
        saturate((ns as u64 * self.ticks_per_us as u64 + 500) / 1_000)
    }

    /// Convert nanoseconds to ticks, rounding down.
    ///
    /// Used for timing bounds, so a bound never lands past the physical limit.
    #[inline]
    pub const fn ticks_from_ns_floor(&self, ns: u32) -> u32 {
        saturate(ns as u64 * self.ticks_per_us as u64 / 1_000)
    }
}

const fn saturate(ticks: u64) -> u32 {
    if ticks > u32::MAX as u64 {
        u32::MAX
    } else {
        ticks as u32
    }
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::MICROS
    }
}

/// How `process_pulses()` consumes the timing buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessPolicy {
    /// Process only the newest completed pulse per call; older unread
    /// pulses are dropped. Bounded work per call.
    Latest,
    /// Process every unread pulse in arrival order.
    Backlog,
}

impl Default for ProcessPolicy {
    fn default() -> Self {
        ProcessPolicy::Latest
    }
}

/// Sensor configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SensorConfig {
    /// Unit of the timestamps fed to `EdgeTimestamper::on_edge`.
    pub time_base: TimeBase,

    /// Half-width of each sync window (ns).
    pub sync_tolerance_ns: u32,

    /// Pulses shorter than this that match no sync window are beams (ns).
    pub beam_ceiling_ns: u32,

    /// Minimum sync-to-beam delay (ns).
    pub dead_zone_ns: u32,

    /// Sync-to-beam span mapped onto the field of view (ns).
    pub sweep_window_ns: u32,

    /// Field of view in degrees.
    pub field_of_view_deg: f32,

    /// Buffer consumption policy.
    pub policy: ProcessPolicy,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self::new(TimeBase::MICROS)
    }
}

impl SensorConfig {
    /// Default protocol constants for the given time base.
    pub const fn new(time_base: TimeBase) -> Self {
        Self {
            time_base,
            sync_tolerance_ns: DEFAULT_SYNC_TOLERANCE_NS,
            beam_ceiling_ns: DEFAULT_BEAM_CEILING_NS,
            dead_zone_ns: DEFAULT_DEAD_ZONE_NS,
            sweep_window_ns: DEFAULT_SWEEP_WINDOW_NS,
            field_of_view_deg: DEFAULT_FIELD_OF_VIEW_DEG,
            policy: ProcessPolicy::Latest,
        }
    }

    /// Coarse microsecond clock.
    pub const fn micros() -> Self {
        Self::new(TimeBase::MICROS)
    }

    /// Nanosecond-scaled cycle counter.
    pub const fn nanos() -> Self {
        Self::new(TimeBase::NANOS)
    }

    /// Replace the time base.
    pub const fn with_time_base(mut self, time_base: TimeBase) -> Self {
        self.time_base = time_base;
        self
    }

    /// Replace the buffer consumption policy.
    pub const fn with_policy(mut self, policy: ProcessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the sync window half-width.
    pub const fn with_sync_tolerance_ns(mut self, tolerance_ns: u32) -> Self {
        self.sync_tolerance_ns = tolerance_ns;
        self
    }

    /// Check the configuration produces a usable calibration table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Calibration::from_config(self).map(|_| ())
    }
}

/// Configuration rejected by [`SensorConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// C01: Time base has zero ticks per microsecond
    ZeroTimeBase,
    /// C02: Sync windows are empty at this resolution
    EmptySyncWindow,
    /// C03: Two sync windows share a duration
    OverlappingWindows,
    /// C04: Beam ceiling reaches into the first sync window
    BeamCeilingTooHigh,
    /// C05: Sweep window is zero ticks long
    EmptySweepWindow,
}

impl ConfigError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ZeroTimeBase => "C01",
            Self::EmptySyncWindow => "C02",
            Self::OverlappingWindows => "C03",
            Self::BeamCeilingTooHigh => "C04",
            Self::EmptySweepWindow => "C05",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::ZeroTimeBase => "zero time base",
            Self::EmptySyncWindow => "empty sync window",
            Self::OverlappingWindows => "overlapping sync windows",
            Self::BeamCeilingTooHigh => "beam ceiling too high",
            Self::EmptySweepWindow => "empty sweep window",
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
