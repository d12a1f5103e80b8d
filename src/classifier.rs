//! Timing-window classifier.
//!
//! Pure logic, no hardware dependencies. Maps a pulse duration to a sync
//! code, a beam hit, or nothing. Fully testable on host.
//!
//! # Sync Encoding
//!
//! The base station emits one of 8 sync lengths, ~10.4µs apart. The
//! length index carries 3 bits: skip (bit 2), data (bit 1), axis (bit 0).
//! A pulse matches code `c` iff `low[c] < length < high[c]`.

use crate::config::{ConfigError, SensorConfig, SYNC_CENTERS_NS};
use crate::pulse::{PulseClass, SyncCode};

/// Calibration table in timestamp ticks.
///
/// Built once from a [`SensorConfig`]; every tick-valued constant the
/// decoder needs lives here so the decode path never converts units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    low: [u32; SyncCode::COUNT],
    high: [u32; SyncCode::COUNT],
    beam_ceiling: u32,
    dead_zone: u32,
    window_end: u32,
    field_of_view_deg: f32,
}

impl Calibration {
    /// Build the table without validation.
    ///
    /// Use [`from_config`](Self::from_config) unless the config is a
    /// known-good constant.
    pub const fn build(config: &SensorConfig) -> Self {
        let tb = config.time_base;
        let tolerance = tb.ticks_from_ns(config.sync_tolerance_ns);

        let mut low = [0u32; SyncCode::COUNT];
        let mut high = [0u32; SyncCode::COUNT];
        let mut c = 0;
        while c < SyncCode::COUNT {
            let center = tb.ticks_from_ns(SYNC_CENTERS_NS[c]);
            low[c] = center.saturating_sub(tolerance);
            high[c] = center.saturating_add(tolerance);
            c += 1;
        }

        let dead_zone = tb.ticks_from_ns_floor(config.dead_zone_ns);
        let window_end =
            tb.ticks_from_ns_floor(config.dead_zone_ns.saturating_add(config.sweep_window_ns));

        Self {
            low,
            high,
            beam_ceiling: tb.ticks_from_ns(config.beam_ceiling_ns),
            dead_zone,
            window_end,
            field_of_view_deg: config.field_of_view_deg,
        }
    }

    /// Build and validate the table.
    pub fn from_config(config: &SensorConfig) -> Result<Self, ConfigError> {
        if config.time_base.ticks_per_us == 0 {
            return Err(ConfigError::ZeroTimeBase);
        }

        let cal = Self::build(config);

        // Open interval (low, high) holds no integer unless high - low >= 2
        if cal.low.iter().zip(cal.high.iter()).any(|(&lo, &hi)| hi <= lo.saturating_add(1)) {
            return Err(ConfigError::EmptySyncWindow);
        }
        if !cal.is_disjoint() {
            return Err(ConfigError::OverlappingWindows);
        }
        if cal.beam_ceiling > cal.low[0] {
            return Err(ConfigError::BeamCeilingTooHigh);
        }
        if cal.sweep_window() == 0 {
            return Err(ConfigError::EmptySweepWindow);
        }

        Ok(cal)
    }

    /// Classify a pulse by its length in ticks.
    ///
    /// Linear scan over the sync windows, first match wins. Otherwise a
    /// pulse shorter than the beam ceiling is a beam; anything else is
    /// unclassifiable.
    #[inline]
    pub fn classify(&self, length: u32) -> PulseClass {
        match self.sync_code(length) {
            Some(code) => PulseClass::Sync(code),
            None if length < self.beam_ceiling => PulseClass::Beam,
            None => PulseClass::Unclassified,
        }
    }

    /// Find the sync code whose window contains `length`.
    #[inline]
    pub fn sync_code(&self, length: u32) -> Option<SyncCode> {
        (0..SyncCode::COUNT)
            .find(|&c| self.low[c] < length && length < self.high[c])
            .map(|c| SyncCode::from_bits(c as u8))
    }

    /// Check that no duration can fall in two sync windows.
    pub fn is_disjoint(&self) -> bool {
        for a in 0..SyncCode::COUNT {
            for b in (a + 1)..SyncCode::COUNT {
                if windows_overlap((self.low[a], self.high[a]), (self.low[b], self.high[b])) {
                    return false;
                }
            }
        }
        true
    }

    /// Lower (exclusive) bounds of the sync windows.
    pub fn low(&self) -> &[u32; SyncCode::COUNT] {
        &self.low
    }

    /// Upper (exclusive) bounds of the sync windows.
    pub fn high(&self) -> &[u32; SyncCode::COUNT] {
        &self.high
    }

    /// Beam pulses are strictly shorter than this.
    pub fn beam_ceiling(&self) -> u32 {
        self.beam_ceiling
    }

    /// Earliest valid sync-to-beam delay (inclusive).
    pub fn dead_zone(&self) -> u32 {
        self.dead_zone
    }

    /// Latest valid sync-to-beam delay (inclusive).
    pub fn window_end(&self) -> u32 {
        self.window_end
    }

    /// Span mapped onto the field of view.
    pub fn sweep_window(&self) -> u32 {
        self.window_end.saturating_sub(self.dead_zone)
    }

    /// Field of view in degrees.
    pub fn field_of_view_deg(&self) -> f32 {
        self.field_of_view_deg
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::build(&SensorConfig::micros())
    }
}

/// Check whether two open intervals `(low, high)` share an integer.
#[inline]
fn windows_overlap(a: (u32, u32), b: (u32, u32)) -> bool {
    let lo = a.0.max(b.0);
    let hi = a.1.min(b.1);
    hi > lo.saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeBase;
    use crate::pulse::Axis;

    #[test]
    fn test_micros_table_values() {
        let cal = Calibration::default();
        assert_eq!(cal.low(), &[59, 69, 79, 90, 100, 111, 121, 131]);
        assert_eq!(cal.high(), &[67, 77, 87, 98, 108, 119, 129, 139]);
        assert_eq!(cal.beam_ceiling(), 20);
        assert_eq!(cal.dead_zone(), 1_222);
        assert_eq!(cal.window_end(), 6_777);
        assert_eq!(cal.sweep_window(), 5_555);
    }

    #[test]
    fn test_bounds_are_exclusive() {
        let cal = Calibration::default();
        assert_eq!(cal.classify(59), PulseClass::Unclassified);
        assert_eq!(cal.classify(60), PulseClass::Sync(SyncCode::from_bits(0)));
        assert_eq!(cal.classify(66), PulseClass::Sync(SyncCode::from_bits(0)));
        assert_eq!(cal.classify(67), PulseClass::Unclassified);
    }

    #[test]
    fn test_each_center_decodes_its_code() {
        for time_base in [TimeBase::MICROS, TimeBase::NANOS, TimeBase::cycles(240)] {
            let cal = Calibration::from_config(&SensorConfig::new(time_base)).unwrap();
            for (c, &ns) in SYNC_CENTERS_NS.iter().enumerate() {
                let ticks = time_base.ticks_from_ns(ns);
                assert_eq!(
                    cal.classify(ticks),
                    PulseClass::Sync(SyncCode::from_bits(c as u8)),
                    "code {} at {:?}",
                    c,
                    time_base
                );
            }
        }
    }

    #[test]
    fn test_short_pulse_is_beam() {
        let cal = Calibration::default();
        assert_eq!(cal.classify(0), PulseClass::Beam);
        assert_eq!(cal.classify(5), PulseClass::Beam);
        assert_eq!(cal.classify(19), PulseClass::Beam);
        assert_eq!(cal.classify(20), PulseClass::Unclassified);
    }

    #[test]
    fn test_gap_between_windows_unclassified() {
        let cal = Calibration::default();
        assert_eq!(cal.classify(68), PulseClass::Unclassified);
        assert_eq!(cal.classify(200), PulseClass::Unclassified);
    }

    #[test]
    fn test_sync_bits_decoded() {
        let cal = Calibration::default();
        match cal.classify(125) {
            PulseClass::Sync(code) => {
                assert_eq!(code.bits(), 6);
                assert!(code.skip());
                assert!(code.data());
                assert_eq!(code.axis(), Axis::Sweep);
            }
            other => panic!("expected sync, got {:?}", other),
        }
    }

    #[test]
    fn test_windows_overlap() {
        assert!(!windows_overlap((59, 67), (69, 77)));
        assert!(!windows_overlap((59, 67), (66, 77)));
        assert!(windows_overlap((59, 68), (66, 77)));
    }
}
