//! Lighthouse pulse decoder.
//!
//! Pure logic, no hardware dependencies. Consumes completed pulses,
//! tracks which axis the rotor is sweeping, produces angles. Fully
//! testable on host.
//!
//! # Decode Cycle
//!
//! ```text
//! sync (no skip) ──▶ remember start + axis
//! sync (skip)    ──▶ nothing: this axis' beam is absent this rotation
//! beam           ──▶ angle[axis] from (beam.start - sync.start)
//! ```

use crate::classifier::Calibration;
use crate::pulse::{Axis, PulseClass, PulseRecord, SyncCode};

/// Persistent decode context.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecoderState {
    /// Start of the most recent non-skip sync pulse. `None` until one is seen.
    pub sync_pulse_start: Option<u32>,

    /// Axis the next beam pulse belongs to.
    pub active_axis: Axis,

    /// Last computed angle per axis (degrees). Never cleared.
    pub angle: [f32; Axis::COUNT],
}

impl DecoderState {
    /// Initial state: no sync seen, both angles 0°.
    pub const fn new() -> Self {
        Self {
            sync_pulse_start: None,
            active_axis: Axis::Sweep,
            angle: [0.0; Axis::COUNT],
        }
    }
}

impl Default for DecoderState {
    fn default() -> Self {
        Self::new()
    }
}

/// What one pulse did to the decoder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DecodeOutcome {
    /// Non-skip sync: new origin and axis.
    Sync(SyncCode),
    /// Skip sync: state untouched.
    SkippedSync(SyncCode),
    /// Beam inside the sweep window: angle stored.
    Angle { axis: Axis, degrees: f32 },
    /// Beam outside the sweep window (noise, reflection, missed sync).
    OutOfWindow { relative: u32 },
    /// Beam before any sync pulse.
    NoSync,
    /// Length matches no sync window and is too long for a beam.
    Unclassified { length: u32 },
}

impl DecodeOutcome {
    /// Check if this pulse produced a new angle.
    #[inline]
    pub fn is_update(&self) -> bool {
        matches!(self, DecodeOutcome::Angle { .. })
    }
}

/// Decode counters for diagnostics. Never surfaced as errors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Pulses handed to the decoder.
    pub pulses: u32,
    /// Non-skip sync pulses.
    pub syncs: u32,
    /// Skip sync pulses.
    pub skipped_syncs: u32,
    /// Angles produced.
    pub updates: u32,
    /// Pulses matching nothing.
    pub unclassified: u32,
    /// Beams outside the sweep window or before any sync.
    pub out_of_window: u32,
    /// Pulses passed over in the timing buffer (overrun or newest-only).
    pub dropped: u32,
    /// Falling edges with no rising edge.
    pub orphan_edges: u32,
}

impl DecodeStats {
    fn record(&mut self, outcome: &DecodeOutcome) {
        self.pulses = self.pulses.wrapping_add(1);
        let counter = match outcome {
            DecodeOutcome::Sync(_) => &mut self.syncs,
            DecodeOutcome::SkippedSync(_) => &mut self.skipped_syncs,
            DecodeOutcome::Angle { .. } => &mut self.updates,
            DecodeOutcome::OutOfWindow { .. } | DecodeOutcome::NoSync => &mut self.out_of_window,
            DecodeOutcome::Unclassified { .. } => &mut self.unclassified,
        };
        *counter = counter.wrapping_add(1);
    }
}

/// Map a sync-to-beam delay onto the field of view.
///
/// Returns `None` if `relative` is outside `[dead_zone, window_end]`.
/// The window endpoints map to exactly `-fov/2` and `+fov/2`.
#[inline]
pub fn beam_angle(calibration: &Calibration, relative: u32) -> Option<f32> {
    if relative < calibration.dead_zone() || relative > calibration.window_end() {
        return None;
    }

    let offset = relative - calibration.dead_zone();
    let fov = calibration.field_of_view_deg();
    let fraction = offset as f32 / calibration.sweep_window() as f32;

    Some(fraction * fov - fov / 2.0)
}

/// Pulse decoder.
///
/// # Example
///
/// ```
/// use lighthouse_sensor::classifier::Calibration;
/// use lighthouse_sensor::config::SensorConfig;
/// use lighthouse_sensor::decoder::Decoder;
/// use lighthouse_sensor::pulse::PulseRecord;
///
/// let mut decoder = Decoder::new(Calibration::build(&SensorConfig::nanos()));
///
/// // Sync code 0 (sweep, no skip), then a beam mid-window
/// decoder.decode(PulseRecord::new(0, 62_500));
/// let outcome = decoder.decode(PulseRecord::new(4_000_000, 4_005_000));
///
/// assert!(outcome.is_update());
/// assert!(decoder.x().abs() < 0.001);
/// ```
pub struct Decoder {
    calibration: Calibration,
    state: DecoderState,
    stats: DecodeStats,
}

impl Decoder {
    /// Create a decoder with the given calibration.
    pub fn new(calibration: Calibration) -> Self {
        Self {
            calibration,
            state: DecoderState::new(),
            stats: DecodeStats::default(),
        }
    }

    /// Decode one completed pulse.
    #[inline]
    pub fn decode(&mut self, pulse: PulseRecord) -> DecodeOutcome {
        let outcome = match self.calibration.classify(pulse.length()) {
            PulseClass::Sync(code) => self.on_sync(pulse, code),
            PulseClass::Beam => self.on_beam(pulse),
            PulseClass::Unclassified => DecodeOutcome::Unclassified { length: pulse.length() },
        };

        self.stats.record(&outcome);
        outcome
    }

    /// Last sweep (horizontal) angle in degrees.
    #[inline]
    pub fn x(&self) -> f32 {
        self.angle(Axis::Sweep)
    }

    /// Last creep (vertical) angle in degrees.
    #[inline]
    pub fn y(&self) -> f32 {
        self.angle(Axis::Creep)
    }

    /// Last angle on the given axis.
    #[inline]
    pub fn angle(&self, axis: Axis) -> f32 {
        self.state.angle[axis.index()]
    }

    /// Current decode context.
    pub fn state(&self) -> &DecoderState {
        &self.state
    }

    /// Calibration in use.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Decode counters.
    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    // --- Private methods ---

    fn on_sync(&mut self, pulse: PulseRecord, code: SyncCode) -> DecodeOutcome {
        if code.skip() {
            return DecodeOutcome::SkippedSync(code);
        }

        self.state.sync_pulse_start = Some(pulse.start);
        self.state.active_axis = code.axis();
        DecodeOutcome::Sync(code)
    }

    fn on_beam(&mut self, pulse: PulseRecord) -> DecodeOutcome {
        let Some(sync_start) = self.state.sync_pulse_start else {
            return DecodeOutcome::NoSync;
        };

        let relative = pulse.start.wrapping_sub(sync_start);
        match beam_angle(&self.calibration, relative) {
            Some(degrees) => {
                let axis = self.state.active_axis;
                self.state.angle[axis.index()] = degrees;
                DecodeOutcome::Angle { axis, degrees }
            }
            None => DecodeOutcome::OutOfWindow { relative },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SensorConfig;

    fn micros() -> Decoder {
        Decoder::new(Calibration::default())
    }

    fn sync(start: u32, code: u32) -> PulseRecord {
        let len = [63, 73, 83, 94, 104, 115, 125, 135][code as usize];
        PulseRecord::new(start, start + len)
    }

    fn beam(start: u32) -> PulseRecord {
        PulseRecord::new(start, start + 8)
    }

    #[test]
    fn test_sync_sets_origin_and_axis() {
        let mut decoder = micros();

        assert_eq!(decoder.decode(sync(500, 1)), DecodeOutcome::Sync(SyncCode::from_bits(1)));
        assert_eq!(decoder.state().sync_pulse_start, Some(500));
        assert_eq!(decoder.state().active_axis, Axis::Creep);
    }

    #[test]
    fn test_skip_sync_leaves_state() {
        let mut decoder = micros();
        decoder.decode(sync(500, 1));
        let before = *decoder.state();

        let outcome = decoder.decode(sync(9_000, 4));

        assert_eq!(outcome, DecodeOutcome::SkippedSync(SyncCode::from_bits(4)));
        assert_eq!(*decoder.state(), before);
    }

    #[test]
    fn test_beam_mid_window_is_zero() {
        let mut decoder = micros();
        decoder.decode(sync(0, 0));

        // 1222 + 5555/2
        let outcome = decoder.decode(beam(3_999));

        assert!(outcome.is_update());
        assert!(decoder.x().abs() < 0.02, "x = {}", decoder.x());
        assert_eq!(decoder.y(), 0.0);
    }

    #[test]
    fn test_window_endpoints() {
        let mut decoder = micros();
        decoder.decode(sync(0, 0));

        decoder.decode(beam(1_222));
        assert!((decoder.x() + 60.0).abs() < 1e-4);

        decoder.decode(beam(6_777));
        assert!((decoder.x() - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_out_of_window_beam_ignored() {
        let mut decoder = micros();
        decoder.decode(sync(0, 0));
        decoder.decode(beam(2_000));
        let x = decoder.x();

        assert_eq!(decoder.decode(beam(1_221)), DecodeOutcome::OutOfWindow { relative: 1_221 });
        assert_eq!(decoder.decode(beam(6_778)), DecodeOutcome::OutOfWindow { relative: 6_778 });
        assert_eq!(decoder.x(), x);
        assert_eq!(decoder.stats().out_of_window, 2);
    }

    #[test]
    fn test_beam_before_sync_ignored() {
        let mut decoder = micros();
        assert_eq!(decoder.decode(beam(3_000)), DecodeOutcome::NoSync);
        assert_eq!(decoder.x(), 0.0);
    }

    #[test]
    fn test_creep_axis_updates_y() {
        let mut decoder = micros();
        decoder.decode(sync(10_000, 1));
        decoder.decode(beam(10_000 + 1_222));

        assert!((decoder.y() + 60.0).abs() < 1e-4);
        assert_eq!(decoder.x(), 0.0);
    }

    #[test]
    fn test_relative_across_rollover() {
        let mut decoder = micros();
        let t0 = u32::MAX - 1_000;
        decoder.decode(sync(t0, 0));

        let outcome = decoder.decode(beam(t0.wrapping_add(1_222)));

        assert!(outcome.is_update());
        assert!((decoder.x() + 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_unclassified_counted() {
        let mut decoder = micros();
        assert_eq!(
            decoder.decode(PulseRecord::new(0, 300)),
            DecodeOutcome::Unclassified { length: 300 }
        );
        assert_eq!(decoder.stats().unclassified, 1);
        assert_eq!(decoder.stats().pulses, 1);
    }

    #[test]
    fn test_nanos_scenario() {
        let mut decoder = Decoder::new(Calibration::build(&SensorConfig::nanos()));

        decoder.decode(PulseRecord::new(0, 62_500));
        let outcome = decoder.decode(PulseRecord::new(4_000_000, 4_003_000));

        assert!(outcome.is_update());
        assert!(decoder.x().abs() < 1e-3);
    }
}
