//! Calibration and classification tests

use lighthouse_sensor::config::{ConfigError, SensorConfig, TimeBase, SYNC_CENTERS_NS};
use lighthouse_sensor::{Axis, Calibration, PulseClass, SyncCode};

const TIME_BASES: [TimeBase; 4] = [
    TimeBase::MICROS,
    TimeBase::NANOS,
    TimeBase { ticks_per_us: 160 },
    TimeBase { ticks_per_us: 240 },
];

#[test]
fn test_default_tables_are_disjoint() {
    for tb in TIME_BASES {
        let cal = Calibration::from_config(&SensorConfig::new(tb)).unwrap();
        assert!(cal.is_disjoint(), "{:?}", tb);
    }
}

#[test]
fn test_no_duration_matches_two_codes() {
    let cal = Calibration::default();
    for length in 0..200u32 {
        let matches = (0..SyncCode::COUNT)
            .filter(|&c| cal.low()[c] < length && length < cal.high()[c])
            .count();
        assert!(matches <= 1, "length {} matches {} codes", length, matches);
    }
}

#[test]
fn test_beam_ceiling_below_first_window() {
    for tb in TIME_BASES {
        let cal = Calibration::build(&SensorConfig::new(tb));
        assert!(cal.beam_ceiling() <= cal.low()[0]);
    }
}

#[test]
fn test_center_classifies_under_every_time_base() {
    for tb in TIME_BASES {
        let cal = Calibration::build(&SensorConfig::new(tb));
        for (c, &ns) in SYNC_CENTERS_NS.iter().enumerate() {
            assert_eq!(
                cal.classify(tb.ticks_from_ns(ns)),
                PulseClass::Sync(SyncCode::from_bits(c as u8))
            );
        }
    }
}

#[test]
fn test_nanos_table() {
    let cal = Calibration::build(&SensorConfig::nanos());
    assert_eq!(cal.low()[0], 58_500);
    assert_eq!(cal.high()[0], 66_500);
    assert_eq!(cal.beam_ceiling(), 20_000);
    assert_eq!(cal.dead_zone(), 1_222_222);
    assert_eq!(cal.window_end(), 6_777_777);
}

#[test]
fn test_code_bits() {
    let cal = Calibration::default();

    // Code 5: skip, no data, creep
    let PulseClass::Sync(code) = cal.classify(115) else {
        panic!("115 should be a sync pulse");
    };
    assert_eq!(code.bits(), 5);
    assert!(code.skip());
    assert!(!code.data());
    assert_eq!(code.axis(), Axis::Creep);
}

#[test]
fn test_zero_time_base_rejected() {
    let config = SensorConfig::new(TimeBase { ticks_per_us: 0 });
    assert_eq!(Calibration::from_config(&config), Err(ConfigError::ZeroTimeBase));
}

#[test]
fn test_wide_tolerance_rejected() {
    let config = SensorConfig::micros().with_sync_tolerance_ns(6_000);
    assert_eq!(Calibration::from_config(&config), Err(ConfigError::OverlappingWindows));
}

#[test]
fn test_beam_ceiling_too_high_rejected() {
    let mut config = SensorConfig::micros();
    config.beam_ceiling_ns = 70_000;
    assert_eq!(Calibration::from_config(&config), Err(ConfigError::BeamCeilingTooHigh));
}

#[test]
fn test_zero_sweep_rejected() {
    let mut config = SensorConfig::micros();
    config.sweep_window_ns = 0;
    assert_eq!(Calibration::from_config(&config), Err(ConfigError::EmptySweepWindow));
}
