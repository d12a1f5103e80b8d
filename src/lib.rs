//! # Lighthouse Sensor
//!
//! Decodes sweep angles from a lighthouse base station by timing the
//! photodiode pulses it produces.
//!
//! ## Architecture
//!
//! ```text
//! edge ISR ──▶ EdgeTimestamper ──▶ TimingBuffer ──▶ LighthouseSensor ──▶ x(), y()
//!  (interrupt)                      (lock-free)       (polled)
//! ```
//!
//! - The ISR only timestamps edges and publishes completed pulses
//! - The poll loop classifies pulses and computes angles
//! - The two share nothing but the buffer's index pair: no locks, no waiting
//!
//! Decoding is lossy by design. Missed, reflected or malformed pulses simply
//! produce no update; callers treat unchanged angles as stale.

#![cfg_attr(not(test), no_std)]

pub mod classifier;
pub mod config;
pub mod decoder;
pub mod error;
pub mod logging;
pub mod log_globals;
pub mod pulse;
pub mod sensor;
pub mod timestamper;
pub mod timing;
pub mod uart_logger;

#[cfg(feature = "firmware")]
pub mod hal;

pub use classifier::Calibration;
pub use config::{ProcessPolicy, SensorConfig, TimeBase};
pub use decoder::{DecodeOutcome, DecodeStats, Decoder, DecoderState};
pub use error::SensorError;
pub use log_globals::SENSOR_LOG_STREAM;
pub use pulse::{Axis, PulseClass, PulseRecord, SyncCode};
pub use sensor::{AngleSensor, EdgeInput, Indicator, LighthouseSensor, NoIndicator};
pub use timestamper::EdgeTimestamper;
pub use timing::TimingBuffer;
