//! Hardware Abstraction Layer for the lighthouse sensor.
//!
//! Thin wrappers around ESP-IDF peripherals.
//! Decoding stays in core modules, HAL is just I/O.

pub mod clock;
pub mod gpio;

pub use clock::{Clock, EspTimerClock};
#[cfg(target_arch = "xtensa")]
pub use clock::CycleClock;
pub use gpio::{EspEdgeInput, EspIndicator, NO_LED};
