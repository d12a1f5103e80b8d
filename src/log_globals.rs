//! Global log stream instance.
//!
//! Single producer (sensor poll loop), single consumer (UART drain).

use crate::logging::LogStream;

/// Log stream for the sensor poll loop.
///
/// The edge interrupt never writes here.
pub static SENSOR_LOG_STREAM: LogStream = LogStream::new();
