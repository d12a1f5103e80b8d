//! UART log output.
//!
//! Drains [`SENSOR_LOG_STREAM`](crate::SENSOR_LOG_STREAM) to a UART TX pin.
//! Requires external USB-UART adapter (CH340, CP2102, etc).
//!
//! # Hardware Setup
//!
//! ```text
//! ESP32-S3 GPIO6 (TX) ──────▶ USB-UART RX
//!                              └─▶ PC Serial Monitor
//! ```

use core::fmt::Write;

use crate::logging::{BufWriter, LogEntry};

#[cfg(feature = "firmware")]
use crate::SENSOR_LOG_STREAM;
#[cfg(feature = "firmware")]
use esp_idf_svc::hal::gpio;
#[cfg(feature = "firmware")]
use esp_idf_svc::hal::peripheral::Peripheral;
#[cfg(feature = "firmware")]
use esp_idf_svc::hal::uart::{self, UartTxDriver};

/// Size of one formatted log line.
pub const LINE_BUF_LEN: usize = 160;

/// UART configuration for logging.
pub struct UartLoggerConfig {
    pub baud_rate: u32,
    pub tx_pin: u8,
}

impl Default for UartLoggerConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115200,
            tx_pin: 6,
        }
    }
}

/// Format log entry to string.
///
/// Format: `[timestamp_us] LEVEL: message\n`
pub fn format_log_entry(entry: &LogEntry, buf: &mut [u8]) -> usize {
    let mut writer = BufWriter { buf, pos: 0 };

    let _ = writeln!(
        writer,
        "[{:10}] {}: {}",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.text()
    );

    writer.pos
}

/// Format a dropped-messages warning line.
pub fn format_dropped(dropped: u32, buf: &mut [u8]) -> usize {
    let mut writer = BufWriter { buf, pos: 0 };
    let _ = writeln!(writer, "[WARN] Log dropped: {}", dropped);
    writer.pos
}

/// Initialize UART1 TX-only for logging output.
#[cfg(feature = "firmware")]
pub fn init_uart_logger<'d>(
    uart: impl Peripheral<P = esp_idf_svc::hal::uart::UART1> + 'd,
    tx_pin: impl Peripheral<P = impl gpio::OutputPin> + 'd,
    config: &UartLoggerConfig,
) -> Result<UartTxDriver<'d>, esp_idf_svc::sys::EspError> {
    let uart_config = uart::config::Config::default()
        .baudrate(esp_idf_svc::hal::units::Hertz(config.baud_rate));

    UartTxDriver::new(
        uart,
        tx_pin,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    )
}

/// Drain everything pending in the sensor log stream to UART.
///
/// Non-blocking on the stream side; UART writes may block briefly.
/// Returns the number of entries written.
#[cfg(feature = "firmware")]
pub fn drain_to_uart(uart: &mut UartTxDriver<'_>) -> u32 {
    let mut line = [0u8; LINE_BUF_LEN];
    let mut written = 0;

    while let Some(entry) = SENSOR_LOG_STREAM.drain() {
        let len = format_log_entry(&entry, &mut line);
        let _ = uart.write(&line[..len]);
        written += 1;
    }

    let dropped = SENSOR_LOG_STREAM.dropped();
    if dropped > 0 {
        let len = format_dropped(dropped, &mut line);
        let _ = uart.write(&line[..len]);
        SENSOR_LOG_STREAM.reset_dropped();
    }

    written
}
