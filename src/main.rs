//! Lighthouse sensor firmware - Main entry point
//!
//! 1. Configure the photodiode input and activity LED
//! 2. Register the edge ISR (timestamps only)
//! 3. Poll the decoder, log angle updates and periodic stats to UART

#![no_std]
#![no_main]

use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::sys as esp_idf_sys;

use lighthouse_sensor::{
    hal::{EspEdgeInput, EspIndicator, EspTimerClock},
    sensor::report_stats,
    config::ProcessPolicy,
    sensor_debug, sensor_error, sensor_info,
    uart_logger::{drain_to_uart, init_uart_logger, UartLoggerConfig},
    AngleSensor, EdgeTimestamper, LighthouseSensor, SensorConfig, SENSOR_LOG_STREAM,
};

/// Photodiode envelope detector output.
const SENSOR_PIN: i32 = 4;

/// Activity LED (on from edge ISR, off once pulses are consumed).
const LED_PIN: i32 = 2;

/// Stats line period.
const STATS_PERIOD_US: i64 = 5_000_000;

/// Interrupt-side state for the sensor. One per pin.
static CHANNEL: EdgeTimestamper = EdgeTimestamper::new();

fn timestamp_us() -> i64 {
    unsafe { esp_idf_sys::esp_timer_get_time() }
}

#[no_mangle]
fn main() {
    // Initialize ESP-IDF
    esp_idf_sys::link_patches();

    let Ok(peripherals) = Peripherals::take() else {
        return;
    };
    let Ok(mut uart) = init_uart_logger(
        peripherals.uart1,
        peripherals.pins.gpio6,
        &UartLoggerConfig::default(),
    ) else {
        return;
    };

    // esp_timer gives µs timestamps. The poll period (one FreeRTOS tick,
    // 10ms at the default 100 Hz) is longer than a sync-to-beam gap, so
    // every pulse since the last poll must be decoded in order.
    let config = SensorConfig::micros().with_policy(ProcessPolicy::Backlog);

    let sensor = EspEdgeInput::<SENSOR_PIN, EspTimerClock, LED_PIN>::new()
        .map_err(|err| lighthouse_sensor::SensorError::Attach(err.code()))
        .and_then(|input| {
            let led = EspIndicator::<LED_PIN>::new()
                .map_err(|err| lighthouse_sensor::SensorError::Attach(err.code()))?;
            LighthouseSensor::new(&CHANNEL, input, led, config)
        });

    let mut sensor = match sensor {
        Ok(sensor) => sensor,
        Err(err) => {
            sensor_error!(SENSOR_LOG_STREAM, timestamp_us(), "sensor init: {}", err);
            drain_to_uart(&mut uart);
            return;
        }
    };

    if let Err(err) = sensor.setup() {
        sensor_error!(SENSOR_LOG_STREAM, timestamp_us(), "sensor setup: {}", err);
        drain_to_uart(&mut uart);
        return;
    }

    sensor_info!(SENSOR_LOG_STREAM, timestamp_us(), "lighthouse sensor on GPIO{}", SENSOR_PIN);

    let calibration = sensor.decoder().calibration();
    sensor_debug!(
        SENSOR_LOG_STREAM,
        timestamp_us(),
        "sweep window {}..={} ticks, beam < {} ticks",
        calibration.dead_zone(),
        calibration.window_end(),
        calibration.beam_ceiling()
    );

    let mut last_stats = timestamp_us();

    loop {
        if sensor.process_pulses() {
            sensor_info!(
                SENSOR_LOG_STREAM,
                timestamp_us(),
                "x={:.2} y={:.2}",
                sensor.x(),
                sensor.y()
            );
        }

        let now = timestamp_us();
        if now - last_stats > STATS_PERIOD_US {
            report_stats(&sensor.stats(), &SENSOR_LOG_STREAM, now);
            last_stats = now;
        }

        drain_to_uart(&mut uart);

        // One tick. Backlog mode keeps up as long as fewer than a ring's
        // worth of pulses (8, about 4 rotations) arrive per tick.
        unsafe {
            esp_idf_sys::vTaskDelay(1);
        }
    }
}
