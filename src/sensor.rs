//! Lighthouse sensor: the poll-side consumer.
//!
//! # Contract
//!
//! "I run when the host polls me. I never wait for the interrupt."
//!
//! [`LighthouseSensor::process_pulses`] takes whatever the edge interrupt
//! has published since the last call, decodes it, and reports whether a new
//! angle was produced. Bad pulses are not errors; they are just not updates.
//! Callers treat an unchanged angle as stale and apply their own timeout.
//!
//! # Rules
//!
//! - One sensor per [`EdgeTimestamper`] channel (claimed on construction)
//! - The platform binding is a type parameter: no dynamic dispatch on the
//!   edge path, the ISR calls the static channel directly

use crate::classifier::Calibration;
use crate::config::{ProcessPolicy, SensorConfig};
use crate::decoder::{DecodeStats, Decoder};
use crate::error::SensorError;
use crate::logging::LogStream;
use crate::timestamper::EdgeTimestamper;
use crate::timing::DEFAULT_BUFFER_LENGTH;

/// Platform binding for the sensor input line.
pub trait EdgeInput {
    /// Route every transition of the sensor line to
    /// `channel.on_edge(level_high, now)`.
    ///
    /// Called once per sensor, from [`AngleSensor::setup`].
    fn attach<const N: usize>(
        &mut self,
        channel: &'static EdgeTimestamper<N>,
    ) -> Result<(), SensorError>;
}

/// Optional activity indicator (LED).
///
/// The platform ISR may turn it on; the sensor turns it off after
/// consuming pulses.
pub trait Indicator {
    /// Drive the indicator.
    fn set(&mut self, on: bool);
}

/// No indicator fitted.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoIndicator;

impl Indicator for NoIndicator {
    #[inline]
    fn set(&mut self, _on: bool) {}
}

/// Uniform capability interface of an angle sensor.
pub trait AngleSensor {
    /// Register with the platform edge interrupt. Idempotent.
    fn setup(&mut self) -> Result<(), SensorError>;

    /// Consume pending pulses. Returns `true` iff a new angle was computed.
    fn process_pulses(&mut self) -> bool;

    /// Last sweep (horizontal) angle in degrees, about [-60, +60].
    fn x(&self) -> f32;

    /// Last creep (vertical) angle in degrees, about [-60, +60].
    fn y(&self) -> f32;

    /// True while a `process_pulses()` call is in progress.
    fn is_updating(&self) -> bool;
}

/// Lighthouse photodiode sensor.
///
/// # Example
///
/// ```ignore
/// static CHANNEL: EdgeTimestamper = EdgeTimestamper::new();
///
/// let mut sensor = LighthouseSensor::new(&CHANNEL, pin, led, SensorConfig::micros())?;
/// sensor.setup()?;
///
/// loop {
///     if sensor.process_pulses() {
///         send_angles(sensor.x(), sensor.y());
///     }
///     delay_ms(1);
/// }
/// ```
pub struct LighthouseSensor<E, I = NoIndicator, const N: usize = DEFAULT_BUFFER_LENGTH>
where
    E: EdgeInput,
    I: Indicator,
{
    channel: &'static EdgeTimestamper<N>,
    input: E,
    indicator: I,
    decoder: Decoder,
    policy: ProcessPolicy,
    attached: bool,
}

impl<E, I, const N: usize> LighthouseSensor<E, I, N>
where
    E: EdgeInput,
    I: Indicator,
{
    /// Create a sensor on `channel`.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if the calibration table cannot be built
    /// - `ChannelInUse` if another sensor owns the channel
    pub fn new(
        channel: &'static EdgeTimestamper<N>,
        input: E,
        indicator: I,
        config: SensorConfig,
    ) -> Result<Self, SensorError> {
        let calibration = Calibration::from_config(&config)?;

        if !channel.claim() {
            return Err(SensorError::ChannelInUse);
        }

        Ok(Self {
            channel,
            input,
            indicator,
            decoder: Decoder::new(calibration),
            policy: config.policy,
            attached: false,
        })
    }

    /// Decoder state and calibration.
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// The channel this sensor consumes.
    pub fn channel(&self) -> &'static EdgeTimestamper<N> {
        self.channel
    }

    /// Check if `setup()` has registered the edge interrupt.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Decode counters, including buffer drops and orphan edges.
    pub fn stats(&self) -> DecodeStats {
        let mut stats = *self.decoder.stats();
        stats.dropped = self.channel.buffer().dropped();
        stats.orphan_edges = self.channel.orphan_edges();
        stats
    }

    fn process_latest(&mut self) -> Option<bool> {
        let pulse = self.channel.buffer().latest()?;
        Some(self.decoder.decode(pulse).is_update())
    }

    fn process_backlog(&mut self) -> Option<bool> {
        let buffer = self.channel.buffer();
        let mut consumed = false;
        let mut updated = false;

        // Bounded: at most one ring's worth per call
        for _ in 0..N {
            match buffer.pop() {
                Some(pulse) => {
                    consumed = true;
                    updated |= self.decoder.decode(pulse).is_update();
                }
                None if buffer.has_data() => consumed = true,
                None => break,
            }
        }

        consumed.then_some(updated)
    }
}

impl<E, I, const N: usize> AngleSensor for LighthouseSensor<E, I, N>
where
    E: EdgeInput,
    I: Indicator,
{
    fn setup(&mut self) -> Result<(), SensorError> {
        if self.attached {
            return Ok(());
        }

        self.input.attach(self.channel)?;
        self.attached = true;
        Ok(())
    }

    fn process_pulses(&mut self) -> bool {
        self.channel.set_updating(true);

        let result = match self.policy {
            ProcessPolicy::Latest => self.process_latest(),
            ProcessPolicy::Backlog => self.process_backlog(),
        };

        if result.is_some() {
            self.indicator.set(false);
        }

        self.channel.set_updating(false);
        result.unwrap_or(false)
    }

    #[inline]
    fn x(&self) -> f32 {
        self.decoder.x()
    }

    #[inline]
    fn y(&self) -> f32 {
        self.decoder.y()
    }

    #[inline]
    fn is_updating(&self) -> bool {
        self.channel.is_updating()
    }
}

impl<E, I, const N: usize> Drop for LighthouseSensor<E, I, N>
where
    E: EdgeInput,
    I: Indicator,
{
    fn drop(&mut self) {
        self.channel.release();
    }
}

/// Log a one-line summary of decode counters.
pub fn report_stats<const L: usize>(stats: &DecodeStats, stream: &LogStream<L>, now_us: i64) {
    crate::sensor_info!(
        stream,
        now_us,
        "pulses={} sync={} skip={} upd={} bad={} oow={} drop={} orphan={}",
        stats.pulses,
        stats.syncs,
        stats.skipped_syncs,
        stats.updates,
        stats.unclassified,
        stats.out_of_window,
        stats.dropped,
        stats.orphan_edges
    );

    if stats.dropped > 0 {
        crate::sensor_warn!(
            stream,
            now_us,
            "consumer fell behind: {} pulses dropped",
            stats.dropped
        );
    }
}
