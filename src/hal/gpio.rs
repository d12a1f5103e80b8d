//! GPIO HAL for the photodiode input and the activity LED.
//!
//! The edge ISR is registered through the ESP-IDF GPIO ISR service, one
//! handler per pin, monomorphised over pin, LED and clock so the interrupt
//! path has no dynamic dispatch and no lookups.

use core::ffi::c_void;
use core::marker::PhantomData;

use esp_idf_svc::sys::{self, esp, EspError};

use super::clock::Clock;
use crate::error::SensorError;
use crate::sensor::{EdgeInput, Indicator};
use crate::timestamper::EdgeTimestamper;

/// LED pin value meaning "no LED fitted".
pub const NO_LED: i32 = -1;

/// Photodiode input on GPIO `PIN`, timestamped with clock `C`.
///
/// The ISR drives GPIO `LED` high on every edge unless `LED == NO_LED`.
pub struct EspEdgeInput<const PIN: i32, C: Clock, const LED: i32 = NO_LED> {
    _clock: PhantomData<C>,
}

impl<const PIN: i32, C: Clock, const LED: i32> EspEdgeInput<PIN, C, LED> {
    /// Configure `PIN` as a floating input with any-edge interrupt.
    pub fn new() -> Result<Self, EspError> {
        let config = sys::gpio_config_t {
            pin_bit_mask: 1u64 << PIN,
            mode: sys::gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: sys::gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: sys::gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: sys::gpio_int_type_t_GPIO_INTR_ANYEDGE,
            ..Default::default()
        };

        // SAFETY: config is fully initialised and PIN is a valid GPIO number
        esp!(unsafe { sys::gpio_config(&config) })?;

        Ok(Self {
            _clock: PhantomData,
        })
    }
}

/// Edge ISR for one pin. `arg` is the `&'static EdgeTimestamper<N>`.
unsafe extern "C" fn edge_isr<const PIN: i32, C: Clock, const LED: i32, const N: usize>(
    arg: *mut c_void,
) {
    let now = C::now();

    // SAFETY: arg was registered from a &'static EdgeTimestamper<N>
    let channel = unsafe { &*(arg as *const EdgeTimestamper<N>) };
    let level_high = unsafe { sys::gpio_get_level(PIN) } != 0;

    channel.on_edge(level_high, now);

    if LED != NO_LED {
        unsafe {
            sys::gpio_set_level(LED, 1);
        }
    }
}

impl<const PIN: i32, C: Clock, const LED: i32> EdgeInput for EspEdgeInput<PIN, C, LED> {
    fn attach<const N: usize>(
        &mut self,
        channel: &'static EdgeTimestamper<N>,
    ) -> Result<(), SensorError> {
        // SAFETY: the handler only touches the 'static channel and GPIO registers
        unsafe {
            // Shared service: already installed by another driver is fine
            let err = sys::gpio_install_isr_service(0);
            if err != sys::ESP_OK as sys::esp_err_t
                && err != sys::ESP_ERR_INVALID_STATE as sys::esp_err_t
            {
                return Err(SensorError::Attach(err));
            }

            esp!(sys::gpio_isr_handler_add(
                PIN,
                Some(edge_isr::<PIN, C, LED, N>),
                channel as *const EdgeTimestamper<N> as *mut c_void,
            ))
            .map_err(attach_error)?;

            esp!(sys::gpio_intr_enable(PIN)).map_err(attach_error)?;
        }

        Ok(())
    }
}

fn attach_error(err: EspError) -> SensorError {
    SensorError::Attach(err.code())
}

/// Activity LED on GPIO `LED`.
pub struct EspIndicator<const LED: i32>;

impl<const LED: i32> EspIndicator<LED> {
    /// Configure `LED` as a push-pull output, initially off.
    pub fn new() -> Result<Self, EspError> {
        // SAFETY: LED is a valid output-capable GPIO number
        unsafe {
            esp!(sys::gpio_reset_pin(LED))?;
            esp!(sys::gpio_set_direction(LED, sys::gpio_mode_t_GPIO_MODE_OUTPUT))?;
            esp!(sys::gpio_set_level(LED, 0))?;
        }
        Ok(Self)
    }
}

impl<const LED: i32> Indicator for EspIndicator<LED> {
    #[inline]
    fn set(&mut self, on: bool) {
        // SAFETY: pin configured as output in new()
        unsafe {
            sys::gpio_set_level(LED, u32::from(on));
        }
    }
}
