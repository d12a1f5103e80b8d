//! Monotonic timestamp sources for the edge ISR.
//!
//! Each clock pairs with a [`TimeBase`](crate::config::TimeBase):
//! - [`EspTimerClock`]: `TimeBase::MICROS`
//! - [`CycleClock`]: `TimeBase::cycles(cpu_mhz)`

use esp_idf_svc::sys;

/// Timestamp source readable from interrupt context.
pub trait Clock {
    /// Current time in ticks, wrapping at `u32::MAX`.
    fn now() -> u32;
}

/// 64-bit esp_timer, truncated to 32 bits (µs, wraps every ~71 minutes).
pub struct EspTimerClock;

impl Clock for EspTimerClock {
    #[inline(always)]
    fn now() -> u32 {
        // SAFETY: esp_timer_get_time is ISR-safe and has no preconditions
        unsafe { sys::esp_timer_get_time() as u32 }
    }
}

/// CPU cycle counter (CCOUNT). At 240 MHz wraps every ~17.9s.
#[cfg(target_arch = "xtensa")]
pub struct CycleClock;

#[cfg(target_arch = "xtensa")]
impl Clock for CycleClock {
    #[inline(always)]
    fn now() -> u32 {
        // SAFETY: reads a special register, no side effects
        unsafe { sys::xthal_get_ccount() }
    }
}
