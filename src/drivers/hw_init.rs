//! One-shot GPIO initialisation and raw pin access.
//!
//! Configures the puzzle inputs, relay outputs and patch-cable ports using
//! raw ESP-IDF sys calls.  Called once from `main()` before the loop starts.
//! [`GpioPin`] exposes a configured pin through the `embedded_hal` digital
//! traits so drivers stay hardware-agnostic.
//!
//! On the host every pin is backed by a bit in a simulated level register
//! (idle HIGH, as with the pull-ups fitted on the board).

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::error;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::error::PeripheralError;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> error::Result<()> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_gpio_inputs()?;
        init_gpio_outputs()?;
    }
    info!("hw_init: GPIO configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> error::Result<()> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn configure(pin: i32, mode: gpio_mode_t, pull_up: bool) -> error::Result<()> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode,
        pull_up_en: if pull_up {
            gpio_pullup_t_GPIO_PULLUP_ENABLE
        } else {
            gpio_pullup_t_GPIO_PULLUP_DISABLE
        },
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(PeripheralError::GpioConfigFailed(ret).into());
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> error::Result<()> {
    let input_pins = [
        pins::WHEELS_SENSOR_GPIO,
        pins::FUEL_TRANSFER_BUTTON_GPIO,
        pins::FUEL_RESET_BUTTON_GPIO,
    ];
    for &pin in input_pins.iter().chain(pins::FUEL_PORT_GPIOS.iter()) {
        unsafe { configure(pin, gpio_mode_t_GPIO_MODE_INPUT, true)? };
    }
    info!("hw_init: GPIO inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    sim::level(pin)
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> error::Result<()> {
    let output_pins = [
        pins::WHEELS_RELAY_GPIO,
        pins::FUEL_RELAY_GPIO,
        pins::STARS_RELAY_GPIO,
        pins::FUEL_TRANSFER_LED_GPIO,
    ];
    for &pin in &output_pins {
        unsafe {
            configure(pin, gpio_mode_t_GPIO_MODE_OUTPUT, false)?;
            gpio_set_level(pin, 0);
        }
    }
    info!("hw_init: GPIO outputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // main-loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    sim::set_level(pin, high);
}

// ── Patch-cable continuity ────────────────────────────────────

/// Drive `driven` LOW and check whether the pulled-up `sensed` pin follows.
/// Both pins are returned to pulled-up inputs afterwards.
#[cfg(target_os = "espidf")]
pub fn probe_link(driven: i32, sensed: i32) -> bool {
    // SAFETY: both pins were configured as inputs in init_gpio_inputs();
    // direction changes happen on the main task only.
    unsafe {
        gpio_set_direction(sensed, gpio_mode_t_GPIO_MODE_INPUT);
        gpio_set_pull_mode(sensed, gpio_pull_mode_t_GPIO_PULLUP_ONLY);
        gpio_set_direction(driven, gpio_mode_t_GPIO_MODE_OUTPUT);
        gpio_set_level(driven, 0);

        let linked = gpio_get_level(sensed) == 0;

        gpio_set_direction(driven, gpio_mode_t_GPIO_MODE_INPUT);
        gpio_set_pull_mode(driven, gpio_pull_mode_t_GPIO_PULLUP_ONLY);
        linked
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn probe_link(driven: i32, sensed: i32) -> bool {
    sim::linked(driven, sensed)
}

// ── embedded-hal pin ──────────────────────────────────────────

/// A GPIO configured by [`init_peripherals`], addressed by number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioPin(i32);

impl GpioPin {
    pub const fn new(gpio: i32) -> Self {
        Self(gpio)
    }

    pub fn gpio(&self) -> i32 {
        self.0
    }
}

impl ErrorType for GpioPin {
    type Error = Infallible;
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        gpio_write(self.0, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        gpio_write(self.0, true);
        Ok(())
    }
}

impl InputPin for GpioPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(gpio_read(self.0))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!gpio_read(self.0))
    }
}

// ── Host simulation ───────────────────────────────────────────

/// Simulated level register and patch-cable matrix for host builds.
#[cfg(not(target_os = "espidf"))]
pub mod sim {
    use core::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    /// One bit per GPIO 0–63; all pulled up at reset.
    static LEVELS: AtomicU64 = AtomicU64::new(u64::MAX);
    /// Patched cable ends, stored as unordered pairs.
    static LINKS: Mutex<Vec<(i32, i32)>> = Mutex::new(Vec::new());

    pub fn level(pin: i32) -> bool {
        LEVELS.load(Ordering::Relaxed) & (1u64 << (pin & 63)) != 0
    }

    pub fn set_level(pin: i32, high: bool) {
        let bit = 1u64 << (pin & 63);
        if high {
            LEVELS.fetch_or(bit, Ordering::Relaxed);
        } else {
            LEVELS.fetch_and(!bit, Ordering::Relaxed);
        }
    }

    fn key(a: i32, b: i32) -> (i32, i32) {
        (a.min(b), a.max(b))
    }

    /// Patch (or unpatch) a cable between two GPIOs.  Continuity is symmetric.
    pub fn set_link(a: i32, b: i32, connected: bool) {
        let Ok(mut links) = LINKS.lock() else {
            return;
        };
        links.retain(|&pair| pair != key(a, b));
        if connected {
            links.push(key(a, b));
        }
    }

    pub fn linked(driven: i32, sensed: i32) -> bool {
        LINKS
            .lock()
            .map(|links| links.contains(&key(driven, sensed)))
            .unwrap_or(false)
    }
}
