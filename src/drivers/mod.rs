//! Peripheral drivers, hardware initialisation, and LED animation helpers.

pub mod clock_display;
pub mod debounce;
pub mod hw_init;
pub mod keypad;
pub mod led_patterns;
pub mod pixels;
pub mod relay;
pub mod watchdog;
