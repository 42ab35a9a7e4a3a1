//! Task Watchdog Timer (TWDT) guard for the control loop.
//!
//! Resets the controller if the game loop stalls, e.g. on a wedged I²C
//! transaction or a blocking MQTT call.  The loop feeds it once per tick.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Stall limit; generous against the 10 ms tick but well under a minute of
/// frozen room.
pub const WATCHDOG_TIMEOUT_MS: u32 = 5_000;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
    feeds: u32,
}

impl Watchdog {
    /// Reconfigure the TWDT and subscribe the calling task.
    #[cfg(target_os = "espidf")]
    pub fn new(timeout_ms: u32) -> Self {
        // SAFETY: TWDT configuration happens once from the main task.
        unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK {
                log::warn!("Watchdog: reconfigure returned {} (already running?)", ret);
            }

            let subscribed = esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK;
            if subscribed {
                log::info!("Watchdog: control loop subscribed ({} ms)", timeout_ms);
            } else {
                log::warn!("Watchdog: subscribe failed, loop is unguarded");
            }
            Self { subscribed, feeds: 0 }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(timeout_ms: u32) -> Self {
        log::info!("Watchdog(sim): {} ms, no-op", timeout_ms);
        Self { feeds: 0 }
    }

    /// Feed the watchdog.  Call once per loop iteration.
    pub fn feed(&mut self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                // SAFETY: resets the TWDT entry of the subscribed current task.
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
        self.feeds = self.feeds.wrapping_add(1);
    }

    pub fn feeds(&self) -> u32 {
        self.feeds
    }
}
