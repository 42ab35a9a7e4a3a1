//! GPIO pin assignments and LED strip layout for the room controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers or pixel indices.

// ---------------------------------------------------------------------------
// Wheels puzzle
// ---------------------------------------------------------------------------

/// Digital input (pull-up): HIGH once the wheels are aligned.
pub const WHEELS_SENSOR_GPIO: i32 = 15;
/// Compartment relay behind the wheels puzzle.
pub const WHEELS_RELAY_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Fuel puzzle
// ---------------------------------------------------------------------------

/// Pour button (pull-up, LOW = pressed).
pub const FUEL_TRANSFER_BUTTON_GPIO: i32 = 35;
/// Local reset button (pull-up, LOW = pressed).
pub const FUEL_RESET_BUTTON_GPIO: i32 = 34;
/// Indicator lit while the patched containers can pour.
pub const FUEL_TRANSFER_LED_GPIO: i32 = 32;
/// Compartment relay behind the fuel puzzle.
pub const FUEL_RELAY_GPIO: i32 = 12;
/// Patch-cable ports, one per container.  Probed pairwise for continuity.
pub const FUEL_PORT_GPIOS: [i32; 3] = [25, 26, 27];

// ---------------------------------------------------------------------------
// Stars puzzle
// ---------------------------------------------------------------------------

/// Compartment relay behind the stars puzzle.
pub const STARS_RELAY_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// I²C bus (PCF8574 keypad expander + TM1650 clock display)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
pub const I2C_BAUD_HZ: u32 = 100_000;
/// PCF8574 address of the keypad matrix.
pub const KEYPAD_I2C_ADDR: u8 = 0x20;

// ---------------------------------------------------------------------------
// WS2812 strip
// ---------------------------------------------------------------------------

/// Data line of the addressable LED strip (RMT channel 0).
pub const PIXEL_DATA_GPIO: i32 = 33;
/// Pixels on the strip.
pub const PIXEL_COUNT: usize = 25;

/// Physical pixel for each fuel level unit, containers laid out back to back
/// (container 0 units first).  The middle container is wired in reverse.
pub const FUEL_LED_MAP: [usize; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 12, 11, 10, 9, 8, 13, 14, 15];

/// Ambient star pixels.
pub const STAR_LEDS: [usize; 4] = [16, 17, 18, 19];

/// Wheels hint pixel.
pub const WHEELS_HINT_LED: usize = 20;

/// Keypad feedback pixels; also the passcode progress indicator.
pub const STAR_PROGRESS_LEDS: [usize; 4] = [21, 22, 23, 24];
