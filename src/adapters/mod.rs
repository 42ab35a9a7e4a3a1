//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements             | Connects to                  |
//! |-------------|------------------------|------------------------------|
//! | `hardware`  | InputPort, OutputPort  | GPIO, I²C keypad/clock, LEDs |
//! | `broker`    | EventSink              | any `TransportPort`          |
//! | `mqtt`      | TransportPort          | ESP-IDF MQTT client          |
//! | `log_sink`  | EventSink              | Serial log output            |
//! | `wifi`      | ConnectivityPort       | ESP-IDF WiFi STA             |
//! | `time`      | -                      | ESP32 system timer           |
//! | `device_id` | -                      | eFuse MAC                    |

pub mod broker;
pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
