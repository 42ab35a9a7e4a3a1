//! Device identity derived from the ESP32 factory MAC address.
//!
//! Several controllers can share one broker, so the MQTT client id is the
//! configured prefix plus the last 3 bytes of the 6-byte MAC in uppercase
//! hex (`ESP32Client-EFCAFE`).  Deterministic across reboots.

/// Fixed-size client id string.
pub type ClientIdString = heapless::String<32>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// `<prefix>-XXYYZZ`.  An over-long prefix is cut so the suffix survives.
pub fn client_id(prefix: &str, mac: &MacAddress) -> ClientIdString {
    use core::fmt::Write;

    const SUFFIX_LEN: usize = 7;
    let mut id = ClientIdString::new();
    for c in prefix.chars() {
        if id.len() + c.len_utf8() + SUFFIX_LEN > id.capacity() {
            break;
        }
        let _ = id.push(c);
    }
    let _ = write!(id, "-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    id
}
