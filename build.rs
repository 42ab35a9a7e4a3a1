fn main() {
    println!("cargo:rerun-if-env-changed=ESCAPE_ROOM_CONFIG");

    // ESP-IDF link args are only meaningful for the firmware build.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
