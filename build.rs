// Lighthouse Sensor - Build Script
//
// Forwards the ESP-IDF build environment when building firmware.
// Host builds (library + tests) need no ESP-IDF setup.

fn main() {
    // ESP-IDF environment setup (MUST be first for firmware builds!)
    if std::env::var_os("CARGO_FEATURE_FIRMWARE").is_some() {
        embuild::espidf::sysenv::output();
    }

    println!("cargo:rerun-if-changed=build.rs");
}
