fn main() {
    // ESP-IDF link args only exist when cross-compiling for the chip.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
