use std::env;
use std::path::PathBuf;

// Must match config::BOOTLOADER_BASE
const BOOTLOADER_BASE: u32 = 0x3800;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=TILECORE_LIB_DIR");

    // Host builds only compile the library for unit tests
    let target = env::var("TARGET").unwrap_or_default();
    if !target.contains("avr") {
        return;
    }

    // Configure for ATmega168
    println!("cargo:rustc-link-arg=-mmcu=atmega168");

    // The boot section is fixed by hardware; the linker wants byte addresses
    println!(
        "cargo:rustc-link-arg=-Wl,--section-start=.text={:#x}",
        BOOTLOADER_BASE
    );

    // IR link layer and pixel driver come from the tile core library
    if let Ok(dir) = env::var("TILECORE_LIB_DIR") {
        let dir = PathBuf::from(dir);
        println!("cargo:rustc-link-search=native={}", dir.display());
        println!("cargo:rustc-link-lib=static=tilecore");
    } else {
        println!("cargo:warning=TILECORE_LIB_DIR not set, tile core must be linked manually");
    }

    println!("cargo:warning=Building tileboot for ATmega168 at 8MHz");
}
