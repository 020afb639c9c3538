//! Tile bootloader: downloads a game over the IR faces into flash and
//! hands control to it, falling back to the built-in game.

#![no_std]
#![cfg_attr(target_arch = "avr", feature(asm_experimental_arch))]

#[cfg(test)]
extern crate std;

pub mod bootloader;
pub mod config;
pub mod drivers;
pub mod hal;
pub mod protocol;

#[cfg(test)]
mod testing;
