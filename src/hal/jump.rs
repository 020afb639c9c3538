use core::arch::asm;

use avr_device::atmega168::CPU;

use super::Jump;
use crate::config::RAMEND;

// MCUCR interrupt vector select bits
const IVCE: u8 = 1 << 0;
const IVSEL: u8 = 1 << 1;

/// Timed sequence; interrupts must be masked. Other MCUCR bits are kept.
fn select_vectors(ivsel: u8) {
    unsafe {
        let p = CPU::ptr();
        let keep = (*p).mcucr.read().bits() & !(IVCE | IVSEL);
        (*p).mcucr.write(|w| w.bits(keep | IVCE));
        (*p).mcucr.write(|w| w.bits(keep | ivsel));
    }
}

/// Serve interrupts from the boot section while the bootloader runs.
pub fn vectors_to_bootloader() {
    select_vectors(IVSEL);
}

pub fn vectors_to_application() {
    select_vectors(0);
}

/// Jumps as if the program had just come out of reset.
pub struct ResetJump {
    _private: (),
}

impl ResetJump {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for ResetJump {
    fn default() -> Self {
        Self::new()
    }
}

impl Jump for ResetJump {
    fn jump_to(&mut self, address: u32) -> ! {
        avr_device::interrupt::disable();
        vectors_to_application();

        // ijmp takes a word address; SP is reloaded so the game starts with a clean stack
        let [sp_low, sp_high] = RAMEND.to_le_bytes();
        unsafe {
            asm!(
                "out 0x3e, {sp_high}",
                "out 0x3d, {sp_low}",
                "ijmp",
                sp_high = in(reg) sp_high,
                sp_low = in(reg) sp_low,
                in("Z") (address / 2) as u16,
                options(noreturn),
            )
        }
    }
}
