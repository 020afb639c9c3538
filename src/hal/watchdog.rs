use avr_device::atmega168::{CPU, WDT};

// MCUSR watchdog reset flag
const WDRF: u8 = 1 << 3;
// WDTCSR change enable and system reset enable
const WDCE_WDE: u8 = 0x18;

pub struct Watchdog {
    _private: (),
}

impl Watchdog {
    #[inline]
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// WDE cannot be cleared while WDRF is set, so the flag goes first.
    #[inline]
    pub fn disable(&mut self) {
        unsafe {
            let cpu = CPU::ptr();
            (*cpu).mcusr.modify(|r, w| w.bits(r.bits() & !WDRF));

            let p = WDT::ptr();
            // Timed sequence to disable watchdog
            (*p).wdtcsr.write(|w| w.bits(WDCE_WDE));
            (*p).wdtcsr.write(|w| w.bits(0x00));
        }
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}
