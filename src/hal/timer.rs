use avr_device::atmega168::TC0;

// TIMSK0 bits
const TOIE0: u8 = 1 << 0;
const OCIE0A: u8 = 1 << 1;
// TIFR0 bits, cleared by writing one
const TOV0: u8 = 1 << 0;
const OCF0A: u8 = 1 << 1;
const PRESCALER_MASK: u8 = 0x07;

/// Compare point halfway through the 8-bit period
const HALF_PERIOD: u8 = 128;

#[derive(Clone, Copy)]
pub enum Prescaler {
    Stop = 0,
    Direct = 1,
    Div8 = 2,
    Div64 = 3,
    Div256 = 4,
    Div1024 = 5,
}

/// Timer0 in normal mode, interrupting on overflow and at half period.
///
/// With `Div8` at 8 MHz the overflow comes every 256 µs.
pub struct TickTimer {
    _private: (),
}

impl TickTimer {
    pub fn new() -> Self {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0a.write(|w| w.bits(0));
            (*p).tccr0b.write(|w| w.bits(0));
            (*p).tcnt0.write(|w| w.bits(0));
            (*p).ocr0a.write(|w| w.bits(HALF_PERIOD));
        }
        Self { _private: () }
    }

    pub fn start(&mut self, prescaler: Prescaler) {
        unsafe {
            let p = TC0::ptr();
            (*p).tccr0b.modify(|r, w| {
                w.bits((r.bits() & !PRESCALER_MASK) | (prescaler as u8 & PRESCALER_MASK))
            });
        }
    }

    pub fn enable_interrupts(&mut self) {
        unsafe {
            let p = TC0::ptr();
            (*p).timsk0.write(|w| w.bits(TOIE0 | OCIE0A));
        }
    }

    /// Stops counting and masks both interrupts, leaving the timer as reset left it.
    pub fn release(self) {
        unsafe {
            let p = TC0::ptr();
            (*p).timsk0.write(|w| w.bits(0));
            (*p).tccr0b.write(|w| w.bits(0));
            (*p).tcnt0.write(|w| w.bits(0));
            (*p).ocr0a.write(|w| w.bits(0));
            (*p).tifr0.write(|w| w.bits(TOV0 | OCF0A));
        }
    }
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new()
    }
}
