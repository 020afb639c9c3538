use core::convert::Infallible;

use avr_device::atmega168::USART0;
use embedded_hal::serial;

use crate::config::{CPU_FREQ_HZ, UART_BAUD};

// UCSR0A
const U2X0: u8 = 1 << 1;
const UDRE0: u8 = 1 << 5;
const TXC0: u8 = 1 << 6;
// UCSR0B
const TXEN0: u8 = 1 << 3;
// UCSR0C: asynchronous 8N1
const FRAME_8N1: u8 = 0x06;

// Double speed mode divides by 8
const UBRR: u16 = (CPU_FREQ_HZ / (8 * UART_BAUD) - 1) as u16;

/// Transmit-only debug port.
pub struct Usart0 {
    _private: (),
}

impl Usart0 {
    pub fn new() -> Self {
        unsafe {
            let p = USART0::ptr();
            (*p).ubrr0.write(|w| w.bits(UBRR));
            (*p).ucsr0a.write(|w| w.bits(U2X0));
            (*p).ucsr0c.write(|w| w.bits(FRAME_8N1));
            (*p).ucsr0b.write(|w| w.bits(TXEN0));
        }
        Self { _private: () }
    }
}

impl Default for Usart0 {
    fn default() -> Self {
        Self::new()
    }
}

impl serial::Write<u8> for Usart0 {
    type Error = Infallible;

    fn write(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        unsafe {
            let p = USART0::ptr();
            if (*p).ucsr0a.read().bits() & UDRE0 == 0 {
                return Err(nb::Error::WouldBlock);
            }
            // Writing TXC0 clears it, keeping U2X0 set
            (*p).ucsr0a.write(|w| w.bits(U2X0 | TXC0));
            (*p).udr0.write(|w| w.bits(byte));
        }
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        unsafe {
            let p = USART0::ptr();
            if (*p).ucsr0a.read().bits() & TXC0 == 0 {
                return Err(nb::Error::WouldBlock);
            }
        }
        Ok(())
    }
}
