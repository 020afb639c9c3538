use embedded_hal::serial;
use ufmt::{uWrite, uwrite};

use crate::bootloader::{Event, StatusSink};

/// Blocking text output over any serial transmitter.
pub struct SerialConsole<W> {
    tx: W,
}

impl<W: serial::Write<u8>> SerialConsole<W> {
    pub fn new(tx: W) -> Self {
        Self { tx }
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), W::Error> {
        nb::block!(self.tx.write(byte))
    }
}

impl<W: serial::Write<u8>> uWrite for SerialConsole<W> {
    type Error = W::Error;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for byte in s.bytes() {
            self.write_byte(byte)?;
        }
        Ok(())
    }
}

/// Logs every event to the console before passing it on.
pub struct Traced<S, W> {
    inner: S,
    console: SerialConsole<W>,
}

impl<S: StatusSink, W: serial::Write<u8>> Traced<S, W> {
    pub fn new(inner: S, console: SerialConsole<W>) -> Self {
        Self { inner, console }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: StatusSink, W: serial::Write<u8>> StatusSink for Traced<S, W> {
    fn show(&mut self, event: Event) {
        // Tracing must never hold up the download
        uwrite!(&mut self.console, "[boot] {:?}\r\n", event).ok();
        self.inner.show(event);
    }
}
