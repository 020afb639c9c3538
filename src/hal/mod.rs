//! Hardware seams of the bootloader.
//!
//! The traits here are what the download logic talks to. The AVR modules
//! implement them on the tile; host tests implement them with mocks.

#[cfg(target_arch = "avr")]
pub mod flash;
#[cfg(target_arch = "avr")]
pub mod ir;
#[cfg(target_arch = "avr")]
pub mod jump;
#[cfg(target_arch = "avr")]
pub mod timer;
#[cfg(target_arch = "avr")]
pub mod uart;
#[cfg(target_arch = "avr")]
pub mod watchdog;

#[cfg(target_arch = "avr")]
pub use flash::{SpmAccess, SpmFlash};
#[cfg(target_arch = "avr")]
pub use ir::{CorePixels, IrLink};
#[cfg(target_arch = "avr")]
pub use jump::ResetJump;
#[cfg(target_arch = "avr")]
pub use timer::{Prescaler, TickTimer};
#[cfg(target_arch = "avr")]
pub use uart::Usart0;
#[cfg(target_arch = "avr")]
pub use watchdog::Watchdog;

use crate::protocol::Face;

/// Packet-level access to the IR transceivers.
///
/// A face holds at most one received packet until it is marked consumed.
pub trait Link {
    fn is_packet_ready(&self, face: Face) -> bool;

    /// Bytes of the pending packet on `face`. Only valid while it is ready.
    fn packet_bytes(&self, face: Face) -> &[u8];

    fn mark_packet_consumed(&mut self, face: Face);

    /// Starts an outgoing packet. Fails when the face is busy receiving.
    fn begin_send(&mut self, face: Face) -> bool;

    fn send_byte(&mut self, byte: u8);

    fn end_send(&mut self);
}

/// Scoped permission to rewrite the flash we might otherwise execute from.
///
/// Nothing may run out of the runnable region while `body` executes, and the
/// previous execution state is restored once it returns.
pub trait WriteAccess {
    fn with_write_access<R>(&mut self, body: impl FnOnce() -> R) -> R;
}

/// Final transfer of control into a program image.
pub trait Jump {
    fn jump_to(&mut self, address: u32) -> !;
}
