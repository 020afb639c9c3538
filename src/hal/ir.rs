//! Bindings to the tile core library's IR link layer and pixel driver.

use core::slice;

use super::Link;
use crate::bootloader::{Color, Indicator};
use crate::protocol::Face;

extern "C" {
    fn ir_init();
    fn ir_enable();
    fn ir_periodic_update();
    fn ir_is_packet_ready(face: u8) -> bool;
    fn ir_packet_len(face: u8) -> u8;
    fn ir_packet_buffer(face: u8) -> *const u8;
    fn ir_mark_packet_read(face: u8);
    fn ir_send_begin(face: u8) -> bool;
    fn ir_send_byte(byte: u8);
    fn ir_send_complete();

    fn pixel_init();
    fn pixel_enable();
    fn pixel_set_coarse(face: u8, color: u8);
}

/// Samples the IR receivers. Called from both timer interrupts.
#[inline(always)]
pub fn service() {
    unsafe { ir_periodic_update() };
}

pub struct IrLink {
    _private: (),
}

impl IrLink {
    pub fn new() -> Self {
        unsafe {
            ir_init();
            ir_enable();
        }
        Self { _private: () }
    }
}

impl Link for IrLink {
    fn is_packet_ready(&self, face: Face) -> bool {
        unsafe { ir_is_packet_ready(face.0) }
    }

    fn packet_bytes(&self, face: Face) -> &[u8] {
        // The buffer stays put until the packet is marked read
        unsafe {
            let len = usize::from(ir_packet_len(face.0));
            slice::from_raw_parts(ir_packet_buffer(face.0), len)
        }
    }

    fn mark_packet_consumed(&mut self, face: Face) {
        unsafe { ir_mark_packet_read(face.0) }
    }

    fn begin_send(&mut self, face: Face) -> bool {
        unsafe { ir_send_begin(face.0) }
    }

    fn send_byte(&mut self, byte: u8) {
        unsafe { ir_send_byte(byte) }
    }

    fn end_send(&mut self) {
        unsafe { ir_send_complete() }
    }
}

pub struct CorePixels {
    _private: (),
}

impl CorePixels {
    pub fn new() -> Self {
        unsafe {
            pixel_init();
            pixel_enable();
        }
        Self { _private: () }
    }
}

impl Indicator for CorePixels {
    fn set(&mut self, face: Face, color: Color) {
        unsafe { pixel_set_coarse(face.0, color as u8) }
    }
}
