//! Host test doubles for the hardware seams.

use core::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_storage::nor_flash::{
    check_erase, check_read, check_write, ErrorType, NorFlash, NorFlashErrorKind, ReadNorFlash,
};

use crate::bootloader::{Color, Event, Indicator, PageStore, StatusSink};
use crate::config::{ACTIVE_BASE, BOOTLOADER_BASE, FACE_COUNT, MAX_PAGES, PAGE_SIZE};
use crate::hal::{Jump, Link, WriteAccess};
use crate::protocol::Face;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashOp {
    Erase(u32),
    Write(u32),
}

/// RAM-backed program flash with the tile's page geometry.
pub struct MockFlash {
    storage: Vec<u8>,
    ops: Vec<FlashOp>,
    access: Rc<Cell<bool>>,
    pub fail_writes: bool,
}

impl MockFlash {
    pub fn load(&mut self, offset: u32, bytes: &[u8]) {
        let start = offset as usize;
        self.storage[start..start + bytes.len()].copy_from_slice(bytes);
    }

    pub fn bytes(&self, offset: u32, len: usize) -> &[u8] {
        &self.storage[offset as usize..offset as usize + len]
    }

    pub fn ops(&self) -> &[FlashOp] {
        &self.ops
    }

    /// Page indices (relative to the runnable region) in the order they were written.
    pub fn written_pages(&self) -> Vec<u32> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                FlashOp::Write(offset) => Some((offset - ACTIVE_BASE) / PAGE_SIZE as u32),
                FlashOp::Erase(_) => None,
            })
            .collect()
    }

    fn assert_access(&self) {
        assert!(self.access.get(), "flash modified outside write access");
    }
}

impl ErrorType for MockFlash {
    type Error = NorFlashErrorKind;
}

impl ReadNorFlash for MockFlash {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        check_read(self, offset, bytes.len())?;
        let start = offset as usize;
        bytes.copy_from_slice(&self.storage[start..start + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.storage.len()
    }
}

impl NorFlash for MockFlash {
    const WRITE_SIZE: usize = PAGE_SIZE;
    const ERASE_SIZE: usize = PAGE_SIZE;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        self.assert_access();
        check_erase(self, from, to)?;
        for byte in &mut self.storage[from as usize..to as usize] {
            *byte = 0xFF;
        }
        self.ops.push(FlashOp::Erase(from));
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        self.assert_access();
        check_write(self, offset, bytes.len())?;
        if self.fail_writes {
            return Err(NorFlashErrorKind::Other);
        }
        let start = offset as usize;
        for (slot, &value) in self.storage[start..start + bytes.len()].iter_mut().zip(bytes) {
            // NOR flash can only clear bits of an erased cell
            if *slot != 0xFF {
                return Err(NorFlashErrorKind::Other);
            }
            *slot = value;
        }
        self.ops.push(FlashOp::Write(offset));
        Ok(())
    }
}

pub struct MockAccess {
    open: Rc<Cell<bool>>,
    scopes: Rc<Cell<usize>>,
}

impl MockAccess {
    pub fn scopes(&self) -> usize {
        self.scopes.get()
    }
}

impl WriteAccess for MockAccess {
    fn with_write_access<R>(&mut self, body: impl FnOnce() -> R) -> R {
        assert!(!self.open.get(), "nested write access");
        self.open.set(true);
        self.scopes.set(self.scopes.get() + 1);
        let result = body();
        self.open.set(false);
        result
    }
}

pub fn mock_flash_pair() -> (MockFlash, MockAccess) {
    let open = Rc::new(Cell::new(false));
    let flash = MockFlash {
        storage: std::vec![0xFF; BOOTLOADER_BASE as usize],
        ops: Vec::new(),
        access: open.clone(),
        fail_writes: false,
    };
    let access = MockAccess {
        open,
        scopes: Rc::new(Cell::new(0)),
    };
    (flash, access)
}

pub fn mock_store() -> PageStore<MockFlash, MockAccess> {
    let (flash, access) = mock_flash_pair();
    PageStore::new(flash, access, ACTIVE_BASE, MAX_PAGES)
}

/// Scripted transceivers: queued packets per face, recorded outgoing packets.
#[derive(Default)]
pub struct MockLink {
    inbox: [VecDeque<Vec<u8>>; FACE_COUNT as usize],
    sending: Option<(Face, Vec<u8>)>,
    pub sent: Vec<(Face, Vec<u8>)>,
    pub busy: bool,
}

impl MockLink {
    pub fn receive(&mut self, face: Face, bytes: &[u8]) {
        self.inbox[face.index()].push_back(bytes.to_vec());
    }

    pub fn pending(&self, face: Face) -> usize {
        self.inbox[face.index()].len()
    }
}

impl Link for MockLink {
    fn is_packet_ready(&self, face: Face) -> bool {
        !self.inbox[face.index()].is_empty()
    }

    fn packet_bytes(&self, face: Face) -> &[u8] {
        self.inbox[face.index()]
            .front()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn mark_packet_consumed(&mut self, face: Face) {
        self.inbox[face.index()].pop_front();
    }

    fn begin_send(&mut self, face: Face) -> bool {
        if self.busy {
            return false;
        }
        self.sending = Some((face, Vec::new()));
        true
    }

    fn send_byte(&mut self, byte: u8) {
        if let Some((_, bytes)) = self.sending.as_mut() {
            bytes.push(byte);
        }
    }

    fn end_send(&mut self) {
        if let Some(packet) = self.sending.take() {
            self.sent.push(packet);
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl StatusSink for RecordingSink {
    fn show(&mut self, event: Event) {
        self.events.push(event);
    }
}

#[derive(Default)]
pub struct RecordingIndicator {
    pub calls: Vec<(Face, Color)>,
}

impl Indicator for RecordingIndicator {
    fn set(&mut self, face: Face, color: Color) {
        self.calls.push((face, color));
    }
}

/// Unwinds instead of jumping so tests can observe the hand-off.
pub struct MockJump;

impl Jump for MockJump {
    fn jump_to(&mut self, address: u32) -> ! {
        panic!("jump to {:#06x}", address)
    }
}

pub fn page_of(seed: u8) -> [u8; PAGE_SIZE] {
    let mut page = [0u8; PAGE_SIZE];
    for (i, b) in page.iter_mut().enumerate() {
        *b = seed.wrapping_mul(37).wrapping_add(i as u8) ^ 0x5A;
    }
    page
}
