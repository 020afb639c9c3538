//! IR download protocol: wire constants, faces and the packet codec

pub mod packet;

use ufmt::derive::uDebug;

pub use packet::{
    encode_pull, encode_push, encode_seed, push_sum, Message, Packet, PagePush, SeedAnnouncement,
};

use crate::config::PAGE_SIZE;

/// Neighbor offers us a game
pub const HEADER_SEED: u8 = 0xE1;
/// One page of game code
pub const HEADER_PUSH: u8 = 0xE2;
/// We ask the neighbor for a page
pub const HEADER_PULL: u8 = 0xE3;

pub const SEED_LEN: usize = 4;
pub const PUSH_LEN: usize = PAGE_SIZE + 3;
pub const PULL_LEN: usize = 2;

#[derive(Debug, uDebug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Length does not match the size encoded by the header byte
    InvalidLength,
    UnknownHeader,
    InvalidChecksum,
    /// Announced game is empty or larger than the runnable region
    PageCountOutOfRange,
}

pub type Result<T> = core::result::Result<T, ProtocolError>;

/// One of the IR transceivers around the tile.
#[derive(Debug, uDebug, Clone, Copy, PartialEq, Eq)]
pub struct Face(pub u8);

impl Face {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
