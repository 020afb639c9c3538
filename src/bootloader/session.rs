//! Download session state machine

use embedded_storage::nor_flash::NorFlash;
use ufmt::derive::uDebug;

use super::page_store::PageStore;
use crate::hal::WriteAccess;
use crate::protocol::{Face, Message, Packet, PagePush, SeedAnnouncement};

#[derive(Debug, uDebug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for a seed announcement
    Listening,
    Downloading,
    Done,
}

/// What a packet means for the current session, decided without side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    Begin(SeedAnnouncement),
    Commit(PagePush<'a>),
    /// Push for a page other than the one we need
    Stale(u8),
    Ignore,
}

/// Result of applying a packet to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Armed,
    Committed { page: u8, complete: bool },
    Stale { page: u8 },
    StoreFailed { page: u8 },
}

/// The single transfer this boot can perform.
pub struct Session {
    state: State,
    source: Face,
    expected_page: u8,
    total_pages: u8,
    target_checksum: u16,
    running_checksum: u16,
}

impl Session {
    pub const fn new() -> Self {
        Self {
            state: State::Listening,
            source: Face(0),
            expected_page: 0,
            total_pages: 0,
            target_checksum: 0,
            running_checksum: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Face the transfer is bound to. Meaningless while listening.
    #[inline]
    pub fn source(&self) -> Face {
        self.source
    }

    #[inline]
    pub fn expected_page(&self) -> u8 {
        self.expected_page
    }

    #[inline]
    pub fn total_pages(&self) -> u8 {
        self.total_pages
    }

    #[inline]
    pub fn target_checksum(&self) -> u16 {
        self.target_checksum
    }

    #[inline]
    pub fn running_checksum(&self) -> u16 {
        self.running_checksum
    }

    /// Whether the pages received so far add up to the announced checksum.
    pub fn checksum_matches(&self) -> bool {
        self.running_checksum == self.target_checksum
    }

    pub fn classify<'a>(&self, packet: &Packet<'a>) -> Action<'a> {
        match (self.state, packet.message) {
            (State::Listening, Message::Seed(seed)) => Action::Begin(seed),
            (State::Downloading, Message::Push(push)) if push.page_index == self.expected_page => {
                Action::Commit(push)
            }
            (State::Downloading, Message::Push(push)) => Action::Stale(push.page_index),
            _ => Action::Ignore,
        }
    }

    /// Apply a decoded packet, committing its page when it is the next one.
    pub fn handle<F: NorFlash, G: WriteAccess>(
        &mut self,
        packet: &Packet<'_>,
        store: &mut PageStore<F, G>,
    ) -> Outcome {
        match self.classify(packet) {
            Action::Begin(seed) => {
                self.begin(packet.face, seed);
                Outcome::Armed
            }
            Action::Commit(push) => self.commit(push, store),
            Action::Stale(page) => Outcome::Stale { page },
            Action::Ignore => Outcome::Ignored,
        }
    }

    /// Stop accepting packets. Used once control is about to leave the bootloader.
    pub fn finish(&mut self) {
        self.state = State::Done;
    }

    fn begin(&mut self, face: Face, seed: SeedAnnouncement) {
        self.source = face;
        self.total_pages = seed.total_pages;
        self.target_checksum = seed.program_checksum;
        self.expected_page = 0;
        self.running_checksum = 0;
        self.state = State::Downloading;
    }

    fn commit<F: NorFlash, G: WriteAccess>(
        &mut self,
        push: PagePush<'_>,
        store: &mut PageStore<F, G>,
    ) -> Outcome {
        let page = self.expected_page;

        if store.commit_page(page, push.payload).is_err() {
            return Outcome::StoreFailed { page };
        }

        self.running_checksum = self
            .running_checksum
            .wrapping_add(u16::from(push.sum()) + u16::from(page));
        self.expected_page += 1;

        let complete = self.expected_page == self.total_pages;
        if complete {
            self.state = State::Done;
        }

        Outcome::Committed { page, complete }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
