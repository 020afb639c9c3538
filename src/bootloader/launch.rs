//! Final hand-off out of the bootloader.
//!
//! Both paths end in a jump to the start of the runnable region and never
//! come back. The fallback first restores the built-in game there.

use embedded_storage::nor_flash::NorFlash;
use ufmt::derive::uDebug;

use super::page_store::PageStore;
use crate::config::{ACTIVE_BASE, BUILTIN_BASE};
use crate::hal::{Jump, WriteAccess};

#[derive(Debug, uDebug, Clone, Copy, PartialEq, Eq)]
pub enum Handoff {
    /// Run the freshly downloaded game
    Launch,
    /// Restore the built-in game, then run it
    Fallback,
}

pub struct LaunchController<J> {
    jump: J,
    entry: u32,
    builtin: u32,
}

impl<J: Jump> LaunchController<J> {
    pub fn new(jump: J) -> Self {
        Self {
            jump,
            entry: ACTIVE_BASE,
            builtin: BUILTIN_BASE,
        }
    }

    pub fn handoff<F: NorFlash, G: WriteAccess>(
        mut self,
        handoff: Handoff,
        store: &mut PageStore<F, G>,
    ) -> ! {
        if handoff == Handoff::Fallback {
            // Nothing better to run if the copy fails part way
            store.copy_region(self.builtin).ok();
        }

        self.jump.jump_to(self.entry)
    }
}
