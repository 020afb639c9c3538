//! Page-granular writer for the runnable region.
//!
//! The region is addressed by page index from `base`. Each commit erases and
//! rewrites one page inside a single write-access scope, so no interrupt or
//! other code path can observe or execute a half-written page.

use embedded_storage::nor_flash::NorFlash;

use crate::config::PAGE_SIZE;
use crate::hal::WriteAccess;

/// Bytes compared per read when checking a page against new contents
const COMPARE_CHUNK: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError<E> {
    /// Page index (or copy source) outside the flash we may touch
    OutOfRange,
    Flash(E),
}

pub type Result<T, E> = core::result::Result<T, StoreError<E>>;

pub struct PageStore<F, G> {
    flash: F,
    access: G,
    base: u32,
    capacity: u8,
}

impl<F: NorFlash, G: WriteAccess> PageStore<F, G> {
    pub fn new(flash: F, access: G, base: u32, capacity: u8) -> Self {
        Self {
            flash,
            access,
            base,
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> u8 {
        self.capacity
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    pub fn access(&self) -> &G {
        &self.access
    }

    fn offset(&self, index: u8) -> Result<u32, F::Error> {
        if index >= self.capacity {
            return Err(StoreError::OutOfRange);
        }
        Ok(self.base + u32::from(index) * PAGE_SIZE as u32)
    }

    /// Erase page `index` and program `data` into it.
    pub fn commit_page(&mut self, index: u8, data: &[u8; PAGE_SIZE]) -> Result<(), F::Error> {
        let offset = self.offset(index)?;
        let flash = &mut self.flash;

        self.access
            .with_write_access(|| {
                flash.erase(offset, offset + PAGE_SIZE as u32)?;
                flash.write(offset, data)
            })
            .map_err(StoreError::Flash)
    }

    pub fn read_page(&mut self, index: u8, buffer: &mut [u8; PAGE_SIZE]) -> Result<(), F::Error> {
        let offset = self.offset(index)?;
        self.flash.read(offset, buffer).map_err(StoreError::Flash)
    }

    /// True when page `index` already holds exactly `data`.
    pub fn page_matches(&mut self, index: u8, data: &[u8; PAGE_SIZE]) -> Result<bool, F::Error> {
        let offset = self.offset(index)?;
        let mut chunk = [0u8; COMPARE_CHUNK];

        for (n, expected) in data.chunks(COMPARE_CHUNK).enumerate() {
            let at = offset + (n * COMPARE_CHUNK) as u32;
            let chunk = &mut chunk[..expected.len()];
            self.flash.read(at, chunk).map_err(StoreError::Flash)?;
            if chunk[..] != expected[..] {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Sum of every byte of page `index`, plus the index itself.
    pub fn page_checksum(&mut self, index: u8) -> Result<u16, F::Error> {
        let mut page = [0u8; PAGE_SIZE];
        self.read_page(index, &mut page)?;
        Ok(page_checksum(index, &page))
    }

    /// Checksum over the whole active capacity, page by page.
    pub fn whole_region_checksum(&mut self) -> Result<u16, F::Error> {
        let mut checksum = 0u16;
        for index in 0..self.capacity {
            checksum = checksum.wrapping_add(self.page_checksum(index)?);
        }
        Ok(checksum)
    }

    /// Copy an image of `capacity` pages starting at flash offset `source`
    /// into the region. Pages that already match are left alone.
    ///
    /// Returns the checksum of the copied image.
    pub fn copy_region(&mut self, source: u32) -> Result<u16, F::Error> {
        let len = u32::from(self.capacity) * PAGE_SIZE as u32;
        let overlaps = source < self.base + len && self.base < source + len;
        if overlaps || (source + len) as usize > self.flash.capacity() {
            return Err(StoreError::OutOfRange);
        }

        let mut page = [0u8; PAGE_SIZE];
        let mut checksum = 0u16;

        for index in 0..self.capacity {
            let from = source + u32::from(index) * PAGE_SIZE as u32;
            self.flash.read(from, &mut page).map_err(StoreError::Flash)?;

            if !self.page_matches(index, &page)? {
                self.commit_page(index, &page)?;
            }
            checksum = checksum.wrapping_add(page_checksum(index, &page));
        }

        Ok(checksum)
    }
}

/// Per-page contribution to the region checksum.
pub fn page_checksum(index: u8, page: &[u8]) -> u16 {
    page.iter()
        .fold(u16::from(index), |sum, &b| sum.wrapping_add(u16::from(b)))
}
