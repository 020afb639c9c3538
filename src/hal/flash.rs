//! Self-programming of the on-chip flash through `lpm`/`spm`.
//!
//! `spm` only runs from the boot section, which is where this crate links.
//! Every erase and write must happen inside [`SpmAccess::with_write_access`].

use core::arch::asm;

use embedded_storage::nor_flash::{
    check_erase, check_read, check_write, ErrorType, NorFlash, NorFlashErrorKind, ReadNorFlash,
};

use super::WriteAccess;
use crate::config::{BOOTLOADER_BASE, PAGE_SIZE};

// SPMCSR bits, register at I/O address 0x37
const SPMEN: u8 = 1 << 0;
const PGERS: u8 = 1 << 1;
const PGWRT: u8 = 1 << 2;
const RWWSRE: u8 = 1 << 4;

#[inline(always)]
fn spm_busy() -> bool {
    let csr: u8;
    unsafe { asm!("in {0}, 0x37", out(reg) csr, options(nomem, nostack)) };
    csr & SPMEN != 0
}

#[inline(always)]
fn spm_wait() {
    while spm_busy() {}
}

#[inline(always)]
unsafe fn spm(command: u8, address: u16) {
    asm!(
        "out 0x37, {cmd}",
        "spm",
        cmd = in(reg) command,
        in("Z") address,
        options(nostack),
    );
}

/// Loads one word into the temporary page buffer.
#[inline(always)]
unsafe fn spm_fill(address: u16, low: u8, high: u8) {
    asm!(
        "mov r0, {low}",
        "mov r1, {high}",
        "out 0x37, {cmd}",
        "spm",
        "clr r1",
        low = in(reg) low,
        high = in(reg) high,
        cmd = in(reg) SPMEN,
        in("Z") address,
        options(nostack),
    );
}

#[inline(always)]
fn lpm(address: u16) -> u8 {
    let byte: u8;
    unsafe {
        asm!(
            "lpm {byte}, Z",
            byte = out(reg) byte,
            in("Z") address,
            options(readonly, nostack),
        )
    };
    byte
}

/// Application section of the flash as a NOR device.
pub struct SpmFlash {
    _private: (),
}

impl SpmFlash {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for SpmFlash {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorType for SpmFlash {
    type Error = NorFlashErrorKind;
}

impl ReadNorFlash for SpmFlash {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        check_read(self, offset, bytes.len())?;

        for (address, byte) in (offset as u16..).zip(bytes.iter_mut()) {
            *byte = lpm(address);
        }
        Ok(())
    }

    fn capacity(&self) -> usize {
        BOOTLOADER_BASE as usize
    }
}

impl NorFlash for SpmFlash {
    const WRITE_SIZE: usize = PAGE_SIZE;
    const ERASE_SIZE: usize = PAGE_SIZE;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        check_erase(self, from, to)?;

        for page in (from..to).step_by(PAGE_SIZE) {
            unsafe { spm(PGERS | SPMEN, page as u16) };
            spm_wait();
        }
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        check_write(self, offset, bytes.len())?;

        for (index, page) in bytes.chunks_exact(PAGE_SIZE).enumerate() {
            let base = (offset as usize + index * PAGE_SIZE) as u16;

            for (word, pair) in page.chunks_exact(2).enumerate() {
                unsafe { spm_fill(base + 2 * word as u16, pair[0], pair[1]) };
            }

            unsafe { spm(PGWRT | SPMEN, base) };
            spm_wait();
        }
        Ok(())
    }
}

/// Masks interrupts around flash rewrites and re-opens the RWW section after.
pub struct SpmAccess {
    _private: (),
}

impl SpmAccess {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl Default for SpmAccess {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteAccess for SpmAccess {
    fn with_write_access<R>(&mut self, body: impl FnOnce() -> R) -> R {
        critical_section::with(|_| {
            spm_wait();
            let result = body();
            spm_wait();
            unsafe { spm(RWWSRE | SPMEN, 0) };
            spm_wait();
            result
        })
    }
}
