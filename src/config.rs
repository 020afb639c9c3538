//! Configuration constants for the tile bootloader

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 8_000_000;

/// Debug console baud rate (U2X mode)
pub const UART_BAUD: u32 = 500_000;

/// Flash page size, also the transfer unit of a push packet
pub const PAGE_SIZE: usize = 128;

/// Number of IR faces on a tile
pub const FACE_COUNT: u8 = 6;

/// Flash start of the runnable game
pub const ACTIVE_BASE: u32 = 0x0000;

/// Flash start of the built-in game
pub const BUILTIN_BASE: u32 = 0x1C00;

/// Flash start of the boot section. Fixed by the fuses.
pub const BOOTLOADER_BASE: u32 = 0x3800;

/// Size in bytes of the runnable region
pub const ACTIVE_SIZE: u32 = BUILTIN_BASE - ACTIVE_BASE;

/// Largest game, in pages
pub const MAX_PAGES: u8 = (ACTIVE_SIZE / PAGE_SIZE as u32) as u8;

/// Top of SRAM, loaded into SP before jumping into a game
pub const RAMEND: u16 = 0x04FF;

/// Period of the countdown tick
pub const US_PER_TICK: u32 = 256;

/// Time between pull requests
pub const MS_PER_PULL_RETRY: u32 = 300;

/// Expired retry intervals before giving up on a download
pub const GIVEUP_RETRY_COUNT: u8 = 10;

/// Converts milliseconds to countdown ticks, rounding the tick rate down.
pub const fn ms_to_ticks(ms: u32) -> u16 {
    (ms * (1000 / US_PER_TICK)) as u16
}

pub const RETRY_INTERVAL_TICKS: u16 = ms_to_ticks(MS_PER_PULL_RETRY);

const _: () = assert!(ACTIVE_BASE % PAGE_SIZE as u32 == 0);
const _: () = assert!(BUILTIN_BASE % PAGE_SIZE as u32 == 0);
const _: () = assert!(BUILTIN_BASE - ACTIVE_BASE >= ACTIVE_SIZE);
const _: () = assert!(BUILTIN_BASE + ACTIVE_SIZE <= BOOTLOADER_BASE);
const _: () = assert!(ACTIVE_SIZE / (PAGE_SIZE as u32) <= u8::MAX as u32);
const _: () = assert!(MS_PER_PULL_RETRY * (1000 / US_PER_TICK) <= u16::MAX as u32);
