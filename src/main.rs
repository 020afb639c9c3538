#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
use panic_halt as _;

#[cfg(target_arch = "avr")]
use tileboot::{
    bootloader::{Bootloader, Countdown, LaunchController, PageStore, StatusLights},
    config::{ACTIVE_BASE, MAX_PAGES},
    hal::{ir, jump, CorePixels, IrLink, Prescaler, ResetJump, SpmAccess, SpmFlash, TickTimer, Watchdog},
};

#[cfg(all(target_arch = "avr", feature = "debug"))]
use tileboot::{
    drivers::{SerialConsole, Traced},
    hal::Usart0,
};

// Shared between the tick interrupt and the main loop
#[cfg(target_arch = "avr")]
static COUNTDOWN: Countdown = Countdown::new();

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega168)]
fn TIMER0_OVF() {
    // IR sampling must not wait behind the other handler
    unsafe { avr_device::interrupt::enable() };
    ir::service();
    COUNTDOWN.tick();
}

#[cfg(target_arch = "avr")]
#[avr_device::interrupt(atmega168)]
fn TIMER0_COMPA() {
    unsafe { avr_device::interrupt::enable() };
    ir::service();
}

#[cfg(target_arch = "avr")]
#[avr_device::entry]
fn main() -> ! {
    // A watchdog reset from the game leaves the watchdog armed
    Watchdog::new().disable();
    jump::vectors_to_bootloader();

    let link = IrLink::new();
    let pixels = CorePixels::new();
    let store = PageStore::new(SpmFlash::new(), SpmAccess::new(), ACTIVE_BASE, MAX_PAGES);

    #[cfg(feature = "debug")]
    let status = Traced::new(StatusLights::new(pixels), SerialConsole::new(Usart0::new()));
    #[cfg(not(feature = "debug"))]
    let status = StatusLights::new(pixels);

    let mut timer = TickTimer::new();
    timer.start(Prescaler::Div8);
    timer.enable_interrupts();

    let mut boot = Bootloader::new(link, store, status, &COUNTDOWN);

    // Enable interrupts globally
    unsafe { avr_device::interrupt::enable() };

    let handoff = boot.run();

    avr_device::interrupt::disable();
    timer.release();

    LaunchController::new(ResetJump::new()).handoff(handoff, boot.store_mut())
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
