//! Pull retry timing
//!
//! The countdown is shared with the tick interrupt and only ever touched
//! inside a critical section. The retry count belongs to the main loop.

use core::cell::Cell;

use critical_section::Mutex;
use ufmt::derive::uDebug;

use crate::config::{GIVEUP_RETRY_COUNT, RETRY_INTERVAL_TICKS};

/// Tick-driven countdown to the next retry decision.
pub struct Countdown {
    ticks: Mutex<Cell<u16>>,
}

impl Countdown {
    /// Starts expired so the first main-loop pass evaluates the policy at once.
    pub const fn new() -> Self {
        Self {
            ticks: Mutex::new(Cell::new(0)),
        }
    }

    /// Called from the tick interrupt.
    #[inline]
    pub fn tick(&self) {
        critical_section::with(|cs| {
            let ticks = self.ticks.borrow(cs);
            let remaining = ticks.get();
            if remaining != 0 {
                ticks.set(remaining - 1);
            }
        });
    }

    pub fn remaining(&self) -> u16 {
        critical_section::with(|cs| self.ticks.borrow(cs).get())
    }

    pub fn expired(&self) -> bool {
        self.remaining() == 0
    }

    pub fn load(&self, ticks: u16) {
        critical_section::with(|cs| self.ticks.borrow(cs).set(ticks));
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, uDebug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Interval still running
    Wait,
    /// Interval expired while listening, nothing to send
    Idle,
    /// Send a pull request for the expected page
    Pull,
    GiveUp,
}

pub struct RetryScheduler<'a> {
    countdown: &'a Countdown,
    retries_sent: u8,
    interval: u16,
    giveup: u8,
}

impl<'a> RetryScheduler<'a> {
    pub fn new(countdown: &'a Countdown) -> Self {
        Self::with_policy(countdown, RETRY_INTERVAL_TICKS, GIVEUP_RETRY_COUNT)
    }

    pub fn with_policy(countdown: &'a Countdown, interval: u16, giveup: u8) -> Self {
        Self {
            countdown,
            retries_sent: 0,
            interval,
            giveup,
        }
    }

    #[inline]
    pub fn expired(&self) -> bool {
        self.countdown.expired()
    }

    #[inline]
    pub fn retries_sent(&self) -> u8 {
        self.retries_sent
    }

    /// Restart the interval. The retry count is kept.
    pub fn reset(&mut self) {
        self.countdown.load(self.interval);
    }

    /// Expire now and refill the retry budget.
    pub fn trigger_now(&mut self) {
        self.countdown.load(0);
        self.retries_sent = 0;
    }

    /// Decide what the main loop should do on this pass.
    ///
    /// The budget counts evaluations since the last `trigger_now`. The pass
    /// that finds it already spent gives up, so after a trigger the session
    /// gets one immediate pull plus `giveup - 1` further intervals.
    pub fn evaluate(&mut self, downloading: bool) -> Verdict {
        if !self.expired() {
            return Verdict::Wait;
        }

        if self.retries_sent >= self.giveup {
            return Verdict::GiveUp;
        }

        self.retries_sent += 1;
        self.reset();

        if downloading {
            Verdict::Pull
        } else {
            Verdict::Idle
        }
    }
}
