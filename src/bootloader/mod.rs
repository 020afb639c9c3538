//! IR download bootloader
//!
//! One main-loop pass services every face with a pending packet, then asks
//! the retry scheduler whether to pull, wait or give up. The loop ends with a
//! [`Handoff`] that the [`LaunchController`] carries out.

pub mod launch;
pub mod page_store;
pub mod retry;
pub mod session;
pub mod status;

pub use launch::{Handoff, LaunchController};
pub use page_store::{page_checksum, PageStore, StoreError};
pub use retry::{Countdown, RetryScheduler, Verdict};
pub use session::{Action, Outcome, Session, State};
pub use status::{color_for, Color, Event, Indicator, Paint, StatusLights, StatusSink};

use embedded_storage::nor_flash::NorFlash;

use crate::config::FACE_COUNT;
use crate::hal::{Link, WriteAccess};
use crate::protocol::{encode_pull, Face, Packet, ProtocolError};

pub struct Bootloader<'a, L, F, G, S> {
    link: L,
    store: PageStore<F, G>,
    status: S,
    session: Session,
    retry: RetryScheduler<'a>,
    handoff: Option<Handoff>,
}

impl<'a, L, F, G, S> Bootloader<'a, L, F, G, S>
where
    L: Link,
    F: NorFlash,
    G: WriteAccess,
    S: StatusSink,
{
    pub fn new(link: L, store: PageStore<F, G>, status: S, countdown: &'a Countdown) -> Self {
        Self::with_scheduler(link, store, status, RetryScheduler::new(countdown))
    }

    pub fn with_scheduler(
        link: L,
        store: PageStore<F, G>,
        status: S,
        retry: RetryScheduler<'a>,
    ) -> Self {
        Self {
            link,
            store,
            status,
            session: Session::new(),
            retry,
            handoff: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn status(&self) -> &S {
        &self.status
    }

    pub fn store_mut(&mut self) -> &mut PageStore<F, G> {
        &mut self.store
    }

    /// Poll until the download completes or the retry budget runs out.
    pub fn run(&mut self) -> Handoff {
        self.status.show(Event::Listening);
        loop {
            if let Some(handoff) = self.step() {
                return handoff;
            }
        }
    }

    /// One main-loop pass. Once a hand-off is decided nothing more is processed.
    pub fn step(&mut self) -> Option<Handoff> {
        if self.handoff.is_some() {
            return self.handoff;
        }

        for face in (0..FACE_COUNT).map(Face) {
            if !self.link.is_packet_ready(face) {
                continue;
            }

            self.service(face);
            self.link.mark_packet_consumed(face);

            if self.handoff.is_some() {
                return self.handoff;
            }
        }

        match self
            .retry
            .evaluate(self.session.state() == State::Downloading)
        {
            Verdict::GiveUp => {
                self.finish(Handoff::Fallback);
                self.handoff
            }
            Verdict::Pull => {
                self.send_pull();
                None
            }
            Verdict::Wait | Verdict::Idle => None,
        }
    }

    fn service(&mut self, face: Face) {
        let bytes = self.link.packet_bytes(face);

        let outcome = match Packet::decode(face, bytes) {
            Ok(packet) => self.session.handle(&packet, &mut self.store),
            Err(ProtocolError::InvalidChecksum) => {
                self.status.show(Event::BadChecksum { face });
                return;
            }
            Err(_) => {
                self.status.show(Event::Malformed { face });
                return;
            }
        };

        match outcome {
            Outcome::Ignored => {}
            Outcome::Armed => {
                self.status.show(Event::Armed { face });
                self.retry.trigger_now();
            }
            Outcome::Committed { page, complete } => {
                self.status.show(Event::Committed { face, page });
                // Progress refills the retry budget and pulls the next page at once
                self.retry.trigger_now();
                if complete {
                    self.complete();
                }
            }
            Outcome::Stale { page } => self.status.show(Event::Stale { face, page }),
            Outcome::StoreFailed { page } => self.status.show(Event::StoreFailed { face, page }),
        }
    }

    fn complete(&mut self) {
        if cfg!(feature = "verify-image") && !self.session.checksum_matches() {
            self.finish(Handoff::Fallback);
        } else {
            self.finish(Handoff::Launch);
        }
    }

    fn finish(&mut self, handoff: Handoff) {
        self.session.finish();
        self.handoff = Some(handoff);
        self.status.show(match handoff {
            Handoff::Launch => Event::Launching,
            Handoff::Fallback => Event::FallingBack,
        });
    }

    fn send_pull(&mut self) {
        let face = self.session.source();
        let [header, page] = encode_pull(self.session.expected_page());

        // A busy face just means this pull is lost; the next interval retries
        if self.link.begin_send(face) {
            self.link.send_byte(header);
            self.link.send_byte(page);
            self.link.end_send();
        }
    }
}
