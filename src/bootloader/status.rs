//! Status events and how they are shown on the face pixels

use ufmt::derive::uDebug;

use crate::config::FACE_COUNT;
use crate::protocol::Face;

/// Coarse pixel color, one bit per channel (red = 1, green = 2, blue = 4).
#[derive(Debug, uDebug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Off = 0b000,
    Red = 0b001,
    Green = 0b010,
    Yellow = 0b011,
    Blue = 0b100,
    Magenta = 0b101,
    Cyan = 0b110,
    White = 0b111,
}

/// Everything the bootloader has to say about its progress.
#[derive(Debug, uDebug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Listening,
    Armed { face: Face },
    Committed { face: Face, page: u8 },
    Stale { face: Face, page: u8 },
    BadChecksum { face: Face },
    Malformed { face: Face },
    StoreFailed { face: Face, page: u8 },
    Launching,
    FallingBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Face(Face, Color),
    All(Color),
    /// Every other face off
    Only(Face, Color),
}

pub fn color_for(event: Event) -> Paint {
    match event {
        Event::Listening => Paint::All(Color::Yellow),
        Event::Armed { face } => Paint::Only(face, Color::Blue),
        // Alternate with each page so progress is visible
        Event::Committed { face, page } if page & 1 == 0 => Paint::Face(face, Color::Green),
        Event::Committed { face, .. } => Paint::Face(face, Color::Cyan),
        Event::Stale { face, .. } => Paint::Face(face, Color::Yellow),
        Event::BadChecksum { face } | Event::StoreFailed { face, .. } => {
            Paint::Face(face, Color::Red)
        }
        Event::Malformed { face } => Paint::Face(face, Color::Magenta),
        Event::Launching => Paint::All(Color::Blue),
        Event::FallingBack => Paint::All(Color::Red),
    }
}

/// Per-face status pixels.
pub trait Indicator {
    fn set(&mut self, face: Face, color: Color);

    fn set_all(&mut self, color: Color) {
        for face in 0..FACE_COUNT {
            self.set(Face(face), color);
        }
    }
}

/// Receiver of bootloader events.
pub trait StatusSink {
    fn show(&mut self, event: Event);
}

/// Shows events on an [`Indicator`].
pub struct StatusLights<I> {
    pixels: I,
}

impl<I: Indicator> StatusLights<I> {
    pub fn new(pixels: I) -> Self {
        Self { pixels }
    }

    pub fn pixels(&self) -> &I {
        &self.pixels
    }
}

impl<I: Indicator> StatusSink for StatusLights<I> {
    fn show(&mut self, event: Event) {
        match color_for(event) {
            Paint::Face(face, color) => self.pixels.set(face, color),
            Paint::All(color) => self.pixels.set_all(color),
            Paint::Only(face, color) => {
                self.pixels.set_all(Color::Off);
                self.pixels.set(face, color);
            }
        }
    }
}
