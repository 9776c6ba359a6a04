//! Buffer read-pointer state machine
//!
//! One [`BufferPointer`] exists per active, buffered channel. Every consumed
//! sample calls [`BufferPointer::advance`], which moves the pointer according
//! to the channel's [`BufferMode`] and reports the boundary events crossed on
//! the way, in the order they occurred.

use core::fmt;

use heapless::Vec;

use crate::config::{BufferMode, IrqSource, Watermark};

/// Events fired by a single advance, in firing order (at most one of each
/// category).
///
/// Callbacks do not follow this order; the channel dispatches latched events
/// bottom, top, watermark.
pub type Fired = Vec<IrqSource, 3>;

/// Travel direction, only meaningful in [`BufferMode::Swing`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Towards the ceiling
    #[default]
    Up,
    /// Towards position 0
    Down,
}

/// Runtime pointer state of a buffered channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferPointer {
    position: u8,
    direction: Direction,
    scan_complete: bool,
}

impl BufferPointer {
    /// Pointer at position 0, moving up, scan not complete
    pub const fn new() -> Self {
        Self {
            position: 0,
            direction: Direction::Up,
            scan_complete: false,
        }
    }

    /// Slot the next conversion reads
    pub const fn position(&self) -> u8 {
        self.position
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether a one-time scan has reached the ceiling
    pub const fn scan_complete(&self) -> bool {
        self.scan_complete
    }

    /// Consume one sample and move the pointer.
    ///
    /// `ceiling` must be in `1..=16` and at least `watermark.words()`; the
    /// channel checks both at activation.
    pub fn advance(&mut self, mode: BufferMode, ceiling: u8, watermark: Watermark) -> Fired {
        let mut fired = Fired::new();
        let zone = watermark.zone_start(ceiling);

        match mode {
            BufferMode::Normal => {
                if self.position >= ceiling {
                    self.position = 0;
                    fire(&mut fired, IrqSource::Bottom);
                    fire(&mut fired, IrqSource::Top);
                } else {
                    self.position += 1;
                    if self.position == zone {
                        fire(&mut fired, IrqSource::Watermark);
                    }
                }
            }
            BufferMode::Swing => match self.direction {
                Direction::Up => {
                    self.position += 1;
                    if self.position == zone {
                        fire(&mut fired, IrqSource::Watermark);
                    }
                    if self.position >= ceiling {
                        self.direction = Direction::Down;
                        fire(&mut fired, IrqSource::Bottom);
                    }
                }
                Direction::Down => {
                    self.position = self.position.saturating_sub(1);
                    if self.position == 0 {
                        self.direction = Direction::Up;
                        fire(&mut fired, IrqSource::Top);
                    }
                }
            },
            BufferMode::OneTimeScan => {
                if self.scan_complete {
                    return fired;
                }
                self.position += 1;
                if self.position == zone {
                    fire(&mut fired, IrqSource::Watermark);
                }
                if self.position >= ceiling {
                    self.scan_complete = true;
                    fire(&mut fired, IrqSource::Bottom);
                }
            }
        }

        fired
    }
}

fn fire(fired: &mut Fired, source: IrqSource) {
    // Each category fires at most once per advance, so the push cannot overflow
    let _ = fired.push(source);
}

impl fmt::Display for BufferPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Up => write!(f, "@{}+", self.position),
            Direction::Down => write!(f, "@{}-", self.position),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BufferPointer {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "BufferPointer({}, up={}, done={})",
            self.position,
            self.direction == Direction::Up,
            self.scan_complete
        );
    }
}
