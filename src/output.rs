//! Guarded output word
//!
//! The single piece of hardware state shared by every task: an 8-line
//! output register, of which a contiguous range of lines is controllable.
//! All mutation goes through [`OutputGuard`], inside the coarse critical
//! section, and is written through to the port before the section ends.
//!
//! `set` and `toggle` differ on purpose. `set` edits the cached word and
//! writes it out whole, never reading the port. `toggle` reads the live
//! register, flips one bit against it, and resynchronises the cache from
//! what it wrote, so it observes changes made outside this core.

use core::cell::RefCell;

use crate::config::{CFG_OUTPUT_LINE_MAX, CFG_OUTPUT_LINE_MIN, CFG_OUTPUT_WIDTH};
use crate::critical::{critical_section, Mutex};
use crate::error::{OsError, OsResult};
use crate::port::OutputPort;
use crate::types::LineIndex;

/// Contiguous range of controllable output lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineRange {
    min: LineIndex,
    max: LineIndex,
}

impl LineRange {
    /// Lines of the demo board
    pub const BOARD: LineRange = LineRange {
        min: CFG_OUTPUT_LINE_MIN,
        max: CFG_OUTPUT_LINE_MAX,
    };

    /// Every line of the register
    pub const ALL: LineRange = LineRange {
        min: 0,
        max: CFG_OUTPUT_WIDTH - 1,
    };

    /// Lines `min..=max`
    pub const fn new(min: LineIndex, max: LineIndex) -> OsResult<Self> {
        if min > max || max >= CFG_OUTPUT_WIDTH {
            return Err(OsError::LineRangeInvalid);
        }
        Ok(LineRange { min, max })
    }

    #[inline]
    pub const fn min(&self) -> LineIndex {
        self.min
    }

    #[inline]
    pub const fn max(&self) -> LineIndex {
        self.max
    }

    #[inline]
    pub const fn contains(&self, line: LineIndex) -> bool {
        line >= self.min && line <= self.max
    }

    /// Register bits covered by the range
    pub const fn mask(&self) -> u8 {
        let width = self.max - self.min + 1;
        let ones = if width >= 8 { 0xFF } else { (1u8 << width) - 1 };
        ones << self.min
    }

    /// Bit of `line`, or `None` if the line is not controllable
    #[inline]
    pub const fn bit(&self, line: LineIndex) -> Option<u8> {
        if self.contains(line) {
            Some(1 << line)
        } else {
            None
        }
    }
}

impl Default for LineRange {
    fn default() -> Self {
        Self::BOARD
    }
}

/// Cached copy of the output register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputState(pub u8);

impl OutputState {
    /// Whether `line` is driven on (false for lines outside the register)
    #[inline]
    pub const fn is_on(self, line: LineIndex) -> bool {
        line < CFG_OUTPUT_WIDTH && self.0 & (1 << line) != 0
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

struct Shared<P> {
    current: OutputState,
    port: P,
}

/// Exclusive owner of the output word and its port
pub struct OutputGuard<P> {
    lines: LineRange,
    shared: Mutex<RefCell<Shared<P>>>,
}

impl<P: OutputPort> OutputGuard<P> {
    /// Take ownership of `port` and switch every controllable line off
    ///
    /// Lines outside `lines` keep whatever value the register holds now.
    pub fn new(mut port: P, lines: LineRange) -> Self {
        let mask = lines.mask();
        let current = critical_section(|_| {
            port.configure(mask);
            let current = OutputState(port.read_register() & !mask);
            port.write_register(current.bits());
            current
        });

        crate::debug!("output guard on lines {}..={}", lines.min(), lines.max());

        OutputGuard {
            lines,
            shared: Mutex::new(RefCell::new(Shared { current, port })),
        }
    }

    /// Drive `line` on or off
    ///
    /// Out-of-range lines are ignored. The cached word is updated and
    /// written out whole; the port is not read.
    pub fn set(&self, line: LineIndex, on: bool) {
        let Some(bit) = self.lines.bit(line) else {
            return;
        };

        critical_section(|cs| {
            let mut shared = self.shared.borrow_ref_mut(cs);
            let mut word = shared.current.bits();
            if on {
                word |= bit;
            } else {
                word &= !bit;
            }
            shared.current = OutputState(word);
            shared.port.write_register(word);
        });
    }

    /// Invert `line` against the live register
    ///
    /// Out-of-range lines are ignored. The cached word is resynchronised
    /// from the value written back.
    pub fn toggle(&self, line: LineIndex) {
        let Some(bit) = self.lines.bit(line) else {
            return;
        };

        critical_section(|cs| {
            let mut shared = self.shared.borrow_ref_mut(cs);
            let word = shared.port.read_register() ^ bit;
            shared.port.write_register(word);
            shared.current = OutputState(word);
        });
    }

    /// Cached value of `line`, or `None` if the line is not controllable
    pub fn get(&self, line: LineIndex) -> Option<bool> {
        self.lines.bit(line)?;
        Some(self.state().is_on(line))
    }

    /// Cached output word
    pub fn state(&self) -> OutputState {
        critical_section(|cs| self.shared.borrow_ref(cs).current)
    }

    /// Controllable line range
    #[inline]
    pub fn lines(&self) -> LineRange {
        self.lines
    }
}
