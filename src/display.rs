//! Time-multiplexed driver for a 4-digit 7-segment display.
//!
//! All four digit positions share the seven segment lines and the dot line;
//! each position has its own select line. One call to
//! [`SevenSegment::render`] lights every position in turn for a short slice,
//! so the caller must render on every loop iteration for the digits to
//! appear steady. There is no frame buffer.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, ErrorKind, OutputPin};

use crate::glyph::DIGIT_GLYPHS;
use crate::time::TimeOfDay;
use crate::{Config, Polarity};

/// Position after which the separator dot is lit (between hours and minutes).
const DOT_POSITION: usize = 1;

/// Multiplexed 4-digit display.
pub struct SevenSegment<P: OutputPin> {
    segments: [P; 7],
    dot: P,
    digits: [P; 4],
    segment_polarity: Polarity,
    dot_polarity: Polarity,
    digit_polarity: Polarity,
    slice_ms: u32,
}

impl<P: OutputPin> SevenSegment<P> {
    /// Creates a driver over already configured output pins.
    ///
    /// # Arguments
    /// * `segments` - segment lines `a` through `g`
    /// * `dot` - separator dot line
    /// * `digits` - select lines, leftmost position first
    /// * `config` - polarities and the per-digit slice length
    pub fn new(segments: [P; 7], dot: P, digits: [P; 4], config: &Config) -> Self {
        Self {
            segments,
            dot,
            digits,
            segment_polarity: config.segment_polarity,
            dot_polarity: config.dot_polarity,
            digit_polarity: config.digit_polarity,
            slice_ms: config.digit_slice_ms,
        }
    }

    /// Turns every line off: no position selected, no segment or dot lit.
    pub fn blank(&mut self) -> Result<(), ErrorKind> {
        for pin in &mut self.digits {
            pin.set_state(self.digit_polarity.level(false))
                .map_err(|e| e.kind())?;
        }
        for pin in &mut self.segments {
            pin.set_state(self.segment_polarity.level(false))
                .map_err(|e| e.kind())?;
        }
        self.dot
            .set_state(self.dot_polarity.level(false))
            .map_err(|e| e.kind())?;
        Ok(())
    }

    /// Shows `time` as `HH.MM` once, blocking for four digit slices.
    pub fn render<D: DelayNs>(&mut self, time: TimeOfDay, delay: &mut D) -> Result<(), ErrorKind> {
        for (position, digit) in time.digits().into_iter().enumerate() {
            self.show(position, digit, delay)?;
        }
        Ok(())
    }

    fn show<D: DelayNs>(
        &mut self,
        position: usize,
        digit: u8,
        delay: &mut D,
    ) -> Result<(), ErrorKind> {
        let glyph = DIGIT_GLYPHS[usize::from(digit % 10)];

        self.digits[position]
            .set_state(self.digit_polarity.level(true))
            .map_err(|e| e.kind())?;
        for (pin, lit) in self.segments.iter_mut().zip(glyph.lines()) {
            pin.set_state(self.segment_polarity.level(lit))
                .map_err(|e| e.kind())?;
        }
        self.dot
            .set_state(self.dot_polarity.level(position == DOT_POSITION))
            .map_err(|e| e.kind())?;

        delay.delay_ms(self.slice_ms);

        self.digits[position]
            .set_state(self.digit_polarity.level(false))
            .map_err(|e| e.kind())
    }

    /// Gives the pins back.
    pub fn release(self) -> ([P; 7], P, [P; 4]) {
        (self.segments, self.dot, self.digits)
    }
}
