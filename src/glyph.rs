//! Segment patterns for the decimal digits.
//!
//! Segments are named in the usual clockwise order starting at the top bar:
//!
//! ```text
//!  aaa
//! f   b
//!  ggg
//! e   c
//!  ddd  dp
//! ```

use bitfield::bitfield;

bitfield! {
    /// One byte of segment flags, bit 0 = `a` through bit 6 = `g`, bit 7 = dot.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Segments(u8);
    impl Debug;
    /// Top
    pub a, set_a: 0;
    /// Upper right
    pub b, set_b: 1;
    /// Lower right
    pub c, set_c: 2;
    /// Bottom
    pub d, set_d: 3;
    /// Lower left
    pub e, set_e: 4;
    /// Upper left
    pub f, set_f: 5;
    /// Middle
    pub g, set_g: 6;
    /// Decimal point
    pub dp, set_dp: 7;
}

#[cfg(feature = "defmt")]
impl defmt::Format for Segments {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Segments({=u8:b})", self.0);
    }
}

impl Segments {
    /// The seven digit segments in `a..=g` order, dot excluded.
    #[must_use]
    pub fn lines(&self) -> [bool; 7] {
        [
            self.a(),
            self.b(),
            self.c(),
            self.d(),
            self.e(),
            self.f(),
            self.g(),
        ]
    }

    /// Number of digit segments lit, dot excluded.
    #[must_use]
    pub fn lit(&self) -> u32 {
        (self.0 & 0x7F).count_ones()
    }

    /// Glyph for `digit`, `None` above 9.
    #[must_use]
    pub fn for_digit(digit: u8) -> Option<Segments> {
        DIGIT_GLYPHS.get(usize::from(digit)).copied()
    }
}

/// Glyphs for 0-9, indexed by digit.
pub const DIGIT_GLYPHS: [Segments; 10] = [
    Segments(0b0011_1111), // 0: a b c d e f
    Segments(0b0000_0110), // 1: b c
    Segments(0b0101_1011), // 2: a b d e g
    Segments(0b0100_1111), // 3: a b c d g
    Segments(0b0110_0110), // 4: b c f g
    Segments(0b0110_1101), // 5: a c d f g
    Segments(0b0111_1101), // 6: a c d e f g
    Segments(0b0000_0111), // 7: a b c
    Segments(0b0111_1111), // 8: all
    Segments(0b0110_1111), // 9: a b c d f g
];
