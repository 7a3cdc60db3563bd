//! Blocking melody playback through a tone generator.
//!
//! A melody is a list of phrases, each a list of [`Step`]s. A note step
//! starts the tone, holds for its duration, silences the output and then
//! waits a fixed inter-note gap. A rest step only waits. Playback does not
//! return until the last step is done.
//!
//! [`IMPERIAL_MARCH`] is the alarm melody: two reusable sections and two
//! closing variants, about 28 seconds with the default 50 ms gap.

use embedded_hal::delay::DelayNs;

/// Tone generator collaborator, e.g. a timer-driven PWM output on the buzzer.
pub trait Tone {
    /// Error type of the underlying peripheral
    type Error;

    /// Starts a square wave of `frequency_hz` that stops by itself after
    /// `duration_ms`. Must return immediately.
    fn play_tone(&mut self, frequency_hz: u16, duration_ms: u32) -> Result<(), Self::Error>;

    /// Silences the output.
    fn stop_tone(&mut self) -> Result<(), Self::Error>;
}

/// One event in a melody.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Sound `frequency_hz` for `duration_ms`
    Note {
        /// Pitch in Hz
        frequency_hz: u16,
        /// Hold time in ms
        duration_ms: u16,
    },
    /// Silence for the given milliseconds
    Rest(u16),
}

const fn note(frequency_hz: u16, duration_ms: u16) -> Step {
    Step::Note {
        frequency_hz,
        duration_ms,
    }
}

const fn rest(duration_ms: u16) -> Step {
    Step::Rest(duration_ms)
}

/// Pitches available to melodies, in Hz.
pub mod notes {
    pub const C4: u16 = 261;
    pub const D4: u16 = 294;
    pub const E4: u16 = 329;
    pub const F4: u16 = 349;
    pub const G4: u16 = 391;
    pub const GS4: u16 = 415;
    pub const A4: u16 = 440;
    // 455 Hz, below the tempered 466 Hz that B4 carries here.
    pub const AS4: u16 = 455;
    pub const B4: u16 = 466;
    pub const C5: u16 = 523;
    pub const CS5: u16 = 554;
    pub const D5: u16 = 587;
    pub const DS5: u16 = 622;
    pub const E5: u16 = 659;
    pub const F5: u16 = 698;
    pub const FS5: u16 = 740;
    pub const G5: u16 = 784;
    pub const GS5: u16 = 830;
    pub const A5: u16 = 880;
}

use notes::*;

/// Opening section: the main theme, then the theme an octave up.
pub const FIRST_SECTION: &[Step] = &[
    note(A4, 500),
    note(A4, 500),
    note(A4, 500),
    note(F4, 350),
    note(C5, 150),
    note(A4, 500),
    note(F4, 350),
    note(C5, 150),
    note(A4, 650),
    rest(500),
    note(E5, 500),
    note(E5, 500),
    note(E5, 500),
    note(F5, 350),
    note(C5, 150),
    note(GS4, 500),
    note(F4, 350),
    note(C5, 150),
    note(A4, 650),
    rest(500),
];

/// Middle section, played twice.
pub const SECOND_SECTION: &[Step] = &[
    note(A5, 500),
    note(A4, 300),
    note(A4, 150),
    note(A5, 500),
    note(GS5, 325),
    note(G5, 175),
    note(FS5, 125),
    note(F5, 125),
    note(FS5, 250),
    rest(325),
    note(AS4, 250),
    note(DS5, 500),
    note(D5, 325),
    note(CS5, 175),
    note(C5, 125),
    note(B4, 125),
    note(C5, 250),
    rest(350),
];

/// Ending after the first pass of the middle section.
pub const VARIANT_ONE: &[Step] = &[
    note(F4, 250),
    note(GS4, 500),
    note(F4, 350),
    note(A4, 125),
    note(C5, 500),
    note(A4, 375),
    note(C5, 125),
    note(E5, 650),
    rest(500),
];

/// Ending after the second pass of the middle section.
pub const VARIANT_TWO: &[Step] = &[
    note(F4, 250),
    note(GS4, 500),
    note(F4, 375),
    note(C5, 125),
    note(A4, 500),
    note(F4, 375),
    note(C5, 125),
    note(A4, 650),
    rest(650),
];

/// The alarm melody.
pub const IMPERIAL_MARCH: &[&[Step]] = &[
    FIRST_SECTION,
    SECOND_SECTION,
    VARIANT_ONE,
    SECOND_SECTION,
    VARIANT_TWO,
];

/// Total blocking time of `phrases` with `gap_ms` after every note.
#[must_use]
pub fn duration_ms(phrases: &[&[Step]], gap_ms: u32) -> u32 {
    phrases
        .iter()
        .flat_map(|phrase| phrase.iter())
        .map(|step| match *step {
            Step::Note { duration_ms, .. } => u32::from(duration_ms) + gap_ms,
            Step::Rest(ms) => u32::from(ms),
        })
        .sum()
}

/// Plays melodies on a [`Tone`] output.
pub struct MelodyPlayer<T: Tone> {
    tone: T,
    gap_ms: u32,
}

impl<T: Tone> MelodyPlayer<T> {
    /// Wraps `tone`, inserting `gap_ms` of silence after every note.
    pub fn new(tone: T, gap_ms: u32) -> Self {
        Self { tone, gap_ms }
    }

    /// Silences the output.
    pub fn silence(&mut self) -> Result<(), T::Error> {
        self.tone.stop_tone()
    }

    /// Plays every phrase in order and blocks until done.
    ///
    /// There is no way to abort playback once started.
    pub fn play<D: DelayNs>(&mut self, phrases: &[&[Step]], delay: &mut D) -> Result<(), T::Error> {
        info!("playing melody, {} ms", duration_ms(phrases, self.gap_ms));
        for phrase in phrases {
            for step in phrase.iter() {
                self.step(step, delay)?;
            }
        }
        self.tone.stop_tone()
    }

    fn step<D: DelayNs>(&mut self, step: &Step, delay: &mut D) -> Result<(), T::Error> {
        match *step {
            Step::Note {
                frequency_hz,
                duration_ms,
            } => {
                let duration_ms = u32::from(duration_ms);
                self.tone.play_tone(frequency_hz, duration_ms)?;
                delay.delay_ms(duration_ms);
                self.tone.stop_tone()?;
                delay.delay_ms(self.gap_ms);
            }
            Step::Rest(ms) => delay.delay_ms(u32::from(ms)),
        }
        Ok(())
    }

    /// Gives the tone generator back.
    pub fn release(self) -> T {
        self.tone
    }
}
