//! Platform-agnostic controller for a four digit seven-segment alarm clock.
//!
//! The crate drives a time-multiplexed 4-digit display, five momentary push
//! buttons, a real-time clock and a piezo buzzer from a single cooperative
//! control loop. Hardware is reached through `embedded-hal` 1.0 traits
//! ([`OutputPin`], [`InputPin`], [`DelayNs`]) plus two small collaborator
//! traits defined here: [`Rtc`] for the clock chip and [`Tone`] for the
//! tone generator.
//!
//! # Components
//!
//! - [`SevenSegment`] renders an hour/minute pair with a separator dot.
//! - [`Debouncer`] turns raw button levels into accepted actions.
//! - [`ModeMachine`] owns the Normal/SetTime/SetAlarm state and edit buffer.
//! - [`AlarmSlot`] decides when the stored alarm time fires.
//! - [`MelodyPlayer`] plays a blocking sequence of notes and rests.
//! - [`AlarmClock`] ties them together; call [`AlarmClock::poll`] from the
//!   firmware main loop or hand control to [`AlarmClock::run`].
//!
//! # Example
//!
//! ```rust,ignore
//! use alarm_clock::{AlarmClock, Buttons, Config, SevenSegment};
//!
//! let config = Config::default();
//! let display = SevenSegment::new(segments, dot, digits, &config);
//! let buttons = Buttons::new(set_time, set_alarm, reset, exit, select, config.button_polarity);
//! let mut clock = AlarmClock::new(display, buttons, rtc, buzzer, delay, millis, config);
//!
//! clock.init()?;
//! clock.run()?;
//! ```
//!
//! # Features
//!
//! - `log`: emit diagnostics through the `log` facade
//! - `defmt`: emit diagnostics through `defmt` and derive `defmt::Format`
//!
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![no_std]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use embedded_hal::digital::{ErrorKind, PinState};

// Logging macros forward to defmt, then log, else expand to nothing.
cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! trace { ($($arg:tt)*) => { defmt::trace!($($arg)*) }; }
        macro_rules! debug { ($($arg:tt)*) => { defmt::debug!($($arg)*) }; }
        macro_rules! info { ($($arg:tt)*) => { defmt::info!($($arg)*) }; }
        macro_rules! warn { ($($arg:tt)*) => { defmt::warn!($($arg)*) }; }
    } else if #[cfg(feature = "log")] {
        macro_rules! trace { ($($arg:tt)*) => { log::trace!($($arg)*) }; }
        macro_rules! debug { ($($arg:tt)*) => { log::debug!($($arg)*) }; }
        macro_rules! info { ($($arg:tt)*) => { log::info!($($arg)*) }; }
        macro_rules! warn { ($($arg:tt)*) => { log::warn!($($arg)*) }; }
    } else {
        macro_rules! trace { ($s:literal $(, $x:expr)* $(,)?) => {{ $( let _ = &$x; )* }}; }
        macro_rules! debug { ($s:literal $(, $x:expr)* $(,)?) => {{ $( let _ = &$x; )* }}; }
        macro_rules! info { ($s:literal $(, $x:expr)* $(,)?) => {{ $( let _ = &$x; )* }}; }
        macro_rules! warn { ($s:literal $(, $x:expr)* $(,)?) => {{ $( let _ = &$x; )* }}; }
    }
}

pub mod alarm;
pub mod button;
pub mod controller;
pub mod display;
pub mod glyph;
pub mod melody;
pub mod mode;
pub mod rtc;
pub mod time;

#[cfg(test)]
pub(crate) mod testing;

pub use alarm::AlarmSlot;
pub use button::{Button, ButtonState, Buttons, Debouncer, Events, Levels};
pub use controller::AlarmClock;
pub use display::SevenSegment;
pub use glyph::{Segments, DIGIT_GLYPHS};
pub use melody::{MelodyPlayer, Step, Tone, IMPERIAL_MARCH};
pub use mode::{Commit, EditBuffer, Event, ModeMachine, OperatingMode};
pub use rtc::{Recovery, Rtc};
pub use time::{Field, Millis, TimeOfDay};

/// Errors surfaced by the control loop.
///
/// Startup faults of the RTC (invalid time, write protect, stopped
/// oscillator) are repaired in place and never reported here; only
/// transport failures of the collaborators are.
#[derive(Debug)]
pub enum Error<RtcE, ToneE> {
    /// A display or button pin failed
    Pin(ErrorKind),
    /// The real-time clock failed
    Rtc(RtcE),
    /// The tone generator failed
    Tone(ToneE),
}

impl<RtcE, ToneE> From<ErrorKind> for Error<RtcE, ToneE> {
    fn from(kind: ErrorKind) -> Self {
        Error::Pin(kind)
    }
}

#[cfg(feature = "defmt")]
impl<RtcE: defmt::Format, ToneE: defmt::Format> defmt::Format for Error<RtcE, ToneE> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Pin(kind) => defmt::write!(f, "Pin({})", defmt::Debug2Format(kind)),
            Error::Rtc(e) => defmt::write!(f, "Rtc({})", e),
            Error::Tone(e) => defmt::write!(f, "Tone({})", e),
        }
    }
}

/// Electrical level that turns an output on, or that a pressed button reads.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Driven or read high when active
    ActiveHigh,
    /// Driven or read low when active
    ActiveLow,
}

impl Polarity {
    /// Pin level that represents `active` under this polarity.
    #[must_use]
    pub fn level(self, active: bool) -> PinState {
        match (self, active) {
            (Polarity::ActiveHigh, true) | (Polarity::ActiveLow, false) => PinState::High,
            (Polarity::ActiveHigh, false) | (Polarity::ActiveLow, true) => PinState::Low,
        }
    }
}

/// Controller configuration.
///
/// The defaults match a common-anode display module with segment lines
/// sunk low, digit selects sourced high and buttons on pull-up inputs.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Minimum time between accepted button actions
    pub debounce_ms: u32,
    /// Pause after each hold-to-increment step
    pub settle_ms: u32,
    /// How long each digit stays lit during one refresh
    pub digit_slice_ms: u32,
    /// Silence inserted after every note of the melody
    pub note_gap_ms: u32,
    /// Level that lights a segment
    pub segment_polarity: Polarity,
    /// Level that lights the separator dot
    pub dot_polarity: Polarity,
    /// Level that selects a digit position
    pub digit_polarity: Polarity,
    /// Level a pressed button reads
    pub button_polarity: Polarity,
    /// Written to the RTC when it reports an invalid time at startup
    pub seed_datetime: NaiveDateTime,
    /// Alarm time armed at boot, `None` for no alarm until one is set
    pub initial_alarm: Option<TimeOfDay>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            settle_ms: 200,
            digit_slice_ms: 3,
            note_gap_ms: 50,
            segment_polarity: Polarity::ActiveLow,
            dot_polarity: Polarity::ActiveLow,
            digit_polarity: Polarity::ActiveHigh,
            button_polarity: Polarity::ActiveLow,
            seed_datetime: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap_or_default()
                .and_time(NaiveTime::default()),
            initial_alarm: Some(TimeOfDay::MIDNIGHT),
        }
    }
}
