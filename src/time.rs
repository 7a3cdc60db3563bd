//! Time-of-day values shown on the display and edited by the buttons.
//!
//! [`TimeOfDay`] is an hour/minute pair that is always in range: it can only
//! be built through validating constructors and only changes through
//! [`TimeOfDay::increment`], which wraps hours at 24 and minutes at 60.

use chrono::{NaiveTime, Timelike};

/// Free-running millisecond counter used for debouncing.
///
/// The counter may wrap; elapsed time is always computed with
/// [`elapsed_ms`].
pub trait Millis {
    /// Milliseconds since an arbitrary epoch (usually boot).
    fn now_ms(&self) -> u32;
}

/// Milliseconds from `since` to `now`, tolerant of counter wraparound.
#[must_use]
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Which half of the time the edit cursor points at.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// The hour digits (left pair)
    #[default]
    Hour,
    /// The minute digits (right pair)
    Minute,
}

impl Field {
    /// The other field.
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            Field::Hour => Field::Minute,
            Field::Minute => Field::Hour,
        }
    }
}

/// An hour (0-23) and minute (0-59).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// 00:00
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { hour: 0, minute: 0 };

    /// Builds a time of day, `None` when either part is out of range.
    #[must_use]
    pub const fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Hour, 0-23
    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute, 0-59
    #[must_use]
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    /// Hour and minute of any chrono time value; seconds are dropped.
    #[must_use]
    pub fn from_timelike<T: Timelike>(value: &T) -> Self {
        // chrono guarantees hour() < 24 and minute() < 60
        Self {
            hour: (value.hour() % 24) as u8,
            minute: (value.minute() % 60) as u8,
        }
    }

    /// Advances one unit of `field`, wrapping 23 -> 0 and 59 -> 0.
    ///
    /// Incrementing the minute never carries into the hour.
    pub fn increment(&mut self, field: Field) {
        match field {
            Field::Hour => self.hour = (self.hour + 1) % 24,
            Field::Minute => self.minute = (self.minute + 1) % 60,
        }
    }

    /// The four display digits: hour tens, hour ones, minute tens, minute ones.
    #[must_use]
    pub const fn digits(&self) -> [u8; 4] {
        [
            self.hour / 10,
            self.hour % 10,
            self.minute / 10,
            self.minute % 10,
        ]
    }

    /// Inverse of [`TimeOfDay::digits`].
    #[must_use]
    pub fn from_digits(digits: [u8; 4]) -> Option<Self> {
        if digits.iter().any(|&d| d > 9) {
            return None;
        }
        Self::new(digits[0] * 10 + digits[1], digits[2] * 10 + digits[3])
    }
}

impl From<TimeOfDay> for NaiveTime {
    fn from(value: TimeOfDay) -> Self {
        NaiveTime::from_hms_opt(u32::from(value.hour), u32::from(value.minute), 0)
            .unwrap_or_default()
    }
}
