//! Real-time clock collaborator and startup recovery.
//!
//! The controller only needs a handful of operations from the clock chip,
//! captured by the [`Rtc`] trait. Any driver with date-time access plus
//! write-protect and run/halt control (DS1302, DS1307 and friends) can
//! implement it.
//!
//! [`recover`] repairs the three conditions a fresh or battery-less module
//! boots with. None of them is reported as an error.

use chrono::{NaiveDateTime, Timelike};

use crate::time::TimeOfDay;

/// Clock chip operations used by the controller.
pub trait Rtc {
    /// Bus or device error
    type Error;

    /// Current date and time.
    fn datetime(&mut self) -> Result<NaiveDateTime, Self::Error>;

    /// Overwrites the date and time.
    fn set_datetime(&mut self, datetime: &NaiveDateTime) -> Result<(), Self::Error>;

    /// False when the chip lost its time (power loss, first boot).
    fn is_datetime_valid(&mut self) -> Result<bool, Self::Error>;

    /// True when writes to the time registers are blocked.
    fn is_write_protected(&mut self) -> Result<bool, Self::Error>;

    /// Blocks or allows writes to the time registers.
    fn set_write_protected(&mut self, protected: bool) -> Result<(), Self::Error>;

    /// True when the oscillator is running.
    fn is_running(&mut self) -> Result<bool, Self::Error>;

    /// Starts or halts the oscillator.
    fn set_running(&mut self, running: bool) -> Result<(), Self::Error>;
}

/// What [`recover`] had to repair.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Recovery {
    /// Write protection was on and has been cleared
    pub write_protect_cleared: bool,
    /// The time was invalid and has been seeded
    pub seeded: bool,
    /// The oscillator was halted and has been started
    pub started: bool,
}

/// Brings the RTC into a usable state.
///
/// Write protection is cleared first so the seed write is not dropped, then
/// an invalid time is replaced by `seed`, then a halted oscillator is
/// started.
pub fn recover<R: Rtc>(rtc: &mut R, seed: &NaiveDateTime) -> Result<Recovery, R::Error> {
    let mut recovery = Recovery::default();

    if rtc.is_write_protected()? {
        warn!("RTC write protected, clearing");
        rtc.set_write_protected(false)?;
        recovery.write_protect_cleared = true;
    }

    if !rtc.is_datetime_valid()? {
        warn!(
            "RTC time invalid, seeding {}:{}:{}",
            seed.hour(),
            seed.minute(),
            seed.second()
        );
        rtc.set_datetime(seed)?;
        recovery.seeded = true;
    }

    if !rtc.is_running()? {
        warn!("RTC halted, starting");
        rtc.set_running(true)?;
        recovery.started = true;
    }

    Ok(recovery)
}

/// `current` with hour and minute taken from `time` and seconds zeroed.
///
/// The calendar date is kept.
#[must_use]
pub fn with_time_of_day(current: &NaiveDateTime, time: TimeOfDay) -> NaiveDateTime {
    current.date().and_time(time.into())
}
