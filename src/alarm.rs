//! The single alarm slot and its trigger check.
//!
//! The check runs once per Normal-mode loop iteration. When the live hour and
//! minute equal the stored alarm time and the slot is not already
//! `armed_but_inactive`, the flag is raised, the playback closure runs to
//! completion and the flag is dropped again.
//!
//! Nothing records that the alarm already fired this minute. A second match
//! inside the same minute is only avoided because playback normally takes
//! long enough for the minute to roll over before the next check.

use crate::time::TimeOfDay;

/// Stored alarm time plus the re-entry guard.
///
/// Volatile: the slot lives as long as the controller and is not persisted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmSlot {
    time: Option<TimeOfDay>,
    armed_but_inactive: bool,
}

impl AlarmSlot {
    /// Creates a slot armed at `time`, or disarmed for `None`.
    #[must_use]
    pub const fn new(time: Option<TimeOfDay>) -> Self {
        Self {
            time,
            armed_but_inactive: false,
        }
    }

    /// Stored alarm time.
    #[must_use]
    pub fn time(&self) -> Option<TimeOfDay> {
        self.time
    }

    /// Replaces the stored alarm time.
    pub fn set(&mut self, time: TimeOfDay) {
        info!("alarm set to {}:{}", time.hour(), time.minute());
        self.time = Some(time);
    }

    /// True while playback triggered by this slot is in progress.
    #[must_use]
    pub fn is_armed_but_inactive(&self) -> bool {
        self.armed_but_inactive
    }

    /// Raises the guard and returns `true` if `now` matches and the guard
    /// was down.
    pub fn begin(&mut self, now: TimeOfDay) -> bool {
        if self.armed_but_inactive || self.time != Some(now) {
            return false;
        }
        self.armed_but_inactive = true;
        true
    }

    /// Drops the guard raised by [`AlarmSlot::begin`].
    pub fn finish(&mut self) {
        self.armed_but_inactive = false;
    }

    /// Runs `play` if `now` matches, guarding against re-entry.
    ///
    /// Returns whether playback ran. The guard is dropped even when `play`
    /// fails.
    pub fn check<E, F>(&mut self, now: TimeOfDay, play: F) -> Result<bool, E>
    where
        F: FnOnce() -> Result<(), E>,
    {
        if !self.begin(now) {
            return Ok(false);
        }
        debug!("alarm triggered at {}:{}", now.hour(), now.minute());
        let result = play();
        self.finish();
        result.map(|()| true)
    }
}
