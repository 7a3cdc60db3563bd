//! The cooperative control loop.
//!
//! One [`AlarmClock::poll`] call is one loop iteration, strictly in this
//! order:
//!
//! 1. sample the buttons and debounce them
//! 2. feed accepted actions to the mode machine, applying any commit
//! 3. read the RTC and render either the live time or the edit buffer
//! 4. in Normal mode, check the alarm and play the melody if it fires;
//!    in an edit mode, apply one hold-to-increment step and settle
//!
//! Nothing runs in the background. Melody playback (about 28 s) and the
//! settle delay (200 ms by default) block the whole loop, during which the
//! display is dark and the buttons are not read.

use core::convert::Infallible;

use chrono::NaiveDateTime;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::alarm::AlarmSlot;
use crate::button::{Buttons, Debouncer};
use crate::display::SevenSegment;
use crate::melody::{MelodyPlayer, Tone, IMPERIAL_MARCH};
use crate::mode::{Commit, EditBuffer, Event, ModeMachine, OperatingMode};
use crate::rtc::{self, Recovery, Rtc};
use crate::time::{Millis, TimeOfDay};
use crate::{Config, Error};

/// The whole clock: display, buttons, RTC, buzzer and their state.
pub struct AlarmClock<O, I, R, T, D, M>
where
    O: OutputPin,
    I: InputPin,
    R: Rtc,
    T: Tone,
    D: DelayNs,
    M: Millis,
{
    display: SevenSegment<O>,
    buttons: Buttons<I>,
    debouncer: Debouncer,
    modes: ModeMachine,
    alarm: AlarmSlot,
    melody: MelodyPlayer<T>,
    rtc: R,
    delay: D,
    millis: M,
    settle_ms: u32,
    seed_datetime: NaiveDateTime,
}

impl<O, I, R, T, D, M> AlarmClock<O, I, R, T, D, M>
where
    O: OutputPin,
    I: InputPin,
    R: Rtc,
    T: Tone,
    D: DelayNs,
    M: Millis,
{
    /// Assembles the controller. No hardware is touched until
    /// [`AlarmClock::init`].
    pub fn new(
        display: SevenSegment<O>,
        buttons: Buttons<I>,
        rtc: R,
        tone: T,
        delay: D,
        millis: M,
        config: Config,
    ) -> Self {
        Self {
            display,
            buttons,
            debouncer: Debouncer::new(config.debounce_ms),
            modes: ModeMachine::new(),
            alarm: AlarmSlot::new(config.initial_alarm),
            melody: MelodyPlayer::new(tone, config.note_gap_ms),
            rtc,
            delay,
            millis,
            settle_ms: config.settle_ms,
            seed_datetime: config.seed_datetime,
        }
    }

    /// Startup: blank the display, repair the RTC, silence the buzzer.
    ///
    /// # Returns
    /// * `Ok(Recovery)` - which RTC faults were repaired
    /// * `Err(Error)` if a collaborator failed
    pub fn init(&mut self) -> Result<Recovery, Error<R::Error, T::Error>> {
        self.display.blank()?;
        let recovery = rtc::recover(&mut self.rtc, &self.seed_datetime).map_err(Error::Rtc)?;
        self.melody.silence().map_err(Error::Tone)?;
        info!("clock ready");
        Ok(recovery)
    }

    /// Runs one control-loop iteration.
    pub fn poll(&mut self) -> Result<(), Error<R::Error, T::Error>> {
        let levels = self.buttons.sample()?;
        let events = self.debouncer.update(levels, self.millis.now_ms());
        if let Some(button) = events.action {
            self.dispatch(Event::from(button))?;
        }
        if events.select_digit {
            self.dispatch(Event::SelectDigit)?;
        }

        let now = self.rtc.datetime().map_err(Error::Rtc)?;
        let live = TimeOfDay::from_timelike(&now);
        self.display
            .render(self.modes.display_time(live), &mut self.delay)?;

        match self.modes.mode().increment_button() {
            None => {
                let melody = &mut self.melody;
                let delay = &mut self.delay;
                self.alarm
                    .check(live, || melody.play(IMPERIAL_MARCH, delay))
                    .map_err(Error::Tone)?;
            }
            Some(button) => {
                if self.modes.hold(levels.is_pressed(button)) {
                    self.delay.delay_ms(self.settle_ms);
                }
            }
        }
        Ok(())
    }

    /// Polls forever; only returns on a collaborator error.
    pub fn run(&mut self) -> Result<Infallible, Error<R::Error, T::Error>> {
        loop {
            self.poll()?;
        }
    }

    fn dispatch(&mut self, event: Event) -> Result<(), Error<R::Error, T::Error>> {
        match self.modes.handle(event) {
            Some(Commit::Time(time)) => {
                let current = self.rtc.datetime().map_err(Error::Rtc)?;
                let updated = rtc::with_time_of_day(&current, time);
                self.rtc.set_datetime(&updated).map_err(Error::Rtc)?;
                info!("time set to {}:{}", time.hour(), time.minute());
            }
            Some(Commit::Alarm(time)) => self.alarm.set(time),
            None => {}
        }
        Ok(())
    }

    /// Current operating mode.
    pub fn mode(&self) -> OperatingMode {
        self.modes.mode()
    }

    /// Edit buffer while in an edit mode.
    pub fn edit_buffer(&self) -> Option<&EditBuffer> {
        self.modes.edit_buffer()
    }

    /// The alarm slot.
    pub fn alarm(&self) -> &AlarmSlot {
        &self.alarm
    }
}
