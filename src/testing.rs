//! Host-side fakes shared by the unit tests.
//!
//! Pins and collaborators record into shared logs so a test can hand
//! ownership to the code under test and still inspect what happened.

extern crate alloc;

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::convert::Infallible;

use chrono::{NaiveDate, NaiveDateTime};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::melody::Tone;
use crate::rtc::Rtc;
use crate::time::Millis;

/// Ordered record of `(pin id, driven high)` across every [`LogPin`].
pub type PinLog = Rc<RefCell<Vec<(u8, bool)>>>;

/// Output pin that appends each write to a shared log.
pub struct LogPin {
    pub id: u8,
    pub log: PinLog,
}

impl ErrorType for LogPin {
    type Error = Infallible;
}

impl OutputPin for LogPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push((self.id, false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.log.borrow_mut().push((self.id, true));
        Ok(())
    }
}

/// Input pin whose level is set from the test.
#[derive(Clone, Default)]
pub struct FakeInput {
    pub high: Rc<Cell<bool>>,
}

impl FakeInput {
    /// A released pull-up button reads high.
    pub fn released() -> Self {
        let pin = Self::default();
        pin.high.set(true);
        pin
    }

    pub fn press(&self) {
        self.high.set(false);
    }

    pub fn release(&self) {
        self.high.set(true);
    }
}

impl ErrorType for FakeInput {
    type Error = Infallible;
}

impl InputPin for FakeInput {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high.get())
    }
}

/// Delay that records requested milliseconds instead of sleeping.
#[derive(Clone, Default)]
pub struct RecordingDelay {
    pub calls: Rc<RefCell<Vec<u32>>>,
}

impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.calls.borrow().iter().map(|&ms| u64::from(ms)).sum()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls.borrow_mut().push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls.borrow_mut().push(ms);
    }
}

/// Manually advanced millisecond counter.
#[derive(Clone, Default)]
pub struct FakeMillis {
    pub now: Rc<Cell<u32>>,
}

impl FakeMillis {
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Millis for FakeMillis {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToneCall {
    Play(u16, u32),
    Stop,
}

/// Tone generator that records calls.
#[derive(Clone, Default)]
pub struct FakeTone {
    pub calls: Rc<RefCell<Vec<ToneCall>>>,
}

impl FakeTone {
    pub fn notes_played(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, ToneCall::Play(..)))
            .count()
    }
}

impl Tone for FakeTone {
    type Error = Infallible;

    fn play_tone(&mut self, frequency_hz: u16, duration_ms: u32) -> Result<(), Self::Error> {
        self.calls
            .borrow_mut()
            .push(ToneCall::Play(frequency_hz, duration_ms));
        Ok(())
    }

    fn stop_tone(&mut self) -> Result<(), Self::Error> {
        self.calls.borrow_mut().push(ToneCall::Stop);
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RtcCall {
    SetDateTime(NaiveDateTime),
    SetWriteProtected(bool),
    SetRunning(bool),
}

#[derive(Debug)]
pub struct RtcState {
    pub now: NaiveDateTime,
    pub valid: bool,
    pub write_protected: bool,
    pub running: bool,
    pub calls: Vec<RtcCall>,
}

/// Clock chip double; writes update `now` and are logged.
#[derive(Clone)]
pub struct FakeRtc {
    pub state: Rc<RefCell<RtcState>>,
}

impl FakeRtc {
    pub fn at(hour: u32, minute: u32, second: u32) -> Self {
        let now = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap();
        Self {
            state: Rc::new(RefCell::new(RtcState {
                now,
                valid: true,
                write_protected: false,
                running: true,
                calls: Vec::new(),
            })),
        }
    }

    pub fn set_now(&self, hour: u32, minute: u32, second: u32) {
        let mut state = self.state.borrow_mut();
        state.now = state.now.date().and_hms_opt(hour, minute, second).unwrap();
    }

    pub fn calls(&self) -> Vec<RtcCall> {
        self.state.borrow().calls.clone()
    }
}

impl Rtc for FakeRtc {
    type Error = Infallible;

    fn datetime(&mut self) -> Result<NaiveDateTime, Self::Error> {
        Ok(self.state.borrow().now)
    }

    fn set_datetime(&mut self, datetime: &NaiveDateTime) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        state.now = *datetime;
        state.valid = true;
        state.calls.push(RtcCall::SetDateTime(*datetime));
        Ok(())
    }

    fn is_datetime_valid(&mut self) -> Result<bool, Self::Error> {
        Ok(self.state.borrow().valid)
    }

    fn is_write_protected(&mut self) -> Result<bool, Self::Error> {
        Ok(self.state.borrow().write_protected)
    }

    fn set_write_protected(&mut self, protected: bool) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        state.write_protected = protected;
        state.calls.push(RtcCall::SetWriteProtected(protected));
        Ok(())
    }

    fn is_running(&mut self) -> Result<bool, Self::Error> {
        Ok(self.state.borrow().running)
    }

    fn set_running(&mut self, running: bool) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        state.running = running;
        state.calls.push(RtcCall::SetRunning(running));
        Ok(())
    }
}
