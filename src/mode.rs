//! Operating mode state machine.
//!
//! ```text
//!            SetTimeMode                 SetAlarmMode
//!   SetTime <----------- Normal -----------> SetAlarm
//!      |  ^                ^  ^                 |  ^
//!      |  | Increment,     |  |                 |  | Increment,
//!      |  | Reset,   Exit  |  | Exit            |  | Reset,
//!      +--+ SelectDigit    |  |                 +--+ SelectDigit
//!      +-------------------+  +-----------------+
//! ```
//!
//! The machine only changes state through [`ModeMachine::handle`]. Leaving
//! an edit mode with `Exit` yields exactly one [`Commit`] naming where the
//! edited time must be written.

use crate::button::Button;
use crate::time::{Field, TimeOfDay};

/// Current operating mode.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// Showing the live time and watching for the alarm
    #[default]
    Normal,
    /// Editing the time to write to the RTC
    SetTime,
    /// Editing the alarm time
    SetAlarm,
}

impl OperatingMode {
    /// Button whose hold increments the edit buffer in this mode.
    #[must_use]
    pub fn increment_button(self) -> Option<Button> {
        match self {
            OperatingMode::Normal => None,
            OperatingMode::SetTime => Some(Button::SetTimeMode),
            OperatingMode::SetAlarm => Some(Button::SetAlarmMode),
        }
    }

    /// Whether this mode edits a time.
    #[must_use]
    pub fn is_editing(self) -> bool {
        self != OperatingMode::Normal
    }
}

/// Input to the state machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Accepted `SetTimeMode` action
    SetTimeMode,
    /// Accepted `SetAlarmMode` action
    SetAlarmMode,
    /// Accepted `Reset` action
    Reset,
    /// Accepted `Exit` action
    Exit,
    /// `SelectDigit` press edge
    SelectDigit,
    /// One hold-to-increment step
    Increment,
}

impl From<Button> for Event {
    fn from(button: Button) -> Self {
        match button {
            Button::SetTimeMode => Event::SetTimeMode,
            Button::SetAlarmMode => Event::SetAlarmMode,
            Button::Reset => Event::Reset,
            Button::Exit => Event::Exit,
            Button::SelectDigit => Event::SelectDigit,
        }
    }
}

/// Where a finished edit must be stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Commit {
    /// Write hour and minute to the RTC, seconds zeroed
    Time(TimeOfDay),
    /// Store as the alarm time
    Alarm(TimeOfDay),
}

/// The time being edited and the cursor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EditBuffer {
    /// Value shown and incremented
    pub time: TimeOfDay,
    /// Field the next increment applies to
    pub field: Field,
    /// Set once the increment button has been seen released in this mode
    increment_armed: bool,
}

impl EditBuffer {
    fn fresh() -> Self {
        Self {
            time: TimeOfDay::MIDNIGHT,
            field: Field::Hour,
            increment_armed: false,
        }
    }
}

/// Mode state plus the edit buffer it owns.
#[derive(Clone, Debug, Default)]
pub struct ModeMachine {
    mode: OperatingMode,
    edit: EditBuffer,
}

impl ModeMachine {
    /// Starts in [`OperatingMode::Normal`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Edit buffer, only while editing.
    #[must_use]
    pub fn edit_buffer(&self) -> Option<&EditBuffer> {
        self.mode.is_editing().then_some(&self.edit)
    }

    /// Time the display should show: the edit buffer while editing,
    /// otherwise `live`.
    #[must_use]
    pub fn display_time(&self, live: TimeOfDay) -> TimeOfDay {
        if self.mode.is_editing() {
            self.edit.time
        } else {
            live
        }
    }

    /// Applies one event. Returns the commit produced by leaving an edit
    /// mode, if any.
    pub fn handle(&mut self, event: Event) -> Option<Commit> {
        match (self.mode, event) {
            (OperatingMode::Normal, Event::SetTimeMode) => {
                self.enter(OperatingMode::SetTime);
                None
            }
            (OperatingMode::Normal, Event::SetAlarmMode) => {
                self.enter(OperatingMode::SetAlarm);
                None
            }
            (OperatingMode::Normal, _) => None,
            (_, Event::Increment) => {
                self.edit.time.increment(self.edit.field);
                debug!(
                    "increment {:?} -> {}:{}",
                    self.edit.field,
                    self.edit.time.hour(),
                    self.edit.time.minute()
                );
                None
            }
            (_, Event::Reset) => {
                self.edit.time = TimeOfDay::MIDNIGHT;
                debug!("edit buffer reset");
                None
            }
            (_, Event::SelectDigit) => {
                self.edit.field = self.edit.field.toggle();
                debug!("cursor on {:?}", self.edit.field);
                None
            }
            (mode, Event::Exit) => {
                let time = self.edit.time;
                self.mode = OperatingMode::Normal;
                self.edit = EditBuffer::fresh();
                let commit = match mode {
                    OperatingMode::SetAlarm => Commit::Alarm(time),
                    _ => Commit::Time(time),
                };
                info!("leaving {:?}, commit {:?}", mode, commit);
                Some(commit)
            }
            // The mode buttons only enter their mode; increments come from
            // holding them, see `hold`.
            (_, Event::SetTimeMode | Event::SetAlarmMode) => None,
        }
    }

    /// Feeds the raw level of the current mode's increment button.
    ///
    /// Returns `true` when an increment was applied. The button must be seen
    /// released once after entering the mode, so the press that entered the
    /// mode does not also count as an increment.
    pub fn hold(&mut self, pressed: bool) -> bool {
        if !self.mode.is_editing() {
            return false;
        }
        if !pressed {
            self.edit.increment_armed = true;
            return false;
        }
        if !self.edit.increment_armed {
            return false;
        }
        self.handle(Event::Increment);
        true
    }

    fn enter(&mut self, mode: OperatingMode) {
        self.mode = mode;
        self.edit = EditBuffer::fresh();
        info!("entering {:?}", mode);
    }
}
