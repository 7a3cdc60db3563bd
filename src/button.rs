//! Button sampling and debouncing.
//!
//! Five momentary buttons are read once per loop iteration. Two disciplines
//! coexist:
//!
//! - **Level-gated** (`SetTimeMode`, `SetAlarmMode`, `Reset`, `Exit`): a
//!   pressed level is accepted as an action only when at least the debounce
//!   window has passed since the last accepted action of *any* of these four
//!   buttons. The buttons are checked in that order and the first accepted
//!   one closes the window for the rest, so at most one action is produced
//!   per window. Holding a button produces a new action every window.
//! - **Edge-gated** (`SelectDigit`): the button keeps its own change
//!   timestamp and fires once on the press edge after its raw level has been
//!   steady for the debounce window.

use embedded_hal::digital::{Error as _, ErrorKind, InputPin};

use crate::time::elapsed_ms;
use crate::Polarity;

/// The five front panel buttons.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Enter set-time mode, or hold to increment while setting the time
    SetTimeMode = 0,
    /// Enter set-alarm mode, or hold to increment while setting the alarm
    SetAlarmMode = 1,
    /// Zero the edit buffer
    Reset = 2,
    /// Commit the edit buffer and return to the clock
    Exit = 3,
    /// Move the edit cursor between hours and minutes
    SelectDigit = 4,
}

impl Button {
    /// Every button, in sampling order.
    pub const ALL: [Button; 5] = [
        Button::SetTimeMode,
        Button::SetAlarmMode,
        Button::Reset,
        Button::Exit,
        Button::SelectDigit,
    ];

    /// Buttons handled by the shared level gate, in priority order.
    pub const LEVEL_GATED: [Button; 4] = [
        Button::SetTimeMode,
        Button::SetAlarmMode,
        Button::Reset,
        Button::Exit,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Raw pressed/released levels of all buttons at one instant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Levels([bool; 5]);

impl Levels {
    /// All buttons released.
    pub const RELEASED: Levels = Levels([false; 5]);

    /// Whether `button` reads pressed.
    #[must_use]
    pub fn is_pressed(&self, button: Button) -> bool {
        self.0[button.index()]
    }

    /// Copy of `self` with `button` set to `pressed`.
    #[must_use]
    pub fn with(mut self, button: Button, pressed: bool) -> Self {
        self.0[button.index()] = pressed;
        self
    }
}

/// Per-button debounce record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState {
    /// Level seen on the previous sample
    pub raw_pressed: bool,
    /// Level accepted as stable
    pub stable_pressed: bool,
    /// When the raw level last changed
    pub last_change_ms: u32,
}

impl ButtonState {
    const fn new() -> Self {
        Self {
            raw_pressed: false,
            stable_pressed: false,
            last_change_ms: 0,
        }
    }
}

/// Outcome of one debouncer update.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Events {
    /// Level-gated action accepted this update, if any
    pub action: Option<Button>,
    /// `SelectDigit` press edge accepted this update
    pub select_digit: bool,
    /// Raw levels the update was computed from
    pub levels: Levels,
}

/// Debouncer for all five buttons.
///
/// Only this type writes the button timestamps and stable levels.
#[derive(Clone, Debug)]
pub struct Debouncer {
    window_ms: u32,
    last_action_ms: u32,
    states: [ButtonState; 5],
}

impl Debouncer {
    /// Creates a debouncer with the given window, all buttons released.
    ///
    /// The shared action timestamp starts at zero, so presses during the
    /// first window after boot are ignored.
    #[must_use]
    pub const fn new(window_ms: u32) -> Self {
        Self {
            window_ms,
            last_action_ms: 0,
            states: [ButtonState::new(); 5],
        }
    }

    /// Debounce state of `button`.
    #[must_use]
    pub fn state(&self, button: Button) -> &ButtonState {
        &self.states[button.index()]
    }

    /// Folds one sample taken at `now_ms` into the debounce state.
    pub fn update(&mut self, levels: Levels, now_ms: u32) -> Events {
        let mut action = None;
        for button in Button::LEVEL_GATED {
            if self.level_gate(button, levels.is_pressed(button), now_ms) {
                action = Some(button);
                break;
            }
        }
        for button in Button::LEVEL_GATED {
            let state = &mut self.states[button.index()];
            let pressed = levels.is_pressed(button);
            if pressed != state.raw_pressed {
                state.last_change_ms = now_ms;
            }
            state.raw_pressed = pressed;
            if !pressed {
                state.stable_pressed = false;
            }
        }

        let select_digit = self.edge_gate(
            Button::SelectDigit,
            levels.is_pressed(Button::SelectDigit),
            now_ms,
        );

        if let Some(button) = action {
            trace!("button action: {:?}", button);
        }

        Events {
            action,
            select_digit,
            levels,
        }
    }

    fn level_gate(&mut self, button: Button, pressed: bool, now_ms: u32) -> bool {
        if !pressed || elapsed_ms(now_ms, self.last_action_ms) < self.window_ms {
            return false;
        }
        self.last_action_ms = now_ms;
        self.states[button.index()].stable_pressed = true;
        true
    }

    fn edge_gate(&mut self, button: Button, pressed: bool, now_ms: u32) -> bool {
        let window_ms = self.window_ms;
        let state = &mut self.states[button.index()];
        if pressed != state.raw_pressed {
            state.last_change_ms = now_ms;
        }
        state.raw_pressed = pressed;

        let mut fired = false;
        if elapsed_ms(now_ms, state.last_change_ms) >= window_ms {
            fired = pressed && !state.stable_pressed;
            state.stable_pressed = pressed;
        }
        fired
    }
}

/// The five button input pins.
pub struct Buttons<I: InputPin> {
    pins: [I; 5],
    polarity: Polarity,
}

impl<I: InputPin> Buttons<I> {
    /// Bundles already configured input pins.
    ///
    /// `polarity` is the level a pressed button reads; pull-up wiring with
    /// the button to ground is [`Polarity::ActiveLow`].
    pub fn new(
        set_time_mode: I,
        set_alarm_mode: I,
        reset: I,
        exit: I,
        select_digit: I,
        polarity: Polarity,
    ) -> Self {
        Self {
            pins: [set_time_mode, set_alarm_mode, reset, exit, select_digit],
            polarity,
        }
    }

    /// Reads every button once.
    pub fn sample(&mut self) -> Result<Levels, ErrorKind> {
        let mut levels = Levels::RELEASED;
        for (button, pin) in Button::ALL.into_iter().zip(self.pins.iter_mut()) {
            let pressed = match self.polarity {
                Polarity::ActiveLow => pin.is_low(),
                Polarity::ActiveHigh => pin.is_high(),
            }
            .map_err(|e| e.kind())?;
            levels = levels.with(button, pressed);
        }
        Ok(levels)
    }

    /// Gives the pins back in constructor order.
    pub fn release(self) -> [I; 5] {
        self.pins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTrans,
    };

    fn pressed(button: Button) -> Levels {
        Levels::RELEASED.with(button, true)
    }

    #[test]
    fn test_level_gate_ignores_presses_inside_first_window() {
        let mut debouncer = Debouncer::new(50);
        let events = debouncer.update(pressed(Button::Exit), 49);
        assert_eq!(events.action, None);
        let events = debouncer.update(pressed(Button::Exit), 50);
        assert_eq!(events.action, Some(Button::Exit));
    }

    #[test]
    fn test_level_gate_repeats_every_window_while_held() {
        let mut debouncer = Debouncer::new(50);
        assert_eq!(debouncer.update(pressed(Button::Reset), 100).action, Some(Button::Reset));
        assert_eq!(debouncer.update(pressed(Button::Reset), 120).action, None);
        assert_eq!(debouncer.update(pressed(Button::Reset), 149).action, None);
        assert_eq!(debouncer.update(pressed(Button::Reset), 150).action, Some(Button::Reset));
        assert!(debouncer.state(Button::Reset).stable_pressed);
    }

    #[test]
    fn test_level_gate_is_shared_between_buttons() {
        let mut debouncer = Debouncer::new(50);
        assert_eq!(
            debouncer.update(pressed(Button::SetTimeMode), 100).action,
            Some(Button::SetTimeMode)
        );
        // a different button inside the same window is treated as bounce
        assert_eq!(debouncer.update(pressed(Button::Exit), 110).action, None);
        assert_eq!(debouncer.update(pressed(Button::Exit), 150).action, Some(Button::Exit));
    }

    #[test]
    fn test_level_gate_priority_order() {
        let mut debouncer = Debouncer::new(50);
        let levels = Levels::RELEASED
            .with(Button::Exit, true)
            .with(Button::SetAlarmMode, true);
        assert_eq!(debouncer.update(levels, 100).action, Some(Button::SetAlarmMode));
    }

    #[test]
    fn test_release_clears_stable_level() {
        let mut debouncer = Debouncer::new(50);
        debouncer.update(pressed(Button::Exit), 100);
        assert!(debouncer.state(Button::Exit).stable_pressed);
        debouncer.update(Levels::RELEASED, 110);
        let state = debouncer.state(Button::Exit);
        assert!(!state.stable_pressed);
        assert!(!state.raw_pressed);
        assert_eq!(state.last_change_ms, 110);
    }

    #[test]
    fn test_select_digit_fires_once_after_steady_press() {
        let mut debouncer = Debouncer::new(50);
        let select = pressed(Button::SelectDigit);

        assert!(!debouncer.update(select, 1000).select_digit);
        assert!(!debouncer.update(select, 1049).select_digit);
        assert!(debouncer.update(select, 1050).select_digit);
        // still held: no further toggles
        assert!(!debouncer.update(select, 1100).select_digit);
        assert!(!debouncer.update(select, 5000).select_digit);
    }

    #[test]
    fn test_select_digit_bounce_restarts_window() {
        let mut debouncer = Debouncer::new(50);
        let select = pressed(Button::SelectDigit);

        assert!(!debouncer.update(select, 1000).select_digit);
        assert!(!debouncer.update(Levels::RELEASED, 1020).select_digit);
        assert!(!debouncer.update(select, 1030).select_digit);
        assert!(!debouncer.update(select, 1060).select_digit);
        assert!(debouncer.update(select, 1080).select_digit);
    }

    #[test]
    fn test_select_digit_needs_steady_release_before_next_toggle() {
        let mut debouncer = Debouncer::new(50);
        let select = pressed(Button::SelectDigit);

        debouncer.update(select, 1000);
        assert!(debouncer.update(select, 1050).select_digit);
        // short release glitch is not a new edge
        debouncer.update(Levels::RELEASED, 1060);
        assert!(!debouncer.update(select, 1070).select_digit);
        assert!(!debouncer.update(select, 1120).select_digit);
        // a real release followed by a real press is
        debouncer.update(Levels::RELEASED, 1200);
        debouncer.update(Levels::RELEASED, 1250);
        assert!(!debouncer.state(Button::SelectDigit).stable_pressed);
        debouncer.update(select, 1300);
        assert!(debouncer.update(select, 1350).select_digit);
    }

    #[test]
    fn test_select_digit_does_not_touch_level_gate() {
        let mut debouncer = Debouncer::new(50);
        let select = pressed(Button::SelectDigit);
        debouncer.update(select, 1000);
        assert!(debouncer.update(select, 1050).select_digit);
        let both = select.with(Button::Exit, true);
        assert_eq!(debouncer.update(both, 1051).action, Some(Button::Exit));
    }

    #[test]
    fn test_debounce_across_counter_wrap() {
        let mut debouncer = Debouncer::new(50);
        assert_eq!(
            debouncer.update(pressed(Button::Exit), u32::MAX - 10).action,
            Some(Button::Exit)
        );
        assert_eq!(debouncer.update(pressed(Button::Exit), 20).action, None);
        assert_eq!(debouncer.update(pressed(Button::Exit), 39).action, Some(Button::Exit));
    }

    #[test]
    fn test_sample_reads_active_low_pins() {
        let released = || PinMock::new(&[PinTrans::get(PinState::High)]);
        let down = PinMock::new(&[PinTrans::get(PinState::Low)]);
        let mut buttons = Buttons::new(
            released(),
            released(),
            released(),
            down,
            released(),
            Polarity::ActiveLow,
        );

        let levels = buttons.sample().unwrap();
        assert_eq!(levels, pressed(Button::Exit));

        for mut pin in buttons.release() {
            pin.done();
        }
    }

    #[test]
    fn test_sample_reads_active_high_pins() {
        let released = || PinMock::new(&[PinTrans::get(PinState::Low)]);
        let down = PinMock::new(&[PinTrans::get(PinState::High)]);
        let mut buttons = Buttons::new(
            down,
            released(),
            released(),
            released(),
            released(),
            Polarity::ActiveHigh,
        );

        let levels = buttons.sample().unwrap();
        assert_eq!(levels, pressed(Button::SetTimeMode));

        for mut pin in buttons.release() {
            pin.done();
        }
    }
}
