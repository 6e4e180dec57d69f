/// Gamepad input tracker using gilrs.
///
/// Fixed mapping:
///   D-pad / Left Stick    →  Movement / ladder
///   A (South)             →  Jump
///   Start                 →  Confirm
///   Select                →  Quit
///
/// Without the `gamepad` feature the tracker compiles to an inert stub
/// that never reports input.

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};
#[cfg(feature = "gamepad")]
use tracing::{debug, warn};

use crate::domain::entity::Input;
use crate::sim::session::KeyPress;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

#[derive(Default)]
pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    jump: BtnState,
    confirm: BtnState,
    quit: BtnState,

    // D-pad
    dpad_up: BtnState,
    dpad_down: BtnState,
    dpad_left: BtnState,
    dpad_right: BtnState,

    // Stick
    stick_x: f32,
    stick_y: f32,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs, connected) = match Gilrs::new() {
            Ok(g) => {
                let has_pad = g.gamepads().next().is_some();
                (Some(g), has_pad)
            }
            Err(e) => {
                warn!(error = %e, "gamepad support unavailable");
                (None, false)
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs,
            connected,
            ..GamepadState::default()
        }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => self.set_button(btn, false),
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    self.update_axis(axis, value);
                }
                EventType::Connected => {
                    debug!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    debug!("gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, btn: Button, held: bool) {
        let state = match btn {
            Button::South => &mut self.jump,
            Button::Start => &mut self.confirm,
            Button::Select => &mut self.quit,
            Button::DPadUp => &mut self.dpad_up,
            Button::DPadDown => &mut self.dpad_down,
            Button::DPadLeft => &mut self.dpad_left,
            Button::DPadRight => &mut self.dpad_right,
            _ => return,
        };
        state.set(held);
    }

    #[cfg(feature = "gamepad")]
    fn update_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::LeftStickX => self.stick_x = value,
            Axis::LeftStickY => self.stick_y = value,
            _ => {}
        }
    }

    // ── Queries ──

    /// Movement symbol for this frame. Buttons are edge-triggered,
    /// directions are continuous while held.
    pub fn command(&self) -> Option<Input> {
        if self.quit.just_pressed {
            Some(Input::Quit)
        } else if self.jump.just_pressed {
            Some(Input::Jump)
        } else if self.up_held() {
            Some(Input::Up)
        } else if self.down_held() {
            Some(Input::Down)
        } else if self.left_held() {
            Some(Input::Left)
        } else if self.right_held() {
            Some(Input::Right)
        } else {
            None
        }
    }

    /// Menu key from this frame's button presses.
    pub fn menu_key(&self) -> Option<KeyPress> {
        if self.quit.just_pressed {
            Some(KeyPress::Quit)
        } else if self.confirm.just_pressed {
            Some(KeyPress::Confirm)
        } else if self.jump.just_pressed {
            Some(KeyPress::Other)
        } else {
            None
        }
    }

    fn up_held(&self) -> bool {
        self.dpad_up.held || self.stick_y > STICK_DEADZONE
    }
    fn down_held(&self) -> bool {
        self.dpad_down.held || self.stick_y < -STICK_DEADZONE
    }
    fn left_held(&self) -> bool {
        self.dpad_left.held || self.stick_x < -STICK_DEADZONE
    }
    fn right_held(&self) -> bool {
        self.dpad_right.held || self.stick_x > STICK_DEADZONE
    }

    // ── Internal ──

    fn buttons_mut(&mut self) -> [&mut BtnState; 7] {
        [
            &mut self.jump,
            &mut self.confirm,
            &mut self.quit,
            &mut self.dpad_up,
            &mut self.dpad_down,
            &mut self.dpad_left,
            &mut self.dpad_right,
        ]
    }

    fn clear_just_pressed(&mut self) {
        for b in self.buttons_mut() {
            b.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in self.buttons_mut() {
            *b = BtnState::default();
        }
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad() -> GamepadState {
        GamepadState::default()
    }

    #[test]
    fn idle_pad_reports_nothing() {
        let p = pad();
        assert_eq!(p.command(), None);
        assert_eq!(p.menu_key(), None);
    }

    #[test]
    fn press_is_an_edge() {
        let mut p = pad();
        p.jump.set(true);
        assert_eq!(p.command(), Some(Input::Jump));
        p.clear_just_pressed();
        p.jump.set(true);
        assert_eq!(p.command(), None);
    }

    #[test]
    fn quit_beats_movement() {
        let mut p = pad();
        p.dpad_left.set(true);
        p.quit.set(true);
        assert_eq!(p.command(), Some(Input::Quit));
        assert_eq!(p.menu_key(), Some(KeyPress::Quit));
    }

    #[test]
    fn stick_past_deadzone_moves() {
        let mut p = pad();
        p.stick_x = 0.1;
        assert_eq!(p.command(), None);
        p.stick_x = 0.8;
        assert_eq!(p.command(), Some(Input::Right));
        p.stick_y = -0.9;
        assert_eq!(p.command(), Some(Input::Down));
    }

    #[test]
    fn release_all_clears_state() {
        let mut p = pad();
        p.dpad_up.set(true);
        p.stick_x = -1.0;
        p.release_all();
        assert_eq!(p.command(), None);
    }

    #[test]
    fn start_confirms() {
        let mut p = pad();
        p.confirm.set(true);
        assert_eq!(p.menu_key(), Some(KeyPress::Confirm));
    }
}
