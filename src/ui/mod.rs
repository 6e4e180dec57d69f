/// Terminal front end: keyboard + gamepad input, crossterm renderer,
/// rodio sound, wired to the session traits.

pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;

use std::io;
use std::time::Duration;

use crate::domain::entity::Input;
use crate::sim::event::SoundCue;
use crate::sim::session::{InputProvider, KeyPress, PresentationSink, Screen};
use gamepad::GamepadState;
use input::InputState;
use renderer::Renderer;
use sound::SoundEngine;

/// How long a menu wait blocks on the keyboard before polling the gamepad.
const MENU_POLL: Duration = Duration::from_millis(20);

pub struct TerminalInput {
    kb: InputState,
    gp: GamepadState,
}

impl TerminalInput {
    pub fn new() -> Self {
        TerminalInput { kb: InputState::new(), gp: GamepadState::new() }
    }
}

impl InputProvider for TerminalInput {
    /// Keyboard takes precedence over the gamepad within a frame.
    fn poll(&mut self) -> Option<Input> {
        self.kb.drain_events();
        self.gp.update();
        self.kb.command().or_else(|| self.gp.command())
    }

    fn wait_key(&mut self) -> io::Result<KeyPress> {
        loop {
            if let Some(key) = self.kb.read_key(MENU_POLL)? {
                return Ok(key);
            }
            self.gp.update();
            if let Some(key) = self.gp.menu_key() {
                return Ok(key);
            }
        }
    }

    fn discard_pending(&mut self) {
        self.kb.drain_events();
        self.gp.update();
    }
}

pub struct TerminalSink {
    pub renderer: Renderer,
    sound: Option<SoundEngine>,
}

impl TerminalSink {
    pub fn new(renderer: Renderer, sound: Option<SoundEngine>) -> Self {
        TerminalSink { renderer, sound }
    }
}

impl PresentationSink for TerminalSink {
    fn show(&mut self, screen: &Screen) -> io::Result<()> {
        self.renderer.render(screen)
    }

    fn play(&mut self, cue: SoundCue) {
        if let Some(sfx) = &self.sound {
            sfx.play(cue);
        }
    }
}
