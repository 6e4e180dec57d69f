/// Session driver: title → play loop → game over / ending.
///
/// The loop runs one simulation tick per frame:
///   1. poll the input provider (non-blocking)
///   2. quit → leave; otherwise `step::step`
///   3. forward sound cues, present the new frame
///   4. sleep the fixed tick
///
/// Menu screens block on `wait_key`. Terminal, gamepad and audio are behind
/// the two traits below so the whole flow runs headless in tests.
///
/// The world must already be on its first stage (`level::init_stage`).

use std::io;
use std::thread;
use std::time::Duration;

use tracing::info;

use crate::domain::entity::Input;
use super::event::{GameEvent, SoundCue};
use super::level::MapWarning;
use super::step;
use super::world::{Frame, Phase, WorldState};

/// A key read on a menu screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KeyPress {
    /// Enter (or the gamepad's confirm button).
    Confirm,
    /// `q` / `Q` (or the gamepad's quit button).
    Quit,
    Other,
}

pub trait InputProvider {
    /// Movement command for this tick, if any. Never blocks.
    fn poll(&mut self) -> Option<Input>;

    /// Block until one key arrives.
    fn wait_key(&mut self) -> io::Result<KeyPress>;

    /// Throw away keystrokes typed before a screen appeared.
    fn discard_pending(&mut self) {
        while self.poll().is_some() {}
    }
}

/// What the presentation sink is asked to draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Title { width: usize, height: usize, stages: usize, warnings: Vec<String> },
    Play(Frame),
    GameOver { score: u32 },
    Ending { score: u32 },
}

pub trait PresentationSink {
    fn show(&mut self, screen: &Screen) -> io::Result<()>;
    fn play(&mut self, cue: SoundCue);
}

/// How the session ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionEnd {
    Quit,
    Cleared,
}

pub fn run<I, P>(
    world: &mut WorldState,
    input: &mut I,
    sink: &mut P,
    tick: Duration,
    warnings: &[MapWarning],
) -> io::Result<SessionEnd>
where
    I: InputProvider,
    P: PresentationSink,
{
    sink.show(&Screen::Title {
        width: world.width(),
        height: world.height(),
        stages: world.stage_count(),
        warnings: warnings.iter().map(|w| w.to_string()).collect(),
    })?;
    if input.wait_key()? == KeyPress::Quit {
        info!("quit from title screen");
        return Ok(SessionEnd::Quit);
    }

    sink.show(&Screen::Play(world.frame()))?;

    loop {
        match world.phase {
            Phase::Playing => {
                let command = input.poll();
                if command == Some(Input::Quit) {
                    info!(score = world.score, stage = world.stage + 1, "quit during play");
                    return Ok(SessionEnd::Quit);
                }

                let events = step::step(world, command);
                forward_cues(sink, &events);

                if world.phase == Phase::Playing {
                    sink.show(&Screen::Play(world.frame()))?;
                    if !tick.is_zero() {
                        thread::sleep(tick);
                    }
                }
            }
            Phase::GameOver => {
                sink.show(&Screen::GameOver { score: world.score })?;
                loop {
                    match input.wait_key()? {
                        KeyPress::Confirm => break,
                        KeyPress::Quit => return Ok(SessionEnd::Quit),
                        KeyPress::Other => {}
                    }
                }
                step::restart_game(world);
                sink.show(&Screen::Play(world.frame()))?;
            }
            Phase::Complete => {
                input.discard_pending();
                sink.show(&Screen::Ending { score: world.score })?;
                input.wait_key()?;
                info!(score = world.score, "all stages cleared");
                return Ok(SessionEnd::Cleared);
            }
        }
    }
}

fn forward_cues<P: PresentationSink>(sink: &mut P, events: &[GameEvent]) {
    for cue in events.iter().filter_map(GameEvent::cue) {
        sink.play(cue);
    }
}
