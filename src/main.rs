/// Entry point: config → logging → map → terminal session.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use sim::level::{self, ParsedMap};
use sim::session;
use sim::world::WorldState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;
use ui::{TerminalInput, TerminalSink};

fn main() -> ExitCode {
    let config = GameConfig::load();
    if let Some(path) = &config.log_file {
        init_tracing(path);
    }

    let ParsedMap { map, warnings } = match level::load_map(&config.map_file, &config.limits) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!(error = %e, "map load failed");
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut world = WorldState::new(map, StdRng::from_entropy());
    level::init_stage(&mut world);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return ExitCode::FAILURE;
    }

    let sound = if config.sound_enabled { SoundEngine::new() } else { None };
    let mut sink = TerminalSink::new(renderer, sound);
    let mut input = TerminalInput::new();

    let result = session::run(&mut world, &mut input, &mut sink, config.tick_rate, &warnings);

    if let Err(e) = sink.renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    match result {
        Ok(end) => {
            info!(?end, score = world.score, "session ended");
            println!();
            println!("Thanks for playing Nuguri!");
            println!("Final Score: {}", world.score);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "session aborted");
            eprintln!("Game error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// The terminal is in raw mode while playing, so logs go to a file.
/// `RUST_LOG` overrides the default `info` filter.
fn init_tracing(path: &Path) {
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {e}", path.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
}
