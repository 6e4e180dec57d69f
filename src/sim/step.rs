/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Player motion (horizontal → ladder drop → climb / airborne / ledge)
///   2. Enemy patrol
///   3. Collision & scoring (enemy contact, coin pickup)
///   4. Exit check → stage transition
///
/// Airborne motion runs the collision check after every single-row step,
/// so a jump arcing through a coin or an enemy registers the contact at
/// the intermediate cell and not only where the player comes to rest.

use tracing::{debug, info};

use crate::domain::ai;
use crate::domain::entity::Input;
use crate::domain::physics::{self, VerticalStep};
use crate::domain::rules;
use super::event::GameEvent;
use super::level;
use super::world::{Phase, WorldState, STARTING_LIVES};

/// Points per coin.
pub const COIN_SCORE: u32 = 20;
/// Points per cleared stage.
pub const STAGE_CLEAR_SCORE: u32 = 100;

/// Whether the rest of the current phase of a tick should run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flow {
    Continue,
    /// An enemy hit reset the stage or ended the game.
    Halt,
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: Option<Input>) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    resolve_player_movement(world, input, &mut events);
    if world.phase != Phase::Playing { return events; }

    resolve_enemy_movement(world);
    if resolve_collisions(world, &mut events) == Flow::Halt { return events; }

    resolve_exit(world, &mut events);
    events
}

// ══════════════════════════════════════════════════════════════
// Player motion
// ══════════════════════════════════════════════════════════════

fn resolve_player_movement(world: &mut WorldState, input: Option<Input>, events: &mut Vec<GameEvent>) {
    let before_x = world.player.x;
    let (px, py) = (world.player.x, world.player.y);

    // Everything below is judged from the pre-move cell.
    let (on_ladder, falls, jump, target_x) = {
        let view = world.view();
        let on_ladder = view.is_ladder(px, py);
        let jump = input == Some(Input::Jump)
            && rules::can_jump(&view, px, py, world.player.is_jumping, on_ladder);
        let target_x = match input {
            Some(Input::Left) => rules::horizontal_target(&view, px, py, -1),
            Some(Input::Right) => rules::horizontal_target(&view, px, py, 1),
            _ => None,
        };
        (on_ladder, rules::starts_falling(&view, px, py), jump, target_x)
    };
    world.player.on_ladder = on_ladder;

    if jump {
        world.player.is_jumping = true;
        world.player.velocity_y = physics::JUMP_VELOCITY;
        events.push(GameEvent::Jumped);
    }

    if let Some(nx) = target_x {
        world.player.x = nx;
    }

    // Drop through the floor onto a ladder two rows down.
    if input == Some(Input::Down) {
        if let Some(ny) = rules::ladder_drop_target(&world.view(), world.player.x, py) {
            world.player.y = ny;
            world.player.settle();
            return;
        }
    }

    match input {
        Some(Input::Up) if on_ladder => climb(world, true),
        Some(Input::Down) if on_ladder => climb(world, false),
        _ if world.player.is_jumping => {
            if resolve_airborne(world, events) == Flow::Halt { return; }
        }
        _ => {
            if falls {
                world.player.is_jumping = true;
                world.player.velocity_y = physics::FALL_START_VELOCITY;
            }
        }
    }

    if world.player.y >= world.height() {
        debug!(stage = world.stage + 1, "fell out of the stage");
        level::init_stage(world);
        events.push(GameEvent::PlayerRespawned);
        return;
    }

    // Embedded in a wall: undo the horizontal part of the move only.
    if world.tile_at(world.player.x, world.player.y).is_solid() {
        world.player.x = before_x;
    }
}

/// Ladder climbing. Any down press on a ladder grabs it, even when the
/// way down is blocked; an up press only grabs when the player can move.
fn climb(world: &mut WorldState, up: bool) {
    let (x, y) = (world.player.x, world.player.y);
    let target = {
        let view = world.view();
        if up {
            rules::climb_up_target(&view, x, y)
        } else {
            rules::climb_down_target(&view, x, y)
        }
    };
    if let Some(ny) = target {
        world.player.y = ny;
        world.player.settle();
    } else if !up {
        world.player.settle();
    }
}

/// Move an airborne player row by row, then apply gravity.
fn resolve_airborne(world: &mut WorldState, events: &mut Vec<GameEvent>) -> Flow {
    let (steps, dir) = physics::airborne_steps(world.player.velocity_y);

    for _ in 0..steps {
        let outcome = physics::step_vertical(&world.view(), world.player.x, world.player.y, dir);
        match outcome {
            VerticalStep::Moved(ny) => world.player.y = ny,
            VerticalStep::Bumped => {
                world.player.velocity_y = 0;
                break;
            }
            VerticalStep::Landed => {
                world.player.settle();
                break;
            }
        }
        if resolve_collisions(world, events) == Flow::Halt {
            return Flow::Halt;
        }
    }

    if world.player.is_jumping {
        world.player.velocity_y = physics::apply_gravity(world.player.velocity_y);
    }
    Flow::Continue
}

// ══════════════════════════════════════════════════════════════
// Enemy patrol
// ══════════════════════════════════════════════════════════════

fn resolve_enemy_movement(world: &mut WorldState) {
    let view = world.map.stage(world.stage);
    for enemy in world.enemies.iter_mut() {
        ai::patrol(&view, enemy);
    }
}

// ══════════════════════════════════════════════════════════════
// Collision & scoring
// ══════════════════════════════════════════════════════════════

/// Enemy contact first (costs a life, resets the stage or ends the game),
/// then coin pickup at the player's cell.
pub fn resolve_collisions(world: &mut WorldState, events: &mut Vec<GameEvent>) -> Flow {
    let (px, py) = (world.player.x, world.player.y);

    if world.enemies.iter().any(|e| e.x == px && e.y == py) {
        world.life = world.life.saturating_sub(1);
        events.push(GameEvent::EnemyHit { lives_left: world.life });
        if world.life == 0 {
            info!(score = world.score, stage = world.stage + 1, "game over");
            world.phase = Phase::GameOver;
            events.push(GameEvent::GameOver);
        } else {
            debug!(lives_left = world.life, "player hit, restarting stage");
            level::init_stage(world);
        }
        return Flow::Halt;
    }

    for coin in world.coins.iter_mut() {
        if coin.collected || coin.x != px || coin.y != py { continue; }
        coin.collected = true;
        world.map.clear_tile(world.stage, px, py);
        world.score += COIN_SCORE;
        events.push(GameEvent::CoinCollected { x: px, y: py });
    }

    Flow::Continue
}

// ══════════════════════════════════════════════════════════════
// Stage transition
// ══════════════════════════════════════════════════════════════

fn resolve_exit(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if !world.tile_at(world.player.x, world.player.y).is_exit() { return; }

    let cleared = world.stage;
    world.stage += 1;
    world.score += STAGE_CLEAR_SCORE;
    events.push(GameEvent::StageCleared { stage: cleared });
    info!(stage = cleared + 1, score = world.score, "stage cleared");

    if world.stage < world.stage_count() {
        level::init_stage(world);
    } else {
        world.phase = Phase::Complete;
        events.push(GameEvent::AllStagesCleared);
    }
}

/// Full restart after game over: pristine grid, stage 0, fresh counters.
pub fn restart_game(world: &mut WorldState) {
    world.map.reset();
    world.stage = 0;
    world.score = 0;
    world.life = STARTING_LIVES;
    world.phase = Phase::Playing;
    level::init_stage(world);
    info!("new run started");
}
