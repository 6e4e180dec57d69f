/// Vertical motion primitives for an airborne player.
///
/// An airborne player moves `|velocity|` rows per frame, one row at a time,
/// in the direction of the velocity's sign. Each single-row step is resolved
/// by [`step_vertical`] so callers can run contact checks between steps.
/// After all steps, gravity adds 1 (downward) up to [`MAX_FALL_SPEED`].

use super::rules::{offset, StageView};

/// Initial upward velocity of a jump.
pub const JUMP_VELOCITY: i32 = -2;
/// Initial downward velocity when walking off a ledge.
pub const FALL_START_VELOCITY: i32 = 1;
/// Terminal downward velocity.
pub const MAX_FALL_SPEED: i32 = 2;

/// Result of trying to move one row.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VerticalStep {
    /// Moved into the given row.
    Moved(usize),
    /// Hit the ceiling (top of the grid or a solid tile above).
    Bumped,
    /// Hit the floor (solid tile below or the bottom of the grid).
    Landed,
}

/// Number of single-row steps and their direction (+1 down, -1 up).
pub fn airborne_steps(velocity: i32) -> (u32, i32) {
    (velocity.unsigned_abs(), velocity.signum())
}

/// Gravity applied once per airborne frame.
pub fn apply_gravity(velocity: i32) -> i32 {
    (velocity + 1).min(MAX_FALL_SPEED)
}

/// Try to move one row from (x, y) in direction `dir`.
pub fn step_vertical(view: &StageView, x: usize, y: usize, dir: i32) -> VerticalStep {
    let blocked = if dir > 0 { VerticalStep::Landed } else { VerticalStep::Bumped };
    match offset(y, dir, view.height) {
        Some(ny) if !view.is_blocked(x, ny) => VerticalStep::Moved(ny),
        _ => blocked,
    }
}
