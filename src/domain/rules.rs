/// Movement rules: pure predicates over one stage of the tile grid.
///
/// These encode "what is legal" without performing the action.
///
/// ## Probe semantics
///
/// | Probe                       | Out of range result |
/// |-----------------------------|---------------------|
/// | `tile_at(x, y)`             | `None`              |
/// | `floor_below(x, y)`         | `Wall` (grid bottom is solid) |
/// | `is_blocked(x, y)`          | `true`              |
///
/// ## Player truth table
///
/// | Action     | Allowed when                                        |
/// |------------|-----------------------------------------------------|
/// | Left/Right | destination in bounds and not solid                 |
/// | Up         | standing on a ladder                                |
/// | Down       | on a ladder and the tile below is not solid         |
/// | Jump       | not airborne, and solid floor below or on a ladder  |
/// | Start fall | not airborne and the floor below is open air        |
/// | Drop-through | input Down, ladder two rows below, non-ladder one row below |

use super::tile::Tile;

/// Immutable view of a single stage for rule queries.
#[derive(Clone, Copy)]
pub struct StageView<'a> {
    tiles: &'a [Tile],
    pub width: usize,
    pub height: usize,
}

impl<'a> StageView<'a> {
    /// `tiles` must hold exactly `width * height` cells in row-major order.
    pub fn new(tiles: &'a [Tile], width: usize, height: usize) -> Self {
        debug_assert_eq!(tiles.len(), width * height);
        StageView { tiles, width, height }
    }

    /// Bounds-checked lookup.
    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> Option<Tile> {
        if x < self.width && y < self.height {
            Some(self.tiles[y * self.width + x])
        } else {
            None
        }
    }

    /// Tile one row below, treating the row past the bottom as wall.
    #[inline]
    pub fn floor_below(&self, x: usize, y: usize) -> Tile {
        self.tile_at(x, y + 1).unwrap_or(Tile::Wall)
    }

    /// Solid or outside the grid.
    #[inline]
    pub fn is_blocked(&self, x: usize, y: usize) -> bool {
        self.tile_at(x, y).map_or(true, Tile::is_solid)
    }

    #[inline]
    pub fn is_ladder(&self, x: usize, y: usize) -> bool {
        self.tile_at(x, y).map_or(false, Tile::is_climbable)
    }
}

/// Shift a coordinate by `delta`, staying within `[0, limit)`.
#[inline]
pub fn offset(v: usize, delta: i32, limit: usize) -> Option<usize> {
    let n = v as i64 + delta as i64;
    if n >= 0 && (n as usize) < limit {
        Some(n as usize)
    } else {
        None
    }
}

/// Horizontal destination for a left/right step, if the move is legal.
pub fn horizontal_target(view: &StageView, x: usize, y: usize, dx: i32) -> Option<usize> {
    let nx = offset(x, dx, view.width)?;
    if view.is_blocked(nx, y) { None } else { Some(nx) }
}

/// Can the player start a jump from (x, y)?
pub fn can_jump(view: &StageView, x: usize, y: usize, is_jumping: bool, on_ladder: bool) -> bool {
    !is_jumping && (view.floor_below(x, y).is_solid() || on_ladder)
}

/// Does a grounded player at (x, y) start falling?
pub fn starts_falling(view: &StageView, x: usize, y: usize) -> bool {
    view.floor_below(x, y).is_open_air()
}

/// Row the player lands on when dropping through to a ladder two rows
/// below, skipping the non-ladder row in between.
pub fn ladder_drop_target(view: &StageView, x: usize, y: usize) -> Option<usize> {
    let target = y + 2;
    if target < view.height && view.is_ladder(x, target) && !view.is_ladder(x, y + 1) {
        Some(target)
    } else {
        None
    }
}

/// Row reached by climbing up from (x, y) while on a ladder.
///
/// A solid tile directly above is passable if the tile above *it* is open:
/// the player pops onto the top of the obstruction.
pub fn climb_up_target(view: &StageView, x: usize, y: usize) -> Option<usize> {
    let up = y.checked_sub(1)?;
    if !view.is_blocked(x, up) {
        return Some(up);
    }
    let over = up.checked_sub(1)?;
    if view.is_blocked(x, over) { None } else { Some(over) }
}

/// Row reached by climbing down from (x, y) while on a ladder.
pub fn climb_down_target(view: &StageView, x: usize, y: usize) -> Option<usize> {
    let down = y + 1;
    if down < view.height && !view.is_blocked(x, down) {
        Some(down)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiles_from(rows: &[&str]) -> (Vec<Tile>, usize, usize) {
        let h = rows.len();
        let w = rows[0].len();
        let tiles = rows.iter().flat_map(|r| r.chars().map(Tile::from_char)).collect();
        (tiles, w, h)
    }

    #[test]
    fn lookup_is_bounds_checked() {
        let (t, w, h) = tiles_from(&["#H", " E"]);
        let v = StageView::new(&t, w, h);
        assert_eq!(v.tile_at(1, 0), Some(Tile::Ladder));
        assert_eq!(v.tile_at(2, 0), None);
        assert_eq!(v.tile_at(0, 2), None);
        assert!(v.is_blocked(5, 5));
    }

    #[test]
    fn floor_past_bottom_is_wall() {
        let (t, w, h) = tiles_from(&[" ", " "]);
        let v = StageView::new(&t, w, h);
        assert_eq!(v.floor_below(0, 0), Tile::Empty);
        assert_eq!(v.floor_below(0, 1), Tile::Wall);
    }

    #[test]
    fn horizontal_rejects_walls_and_edges() {
        let (t, w, h) = tiles_from(&[" #  "]);
        let v = StageView::new(&t, w, h);
        assert_eq!(horizontal_target(&v, 0, 0, 1), None);
        assert_eq!(horizontal_target(&v, 0, 0, -1), None);
        assert_eq!(horizontal_target(&v, 2, 0, 1), Some(3));
        assert_eq!(horizontal_target(&v, 3, 0, 1), None);
    }

    #[test]
    fn jump_needs_floor_or_ladder() {
        let (t, w, h) = tiles_from(&["  ", " #"]);
        let v = StageView::new(&t, w, h);
        assert!(!can_jump(&v, 0, 0, false, false));
        assert!(can_jump(&v, 0, 0, false, true));
        assert!(can_jump(&v, 1, 0, false, false));
        assert!(!can_jump(&v, 1, 0, true, false));
    }

    #[test]
    fn falling_ignores_ladders_below() {
        let (t, w, h) = tiles_from(&["   ", " H#"]);
        let v = StageView::new(&t, w, h);
        assert!(starts_falling(&v, 0, 0));
        assert!(!starts_falling(&v, 1, 0));
        assert!(!starts_falling(&v, 2, 0));
        assert!(!starts_falling(&v, 0, 1));
    }

    #[test]
    fn drop_through_floor_onto_ladder() {
        let (t, w, h) = tiles_from(&[" ", "#", "H"]);
        let v = StageView::new(&t, w, h);
        assert_eq!(ladder_drop_target(&v, 0, 0), Some(2));
        assert_eq!(ladder_drop_target(&v, 0, 1), None);
    }

    #[test]
    fn no_drop_when_ladder_is_continuous() {
        let (t, w, h) = tiles_from(&["H", "H", "H"]);
        let v = StageView::new(&t, w, h);
        assert_eq!(ladder_drop_target(&v, 0, 0), None);
    }

    #[test]
    fn climb_up_pops_over_capped_ladder() {
        let (t, w, h) = tiles_from(&[" ", "#", "H"]);
        let v = StageView::new(&t, w, h);
        assert_eq!(climb_up_target(&v, 0, 2), Some(0));
    }

    #[test]
    fn climb_up_blocked_by_double_wall() {
        let (t, w, h) = tiles_from(&["#", "#", "H"]);
        let v = StageView::new(&t, w, h);
        assert_eq!(climb_up_target(&v, 0, 2), None);
        assert_eq!(climb_up_target(&v, 0, 0), None);
    }

    #[test]
    fn climb_down_stops_at_wall() {
        let (t, w, h) = tiles_from(&["H", "H", "#"]);
        let v = StageView::new(&t, w, h);
        assert_eq!(climb_down_target(&v, 0, 0), Some(1));
        assert_eq!(climb_down_target(&v, 0, 1), None);
    }

    #[test]
    fn offset_stays_in_range() {
        assert_eq!(offset(0, -1, 5), None);
        assert_eq!(offset(4, 1, 5), None);
        assert_eq!(offset(2, -2, 5), Some(0));
    }
}
