/// Enemy patrol: sweep horizontally one tile per frame, bounce at obstacles.
///
/// An enemy turns around instead of moving when the next column is
///   - outside the grid,
///   - solid, or
///   - overhanging a plain empty tile (ledge edge).
///
/// The ledge probe compares against `Tile::Empty` only, so ladders, coins,
/// spawn markers and exits below the destination all count as footing.
/// Enemies on the bottom row never see a ledge.

use super::entity::Enemy;
use super::rules::{offset, StageView};
use super::tile::Tile;

/// Where the enemy goes next: a new column, or stay and turn around.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PatrolMove {
    Advance(usize),
    Turn,
}

pub fn patrol_move(view: &StageView, enemy: &Enemy) -> PatrolMove {
    let nx = match offset(enemy.x, enemy.dir.delta(), view.width) {
        Some(nx) => nx,
        None => return PatrolMove::Turn,
    };
    if view.is_blocked(nx, enemy.y) {
        return PatrolMove::Turn;
    }
    if view.tile_at(nx, enemy.y + 1) == Some(Tile::Empty) {
        return PatrolMove::Turn;
    }
    PatrolMove::Advance(nx)
}

/// Advance one enemy by one frame.
pub fn patrol(view: &StageView, enemy: &mut Enemy) {
    match patrol_move(view, enemy) {
        PatrolMove::Advance(nx) => enemy.x = nx,
        PatrolMove::Turn => enemy.dir = enemy.dir.reversed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Direction;
    use proptest::prelude::*;

    fn tiles_from(rows: &[&str]) -> (Vec<Tile>, usize, usize) {
        let h = rows.len();
        let w = rows[0].len();
        let tiles = rows.iter().flat_map(|r| r.chars().map(Tile::from_char)).collect();
        (tiles, w, h)
    }

    #[test]
    fn walks_along_floor() {
        let (t, w, h) = tiles_from(&["    ", "####"]);
        let v = StageView::new(&t, w, h);
        let mut e = Enemy::new(1, 0, Direction::Right);
        patrol(&v, &mut e);
        assert_eq!((e.x, e.dir), (2, Direction::Right));
    }

    #[test]
    fn turns_at_wall() {
        let (t, w, h) = tiles_from(&["  # ", "####"]);
        let v = StageView::new(&t, w, h);
        let mut e = Enemy::new(1, 0, Direction::Right);
        patrol(&v, &mut e);
        assert_eq!((e.x, e.dir), (1, Direction::Left));
    }

    #[test]
    fn turns_at_grid_edge() {
        let (t, w, h) = tiles_from(&["  ", "##"]);
        let v = StageView::new(&t, w, h);
        let mut e = Enemy::new(0, 0, Direction::Left);
        patrol(&v, &mut e);
        assert_eq!((e.x, e.dir), (0, Direction::Right));
    }

    #[test]
    fn turns_at_ledge() {
        let (t, w, h) = tiles_from(&["    ", "## #"]);
        let v = StageView::new(&t, w, h);
        let mut e = Enemy::new(1, 0, Direction::Right);
        patrol(&v, &mut e);
        assert_eq!((e.x, e.dir), (1, Direction::Left));
    }

    #[test]
    fn ladder_below_counts_as_footing() {
        let (t, w, h) = tiles_from(&["    ", "##H#"]);
        let v = StageView::new(&t, w, h);
        let mut e = Enemy::new(1, 0, Direction::Right);
        patrol(&v, &mut e);
        assert_eq!(e.x, 2);
    }

    #[test]
    fn bottom_row_has_no_ledges() {
        let (t, w, h) = tiles_from(&["    "]);
        let v = StageView::new(&t, w, h);
        let mut e = Enemy::new(1, 0, Direction::Right);
        patrol(&v, &mut e);
        assert_eq!(e.x, 2);
    }

    proptest! {
        #[test]
        fn patrol_never_leaves_grid(
            cells in proptest::collection::vec(prop_oneof![Just(' '), Just('#'), Just('H')], 24),
            x in 0usize..6,
            y in 0usize..4,
            right in any::<bool>(),
            frames in 1usize..20,
        ) {
            let tiles: Vec<Tile> = cells.into_iter().map(Tile::from_char).collect();
            let v = StageView::new(&tiles, 6, 4);
            let dir = if right { Direction::Right } else { Direction::Left };
            let mut e = Enemy::new(x, y, dir);
            for _ in 0..frames {
                patrol(&v, &mut e);
                prop_assert!(e.x < 6);
                prop_assert_eq!(e.y, y);
            }
        }
    }
}
