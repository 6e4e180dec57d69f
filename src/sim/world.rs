/// WorldState: the complete state of a running game.
///
/// One explicit aggregate owns everything the simulation touches:
///   - `map`    : the Map Store (tile grid, exclusively owned)
///   - entities : player, enemies, coins; rebuilt on every stage entry
///   - run state: stage index, score, remaining lives, phase
///
/// Nothing is global; every component receives `&mut WorldState`.

use rand::rngs::StdRng;

use crate::domain::entity::{Coin, Enemy, Player};
use crate::domain::rules::StageView;
use crate::domain::tile::Tile;
use super::map::TileMap;

/// Lives at the start of a run.
pub const STARTING_LIVES: u32 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    GameOver,
    Complete,
}

pub struct WorldState {
    // ── Map Store ──
    pub map: TileMap,

    // ── Entities (current stage only) ──
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub coins: Vec<Coin>,

    // ── Run state ──
    pub stage: usize,
    pub score: u32,
    pub life: u32,
    pub phase: Phase,
    pub tick: u64,

    /// Source of enemy spawn directions.
    pub rng: StdRng,
}

impl WorldState {
    /// Fresh run over a loaded map. Entities are empty until the
    /// stage initializer runs.
    pub fn new(map: TileMap, rng: StdRng) -> Self {
        WorldState {
            map,
            player: Player::new(0, 0),
            enemies: Vec::new(),
            coins: Vec::new(),
            stage: 0,
            score: 0,
            life: STARTING_LIVES,
            phase: Phase::Playing,
            tick: 0,
            rng,
        }
    }

    pub fn width(&self) -> usize {
        self.map.width()
    }

    pub fn height(&self) -> usize {
        self.map.height()
    }

    pub fn stage_count(&self) -> usize {
        self.map.stage_count()
    }

    /// Read-only view of the current stage.
    pub fn view(&self) -> StageView<'_> {
        self.map.stage(self.stage)
    }

    /// Tile of the current stage at (x, y); outside reads as wall.
    #[inline]
    pub fn tile_at(&self, x: usize, y: usize) -> Tile {
        self.map.tile_at(self.stage, x, y)
    }

    /// Character grid for the presentation sink: terrain with coins,
    /// enemies and the player overlaid as `C`, `X`, `P` (in that order).
    pub fn frame(&self) -> Frame {
        let (w, h) = (self.width(), self.height());
        let mut grid: Vec<Vec<char>> = (0..h)
            .map(|y| (0..w).map(|x| self.tile_at(x, y).glyph()).collect())
            .collect();

        let mut put = |x: usize, y: usize, ch: char| {
            if let Some(cell) = grid.get_mut(y).and_then(|row| row.get_mut(x)) {
                *cell = ch;
            }
        };
        for c in self.coins.iter().filter(|c| !c.collected) {
            put(c.x, c.y, 'C');
        }
        for e in &self.enemies {
            put(e.x, e.y, 'X');
        }
        put(self.player.x, self.player.y, 'P');

        Frame {
            rows: grid.into_iter().map(|r| r.into_iter().collect()).collect(),
            stage: self.stage,
            stage_count: self.stage_count(),
            score: self.score,
            life: self.life,
        }
    }
}

/// Snapshot handed to the presentation sink once per tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub rows: Vec<String>,
    pub stage: usize,
    pub stage_count: usize,
    pub score: u32,
    pub life: u32,
}

// ══════════════════════════════════════════════════════════════
// Test fixtures
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
pub mod fixtures {
    use rand::SeedableRng;

    use super::*;
    use crate::sim::level::{self, Limits};

    /// Build a world from inline map text and enter stage 0.
    pub fn world_from(text: &str) -> WorldState {
        let parsed = level::parse_map(text, &Limits::default())
            .expect("fixture map should parse");
        let mut world = WorldState::new(parsed.map, StdRng::seed_from_u64(7));
        level::init_stage(&mut world);
        world
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::world_from;
    use super::*;
    use crate::domain::entity::Direction;

    #[test]
    fn frame_overlays_entities() {
        let world = world_from("#####\n#SXC#\n#####");
        let f = world.frame();
        assert_eq!(f.rows, vec!["#####", "#PXC#", "#####"]);
        assert_eq!(f.life, STARTING_LIVES);
        assert_eq!(f.stage_count, 1);
    }

    #[test]
    fn collected_coins_are_hidden() {
        let mut world = world_from("#####\n#S C#\n#####");
        world.coins[0].collected = true;
        assert_eq!(world.frame().rows[1], "#P  #");
    }

    #[test]
    fn player_drawn_over_enemy() {
        let mut world = world_from("####\n#S #\n####");
        world.enemies.push(Enemy::new(1, 1, Direction::Left));
        assert_eq!(world.frame().rows[1], "#P #");
    }
}
