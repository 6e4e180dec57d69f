/// Map loader and stage initializer.
///
/// ## Map file format (`map.txt`):
///   ```
///   #########
///   #S   C E#
///   #########
///
///   #########
///   #S X  CE#
///   #########
///   ```
///
/// Stages are separated by one or more empty lines. Every stage is padded
/// with spaces to the widest line / tallest stage in the whole file.
///
/// ## Tile legend:
///   '#' = Wall          'H' = Ladder
///   'S' = Player spawn  'X' = Enemy spawn
///   'C' = Coin          'E' = Exit
///   ' ' = Empty         anything else = decoration (non-solid)
///
/// ## Two passes
///   1. Discover stage count, max width and max stage height; clamp the
///      dimensions to the configured limits.
///   2. Copy each stage's lines into the fixed-size grid.

use std::fmt;
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{debug, info, warn};

use crate::domain::entity::{Coin, Direction, Enemy, MAX_COINS, MAX_ENEMIES};
use crate::domain::tile::Tile;
use super::map::TileMap;
use super::world::WorldState;

/// Upper bounds on map dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub max_width: usize,
    pub max_height: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits { max_width: 256, max_height: 256 }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("cannot open map file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("map file contains no tiles")]
    Empty,
}

/// Non-fatal problems found while loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapWarning {
    WidthClamped { found: usize, limit: usize },
    HeightClamped { found: usize, limit: usize },
}

impl fmt::Display for MapWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapWarning::WidthClamped { found, limit } => {
                write!(f, "Warning: map width {found} exceeds the limit and was clamped to {limit}")
            }
            MapWarning::HeightClamped { found, limit } => {
                write!(f, "Warning: map height {found} exceeds the limit and was clamped to {limit}")
            }
        }
    }
}

/// Result of a successful load.
#[derive(Debug)]
pub struct ParsedMap {
    pub map: TileMap,
    pub warnings: Vec<MapWarning>,
}

// ══════════════════════════════════════════════════════════════
// Loading
// ══════════════════════════════════════════════════════════════

/// Read and parse a map file.
pub fn load_map(path: &Path, limits: &Limits) -> Result<ParsedMap, MapError> {
    let text = std::fs::read_to_string(path).map_err(|source| MapError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = parse_map(&text, limits)?;
    info!(
        path = %path.display(),
        stages = parsed.map.stage_count(),
        width = parsed.map.width(),
        height = parsed.map.height(),
        "map loaded"
    );
    for w in &parsed.warnings {
        warn!("{w}");
    }
    Ok(parsed)
}

/// Parse map text. See module docs for the format.
pub fn parse_map(text: &str, limits: &Limits) -> Result<ParsedMap, MapError> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();

    // ── Pass 1: dimensions ──
    let mut stage_count = 0usize;
    let mut max_width = 0usize;
    let mut max_height = 0usize;
    let mut current_height = 0usize;

    for line in &lines {
        if line.is_empty() {
            if current_height > 0 {
                stage_count += 1;
                max_height = max_height.max(current_height);
                current_height = 0;
            }
            continue;
        }
        max_width = max_width.max(line.chars().count());
        current_height += 1;
    }
    if current_height > 0 {
        stage_count += 1;
        max_height = max_height.max(current_height);
    }

    if max_width == 0 || max_height == 0 {
        return Err(MapError::Empty);
    }

    let mut warnings = Vec::new();
    if max_width > limits.max_width {
        warnings.push(MapWarning::WidthClamped { found: max_width, limit: limits.max_width });
        max_width = limits.max_width;
    }
    if max_height > limits.max_height {
        warnings.push(MapWarning::HeightClamped { found: max_height, limit: limits.max_height });
        max_height = limits.max_height;
    }
    if max_width == 0 || max_height == 0 {
        return Err(MapError::Empty);
    }

    // ── Pass 2: copy stages ──
    let mut stages: Vec<Vec<Vec<Tile>>> = Vec::with_capacity(stage_count);
    let mut current: Vec<Vec<Tile>> = Vec::new();

    for line in &lines {
        if line.is_empty() {
            if !current.is_empty() {
                stages.push(std::mem::take(&mut current));
            }
            continue;
        }
        // Rows past the height clamp still belong to this stage; drop them.
        if current.len() < max_height {
            current.push(line.chars().take(max_width).map(Tile::from_char).collect());
        }
    }
    if !current.is_empty() {
        stages.push(current);
    }

    Ok(ParsedMap {
        map: TileMap::from_stages(&stages, max_width, max_height),
        warnings,
    })
}

// ══════════════════════════════════════════════════════════════
// Stage initializer
// ══════════════════════════════════════════════════════════════

/// (Re)derive player, enemies and coins for the current stage.
///
/// Single row-major scan of the live grid:
///   - `S` sets the player spawn (the last one scanned wins)
///   - `X` adds an enemy facing a random direction (beyond capacity: dropped)
///   - `C` adds a coin (beyond capacity: dropped)
///
/// Cells emptied by earlier coin pickups yield nothing. A stage without
/// `S` keeps the player's previous coordinates.
pub fn init_stage(world: &mut WorldState) {
    world.enemies.clear();
    world.coins.clear();
    world.player.settle();
    world.player.on_ladder = false;

    let stage = world.stage;
    let (w, h) = (world.width(), world.height());
    let mut spawn = None;
    let mut dropped_enemies = 0usize;
    let mut dropped_coins = 0usize;

    for y in 0..h {
        for x in 0..w {
            match world.map.tile_at(stage, x, y) {
                Tile::Start => spawn = Some((x, y)),
                Tile::EnemySpawn => {
                    if world.enemies.len() < MAX_ENEMIES {
                        let dir = if world.rng.gen_bool(0.5) {
                            Direction::Right
                        } else {
                            Direction::Left
                        };
                        world.enemies.push(Enemy::new(x, y, dir));
                    } else {
                        dropped_enemies += 1;
                    }
                }
                Tile::Coin => {
                    if world.coins.len() < MAX_COINS {
                        world.coins.push(Coin::new(x, y));
                    } else {
                        dropped_coins += 1;
                    }
                }
                _ => {}
            }
        }
    }

    match spawn {
        Some((x, y)) => {
            world.player.x = x;
            world.player.y = y;
        }
        None => warn!(stage = stage + 1, "stage has no start tile"),
    }
    if dropped_enemies > 0 || dropped_coins > 0 {
        debug!(stage = stage + 1, dropped_enemies, dropped_coins, "entities over capacity ignored");
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::sim::world::fixtures::world_from;

    #[test]
    fn stages_split_on_blank_lines() {
        let p = parse_map("###\n#S#\n\n\n#####\n#SE #\n", &Limits::default()).unwrap();
        assert_eq!(p.map.stage_count(), 2);
        assert_eq!(p.map.width(), 5);
        assert_eq!(p.map.height(), 2);
        assert!(p.warnings.is_empty());
    }

    #[test]
    fn trailing_and_leading_blanks_add_no_stage() {
        let p = parse_map("\n\n#S#\n\n\n", &Limits::default()).unwrap();
        assert_eq!(p.map.stage_count(), 1);
        assert_eq!(p.map.height(), 1);
    }

    #[test]
    fn crlf_line_endings() {
        let p = parse_map("#S#\r\n###\r\n\r\n#E#\r\n", &Limits::default()).unwrap();
        assert_eq!(p.map.stage_count(), 2);
        assert_eq!(p.map.width(), 3);
        assert_eq!(p.map.tile_at(1, 1, 0), Tile::Exit);
    }

    #[test]
    fn short_stages_are_padded() {
        let p = parse_map("#\n\n###\n# #\n###", &Limits::default()).unwrap();
        assert_eq!((p.map.width(), p.map.height()), (3, 3));
        assert_eq!(p.map.get(0, 2, 2), Some(Tile::Empty));
        assert_eq!(p.map.get(0, 0, 0), Some(Tile::Wall));
    }

    #[test]
    fn whitespace_line_is_tile_data() {
        let p = parse_map("#S#\n   \n###", &Limits::default()).unwrap();
        assert_eq!(p.map.stage_count(), 1);
        assert_eq!(p.map.height(), 3);
    }

    #[test]
    fn dimensions_are_clamped_with_warnings() {
        let limits = Limits { max_width: 4, max_height: 2 };
        let p = parse_map("######\n#S   #\n######", &limits).unwrap();
        assert_eq!((p.map.width(), p.map.height()), (4, 2));
        assert_eq!(
            p.warnings,
            vec![
                MapWarning::WidthClamped { found: 6, limit: 4 },
                MapWarning::HeightClamped { found: 3, limit: 2 },
            ]
        );
        assert_eq!(p.map.tile_at(0, 1, 1), Tile::Start);
    }

    #[test]
    fn clamped_rows_do_not_spill_into_next_stage() {
        let limits = Limits { max_width: 8, max_height: 1 };
        let p = parse_map("#S#\n###\n\n#E#", &limits).unwrap();
        assert_eq!(p.map.stage_count(), 2);
        assert_eq!(p.map.tile_at(1, 1, 0), Tile::Exit);
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(matches!(parse_map("\n\n", &Limits::default()), Err(MapError::Empty)));
        assert!(matches!(parse_map("", &Limits::default()), Err(MapError::Empty)));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = load_map(Path::new("/nonexistent/nuguri/map.txt"), &Limits::default())
            .unwrap_err();
        assert!(matches!(err, MapError::Open { .. }));
        assert!(err.to_string().contains("map.txt"));
    }

    #[test]
    fn load_from_disk() {
        let path = std::env::temp_dir().join(format!("nuguri-test-{}.txt", std::process::id()));
        {
            let mut f = std::fs::File::create(&path).unwrap();
            write!(f, "#####\n#S CE\n#####\n").unwrap();
        }
        let p = load_map(&path, &Limits::default()).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(p.map.stage_count(), 1);
        assert_eq!(p.map.tile_at(0, 3, 1), Tile::Coin);
    }

    #[test]
    fn init_places_entities() {
        let w = world_from("######\n#S XC#\n######");
        assert_eq!((w.player.x, w.player.y), (1, 1));
        assert_eq!(w.enemies.len(), 1);
        assert_eq!((w.enemies[0].x, w.enemies[0].y), (3, 1));
        assert_eq!(w.coins, vec![Coin::new(4, 1)]);
    }

    #[test]
    fn last_start_tile_wins() {
        let w = world_from("#####\n#S S#\n#####");
        assert_eq!((w.player.x, w.player.y), (3, 1));
    }

    #[test]
    fn capacities_drop_extras() {
        let row_x = format!("#{}#", "X".repeat(20));
        let row_c = format!("#{}#", "C".repeat(40));
        let text = format!("#S\n{row_x}\n{row_c}");
        let w = world_from(&text);
        assert_eq!(w.enemies.len(), MAX_ENEMIES);
        assert_eq!(w.coins.len(), MAX_COINS);
        assert_eq!(w.enemies.last().map(|e| e.x), Some(MAX_ENEMIES));
    }

    #[test]
    fn reinit_is_idempotent_modulo_direction() {
        let mut w = world_from("#######\n#S X C#\n#X C  #\n#######");
        let pos = |w: &WorldState| {
            (
                (w.player.x, w.player.y),
                w.enemies.iter().map(|e| (e.x, e.y)).collect::<Vec<_>>(),
                w.coins.clone(),
            )
        };
        let before = pos(&w);
        w.player.x = 4;
        w.player.is_jumping = true;
        w.player.velocity_y = 2;
        init_stage(&mut w);
        assert_eq!(pos(&w), before);
        assert!(!w.player.is_jumping);
        assert_eq!(w.player.velocity_y, 0);
    }

    #[test]
    fn emptied_coin_cells_stay_empty() {
        let mut w = world_from("######\n#S CC#\n######");
        w.map.clear_tile(0, 3, 1);
        init_stage(&mut w);
        assert_eq!(w.coins, vec![Coin::new(4, 1)]);
    }

    #[test]
    fn spawn_directions_follow_seed() {
        let text = format!("#S\n#{}#\n{}", "X".repeat(12), "#".repeat(14));
        let dirs = |seed: u64| {
            let p = parse_map(&text, &Limits::default()).unwrap();
            let mut w = WorldState::new(p.map, StdRng::seed_from_u64(seed));
            init_stage(&mut w);
            w.enemies.iter().map(|e| e.dir).collect::<Vec<_>>()
        };
        assert_eq!(dirs(1).len(), 12);
        assert_eq!(dirs(1), dirs(1));
    }
}
