/// Map Store: the 3D tile grid (stage × row × column) of one loaded map.
///
/// ## Layout
///
/// One contiguous `Vec<Tile>` indexed by `(stage * rows + y) * cols + x`.
/// Dimensions are fixed at construction; there is no resize API.
///
/// ## Two layers
///
///   - `pristine`: the grid as loaded. **Never mutated.**
///   - `tiles`   : the live grid. Coin pickups rewrite cells to empty.
///
/// `reset()` copies `pristine` back over `tiles` for a fresh run.

use crate::domain::rules::StageView;
use crate::domain::tile::Tile;

#[derive(Clone, Debug)]
pub struct TileMap {
    stages: usize,
    cols: usize,
    rows: usize,
    tiles: Vec<Tile>,
    pristine: Vec<Tile>,
}

impl TileMap {
    /// Build from per-stage row lists. Rows are padded with `Tile::Empty`
    /// (or truncated) to `cols`; stages are padded (or truncated) to `rows`.
    pub fn from_stages(stages: &[Vec<Vec<Tile>>], cols: usize, rows: usize) -> Self {
        let count = stages.len().max(1);
        let mut tiles = vec![Tile::Empty; count * rows * cols];
        for (s, stage) in stages.iter().enumerate() {
            for (y, row) in stage.iter().take(rows).enumerate() {
                let base = (s * rows + y) * cols;
                for (x, &tile) in row.iter().take(cols).enumerate() {
                    tiles[base + x] = tile;
                }
            }
        }
        TileMap {
            stages: count,
            cols,
            rows,
            pristine: tiles.clone(),
            tiles,
        }
    }

    pub fn stage_count(&self) -> usize {
        self.stages
    }

    pub fn width(&self) -> usize {
        self.cols
    }

    pub fn height(&self) -> usize {
        self.rows
    }

    #[inline]
    fn index(&self, stage: usize, x: usize, y: usize) -> Option<usize> {
        if stage < self.stages && x < self.cols && y < self.rows {
            Some((stage * self.rows + y) * self.cols + x)
        } else {
            None
        }
    }

    /// Bounds-checked lookup.
    #[inline]
    pub fn get(&self, stage: usize, x: usize, y: usize) -> Option<Tile> {
        self.index(stage, x, y).map(|i| self.tiles[i])
    }

    /// Lookup with everything outside the grid reading as wall.
    #[inline]
    pub fn tile_at(&self, stage: usize, x: usize, y: usize) -> Tile {
        self.get(stage, x, y).unwrap_or(Tile::Wall)
    }

    /// Rewrite a cell to empty (coin pickup). Out of range is a no-op.
    #[inline]
    pub fn clear_tile(&mut self, stage: usize, x: usize, y: usize) {
        if let Some(i) = self.index(stage, x, y) {
            self.tiles[i] = Tile::Empty;
        }
    }

    /// Restore every cell to its loaded value.
    pub fn reset(&mut self) {
        self.tiles.copy_from_slice(&self.pristine);
    }

    /// Read-only view of one stage for rule queries.
    /// An out-of-range stage yields an empty view where every probe is blocked.
    pub fn stage(&self, stage: usize) -> StageView<'_> {
        if stage >= self.stages {
            return StageView::new(&[], 0, 0);
        }
        let len = self.rows * self.cols;
        let start = stage * len;
        StageView::new(&self.tiles[start..start + len], self.cols, self.rows)
    }
}
