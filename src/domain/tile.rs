/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty,        // Air (also the padding tile)
    Wall,         // Solid: floor, wall and ceiling
    Ladder,       // Climbable, non-solid
    Start,        // Player spawn marker
    EnemySpawn,   // Enemy spawn marker
    Coin,         // Coin spawn marker
    Exit,         // Stage exit
    Decor(char),  // Any other glyph: drawn as-is, behaves like air
}

impl Tile {
    /// Map a character from the map file to a tile.
    pub fn from_char(ch: char) -> Tile {
        match ch {
            ' ' => Tile::Empty,
            '#' => Tile::Wall,
            'H' => Tile::Ladder,
            'S' => Tile::Start,
            'X' => Tile::EnemySpawn,
            'C' => Tile::Coin,
            'E' => Tile::Exit,
            other => Tile::Decor(other),
        }
    }

    /// Character used when the tile is written back out.
    pub fn to_char(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Wall => '#',
            Tile::Ladder => 'H',
            Tile::Start => 'S',
            Tile::EnemySpawn => 'X',
            Tile::Coin => 'C',
            Tile::Exit => 'E',
            Tile::Decor(ch) => ch,
        }
    }

    /// Glyph drawn for the bare terrain. Spawn markers are invisible;
    /// live entities are overlaid on top by the world snapshot.
    pub fn glyph(self) -> char {
        match self {
            Tile::Start | Tile::EnemySpawn | Tile::Coin => ' ',
            other => other.to_char(),
        }
    }

    /// Does this tile block movement?
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Wall)
    }

    /// Can the player climb (move up/down) on this tile?
    pub fn is_climbable(self) -> bool {
        matches!(self, Tile::Ladder)
    }

    /// Is this the stage exit?
    pub fn is_exit(self) -> bool {
        matches!(self, Tile::Exit)
    }

    /// Does a falling player keep falling through this tile?
    pub fn is_open_air(self) -> bool {
        !self.is_solid() && !self.is_climbable()
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_mapping_covers_all_symbols() {
        for ch in [' ', '#', 'H', 'S', 'X', 'C', 'E', '~'] {
            assert_eq!(Tile::from_char(ch).to_char(), ch);
        }
        assert_eq!(Tile::from_char('~'), Tile::Decor('~'));
    }

    #[test]
    fn only_wall_is_solid() {
        assert!(Tile::Wall.is_solid());
        assert!(!Tile::Ladder.is_solid());
        assert!(!Tile::Coin.is_solid());
        assert!(!Tile::Decor('.').is_solid());
    }

    #[test]
    fn ladder_is_not_open_air() {
        assert!(!Tile::Ladder.is_open_air());
        assert!(!Tile::Wall.is_open_air());
        assert!(Tile::Empty.is_open_air());
        assert!(Tile::Exit.is_open_air());
    }

    #[test]
    fn spawn_markers_render_blank() {
        assert_eq!(Tile::Start.glyph(), ' ');
        assert_eq!(Tile::EnemySpawn.glyph(), ' ');
        assert_eq!(Tile::Coin.glyph(), ' ');
        assert_eq!(Tile::Exit.glyph(), 'E');
    }
}
