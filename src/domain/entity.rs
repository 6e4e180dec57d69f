/// Entities: Player, Enemy, Coin, plus the per-frame input symbol.
/// Entity state is rebuilt wholesale by the stage initializer; nothing
/// here carries identity across a stage reset.

/// Most enemies a single stage can hold. Extra `X` tiles are ignored.
pub const MAX_ENEMIES: usize = 15;
/// Most coins a single stage can hold. Extra `C` tiles are ignored.
pub const MAX_COINS: usize = 30;

/// One input symbol per frame, as delivered by the input provider.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Input {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Quit,
}

impl Input {
    /// Decode the canonical key characters (`a d w s`, space, `q`).
    pub fn from_char(ch: char) -> Option<Input> {
        match ch {
            'a' => Some(Input::Left),
            'd' => Some(Input::Right),
            'w' => Some(Input::Up),
            's' => Some(Input::Down),
            ' ' => Some(Input::Jump),
            'q' => Some(Input::Quit),
            _ => None,
        }
    }
}

/// Horizontal patrol direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    pub fn reversed(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Player {
    pub x: usize,
    pub y: usize,
    pub is_jumping: bool,
    /// Rows per frame; negative is upward. Kept within [-2, 2].
    pub velocity_y: i32,
    /// Recomputed every frame from the tile the player stands in.
    pub on_ladder: bool,
}

impl Player {
    pub fn new(x: usize, y: usize) -> Self {
        Player { x, y, ..Player::default() }
    }

    /// Drop any aerial state (landing, ladder grab, respawn).
    pub fn settle(&mut self) {
        self.is_jumping = false;
        self.velocity_y = 0;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enemy {
    pub x: usize,
    pub y: usize,
    pub dir: Direction,
}

impl Enemy {
    pub fn new(x: usize, y: usize, dir: Direction) -> Self {
        Enemy { x, y, dir }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coin {
    pub x: usize,
    pub y: usize,
    pub collected: bool,
}

impl Coin {
    pub fn new(x: usize, y: usize) -> Self {
        Coin { x, y, collected: false }
    }
}
