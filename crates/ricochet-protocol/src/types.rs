use serde::{Deserialize, Serialize};

use crate::PlayerId;

/// Side length of the assembled board.
pub const BOARD_SIZE: u8 = 16;

/// Robot colors. Exactly one robot of each color exists in a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotColor {
    Red,
    Blue,
    Green,
    Yellow,
}

impl RobotColor {
    pub const ALL: [RobotColor; 4] = [
        RobotColor::Red,
        RobotColor::Blue,
        RobotColor::Green,
        RobotColor::Yellow,
    ];

    /// Single-letter code used by the tile catalog.
    pub const fn letter(self) -> char {
        match self {
            RobotColor::Red => 'R',
            RobotColor::Blue => 'B',
            RobotColor::Green => 'G',
            RobotColor::Yellow => 'Y',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.letter() == letter)
    }
}

/// Target marker shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    Triangle,
    Square,
    Hexagon,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Circle, Shape::Triangle, Shape::Square, Shape::Hexagon];

    /// Single-letter code used by the tile catalog (`Q` for square).
    pub const fn letter(self) -> char {
        match self {
            Shape::Circle => 'C',
            Shape::Triangle => 'T',
            Shape::Square => 'Q',
            Shape::Hexagon => 'H',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.letter() == letter)
    }
}

/// Sliding direction requested for a robot. `Up` decreases `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit step as `(dx, dy)`.
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// The wall on the cell being entered that stops a robot travelling this way.
    pub const fn entry_wall(self) -> Wall {
        match self {
            Direction::Up => Wall::South,
            Direction::Down => Wall::North,
            Direction::Left => Wall::East,
            Direction::Right => Wall::West,
        }
    }
}

/// One edge of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Wall {
    North,
    East,
    South,
    West,
}

impl Wall {
    pub const ALL: [Wall; 4] = [Wall::North, Wall::East, Wall::South, Wall::West];

    const fn bit(self) -> u8 {
        match self {
            Wall::North => 0b0001,
            Wall::East => 0b0010,
            Wall::South => 0b0100,
            Wall::West => 0b1000,
        }
    }

    /// The edge this one becomes after a quarter turn clockwise.
    pub const fn rotate_cw(self) -> Wall {
        match self {
            Wall::North => Wall::East,
            Wall::East => Wall::South,
            Wall::South => Wall::West,
            Wall::West => Wall::North,
        }
    }

    pub const fn letter(self) -> char {
        match self {
            Wall::North => 'N',
            Wall::East => 'E',
            Wall::South => 'S',
            Wall::West => 'W',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.letter() == letter)
    }
}

/// Set of walls on a cell, stored as a bitmask so equality never depends on insertion order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WallSet(u8);

impl WallSet {
    pub const EMPTY: WallSet = WallSet(0);

    pub fn from_walls(walls: impl IntoIterator<Item = Wall>) -> Self {
        let mut set = Self::EMPTY;
        for wall in walls {
            set.insert(wall);
        }
        set
    }

    pub fn insert(&mut self, wall: Wall) {
        self.0 |= wall.bit();
    }

    pub const fn contains(self, wall: Wall) -> bool {
        self.0 & wall.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Walls in canonical N, E, S, W order.
    pub fn iter(self) -> impl Iterator<Item = Wall> {
        Wall::ALL.into_iter().filter(move |w| self.contains(*w))
    }

    pub fn rotate_cw(self) -> Self {
        Self::from_walls(self.iter().map(Wall::rotate_cw))
    }
}

impl std::fmt::Display for WallSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for wall in self.iter() {
            write!(f, "{}", wall.letter())?;
        }
        Ok(())
    }
}

/// Board coordinates; `(0, 0)` is the top-left cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

impl Position {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// The neighbouring position one step in `direction`, if it is still on the board.
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        (x < BOARD_SIZE && y < BOARD_SIZE).then_some(Position { x, y })
    }
}

/// Color/shape pair printed on a target cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Target {
    pub color: RobotColor,
    pub shape: Shape,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Robot {
    pub color: RobotColor,
    pub position: Position,
}

/// The target the current round asks a robot to reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Goal {
    pub color: RobotColor,
    pub shape: Shape,
    pub position: Position,
}

impl Goal {
    pub const fn target(&self) -> Target {
        Target {
            color: self.color,
            shape: self.shape,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub player: PlayerId,
    pub value: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub color: RobotColor,
    pub direction: Direction,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
}

/// Coarse session phase as seen by clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PhaseKind {
    Lobby,
    Bidding,
    Proving,
    RoundSettling,
    GameOver,
}
