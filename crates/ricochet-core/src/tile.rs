//! Board cells and the 8x8 tiles they are assembled from.

use ricochet_protocol::{CellSnapshot, RobotColor, Shape, Target, Wall, WallSet};

/// Side length of one tile; a board is two tiles wide and two tiles tall.
pub const TILE_SIZE: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Open {
        walls: WallSet,
        target: Option<Target>,
    },
    /// Never enterable; wall semantics do not apply.
    Blocked,
}

impl Cell {
    pub const EMPTY: Cell = Cell::Open {
        walls: WallSet::EMPTY,
        target: None,
    };

    pub fn walls(&self) -> WallSet {
        match self {
            Cell::Open { walls, .. } => *walls,
            Cell::Blocked => WallSet::EMPTY,
        }
    }

    pub fn target(&self) -> Option<Target> {
        match self {
            Cell::Open { target, .. } => *target,
            Cell::Blocked => None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Cell::Blocked)
    }

    pub fn rotate_cw(self) -> Cell {
        match self {
            Cell::Open { walls, target } => Cell::Open {
                walls: walls.rotate_cw(),
                target,
            },
            Cell::Blocked => Cell::Blocked,
        }
    }

    pub fn snapshot(&self) -> CellSnapshot {
        CellSnapshot {
            walls: self.walls(),
            target: self.target(),
            blocked: self.is_blocked(),
        }
    }

    /// Parse a catalog token such as `X`, `NW` or `SEYH`.
    pub fn parse(token: &str) -> Option<Cell> {
        let token = token.trim();
        if token == "X" {
            return Some(Cell::EMPTY);
        }
        if token.is_empty() {
            return None;
        }

        let mut walls = WallSet::EMPTY;
        let mut chars = token.chars().peekable();
        while let Some(wall) = chars.peek().and_then(|c| Wall::from_letter(*c)) {
            walls.insert(wall);
            chars.next();
        }

        let rest: Vec<char> = chars.collect();
        let target = match rest.as_slice() {
            [] => None,
            [color, shape] => Some(Target {
                color: RobotColor::from_letter(*color)?,
                shape: Shape::from_letter(*shape)?,
            }),
            _ => return None,
        };

        Some(Cell::Open { walls, target })
    }
}

/// One 8x8 quarter of a board, stored in its top-left orientation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub name: String,
    cells: [[Cell; TILE_SIZE]; TILE_SIZE],
}

impl Tile {
    pub fn new(name: impl Into<String>, cells: [[Cell; TILE_SIZE]; TILE_SIZE]) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    /// Cell at column `x`, row `y`.
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.cells[y][x]
    }

    /// Quarter turn clockwise: new row `i` is old column `i` read bottom to top, and every wall
    /// turns with the tile.
    pub fn rotate_cw(&self) -> Tile {
        let mut cells = [[Cell::EMPTY; TILE_SIZE]; TILE_SIZE];
        for (i, row) in cells.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = self.cells[TILE_SIZE - 1 - j][i].rotate_cw();
            }
        }
        Tile {
            name: self.name.clone(),
            cells,
        }
    }

    pub fn rotated(&self, quarter_turns: usize) -> Tile {
        let mut tile = self.clone();
        for _ in 0..quarter_turns % 4 {
            tile = tile.rotate_cw();
        }
        tile
    }

    pub fn targets(&self) -> impl Iterator<Item = Target> + '_ {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter_map(|cell| cell.target())
    }
}
