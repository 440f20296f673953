//! Board assembly from four rotated tiles.

use ricochet_protocol::{BoardSnapshot, Goal, Position, BOARD_SIZE};

use crate::catalog::TileCatalog;
use crate::rng::GameRng;
use crate::tile::{Cell, Tile, TILE_SIZE};

const SIZE: usize = BOARD_SIZE as usize;

/// Clockwise quarter turns applied to the tile in each quadrant, in
/// top-left, top-right, bottom-left, bottom-right order.
pub const QUADRANT_ROTATIONS: [usize; 4] = [0, 1, 3, 2];

/// The 2x2 block in the middle of the board that robots can never enter.
pub const CENTER: [Position; 4] = [
    Position::new(7, 7),
    Position::new(8, 7),
    Position::new(7, 8),
    Position::new(8, 8),
];

/// Immutable 16x16 grid of cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; SIZE]; SIZE],
}

impl Board {
    /// Assemble a board from tiles already in their final orientation, in quadrant order.
    /// The center block is forced to `Blocked` whatever the tiles hold there.
    pub fn from_quadrants(quadrants: [&Tile; 4]) -> Self {
        let mut cells = [[Cell::EMPTY; SIZE]; SIZE];
        for (y, row) in cells.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                let quadrant = (y / TILE_SIZE) * 2 + x / TILE_SIZE;
                *cell = quadrants[quadrant].cell(x % TILE_SIZE, y % TILE_SIZE);
            }
        }
        for pos in CENTER {
            cells[usize::from(pos.y)][usize::from(pos.x)] = Cell::Blocked;
        }
        Self { cells }
    }

    /// Board with no walls or targets, only the blocked center.
    pub fn open() -> Self {
        let blank = Tile::new("blank", [[Cell::EMPTY; TILE_SIZE]; TILE_SIZE]);
        Self::from_quadrants([&blank; 4])
    }

    /// Replace a single cell. Meant for building fixtures; boards in play are never edited.
    pub fn with_cell(mut self, pos: Position, cell: Cell) -> Self {
        self.cells[usize::from(pos.y)][usize::from(pos.x)] = cell;
        self
    }

    pub fn cell(&self, pos: Position) -> Cell {
        self.cells[usize::from(pos.y)][usize::from(pos.x)]
    }

    pub fn is_blocked(&self, pos: Position) -> bool {
        self.cell(pos).is_blocked()
    }

    pub fn positions() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE).flat_map(|y| (0..BOARD_SIZE).map(move |x| Position::new(x, y)))
    }

    /// Every target marker on the board, in row-major order.
    pub fn goals(&self) -> Vec<Goal> {
        Self::positions()
            .filter_map(|position| {
                self.cell(position).target().map(|t| Goal {
                    color: t.color,
                    shape: t.shape,
                    position,
                })
            })
            .collect()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            size: BOARD_SIZE,
            cells: Self::positions().map(|p| self.cell(p).snapshot()).collect(),
        }
    }
}

/// Draw four tiles (repetition allowed), rotate each for its quadrant and assemble the board.
pub fn generate_board(catalog: &TileCatalog, rng: &mut GameRng) -> Board {
    let tiles = catalog.tiles();
    let quadrants: Vec<Tile> = QUADRANT_ROTATIONS
        .iter()
        .map(|&turns| tiles[rng.gen_index(tiles.len())].rotated(turns))
        .collect();
    Board::from_quadrants([&quadrants[0], &quadrants[1], &quadrants[2], &quadrants[3]])
}
