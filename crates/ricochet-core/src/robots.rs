//! The four robots and their placement.

use ricochet_protocol::{Position, Robot, RobotColor, BOARD_SIZE};

use crate::board::Board;
use crate::rng::GameRng;

/// Positions of all four robots, one per color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Robots {
    positions: [Position; 4],
}

impl Robots {
    /// Positions in `RobotColor::ALL` order.
    pub const fn new(positions: [Position; 4]) -> Self {
        Self { positions }
    }

    fn slot(color: RobotColor) -> usize {
        match color {
            RobotColor::Red => 0,
            RobotColor::Blue => 1,
            RobotColor::Green => 2,
            RobotColor::Yellow => 3,
        }
    }

    pub fn get(&self, color: RobotColor) -> Position {
        self.positions[Self::slot(color)]
    }

    pub fn set(&mut self, color: RobotColor, position: Position) {
        self.positions[Self::slot(color)] = position;
    }

    /// Whether any robot other than `except` stands on `pos`.
    pub fn occupied_by_other(&self, pos: Position, except: RobotColor) -> bool {
        RobotColor::ALL
            .into_iter()
            .any(|c| c != except && self.get(c) == pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = Robot> + '_ {
        RobotColor::ALL.into_iter().map(|color| Robot {
            color,
            position: self.get(color),
        })
    }

    pub fn to_vec(&self) -> Vec<Robot> {
        self.iter().collect()
    }

    /// Rejection-sample a distinct, non-blocked cell for each robot.
    pub fn place_random(board: &Board, rng: &mut GameRng) -> Self {
        let mut placed: Vec<Position> = Vec::with_capacity(4);
        while placed.len() < 4 {
            let candidate = Position::new(
                rng.gen_index(usize::from(BOARD_SIZE)) as u8,
                rng.gen_index(usize::from(BOARD_SIZE)) as u8,
            );
            if board.is_blocked(candidate) || placed.contains(&candidate) {
                continue;
            }
            placed.push(candidate);
        }
        Self::new([placed[0], placed[1], placed[2], placed[3]])
    }
}
