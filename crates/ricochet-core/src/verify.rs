//! Replay of a proposed solution.

use ricochet_protocol::{Goal, Move};

use crate::board::Board;
use crate::movement::apply_move;
use crate::robots::Robots;

/// Replay `moves` from `start` and report whether the goal robot ends on the goal cell.
///
/// Any move that cannot slide invalidates the solution, and at least one robot must have
/// actually moved. The caller decides when the move log is complete.
pub fn verify_solution(board: &Board, start: &Robots, moves: &[Move], goal: &Goal) -> bool {
    let mut robots = *start;
    let mut moved = false;

    for &mv in moves {
        let before = robots.get(mv.color);
        let Some(after) = apply_move(board, &mut robots, mv) else {
            return false;
        };
        moved |= after != before;
    }

    moved && robots.get(goal.color) == goal.position
}
