//! Sliding movement.

use ricochet_protocol::{Move, Position};

use crate::board::Board;
use crate::robots::Robots;

/// Slide the robot named by `mv` until something stops it.
///
/// A robot stops before a cell that is off the board, blocked, occupied by another robot, or
/// carries the wall facing the direction of travel. Returns the resting cell, or `None` when the
/// robot cannot move at all.
pub fn resolve_move(board: &Board, robots: &Robots, mv: Move) -> Option<Position> {
    let start = robots.get(mv.color);
    let entry_wall = mv.direction.entry_wall();

    let mut current = start;
    while let Some(next) = current.step(mv.direction) {
        if board.is_blocked(next)
            || robots.occupied_by_other(next, mv.color)
            || board.cell(next).walls().contains(entry_wall)
        {
            break;
        }
        current = next;
    }

    (current != start).then_some(current)
}

/// Apply `mv` in place. Returns the new position, or `None` (and leaves `robots` untouched) when
/// the robot cannot move.
pub fn apply_move(board: &Board, robots: &mut Robots, mv: Move) -> Option<Position> {
    let destination = resolve_move(board, robots, mv)?;
    robots.set(mv.color, destination);
    Some(destination)
}
