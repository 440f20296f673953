use serde::{Deserialize, Serialize};

use crate::{Bid, Goal, Move, PhaseKind, PlayerId, PlayerInfo, Robot, Target, WallSet};

/// Full session state for initial sync, round starts, and late joiners.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: PhaseKind,
    pub round: u32,
    pub max_rounds: u32,
    pub players: Vec<PlayerInfo>,
    #[serde(default)]
    pub board: Option<BoardSnapshot>,
    #[serde(default)]
    pub robots: Vec<Robot>,
    #[serde(default)]
    pub goal: Option<Goal>,
    #[serde(default)]
    pub bid: Option<Bid>,
    /// Countdown units remaining, while one is running.
    #[serde(default)]
    pub countdown: Option<u32>,
    #[serde(default)]
    pub moves: Vec<Move>,
    #[serde(default)]
    pub active_player: Option<PlayerId>,
    #[serde(default)]
    pub skip_votes: Vec<PlayerId>,
    #[serde(default)]
    pub end_bid_votes: Vec<PlayerId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub size: u8,
    pub cells: Vec<CellSnapshot>, // row-major
}

impl BoardSnapshot {
    pub fn cell(&self, x: u8, y: u8) -> Option<&CellSnapshot> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.cells
            .get(usize::from(y) * usize::from(self.size) + usize::from(x))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub walls: WallSet,
    #[serde(default)]
    pub target: Option<Target>,
    #[serde(default)]
    pub blocked: bool,
}
