use std::collections::BTreeSet;

use ricochet_protocol::PlayerId;

/// One vote per player; reset every round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ballot {
    votes: BTreeSet<PlayerId>,
}

impl Ballot {
    /// Record a vote. Returns `false` if the player had already voted.
    pub fn cast(&mut self, player: PlayerId) -> bool {
        self.votes.insert(player)
    }

    pub fn withdraw(&mut self, player: PlayerId) {
        self.votes.remove(&player);
    }

    pub fn has_voted(&self, player: PlayerId) -> bool {
        self.votes.contains(&player)
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    /// True when every listed player has voted (and there is at least one).
    pub fn is_unanimous<'a>(&self, players: impl IntoIterator<Item = &'a PlayerId>) -> bool {
        let mut any = false;
        for player in players {
            if !self.votes.contains(player) {
                return false;
            }
            any = true;
        }
        any
    }

    pub fn voters(&self) -> Vec<PlayerId> {
        self.votes.iter().copied().collect()
    }
}
