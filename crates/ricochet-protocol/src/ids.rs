use serde::{Deserialize, Serialize};

/// Connection-scoped player identity.
///
/// The server derives it from the transport's client id, so it is unique for the lifetime of a
/// connection and never reused by a different connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

/// Identifies one bidding countdown. A fresh id is minted every time a countdown starts, so a
/// tick carrying an older id can be recognized as stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountdownId(pub u64);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}
