use ricochet_protocol::{CountdownId, PlayerId, ServerMessage};
use thiserror::Error;

/// Side effects requested by a session transition, in the order they must be carried out.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Deliver to every connected client.
    Broadcast(ServerMessage),
    /// Deliver to one client only.
    Send { to: PlayerId, message: ServerMessage },
    /// Begin ticking countdown `id` once per time unit, feeding each tick back through
    /// `Session::countdown_tick`.
    StartCountdown { id: CountdownId, remaining: u32 },
    /// Stop ticking countdown `id`. Emitted at most once per countdown.
    CancelCountdown { id: CountdownId },
}

/// Why an intent was ignored. Nothing is sent back to the player; the reason is for logs.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("player has not joined")]
    NotJoined,
    #[error("player already joined")]
    AlreadyJoined,
    #[error("display name is empty")]
    EmptyName,
    #[error("a game is already running")]
    GameAlreadyRunning,
    #[error("no game is running")]
    NoGameRunning,
    #[error("board has no targets")]
    NoGoals,
    #[error("bidding is closed")]
    NotBidding,
    #[error("bid {offered} does not beat current bid {current}")]
    BidNotLower { current: u32, offered: u32 },
    #[error("no bid has been placed")]
    NoCurrentBid,
    #[error("no solution is being proven")]
    NotProving,
    #[error("only the winning bidder may move")]
    NotActivePlayer,
    #[error("robot cannot move in that direction")]
    NoMovement,
    #[error("player already voted")]
    AlreadyVoted,
    #[error("countdown {0:?} is not running")]
    StaleCountdown(CountdownId),
}
