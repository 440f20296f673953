use serde::{Deserialize, Serialize};

use crate::{Bid, Direction, PlayerId, PlayerInfo, RobotColor, SessionState};

/// Client-to-server intents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Join the lobby under a display name
    Join { name: String },
    /// Start a game (ignored while one is running)
    StartGame,
    /// Claim the goal can be reached in `value` moves
    PlaceBid { value: u32 },
    /// Slide one robot; only the active player may move during proving
    MoveRobot {
        color: RobotColor,
        direction: Direction,
    },
    /// Vote to skip the current goal
    VoteSkip,
    /// Vote to close bidding early
    VoteEndBid,
    /// Chat line relayed to everyone
    Chat { text: String },
}

/// Server-to-client events. Unless noted, each is broadcast to every joined player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Join accepted (sent only to the joiner)
    LobbyJoined { player: PlayerInfo },
    /// Display name already in use (sent only to the joiner)
    UsernameTaken,
    PlayersUpdated { players: Vec<PlayerInfo> },
    GameStarted { state: Box<SessionState> },
    BidUpdated { bid: Bid },
    TimerTick { remaining: u32 },
    BiddingEnded { bid: Bid },
    ProveSolution { player: PlayerId },
    GameStateUpdated { state: Box<SessionState> },
    SolutionResult {
        player: PlayerId,
        valid: bool,
        score: u32,
    },
    RoundStarted { state: Box<SessionState> },
    /// Final standings, highest score first
    GameOver { ranking: Vec<PlayerInfo> },
    SkipVotesUpdated { votes: Vec<PlayerId> },
    EndBidVotesUpdated { votes: Vec<PlayerId> },
    ChatMessage { player: PlayerId, text: String },
    /// Current state for a player who joined mid-game (sent only to the joiner)
    GameInProgress { state: Box<SessionState> },
}

impl ClientMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientMessage::Join { .. } => "join",
            ClientMessage::StartGame => "startGame",
            ClientMessage::PlaceBid { .. } => "placeBid",
            ClientMessage::MoveRobot { .. } => "moveRobot",
            ClientMessage::VoteSkip => "voteSkip",
            ClientMessage::VoteEndBid => "voteEndBid",
            ClientMessage::Chat { .. } => "chat",
        }
    }
}

impl ServerMessage {
    /// Contractual event name, as used by the JSON encoding.
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMessage::LobbyJoined { .. } => "lobbyJoined",
            ServerMessage::UsernameTaken => "usernameTaken",
            ServerMessage::PlayersUpdated { .. } => "playersUpdated",
            ServerMessage::GameStarted { .. } => "gameStarted",
            ServerMessage::BidUpdated { .. } => "bidUpdated",
            ServerMessage::TimerTick { .. } => "timerTick",
            ServerMessage::BiddingEnded { .. } => "biddingEnded",
            ServerMessage::ProveSolution { .. } => "proveSolution",
            ServerMessage::GameStateUpdated { .. } => "gameStateUpdated",
            ServerMessage::SolutionResult { .. } => "solutionResult",
            ServerMessage::RoundStarted { .. } => "roundStarted",
            ServerMessage::GameOver { .. } => "gameOver",
            ServerMessage::SkipVotesUpdated { .. } => "skipVotesUpdated",
            ServerMessage::EndBidVotesUpdated { .. } => "endBidVotesUpdated",
            ServerMessage::ChatMessage { .. } => "chatMessage",
            ServerMessage::GameInProgress { .. } => "gameInProgress",
        }
    }
}
