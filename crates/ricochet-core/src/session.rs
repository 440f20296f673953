//! The authoritative session state machine.
//!
//! A `Session` is the single owner of everything mutable in a game: players and scores, the board,
//! robots, goal, bids, votes and the countdown. Every change goes through one of the entry points
//! (`submit`, `countdown_tick`, `disconnect`), each of which validates first and only then
//! mutates, returning the `Effect`s the transport must carry out. Callers serialize access; the
//! session itself never blocks, sleeps or performs I/O.

use std::collections::HashSet;

use ricochet_protocol::{
    Bid, ClientMessage, CountdownId, Goal, Move, PhaseKind, PlayerId, PlayerInfo, ServerMessage,
    SessionState, Target,
};
use serde::{Deserialize, Serialize};

use crate::ballot::Ballot;
use crate::board::{generate_board, Board};
use crate::catalog::TileCatalog;
use crate::effect::{Effect, IntentError};
use crate::movement::apply_move;
use crate::rng::GameRng;
use crate::robots::Robots;
use crate::verify::verify_solution;

/// Tunables for a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Countdown units granted once the first bid of a round lands.
    pub countdown_start: u32,
    /// Rounds per game.
    pub max_rounds: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            countdown_start: 60,
            max_rounds: 16,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Countdown {
    id: CountdownId,
    remaining: u32,
}

/// Round-level phase; each variant carries only what is meaningful in it.
#[derive(Clone, Debug)]
enum Stage {
    Bidding {
        bid: Option<Bid>,
        countdown: Option<Countdown>,
    },
    Proving {
        bid: Bid,
        /// Robot positions when proving began; the verifier replays from here.
        start: Robots,
        moves: Vec<Move>,
    },
    /// Transient: a proof has been scored and the next round is being prepared.
    RoundSettling,
    Over {
        ranking: Vec<PlayerInfo>,
    },
}

impl Stage {
    fn bidding() -> Self {
        Stage::Bidding {
            bid: None,
            countdown: None,
        }
    }
}

#[derive(Clone, Debug)]
struct Game {
    board: Board,
    robots: Robots,
    goal: Goal,
    round: u32,
    /// Every (color, shape) pair presented so far this game.
    served: HashSet<Target>,
    skip_votes: Ballot,
    end_bid_votes: Ballot,
    stage: Stage,
}

#[derive(Clone, Debug)]
enum Phase {
    Lobby,
    Active(Box<Game>),
}

pub struct Session {
    settings: SessionSettings,
    catalog: TileCatalog,
    rng: GameRng,
    /// Joined players in join order.
    players: Vec<PlayerInfo>,
    phase: Phase,
    next_countdown: u64,
}

impl Session {
    pub fn new(catalog: TileCatalog, settings: SessionSettings, seed: u64) -> Self {
        Self {
            settings,
            catalog,
            rng: GameRng::seed_from_u64(seed),
            players: Vec::new(),
            phase: Phase::Lobby,
            next_countdown: 0,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn players(&self) -> &[PlayerInfo] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerInfo> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn phase(&self) -> PhaseKind {
        match &self.phase {
            Phase::Lobby => PhaseKind::Lobby,
            Phase::Active(game) => match game.stage {
                Stage::Bidding { .. } => PhaseKind::Bidding,
                Stage::Proving { .. } => PhaseKind::Proving,
                Stage::RoundSettling => PhaseKind::RoundSettling,
                Stage::Over { .. } => PhaseKind::GameOver,
            },
        }
    }

    pub fn board(&self) -> Option<&Board> {
        self.game().map(|g| &g.board)
    }

    pub fn robots(&self) -> Option<Robots> {
        self.game().map(|g| g.robots)
    }

    pub fn goal(&self) -> Option<Goal> {
        self.game().map(|g| g.goal)
    }

    pub fn round(&self) -> u32 {
        self.game().map_or(0, |g| g.round)
    }

    pub fn current_bid(&self) -> Option<Bid> {
        match &self.game()?.stage {
            Stage::Bidding { bid, .. } => *bid,
            Stage::Proving { bid, .. } => Some(*bid),
            _ => None,
        }
    }

    /// The player allowed to move robots, while a solution is being proven.
    pub fn active_player(&self) -> Option<PlayerId> {
        match &self.game()?.stage {
            Stage::Proving { bid, .. } => Some(bid.player),
            _ => None,
        }
    }

    /// Id and remaining units of the running countdown.
    pub fn countdown(&self) -> Option<(CountdownId, u32)> {
        match &self.game()?.stage {
            Stage::Bidding {
                countdown: Some(c), ..
            } => Some((c.id, c.remaining)),
            _ => None,
        }
    }

    pub fn moves(&self) -> &[Move] {
        match self.game().map(|g| &g.stage) {
            Some(Stage::Proving { moves, .. }) => moves,
            _ => &[],
        }
    }

    /// Final standings, once the game is over.
    pub fn ranking(&self) -> Option<&[PlayerInfo]> {
        match &self.game()?.stage {
            Stage::Over { ranking } => Some(ranking),
            _ => None,
        }
    }

    /// Read-only snapshot for late joiners and full-state broadcasts.
    pub fn state(&self) -> SessionState {
        let mut state = SessionState {
            phase: self.phase(),
            round: self.round(),
            max_rounds: self.settings.max_rounds,
            players: self.players.clone(),
            board: None,
            robots: Vec::new(),
            goal: None,
            bid: self.current_bid(),
            countdown: self.countdown().map(|(_, remaining)| remaining),
            moves: self.moves().to_vec(),
            active_player: self.active_player(),
            skip_votes: Vec::new(),
            end_bid_votes: Vec::new(),
        };
        if let Some(game) = self.game() {
            state.board = Some(game.board.snapshot());
            state.robots = game.robots.to_vec();
            if !matches!(game.stage, Stage::Over { .. }) {
                state.goal = Some(game.goal);
            }
            state.skip_votes = game.skip_votes.voters();
            state.end_bid_votes = game.end_bid_votes.voters();
        }
        state
    }

    /// Apply one client intent on behalf of `player`.
    ///
    /// `Err` means the intent was ignored and nothing changed.
    pub fn submit(
        &mut self,
        player: PlayerId,
        message: ClientMessage,
    ) -> Result<Vec<Effect>, IntentError> {
        if !matches!(message, ClientMessage::Join { .. }) && self.player(player).is_none() {
            return Err(IntentError::NotJoined);
        }

        match message {
            ClientMessage::Join { name } => self.join(player, name),
            ClientMessage::StartGame => self.start_game(),
            ClientMessage::PlaceBid { value } => self.place_bid(player, value),
            ClientMessage::MoveRobot { color, direction } => {
                self.move_robot(player, Move { color, direction })
            }
            ClientMessage::VoteSkip => self.vote_skip(player),
            ClientMessage::VoteEndBid => self.vote_end_bid(player),
            ClientMessage::Chat { text } => Ok(vec![Effect::Broadcast(
                ServerMessage::ChatMessage { player, text },
            )]),
        }
    }

    fn join(&mut self, player: PlayerId, name: String) -> Result<Vec<Effect>, IntentError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(IntentError::EmptyName);
        }
        if self.player(player).is_some() {
            return Err(IntentError::AlreadyJoined);
        }
        if self.players.iter().any(|p| p.name == name) {
            return Ok(vec![Effect::Send {
                to: player,
                message: ServerMessage::UsernameTaken,
            }]);
        }

        let info = PlayerInfo {
            id: player,
            name: name.to_string(),
            score: 0,
        };
        self.players.push(info.clone());

        let mut effects = vec![
            Effect::Send {
                to: player,
                message: ServerMessage::LobbyJoined { player: info },
            },
            self.players_updated(),
        ];
        if self.game().is_some() {
            effects.push(Effect::Send {
                to: player,
                message: ServerMessage::GameInProgress {
                    state: Box::new(self.state()),
                },
            });
        }
        Ok(effects)
    }

    fn start_game(&mut self) -> Result<Vec<Effect>, IntentError> {
        let restarting = match self.game() {
            None => false,
            Some(game) if matches!(game.stage, Stage::Over { .. }) => true,
            Some(_) => return Err(IntentError::GameAlreadyRunning),
        };

        let board = generate_board(&self.catalog, &mut self.rng);
        let Some(goal) = pick_goal(&board, &HashSet::new(), &mut self.rng) else {
            return Err(IntentError::NoGoals);
        };
        let robots = Robots::place_random(&board, &mut self.rng);

        let mut effects = Vec::new();
        if restarting {
            for p in &mut self.players {
                p.score = 0;
            }
            effects.push(self.players_updated());
        }

        self.phase = Phase::Active(Box::new(Game {
            board,
            robots,
            goal,
            round: 1,
            served: HashSet::from([goal.target()]),
            skip_votes: Ballot::default(),
            end_bid_votes: Ballot::default(),
            stage: Stage::bidding(),
        }));
        effects.push(Effect::Broadcast(ServerMessage::GameStarted {
            state: Box::new(self.state()),
        }));
        Ok(effects)
    }

    fn place_bid(&mut self, player: PlayerId, value: u32) -> Result<Vec<Effect>, IntentError> {
        let countdown_start = self.settings.countdown_start;
        let next_id = CountdownId(self.next_countdown);

        let game = self.game_mut().ok_or(IntentError::NoGameRunning)?;
        let Stage::Bidding { bid, countdown } = &mut game.stage else {
            return Err(IntentError::NotBidding);
        };
        if let Some(current) = bid {
            if value >= current.value {
                return Err(IntentError::BidNotLower {
                    current: current.value,
                    offered: value,
                });
            }
        }

        let new_bid = Bid { player, value };
        *bid = Some(new_bid);
        let mut effects = vec![Effect::Broadcast(ServerMessage::BidUpdated { bid: new_bid })];
        if countdown.is_none() {
            *countdown = Some(Countdown {
                id: next_id,
                remaining: countdown_start,
            });
            self.next_countdown += 1;
            effects.push(Effect::StartCountdown {
                id: next_id,
                remaining: countdown_start,
            });
        }
        Ok(effects)
    }

    /// Advance countdown `id` by one unit. Ticks for any countdown other than the running one
    /// are refused, so a cancelled countdown can never fire.
    pub fn countdown_tick(&mut self, id: CountdownId) -> Result<Vec<Effect>, IntentError> {
        let Some(game) = self.game_mut() else {
            return Err(IntentError::StaleCountdown(id));
        };
        let Stage::Bidding {
            countdown: Some(countdown),
            ..
        } = &mut game.stage
        else {
            return Err(IntentError::StaleCountdown(id));
        };
        if countdown.id != id {
            return Err(IntentError::StaleCountdown(id));
        }

        countdown.remaining = countdown.remaining.saturating_sub(1);
        let remaining = countdown.remaining;
        let mut effects = vec![Effect::Broadcast(ServerMessage::TimerTick { remaining })];
        if remaining == 0 {
            self.close_bidding(&mut effects);
        }
        Ok(effects)
    }

    fn vote_end_bid(&mut self, player: PlayerId) -> Result<Vec<Effect>, IntentError> {
        let game = self.game().ok_or(IntentError::NoGameRunning)?;
        let Stage::Bidding { bid, .. } = &game.stage else {
            return Err(IntentError::NotBidding);
        };
        if bid.is_none() {
            return Err(IntentError::NoCurrentBid);
        }
        if game.end_bid_votes.has_voted(player) {
            return Err(IntentError::AlreadyVoted);
        }

        let mut effects = Vec::new();
        if let Some(game) = self.game_mut() {
            game.end_bid_votes.cast(player);
            effects.push(Effect::Broadcast(ServerMessage::EndBidVotesUpdated {
                votes: game.end_bid_votes.voters(),
            }));
        }
        self.resolve_ballots(&mut effects);
        Ok(effects)
    }

    fn vote_skip(&mut self, player: PlayerId) -> Result<Vec<Effect>, IntentError> {
        let game = self.game().ok_or(IntentError::NoGameRunning)?;
        if !matches!(game.stage, Stage::Bidding { .. } | Stage::Proving { .. }) {
            return Err(IntentError::NoGameRunning);
        }
        if game.skip_votes.has_voted(player) {
            return Err(IntentError::AlreadyVoted);
        }

        let mut effects = Vec::new();
        if let Some(game) = self.game_mut() {
            game.skip_votes.cast(player);
            effects.push(Effect::Broadcast(ServerMessage::SkipVotesUpdated {
                votes: game.skip_votes.voters(),
            }));
        }
        self.resolve_ballots(&mut effects);
        Ok(effects)
    }

    fn move_robot(&mut self, player: PlayerId, mv: Move) -> Result<Vec<Effect>, IntentError> {
        let game = self.game_mut().ok_or(IntentError::NoGameRunning)?;
        let Stage::Proving { bid, moves, .. } = &mut game.stage else {
            return Err(IntentError::NotProving);
        };
        if bid.player != player {
            return Err(IntentError::NotActivePlayer);
        }
        if moves.len() >= bid.value as usize {
            return Err(IntentError::NotProving);
        }
        if apply_move(&game.board, &mut game.robots, mv).is_none() {
            return Err(IntentError::NoMovement);
        }
        moves.push(mv);
        let complete = moves.len() == bid.value as usize;

        let mut effects = vec![Effect::Broadcast(ServerMessage::GameStateUpdated {
            state: Box::new(self.state()),
        })];
        if complete {
            self.score_proof(&mut effects);
        }
        Ok(effects)
    }

    /// Handle a dropped connection. Players who never joined are ignored.
    pub fn disconnect(&mut self, player: PlayerId) -> Result<Vec<Effect>, IntentError> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == player)
            .ok_or(IntentError::NotJoined)?;
        self.players.remove(index);

        let mut effects = vec![self.players_updated()];

        if self.players.is_empty() {
            if let Some((id, _)) = self.countdown() {
                effects.push(Effect::CancelCountdown { id });
            }
            self.phase = Phase::Lobby;
            return Ok(effects);
        }

        let Some(game) = self.game_mut() else {
            return Ok(effects);
        };
        game.skip_votes.withdraw(player);
        game.end_bid_votes.withdraw(player);

        match &mut game.stage {
            Stage::Bidding { bid, countdown } if bid.is_some_and(|b| b.player == player) => {
                *bid = None;
                if let Some(c) = countdown.take() {
                    effects.push(Effect::CancelCountdown { id: c.id });
                }
                game.end_bid_votes.clear();
                effects.push(Effect::Broadcast(ServerMessage::GameStateUpdated {
                    state: Box::new(self.state()),
                }));
            }
            Stage::Proving { bid, start, .. } if bid.player == player => {
                game.robots = *start;
                game.stage = Stage::RoundSettling;
                self.settle_round(&mut effects);
                return Ok(effects);
            }
            _ => {}
        }

        self.resolve_ballots(&mut effects);
        Ok(effects)
    }

    /// Act on any ballot that has become unanimous. A skip takes precedence over ending bidding.
    fn resolve_ballots(&mut self, effects: &mut Vec<Effect>) {
        let Some(game) = self.game() else {
            return;
        };
        let ids = self.players.iter().map(|p| &p.id);
        let skip = matches!(game.stage, Stage::Bidding { .. } | Stage::Proving { .. })
            && game.skip_votes.is_unanimous(ids.clone());
        let end_bid = matches!(game.stage, Stage::Bidding { bid: Some(_), .. })
            && game.end_bid_votes.is_unanimous(ids);

        if skip {
            self.skip_goal(effects);
        } else if end_bid {
            self.close_bidding(effects);
        }
    }

    /// Freeze the current bid and hand the board to the bidder.
    fn close_bidding(&mut self, effects: &mut Vec<Effect>) {
        let Some(game) = self.game_mut() else {
            return;
        };
        let Stage::Bidding {
            bid: Some(bid),
            countdown,
        } = &game.stage
        else {
            return;
        };
        let bid = *bid;
        if let Some(c) = countdown {
            effects.push(Effect::CancelCountdown { id: c.id });
        }

        game.end_bid_votes.clear();
        game.stage = Stage::Proving {
            bid,
            start: game.robots,
            moves: Vec::new(),
        };
        effects.push(Effect::Broadcast(ServerMessage::BiddingEnded { bid }));
        effects.push(Effect::Broadcast(ServerMessage::ProveSolution {
            player: bid.player,
        }));

        // Nothing to replay for a zero bid; score it straight away.
        if bid.value == 0 {
            self.score_proof(effects);
        }
    }

    /// Verify the completed move log, adjust the prover's score and settle the round.
    fn score_proof(&mut self, effects: &mut Vec<Effect>) {
        let Some(game) = self.game_mut() else {
            return;
        };
        let Stage::Proving { bid, start, moves } = &game.stage else {
            return;
        };
        let valid = verify_solution(&game.board, start, moves, &game.goal);
        if !valid {
            game.robots = *start;
        }
        let prover = bid.player;
        game.stage = Stage::RoundSettling;

        let mut score = 0;
        if let Some(p) = self.players.iter_mut().find(|p| p.id == prover) {
            p.score = if valid {
                p.score + 1
            } else {
                p.score.saturating_sub(1)
            };
            score = p.score;
        }
        effects.push(Effect::Broadcast(ServerMessage::SolutionResult {
            player: prover,
            valid,
            score,
        }));
        effects.push(self.players_updated());
        self.settle_round(effects);
    }

    /// Leave `RoundSettling`: start the next round, or end the game when rounds or goals run out.
    fn settle_round(&mut self, effects: &mut Vec<Effect>) {
        let max_rounds = self.settings.max_rounds;
        let Phase::Active(game) = &mut self.phase else {
            return;
        };
        if game.round >= max_rounds {
            self.finish_game(effects);
            return;
        }
        let Some(goal) = pick_goal(&game.board, &game.served, &mut self.rng) else {
            self.finish_game(effects);
            return;
        };

        game.round += 1;
        game.begin_goal(goal);
        effects.push(Effect::Broadcast(ServerMessage::RoundStarted {
            state: Box::new(self.state()),
        }));
    }

    /// Abandon the current goal for a fresh one without advancing the round.
    fn skip_goal(&mut self, effects: &mut Vec<Effect>) {
        let Phase::Active(game) = &mut self.phase else {
            return;
        };
        match &game.stage {
            Stage::Bidding {
                countdown: Some(c), ..
            } => effects.push(Effect::CancelCountdown { id: c.id }),
            Stage::Proving { start, .. } => game.robots = *start,
            _ => {}
        }

        let Some(goal) = pick_goal(&game.board, &game.served, &mut self.rng) else {
            self.finish_game(effects);
            return;
        };
        game.begin_goal(goal);
        effects.push(Effect::Broadcast(ServerMessage::RoundStarted {
            state: Box::new(self.state()),
        }));
    }

    fn finish_game(&mut self, effects: &mut Vec<Effect>) {
        let mut ranking = self.players.clone();
        ranking.sort_by(|a, b| b.score.cmp(&a.score));

        if let Some(game) = self.game_mut() {
            game.skip_votes.clear();
            game.end_bid_votes.clear();
            game.stage = Stage::Over {
                ranking: ranking.clone(),
            };
        }
        effects.push(Effect::Broadcast(ServerMessage::GameOver { ranking }));
    }

    fn players_updated(&self) -> Effect {
        Effect::Broadcast(ServerMessage::PlayersUpdated {
            players: self.players.clone(),
        })
    }

    fn game(&self) -> Option<&Game> {
        match &self.phase {
            Phase::Active(game) => Some(game),
            Phase::Lobby => None,
        }
    }

    fn game_mut(&mut self) -> Option<&mut Game> {
        match &mut self.phase {
            Phase::Active(game) => Some(game),
            Phase::Lobby => None,
        }
    }
}

impl Game {
    /// Present `goal` and reset everything that belongs to a single round.
    fn begin_goal(&mut self, goal: Goal) {
        self.served.insert(goal.target());
        self.goal = goal;
        self.skip_votes.clear();
        self.end_bid_votes.clear();
        self.stage = Stage::bidding();
    }
}

/// Uniformly pick a target cell whose (color, shape) pair has not been served yet.
fn pick_goal(board: &Board, served: &HashSet<Target>, rng: &mut GameRng) -> Option<Goal> {
    let candidates: Vec<Goal> = board
        .goals()
        .into_iter()
        .filter(|g| !served.contains(&g.target()))
        .collect();
    rng.choose(&candidates).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{load_catalog, CatalogSource};
    use crate::tile::Cell;
    use ricochet_protocol::{Direction, Position, RobotColor, Shape};

    const ALICE: PlayerId = PlayerId(1);
    const BOB: PlayerId = PlayerId(2);

    fn session() -> Session {
        let catalog = load_catalog(CatalogSource::Embedded).unwrap();
        Session::new(catalog, SessionSettings::default(), 42)
    }

    fn join(session: &mut Session, id: PlayerId, name: &str) {
        session
            .submit(id, ClientMessage::Join { name: name.into() })
            .unwrap();
    }

    fn started(players: &[(PlayerId, &str)]) -> Session {
        let mut s = session();
        for (id, name) in players {
            join(&mut s, *id, name);
        }
        s.submit(players[0].0, ClientMessage::StartGame).unwrap();
        s
    }

    /// Replace the generated layout with the corridor fixture: red at (10,0) reaches the red
    /// circle at (0,5) with Left, Down.
    fn use_corridor(session: &mut Session) {
        let game = session.game_mut().unwrap();
        game.board = Board::open()
            .with_cell(Position::new(0, 5), Cell::parse("RC").unwrap())
            .with_cell(Position::new(0, 6), Cell::parse("N").unwrap())
            .with_cell(Position::new(12, 3), Cell::parse("BT").unwrap());
        game.robots = Robots::new([
            Position::new(10, 0),
            Position::new(15, 15),
            Position::new(15, 14),
            Position::new(15, 13),
        ]);
        game.goal = Goal {
            color: RobotColor::Red,
            shape: Shape::Circle,
            position: Position::new(0, 5),
        };
        game.served = HashSet::from([game.goal.target()]);
    }

    fn bid(
        session: &mut Session,
        player: PlayerId,
        value: u32,
    ) -> Result<Vec<Effect>, IntentError> {
        session.submit(player, ClientMessage::PlaceBid { value })
    }

    fn red(
        session: &mut Session,
        player: PlayerId,
        direction: Direction,
    ) -> Result<Vec<Effect>, IntentError> {
        session.submit(
            player,
            ClientMessage::MoveRobot {
                color: RobotColor::Red,
                direction,
            },
        )
    }

    fn broadcasts(effects: &[Effect]) -> Vec<&ServerMessage> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Broadcast(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_game_sets_up_first_round() {
        let s = started(&[(ALICE, "Alice")]);
        assert_eq!(s.phase(), PhaseKind::Bidding);
        assert_eq!(s.round(), 1);
        assert!(s.goal().is_some());
        let robots = s.robots().unwrap();
        let board = s.board().unwrap();
        let positions: Vec<Position> = robots.iter().map(|r| r.position).collect();
        for (i, p) in positions.iter().enumerate() {
            assert!(!board.is_blocked(*p));
            assert!(positions[i + 1..].iter().all(|q| q != p));
        }
    }

    #[test]
    fn start_while_running_is_ignored() {
        let mut s = started(&[(ALICE, "Alice")]);
        let goal = s.goal();
        assert_eq!(
            s.submit(ALICE, ClientMessage::StartGame),
            Err(IntentError::GameAlreadyRunning)
        );
        assert_eq!(s.goal(), goal);
    }

    #[test]
    fn intents_from_unjoined_connections_are_ignored() {
        let mut s = session();
        assert_eq!(
            s.submit(PlayerId(9), ClientMessage::StartGame),
            Err(IntentError::NotJoined)
        );
        assert_eq!(s.phase(), PhaseKind::Lobby);
    }

    #[test]
    fn duplicate_name_gets_a_notice() {
        let mut s = session();
        join(&mut s, ALICE, "Alice");
        let effects = s
            .submit(BOB, ClientMessage::Join { name: "Alice".into() })
            .unwrap();
        assert_eq!(
            effects,
            vec![Effect::Send {
                to: BOB,
                message: ServerMessage::UsernameTaken,
            }]
        );
        assert_eq!(s.players().len(), 1);
    }

    #[test]
    fn blank_name_is_ignored() {
        let mut s = session();
        assert_eq!(
            s.submit(ALICE, ClientMessage::Join { name: "  ".into() }),
            Err(IntentError::EmptyName)
        );
        assert!(s.players().is_empty());
    }

    #[test]
    fn late_joiner_receives_game_in_progress() {
        let mut s = started(&[(ALICE, "Alice")]);
        let effects = s
            .submit(BOB, ClientMessage::Join { name: "Bob".into() })
            .unwrap();
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Send {
                to: BOB,
                message: ServerMessage::GameInProgress { .. }
            }
        )));
    }

    #[test]
    fn first_bid_starts_countdown_and_only_lower_bids_replace_it() {
        let mut s = started(&[(ALICE, "Alice"), (BOB, "Bob")]);
        let effects = bid(&mut s, ALICE, 5).unwrap();
        let Some(Effect::StartCountdown { id, remaining: 60 }) = effects.last().cloned() else {
            panic!("expected countdown start, got {effects:?}");
        };

        assert_eq!(
            bid(&mut s, BOB, 5),
            Err(IntentError::BidNotLower {
                current: 5,
                offered: 5
            })
        );
        let effects = bid(&mut s, BOB, 4).unwrap();
        assert!(!effects
            .iter()
            .any(|e| matches!(e, Effect::StartCountdown { .. })));
        assert_eq!(s.current_bid(), Some(Bid { player: BOB, value: 4 }));
        assert_eq!(s.countdown(), Some((id, 60)));
    }

    #[test]
    fn countdown_exhaustion_moves_to_proving() {
        let mut s = started(&[(ALICE, "Alice")]);
        bid(&mut s, ALICE, 3).unwrap();
        let (id, _) = s.countdown().unwrap();
        for expected in (1..60).rev() {
            let effects = s.countdown_tick(id).unwrap();
            assert_eq!(
                broadcasts(&effects),
                vec![&ServerMessage::TimerTick {
                    remaining: expected
                }]
            );
        }
        let effects = s.countdown_tick(id).unwrap();
        assert!(effects.contains(&Effect::CancelCountdown { id }));
        assert_eq!(s.phase(), PhaseKind::Proving);
        assert_eq!(s.active_player(), Some(ALICE));

        assert_eq!(s.countdown_tick(id), Err(IntentError::StaleCountdown(id)));
    }

    #[test]
    fn unanimous_end_bid_vote_cancels_countdown() {
        let mut s = started(&[(ALICE, "Alice"), (BOB, "Bob")]);
        assert_eq!(
            s.submit(ALICE, ClientMessage::VoteEndBid),
            Err(IntentError::NoCurrentBid)
        );
        bid(&mut s, BOB, 6).unwrap();
        let (id, _) = s.countdown().unwrap();

        s.submit(ALICE, ClientMessage::VoteEndBid).unwrap();
        assert_eq!(
            s.submit(ALICE, ClientMessage::VoteEndBid),
            Err(IntentError::AlreadyVoted)
        );
        assert_eq!(s.phase(), PhaseKind::Bidding);

        let effects = s.submit(BOB, ClientMessage::VoteEndBid).unwrap();
        let cancels = effects
            .iter()
            .filter(|e| matches!(e, Effect::CancelCountdown { .. }))
            .count();
        assert_eq!(cancels, 1);
        assert_eq!(s.phase(), PhaseKind::Proving);
        assert_eq!(s.active_player(), Some(BOB));
        assert!(s.countdown_tick(id).is_err());
    }

    #[test]
    fn valid_proof_scores_and_starts_next_round() {
        let mut s = started(&[(ALICE, "Alice"), (BOB, "Bob")]);
        use_corridor(&mut s);
        bid(&mut s, ALICE, 2).unwrap();
        s.submit(ALICE, ClientMessage::VoteEndBid).unwrap();
        s.submit(BOB, ClientMessage::VoteEndBid).unwrap();

        assert_eq!(
            red(&mut s, BOB, Direction::Left),
            Err(IntentError::NotActivePlayer)
        );
        red(&mut s, ALICE, Direction::Left).unwrap();
        assert_eq!(s.moves().len(), 1);
        let effects = red(&mut s, ALICE, Direction::Down).unwrap();

        assert!(broadcasts(&effects).contains(&&ServerMessage::SolutionResult {
            player: ALICE,
            valid: true,
            score: 1,
        }));
        assert_eq!(s.player(ALICE).unwrap().score, 1);
        assert_eq!(s.round(), 2);
        assert_eq!(s.phase(), PhaseKind::Bidding);
        // Robots stay where the proof left them.
        assert_eq!(
            s.robots().unwrap().get(RobotColor::Red),
            Position::new(0, 5)
        );
        // The only other target on the fixture board is next.
        assert_eq!(s.goal().unwrap().color, RobotColor::Blue);
    }

    #[test]
    fn failed_proof_restores_robots_and_never_goes_negative() {
        let mut s = started(&[(ALICE, "Alice")]);
        use_corridor(&mut s);
        bid(&mut s, ALICE, 1).unwrap();
        s.submit(ALICE, ClientMessage::VoteEndBid).unwrap();
        assert_eq!(red(&mut s, ALICE, Direction::Up), Err(IntentError::NoMovement));
        let effects = red(&mut s, ALICE, Direction::Left).unwrap();

        assert!(broadcasts(&effects).contains(&&ServerMessage::SolutionResult {
            player: ALICE,
            valid: false,
            score: 0,
        }));
        assert_eq!(
            s.robots().unwrap().get(RobotColor::Red),
            Position::new(10, 0)
        );
    }

    #[test]
    fn zero_bid_is_scored_immediately() {
        let mut s = started(&[(ALICE, "Alice")]);
        bid(&mut s, ALICE, 0).unwrap();
        let effects = s.submit(ALICE, ClientMessage::VoteEndBid).unwrap();
        assert!(broadcasts(&effects).iter().any(|m| matches!(
            m,
            ServerMessage::SolutionResult { valid: false, .. }
        )));
        assert_eq!(s.round(), 2);
    }

    #[test]
    fn unanimous_skip_replaces_goal_without_advancing_round() {
        let mut s = started(&[(ALICE, "Alice"), (BOB, "Bob")]);
        bid(&mut s, ALICE, 4).unwrap();
        let (id, _) = s.countdown().unwrap();
        let first = s.goal().unwrap();

        s.submit(ALICE, ClientMessage::VoteSkip).unwrap();
        let effects = s.submit(BOB, ClientMessage::VoteSkip).unwrap();
        assert!(effects.contains(&Effect::CancelCountdown { id }));
        assert_eq!(s.round(), 1);
        assert_eq!(s.current_bid(), None);
        assert_ne!(s.goal().unwrap().target(), first.target());
    }

    #[test]
    fn skip_during_proving_restores_snapshot() {
        let mut s = started(&[(ALICE, "Alice")]);
        use_corridor(&mut s);
        bid(&mut s, ALICE, 3).unwrap();
        s.submit(ALICE, ClientMessage::VoteEndBid).unwrap();
        red(&mut s, ALICE, Direction::Left).unwrap();
        s.submit(ALICE, ClientMessage::VoteSkip).unwrap();
        assert_eq!(s.phase(), PhaseKind::Bidding);
        assert_eq!(
            s.robots().unwrap().get(RobotColor::Red),
            Position::new(10, 0)
        );
    }

    #[test]
    fn skipping_past_the_last_goal_ends_the_game() {
        let mut s = started(&[(ALICE, "Alice")]);
        use_corridor(&mut s);
        s.submit(ALICE, ClientMessage::VoteSkip).unwrap();
        assert_eq!(s.goal().unwrap().color, RobotColor::Blue);
        let effects = s.submit(ALICE, ClientMessage::VoteSkip).unwrap();
        assert!(matches!(
            broadcasts(&effects).last(),
            Some(ServerMessage::GameOver { .. })
        ));
        assert_eq!(s.phase(), PhaseKind::GameOver);
        assert_eq!(s.submit(ALICE, ClientMessage::VoteSkip), Err(IntentError::NoGameRunning));
    }

    #[test]
    fn bidder_leaving_reopens_bidding() {
        let mut s = started(&[(ALICE, "Alice"), (BOB, "Bob")]);
        bid(&mut s, BOB, 4).unwrap();
        let (id, _) = s.countdown().unwrap();
        let effects = s.disconnect(BOB).unwrap();
        assert!(effects.contains(&Effect::CancelCountdown { id }));
        assert_eq!(s.current_bid(), None);
        assert_eq!(s.phase(), PhaseKind::Bidding);
    }

    #[test]
    fn departing_voter_can_complete_unanimity() {
        let mut s = started(&[(ALICE, "Alice"), (BOB, "Bob")]);
        bid(&mut s, ALICE, 4).unwrap();
        s.submit(ALICE, ClientMessage::VoteEndBid).unwrap();
        s.disconnect(BOB).unwrap();
        assert_eq!(s.phase(), PhaseKind::Proving);
    }

    #[test]
    fn prover_leaving_settles_round() {
        let mut s = started(&[(ALICE, "Alice"), (BOB, "Bob")]);
        use_corridor(&mut s);
        bid(&mut s, BOB, 2).unwrap();
        s.submit(ALICE, ClientMessage::VoteEndBid).unwrap();
        s.submit(BOB, ClientMessage::VoteEndBid).unwrap();
        red(&mut s, BOB, Direction::Left).unwrap();
        s.disconnect(BOB).unwrap();
        assert_eq!(s.round(), 2);
        assert_eq!(s.phase(), PhaseKind::Bidding);
        assert_eq!(
            s.robots().unwrap().get(RobotColor::Red),
            Position::new(10, 0)
        );
    }

    #[test]
    fn last_player_leaving_resets_to_lobby() {
        let mut s = started(&[(ALICE, "Alice")]);
        bid(&mut s, ALICE, 4).unwrap();
        let (id, _) = s.countdown().unwrap();
        let effects = s.disconnect(ALICE).unwrap();
        assert!(effects.contains(&Effect::CancelCountdown { id }));
        assert_eq!(s.phase(), PhaseKind::Lobby);
        assert!(s.board().is_none());
        assert_eq!(s.countdown_tick(id), Err(IntentError::StaleCountdown(id)));
    }

    #[test]
    fn finished_game_can_be_restarted_with_fresh_scores() {
        let mut s = started(&[(ALICE, "Alice")]);
        use_corridor(&mut s);
        bid(&mut s, ALICE, 2).unwrap();
        s.submit(ALICE, ClientMessage::VoteEndBid).unwrap();
        red(&mut s, ALICE, Direction::Left).unwrap();
        red(&mut s, ALICE, Direction::Down).unwrap();
        // Fixture has one goal left; skip it to exhaust the board.
        s.submit(ALICE, ClientMessage::VoteSkip).unwrap();
        assert_eq!(s.phase(), PhaseKind::GameOver);
        assert_eq!(s.player(ALICE).unwrap().score, 1);
        assert!(s.state().goal.is_none());

        s.submit(ALICE, ClientMessage::StartGame).unwrap();
        assert_eq!(s.phase(), PhaseKind::Bidding);
        assert_eq!(s.round(), 1);
        assert_eq!(s.player(ALICE).unwrap().score, 0);
    }

    #[test]
    fn chat_is_relayed() {
        let mut s = session();
        join(&mut s, ALICE, "Alice");
        let effects = s
            .submit(ALICE, ClientMessage::Chat { text: "hi".into() })
            .unwrap();
        assert_eq!(
            effects,
            vec![Effect::Broadcast(ServerMessage::ChatMessage {
                player: ALICE,
                text: "hi".into(),
            })]
        );
    }
}
