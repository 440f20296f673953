//! Single-writer task owning the session.
//!
//! Every intent, disconnect and countdown tick is queued on one channel and applied to the
//! `Session` in arrival order, so no two transitions ever interleave. Effects come back out as
//! `Outbound` messages for the transport, or as countdown tasks the actor starts and aborts.

use std::time::Duration;

use ricochet_core::{Effect, IntentError, Session};
use ricochet_protocol::{ClientMessage, CountdownId, PlayerId, ServerMessage, SessionState};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Who an outbound message is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    All,
    Player(PlayerId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Outbound {
    pub target: Target,
    pub message: ServerMessage,
}

#[derive(Debug)]
enum SessionCommand {
    Intent {
        player: PlayerId,
        message: ClientMessage,
    },
    Disconnect {
        player: PlayerId,
    },
    CountdownTick {
        id: CountdownId,
    },
    Snapshot {
        reply: oneshot::Sender<SessionState>,
    },
}

#[derive(Debug, thiserror::Error)]
#[error("session actor has stopped")]
pub struct SessionClosed;

/// Cloneable entry point into the session actor.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub fn submit(&self, player: PlayerId, message: ClientMessage) -> Result<(), SessionClosed> {
        self.send(SessionCommand::Intent { player, message })
    }

    pub fn disconnect(&self, player: PlayerId) -> Result<(), SessionClosed> {
        self.send(SessionCommand::Disconnect { player })
    }

    /// Current state, as a late joiner would see it.
    pub async fn snapshot(&self) -> Result<SessionState, SessionClosed> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot { reply })?;
        rx.await.map_err(|_| SessionClosed)
    }

    fn send(&self, command: SessionCommand) -> Result<(), SessionClosed> {
        self.commands.send(command).map_err(|_| SessionClosed)
    }
}

struct RunningCountdown {
    id: CountdownId,
    task: JoinHandle<()>,
}

pub struct SessionActor {
    session: Session,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    /// Weak so the actor stops once every `SessionHandle` is gone.
    ticks: mpsc::WeakUnboundedSender<SessionCommand>,
    outbound: mpsc::UnboundedSender<Outbound>,
    countdown: Option<RunningCountdown>,
    period: Duration,
}

/// Spawn the actor on the current runtime. `period` is the length of one countdown unit.
pub fn spawn_session(
    session: Session,
    period: Duration,
) -> (SessionHandle, mpsc::UnboundedReceiver<Outbound>, JoinHandle<()>) {
    let (commands_tx, commands) = mpsc::unbounded_channel();
    let (outbound, outbound_rx) = mpsc::unbounded_channel();
    let actor = SessionActor {
        session,
        commands,
        ticks: commands_tx.downgrade(),
        outbound,
        countdown: None,
        period,
    };
    let task = tokio::spawn(actor.run());
    (
        SessionHandle {
            commands: commands_tx,
        },
        outbound_rx,
        task,
    )
}

impl SessionActor {
    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            self.handle(command);
        }
        if let Some(countdown) = self.countdown.take() {
            countdown.task.abort();
        }
        debug!("Session actor stopped");
    }

    fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Intent { player, message } => {
                let event = message.event_name();
                let result = self.session.submit(player, message);
                self.finish(player, event, result);
            }
            SessionCommand::Disconnect { player } => {
                let result = self.session.disconnect(player);
                self.finish(player, "disconnect", result);
            }
            SessionCommand::CountdownTick { id } => match self.session.countdown_tick(id) {
                Ok(effects) => self.apply(effects),
                Err(err) => debug!("Dropped countdown tick: {}", err),
            },
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.session.state());
            }
        }
    }

    fn finish(
        &mut self,
        player: PlayerId,
        event: &str,
        result: Result<Vec<Effect>, IntentError>,
    ) {
        match result {
            Ok(effects) => self.apply(effects),
            Err(err) => debug!("Ignored {} from {}: {}", event, player, err),
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Broadcast(message) => {
                    log_event(&message);
                    self.deliver(Target::All, message);
                }
                Effect::Send { to, message } => {
                    log_event(&message);
                    self.deliver(Target::Player(to), message);
                }
                Effect::StartCountdown { id, remaining } => self.start_countdown(id, remaining),
                Effect::CancelCountdown { id } => self.cancel_countdown(id),
            }
        }
    }

    fn deliver(&self, target: Target, message: ServerMessage) {
        if self.outbound.send(Outbound { target, message }).is_err() {
            debug!("Outbound queue closed; dropping message");
        }
    }

    fn start_countdown(&mut self, id: CountdownId, remaining: u32) {
        if let Some(previous) = self.countdown.take() {
            previous.task.abort();
        }
        let ticks = self.ticks.clone();
        let period = self.period;
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick of an interval completes immediately.
            interval.tick().await;
            for _ in 0..remaining {
                interval.tick().await;
                let Some(sender) = ticks.upgrade() else {
                    return;
                };
                if sender.send(SessionCommand::CountdownTick { id }).is_err() {
                    return;
                }
            }
        });
        debug!("Countdown {:?} started with {} units", id, remaining);
        self.countdown = Some(RunningCountdown { id, task });
    }

    fn cancel_countdown(&mut self, id: CountdownId) {
        if self.countdown.as_ref().is_some_and(|c| c.id == id) {
            if let Some(countdown) = self.countdown.take() {
                countdown.task.abort();
                debug!("Countdown {:?} cancelled", id);
            }
        }
    }
}

fn log_event(message: &ServerMessage) {
    match message {
        ServerMessage::LobbyJoined { player } => {
            info!("{} joined as {:?}", player.id, player.name)
        }
        ServerMessage::GameStarted { state } => {
            info!("Game started ({} players)", state.players.len())
        }
        ServerMessage::BiddingEnded { bid } => {
            info!("Bidding closed: {} bid {}", bid.player, bid.value)
        }
        ServerMessage::SolutionResult {
            player,
            valid,
            score,
        } => info!(
            "Solution from {} was {} (score {})",
            player,
            if *valid { "valid" } else { "invalid" },
            score
        ),
        ServerMessage::RoundStarted { state } => {
            info!("Round {}/{} started", state.round, state.max_rounds)
        }
        ServerMessage::GameOver { ranking } => match ranking.first() {
            Some(winner) => info!("Game over: {} wins with {}", winner.name, winner.score),
            None => info!("Game over"),
        },
        _ => {}
    }
}
