//! Integration tests for the session actor.
//!
//! Time is paused, so countdown units elapse as soon as every task is idle.

use std::time::Duration;

use ricochet_core::{load_catalog, CatalogSource, Session, SessionSettings};
use ricochet_protocol::wire::{deserialize_client_message, serialize_client_message};
use ricochet_protocol::{ClientMessage, PhaseKind, PlayerId, ServerMessage};
use ricochet_server::{spawn_session, Outbound, SessionHandle, Target};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;
use tokio_test::assert_ok;

const ALICE: PlayerId = PlayerId(1);
const BOB: PlayerId = PlayerId(2);
const UNIT: Duration = Duration::from_secs(1);

fn start_actor() -> (SessionHandle, UnboundedReceiver<Outbound>) {
    let catalog = load_catalog(CatalogSource::Embedded).unwrap();
    let session = Session::new(catalog, SessionSettings::default(), 11);
    let (handle, outbound, _task) = spawn_session(session, UNIT);
    (handle, outbound)
}

async fn next(outbound: &mut UnboundedReceiver<Outbound>) -> Outbound {
    outbound.recv().await.expect("actor alive")
}

/// Receive until `pred` matches, returning everything seen on the way.
async fn until(
    outbound: &mut UnboundedReceiver<Outbound>,
    pred: impl Fn(&ServerMessage) -> bool,
) -> Vec<ServerMessage> {
    let mut seen = Vec::new();
    loop {
        let out = next(outbound).await;
        let done = pred(&out.message);
        seen.push(out.message);
        if done {
            return seen;
        }
    }
}

/// Everything delivered within `window` of virtual time.
async fn drain_for(
    outbound: &mut UnboundedReceiver<Outbound>,
    window: Duration,
) -> Vec<ServerMessage> {
    let mut seen = Vec::new();
    while let Ok(Some(out)) = timeout(window, outbound.recv()).await {
        seen.push(out.message);
    }
    seen
}

async fn join(
    handle: &SessionHandle,
    outbound: &mut UnboundedReceiver<Outbound>,
    player: PlayerId,
    name: &str,
) {
    assert_ok!(handle.submit(player, ClientMessage::Join { name: name.into() }));
    until(outbound, |m| matches!(m, ServerMessage::PlayersUpdated { .. })).await;
}

#[tokio::test(start_paused = true)]
async fn join_is_unicast_then_broadcast() {
    let (handle, mut outbound) = start_actor();
    assert_ok!(handle.submit(ALICE, ClientMessage::Join { name: "Alice".into() }));

    let first = next(&mut outbound).await;
    assert_eq!(first.target, Target::Player(ALICE));
    assert!(matches!(first.message, ServerMessage::LobbyJoined { .. }));
    let second = next(&mut outbound).await;
    assert_eq!(second.target, Target::All);

    assert_ok!(handle.submit(BOB, ClientMessage::Join { name: "Alice".into() }));
    let rejected = next(&mut outbound).await;
    assert_eq!(
        rejected,
        Outbound {
            target: Target::Player(BOB),
            message: ServerMessage::UsernameTaken,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn countdown_ticks_once_per_unit_until_bidding_closes() {
    let (handle, mut outbound) = start_actor();
    join(&handle, &mut outbound, ALICE, "Alice").await;
    assert_ok!(handle.submit(ALICE, ClientMessage::StartGame));
    assert_ok!(handle.submit(ALICE, ClientMessage::PlaceBid { value: 5 }));

    let start = tokio::time::Instant::now();
    let seen = until(&mut outbound, |m| matches!(m, ServerMessage::BiddingEnded { .. })).await;
    let ticks: Vec<u32> = seen
        .iter()
        .filter_map(|m| match m {
            ServerMessage::TimerTick { remaining } => Some(*remaining),
            _ => None,
        })
        .collect();
    assert_eq!(ticks, (0..60).rev().collect::<Vec<_>>());
    assert_eq!(start.elapsed(), UNIT * 60);

    let state = assert_ok!(handle.snapshot().await);
    assert_eq!(state.phase, PhaseKind::Proving);
    assert_eq!(state.active_player, Some(ALICE));
    assert_eq!(state.countdown, None);
}

#[tokio::test(start_paused = true)]
async fn unanimous_vote_stops_the_countdown() {
    let (handle, mut outbound) = start_actor();
    join(&handle, &mut outbound, ALICE, "Alice").await;
    join(&handle, &mut outbound, BOB, "Bob").await;
    assert_ok!(handle.submit(ALICE, ClientMessage::StartGame));
    assert_ok!(handle.submit(BOB, ClientMessage::PlaceBid { value: 4 }));
    until(&mut outbound, |m| *m == ServerMessage::TimerTick { remaining: 58 }).await;

    assert_ok!(handle.submit(ALICE, ClientMessage::VoteEndBid));
    assert_ok!(handle.submit(BOB, ClientMessage::VoteEndBid));
    let seen = until(&mut outbound, |m| matches!(m, ServerMessage::ProveSolution { .. })).await;
    assert!(seen
        .iter()
        .any(|m| matches!(m, ServerMessage::BiddingEnded { bid } if bid.player == BOB)));

    let later = drain_for(&mut outbound, UNIT * 90).await;
    assert!(
        !later.iter().any(|m| matches!(m, ServerMessage::TimerTick { .. })),
        "cancelled countdown kept ticking: {later:?}"
    );
    let state = assert_ok!(handle.snapshot().await);
    assert_eq!(state.phase, PhaseKind::Proving);
}

#[tokio::test(start_paused = true)]
async fn skipping_starts_a_fresh_countdown_on_next_bid() {
    let (handle, mut outbound) = start_actor();
    join(&handle, &mut outbound, ALICE, "Alice").await;
    assert_ok!(handle.submit(ALICE, ClientMessage::StartGame));
    assert_ok!(handle.submit(ALICE, ClientMessage::PlaceBid { value: 9 }));
    until(&mut outbound, |m| *m == ServerMessage::TimerTick { remaining: 50 }).await;

    assert_ok!(handle.submit(ALICE, ClientMessage::VoteSkip));
    until(&mut outbound, |m| matches!(m, ServerMessage::RoundStarted { .. })).await;
    assert_ok!(handle.submit(ALICE, ClientMessage::PlaceBid { value: 9 }));

    let next_tick = until(&mut outbound, |m| matches!(m, ServerMessage::TimerTick { .. })).await;
    assert_eq!(next_tick.last(), Some(&ServerMessage::TimerTick { remaining: 59 }));
    let state = assert_ok!(handle.snapshot().await);
    assert_eq!(state.round, 1);
}

#[tokio::test(start_paused = true)]
async fn last_player_leaving_resets_the_session() {
    let (handle, mut outbound) = start_actor();
    join(&handle, &mut outbound, ALICE, "Alice").await;
    assert_ok!(handle.submit(ALICE, ClientMessage::StartGame));
    assert_ok!(handle.submit(ALICE, ClientMessage::PlaceBid { value: 2 }));
    until(&mut outbound, |m| matches!(m, ServerMessage::TimerTick { .. })).await;

    assert_ok!(handle.disconnect(ALICE));
    let later = drain_for(&mut outbound, UNIT * 5).await;
    assert!(!later.iter().any(|m| matches!(m, ServerMessage::TimerTick { .. })));

    let state = assert_ok!(handle.snapshot().await);
    assert_eq!(state.phase, PhaseKind::Lobby);
    assert!(state.players.is_empty());
    assert!(state.board.is_none());
}

#[tokio::test(start_paused = true)]
async fn ignored_intents_produce_no_traffic() {
    let (handle, mut outbound) = start_actor();
    assert_ok!(handle.submit(ALICE, ClientMessage::PlaceBid { value: 1 }));
    join(&handle, &mut outbound, ALICE, "Alice").await;
    assert_ok!(handle.submit(ALICE, ClientMessage::VoteEndBid));
    assert_ok!(handle.submit(ALICE, ClientMessage::PlaceBid { value: 1 }));
    assert!(drain_for(&mut outbound, UNIT).await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn actor_stops_when_handles_are_dropped() {
    let catalog = load_catalog(CatalogSource::Embedded).unwrap();
    let session = Session::new(catalog, SessionSettings::default(), 3);
    let (handle, mut outbound, task) = spawn_session(session, UNIT);
    assert_ok!(handle.submit(ALICE, ClientMessage::Join { name: "Alice".into() }));
    assert_ok!(handle.submit(ALICE, ClientMessage::StartGame));
    assert_ok!(handle.submit(ALICE, ClientMessage::PlaceBid { value: 3 }));
    drop(handle);

    assert_ok!(task.await);
    // Whatever was queued before shutdown is still delivered, then the channel closes.
    while outbound.recv().await.is_some() {}
}

#[test]
fn client_messages_survive_the_wire() {
    let msg = ClientMessage::PlaceBid { value: 7 };
    let data = serialize_client_message(&msg).unwrap();
    assert_eq!(deserialize_client_message(&data).unwrap(), msg);
}
