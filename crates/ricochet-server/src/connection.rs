//! Connection bookkeeping.
//!
//! Maps transport client ids to connection-scoped player ids and enforces a per-client
//! inbound message rate.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use ricochet_protocol::PlayerId;

use crate::config::RateLimitConfig;

#[derive(Clone, Debug)]
pub struct ClientConnection {
    pub player_id: PlayerId,
    pub connected_at: Instant,
    rate_window_start: Instant,
    message_count: u32,
}

pub struct ClientRegistry {
    clients: HashMap<u64, ClientConnection>,
    client_of: HashMap<PlayerId, u64>,
    /// Player ids are never reused, so a reconnecting client is a new player.
    next_player: u64,
    rate_limit_messages: u32,
    rate_limit_window: Duration,
}

impl ClientRegistry {
    pub fn new(rate_limit: &RateLimitConfig) -> Self {
        Self {
            clients: HashMap::new(),
            client_of: HashMap::new(),
            next_player: 1,
            rate_limit_messages: rate_limit.messages,
            rate_limit_window: rate_limit.window(),
        }
    }

    /// Register a freshly connected client. Connecting twice returns the existing id.
    pub fn connect(&mut self, client_id: u64, now: Instant) -> PlayerId {
        if let Some(existing) = self.clients.get(&client_id) {
            return existing.player_id;
        }
        let player_id = PlayerId(self.next_player);
        self.next_player += 1;
        self.clients.insert(
            client_id,
            ClientConnection {
                player_id,
                connected_at: now,
                rate_window_start: now,
                message_count: 0,
            },
        );
        self.client_of.insert(player_id, client_id);
        player_id
    }

    pub fn disconnect(&mut self, client_id: u64) -> Option<PlayerId> {
        let connection = self.clients.remove(&client_id)?;
        self.client_of.remove(&connection.player_id);
        Some(connection.player_id)
    }

    pub fn player(&self, client_id: u64) -> Option<PlayerId> {
        self.clients.get(&client_id).map(|c| c.player_id)
    }

    pub fn client(&self, player_id: PlayerId) -> Option<u64> {
        self.client_of.get(&player_id).copied()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Check and update the rate limit for a client.
    /// Returns true if the message is allowed, false if rate limited.
    pub fn check_rate_limit(&mut self, client_id: u64, now: Instant) -> bool {
        let Some(connection) = self.clients.get_mut(&client_id) else {
            return false;
        };

        if now.duration_since(connection.rate_window_start) >= self.rate_limit_window {
            connection.rate_window_start = now;
            connection.message_count = 0;
        }

        connection.message_count += 1;
        connection.message_count <= self.rate_limit_messages
    }
}
