//! Renet channel configuration.
//!
//! Channel 0: ReliableOrdered - intents and game events
//! Channel 1: ReliableUnordered - chat

use std::time::Duration;

use renet::{ChannelConfig, ConnectionConfig};
use ricochet_protocol::ServerMessage;

pub mod channel_id {
    /// Game intents and state events - must arrive in order
    pub const COMMANDS: u8 = 0;
    /// Chat relay - reliable but order less critical
    pub const CHAT: u8 = 1;
}

const MAX_CHANNEL_MEMORY: usize = 5 * 1024 * 1024; // 5 MB

pub fn create_channel_configs() -> Vec<ChannelConfig> {
    vec![
        ChannelConfig {
            channel_id: channel_id::COMMANDS,
            max_memory_usage_bytes: MAX_CHANNEL_MEMORY,
            send_type: renet::SendType::ReliableOrdered {
                resend_time: Duration::from_millis(300),
            },
        },
        ChannelConfig {
            channel_id: channel_id::CHAT,
            max_memory_usage_bytes: MAX_CHANNEL_MEMORY / 2,
            send_type: renet::SendType::ReliableUnordered {
                resend_time: Duration::from_millis(300),
            },
        },
    ]
}

pub fn connection_config() -> ConnectionConfig {
    ConnectionConfig {
        available_bytes_per_tick: 60_000,
        server_channels_config: create_channel_configs(),
        client_channels_config: create_channel_configs(),
    }
}

/// Channel an outbound message travels on.
pub fn channel_for(message: &ServerMessage) -> u8 {
    match message {
        ServerMessage::ChatMessage { .. } => channel_id::CHAT,
        _ => channel_id::COMMANDS,
    }
}
