//! Ricochet multiplayer server
//!
//! Authoritative server using Renet for networking. One session per process; every connection
//! plays in it.

pub mod actor;
pub mod channels;
pub mod config;
pub mod connection;
pub mod transport;

pub use actor::{spawn_session, Outbound, SessionClosed, SessionHandle, Target};
pub use channels::*;
pub use config::{ConfigError, CountdownConfig, RateLimitConfig, ServerConfig};
pub use connection::ClientRegistry;
pub use transport::{ServerRunner, TransportConfig, TransportError, PROTOCOL_ID};
