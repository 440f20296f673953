//! Transport layer using renet_netcode for UDP communication.
//!
//! Handles socket binding, authentication, and packet routing.

use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, SystemTime, SystemTimeError, UNIX_EPOCH};

use renet::RenetServer;
use renet_netcode::{NetcodeServerTransport, ServerAuthentication, ServerConfig};
use tracing::{error, info};

/// Protocol ID for Ricochet (must match client)
pub const PROTOCOL_ID: u64 = 0x0052_1C0C_4E70_0001;

pub struct TransportConfig {
    /// Public address for clients to connect
    pub public_address: SocketAddr,
    pub max_clients: usize,
    /// Optional private key for secure authentication (32 bytes)
    /// If None, uses unsecure authentication (for development)
    pub private_key: Option<[u8; 32]>,
}

/// Creates server transport with netcode authentication
pub fn create_server_transport(
    config: TransportConfig,
) -> Result<NetcodeServerTransport, TransportError> {
    let socket = UdpSocket::bind(config.public_address)
        .map_err(|e| TransportError::BindFailed(config.public_address, e))?;

    let bound_addr = socket
        .local_addr()
        .map_err(|e| TransportError::LocalAddrFailed(config.public_address, e))?;

    socket
        .set_nonblocking(true)
        .map_err(TransportError::SocketConfig)?;

    let current_time = SystemTime::now().duration_since(UNIX_EPOCH)?;

    let authentication = match config.private_key {
        Some(key) => ServerAuthentication::Secure { private_key: key },
        None => ServerAuthentication::Unsecure,
    };

    let server_config = ServerConfig {
        current_time,
        max_clients: config.max_clients,
        protocol_id: PROTOCOL_ID,
        public_addresses: vec![bound_addr],
        authentication,
    };

    let transport = NetcodeServerTransport::new(server_config, socket)
        .map_err(|e| TransportError::TransportCreation(e.to_string()))?;

    info!(
        "Transport bound to {} (max {} clients, protocol {:016x})",
        bound_addr, config.max_clients, PROTOCOL_ID
    );

    Ok(transport)
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to bind socket to {0}: {1}")]
    BindFailed(SocketAddr, std::io::Error),

    #[error("Failed to determine bound address for {0}: {1}")]
    LocalAddrFailed(SocketAddr, std::io::Error),

    #[error("Failed to configure socket: {0}")]
    SocketConfig(std::io::Error),

    #[error("System clock is before the unix epoch: {0}")]
    Clock(#[from] SystemTimeError),

    #[error("Failed to create transport: {0}")]
    TransportCreation(String),
}

/// Drives a `NetcodeServerTransport` alongside the `RenetServer` it feeds.
pub struct ServerRunner {
    transport: NetcodeServerTransport,
}

impl ServerRunner {
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let transport = create_server_transport(config)?;
        Ok(Self { transport })
    }

    /// Advance connection state and pull packets off the socket.
    pub fn receive(&mut self, renet_server: &mut RenetServer, delta: Duration) {
        renet_server.update(delta);
        if let Err(e) = self.transport.update(delta, renet_server) {
            error!("Transport update error: {}", e);
        }
    }

    /// Flush queued messages to the network.
    pub fn send(&mut self, renet_server: &mut RenetServer) {
        self.transport.send_packets(renet_server);
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.transport.addresses().first().copied()
    }
}
