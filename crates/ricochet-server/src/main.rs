//! Ricochet multiplayer server
//!
//! Runs one bidding session over renet. Usage: `ricochet-server [config.yaml]`.

use std::time::Instant;

use renet::{RenetServer, ServerEvent};
use ricochet_core::{load_catalog, CatalogSource, Session};
use ricochet_protocol::wire::{deserialize_client_message, serialize_server_message};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ricochet_server::{
    channel_for, channel_id, connection_config, spawn_session, ClientRegistry, Outbound,
    ServerConfig, ServerRunner, SessionHandle, Target, TransportConfig, PROTOCOL_ID,
};

struct Server {
    renet: RenetServer,
    clients: ClientRegistry,
    session: SessionHandle,
    outbound: mpsc::UnboundedReceiver<Outbound>,
}

impl Server {
    fn new(
        config: &ServerConfig,
        session: SessionHandle,
        outbound: mpsc::UnboundedReceiver<Outbound>,
    ) -> Self {
        Self {
            renet: RenetServer::new(connection_config()),
            clients: ClientRegistry::new(&config.rate_limit),
            session,
            outbound,
        }
    }

    /// Route connection events and inbound messages to the session.
    fn process_inbound(&mut self) {
        while let Some(event) = self.renet.get_event() {
            self.handle_server_event(event);
        }

        for client_id in self.renet.clients_id() {
            for channel in [channel_id::COMMANDS, channel_id::CHAT] {
                while let Some(message) = self.renet.receive_message(client_id, channel) {
                    self.handle_client_message(client_id, &message);
                }
            }
        }
    }

    fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::ClientConnected { client_id } => {
                let player = self.clients.connect(client_id, Instant::now());
                info!("Client {:?} connected as {}", client_id, player);
            }
            ServerEvent::ClientDisconnected { client_id, reason } => {
                info!("Client {:?} disconnected: {:?}", client_id, reason);
                if let Some(player) = self.clients.disconnect(client_id) {
                    if self.session.disconnect(player).is_err() {
                        error!("Session stopped; cannot report disconnect of {}", player);
                    }
                }
            }
        }
    }

    fn handle_client_message(&mut self, client_id: u64, data: &[u8]) {
        if !self.clients.check_rate_limit(client_id, Instant::now()) {
            warn!("Rate limit exceeded for client {:?}", client_id);
            return;
        }
        let Some(player) = self.clients.player(client_id) else {
            return;
        };

        let message = match deserialize_client_message(data) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Failed to deserialize message from {:?}: {}", client_id, e);
                return;
            }
        };

        if self.session.submit(player, message).is_err() {
            error!("Session stopped; dropping message from {}", player);
        }
    }

    /// Queue everything the session produced since the last tick.
    fn process_outbound(&mut self) {
        while let Ok(Outbound { target, message }) = self.outbound.try_recv() {
            let data = match serialize_server_message(&message) {
                Ok(data) => data,
                Err(e) => {
                    error!("Failed to serialize {}: {}", message.event_name(), e);
                    continue;
                }
            };
            let channel = channel_for(&message);
            match target {
                Target::All => self.renet.broadcast_message(channel, data),
                Target::Player(player) => match self.clients.client(player) {
                    Some(client_id) => self.renet.send_message(client_id, channel, data),
                    None => warn!(
                        "No connection for {}; dropping {}",
                        player,
                        message.event_name()
                    ),
                },
            }
        }
    }
}

fn load_config() -> Result<ServerConfig, ricochet_server::ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading config from {}", path);
            ServerConfig::load(path)
        }
        None => Ok(ServerConfig::default()),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ricochet_server=info")),
        )
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let source = match &config.catalog_path {
        Some(path) => CatalogSource::Path(path.clone()),
        None => CatalogSource::Embedded,
    };
    let catalog = match load_catalog(source) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to load tile catalog: {}", e);
            std::process::exit(1);
        }
    };
    info!("Loaded {} tiles", catalog.len());

    let seed = config.seed.unwrap_or_else(rand::random);
    let session = Session::new(catalog, config.session_settings(), seed);
    let (handle, outbound, _actor) = spawn_session(session, config.countdown.period());

    let transport_config = TransportConfig {
        public_address: config.bind_address,
        max_clients: config.max_clients,
        private_key: None, // Unsecure mode for development
    };
    let mut transport = match ServerRunner::new(transport_config) {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to create transport: {}", e);
            std::process::exit(1);
        }
    };

    info!("Ricochet Server v{}", env!("CARGO_PKG_VERSION"));
    if let Some(addr) = transport.local_addr() {
        info!("Listening on {}", addr);
    }
    info!("Protocol ID: {:016x}", PROTOCOL_ID);

    let mut server = Server::new(&config, handle, outbound);
    let tick = config.tick_duration();
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        transport.receive(&mut server.renet, tick);
        server.process_inbound();
        // Let the actor run before draining, so replies go out on this tick.
        tokio::task::yield_now().await;
        server.process_outbound();
        transport.send(&mut server.renet);
    }
}
