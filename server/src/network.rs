//! Server network layer handling WebSocket sessions and game loop coordination

use crate::client_manager::{outbound_channel, ClientManager, Outbound};
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::game::GameState;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{Command, EntityId, ServerMessage};
use std::net::SocketAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Events sent from connection tasks to the simulation loop
#[derive(Debug)]
pub enum ServerEvent {
    /// A handshake completed. The loop answers with the bound player id,
    /// or `None` when the server is full.
    Connected {
        addr: SocketAddr,
        outbound: Outbound,
        reply: oneshot::Sender<Option<EntityId>>,
    },
    /// A decoded command whose id matches the session's player.
    Command { id: EntityId, command: Command },
    Disconnected { id: EntityId },
}

/// Wall-clock time in unix milliseconds, as stamped on snapshots
pub fn unix_millis() -> u64 {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis();
    millis.min(u64::MAX as u128) as u64
}

/// Main server coordinating networking and game simulation
pub struct Server {
    listener: Option<TcpListener>,
    local_addr: SocketAddr,
    config: ServerConfig,
    game_state: GameState,
    clients: ClientManager,

    events_tx: mpsc::UnboundedSender<ServerEvent>,
    events_rx: mpsc::UnboundedReceiver<ServerEvent>,
}

impl Server {
    /// Validates the configuration, builds the world and binds the listener.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;

        let addr = config.bind_address();
        let listener = TcpListener::bind(addr.as_str())
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;
        info!("Server listening on ws://{}", local_addr);

        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener: Some(listener),
            local_addr,
            game_state: GameState::new(config.sim_config()),
            clients: ClientManager::new(config.max_clients),
            config,
            events_tx,
            events_rx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn game_state_mut(&mut self) -> &mut GameState {
        &mut self.game_state
    }

    pub fn clients(&self) -> &ClientManager {
        &self.clients
    }

    /// Applies one transport event to the session table and the simulation
    pub fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Connected {
                addr,
                outbound,
                reply,
            } => {
                if self.clients.is_full() {
                    warn!("Refusing connection from {}: server full", addr);
                    let _ = reply.send(None);
                    return;
                }

                let id = self.game_state.add_player();
                if !self.clients.add_client(id, addr, outbound) {
                    self.game_state.remove_player(&id);
                    let _ = reply.send(None);
                    return;
                }

                let welcome = ServerMessage::Welcome {
                    id,
                    world: self.game_state.world(),
                };
                match welcome.encode() {
                    Ok(text) => {
                        self.clients.send_to(&id, &text);
                    }
                    Err(e) => error!("Failed to encode welcome for {}: {}", id, e),
                }

                // The connection task may have given up while waiting.
                if reply.send(Some(id)).is_err() {
                    self.clients.remove_client(&id);
                    self.game_state.remove_player(&id);
                }
            }

            ServerEvent::Command { id, command } => {
                if self.clients.touch(&id) {
                    self.game_state.queue_command(command);
                } else {
                    debug!("Command from unknown session {}", id);
                }
            }

            ServerEvent::Disconnected { id } => {
                self.clients.remove_client(&id);
                self.game_state.remove_player(&id);
            }
        }
    }

    /// Serialises the world once and queues it for every session. Returns
    /// how many sessions it was delivered to.
    pub fn broadcast_snapshot(&mut self) -> usize {
        if self.clients.is_empty() {
            return 0;
        }

        let snapshot = self.game_state.snapshot(unix_millis());
        match ServerMessage::Snapshot(snapshot).encode() {
            Ok(text) => self.clients.broadcast(&text),
            Err(e) => {
                error!("Failed to encode snapshot: {}", e);
                0
            }
        }
    }

    /// Main server loop coordinating all operations
    pub async fn run(mut self) -> Result<(), ServerError> {
        let listener = self
            .listener
            .take()
            .ok_or_else(|| ServerError::Config("listener already taken".to_string()))?;
        tokio::spawn(accept_loop(listener, self.events_tx.clone()));

        let mut tick_interval = interval(self.config.tick_duration());
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut snapshot_interval = interval(self.config.snapshot_duration());
        snapshot_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let monitor_every = u64::from(self.config.tick_rate) * 10;

        info!(
            "Server started: {} Hz simulation, {} Hz snapshots, up to {} clients",
            self.config.tick_rate, self.config.snapshot_rate, self.config.max_clients
        );

        loop {
            tokio::select! {
                event = self.events_rx.recv() => {
                    match event {
                        Some(event) => self.handle_event(event),
                        None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                _ = tick_interval.tick() => {
                    self.game_state.step();

                    if self.game_state.tick % monitor_every == 0 {
                        debug!(
                            "Tick {}: {} clients, {} players, {} spiders, {} leaves",
                            self.game_state.tick,
                            self.clients.len(),
                            self.game_state.player_count(),
                            self.game_state.spider_count(),
                            self.game_state.leaf_count()
                        );
                    }
                },

                _ = snapshot_interval.tick() => {
                    self.broadcast_snapshot();
                },
            }
        }

        Ok(())
    }
}

/// Accepts TCP connections and spawns a session task for each
async fn accept_loop(listener: TcpListener, events: mpsc::UnboundedSender<ServerEvent>) {
    while !events.is_closed() {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!("Accepted TCP connection from {}", addr);
                let events = events.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, addr, events).await {
                        warn!("Connection {} closed with error: {}", addr, e);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    }
}

/// Runs one WebSocket session: handshake, registration, then a reader loop
/// while a writer task drains the outbound channel.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    events: mpsc::UnboundedSender<ServerEvent>,
) -> Result<(), ServerError> {
    let ws_stream = accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();

    let (outbound, mut outbound_rx) = outbound_channel();
    let (reply_tx, reply_rx) = oneshot::channel();
    events
        .send(ServerEvent::Connected {
            addr,
            outbound,
            reply: reply_tx,
        })
        .map_err(|_| ServerError::ChannelClosed)?;

    let id = match reply_rx.await {
        Ok(Some(id)) => id,
        Ok(None) => {
            write.send(Message::Close(None)).await?;
            return Ok(());
        }
        Err(_) => return Err(ServerError::ChannelClosed),
    };

    let writer = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if write.send(message).await.is_err() {
                break;
            }
        }
        let _ = write.close().await;
    });

    while let Some(frame) = read.next().await {
        match frame {
            Ok(Message::Text(text)) => match Command::decode(&text) {
                Ok(command) if command.entity_id() == id => {
                    if events.send(ServerEvent::Command { id, command }).is_err() {
                        break;
                    }
                }
                Ok(command) => {
                    debug!(
                        "Client {} sent a command for player {}, dropping",
                        id,
                        command.entity_id()
                    );
                }
                Err(e) => debug!("Dropping message from client {}: {}", id, e),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Read error from client {}: {}", id, e);
                break;
            }
        }
    }

    let _ = events.send(ServerEvent::Disconnected { id });
    // Dropping the session's sender on disconnect ends the writer.
    let _ = writer.await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::InputState;

    fn test_config(max_clients: usize) -> ServerConfig {
        ServerConfig {
            port: 0,
            max_clients,
            seed: Some(7),
            ..ServerConfig::default()
        }
    }

    fn test_addr() -> SocketAddr {
        "127.0.0.1:5000".parse().unwrap()
    }

    /// Feeds a connect event and returns the reply plus the session's
    /// outbound receiver.
    fn connect(
        server: &mut Server,
    ) -> (Option<EntityId>, mpsc::Receiver<Message>) {
        let (outbound, outbound_rx) = outbound_channel();
        let (reply, mut reply_rx) = oneshot::channel();
        server.handle_event(ServerEvent::Connected {
            addr: test_addr(),
            outbound,
            reply,
        });
        (reply_rx.try_recv().unwrap(), outbound_rx)
    }

    fn text_of(message: Message) -> String {
        match message {
            Message::Text(text) => text,
            other => panic!("Unexpected frame {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bind_reports_ephemeral_port() {
        let server = Server::bind(test_config(4)).await.unwrap();
        assert_ne!(server.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_rejects_invalid_config() {
        let config = ServerConfig {
            tick_rate: 0,
            ..test_config(4)
        };
        assert!(matches!(
            Server::bind(config).await,
            Err(ServerError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_sends_welcome() {
        let mut server = Server::bind(test_config(4)).await.unwrap();

        let (id, mut outbound_rx) = connect(&mut server);
        let id = id.unwrap();

        let welcome = ServerMessage::decode(&text_of(outbound_rx.try_recv().unwrap())).unwrap();
        assert_eq!(
            welcome,
            ServerMessage::Welcome {
                id,
                world: server.game_state().world(),
            }
        );
        assert!(server.game_state().registry().player(&id).is_some());
        assert_eq!(server.clients().len(), 1);
    }

    #[tokio::test]
    async fn test_full_server_refuses() {
        let mut server = Server::bind(test_config(1)).await.unwrap();

        let (first, _rx1) = connect(&mut server);
        let (second, mut rx2) = connect(&mut server);

        assert!(first.is_some());
        assert!(second.is_none());
        assert!(rx2.try_recv().is_err());
        assert_eq!(server.game_state().player_count(), 1);
    }

    #[tokio::test]
    async fn test_commands_are_queued_until_tick() {
        let mut server = Server::bind(test_config(4)).await.unwrap();
        let (id, _rx) = connect(&mut server);
        let id = id.unwrap();

        server.handle_event(ServerEvent::Command {
            id,
            command: Command::Input {
                id,
                input: InputState {
                    left: true,
                    ..InputState::default()
                },
            },
        });
        assert_eq!(server.game_state().pending_commands(), 1);
        assert_eq!(server.clients().get(&id).unwrap().commands_received, 1);

        server.game_state_mut().step();
        assert!(server.game_state().registry().player(&id).unwrap().input.left);
    }

    #[tokio::test]
    async fn test_command_from_unknown_session_is_dropped() {
        let mut server = Server::bind(test_config(4)).await.unwrap();
        server.handle_event(ServerEvent::Command {
            id: EntityId(4242),
            command: Command::Attack { id: EntityId(4242) },
        });
        assert_eq!(server.game_state().pending_commands(), 0);
    }

    #[tokio::test]
    async fn test_disconnect_removes_player() {
        let mut server = Server::bind(test_config(4)).await.unwrap();
        let (id, _rx) = connect(&mut server);
        let id = id.unwrap();

        server.handle_event(ServerEvent::Disconnected { id });

        assert!(server.clients().is_empty());
        assert!(server.game_state().registry().player(&id).is_none());
    }

    #[tokio::test]
    async fn test_broadcast_snapshot_reaches_every_session() {
        let mut server = Server::bind(test_config(4)).await.unwrap();
        assert_eq!(server.broadcast_snapshot(), 0);

        let (a, mut rx_a) = connect(&mut server);
        let (b, mut rx_b) = connect(&mut server);
        rx_a.try_recv().unwrap();
        rx_b.try_recv().unwrap();

        server.game_state_mut().step();
        assert_eq!(server.broadcast_snapshot(), 2);

        for rx in [&mut rx_a, &mut rx_b] {
            match ServerMessage::decode(&text_of(rx.try_recv().unwrap())).unwrap() {
                ServerMessage::Snapshot(snapshot) => {
                    assert_eq!(snapshot.tick, 1);
                    let ids: Vec<EntityId> = snapshot.players.iter().map(|p| p.id).collect();
                    assert_eq!(ids, vec![a.unwrap(), b.unwrap()]);
                }
                other => panic!("Expected snapshot, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_stalled_session_does_not_block_broadcast() {
        let mut server = Server::bind(test_config(4)).await.unwrap();
        let (stalled_id, mut stalled_rx) = connect(&mut server);
        let (_, mut healthy_rx) = connect(&mut server);
        healthy_rx.try_recv().unwrap();

        for _ in 0..100 {
            server.game_state_mut().step();
            server.broadcast_snapshot();
            assert!(healthy_rx.try_recv().is_ok());
        }

        let stalled = server.clients().get(&stalled_id.unwrap()).unwrap();
        assert!(stalled.messages_dropped > 0);

        // Welcome plus the snapshots that fit behind it.
        let mut backlog = 0;
        while stalled_rx.try_recv().is_ok() {
            backlog += 1;
        }
        assert_eq!(backlog, crate::client_manager::OUTBOUND_QUEUE_LEN);
    }

    #[test]
    fn test_unix_millis_is_current() {
        // 2020-01-01 in unix milliseconds.
        assert!(unix_millis() > 1_577_836_800_000);
    }
}
