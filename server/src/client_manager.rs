//! Session bookkeeping for connected WebSocket clients
//!
//! This module tracks every live session on the simulation side, including:
//! - Session lifecycle (admit, remove) and capacity enforcement
//! - The bounded outbound queue each session's writer task drains
//! - Per-session traffic counters for monitoring
//!
//! The manager is owned by the simulation task, so it never needs a lock.
//! Writer tasks only ever see the receiving half of their channel.
//!
//! Every snapshot is the complete world, so a session whose queue is full
//! simply misses frames until its writer catches up.

use log::{debug, info};
use shared::EntityId;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_tungstenite::tungstenite::Message;

/// Frames a session may have waiting for its socket.
pub const OUTBOUND_QUEUE_LEN: usize = 8;

/// Outbound half of a session's writer channel.
pub type Outbound = mpsc::Sender<Message>;

/// Creates the queue between the simulation and one session's writer.
pub fn outbound_channel() -> (Outbound, mpsc::Receiver<Message>) {
    mpsc::channel(OUTBOUND_QUEUE_LEN)
}

/// One connected client and the player bound to it
///
/// Each session maintains:
/// - The player id every inbound command must carry
/// - The queue used to push frames to the socket writer
/// - Traffic counters
#[derive(Debug)]
pub struct Client {
    /// Player bound to this session for its whole lifetime
    pub id: EntityId,
    /// Peer address, for logging
    pub addr: SocketAddr,
    pub connected_at: Instant,
    pub commands_received: u64,
    pub messages_sent: u64,
    /// Frames skipped because the queue was full
    pub messages_dropped: u64,
    sender: Outbound,
}

impl Client {
    pub fn new(id: EntityId, addr: SocketAddr, sender: Outbound) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
            commands_received: 0,
            messages_sent: 0,
            messages_dropped: 0,
            sender,
        }
    }

    /// Queues a text frame for the writer task without waiting
    ///
    /// Returns false when the frame was not queued: either the writer has
    /// gone away or it is too far behind, in which case the frame is dropped.
    pub fn send_text(&mut self, text: &str) -> bool {
        match self.sender.try_send(Message::Text(text.to_string())) {
            Ok(()) => {
                self.messages_sent += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                self.messages_dropped += 1;
                debug!("Client {} is lagging, dropped a frame", self.id);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// All live sessions, keyed by the player each one controls
///
/// Enforces the connection cap and fans snapshots out to every session.
pub struct ClientManager {
    clients: HashMap<EntityId, Client>,
    max_clients: usize,
}

impl ClientManager {
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            max_clients,
        }
    }

    pub fn max_clients(&self) -> usize {
        self.max_clients
    }

    pub fn is_full(&self) -> bool {
        self.clients.len() >= self.max_clients
    }

    /// Registers a session for `id`
    ///
    /// Returns false when the server is at capacity or the id is already
    /// bound to another session.
    pub fn add_client(&mut self, id: EntityId, addr: SocketAddr, sender: Outbound) -> bool {
        if self.is_full() || self.clients.contains_key(&id) {
            return false;
        }

        info!("Client {} connected from {}", id, addr);
        self.clients.insert(id, Client::new(id, addr, sender));
        true
    }

    /// Drops a session. Returns true if it was still registered.
    pub fn remove_client(&mut self, id: &EntityId) -> bool {
        if let Some(client) = self.clients.remove(id) {
            info!(
                "Client {} disconnected after {:.1}s ({} commands in, {} messages out, {} dropped)",
                client.id,
                client.connected_at.elapsed().as_secs_f32(),
                client.commands_received,
                client.messages_sent,
                client.messages_dropped
            );
            true
        } else {
            false
        }
    }

    /// Counts an inbound command. Returns false for an unknown session.
    pub fn touch(&mut self, id: &EntityId) -> bool {
        if let Some(client) = self.clients.get_mut(id) {
            client.commands_received += 1;
            true
        } else {
            false
        }
    }

    pub fn get(&self, id: &EntityId) -> Option<&Client> {
        self.clients.get(id)
    }

    pub fn send_to(&mut self, id: &EntityId, text: &str) -> bool {
        match self.clients.get_mut(id) {
            Some(client) => client.send_text(text),
            None => false,
        }
    }

    /// Sends the same text to every session
    ///
    /// Returns how many sessions queued the frame. A lagging session misses
    /// this frame. A session whose writer has already exited is skipped here
    /// and removed by its disconnect event.
    pub fn broadcast(&mut self, text: &str) -> usize {
        self.clients
            .values_mut()
            .map(|client| client.send_text(text))
            .filter(|queued| *queued)
            .count()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
