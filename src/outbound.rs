//! Outbound event delivery
//!
//! The core never touches sockets. It emits events through `Outbound`,
//! addressed by `ClientId`. `Connections` is the channel-backed
//! implementation used by the running server.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::debug;

use crate::client::Client;
use crate::message::ServerMessage;
use crate::types::ClientId;

/// Outbound event sink
///
/// Delivery is fire-and-forget: an event for an unknown or unreachable
/// connection is dropped.
pub trait Outbound {
    /// Deliver to one connection
    fn notify(&mut self, client_id: ClientId, msg: ServerMessage);

    /// Deliver to every member of a room
    fn broadcast_room(&mut self, members: &[ClientId], msg: ServerMessage) {
        for member in members {
            self.notify(*member, msg.clone());
        }
    }

    /// Deliver to every connection
    fn broadcast_all(&mut self, msg: ServerMessage);
}

/// All connected clients: ClientId -> Client
#[derive(Debug, Default)]
pub struct Connections {
    clients: HashMap<ClientId, Client>,
}

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a connection addressable
    pub fn attach(&mut self, client_id: ClientId, sender: mpsc::Sender<ServerMessage>) {
        self.clients.insert(client_id, Client::new(client_id, sender));
    }

    /// Forget a connection; returns whether it was attached
    pub fn detach(&mut self, client_id: ClientId) -> bool {
        self.clients.remove(&client_id).is_some()
    }

    pub fn contains(&self, client_id: ClientId) -> bool {
        self.clients.contains_key(&client_id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Outbound for Connections {
    fn notify(&mut self, client_id: ClientId, msg: ServerMessage) {
        let Some(client) = self.clients.get(&client_id) else {
            debug!("Dropping message for unknown client {}", client_id);
            return;
        };

        if let Err(e) = client.try_send(msg) {
            debug!("Dropping message for {}: {}", client_id, e);
        }
    }

    fn broadcast_all(&mut self, msg: ServerMessage) {
        for client in self.clients.values() {
            if let Err(e) = client.try_send(msg.clone()) {
                debug!("Dropping broadcast for {}: {}", client.id, e);
            }
        }
    }
}
