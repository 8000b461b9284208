//! Test helpers shared by unit tests

use crate::message::ServerMessage;
use crate::outbound::Outbound;
use crate::types::ClientId;

#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Client(ClientId),
    All,
}

/// Outbound sink that records every delivery
#[derive(Debug, Default)]
pub struct Recorder {
    pub sent: Vec<(Target, ServerMessage)>,
}

impl Recorder {
    pub fn messages_for(&self, client_id: ClientId) -> Vec<ServerMessage> {
        self.sent
            .iter()
            .filter(|(target, _)| *target == Target::Client(client_id))
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl Outbound for Recorder {
    fn notify(&mut self, client_id: ClientId, msg: ServerMessage) {
        self.sent.push((Target::Client(client_id), msg));
    }

    fn broadcast_all(&mut self, msg: ServerMessage) {
        self.sent.push((Target::All, msg));
    }
}
