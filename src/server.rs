//! ChatServer Actor implementation
//!
//! The central actor that owns the matchmaking core and every connection
//! handle. Commands from connection handlers, search timeouts and reaper
//! ticks are all processed here one at a time, so no locks are needed.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::engine::{CoreStats, MatchCore};
use crate::message::ServerMessage;
use crate::outbound::{Connections, Outbound};
use crate::reaper::ReaperTask;
use crate::types::{ClientId, Profile, RoomId};

/// Commands sent from handlers to the ChatServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New client connected
    Connect {
        client_id: ClientId,
        sender: mpsc::Sender<ServerMessage>,
    },
    /// Client disconnected
    Disconnect { client_id: ClientId },
    /// Start searching for a partner
    FindMatch {
        client_id: ClientId,
        avatar: String,
        nickname: String,
    },
    /// Stop searching
    CancelSearch { client_id: ClientId },
    /// Exchange partner profiles
    JoinRoom { client_id: ClientId, room_id: RoomId },
    /// Send a chat message
    SendMessage {
        client_id: ClientId,
        room_id: RoomId,
        content: String,
    },
    /// Typing indicator
    Typing {
        client_id: ClientId,
        room_id: RoomId,
        is_typing: bool,
    },
    /// Leave the room
    LeaveRoom { client_id: ClientId, room_id: RoomId },
    /// Report the partner
    ReportUser {
        client_id: ClientId,
        room_id: RoomId,
        reported_user_id: ClientId,
        reason: String,
    },
    /// Block the partner
    BlockUser {
        client_id: ClientId,
        room_id: RoomId,
        blocked_user_id: ClientId,
    },
    /// Snapshot of server counters
    Stats { reply: oneshot::Sender<ServerStats> },
}

impl ServerCommand {
    /// Connection that issued the command, if it comes from one
    ///
    /// `Connect` is excluded: it is the command that attaches the id.
    pub fn issuer(&self) -> Option<ClientId> {
        match self {
            ServerCommand::Connect { .. } | ServerCommand::Stats { .. } => None,
            ServerCommand::Disconnect { client_id }
            | ServerCommand::FindMatch { client_id, .. }
            | ServerCommand::CancelSearch { client_id }
            | ServerCommand::JoinRoom { client_id, .. }
            | ServerCommand::SendMessage { client_id, .. }
            | ServerCommand::Typing { client_id, .. }
            | ServerCommand::LeaveRoom { client_id, .. }
            | ServerCommand::ReportUser { client_id, .. }
            | ServerCommand::BlockUser { client_id, .. } => Some(*client_id),
        }
    }
}

/// Server counters returned by `ServerCommand::Stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServerStats {
    /// Open connections
    pub connections: usize,
    pub core: CoreStats,
}

/// The main ChatServer actor
pub struct ChatServer {
    core: MatchCore,
    connections: Connections,
    reaper: ReaperTask,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl ChatServer {
    /// Create a new ChatServer with the given command receiver
    pub fn new(config: &ServerConfig, receiver: mpsc::Receiver<ServerCommand>) -> Self {
        Self::with_core(config, MatchCore::new(config.search_timeout), receiver)
    }

    /// Create a ChatServer around a pre-built core (custom clock or room ids)
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_core(
        config: &ServerConfig,
        core: MatchCore,
        receiver: mpsc::Receiver<ServerCommand>,
    ) -> Self {
        Self {
            core,
            connections: Connections::new(),
            reaper: ReaperTask::new(config.reap_interval, config.room_max_age),
            receiver,
        }
    }

    /// Run the ChatServer event loop
    ///
    /// Continuously processes commands, search timeouts and reaper ticks
    /// until all command senders are dropped.
    pub async fn run(mut self) {
        info!(
            "ChatServer started (reap every {:?}, max room age {:?})",
            self.reaper.period(),
            self.reaper.max_age()
        );

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    self.handle_command(cmd);
                }
                Some(client_id) = self.core.next_search_timeout() => {
                    self.core.search_timed_out(client_id, &mut self.connections);
                }
                _ = self.reaper.tick() => {
                    let max_age = self.reaper.max_age();
                    self.core.reap(max_age, &mut self.connections);
                }
            }
        }

        info!("ChatServer shutting down");
    }

    /// Process a single command
    ///
    /// Commands from a connection that is not attached (never connected, or
    /// already disconnected) are dropped.
    pub fn handle_command(&mut self, cmd: ServerCommand) {
        if let Some(client_id) = cmd.issuer() {
            if !self.connections.contains(client_id) {
                debug!("Ignoring command from detached client {}", client_id);
                return;
            }
        }

        match cmd {
            ServerCommand::Connect { client_id, sender } => {
                self.handle_connect(client_id, sender);
            }
            ServerCommand::Disconnect { client_id } => {
                self.handle_disconnect(client_id);
            }
            ServerCommand::FindMatch {
                client_id,
                avatar,
                nickname,
            } => {
                let profile = Profile::new(avatar, nickname);
                self.core.find_match(client_id, profile, &mut self.connections);
            }
            ServerCommand::CancelSearch { client_id } => {
                self.core.cancel_search(client_id);
            }
            ServerCommand::JoinRoom { client_id, room_id } => {
                self.core.join_room(client_id, &room_id, &mut self.connections);
            }
            ServerCommand::SendMessage {
                client_id,
                room_id,
                content,
            } => {
                self.core.send_message(client_id, &room_id, content, &mut self.connections);
            }
            ServerCommand::Typing {
                client_id,
                room_id,
                is_typing,
            } => {
                self.core.typing(client_id, &room_id, is_typing, &mut self.connections);
            }
            ServerCommand::LeaveRoom { client_id, room_id } => {
                self.core.leave_room(client_id, &room_id, &mut self.connections);
            }
            ServerCommand::ReportUser {
                client_id,
                room_id,
                reported_user_id,
                reason,
            } => {
                self.core.report_user(
                    client_id,
                    &room_id,
                    reported_user_id,
                    &reason,
                    &mut self.connections,
                );
            }
            ServerCommand::BlockUser {
                client_id,
                room_id,
                blocked_user_id,
            } => {
                self.core.block_user(
                    client_id,
                    &room_id,
                    blocked_user_id,
                    &mut self.connections,
                );
            }
            ServerCommand::Stats { reply } => {
                let _ = reply.send(self.stats());
            }
        }
    }

    pub fn stats(&self) -> ServerStats {
        ServerStats {
            connections: self.connections.len(),
            core: self.core.stats(),
        }
    }

    /// Handle new client connection
    fn handle_connect(&mut self, client_id: ClientId, sender: mpsc::Sender<ServerMessage>) {
        info!("Client {} connected", client_id);
        self.connections.attach(client_id, sender);
        self.broadcast_user_count();
    }

    /// Handle client disconnection
    fn handle_disconnect(&mut self, client_id: ClientId) {
        info!("Client {} disconnected", client_id);

        self.core.disconnect(client_id, &mut self.connections);
        self.connections.detach(client_id);
        self.broadcast_user_count();
    }

    fn broadcast_user_count(&mut self) {
        let count = self.connections.len();
        self.connections.broadcast_all(ServerMessage::UserCount { count });
        debug!("Total clients: {}, {:?}", count, self.core.stats());
    }
}
