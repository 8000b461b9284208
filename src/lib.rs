//! Anonymous 1:1 Matchmaking Chat Server Library
//!
//! A WebSocket chat server built with tokio-tungstenite that pairs
//! strangers for ephemeral two-person chats, using the Actor pattern for
//! state management.
//!
//! # Features
//! - Anonymous matchmaking through a first-fit waiting queue
//! - Search timeout for participants nobody was matched with
//! - Permanent blocks that keep two participants from ever being paired
//! - Message and typing relay restricted to room members
//! - Reports (logged only)
//! - Periodic reaping of rooms past their maximum age
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor; it owns a `MatchCore` holding the
//!   block list, participant registry, waiting queue and rooms
//! - Each connection has a `handler` task communicating with the server
//! - Search timeouts and the room reaper are driven from the actor's own
//!   select loop, so every state change happens on one thread of control
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use pairchat::{accept_loop, ChatServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::default();
//!     let listener = TcpListener::bind(&config.bind_addr).await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(config.command_buffer);
//!
//!     tokio::spawn(ChatServer::new(&config, cmd_rx).run());
//!     accept_loop(listener, cmd_tx).await;
//! }
//! ```

pub mod blocklist;
pub mod client;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod handler;
pub mod matcher;
pub mod message;
pub mod outbound;
pub mod reaper;
pub mod registry;
pub mod room;
pub mod server;
pub mod types;
pub mod waiting;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use blocklist::BlockList;
pub use client::Client;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ServerConfig;
pub use engine::{CoreStats, MatchCore};
pub use error::{AppError, SendError};
pub use handler::{accept_loop, handle_connection};
pub use message::{ClientMessage, EndReason, ErrorCode, ServerMessage};
pub use outbound::{Connections, Outbound};
pub use reaper::ReaperTask;
pub use registry::{ConnectionRegistry, Participant};
pub use room::{Room, RoomRegistry};
pub use server::{ChatServer, ServerCommand, ServerStats};
pub use types::{ClientId, Profile, RandomRoomIds, RoomId, RoomIdSource};
pub use waiting::WaitingQueue;
