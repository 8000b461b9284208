//! WebSocket connection handler
//!
//! Handles individual client connections: WebSocket handshake,
//! message parsing, and bidirectional communication with the ChatServer.
//! Also provides the accept loop used by the binary.

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::message::{ClientMessage, ServerMessage};
use crate::server::ServerCommand;
use crate::types::ClientId;

/// Per-connection outbound buffer; events beyond this are dropped
const CLIENT_CHANNEL_SIZE: usize = 64;

/// Accept connections forever, spawning a handler for each
pub async fn accept_loop(listener: TcpListener, cmd_tx: mpsc::Sender<ServerCommand>) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                debug!("New connection from {}", addr);
                let cmd_tx = cmd_tx.clone();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Handle a new TCP connection
///
/// Performs WebSocket handshake, sets up bidirectional communication,
/// and manages the connection lifecycle.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    // WebSocket handshake
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let client_id = ClientId::new();
    info!("Client {} connected from {}", client_id, peer_addr);

    // Tell the client its id before anything else can be queued
    let connected_msg = ServerMessage::Connected { client_id };
    let json = serde_json::to_string(&connected_msg)?;
    ws_sender.send(Message::Text(json.into())).await?;

    // Create channel for server -> client messages
    let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(CLIENT_CHANNEL_SIZE);

    // Register with ChatServer
    if cmd_tx
        .send(ServerCommand::Connect {
            client_id,
            sender: msg_tx.clone(),
        })
        .await
        .is_err()
    {
        error!("Failed to register client {} - server closed", client_id);
        return Err(AppError::ChannelSend);
    }

    let cmd_tx_read = cmd_tx.clone();

    // Spawn read task (WebSocket -> ServerCommand)
    let mut read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => {
                        let cmd = client_message_to_command(client_id, client_msg);
                        if cmd_tx_read.send(cmd).await.is_err() {
                            debug!("Server closed, ending read task for {}", client_id);
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Invalid JSON from {}: {}", client_id, e);
                        let _ = msg_tx.try_send(AppError::from(e).into());
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!("Client {} sent close frame", client_id);
                    break;
                }
                Ok(_) => {
                    // Binary, ping and pong frames - pong is handled by tungstenite
                }
                Err(e) => {
                    error!("WebSocket error for {}: {}", client_id, e);
                    break;
                }
            }
        }
        debug!("Read task ended for {}", client_id);
    });

    // Spawn write task (ServerMessage -> WebSocket)
    let mut write_task = tokio::spawn(async move {
        while let Some(msg) = msg_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        debug!("WebSocket send failed, ending write task");
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                }
            }
        }

        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete, then stop the other one
    tokio::select! {
        _ = &mut read_task => {
            debug!("Read task completed for {}", client_id);
        }
        _ = &mut write_task => {
            debug!("Write task completed for {}", client_id);
        }
    }
    read_task.abort();
    write_task.abort();

    // Send disconnect command
    let _ = cmd_tx.send(ServerCommand::Disconnect { client_id }).await;

    info!("Client {} disconnected", client_id);

    Ok(())
}

/// Convert a ClientMessage to a ServerCommand
fn client_message_to_command(client_id: ClientId, msg: ClientMessage) -> ServerCommand {
    match msg {
        ClientMessage::FindMatch { avatar, nickname } => ServerCommand::FindMatch {
            client_id,
            avatar,
            nickname,
        },
        ClientMessage::CancelSearch => ServerCommand::CancelSearch { client_id },
        ClientMessage::JoinRoom { room_id } => ServerCommand::JoinRoom { client_id, room_id },
        ClientMessage::SendMessage { room_id, message } => ServerCommand::SendMessage {
            client_id,
            room_id,
            content: message,
        },
        ClientMessage::Typing { room_id, is_typing } => ServerCommand::Typing {
            client_id,
            room_id,
            is_typing,
        },
        ClientMessage::LeaveRoom { room_id } => ServerCommand::LeaveRoom { client_id, room_id },
        ClientMessage::ReportUser {
            room_id,
            reason,
            reported_user_id,
        } => ServerCommand::ReportUser {
            client_id,
            room_id,
            reported_user_id,
            reason,
        },
        ClientMessage::BlockUser {
            room_id,
            blocked_user_id,
        } => ServerCommand::BlockUser {
            client_id,
            room_id,
            blocked_user_id,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RoomId;

    #[test]
    fn test_send_message_maps_to_command() {
        let client_id = ClientId::new();
        let msg = ClientMessage::SendMessage {
            room_id: RoomId::from("r1"),
            message: "hi".to_string(),
        };

        match client_message_to_command(client_id, msg) {
            ServerCommand::SendMessage {
                client_id: id,
                room_id,
                content,
            } => {
                assert_eq!(id, client_id);
                assert_eq!(room_id, RoomId::from("r1"));
                assert_eq!(content, "hi");
            }
            other => panic!("Wrong command: {:?}", other),
        }
    }

    #[test]
    fn test_block_user_maps_to_command() {
        let client_id = ClientId::new();
        let blocked = ClientId::new();
        let msg = ClientMessage::BlockUser {
            room_id: RoomId::from("r1"),
            blocked_user_id: blocked,
        };

        assert!(matches!(
            client_message_to_command(client_id, msg),
            ServerCommand::BlockUser { blocked_user_id, .. } if blocked_user_id == blocked
        ));
    }
}
