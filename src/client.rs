//! Client struct definition
//!
//! Represents a connected client's outbound channel. Profile and room
//! assignment live in the `ConnectionRegistry`; this is only the handle
//! used to address the connection.

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::message::ServerMessage;
use crate::types::ClientId;

/// Connected client handle
#[derive(Debug)]
pub struct Client {
    /// Unique identifier for this client
    pub id: ClientId,
    /// Server → Client message channel
    pub sender: mpsc::Sender<ServerMessage>,
}

impl Client {
    /// Create a new client with the given ID and sender channel
    pub fn new(id: ClientId, sender: mpsc::Sender<ServerMessage>) -> Self {
        Self { id, sender }
    }

    /// Queue a message for this client without waiting
    ///
    /// Returns an error if the channel is closed (client disconnected)
    /// or full (client not keeping up).
    pub fn try_send(&self, msg: ServerMessage) -> Result<(), SendError> {
        self.sender.try_send(msg).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_try_send() {
        let (tx, mut rx) = mpsc::channel(32);
        let client = Client::new(ClientId::new(), tx);

        client.try_send(ServerMessage::SearchTimeout).unwrap();
        assert_eq!(rx.recv().await, Some(ServerMessage::SearchTimeout));
    }

    #[test]
    fn test_client_send_closed() {
        let (tx, rx) = mpsc::channel(32);
        let client = Client::new(ClientId::new(), tx);
        drop(rx);

        let result = client.try_send(ServerMessage::SearchTimeout);
        assert!(matches!(result, Err(SendError::ChannelClosed)));
    }

    #[test]
    fn test_client_send_full() {
        let (tx, _rx) = mpsc::channel(1);
        let client = Client::new(ClientId::new(), tx);

        client.try_send(ServerMessage::SearchTimeout).unwrap();
        let result = client.try_send(ServerMessage::SearchTimeout);
        assert!(matches!(result, Err(SendError::ChannelFull)));
    }
}
