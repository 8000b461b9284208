//! Message protocol definitions
//!
//! JSON-based bidirectional message protocol using Serde's tagged enum
//! for type-safe serialization/deserialization. Event names and fields
//! are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::{ClientId, RoomId};

/// Client → Server message
///
/// `connect` and `disconnect` are not messages; they come from the
/// connection lifecycle itself.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Start searching for a partner
    FindMatch { avatar: String, nickname: String },
    /// Stop searching
    CancelSearch,
    /// Ask for the partner's profile in a matched room
    JoinRoom { room_id: RoomId },
    /// Send a chat message to the partner
    SendMessage { room_id: RoomId, message: String },
    /// Typing indicator on/off
    Typing { room_id: RoomId, is_typing: bool },
    /// Leave the room
    LeaveRoom { room_id: RoomId },
    /// Report the partner (logged only)
    ReportUser {
        room_id: RoomId,
        reason: String,
        reported_user_id: ClientId,
    },
    /// Block the partner permanently and end the chat
    BlockUser {
        room_id: RoomId,
        blocked_user_id: ClientId,
    },
}

/// Server → Client message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Connection successful, client ID issued
    Connected { client_id: ClientId },
    /// Number of currently connected clients
    UserCount { count: usize },
    /// Paired with a partner
    MatchFound { room_id: RoomId, partner_id: ClientId },
    /// Partner profile
    PartnerInfo {
        id: ClientId,
        avatar: String,
        nickname: String,
    },
    /// Chat message from the partner
    NewMessage {
        id: u64,
        content: String,
        sender: String,
        timestamp: u64,
    },
    /// Partner typing indicator
    PartnerTyping { is_typing: bool },
    /// Partner left or disconnected
    PartnerDisconnected,
    /// Room was terminated by the server
    ChatEnded { reason: EndReason },
    /// No partner found in time
    SearchTimeout,
    /// Error occurred
    Error { code: ErrorCode, message: String },
}

/// Why a room was force-terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Blocked,
    Reported,
    Expired,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocked => write!(f, "blocked"),
            Self::Reported => write!(f, "reported"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

/// Error codes for ServerMessage::Error
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Invalid message format
    InvalidMessage,
    /// Anything else
    Internal,
}

/// Convert AppError to ServerMessage for client notification
impl From<AppError> for ServerMessage {
    fn from(err: AppError) -> Self {
        let (code, message) = match &err {
            AppError::Json(e) => (
                ErrorCode::InvalidMessage,
                format!("Invalid message format: {}", e),
            ),
            // Fatal errors are not typically converted (connection closes)
            _ => (ErrorCode::Internal, "Internal error".to_string()),
        };
        ServerMessage::Error { code, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_match_deserialize() {
        let json = r#"{"type": "findMatch", "avatar": "cat", "nickname": "Kit"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::FindMatch { avatar, nickname } => {
                assert_eq!(avatar, "cat");
                assert_eq!(nickname, "Kit");
            }
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_block_user_deserialize_camel_case_fields() {
        let blocked = ClientId::new();
        let json = format!(
            r#"{{"type": "blockUser", "roomId": "abc", "blockedUserId": "{}"}}"#,
            blocked
        );
        let msg: ClientMessage = serde_json::from_str(&json).unwrap();
        match msg {
            ClientMessage::BlockUser {
                room_id,
                blocked_user_id,
            } => {
                assert_eq!(room_id, RoomId::from("abc"));
                assert_eq!(blocked_user_id, blocked);
            }
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn test_unit_variant_deserialize() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type": "cancelSearch"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::CancelSearch));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = serde_json::from_str::<ClientMessage>(r#"{"type": "selfDestruct"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_server_message_serialize() {
        let msg = ServerMessage::MatchFound {
            room_id: RoomId::from("r1"),
            partner_id: ClientId::new(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"matchFound\""));
        assert!(json.contains("\"roomId\":\"r1\""));
        assert!(json.contains("\"partnerId\":"));
    }

    #[test]
    fn test_chat_ended_reason_serialize() {
        let msg = ServerMessage::ChatEnded {
            reason: EndReason::Expired,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"chatEnded","reason":"expired"}"#);
    }

    #[test]
    fn test_json_error_converts_to_invalid_message() {
        let err = serde_json::from_str::<ClientMessage>("not json").unwrap_err();
        let msg: ServerMessage = AppError::from(err).into();
        match msg {
            ServerMessage::Error { code, .. } => assert_eq!(code, ErrorCode::InvalidMessage),
            _ => panic!("Wrong variant"),
        }
    }
}
