//! Basic type definitions for the chat server
//!
//! Provides newtype wrappers for type safety:
//! - `ClientId`: UUID-based unique participant identifier
//! - `RoomId`: opaque room identifier
//! - `Profile`: avatar and nickname a participant searches with
//!
//! Also defines the `RoomIdSource` seam used by the room registry.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique participant identifier (newtype pattern)
///
/// Wraps a UUID v4 issued when the connection opens.
/// Implements Hash and Eq for use as HashMap keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub Uuid);

impl ClientId {
    /// Create a new random client ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Room identifier
///
/// Issued by a `RoomIdSource` when two participants are paired.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public profile a participant searches with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Avatar token chosen by the client
    pub avatar: String,
    /// Display nickname
    pub nickname: String,
}

impl Profile {
    pub fn new(avatar: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            avatar: avatar.into(),
            nickname: nickname.into(),
        }
    }
}

/// Source of candidate room identifiers
///
/// Candidates need not be unique; the room registry rejects ids that
/// collide with an active room and asks again.
pub trait RoomIdSource: Send {
    fn next_id(&mut self) -> RoomId;
}

/// Random lowercase base-36 room ids
#[derive(Debug, Clone)]
pub struct RandomRoomIds {
    len: usize,
}

impl RandomRoomIds {
    /// Default identifier length
    pub const DEFAULT_LEN: usize = 24;

    const ALPHABET: &'static [u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    pub fn with_len(len: usize) -> Self {
        Self { len: len.max(1) }
    }
}

impl Default for RandomRoomIds {
    fn default() -> Self {
        Self::with_len(Self::DEFAULT_LEN)
    }
}

impl RoomIdSource for RandomRoomIds {
    fn next_id(&mut self) -> RoomId {
        let mut rng = rand::thread_rng();
        let id: String = (0..self.len)
            .map(|_| Self::ALPHABET[rng.gen_range(0..Self::ALPHABET.len())] as char)
            .collect();
        RoomId(id)
    }
}
