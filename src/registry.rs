//! Participant registry
//!
//! Maps a participant to the profile they search with and the room
//! they are currently assigned to.

use std::collections::HashMap;

use crate::types::{ClientId, Profile, RoomId};

/// A participant that has searched at least once on this connection
#[derive(Debug, Clone)]
pub struct Participant {
    pub id: ClientId,
    pub profile: Profile,
    /// Current room assignment
    pub room: Option<RoomId>,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    participants: HashMap<ClientId, Participant>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a participant; the room assignment is reset
    pub fn register(&mut self, id: ClientId, profile: Profile) {
        self.participants.insert(
            id,
            Participant {
                id,
                profile,
                room: None,
            },
        );
    }

    pub fn get(&self, id: ClientId) -> Option<&Participant> {
        self.participants.get(&id)
    }

    /// Update the room assignment; unknown ids are ignored
    pub fn set_room(&mut self, id: ClientId, room: Option<RoomId>) {
        if let Some(participant) = self.participants.get_mut(&id) {
            participant.room = room;
        }
    }

    pub fn room_of(&self, id: ClientId) -> Option<&RoomId> {
        self.participants.get(&id).and_then(|p| p.room.as_ref())
    }

    /// Remove a participant
    ///
    /// Callers resolve room membership first so no room is orphaned.
    pub fn remove(&mut self, id: ClientId) -> Option<Participant> {
        self.participants.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}
