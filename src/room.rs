//! Rooms and the room registry
//!
//! A room is a two-party chat session created by a successful match.
//! It never exists with fewer than two members: when one member leaves
//! the room is torn down and the other is told.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::message::{EndReason, ServerMessage};
use crate::outbound::Outbound;
use crate::registry::ConnectionRegistry;
use crate::types::{ClientId, RandomRoomIds, RoomId, RoomIdSource};

/// Sender tag carried by relayed messages
pub const PARTNER_SENDER_TAG: &str = "partner";

/// 1:1 chat room
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub members: [ClientId; 2],
    pub created_at: Instant,
    pub active: bool,
}

impl Room {
    pub fn new(id: RoomId, a: ClientId, b: ClientId, created_at: Instant) -> Self {
        Self {
            id,
            members: [a, b],
            created_at,
            active: true,
        }
    }

    /// Check if a client is in this room
    pub fn contains(&self, client_id: ClientId) -> bool {
        self.members.contains(&client_id)
    }

    /// Get the partner's ClientId for a given client
    ///
    /// Returns None if the client is not in the room.
    pub fn partner_of(&self, client_id: ClientId) -> Option<ClientId> {
        match self.members {
            [a, b] if a == client_id => Some(b),
            [a, b] if b == client_id => Some(a),
            _ => None,
        }
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }
}

/// All active rooms: RoomId -> Room
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    ids: Box<dyn RoomIdSource>,
    next_message_id: u64,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::with_id_source(Box::new(RandomRoomIds::default()))
    }

    pub fn with_id_source(ids: Box<dyn RoomIdSource>) -> Self {
        Self {
            rooms: HashMap::new(),
            ids,
            next_message_id: 1,
        }
    }

    pub fn get(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Partner of `member`, if `room_id` is active and contains them
    pub fn partner_of(&self, room_id: &RoomId, member: ClientId) -> Option<ClientId> {
        self.rooms
            .get(room_id)
            .filter(|room| room.active)
            .and_then(|room| room.partner_of(member))
    }

    /// Create a room for two members and assign both to it
    pub fn create(
        &mut self,
        a: ClientId,
        b: ClientId,
        now: Instant,
        registry: &mut ConnectionRegistry,
    ) -> Room {
        // Generate unique room id
        let room_id = loop {
            let id = self.ids.next_id();
            if !self.rooms.contains_key(&id) {
                break id;
            }
            debug!("Room id {} collides with an active room, retrying", id);
        };

        let room = Room::new(room_id.clone(), a, b, now);
        self.rooms.insert(room_id.clone(), room.clone());
        registry.set_room(a, Some(room_id.clone()));
        registry.set_room(b, Some(room_id));

        room
    }

    /// Forward a chat message to the sender's partner
    ///
    /// Dropped (returns false) unless the room is active and the sender
    /// is a member.
    pub fn relay(
        &mut self,
        room_id: &RoomId,
        sender: ClientId,
        content: String,
        timestamp: u64,
        out: &mut impl Outbound,
    ) -> bool {
        let Some(partner) = self.partner_of(room_id, sender) else {
            debug!("Dropping message from {} for room {}", sender, room_id);
            return false;
        };

        let id = self.next_message_id;
        self.next_message_id += 1;

        out.notify(
            partner,
            ServerMessage::NewMessage {
                id,
                content,
                sender: PARTNER_SENDER_TAG.to_string(),
                timestamp,
            },
        );
        true
    }

    /// Forward a typing indicator to the sender's partner
    pub fn set_typing(
        &self,
        room_id: &RoomId,
        sender: ClientId,
        is_typing: bool,
        out: &mut impl Outbound,
    ) -> bool {
        let Some(partner) = self.partner_of(room_id, sender) else {
            return false;
        };

        out.notify(partner, ServerMessage::PartnerTyping { is_typing });
        true
    }

    /// Remove a member, which ends the room
    ///
    /// The remaining member receives `partnerDisconnected`. Both
    /// members' room assignments are cleared.
    pub fn leave(
        &mut self,
        member: ClientId,
        room_id: &RoomId,
        registry: &mut ConnectionRegistry,
        out: &mut impl Outbound,
    ) -> bool {
        if !self.rooms.get(room_id).is_some_and(|r| r.contains(member)) {
            debug!("{} is not in room {}, ignoring leave", member, room_id);
            return false;
        }
        let Some(mut room) = self.rooms.remove(room_id) else {
            return false;
        };
        room.active = false;

        registry.set_room(member, None);
        if let Some(partner) = room.partner_of(member) {
            registry.set_room(partner, None);
            out.notify(partner, ServerMessage::PartnerDisconnected);
        }

        info!("Client {} left room {}", member, room_id);
        true
    }

    /// Force-end a room, telling every member why
    pub fn terminate(
        &mut self,
        room_id: &RoomId,
        reason: EndReason,
        registry: &mut ConnectionRegistry,
        out: &mut impl Outbound,
    ) -> bool {
        let Some(mut room) = self.rooms.remove(room_id) else {
            return false;
        };
        room.active = false;

        for member in room.members {
            registry.set_room(member, None);
        }
        out.broadcast_room(&room.members, ServerMessage::ChatEnded { reason });

        info!("Room {} terminated ({})", room_id, reason);
        true
    }

    /// Terminate every room older than `max_age`
    ///
    /// Age counts from creation; activity does not extend it.
    pub fn reap(
        &mut self,
        now: Instant,
        max_age: Duration,
        registry: &mut ConnectionRegistry,
        out: &mut impl Outbound,
    ) -> usize {
        let expired: Vec<RoomId> = self
            .rooms
            .values()
            .filter(|room| room.age(now) > max_age)
            .map(|room| room.id.clone())
            .collect();

        expired
            .iter()
            .filter(|room_id| self.terminate(room_id, EndReason::Expired, registry, out))
            .count()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RoomRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomRegistry")
            .field("rooms", &self.rooms)
            .field("next_message_id", &self.next_message_id)
            .finish()
    }
}
