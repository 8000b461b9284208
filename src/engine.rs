//! Matchmaking engine
//!
//! `MatchCore` owns the block list, participant registry, waiting queue
//! and room registry, and exposes one method per inbound event. It is not
//! thread-safe by itself: the `ChatServer` actor owns it and runs one
//! operation at a time, which is what keeps matching and teardown atomic.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::blocklist::BlockList;
use crate::clock::{Clock, SystemClock};
use crate::matcher;
use crate::message::{EndReason, ServerMessage};
use crate::outbound::Outbound;
use crate::registry::ConnectionRegistry;
use crate::room::{Room, RoomRegistry};
use crate::types::{ClientId, Profile, RoomId, RoomIdSource};
use crate::waiting::WaitingQueue;

/// Point-in-time counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoreStats {
    pub participants: usize,
    pub waiting: usize,
    pub rooms: usize,
    pub blocks: usize,
    pub reports: u64,
}

pub struct MatchCore {
    blocks: BlockList,
    participants: ConnectionRegistry,
    waiting: WaitingQueue,
    rooms: RoomRegistry,
    clock: Box<dyn Clock>,
    reports: u64,
}

impl MatchCore {
    /// Create a core with the real clock and random room ids
    pub fn new(search_timeout: Duration) -> Self {
        Self {
            blocks: BlockList::new(),
            participants: ConnectionRegistry::new(),
            waiting: WaitingQueue::new(search_timeout),
            rooms: RoomRegistry::new(),
            clock: Box::new(SystemClock),
            reports: 0,
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_room_ids(mut self, ids: Box<dyn RoomIdSource>) -> Self {
        self.rooms = RoomRegistry::with_id_source(ids);
        self
    }

    // ---------------------------------------------------------------------
    // Inbound events
    // ---------------------------------------------------------------------

    /// Pair `seeker` with the first compatible waiting participant
    ///
    /// On success both members get `matchFound` and the new room is
    /// returned. Otherwise the seeker is queued with a search timeout.
    pub fn find_match(
        &mut self,
        seeker: ClientId,
        profile: Profile,
        out: &mut impl Outbound,
    ) -> Option<Room> {
        // Searching again from inside a room ends that room first
        if let Some(room_id) = self.participants.room_of(seeker).cloned() {
            self.rooms.leave(seeker, &room_id, &mut self.participants, out);
        }

        self.participants.register(seeker, profile);

        let Some(partner) = matcher::take_partner(seeker, &mut self.waiting, &self.blocks) else {
            self.waiting.enqueue(seeker, self.clock.now());
            info!("Client {} added to waiting queue", seeker);
            return None;
        };

        let room = self.rooms.create(seeker, partner, self.clock.now(), &mut self.participants);

        out.notify(
            seeker,
            ServerMessage::MatchFound {
                room_id: room.id.clone(),
                partner_id: partner,
            },
        );
        out.notify(
            partner,
            ServerMessage::MatchFound {
                room_id: room.id.clone(),
                partner_id: seeker,
            },
        );

        info!("Match found: {} with {} in room {}", seeker, partner, room.id);
        Some(room)
    }

    /// Stop searching; a no-op when not queued
    pub fn cancel_search(&mut self, client_id: ClientId) -> bool {
        let Some(since) = self.waiting.enqueued_at(client_id) else {
            return false;
        };
        self.waiting.remove(client_id);
        info!(
            "Client {} cancelled search after {:?}",
            client_id,
            self.clock.now().saturating_duration_since(since)
        );
        true
    }

    /// Exchange profiles between the requester and their partner
    pub fn join_room(
        &mut self,
        client_id: ClientId,
        room_id: &RoomId,
        out: &mut impl Outbound,
    ) -> bool {
        let Some(partner_id) = self.rooms.partner_of(room_id, client_id) else {
            debug!("Client {} is not in room {}, ignoring join", client_id, room_id);
            return false;
        };
        let (Some(me), Some(partner)) = (
            self.participants.get(client_id),
            self.participants.get(partner_id),
        ) else {
            return false;
        };

        out.notify(
            client_id,
            ServerMessage::PartnerInfo {
                id: partner_id,
                avatar: partner.profile.avatar.clone(),
                nickname: partner.profile.nickname.clone(),
            },
        );
        out.notify(
            partner_id,
            ServerMessage::PartnerInfo {
                id: client_id,
                avatar: me.profile.avatar.clone(),
                nickname: me.profile.nickname.clone(),
            },
        );

        debug!("Client {} joined room {}", client_id, room_id);
        true
    }

    pub fn send_message(
        &mut self,
        client_id: ClientId,
        room_id: &RoomId,
        content: String,
        out: &mut impl Outbound,
    ) -> bool {
        let timestamp = self.clock.unix_millis();
        self.rooms.relay(room_id, client_id, content, timestamp, out)
    }

    pub fn typing(
        &mut self,
        client_id: ClientId,
        room_id: &RoomId,
        is_typing: bool,
        out: &mut impl Outbound,
    ) -> bool {
        self.rooms.set_typing(room_id, client_id, is_typing, out)
    }

    pub fn leave_room(
        &mut self,
        client_id: ClientId,
        room_id: &RoomId,
        out: &mut impl Outbound,
    ) -> bool {
        self.rooms
            .leave(client_id, room_id, &mut self.participants, out)
    }

    /// Record a report and end the reporter's room
    ///
    /// Reports are logged only; nothing is enforced against the
    /// reported participant.
    pub fn report_user(
        &mut self,
        reporter: ClientId,
        room_id: &RoomId,
        reported: ClientId,
        reason: &str,
        out: &mut impl Outbound,
    ) -> bool {
        self.reports += 1;
        warn!(
            %reporter,
            %reported,
            room = %room_id,
            reason,
            "User reported"
        );

        self.terminate_if_member(reporter, room_id, EndReason::Reported, out)
    }

    /// Record a permanent block and end the blocker's room
    pub fn block_user(
        &mut self,
        blocker: ClientId,
        room_id: &RoomId,
        blocked: ClientId,
        out: &mut impl Outbound,
    ) -> bool {
        if self.blocks.block(blocker, blocked) {
            info!("Client {} blocked {}", blocker, blocked);
        }

        self.terminate_if_member(blocker, room_id, EndReason::Blocked, out)
    }

    /// Full cleanup for a closed connection
    pub fn disconnect(&mut self, client_id: ClientId, out: &mut impl Outbound) {
        self.waiting.remove(client_id);

        if let Some(room_id) = self.participants.room_of(client_id).cloned() {
            self.rooms.leave(client_id, &room_id, &mut self.participants, out);
        }

        self.participants.remove(client_id);
    }

    // ---------------------------------------------------------------------
    // Timers
    // ---------------------------------------------------------------------

    /// Wait for the next search timeout; see `WaitingQueue::next_expired`
    pub async fn next_search_timeout(&mut self) -> Option<ClientId> {
        self.waiting.next_expired().await
    }

    /// Tell a participant their search expired
    pub fn search_timed_out(&mut self, client_id: ClientId, out: &mut impl Outbound) {
        info!("Search timed out for {}", client_id);
        out.notify(client_id, ServerMessage::SearchTimeout);
    }

    /// Terminate rooms older than `max_age`; returns how many
    pub fn reap(&mut self, max_age: Duration, out: &mut impl Outbound) -> usize {
        let reaped = self.rooms.reap(self.clock.now(), max_age, &mut self.participants, out);
        if reaped > 0 {
            info!("Reaped {} expired room(s)", reaped);
        }
        reaped
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn is_waiting(&self, client_id: ClientId) -> bool {
        self.waiting.contains(client_id)
    }

    pub fn room_of(&self, client_id: ClientId) -> Option<&RoomId> {
        self.participants.room_of(client_id)
    }

    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn is_blocked(&self, a: ClientId, b: ClientId) -> bool {
        self.blocks.is_mutually_excluded(a, b)
    }

    pub fn stats(&self) -> CoreStats {
        CoreStats {
            participants: self.participants.len(),
            waiting: self.waiting.len(),
            rooms: self.rooms.len(),
            blocks: self.blocks.len(),
            reports: self.reports,
        }
    }

    fn terminate_if_member(
        &mut self,
        client_id: ClientId,
        room_id: &RoomId,
        reason: EndReason,
        out: &mut impl Outbound,
    ) -> bool {
        if self.rooms.partner_of(room_id, client_id).is_none() {
            debug!("Client {} is not in room {}, not terminating", client_id, room_id);
            return false;
        }
        self.rooms
            .terminate(room_id, reason, &mut self.participants, out)
    }
}
