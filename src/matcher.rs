//! Partner selection
//!
//! First fit over the waiting queue in insertion order: the first waiting
//! participant with no block in either direction wins. No scoring.

use crate::blocklist::BlockList;
use crate::types::ClientId;
use crate::waiting::WaitingQueue;

/// Take a compatible partner for `seeker` out of the queue
///
/// The seeker itself is removed from the queue first, so it can never be
/// matched with itself. Returns `None` and leaves the queue untouched
/// (apart from the seeker) when nobody compatible is waiting.
pub fn take_partner(
    seeker: ClientId,
    waiting: &mut WaitingQueue,
    blocks: &BlockList,
) -> Option<ClientId> {
    waiting.remove(seeker);

    let partner = waiting
        .candidates()
        .find(|candidate| !blocks.is_mutually_excluded(seeker, *candidate))?;

    waiting.remove(partner);
    Some(partner)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::*;

    fn queue_of(ids: &[ClientId]) -> WaitingQueue {
        let mut queue = WaitingQueue::new(Duration::from_secs(30));
        for id in ids {
            queue.enqueue(*id, Instant::now());
        }
        queue
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_queue_no_partner() {
        let mut queue = queue_of(&[]);
        assert_eq!(take_partner(ClientId::new(), &mut queue, &BlockList::new()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fit_in_insertion_order() {
        let (a, b, seeker) = (ClientId::new(), ClientId::new(), ClientId::new());
        let mut queue = queue_of(&[a, b]);

        assert_eq!(take_partner(seeker, &mut queue, &BlockList::new()), Some(a));
        assert!(!queue.contains(a));
        assert!(queue.contains(b));
    }

    #[tokio::test(start_paused = true)]
    async fn test_skips_blocked_in_either_direction() {
        let (a, b, c, seeker) = (
            ClientId::new(),
            ClientId::new(),
            ClientId::new(),
            ClientId::new(),
        );
        let mut blocks = BlockList::new();
        blocks.block(seeker, a);
        blocks.block(b, seeker);
        let mut queue = queue_of(&[a, b, c]);

        assert_eq!(take_partner(seeker, &mut queue, &blocks), Some(c));
        assert_eq!(queue.candidates().collect::<Vec<_>>(), vec![a, b]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_blocked_waiting_yields_none() {
        let (a, seeker) = (ClientId::new(), ClientId::new());
        let mut blocks = BlockList::new();
        blocks.block(a, seeker);
        let mut queue = queue_of(&[a]);

        assert_eq!(take_partner(seeker, &mut queue, &blocks), None);
        assert!(queue.contains(a));
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeker_already_waiting_not_matched_with_self() {
        let seeker = ClientId::new();
        let mut queue = queue_of(&[seeker]);

        assert_eq!(take_partner(seeker, &mut queue, &BlockList::new()), None);
        assert!(queue.is_empty());
    }
}
