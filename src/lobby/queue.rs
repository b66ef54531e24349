//! Host rotation queue
//!
//! Keeps the ordered list of players waiting for host and the list of players
//! who already hosted during the current cycle. When the waiting list runs dry
//! the already-hosted list becomes the next cycle, oldest host first.

use crate::types::PlayerName;
use std::collections::VecDeque;
use tracing::debug;

/// Ordered host queue with round-robin refill
#[derive(Debug, Clone, Default)]
pub struct HostQueue {
    /// Players waiting for host, in join order
    upcoming: VecDeque<PlayerName>,
    /// Players who hosted since the last refill, oldest first
    already_hosted: Vec<PlayerName>,
}

impl HostQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `player` at the tail, dropping any earlier occurrence
    pub fn enqueue(&mut self, player: &str) {
        self.upcoming.retain(|queued| queued != player);
        self.upcoming.push_back(player.to_string());
    }

    /// Forget `player` entirely; no-op when absent
    pub fn remove(&mut self, player: &str) {
        self.upcoming.retain(|queued| queued != player);
        self.already_hosted.retain(|hosted| hosted != player);
    }

    /// Pick the next host after `current_host` hands over.
    ///
    /// Returns `None` only when nobody is left in either list.
    pub fn advance(&mut self, current_host: Option<&str>) -> Option<PlayerName> {
        if self.upcoming.is_empty() {
            self.refill();
        }

        let mut candidate = self.upcoming.pop_front()?;

        if Some(candidate.as_str()) == current_host {
            if let Some(next) = self.upcoming.pop_front() {
                debug!("Skipping outgoing host {} in favour of {}", candidate, next);
                self.record_hosted(candidate);
                candidate = next;
            }
        }

        self.record_hosted(candidate.clone());
        Some(candidate)
    }

    fn refill(&mut self) {
        if self.already_hosted.is_empty() {
            return;
        }

        debug!(
            "Host queue exhausted, starting new cycle with {} players",
            self.already_hosted.len()
        );
        self.upcoming = std::mem::take(&mut self.already_hosted).into();
    }

    fn record_hosted(&mut self, player: PlayerName) {
        self.already_hosted.retain(|hosted| *hosted != player);
        self.already_hosted.push(player);
    }

    /// Players waiting for host, next first
    pub fn upcoming(&self) -> Vec<PlayerName> {
        self.upcoming.iter().cloned().collect()
    }

    pub fn already_hosted(&self) -> &[PlayerName] {
        &self.already_hosted
    }

    pub fn len(&self) -> usize {
        self.upcoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn queue_of(players: &[&str]) -> HostQueue {
        let mut queue = HostQueue::new();
        for player in players {
            queue.enqueue(player);
        }
        queue
    }

    #[test]
    fn test_enqueue_moves_duplicate_to_tail() {
        let mut queue = queue_of(&["a", "b", "c"]);
        queue.enqueue("a");

        assert_eq!(queue.upcoming(), vec!["b", "c", "a"]);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_remove_from_both_lists() {
        let mut queue = queue_of(&["a", "b", "c"]);
        assert_eq!(queue.advance(None), Some("a".to_string()));

        queue.remove("a");
        queue.remove("c");
        queue.remove("nobody");

        assert_eq!(queue.upcoming(), vec!["b"]);
        assert!(queue.already_hosted().is_empty());
    }

    #[test]
    fn test_rotation_cycle() {
        // "a" is the bot and already holds host when the others arrive
        let mut queue = queue_of(&["a", "b", "c"]);

        let next = queue.advance(Some("a"));
        assert_eq!(next.as_deref(), Some("b"));
        assert_eq!(queue.upcoming(), vec!["c"]);

        let next = queue.advance(Some("b"));
        assert_eq!(next.as_deref(), Some("c"));
        assert!(queue.is_empty());

        let next = queue.advance(Some("c"));
        assert_eq!(next.as_deref(), Some("a"));
        assert_eq!(queue.already_hosted(), ["a".to_string()]);
        assert_eq!(queue.upcoming(), vec!["b", "c"]);
    }

    #[test]
    fn test_advance_on_empty_queue() {
        let mut queue = HostQueue::new();
        assert_eq!(queue.advance(None), None);
        assert_eq!(queue.advance(Some("a")), None);
        assert!(queue.already_hosted().is_empty());
    }

    #[test]
    fn test_single_player_keeps_host() {
        let mut queue = queue_of(&["solo"]);
        assert_eq!(queue.advance(Some("solo")).as_deref(), Some("solo"));
        assert_eq!(queue.advance(Some("solo")).as_deref(), Some("solo"));
    }

    #[test]
    fn test_outgoing_host_skipped_with_two_players() {
        let mut queue = queue_of(&["a", "b"]);
        assert_eq!(queue.advance(Some("a")).as_deref(), Some("b"));
        // a already hosted this cycle, so the refill brings it back first
        assert_eq!(queue.advance(Some("b")).as_deref(), Some("a"));
    }

    proptest! {
        #[test]
        fn prop_enqueue_never_duplicates(names in prop::collection::vec("[a-e]", 0..40)) {
            let mut queue = HostQueue::new();
            for name in &names {
                queue.enqueue(name);
            }

            let upcoming = queue.upcoming();
            let unique: HashSet<_> = upcoming.iter().collect();
            prop_assert_eq!(unique.len(), upcoming.len());
        }

        #[test]
        fn prop_outgoing_host_not_rechosen(
            names in prop::collection::hash_set("[a-z]{3,8}", 2..8),
            pick in any::<prop::sample::Index>(),
        ) {
            let names: Vec<_> = names.into_iter().collect();
            let mut queue = HostQueue::new();
            for name in &names {
                queue.enqueue(name);
            }

            let outgoing = pick.get(&names).clone();
            let next = queue.advance(Some(&outgoing));
            prop_assert!(next.is_some());
            prop_assert_ne!(next.unwrap(), outgoing);
        }

        #[test]
        fn prop_round_robin_fairness(
            names in prop::collection::hash_set("[a-z]{3,8}", 1..8),
            rounds in 1usize..4,
        ) {
            let names: Vec<_> = names.into_iter().collect();
            let mut queue = HostQueue::new();
            for name in &names {
                queue.enqueue(name);
            }

            let mut current: Option<String> = None;
            let mut history = Vec::new();
            for _ in 0..names.len() * rounds {
                let next = queue.advance(current.as_deref());
                prop_assert!(next.is_some());
                history.push(next.clone().unwrap());
                current = next;
            }

            for cycle in history.chunks(names.len()) {
                let unique: HashSet<_> = cycle.iter().collect();
                prop_assert_eq!(unique.len(), names.len());
            }
        }

        #[test]
        fn prop_removed_player_never_chosen(
            names in prop::collection::hash_set("[a-z]{3,8}", 2..8),
            pick in any::<prop::sample::Index>(),
            advances in 1usize..20,
        ) {
            let names: Vec<_> = names.into_iter().collect();
            let mut queue = HostQueue::new();
            for name in &names {
                queue.enqueue(name);
            }
            // let the victim host once so it sits in the already-hosted list
            let mut current = queue.advance(None);

            let removed = pick.get(&names).clone();
            queue.remove(&removed);

            for _ in 0..advances {
                let next = queue.advance(current.as_deref());
                prop_assert_ne!(next.as_deref(), Some(removed.as_str()));
                current = next;
            }
        }
    }
}
