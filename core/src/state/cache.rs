use chrono::{Local, NaiveDateTime};
use nabber_types::DEFAULT_HISTORY_CAPACITY;
use std::collections::VecDeque;

use crate::match_state::MatchState;

/// Pure storage for session state: the match in progress plus a bounded
/// window of completed ones. Routing logic lives in EventProcessor.
#[derive(Debug, Clone)]
pub struct SessionCache {
    current: MatchState,
    history: VecDeque<MatchState>,
    history_capacity: usize,
    next_match_id: u64,
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl SessionCache {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            current: MatchState::new(0),
            history: VecDeque::with_capacity(history_capacity),
            history_capacity,
            next_match_id: 1,
        }
    }

    // --- Match Lifecycle ---

    /// Finalize the current match and open a fresh one, returning its ID.
    /// A match that never began is discarded rather than kept in history.
    pub fn new_match(&mut self) -> u64 {
        self.end_match();

        let id = self.next_match_id;
        self.next_match_id += 1;
        let finished = std::mem::replace(&mut self.current, MatchState::new(id));

        if finished.has_started() {
            tracing::info!(
                match_id = finished.id,
                sets = finished.current_set,
                winner = ?finished.results.winner,
                "[MATCH] Finalized match"
            );
            self.history.push_back(finished);
            self.trim_history();
        }
        id
    }

    /// Record the end of the current match now. See [`end_match_at`](Self::end_match_at).
    pub fn end_match(&mut self) -> bool {
        self.end_match_at(Local::now().naive_local())
    }

    /// Record the end of the current match if it began and has no end yet.
    /// Returns whether an end time was recorded.
    pub fn end_match_at(&mut self, timestamp: NaiveDateTime) -> bool {
        if !self.current.has_started() || self.current.is_finished() {
            return false;
        }
        if self.current.start.is_none() {
            // Joined mid-match: no start seen, anchor the clock at the end
            self.current.match_started_at(timestamp);
        }
        self.current.match_ended_at(timestamp);
        true
    }

    fn trim_history(&mut self) {
        while self.history.len() > self.history_capacity {
            self.history.pop_front();
        }
    }

    // --- Accessors ---

    pub fn current_match(&self) -> &MatchState {
        &self.current
    }

    pub fn current_match_mut(&mut self) -> &mut MatchState {
        &mut self.current
    }

    /// Completed matches, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &MatchState> {
        self.history.iter()
    }

    pub fn last_completed_match(&self) -> Option<&MatchState> {
        self.history.back()
    }

    /// Completed matches followed by the current one if it has begun.
    pub fn matches(&self) -> impl Iterator<Item = &MatchState> {
        self.history
            .iter()
            .chain(std::iter::once(&self.current).filter(|m| m.has_started()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_data::{Team, TeamRef};

    fn play_one_set(cache: &mut SessionCache) {
        let m = cache.current_match_mut();
        m.match_started();
        m.start_new_set();
        m.update_set_score(Team::TeamOne).unwrap();
    }

    #[test]
    fn test_first_match_id_is_zero() {
        let cache = SessionCache::default();
        assert_eq!(cache.current_match().id, 0);
        assert_eq!(cache.history().count(), 0);
        assert_eq!(cache.matches().count(), 0);
    }

    #[test]
    fn test_new_match_archives_started_match() {
        let mut cache = SessionCache::default();
        play_one_set(&mut cache);
        cache
            .current_match_mut()
            .update_match_winner(TeamRef::Known(Team::TeamOne));

        let id = cache.new_match();
        assert_eq!(id, 1);
        assert_eq!(cache.current_match().id, 1);
        assert_eq!(cache.current_match().current_set, 0);

        let archived = cache.last_completed_match().unwrap();
        assert_eq!(archived.id, 0);
        assert!(archived.is_finished());
        assert_eq!(archived.results.winner, Some(TeamRef::Known(Team::TeamOne)));
    }

    #[test]
    fn test_unstarted_match_is_discarded() {
        let mut cache = SessionCache::default();
        cache.new_match();
        cache.new_match();
        assert_eq!(cache.history().count(), 0);
        assert_eq!(cache.current_match().id, 2);
    }

    #[test]
    fn test_end_match_only_once() {
        let mut cache = SessionCache::default();
        assert!(!cache.end_match(), "nothing to end before play");

        play_one_set(&mut cache);
        assert!(cache.end_match());
        let end = cache.current_match().end;
        assert!(!cache.end_match());
        assert_eq!(cache.current_match().end, end);
    }

    #[test]
    fn test_end_without_start_anchors_clock() {
        let mut cache = SessionCache::default();
        cache.current_match_mut().start_new_set();
        let ts = Local::now().naive_local();
        assert!(cache.end_match_at(ts));
        assert_eq!(cache.current_match().start, Some(ts));
        assert_eq!(cache.current_match().match_duration().unwrap().num_seconds(), 0);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut cache = SessionCache::new(2);
        for _ in 0..4 {
            play_one_set(&mut cache);
            cache.new_match();
        }
        let ids: Vec<u64> = cache.history().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_matches_includes_current_once_started() {
        let mut cache = SessionCache::default();
        play_one_set(&mut cache);
        cache.new_match();
        assert_eq!(cache.matches().count(), 1);

        play_one_set(&mut cache);
        let ids: Vec<u64> = cache.matches().map(|m| m.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }
}
