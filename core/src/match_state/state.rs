use chrono::{Local, NaiveDateTime, TimeDelta};
use serde::Serialize;
use thiserror::Error;

use super::results::{MatchResults, Rosters, SetResult};
use crate::game_data::{GamePhase, Team, TeamRef};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("no set has been started in match {0}")]
    NoActiveSet(u64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchState {
    pub id: u64,
    pub phase: GamePhase,
    pub teams: Rosters,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    /// 0 until the first set starts.
    pub current_set: u32,
    pub results: MatchResults,
}

impl MatchState {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            phase: GamePhase::PreGame,
            teams: Rosters::default(),
            start: None,
            end: None,
            current_set: 0,
            results: MatchResults::default(),
        }
    }

    /// Record a phase change, returning the previous phase.
    pub fn set_phase(&mut self, phase: GamePhase) -> GamePhase {
        std::mem::replace(&mut self.phase, phase)
    }

    pub fn match_started(&mut self) {
        self.match_started_at(Local::now().naive_local());
    }

    pub fn match_started_at(&mut self, timestamp: NaiveDateTime) {
        self.start = Some(timestamp);
    }

    pub fn match_ended(&mut self) {
        self.match_ended_at(Local::now().naive_local());
    }

    pub fn match_ended_at(&mut self, timestamp: NaiveDateTime) {
        self.end = Some(timestamp);
    }

    /// End minus start, once both are recorded.
    pub fn match_duration(&self) -> Option<TimeDelta> {
        Some(self.end? - self.start?)
    }

    pub fn has_started(&self) -> bool {
        self.start.is_some() || self.current_set > 0
    }

    pub fn is_finished(&self) -> bool {
        self.end.is_some()
    }

    pub fn update_match_winner(&mut self, winner: TeamRef) {
        self.results.winner = Some(winner);
    }

    /// Open the next set with a zero score and return its number.
    pub fn start_new_set(&mut self) -> u32 {
        self.current_set += 1;
        self.results.sets.insert(self.current_set, SetResult::default());
        self.current_set
    }

    pub fn current_set_result(&self) -> Option<&SetResult> {
        self.results.sets.get(&self.current_set)
    }

    /// Whether play resuming now belongs to a new set.
    pub fn needs_new_set(&self) -> bool {
        self.current_set_result().is_none_or(SetResult::is_decided)
    }

    /// Add one goal for `team` in the current set.
    pub fn update_set_score(&mut self, team: Team) -> Result<&SetResult, MatchError> {
        let set = self.current_set_mut()?;
        match team {
            Team::TeamOne => set.team_one_score += 1,
            Team::TeamTwo => set.team_two_score += 1,
        }
        Ok(set)
    }

    /// Assign the current set's winner. Does not open the next set.
    pub fn set_winner(&mut self, winner: TeamRef) -> Result<(), MatchError> {
        self.current_set_mut()?.winner = Some(winner);
        Ok(())
    }

    fn current_set_mut(&mut self) -> Result<&mut SetResult, MatchError> {
        let id = self.id;
        self.results
            .sets
            .get_mut(&self.current_set)
            .ok_or(MatchError::NoActiveSet(id))
    }
}
