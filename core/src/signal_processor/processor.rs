//! Phase-driven orchestration of the match state.
//!
//! The match lifecycle follows the phases the game logs:
//! - a lobby phase after play has begun closes the match and opens a new one,
//!   as does a play phase once the match has ended
//! - a play phase with no open (or an already decided) set starts a new set,
//!   and set 1 also starts the match clock
//! - a post-game phase stops the match clock
//!
//! Goals and results are applied to whatever set is open. Phase changes never
//! touch scores directly.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use super::GameSignal;
use crate::game_data::{GamePhase, TeamRef};
use crate::game_log::{GoalScoredEvent, MessageKind, ParsedLine, Payload};
use crate::state::SessionCache;

/// Running counts of what the processor has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessorStats {
    pub lines: u64,
    pub classified: u64,
    pub decode_errors: u64,
    pub rejected_events: u64,
}

#[derive(Debug, Default)]
pub struct EventProcessor {
    stats: ProcessorStats,
}

impl EventProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ProcessorStats {
        self.stats
    }

    /// Apply one line to the cache and return the signals it produced.
    pub fn process_line(&mut self, line: &ParsedLine, cache: &mut SessionCache) -> Vec<GameSignal> {
        self.stats.lines += 1;
        if line.kind != MessageKind::Undefined {
            self.stats.classified += 1;
        }
        if line.error.is_some() {
            self.stats.decode_errors += 1;
        }

        let Some(payload) = &line.payload else {
            return Vec::new();
        };
        let timestamp = line
            .parsed_timestamp()
            .unwrap_or_else(|| Local::now().naive_local());

        match payload {
            Payload::Raw(_) => Vec::new(),
            Payload::MatchmakingStatus(status) => vec![GameSignal::MatchmakingStatusChanged {
                status: status.clone(),
                timestamp,
            }],
            Payload::GamePhase(phase) => handle_phase_change(*phase, cache, timestamp),
            Payload::GoalScored(goal) => handle_goal(goal, cache, timestamp),
            Payload::SetResult { winner } => {
                self.handle_set_result(winner, cache, timestamp, line.line_number)
            }
            Payload::MatchResult { winner } => handle_match_result(winner, cache, timestamp),
        }
    }

    fn handle_set_result(
        &mut self,
        winner: &TeamRef,
        cache: &mut SessionCache,
        timestamp: NaiveDateTime,
        line_number: u64,
    ) -> Vec<GameSignal> {
        let current = cache.current_match_mut();
        if let Err(e) = current.set_winner(winner.clone()) {
            self.stats.rejected_events += 1;
            tracing::warn!(line = line_number, error = %e, "Set result with no set in progress");
            return Vec::new();
        }

        vec![GameSignal::SetWon {
            match_id: current.id,
            set: current.current_set,
            winner: winner.clone(),
            timestamp,
        }]
    }
}

fn handle_phase_change(
    phase: GamePhase,
    cache: &mut SessionCache,
    timestamp: NaiveDateTime,
) -> Vec<GameSignal> {
    let mut signals = Vec::new();

    // A lobby phase closes a match in progress; play resuming after the
    // match already ended belongs to the next one
    let current = cache.current_match();
    if (phase.is_pre_match() && current.has_started())
        || (phase.is_play() && current.is_finished())
    {
        signals.extend(end_match(cache, timestamp));
        cache.new_match();
    }

    let current = cache.current_match_mut();
    let from = current.set_phase(phase);
    if from != phase {
        signals.push(GameSignal::PhaseChanged {
            match_id: current.id,
            from,
            to: phase,
            timestamp,
        });
    }

    if phase.is_play() && current.needs_new_set() {
        signals.extend(start_set(cache, timestamp));
    } else if phase.is_post_game() && current.has_started() {
        signals.extend(end_match(cache, timestamp));
    }

    signals
}

fn handle_goal(
    goal: &GoalScoredEvent,
    cache: &mut SessionCache,
    timestamp: NaiveDateTime,
) -> Vec<GameSignal> {
    let mut signals = Vec::new();

    if cache.current_match().current_set == 0 {
        // Tracking began mid-match; count from here
        tracing::warn!(
            match_id = cache.current_match().id,
            "Goal scored before any set started, opening set 1"
        );
        signals.extend(start_set(cache, timestamp));
    }

    let current = cache.current_match_mut();
    let match_id = current.id;
    let set = current.current_set;
    match current.update_set_score(goal.team) {
        Ok(score) => {
            if score.score(goal.team) != u32::from(goal.new_score) {
                tracing::debug!(
                    team = %goal.team,
                    reported = goal.new_score,
                    counted = score.score(goal.team),
                    "Counted score differs from reported score"
                );
            }
            signals.push(GameSignal::GoalScored {
                match_id,
                set,
                team: goal.team,
                team_one_score: score.team_one_score,
                team_two_score: score.team_two_score,
                timestamp,
            });
        }
        Err(e) => tracing::error!(error = %e, "BUG: set missing after start_set"),
    }

    signals
}

fn handle_match_result(
    winner: &TeamRef,
    cache: &mut SessionCache,
    timestamp: NaiveDateTime,
) -> Vec<GameSignal> {
    let current = cache.current_match_mut();
    current.update_match_winner(winner.clone());
    vec![GameSignal::MatchWon {
        match_id: current.id,
        winner: winner.clone(),
        timestamp,
    }]
}

/// Open the next set, starting the match clock on the first one.
fn start_set(cache: &mut SessionCache, timestamp: NaiveDateTime) -> Vec<GameSignal> {
    let mut signals = Vec::new();
    let current = cache.current_match_mut();

    if current.start.is_none() {
        current.match_started_at(timestamp);
        signals.push(GameSignal::MatchStarted {
            match_id: current.id,
            timestamp,
        });
    }

    let set = current.start_new_set();
    signals.push(GameSignal::SetStarted {
        match_id: current.id,
        set,
        timestamp,
    });
    signals
}

fn end_match(cache: &mut SessionCache, timestamp: NaiveDateTime) -> Option<GameSignal> {
    if !cache.end_match_at(timestamp) {
        return None;
    }
    let current = cache.current_match();
    Some(GameSignal::MatchEnded {
        match_id: current.id,
        timestamp,
        duration_secs: current.match_duration().map(|d| d.num_seconds()),
    })
}
