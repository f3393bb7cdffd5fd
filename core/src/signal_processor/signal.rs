use chrono::NaiveDateTime;

use crate::game_data::{GamePhase, Team, TeamRef};

/// Signals emitted by the EventProcessor for cross-cutting concerns.
/// These represent "interesting things that happened" at a higher level
/// than raw log lines.
#[derive(Debug, Clone, PartialEq)]
pub enum GameSignal {
    // Match lifecycle
    MatchStarted {
        match_id: u64,
        timestamp: NaiveDateTime,
    },
    MatchEnded {
        match_id: u64,
        timestamp: NaiveDateTime,
        duration_secs: Option<i64>,
    },
    PhaseChanged {
        match_id: u64,
        from: GamePhase,
        to: GamePhase,
        timestamp: NaiveDateTime,
    },

    // Scoring
    SetStarted {
        match_id: u64,
        set: u32,
        timestamp: NaiveDateTime,
    },
    GoalScored {
        match_id: u64,
        set: u32,
        team: Team,
        team_one_score: u32,
        team_two_score: u32,
        timestamp: NaiveDateTime,
    },
    SetWon {
        match_id: u64,
        set: u32,
        winner: TeamRef,
        timestamp: NaiveDateTime,
    },
    MatchWon {
        match_id: u64,
        winner: TeamRef,
        timestamp: NaiveDateTime,
    },

    // Lobby
    MatchmakingStatusChanged {
        status: serde_json::Map<String, serde_json::Value>,
        timestamp: NaiveDateTime,
    },
}

impl GameSignal {
    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            Self::MatchStarted { timestamp, .. }
            | Self::MatchEnded { timestamp, .. }
            | Self::PhaseChanged { timestamp, .. }
            | Self::SetStarted { timestamp, .. }
            | Self::GoalScored { timestamp, .. }
            | Self::SetWon { timestamp, .. }
            | Self::MatchWon { timestamp, .. }
            | Self::MatchmakingStatusChanged { timestamp, .. } => *timestamp,
        }
    }
}
