use serde::Serialize;
use std::collections::BTreeMap;

use crate::game_data::{Team, TeamRef};

/// Score of a single set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SetResult {
    pub team_one_score: u32,
    pub team_two_score: u32,
    /// Only ever assigned from an explicit set result line.
    pub winner: Option<TeamRef>,
}

impl SetResult {
    pub fn score(&self, team: Team) -> u32 {
        match team {
            Team::TeamOne => self.team_one_score,
            Team::TeamTwo => self.team_two_score,
        }
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResults {
    pub winner: Option<TeamRef>,
    /// Keyed by set number, starting at 1.
    pub sets: BTreeMap<u32, SetResult>,
}

impl MatchResults {
    pub fn sets_won(&self, team: Team) -> usize {
        self.sets
            .values()
            .filter(|set| set.winner.as_ref().and_then(TeamRef::team) == Some(team))
            .count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    pub goals: u32,
    pub assists: u32,
    pub saves: u32,
    pub shots: u32,
    pub kos: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Player {
    pub name: String,
    pub stats: PlayerStats,
}

// Player rosters are not filled from the log yet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Rosters {
    pub team_one: Vec<Player>,
    pub team_two: Vec<Player>,
}
