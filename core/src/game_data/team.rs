use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two sides in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    TeamOne,
    TeamTwo,
}

impl Team {
    /// Resolve the token the game logs (`TeamOne`, `TeamTwo`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "TeamOne" => Some(Self::TeamOne),
            "TeamTwo" => Some(Self::TeamTwo),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::TeamOne => "TeamOne",
            Self::TeamTwo => "TeamTwo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::TeamOne => "Blue Team",
            Self::TeamTwo => "Red Team",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A winner as reported by the log. Tokens outside the team table are
/// carried through verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamRef {
    Known(Team),
    Unmapped(String),
}

impl TeamRef {
    pub fn resolve(token: &str) -> Self {
        match Team::from_token(token) {
            Some(team) => Self::Known(team),
            None => Self::Unmapped(token.to_string()),
        }
    }

    pub fn team(&self) -> Option<Team> {
        match self {
            Self::Known(team) => Some(*team),
            Self::Unmapped(_) => None,
        }
    }
}

impl From<Team> for TeamRef {
    fn from(team: Team) -> Self {
        Self::Known(team)
    }
}

impl fmt::Display for TeamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(team) => f.write_str(team.label()),
            Self::Unmapped(raw) => f.write_str(raw),
        }
    }
}
