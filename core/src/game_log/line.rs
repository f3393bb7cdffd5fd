use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::game_data::{GamePhase, Team, TeamRef};

/// Timestamp layout of the game's log envelope, e.g. `2024.03.09-19.42.07:511`.
const LOG_TIMESTAMP_FORMAT: &str = "%Y.%m.%d-%H.%M.%S:%3f";

/// Classification of a decoded log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MessageKind {
    #[default]
    Undefined,
    MatchmakingStatus,
    GamePhaseChange,
    GoalScored,
    SetResult,
    MatchResult,
}

impl MessageKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Undefined => "Undefined",
            Self::MatchmakingStatus => "MatchmakingStatus",
            Self::GamePhaseChange => "GamePhaseChange",
            Self::GoalScored => "GoalScored",
            Self::SetResult => "SetResult",
            Self::MatchResult => "MatchResult",
        }
    }

    /// Shape of the payload a successful decode of this kind produces.
    pub fn shape(&self) -> PayloadShape {
        match self {
            Self::Undefined => PayloadShape::Raw,
            Self::MatchmakingStatus => PayloadShape::MatchmakingStatus,
            Self::GamePhaseChange => PayloadShape::GamePhase,
            Self::GoalScored => PayloadShape::GoalScored,
            Self::SetResult => PayloadShape::SetResult,
            Self::MatchResult => PayloadShape::MatchResult,
        }
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Undefined" => Ok(Self::Undefined),
            "MatchmakingStatus" => Ok(Self::MatchmakingStatus),
            "GamePhaseChange" => Ok(Self::GamePhaseChange),
            "GoalScored" => Ok(Self::GoalScored),
            "SetResult" => Ok(Self::SetResult),
            "MatchResult" => Ok(Self::MatchResult),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadShape {
    Raw,
    MatchmakingStatus,
    GamePhase,
    GoalScored,
    SetResult,
    MatchResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalScoredEvent {
    pub team: Team,
    /// Team's set score after the goal, as reported by the game (1..=3).
    pub new_score: u8,
}

/// Decoded payload of a classified line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    Raw(String),
    MatchmakingStatus(serde_json::Map<String, serde_json::Value>),
    GamePhase(GamePhase),
    GoalScored(GoalScoredEvent),
    SetResult { winner: TeamRef },
    MatchResult { winner: TeamRef },
}

impl Payload {
    pub fn shape(&self) -> PayloadShape {
        match self {
            Self::Raw(_) => PayloadShape::Raw,
            Self::MatchmakingStatus(_) => PayloadShape::MatchmakingStatus,
            Self::GamePhase(_) => PayloadShape::GamePhase,
            Self::GoalScored(_) => PayloadShape::GoalScored,
            Self::SetResult { .. } => PayloadShape::SetResult,
            Self::MatchResult { .. } => PayloadShape::MatchResult,
        }
    }
}

/// Why a matched line could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DecodeError {
    #[error("pattern has no capture group {0}")]
    MissingCapture(usize),
    #[error("score '{0}' is not a number")]
    InvalidScore(String),
    #[error("score reset to 0, ignoring")]
    ScoreReset,
    #[error("invalid score detected: {0}")]
    ScoreOutOfRange(i64),
    #[error("unknown team '{0}'")]
    UnknownTeam(String),
    #[error("current phase not found in '{0}'")]
    MissingPhasePrefix(String),
    #[error("unknown game phase detected: {0}")]
    UnknownPhase(String),
    #[error("malformed matchmaking status: {0}")]
    MalformedStatus(String),
}

/// One accepted log line, split into its envelope and classified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedLine {
    pub line_number: u64,
    pub timestamp: String,
    pub module: String,
    pub body: String,
    pub kind: MessageKind,
    /// Present only when decoding succeeded.
    pub payload: Option<Payload>,
    pub error: Option<DecodeError>,
}

impl ParsedLine {
    pub fn is_decoded(&self) -> bool {
        self.payload.is_some()
    }

    /// Classified as a known kind and decoded cleanly.
    pub fn is_interesting(&self) -> bool {
        self.kind != MessageKind::Undefined && self.payload.is_some()
    }

    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, LOG_TIMESTAMP_FORMAT).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(timestamp: &str) -> ParsedLine {
        ParsedLine {
            line_number: 1,
            timestamp: timestamp.to_string(),
            module: "LogTemp".to_string(),
            body: String::new(),
            kind: MessageKind::Undefined,
            payload: None,
            error: None,
        }
    }

    #[test]
    fn test_parsed_timestamp() {
        let ts = line("2024.03.09-19.42.07:511").parsed_timestamp().unwrap();
        assert_eq!(ts.to_string(), "2024-03-09 19:42:07.511");
        assert!(line("not a time").parsed_timestamp().is_none());
    }

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in [
            MessageKind::Undefined,
            MessageKind::MatchmakingStatus,
            MessageKind::GamePhaseChange,
            MessageKind::GoalScored,
            MessageKind::SetResult,
            MessageKind::MatchResult,
        ] {
            assert_eq!(kind.name().parse::<MessageKind>(), Ok(kind));
        }
        assert!("Goal".parse::<MessageKind>().is_err());
    }
}
