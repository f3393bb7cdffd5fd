//! Registry of recognised message kinds.
//!
//! Each entry binds a [`MessageKind`] to a regex applied to a line's body and
//! a decoder turning the regex captures into a typed [`Payload`]. Entries are
//! evaluated in table order and the first match wins, so precedence between
//! overlapping patterns is explicit. `Undefined` never has an entry: it is the
//! result when nothing matches.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use thiserror::Error;

use super::line::{DecodeError, GoalScoredEvent, MessageKind, Payload, PayloadShape};
use crate::game_data::{GamePhase, MATCH_PHASE_PREFIX, Team, TeamRef};

/// Converts the captures of a matched pattern into a payload.
pub type Decoder = fn(&Captures<'_>) -> Result<Payload, DecodeError>;

const MATCHMAKING_STATUS_PATTERN: &str = r"Matchmaking Status: (.*)";
const GAME_PHASE_CHANGE_PATTERN: &str = r"APMGameState::PerformCurrentMatchPhaseEvents.*Current\[(.*)\]";
const GOAL_SCORED_PATTERN: &str = r"([a-zA-Z]+)'s NumPointsThisSet changed from \d to (\d)";
const SET_RESULT_PATTERN: &str = r"TeamThatWonSet changed from '<unset>' to 'EAssignedTeam::(.*)'";
const MATCH_RESULT_PATTERN: &str = r"TeamThatWonMatch changed from '<unset>' to 'EAssignedTeam::(.*)'";

/// Highest set score the game reports; a set is first to three.
pub const MAX_SET_SCORE: i64 = 3;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid pattern for {kind}: {source}")]
    InvalidPattern {
        kind: MessageKind,
        #[source]
        source: regex::Error,
    },
    #[error("invalid noise pattern '{pattern}': {source}")]
    InvalidNoisePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("duplicate entry for {0}")]
    DuplicateKind(MessageKind),
    #[error("Undefined is the fallback kind and cannot have an entry")]
    UndefinedEntry,
    #[error("unknown message kind '{0}'")]
    UnknownKind(String),
    #[error("no entry registered for {0}")]
    MissingKind(MessageKind),
    #[error("pattern for {kind} has {found} capture groups, decoder needs {expected}")]
    CaptureCount {
        kind: MessageKind,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone)]
pub struct ClassifierEntry {
    kind: MessageKind,
    pattern: Regex,
    decoder: Decoder,
    shape: PayloadShape,
}

impl ClassifierEntry {
    pub fn new(kind: MessageKind, pattern: &str, decoder: Decoder) -> Result<Self, RegistryError> {
        if kind == MessageKind::Undefined {
            return Err(RegistryError::UndefinedEntry);
        }
        let pattern =
            Regex::new(pattern).map_err(|source| RegistryError::InvalidPattern { kind, source })?;
        Ok(Self {
            kind,
            pattern,
            decoder,
            shape: kind.shape(),
        })
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn shape(&self) -> PayloadShape {
        self.shape
    }

    /// Number of capture groups, not counting the implicit whole match.
    fn group_count(&self) -> usize {
        self.pattern.captures_len() - 1
    }
}

/// Outcome of classifying one body.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: MessageKind,
    pub payload: Option<Payload>,
    pub error: Option<DecodeError>,
}

#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<ClassifierEntry>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    /// Build a registry from an explicit, ordered table.
    pub fn new(entries: Vec<ClassifierEntry>) -> Result<Self, RegistryError> {
        for (idx, entry) in entries.iter().enumerate() {
            if entries[..idx].iter().any(|e| e.kind == entry.kind) {
                return Err(RegistryError::DuplicateKind(entry.kind));
            }
        }
        Ok(Self { entries })
    }

    /// The game's message kinds, in evaluation order.
    pub fn builtin() -> Self {
        let table: [(MessageKind, &str, Decoder); 5] = [
            (
                MessageKind::MatchmakingStatus,
                MATCHMAKING_STATUS_PATTERN,
                decode_matchmaking_status,
            ),
            (
                MessageKind::GamePhaseChange,
                GAME_PHASE_CHANGE_PATTERN,
                decode_game_phase,
            ),
            (MessageKind::GoalScored, GOAL_SCORED_PATTERN, decode_goal_scored),
            (MessageKind::SetResult, SET_RESULT_PATTERN, decode_set_result),
            (MessageKind::MatchResult, MATCH_RESULT_PATTERN, decode_match_result),
        ];

        let entries = table
            .into_iter()
            .map(|(kind, pattern, decoder)| {
                ClassifierEntry::new(kind, pattern, decoder).expect("builtin pattern is valid")
            })
            .collect();
        Self { entries }
    }

    /// Built-in registry with patterns replaced by kind name.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self, RegistryError> {
        let mut registry = Self::builtin();
        for (name, pattern) in overrides {
            let kind: MessageKind = name
                .parse()
                .map_err(|_| RegistryError::UnknownKind(name.clone()))?;
            registry.override_pattern(kind, pattern)?;
        }
        Ok(registry)
    }

    /// Swap the pattern of an existing entry, keeping its decoder and position.
    pub fn override_pattern(
        &mut self,
        kind: MessageKind,
        pattern: &str,
    ) -> Result<(), RegistryError> {
        if kind == MessageKind::Undefined {
            return Err(RegistryError::UndefinedEntry);
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.kind == kind)
            .ok_or(RegistryError::MissingKind(kind))?;

        let replacement = ClassifierEntry::new(kind, pattern, entry.decoder)?;
        if replacement.group_count() < entry.group_count() {
            return Err(RegistryError::CaptureCount {
                kind,
                expected: entry.group_count(),
                found: replacement.group_count(),
            });
        }
        *entry = replacement;
        Ok(())
    }

    pub fn entries(&self) -> &[ClassifierEntry] {
        &self.entries
    }

    pub fn entry(&self, kind: MessageKind) -> Option<&ClassifierEntry> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    /// Classify a message body against the table, first match wins.
    ///
    /// A matched pattern whose decoder fails keeps the matched kind and
    /// records the error with no payload. No match at all is `Undefined`
    /// with the raw body as payload.
    pub fn classify(&self, body: &str) -> Classification {
        for entry in &self.entries {
            let Some(caps) = entry.pattern.captures(body) else {
                continue;
            };
            return match (entry.decoder)(&caps) {
                Ok(payload) => Classification {
                    kind: entry.kind,
                    payload: Some(payload),
                    error: None,
                },
                Err(err) => Classification {
                    kind: entry.kind,
                    payload: None,
                    error: Some(err),
                },
            };
        }

        Classification {
            kind: MessageKind::Undefined,
            payload: Some(Payload::Raw(body.to_string())),
            error: None,
        }
    }
}

fn capture<'h>(caps: &Captures<'h>, idx: usize) -> Result<&'h str, DecodeError> {
    caps.get(idx)
        .map(|m| m.as_str())
        .ok_or(DecodeError::MissingCapture(idx))
}

pub fn decode_matchmaking_status(caps: &Captures<'_>) -> Result<Payload, DecodeError> {
    let raw = capture(caps, 1)?;
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => Ok(Payload::MatchmakingStatus(map)),
        Ok(other) => Err(DecodeError::MalformedStatus(format!(
            "expected an object, found {other}"
        ))),
        Err(e) => Err(DecodeError::MalformedStatus(e.to_string())),
    }
}

pub fn decode_game_phase(caps: &Captures<'_>) -> Result<Payload, DecodeError> {
    let raw = capture(caps, 1)?;
    let name = raw
        .strip_prefix(MATCH_PHASE_PREFIX)
        .ok_or_else(|| DecodeError::MissingPhasePrefix(raw.to_string()))?;
    GamePhase::from_name(name)
        .map(Payload::GamePhase)
        .ok_or_else(|| DecodeError::UnknownPhase(name.to_string()))
}

pub fn decode_goal_scored(caps: &Captures<'_>) -> Result<Payload, DecodeError> {
    let token = capture(caps, 1)?;
    let raw_score = capture(caps, 2)?;

    let score: i64 = raw_score
        .trim()
        .parse()
        .map_err(|_| DecodeError::InvalidScore(raw_score.to_string()))?;
    if score == 0 {
        return Err(DecodeError::ScoreReset);
    }
    if !(1..=MAX_SET_SCORE).contains(&score) {
        return Err(DecodeError::ScoreOutOfRange(score));
    }

    let team = Team::from_token(token).ok_or_else(|| DecodeError::UnknownTeam(token.to_string()))?;
    Ok(Payload::GoalScored(GoalScoredEvent {
        team,
        new_score: score as u8,
    }))
}

pub fn decode_set_result(caps: &Captures<'_>) -> Result<Payload, DecodeError> {
    let winner = TeamRef::resolve(capture(caps, 1)?);
    Ok(Payload::SetResult { winner })
}

pub fn decode_match_result(caps: &Captures<'_>) -> Result<Payload, DecodeError> {
    let winner = TeamRef::resolve(capture(caps, 1)?);
    Ok(Payload::MatchResult { winner })
}
