//! Tests for phase-driven match orchestration.
//!
//! Lines go through the real parser so the tests exercise the same path as a
//! tailed log.

use super::{EventProcessor, GameSignal};
use crate::game_data::{GamePhase, Team, TeamRef};
use crate::game_log::{LineParser, ParsedLine};
use crate::state::SessionCache;

struct Harness {
    parser: LineParser,
    processor: EventProcessor,
    cache: SessionCache,
    line_number: u64,
    second: u32,
}

impl Harness {
    fn new() -> Self {
        Self {
            parser: LineParser::default(),
            processor: EventProcessor::new(),
            cache: SessionCache::default(),
            line_number: 0,
            second: 0,
        }
    }

    fn line(&mut self, body: &str) -> ParsedLine {
        self.line_number += 1;
        self.second += 1;
        let raw = format!(
            "[2024.03.09-19.{:02}.{:02}:000][ 12]LogTemp: {body}",
            self.second / 60,
            self.second % 60
        );
        self.parser.parse(self.line_number, &raw).unwrap()
    }

    fn feed(&mut self, body: &str) -> Vec<GameSignal> {
        let line = self.line(body);
        self.processor.process_line(&line, &mut self.cache)
    }

    fn phase(&mut self, phase: &str) -> Vec<GameSignal> {
        self.feed(&format!(
            "APMGameState::PerformCurrentMatchPhaseEvents Current[EMatchPhase::{phase}]"
        ))
    }

    fn goal(&mut self, team: &str, to: u8) -> Vec<GameSignal> {
        self.feed(&format!(
            "{team}'s NumPointsThisSet changed from {} to {to}",
            to.saturating_sub(1)
        ))
    }

    fn set_won(&mut self, team: &str) -> Vec<GameSignal> {
        self.feed(&format!(
            "TeamThatWonSet changed from '<unset>' to 'EAssignedTeam::{team}'"
        ))
    }

    fn match_won(&mut self, team: &str) -> Vec<GameSignal> {
        self.feed(&format!(
            "TeamThatWonMatch changed from '<unset>' to 'EAssignedTeam::{team}'"
        ))
    }

    /// Phase sequence leading into a face-off.
    fn into_set(&mut self) -> Vec<GameSignal> {
        let mut signals = self.phase("VersusScreen");
        signals.extend(self.phase("FaceOffIntro"));
        signals.extend(self.phase("FaceOffCountdown"));
        signals.extend(self.phase("InGame"));
        signals
    }

    /// Score three goals for `team` and award it the set.
    fn win_set(&mut self, team: &str) {
        self.into_set();
        for score in 1..=3 {
            self.goal(team, score);
            self.phase("GoalScore");
            self.phase("GoalCelebration");
            if score < 3 {
                self.phase("FaceOffIntro");
                self.phase("InGame");
            }
        }
        self.set_won(team);
        self.phase("Intermission");
    }
}

fn count<F: Fn(&GameSignal) -> bool>(signals: &[GameSignal], pred: F) -> usize {
    signals.iter().filter(|s| pred(s)).count()
}

#[test]
fn test_first_face_off_starts_match_and_set() {
    let mut h = Harness::new();
    h.phase("CharacterSelect");
    let signals = h.into_set();

    assert_eq!(count(&signals, |s| matches!(s, GameSignal::MatchStarted { .. })), 1);
    assert_eq!(
        count(&signals, |s| matches!(s, GameSignal::SetStarted { set: 1, .. })),
        1
    );
    let m = h.cache.current_match();
    assert_eq!(m.current_set, 1);
    assert_eq!(m.phase, GamePhase::InGame);
    assert!(m.start.is_some());
}

#[test]
fn test_goals_between_face_offs_stay_in_one_set() {
    let mut h = Harness::new();
    h.into_set();
    h.goal("TeamOne", 1);
    h.phase("GoalCelebration");
    h.phase("FaceOffIntro");
    h.phase("InGame");
    let signals = h.goal("TeamTwo", 1);

    assert_eq!(
        signals,
        vec![GameSignal::GoalScored {
            match_id: 0,
            set: 1,
            team: Team::TeamTwo,
            team_one_score: 1,
            team_two_score: 1,
            timestamp: signals[0].timestamp(),
        }]
    );
    assert_eq!(h.cache.current_match().current_set, 1);
}

#[test]
fn test_set_winner_then_face_off_opens_next_set() {
    let mut h = Harness::new();
    h.win_set("TeamTwo");
    let signals = h.into_set();

    assert_eq!(
        count(&signals, |s| matches!(s, GameSignal::SetStarted { set: 2, .. })),
        1
    );
    assert_eq!(count(&signals, |s| matches!(s, GameSignal::MatchStarted { .. })), 0);

    let results = &h.cache.current_match().results;
    assert_eq!(results.sets[&1].team_two_score, 3);
    assert_eq!(results.sets[&1].winner, Some(TeamRef::Known(Team::TeamTwo)));
    assert_eq!(results.sets[&2].team_two_score, 0);
    assert_eq!(results.winner, None);
}

#[test]
fn test_full_match_lifecycle() {
    let mut h = Harness::new();
    h.phase("CharacterSelect");
    h.win_set("TeamOne");
    h.win_set("TeamTwo");
    h.win_set("TeamOne");
    let won = h.match_won("TeamOne");
    assert!(matches!(
        won.as_slice(),
        [GameSignal::MatchWon {
            winner: TeamRef::Known(Team::TeamOne),
            ..
        }]
    ));

    let ended = h.phase("PostGameCelebration");
    assert_eq!(count(&ended, |s| matches!(s, GameSignal::MatchEnded { .. })), 1);
    assert!(h.phase("PostGameSummary").iter().all(|s| !matches!(s, GameSignal::MatchEnded { .. })));

    let m = h.cache.current_match();
    assert_eq!(m.current_set, 3);
    assert_eq!(m.results.sets_won(Team::TeamOne), 2);
    assert_eq!(m.results.sets_won(Team::TeamTwo), 1);
    assert!(m.match_duration().unwrap().num_seconds() > 0);

    // Back to the lobby: match archived, fresh one opened
    let signals = h.phase("CharacterPreSelect");
    assert!(signals.iter().all(|s| !matches!(s, GameSignal::MatchEnded { .. })));
    assert_eq!(h.cache.current_match().id, 1);
    assert_eq!(h.cache.current_match().phase, GamePhase::CharacterPreSelect);
    assert_eq!(h.cache.current_match().current_set, 0);

    let archived = h.cache.last_completed_match().unwrap();
    assert_eq!(archived.id, 0);
    assert_eq!(archived.results.winner, Some(TeamRef::Known(Team::TeamOne)));
}

#[test]
fn test_face_off_after_post_game_opens_next_match() {
    let mut h = Harness::new();
    h.win_set("TeamOne");
    h.match_won("TeamOne");
    h.phase("PostGameSummary");
    h.phase("ArenaOverview");

    let signals = h.into_set();
    assert!(signals.iter().all(|s| !matches!(s, GameSignal::MatchEnded { .. })));
    assert!(matches!(
        signals
            .iter()
            .find(|s| matches!(s, GameSignal::MatchStarted { .. })),
        Some(GameSignal::MatchStarted { match_id: 1, .. })
    ));
    h.goal("TeamTwo", 1);

    let m = h.cache.current_match();
    assert_eq!(m.id, 1);
    assert_eq!(m.current_set, 1);
    assert_eq!(m.results.sets[&1].team_two_score, 1);
    assert!(!m.is_finished());

    let archived = h.cache.last_completed_match().unwrap();
    assert_eq!(archived.id, 0);
    assert_eq!(archived.results.sets.len(), 1);
    assert_eq!(archived.results.sets[&1].team_two_score, 0);
    assert_eq!(archived.results.winner, Some(TeamRef::Known(Team::TeamOne)));
}

#[test]
fn test_abandoned_match_is_closed_by_lobby() {
    let mut h = Harness::new();
    h.into_set();
    h.goal("TeamOne", 1);

    let signals = h.phase("CharacterSelect");
    assert!(matches!(
        signals.first(),
        Some(GameSignal::MatchEnded { match_id: 0, .. })
    ));
    assert_eq!(h.cache.current_match().id, 1);
    assert!(h.cache.last_completed_match().unwrap().is_finished());
}

#[test]
fn test_goal_before_any_set_opens_one() {
    let mut h = Harness::new();
    let signals = h.goal("TeamTwo", 2);

    assert!(matches!(signals[0], GameSignal::MatchStarted { .. }));
    assert!(matches!(signals[1], GameSignal::SetStarted { set: 1, .. }));
    assert!(matches!(
        signals[2],
        GameSignal::GoalScored {
            team: Team::TeamTwo,
            team_two_score: 1,
            ..
        }
    ));
}

#[test]
fn test_set_result_without_set_is_ignored() {
    let mut h = Harness::new();
    assert!(h.set_won("TeamOne").is_empty());
    assert_eq!(h.processor.stats().rejected_events, 1);
    assert!(h.cache.current_match().results.sets.is_empty());
}

#[test]
fn test_undecodable_and_unknown_lines_change_nothing() {
    let mut h = Harness::new();
    h.into_set();
    let before = h.cache.current_match().clone();

    assert!(h.goal("TeamOne", 0).is_empty());
    assert!(h.goal("TeamOne", 4).is_empty());
    assert!(h.phase("Overtime").is_empty());
    assert!(h.feed("LogStreaming: nothing interesting").is_empty());

    assert_eq!(h.cache.current_match(), &before);
    let stats = h.processor.stats();
    assert_eq!(stats.decode_errors, 3);
    assert_eq!(stats.lines, 8);
}

#[test]
fn test_repeated_phase_is_not_a_change() {
    let mut h = Harness::new();
    assert!(h.phase("PreGame").is_empty());
    assert_eq!(h.phase("ArenaOverview").len(), 1);
}

#[test]
fn test_matchmaking_status_signal() {
    let mut h = Harness::new();
    let signals = h.feed(r#"Matchmaking Status: {"status":"MatchFound"}"#);
    let [GameSignal::MatchmakingStatusChanged { status, .. }] = signals.as_slice() else {
        panic!("unexpected signals {signals:?}");
    };
    assert_eq!(status["status"], "MatchFound");
}

#[test]
fn test_signals_carry_log_timestamps() {
    let mut h = Harness::new();
    let signals = h.phase("FaceOffIntro");
    let expected = h.line("x").parsed_timestamp().unwrap() - chrono::TimeDelta::seconds(1);
    assert!(signals.iter().all(|s| s.timestamp() == expected));
}
