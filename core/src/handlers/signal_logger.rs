use crate::game_log::ParsedLine;
use crate::signal_processor::{GameSignal, SignalHandler};

/// Logs match outcomes as they happen.
/// Goals and results at info, phase and lobby chatter at debug.
#[derive(Debug, Default)]
pub struct SignalLogger {
    /// Also log every decode failure, at debug.
    pub log_decode_errors: bool,
}

impl SignalLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decode_errors(log_decode_errors: bool) -> Self {
        Self { log_decode_errors }
    }
}

impl SignalHandler for SignalLogger {
    fn handle_signal(&mut self, signal: &GameSignal) {
        match signal {
            GameSignal::MatchStarted {
                match_id,
                timestamp,
            } => {
                tracing::info!(match_id, %timestamp, "Match started");
            }
            GameSignal::MatchEnded {
                match_id,
                duration_secs,
                ..
            } => {
                tracing::info!(match_id, duration_secs = ?duration_secs, "Match ended");
            }
            GameSignal::PhaseChanged { from, to, .. } => {
                tracing::debug!(%from, %to, "Game phase changed");
            }
            GameSignal::SetStarted { match_id, set, .. } => {
                tracing::info!(match_id, set, "Set started");
            }
            GameSignal::GoalScored {
                set,
                team,
                team_one_score,
                team_two_score,
                ..
            } => {
                tracing::info!(
                    set,
                    %team,
                    score = %format!("{team_one_score}-{team_two_score}"),
                    "Goal scored"
                );
            }
            GameSignal::SetWon { set, winner, .. } => {
                tracing::info!(set, %winner, "Set won");
            }
            GameSignal::MatchWon {
                match_id, winner, ..
            } => {
                tracing::info!(match_id, %winner, "Match won");
            }
            GameSignal::MatchmakingStatusChanged { status, .. } => {
                tracing::debug!(status = %serde_json::Value::Object(status.clone()), "Matchmaking status");
            }
        }
    }

    fn handle_line(&mut self, line: &ParsedLine) {
        if self.log_decode_errors
            && let Some(err) = &line.error
        {
            tracing::debug!(line = line.line_number, kind = %line.kind, error = %err, "Undecodable line");
        }
    }
}
