use super::GameSignal;
use crate::game_log::ParsedLine;

/// Observer of the processed line stream.
///
/// Handlers see state changes after they happen and cannot influence them.
pub trait SignalHandler {
    fn handle_signal(&mut self, signal: &GameSignal);

    fn handle_signals(&mut self, signals: &[GameSignal]) {
        for signal in signals {
            self.handle_signal(signal);
        }
    }

    /// Called for every accepted line, classified or not, before its signals.
    fn handle_line(&mut self, _line: &ParsedLine) {}
}
