use crate::context::AppConfig;
use crate::game_log::{LineParser, ParsedLine, TailPosition};
use crate::match_state::MatchState;
use crate::signal_processor::{EventProcessor, GameSignal, ProcessorStats, SignalHandler};
use crate::state::SessionCache;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Owns everything needed to follow one log file: the parser, the match
/// state and the registered observers. All state mutation goes through here,
/// one line at a time, in file order.
pub struct ParsingSession {
    pub active_file: Option<PathBuf>,
    /// Position after the last line applied.
    pub position: TailPosition,
    pub session_cache: SessionCache,
    parser: Arc<LineParser>,
    processor: EventProcessor,
    signal_handlers: Vec<Box<dyn SignalHandler + Send + Sync>>,
}

impl ParsingSession {
    pub fn new(path: PathBuf, parser: Arc<LineParser>, history_capacity: usize) -> Self {
        Self {
            active_file: Some(path),
            position: TailPosition::default(),
            session_cache: SessionCache::new(history_capacity),
            parser,
            processor: EventProcessor::new(),
            signal_handlers: Vec::new(),
        }
    }

    pub fn parser(&self) -> Arc<LineParser> {
        Arc::clone(&self.parser)
    }

    pub fn stats(&self) -> ProcessorStats {
        self.processor.stats()
    }

    pub fn current_match(&self) -> &MatchState {
        self.session_cache.current_match()
    }

    /// Register a signal handler to receive game signals
    pub fn add_signal_handler(&mut self, handler: Box<dyn SignalHandler + Send + Sync>) {
        self.signal_handlers.push(handler);
    }

    /// Parse and apply one raw line. Returns false if the line was rejected.
    pub fn process_raw(&mut self, line_number: u64, raw: &str) -> bool {
        match self.parser.parse(line_number, raw) {
            Some(line) => {
                self.process_line(line);
                true
            }
            None => {
                tracing::trace!(line = line_number, "Ignored log line");
                false
            }
        }
    }

    /// Apply a single parsed line and dispatch its signals
    pub fn process_line(&mut self, line: ParsedLine) {
        let signals = self.processor.process_line(&line, &mut self.session_cache);
        self.dispatch(&line, &signals);
        if line.line_number > self.position.line_number {
            self.position.line_number = line.line_number;
        }
    }

    /// Apply lines in order
    pub fn process_lines(&mut self, lines: Vec<ParsedLine>) {
        for line in lines {
            self.process_line(line);
        }
    }

    fn dispatch(&mut self, line: &ParsedLine, signals: &[GameSignal]) {
        for handler in &mut self.signal_handlers {
            handler.handle_line(line);
            if !signals.is_empty() {
                handler.handle_signals(signals);
            }
        }
    }
}

/// Resolve a log file path, joining with log_directory if relative.
pub fn resolve_log_path(config: &AppConfig, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(&config.log_directory).join(path)
    }
}
