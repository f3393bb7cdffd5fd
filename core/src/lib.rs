pub mod context;
pub mod game_data;
pub mod game_log;
pub mod handlers;
pub mod match_state;
pub mod service;
pub mod signal_processor;
pub mod state;

// Re-exports for convenience
pub use context::{AppConfig, AppConfigExt, ParsingSession};
pub use game_data::{GamePhase, Team, TeamRef};
pub use game_log::{LineParser, MessageKind, ParsedLine, Payload, Registry};
pub use match_state::{MatchResults, MatchState, SetResult};
pub use service::{PipelineError, run_pipeline};
pub use signal_processor::{EventProcessor, GameSignal, SignalHandler};
pub use state::SessionCache;
