//! In-memory model of one match and the mutators that fold events into it.
//!
//! Each mutator applies exactly one event and can be called on its own; the
//! phase-driven orchestration that decides *when* to call them lives in
//! [`crate::signal_processor`].

mod results;
mod state;


pub use results::{MatchResults, Player, PlayerStats, Rosters, SetResult};
pub use state::{MatchError, MatchState};
