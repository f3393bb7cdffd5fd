//! Static game vocabulary: match phases and teams.

mod phase;
mod team;

pub use phase::{GamePhase, MATCH_PHASE_PREFIX};
pub use team::{Team, TeamRef};
