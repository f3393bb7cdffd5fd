use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix the game puts in front of every phase name it logs.
pub const MATCH_PHASE_PREFIX: &str = "EMatchPhase::";

/// Closed set of match phases the game reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GamePhase {
    ArenaOverview,
    BanCelebration,
    BanSelect,
    CharacterPreSelect,
    CharacterSelect,
    FaceOffCountdown,
    FaceOffIntro,
    GoalCelebration,
    GoalScore,
    InGame,
    Intermission,
    IntermissionIntro,
    IntermissionMvp,
    IntermissionOutro,
    LoadoutSelect,
    None,
    PostGameCelebration,
    PostGameSummary,
    #[default]
    PreGame,
    VersusScreen,
}

static PHASES: phf::Map<&'static str, GamePhase> = phf::phf_map! {
    "ArenaOverview" => GamePhase::ArenaOverview,
    "BanCelebration" => GamePhase::BanCelebration,
    "BanSelect" => GamePhase::BanSelect,
    "CharacterPreSelect" => GamePhase::CharacterPreSelect,
    "CharacterSelect" => GamePhase::CharacterSelect,
    "FaceOffCountdown" => GamePhase::FaceOffCountdown,
    "FaceOffIntro" => GamePhase::FaceOffIntro,
    "GoalCelebration" => GamePhase::GoalCelebration,
    "GoalScore" => GamePhase::GoalScore,
    "InGame" => GamePhase::InGame,
    "Intermission" => GamePhase::Intermission,
    "IntermissionIntro" => GamePhase::IntermissionIntro,
    "IntermissionMvp" => GamePhase::IntermissionMvp,
    "IntermissionOutro" => GamePhase::IntermissionOutro,
    "LoadoutSelect" => GamePhase::LoadoutSelect,
    "None" => GamePhase::None,
    "PostGameCelebration" => GamePhase::PostGameCelebration,
    "PostGameSummary" => GamePhase::PostGameSummary,
    "PreGame" => GamePhase::PreGame,
    "VersusScreen" => GamePhase::VersusScreen,
};

impl GamePhase {
    /// Look up a bare phase name (no `EMatchPhase::` prefix).
    pub fn from_name(name: &str) -> Option<Self> {
        PHASES.get(name).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ArenaOverview => "ArenaOverview",
            Self::BanCelebration => "BanCelebration",
            Self::BanSelect => "BanSelect",
            Self::CharacterPreSelect => "CharacterPreSelect",
            Self::CharacterSelect => "CharacterSelect",
            Self::FaceOffCountdown => "FaceOffCountdown",
            Self::FaceOffIntro => "FaceOffIntro",
            Self::GoalCelebration => "GoalCelebration",
            Self::GoalScore => "GoalScore",
            Self::InGame => "InGame",
            Self::Intermission => "Intermission",
            Self::IntermissionIntro => "IntermissionIntro",
            Self::IntermissionMvp => "IntermissionMvp",
            Self::IntermissionOutro => "IntermissionOutro",
            Self::LoadoutSelect => "LoadoutSelect",
            Self::None => "None",
            Self::PostGameCelebration => "PostGameCelebration",
            Self::PostGameSummary => "PostGameSummary",
            Self::PreGame => "PreGame",
            Self::VersusScreen => "VersusScreen",
        }
    }

    /// Lobby phases; entering one after play has begun means a new match.
    pub fn is_pre_match(&self) -> bool {
        matches!(
            self,
            Self::PreGame
                | Self::CharacterPreSelect
                | Self::CharacterSelect
                | Self::BanSelect
                | Self::BanCelebration
                | Self::LoadoutSelect
        )
    }

    /// Phases in which the ball is (about to be) live.
    pub fn is_play(&self) -> bool {
        matches!(self, Self::FaceOffIntro | Self::FaceOffCountdown | Self::InGame)
    }

    pub fn is_post_game(&self) -> bool {
        matches!(self, Self::PostGameCelebration | Self::PostGameSummary)
    }
}

impl FromStr for GamePhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_table_is_closed_and_consistent() {
        assert_eq!(PHASES.len(), 20);
        for (name, phase) in PHASES.entries() {
            assert_eq!(phase.name(), *name);
        }
    }

    #[test]
    fn test_unknown_phase_rejected() {
        assert_eq!(GamePhase::from_name("InGame"), Some(GamePhase::InGame));
        assert_eq!(GamePhase::from_name("Unknown"), None);
        assert_eq!(GamePhase::from_name("ingame"), None);
        assert!("EMatchPhase::InGame".parse::<GamePhase>().is_err());
    }

    #[test]
    fn test_phase_groups_are_disjoint() {
        for phase in PHASES.values() {
            let groups = [phase.is_pre_match(), phase.is_play(), phase.is_post_game()];
            assert!(groups.iter().filter(|g| **g).count() <= 1, "{phase}");
        }
    }
}
