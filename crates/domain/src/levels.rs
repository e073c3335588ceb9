use serde::{Deserialize, Serialize};

use crate::notes::NoteId;
use crate::rules::GameRules;

use NoteId::*;

const BEGINNER: &[NoteId] = &[C4, D4, E4, F4, G4, A4, B4, C5];

const INTERMEDIATE: &[NoteId] = &[
    C3, D3, E3, F3, G3, A3, B3, C4, D4, E4, F4, G4, A4, B4, C5, D5, E5, F5,
];

const ADVANCED: &[NoteId] = &[
    C3, D3, E3, F3, G3, A3, B3, C4, D4, E4, F4, G4, A4, B4, C5, D5, E5, F5, G5, A5, B5, C6,
];

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Beginner,
        DifficultyLevel::Intermediate,
        DifficultyLevel::Advanced,
    ];

    /// Notes eligible for questions at this level.
    pub fn pool(self) -> &'static [NoteId] {
        match self {
            Self::Beginner => BEGINNER,
            Self::Intermediate => INTERMEDIATE,
            Self::Advanced => ADVANCED,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Practice,
    Challenge,
    Review,
}

/// Question count and timer for a game about to start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModePolicy {
    pub total_questions: u32,
    pub countdown_secs: Option<u32>,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Practice, GameMode::Challenge, GameMode::Review];

    pub fn policy(self, missed_count: usize, rules: &GameRules) -> ModePolicy {
        match self {
            Self::Practice => ModePolicy {
                total_questions: rules.practice_questions,
                countdown_secs: None,
            },
            Self::Challenge => ModePolicy {
                total_questions: rules.challenge_questions,
                countdown_secs: Some(rules.challenge_seconds),
            },
            Self::Review => ModePolicy {
                total_questions: match u32::try_from(missed_count) {
                    Ok(0) => rules.review_fallback_questions,
                    Ok(count) => count,
                    Err(_) => u32::MAX,
                },
                countdown_secs: None,
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Practice => "Practice",
            Self::Challenge => "Challenge",
            Self::Review => "Review",
        }
    }
}
