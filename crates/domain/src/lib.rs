pub mod clock;
pub mod error;
pub mod levels;
pub mod notes;
pub mod progress;
pub mod rules;
pub mod store;

pub use crate::clock::Clock;
pub use crate::error::{DomainError, StoreError};
pub use crate::levels::{DifficultyLevel, GameMode, ModePolicy};
pub use crate::notes::{NoteId, PitchLetter, StaffPosition};
pub use crate::progress::{accuracy_percent, ProgressRecord, ProgressStore, SessionResult};
pub use crate::rules::GameRules;
pub use crate::store::{JsonFileStore, KeyValueStore, MemoryStore};

use serde::{Deserialize, Serialize};

/// Whether an answer named the displayed note's letter.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Outcome {
    Correct,
    Incorrect,
}

impl Outcome {
    pub fn is_correct(self) -> bool {
        matches!(self, Outcome::Correct)
    }
}
