use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Tunable game parameters; every field falls back to its default when absent.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameRules {
    pub practice_questions: u32,
    pub challenge_questions: u32,
    /// Review length when there are no missed notes to revisit.
    pub review_fallback_questions: u32,
    pub challenge_seconds: u32,
    pub feedback_delay_ms: u64,
    /// Prefix for persisted progress keys.
    pub storage_namespace: String,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            practice_questions: 10,
            challenge_questions: 20,
            review_fallback_questions: 5,
            challenge_seconds: 60,
            feedback_delay_ms: 1500,
            storage_namespace: "notefy".to_string(),
        }
    }
}

impl GameRules {
    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.practice_questions == 0
            || self.challenge_questions == 0
            || self.review_fallback_questions == 0
        {
            return Err(DomainError::validation(
                "question counts must be at least one",
            ));
        }
        if self.challenge_seconds == 0 {
            return Err(DomainError::validation(
                "challenge countdown must be at least one second",
            ));
        }
        if self.storage_namespace.trim().is_empty() {
            return Err(DomainError::validation("storage namespace cannot be empty"));
        }
        Ok(())
    }
}
