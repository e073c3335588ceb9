use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{instrument, warn};

use crate::error::StoreError;
use crate::levels::{DifficultyLevel, GameMode};
use crate::notes::NoteId;
use crate::store::KeyValueStore;

/// Outcome of one finished game, handed to persistence and the results screen.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionResult {
    pub mode: GameMode,
    pub difficulty: DifficultyLevel,
    pub score: u32,
    pub max_streak: u32,
    pub correct_answers: u32,
    pub total_answers: u32,
    /// Every note missed so far, including those carried in from earlier games.
    pub missed_notes: Vec<NoteId>,
    pub started_at: OffsetDateTime,
    pub ended_at: OffsetDateTime,
}

impl SessionResult {
    /// Percentage of answered questions that were correct, rounded.
    pub fn accuracy(&self) -> u32 {
        accuracy_percent(self.correct_answers, self.total_answers)
    }
}

pub fn accuracy_percent(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(correct) * 100.0 / f64::from(total)).round() as u32
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ProgressRecord {
    pub best_score: u32,
    pub best_streak: u32,
    pub total_games: u32,
    pub total_score: u64,
    pub missed_notes: Vec<NoteId>,
    pub last_played: Option<OffsetDateTime>,
}

impl ProgressRecord {
    /// Folds a finished game into the record. Missed notes are replaced, not merged.
    pub fn merged(&self, result: &SessionResult, now: OffsetDateTime) -> Self {
        Self {
            best_score: self.best_score.max(result.score),
            best_streak: self.best_streak.max(result.max_streak),
            total_games: self.total_games.saturating_add(1),
            total_score: self.total_score.saturating_add(u64::from(result.score)),
            missed_notes: result.missed_notes.clone(),
            last_played: Some(now),
        }
    }

    pub fn average_score(&self) -> u64 {
        if self.total_games == 0 {
            0
        } else {
            self.total_score / u64::from(self.total_games)
        }
    }
}

const BEST_SCORE: &str = "bestScore";
const BEST_STREAK: &str = "bestStreak";
const TOTAL_GAMES: &str = "totalGames";
const TOTAL_SCORE: &str = "totalScore";
const MISSED_NOTES: &str = "wrongNotes";
const LAST_PLAYED: &str = "lastPlayed";

/// Reads and writes the progress record as namespaced JSON values.
#[derive(Clone)]
pub struct ProgressStore {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl ProgressStore {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    fn key(&self, field: &str) -> String {
        format!("{}_{}", self.namespace, field)
    }

    fn read_field<T: DeserializeOwned>(&self, field: &str) -> Option<T> {
        let key = self.key(field);
        match self.store.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!(%key, %err, "ignoring malformed progress value");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(%key, %err, "progress store unavailable, using default");
                None
            }
        }
    }

    fn write_field<T: Serialize>(&self, field: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(&self.key(field), &raw)
    }

    /// Never fails: any missing or unreadable field takes its default.
    pub fn load(&self) -> ProgressRecord {
        ProgressRecord {
            best_score: self.read_field(BEST_SCORE).unwrap_or_default(),
            best_streak: self.read_field(BEST_STREAK).unwrap_or_default(),
            total_games: self.read_field(TOTAL_GAMES).unwrap_or_default(),
            total_score: self.read_field(TOTAL_SCORE).unwrap_or_default(),
            missed_notes: self.read_field(MISSED_NOTES).unwrap_or_default(),
            last_played: self
                .read_field::<i64>(LAST_PLAYED)
                .and_then(from_unix_millis),
        }
    }

    #[instrument(skip(self, result), fields(score = result.score, namespace = %self.namespace))]
    pub fn save(
        &self,
        result: &SessionResult,
        now: OffsetDateTime,
    ) -> Result<ProgressRecord, StoreError> {
        let record = self.load().merged(result, now);
        self.write_field(BEST_SCORE, &record.best_score)?;
        self.write_field(BEST_STREAK, &record.best_streak)?;
        self.write_field(TOTAL_GAMES, &record.total_games)?;
        self.write_field(TOTAL_SCORE, &record.total_score)?;
        self.write_field(MISSED_NOTES, &record.missed_notes)?;
        self.write_field(LAST_PLAYED, &unix_millis(now))?;
        Ok(record)
    }
}

fn unix_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

fn from_unix_millis(millis: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}
