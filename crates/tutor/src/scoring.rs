use notefy_domain::{DifficultyLevel, GameMode, NoteId, Outcome, PitchLetter};

const BASE_POINTS: u32 = 10;
const STREAK_MULTIPLIER: u32 = 2;
const CHALLENGE_BONUS: u32 = 5;

pub struct ScoringEngine;

impl ScoringEngine {
    pub fn judge(&self, note: NoteId, chosen: PitchLetter) -> Outcome {
        if note.letter() == chosen {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        }
    }

    /// Points for a correct answer. `streak` is the run length before this
    /// answer is counted.
    pub fn score_correct_answer(
        &self,
        streak: u32,
        difficulty: DifficultyLevel,
        mode: GameMode,
    ) -> u32 {
        let streak_bonus = streak.saturating_mul(STREAK_MULTIPLIER);
        let difficulty_bonus = match difficulty {
            DifficultyLevel::Beginner => 0,
            DifficultyLevel::Intermediate => 5,
            DifficultyLevel::Advanced => 10,
        };
        let mode_bonus = match mode {
            GameMode::Challenge => CHALLENGE_BONUS,
            GameMode::Practice | GameMode::Review => 0,
        };
        BASE_POINTS
            .saturating_add(streak_bonus)
            .saturating_add(difficulty_bonus)
            .saturating_add(mode_bonus)
    }
}
