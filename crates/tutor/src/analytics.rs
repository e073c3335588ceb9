use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use notefy_domain::{NoteId, SessionResult};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionAnalytics {
    pub result: SessionResult,
}

impl SessionAnalytics {
    pub fn new(result: SessionResult) -> Self {
        Self { result }
    }

    /// Most-missed notes first; ties go to the lower note.
    pub fn weakest_notes(&self, limit: usize) -> Vec<(NoteId, usize)> {
        let mut counts: BTreeMap<NoteId, usize> = BTreeMap::new();
        for note in &self.result.missed_notes {
            *counts.entry(*note).or_default() += 1;
        }
        let mut ranked: Vec<(NoteId, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(limit);
        ranked
    }

    /// Zero to three stars by accuracy.
    pub fn rating(&self) -> u8 {
        match self.result.accuracy() {
            90.. => 3,
            70..=89 => 2,
            40..=69 => 1,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notefy_domain::clock::fixed_now;
    use notefy_domain::{DifficultyLevel, GameMode};

    fn result(correct: u32, total: u32, missed: Vec<NoteId>) -> SessionResult {
        SessionResult {
            mode: GameMode::Practice,
            difficulty: DifficultyLevel::Beginner,
            score: 0,
            max_streak: 0,
            correct_answers: correct,
            total_answers: total,
            missed_notes: missed,
            started_at: fixed_now(),
            ended_at: fixed_now(),
        }
    }

    #[test]
    fn ranks_missed_notes_by_frequency() {
        use NoteId::*;
        let analytics = SessionAnalytics::new(result(5, 10, vec![F4, A5, F4, C4, A5, F4]));
        assert_eq!(analytics.weakest_notes(2), vec![(F4, 3), (A5, 2)]);
        assert_eq!(analytics.weakest_notes(5).len(), 3);
        assert_eq!(analytics.weakest_notes(5)[2], (C4, 1));
    }

    #[test]
    fn rating_tracks_accuracy() {
        assert_eq!(SessionAnalytics::new(result(10, 10, vec![])).rating(), 3);
        assert_eq!(SessionAnalytics::new(result(7, 10, vec![])).rating(), 2);
        assert_eq!(SessionAnalytics::new(result(4, 10, vec![])).rating(), 1);
        assert_eq!(SessionAnalytics::new(result(0, 0, vec![])).rating(), 0);
    }
}
