use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::debug;

use notefy_domain::{DifficultyLevel, GameMode, NoteId};

/// Picks the next note to show. Each draw is independent, so notes may repeat.
pub fn next_note<R: Rng + ?Sized>(
    mode: GameMode,
    difficulty: DifficultyLevel,
    missed_notes: &[NoteId],
    rng: &mut R,
) -> NoteId {
    let pool = if mode == GameMode::Review && !missed_notes.is_empty() {
        missed_notes
    } else {
        difficulty.pool()
    };
    let note = pool.choose(rng).copied().unwrap_or(NoteId::C4);
    debug!(?mode, ?difficulty, %note, pool = pool.len(), "generated question");
    note
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn draws_stay_inside_the_level_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        for level in DifficultyLevel::ALL {
            for mode in [GameMode::Practice, GameMode::Challenge] {
                for _ in 0..200 {
                    let note = next_note(mode, level, &[NoteId::C6], &mut rng);
                    assert!(level.pool().contains(&note), "{note} not in {level:?}");
                }
            }
        }
    }

    #[test]
    fn review_draws_only_missed_notes() {
        let mut rng = StdRng::seed_from_u64(11);
        let missed = [NoteId::A5, NoteId::D3];
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let note = next_note(GameMode::Review, DifficultyLevel::Beginner, &missed, &mut rng);
            assert!(missed.contains(&note));
            seen.insert(note);
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn review_without_misses_falls_back_to_pool() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let note = next_note(GameMode::Review, DifficultyLevel::Beginner, &[], &mut rng);
            assert!(DifficultyLevel::Beginner.pool().contains(&note));
        }
    }

    #[test]
    fn every_pool_note_is_reachable() {
        let mut rng = StdRng::seed_from_u64(42);
        let pool = DifficultyLevel::Beginner.pool();
        let mut counts = vec![0usize; pool.len()];
        for _ in 0..4000 {
            let note = next_note(GameMode::Practice, DifficultyLevel::Beginner, &[], &mut rng);
            let index = pool.iter().position(|n| *n == note).unwrap();
            counts[index] += 1;
        }
        // 500 expected per note; a uniform draw stays well inside this band.
        assert!(counts.iter().all(|&c| (350..650).contains(&c)), "{counts:?}");
    }
}
