use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use notefy_domain::{
    accuracy_percent, Clock, DifficultyLevel, GameMode, GameRules, ModePolicy, NoteId, Outcome,
    PitchLetter, ProgressRecord, ProgressStore, SessionResult,
};

use crate::generator::next_note;
use crate::scoring::ScoringEngine;
use crate::timers::{Scheduler, TimerHandle, TimerKind};

const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Menu,
    Active,
    Paused,
    Ended,
}

/// Every input the shell can deliver to a running game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    SelectMode(GameMode),
    SelectDifficulty(DifficultyLevel),
    SubmitAnswer(PitchLetter),
    TogglePause,
    Skip,
    ToMenu,
    PlayAgain,
}

/// What changed, for the renderer, the audio player and the results screen.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Started {
        mode: GameMode,
        difficulty: DifficultyLevel,
        total_questions: u32,
        countdown_secs: Option<u32>,
    },
    QuestionShown {
        index: u32,
        total: u32,
        note: NoteId,
    },
    Answered {
        note: NoteId,
        chosen: PitchLetter,
        outcome: Outcome,
        points: u32,
        streak: u32,
    },
    TimerTick {
        remaining: u32,
    },
    Paused,
    Resumed,
    Ended(SessionResult),
    ReturnedToMenu,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionState {
    pub phase: Phase,
    pub mode: GameMode,
    pub difficulty: DifficultyLevel,
    /// 1-based number of the question on screen; 0 before the first one.
    pub question_index: u32,
    pub total_questions: u32,
    pub score: u32,
    pub streak: u32,
    pub max_streak: u32,
    pub correct_answers: u32,
    pub total_answers: u32,
    /// Seconds left on the challenge countdown.
    pub time_remaining: Option<u32>,
    pub current_note: Option<NoteId>,
    pub started_at: Option<OffsetDateTime>,
    /// Carried across games; never deduplicated.
    pub missed_notes: Vec<NoteId>,
}

impl SessionState {
    pub fn new(missed_notes: Vec<NoteId>) -> Self {
        Self {
            phase: Phase::Menu,
            mode: GameMode::default(),
            difficulty: DifficultyLevel::default(),
            question_index: 0,
            total_questions: 0,
            score: 0,
            streak: 0,
            max_streak: 0,
            correct_answers: 0,
            total_answers: 0,
            time_remaining: None,
            current_note: None,
            started_at: None,
            missed_notes,
        }
    }

    pub fn accuracy(&self) -> u32 {
        accuracy_percent(self.correct_answers, self.total_answers)
    }

    fn begin(&mut self, policy: ModePolicy, started_at: OffsetDateTime) {
        self.phase = Phase::Active;
        self.question_index = 0;
        self.total_questions = policy.total_questions;
        self.score = 0;
        self.streak = 0;
        self.max_streak = 0;
        self.correct_answers = 0;
        self.total_answers = 0;
        self.time_remaining = policy.countdown_secs;
        self.current_note = None;
        self.started_at = Some(started_at);
    }
}

/// One player's game context: owns the state, its timers, and persistence.
pub struct GameSession {
    state: SessionState,
    rules: GameRules,
    clock: Clock,
    rng: StdRng,
    scoring: ScoringEngine,
    timers: Scheduler,
    countdown: Option<TimerHandle>,
    feedback: Option<TimerHandle>,
    progress: ProgressStore,
    record: ProgressRecord,
    last_result: Option<SessionResult>,
}

impl GameSession {
    pub fn new(rules: GameRules, progress: ProgressStore) -> Self {
        let record = progress.load();
        info!(
            games = record.total_games,
            missed = record.missed_notes.len(),
            "loaded progress"
        );
        Self {
            state: SessionState::new(record.missed_notes.clone()),
            rules,
            clock: Clock::System,
            rng: StdRng::from_os_rng(),
            scoring: ScoringEngine,
            timers: Scheduler::new(),
            countdown: None,
            feedback: None,
            progress,
            record,
            last_result: None,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn progress(&self) -> &ProgressRecord {
        &self.record
    }

    pub fn last_result(&self) -> Option<&SessionResult> {
        self.last_result.as_ref()
    }

    /// True while the answer feedback window is open and answers are inert.
    pub fn feedback_pending(&self) -> bool {
        self.feedback.is_some()
    }

    pub fn dispatch(&mut self, command: Command) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match (self.state.phase, command) {
            (Phase::Menu, Command::SelectMode(mode)) => {
                self.state.mode = mode;
                self.start_game(&mut events);
            }
            (Phase::Menu, Command::SelectDifficulty(difficulty)) => {
                self.state.difficulty = difficulty;
            }
            (Phase::Active, Command::SubmitAnswer(chosen)) if self.feedback.is_none() => {
                self.submit_answer(chosen, &mut events);
            }
            (Phase::Active, Command::TogglePause) => {
                self.state.phase = Phase::Paused;
                events.push(GameEvent::Paused);
            }
            (Phase::Paused, Command::TogglePause) => {
                self.state.phase = Phase::Active;
                events.push(GameEvent::Resumed);
            }
            (Phase::Active, Command::Skip) if self.feedback.is_none() => {
                self.next_question(&mut events);
            }
            (Phase::Active | Phase::Paused | Phase::Ended, Command::ToMenu) => {
                self.shutdown();
                events.push(GameEvent::ReturnedToMenu);
            }
            (Phase::Ended, Command::PlayAgain) => {
                self.start_game(&mut events);
            }
            (phase, command) => {
                debug!(?phase, ?command, "ignoring command");
            }
        }
        events
    }

    /// Lets `elapsed` wall-clock time pass. Timers only run while Active, so a
    /// paused game resumes exactly where it stopped.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<GameEvent> {
        if let Ok(delta) = time::Duration::try_from(elapsed) {
            self.clock.advance(delta);
        }
        let mut events = Vec::new();
        if self.state.phase != Phase::Active {
            return events;
        }
        let until = self.timers.now() + elapsed;
        while let Some(kind) = self.timers.pop_due(until) {
            match kind {
                TimerKind::CountdownTick => self.countdown_tick(&mut events),
                TimerKind::FeedbackElapsed => {
                    self.feedback = None;
                    self.next_question(&mut events);
                }
            }
            if self.state.phase != Phase::Active {
                break;
            }
        }
        self.timers.settle(until);
        events
    }

    /// Releases every pending timer and returns to the menu without saving.
    pub fn shutdown(&mut self) {
        self.release_timers();
        self.state.phase = Phase::Menu;
        self.state.current_note = None;
        self.state.time_remaining = None;
    }

    fn release_timers(&mut self) {
        if let Some(handle) = self.countdown.take() {
            self.timers.cancel(handle);
        }
        if let Some(handle) = self.feedback.take() {
            self.timers.cancel(handle);
        }
        self.timers.cancel_all();
    }

    fn start_game(&mut self, events: &mut Vec<GameEvent>) {
        self.release_timers();
        let policy = self
            .state
            .mode
            .policy(self.state.missed_notes.len(), &self.rules);
        self.state.begin(policy, self.clock.now());
        if policy.countdown_secs.is_some() {
            self.countdown = Some(
                self.timers
                    .schedule_repeating(TimerKind::CountdownTick, COUNTDOWN_PERIOD),
            );
        }
        info!(
            mode = ?self.state.mode,
            difficulty = ?self.state.difficulty,
            total = policy.total_questions,
            "session started"
        );
        events.push(GameEvent::Started {
            mode: self.state.mode,
            difficulty: self.state.difficulty,
            total_questions: policy.total_questions,
            countdown_secs: policy.countdown_secs,
        });
        self.next_question(events);
    }

    fn next_question(&mut self, events: &mut Vec<GameEvent>) {
        if self.state.question_index >= self.state.total_questions {
            self.end_game(events);
            return;
        }
        self.state.question_index += 1;
        let note = next_note(
            self.state.mode,
            self.state.difficulty,
            &self.state.missed_notes,
            &mut self.rng,
        );
        self.state.current_note = Some(note);
        events.push(GameEvent::QuestionShown {
            index: self.state.question_index,
            total: self.state.total_questions,
            note,
        });
    }

    fn submit_answer(&mut self, chosen: PitchLetter, events: &mut Vec<GameEvent>) {
        let Some(note) = self.state.current_note else {
            return;
        };
        let outcome = self.scoring.judge(note, chosen);
        self.state.total_answers += 1;
        let points = match outcome {
            Outcome::Correct => {
                // Streak bonus uses the run length before this answer.
                let points = self.scoring.score_correct_answer(
                    self.state.streak,
                    self.state.difficulty,
                    self.state.mode,
                );
                self.state.score = self.state.score.saturating_add(points);
                self.state.streak += 1;
                self.state.max_streak = self.state.max_streak.max(self.state.streak);
                self.state.correct_answers += 1;
                points
            }
            Outcome::Incorrect => {
                self.state.streak = 0;
                self.state.missed_notes.push(note);
                0
            }
        };
        events.push(GameEvent::Answered {
            note,
            chosen,
            outcome,
            points,
            streak: self.state.streak,
        });
        self.feedback = Some(
            self.timers
                .schedule(TimerKind::FeedbackElapsed, self.rules.feedback_delay()),
        );
    }

    fn countdown_tick(&mut self, events: &mut Vec<GameEvent>) {
        let Some(remaining) = self.state.time_remaining else {
            return;
        };
        let remaining = remaining.saturating_sub(1);
        self.state.time_remaining = Some(remaining);
        events.push(GameEvent::TimerTick { remaining });
        if remaining == 0 {
            self.end_game(events);
        }
    }

    fn end_game(&mut self, events: &mut Vec<GameEvent>) {
        self.release_timers();
        self.state.phase = Phase::Ended;
        let ended_at = self.clock.now();
        let result = SessionResult {
            mode: self.state.mode,
            difficulty: self.state.difficulty,
            score: self.state.score,
            max_streak: self.state.max_streak,
            correct_answers: self.state.correct_answers,
            total_answers: self.state.total_answers,
            missed_notes: self.state.missed_notes.clone(),
            started_at: self.state.started_at.unwrap_or(ended_at),
            ended_at,
        };
        self.record = match self.progress.save(&result, ended_at) {
            Ok(record) => record,
            Err(err) => {
                warn!(%err, "could not save progress, keeping it for this run only");
                self.record.merged(&result, ended_at)
            }
        };
        info!(
            score = result.score,
            accuracy = result.accuracy(),
            max_streak = result.max_streak,
            "session ended"
        );
        self.last_result = Some(result.clone());
        events.push(GameEvent::Ended(result));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use notefy_domain::clock::fixed_clock;
    use notefy_domain::{KeyValueStore, MemoryStore, StoreError};

    const FEEDBACK: Duration = Duration::from_millis(1500);

    fn session_with(store: Arc<dyn KeyValueStore>) -> GameSession {
        let rules = GameRules::default();
        let progress = ProgressStore::new(store, rules.storage_namespace.clone());
        GameSession::new(rules, progress)
            .with_clock(fixed_clock())
            .with_seed(5)
    }

    fn session() -> (MemoryStore, GameSession) {
        let store = MemoryStore::new();
        let session = session_with(Arc::new(store.clone()));
        (store, session)
    }

    fn current_letter(session: &GameSession) -> PitchLetter {
        session.state().current_note.unwrap().letter()
    }

    fn wrong_letter(session: &GameSession) -> PitchLetter {
        let right = current_letter(session);
        PitchLetter::ALL.into_iter().find(|l| *l != right).unwrap()
    }

    fn answer(session: &mut GameSession, letter: PitchLetter) -> Vec<GameEvent> {
        let mut events = session.dispatch(Command::SubmitAnswer(letter));
        events.extend(session.advance(FEEDBACK));
        events
    }

    fn shown_notes(events: &[GameEvent]) -> Vec<NoteId> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::QuestionShown { note, .. } => Some(*note),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn perfect_practice_run_scores_190() {
        let (store, mut session) = session();
        let events = session.dispatch(Command::SelectMode(GameMode::Practice));
        assert!(matches!(
            events[0],
            GameEvent::Started {
                total_questions: 10,
                countdown_secs: None,
                ..
            }
        ));
        assert_eq!(session.state().question_index, 1);

        let mut last = Vec::new();
        for _ in 0..10 {
            let letter = current_letter(&session);
            last = answer(&mut session, letter);
        }
        assert_eq!(session.phase(), Phase::Ended);
        let result = match last.last() {
            Some(GameEvent::Ended(result)) => result.clone(),
            other => panic!("expected end of game, got {other:?}"),
        };
        assert_eq!(result.score, 190);
        assert_eq!(result.accuracy(), 100);
        assert_eq!(result.max_streak, 10);
        assert_eq!(result.ended_at - result.started_at, time::Duration::seconds(15));
        assert_eq!(store.get("notefy_bestScore").unwrap().as_deref(), Some("190"));
        assert_eq!(session.progress().total_games, 1);
    }

    #[test]
    fn wrong_answer_resets_streak_and_records_miss() {
        let (_, mut session) = session();
        session.dispatch(Command::SelectMode(GameMode::Practice));
        let mut max_seen = 0;
        for round in 0..6 {
            let letter = if round == 3 {
                wrong_letter(&session)
            } else {
                current_letter(&session)
            };
            let note = session.state().current_note.unwrap();
            let events = answer(&mut session, letter);
            if round == 3 {
                assert_eq!(session.state().streak, 0);
                assert_eq!(session.state().missed_notes, vec![note]);
                assert!(events.iter().any(|e| matches!(
                    e,
                    GameEvent::Answered {
                        outcome: Outcome::Incorrect,
                        points: 0,
                        ..
                    }
                )));
            }
            assert!(session.state().max_streak >= max_seen);
            max_seen = session.state().max_streak;
        }
        assert_eq!(session.state().streak, 2);
        assert_eq!(session.state().max_streak, 3);
        assert_eq!(session.state().score, 10 + 12 + 14 + 10 + 12);
        assert_eq!(session.state().total_answers, 6);
        assert_eq!(session.state().correct_answers, 5);
    }

    #[test]
    fn answers_are_inert_during_feedback_and_pause() {
        let (_, mut session) = session();
        session.dispatch(Command::SelectMode(GameMode::Practice));
        let letter = current_letter(&session);
        assert_eq!(session.dispatch(Command::SubmitAnswer(letter)).len(), 1);
        assert!(session.feedback_pending());
        assert!(session.dispatch(Command::SubmitAnswer(letter)).is_empty());
        assert!(session.dispatch(Command::Skip).is_empty());
        assert_eq!(session.state().total_answers, 1);

        session.advance(FEEDBACK);
        assert!(!session.feedback_pending());
        assert_eq!(session.state().question_index, 2);

        assert_eq!(session.dispatch(Command::TogglePause), vec![GameEvent::Paused]);
        let letter = current_letter(&session);
        assert!(session.dispatch(Command::SubmitAnswer(letter)).is_empty());
        assert!(session.dispatch(Command::Skip).is_empty());
        assert_eq!(session.state().total_answers, 1);
        assert_eq!(session.dispatch(Command::TogglePause), vec![GameEvent::Resumed]);
    }

    #[test]
    fn pause_freezes_feedback_window() {
        let (_, mut session) = session();
        session.dispatch(Command::SelectMode(GameMode::Practice));
        let letter = current_letter(&session);
        session.dispatch(Command::SubmitAnswer(letter));
        session.advance(Duration::from_millis(1000));
        session.dispatch(Command::TogglePause);
        assert!(session.advance(Duration::from_secs(30)).is_empty());
        assert_eq!(session.state().question_index, 1);
        session.dispatch(Command::TogglePause);
        let events = session.advance(Duration::from_millis(500));
        assert_eq!(shown_notes(&events).len(), 1);
        assert_eq!(session.state().question_index, 2);
    }

    #[test]
    fn skip_moves_on_without_counting() {
        let (_, mut session) = session();
        session.dispatch(Command::SelectMode(GameMode::Practice));
        for expected in 2..=10 {
            let events = session.dispatch(Command::Skip);
            assert_eq!(shown_notes(&events).len(), 1);
            assert_eq!(session.state().question_index, expected);
        }
        assert_eq!(session.phase(), Phase::Active);
        let events = session.dispatch(Command::Skip);
        assert!(matches!(events.last(), Some(GameEvent::Ended(_))));
        let result = session.last_result().unwrap();
        assert_eq!(result.total_answers, 0);
        assert_eq!(result.score, 0);
        assert_eq!(result.accuracy(), 0);
    }

    #[test]
    fn challenge_ends_when_countdown_expires() {
        let (_, mut session) = session();
        session.dispatch(Command::SelectMode(GameMode::Challenge));
        assert_eq!(session.state().total_questions, 20);
        assert_eq!(session.state().time_remaining, Some(60));

        let events = session.advance(Duration::from_secs(59));
        let ticks = events
            .iter()
            .filter(|e| matches!(e, GameEvent::TimerTick { .. }))
            .count();
        assert_eq!(ticks, 59);
        assert_eq!(session.state().time_remaining, Some(1));
        assert_eq!(session.phase(), Phase::Active);

        let events = session.advance(Duration::from_secs(5));
        assert_eq!(
            events.first(),
            Some(&GameEvent::TimerTick { remaining: 0 })
        );
        assert!(matches!(events.last(), Some(GameEvent::Ended(_))));
        assert_eq!(events.len(), 2);
        assert_eq!(session.phase(), Phase::Ended);
        assert!(session.advance(Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn pausing_suspends_the_countdown() {
        let (_, mut session) = session();
        session.dispatch(Command::SelectMode(GameMode::Challenge));
        session.advance(Duration::from_millis(10_500));
        assert_eq!(session.state().time_remaining, Some(50));

        session.dispatch(Command::TogglePause);
        assert!(session.advance(Duration::from_secs(120)).is_empty());
        assert_eq!(session.state().time_remaining, Some(50));

        session.dispatch(Command::TogglePause);
        session.advance(Duration::from_millis(400));
        assert_eq!(session.state().time_remaining, Some(50));
        session.advance(Duration::from_millis(100));
        assert_eq!(session.state().time_remaining, Some(49));
    }

    #[test]
    fn challenge_answers_earn_mode_bonus() {
        let (_, mut session) = session();
        session.dispatch(Command::SelectDifficulty(DifficultyLevel::Advanced));
        session.dispatch(Command::SelectMode(GameMode::Challenge));
        for _ in 0..4 {
            let letter = current_letter(&session);
            answer(&mut session, letter);
        }
        // 25 + 27 + 29 + 31
        assert_eq!(session.state().score, 112);
        assert_eq!(session.state().time_remaining, Some(54));
    }

    #[test]
    fn review_draws_from_missed_notes() {
        let store = MemoryStore::new();
        store.set("notefy_wrongNotes", "[\"E4\",\"G5\"]").unwrap();
        let mut session = session_with(Arc::new(store.clone()));
        let mut events = session.dispatch(Command::SelectMode(GameMode::Review));
        assert_eq!(session.state().total_questions, 2);
        while session.phase() == Phase::Active {
            let letter = current_letter(&session);
            events.extend(answer(&mut session, letter));
        }
        let shown = shown_notes(&events);
        assert_eq!(shown.len(), 2);
        assert!(shown.iter().all(|n| [NoteId::E4, NoteId::G5].contains(n)));
        assert_eq!(
            session.last_result().unwrap().missed_notes,
            vec![NoteId::E4, NoteId::G5]
        );
    }

    #[test]
    fn empty_review_falls_back_to_five_questions() {
        let (_, mut session) = session();
        session.dispatch(Command::SelectMode(GameMode::Review));
        assert_eq!(session.state().total_questions, 5);
        let note = session.state().current_note.unwrap();
        assert!(DifficultyLevel::Beginner.pool().contains(&note));
    }

    #[test]
    fn to_menu_tears_down_without_saving() {
        let (store, mut session) = session();
        session.dispatch(Command::SelectMode(GameMode::Challenge));
        let letter = current_letter(&session);
        session.dispatch(Command::SubmitAnswer(letter));
        assert_eq!(
            session.dispatch(Command::ToMenu),
            vec![GameEvent::ReturnedToMenu]
        );
        assert_eq!(session.phase(), Phase::Menu);
        assert!(!session.feedback_pending());
        assert!(session.advance(Duration::from_secs(90)).is_empty());
        assert_eq!(store.get("notefy_totalGames").unwrap(), None);
    }

    #[test]
    fn play_again_restarts_with_fresh_counters() {
        let (_, mut session) = session();
        session.dispatch(Command::SelectMode(GameMode::Practice));
        while session.phase() == Phase::Active {
            let letter = current_letter(&session);
            answer(&mut session, letter);
        }
        let events = session.dispatch(Command::PlayAgain);
        assert!(matches!(events[0], GameEvent::Started { .. }));
        let state = session.state();
        assert_eq!(state.phase, Phase::Active);
        assert_eq!(state.score, 0);
        assert_eq!(state.max_streak, 0);
        assert_eq!(state.question_index, 1);
        assert_eq!(session.progress().total_games, 1);
    }

    #[test]
    fn commands_outside_their_phase_are_ignored() {
        let (_, mut session) = session();
        assert!(session.dispatch(Command::SubmitAnswer(PitchLetter::C)).is_empty());
        assert!(session.dispatch(Command::TogglePause).is_empty());
        assert!(session.dispatch(Command::Skip).is_empty());
        assert!(session.dispatch(Command::PlayAgain).is_empty());
        assert!(session.dispatch(Command::ToMenu).is_empty());

        session.dispatch(Command::SelectMode(GameMode::Practice));
        assert!(session
            .dispatch(Command::SelectDifficulty(DifficultyLevel::Advanced))
            .is_empty());
        assert_eq!(session.state().difficulty, DifficultyLevel::Beginner);
        assert!(session.dispatch(Command::SelectMode(GameMode::Review)).is_empty());
        assert!(session.dispatch(Command::PlayAgain).is_empty());
    }

    #[test]
    fn missed_notes_carry_into_the_next_session() {
        let store = MemoryStore::new();
        let mut first = session_with(Arc::new(store.clone()));
        first.dispatch(Command::SelectMode(GameMode::Practice));
        let missed = first.state().current_note.unwrap();
        let letter = wrong_letter(&first);
        answer(&mut first, letter);
        while first.phase() == Phase::Active {
            first.dispatch(Command::Skip);
        }

        let second = session_with(Arc::new(store));
        assert_eq!(second.state().missed_notes, vec![missed]);
        assert_eq!(second.progress().total_games, 1);
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("no storage".into()))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("no storage".into()))
        }
    }

    #[test]
    fn game_stays_playable_without_persistence() {
        let mut session = session_with(Arc::new(BrokenStore));
        session.dispatch(Command::SelectMode(GameMode::Practice));
        while session.phase() == Phase::Active {
            let letter = current_letter(&session);
            answer(&mut session, letter);
        }
        assert_eq!(session.phase(), Phase::Ended);
        assert_eq!(session.progress().best_score, 190);
        assert_eq!(session.progress().total_games, 1);
    }
}
