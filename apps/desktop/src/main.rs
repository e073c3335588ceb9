mod settings;

use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::{egui, egui::Ui};
use notefy_audio::FeedbackPlayer;
use notefy_domain::{
    DifficultyLevel, GameMode, GameRules, JsonFileStore, KeyValueStore, MemoryStore, NoteId,
    Outcome, PitchLetter, ProgressStore,
};
use notefy_notation::StaffView;
use notefy_tutor::{Command, GameEvent, GameSession, Phase, SessionAnalytics};
use notefy_ui::theme as ui_theme;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::settings::PersistedSettings;

const ANSWER_KEYS: [(egui::Key, PitchLetter); 7] = [
    (egui::Key::C, PitchLetter::C),
    (egui::Key::D, PitchLetter::D),
    (egui::Key::E, PitchLetter::E),
    (egui::Key::F, PitchLetter::F),
    (egui::Key::G, PitchLetter::G),
    (egui::Key::A, PitchLetter::A),
    (egui::Key::B, PitchLetter::B),
];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = match settings::load_settings() {
        Ok(settings) => settings,
        Err(err) => {
            info!(%err, "using default settings");
            PersistedSettings::default()
        }
    };
    let rules = match settings.rules.validate() {
        Ok(()) => settings.rules.clone(),
        Err(err) => {
            warn!(%err, "ignoring invalid game rules from settings");
            GameRules::default()
        }
    };

    let store: Arc<dyn KeyValueStore> = match settings::progress_path() {
        Some(path) => {
            info!(path = %path.display(), "progress file");
            Arc::new(JsonFileStore::new(path))
        }
        None => {
            warn!("no config directory, progress will not outlive this run");
            Arc::new(MemoryStore::new())
        }
    };
    let progress = ProgressStore::new(store, rules.storage_namespace.clone());
    let session = GameSession::new(rules, progress);

    let mut player = FeedbackPlayer::system_default();
    player.set_enabled(settings.sound_enabled);
    info!(backend = player.backend_name(), "audio ready");

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Notefy",
        options,
        Box::new(move |cc| Box::new(NotefyApp::new(cc, session, player, settings))),
    )
    .map_err(|e| anyhow::anyhow!(format!("{e:?}")))?;
    Ok(())
}

/// Last answer, kept on screen while the feedback window runs.
struct AnswerFeedback {
    note: NoteId,
    chosen: PitchLetter,
    outcome: Outcome,
}

struct NotefyApp {
    session: GameSession,
    player: FeedbackPlayer,
    settings: PersistedSettings,
    theme_mode: ui_theme::ThemeMode,
    music_font: bool,
    last_frame: Instant,
    feedback: Option<AnswerFeedback>,
    analytics: Option<SessionAnalytics>,
}

impl NotefyApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        session: GameSession,
        player: FeedbackPlayer,
        settings: PersistedSettings,
    ) -> Self {
        let theme_mode =
            ui_theme::ThemeMode::from_name(&settings.theme).unwrap_or(ui_theme::ThemeMode::Night);
        ui_theme::apply(&cc.egui_ctx, theme_mode);
        let music_font = ui_theme::ensure_music_font(&cc.egui_ctx);
        if !music_font {
            debug!("no music font found, treble clef hidden");
        }
        Self {
            session,
            player,
            settings,
            theme_mode,
            music_font,
            last_frame: Instant::now(),
            feedback: None,
            analytics: None,
        }
    }

    fn tokens(&self) -> ui_theme::ThemeTokens {
        ui_theme::theme(self.theme_mode).tokens
    }

    fn handle_events(&mut self, events: Vec<GameEvent>) {
        for event in events {
            match event {
                GameEvent::Started { .. } => {
                    self.feedback = None;
                    self.analytics = None;
                }
                GameEvent::QuestionShown { .. } | GameEvent::ReturnedToMenu => {
                    self.feedback = None;
                }
                GameEvent::Answered {
                    note,
                    chosen,
                    outcome,
                    ..
                } => {
                    self.player.cue(outcome);
                    self.feedback = Some(AnswerFeedback {
                        note,
                        chosen,
                        outcome,
                    });
                }
                GameEvent::Ended(result) => {
                    self.feedback = None;
                    self.analytics = Some(SessionAnalytics::new(result));
                }
                GameEvent::TimerTick { .. } | GameEvent::Paused | GameEvent::Resumed => {}
            }
        }
    }

    fn persist_settings(&self) {
        if let Err(err) = settings::save_settings(&self.settings) {
            warn!(%err, "failed to save settings");
        }
    }

    fn collect_shortcuts(&self, ctx: &egui::Context, commands: &mut Vec<Command>) {
        let phase = self.session.phase();
        if !matches!(phase, Phase::Active | Phase::Paused | Phase::Ended) {
            return;
        }
        ctx.input(|i| {
            if phase == Phase::Active {
                for (key, letter) in ANSWER_KEYS {
                    if i.key_pressed(key) {
                        commands.push(Command::SubmitAnswer(letter));
                    }
                }
            }
            if phase != Phase::Ended && i.key_pressed(egui::Key::Space) {
                commands.push(Command::TogglePause);
            }
            if i.key_pressed(egui::Key::Escape) {
                commands.push(Command::ToMenu);
            }
        });
    }

    fn top_bar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Notefy");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = match self.theme_mode {
                    ui_theme::ThemeMode::Night => "Paper theme",
                    ui_theme::ThemeMode::Paper => "Night theme",
                };
                if ui.button(label).clicked() {
                    self.theme_mode = match self.theme_mode {
                        ui_theme::ThemeMode::Night => ui_theme::ThemeMode::Paper,
                        ui_theme::ThemeMode::Paper => ui_theme::ThemeMode::Night,
                    };
                    ui_theme::apply(ui.ctx(), self.theme_mode);
                    self.settings.theme = self.theme_mode.name().into();
                    self.persist_settings();
                }
                if ui.checkbox(&mut self.settings.sound_enabled, "Sound").changed() {
                    self.player.set_enabled(self.settings.sound_enabled);
                    self.persist_settings();
                }
            });
        });
    }

    fn menu_ui(&mut self, ui: &mut Ui, commands: &mut Vec<Command>) {
        let state = self.session.state();
        let record = self.session.progress();
        let missed = state.missed_notes.len();
        ui.vertical_centered(|ui| {
            ui.add_space(16.0);
            ui.heading("Name the note on the staff");
            ui.add_space(12.0);

            ui.label("Difficulty");
            ui.horizontal(|ui| {
                for level in DifficultyLevel::ALL {
                    let range = match level {
                        DifficultyLevel::Beginner => "C4-C5",
                        DifficultyLevel::Intermediate => "C3-F5",
                        DifficultyLevel::Advanced => "C3-C6",
                    };
                    let text = format!("{} ({range})", level.label());
                    if ui.selectable_label(state.difficulty == level, text).clicked() {
                        commands.push(Command::SelectDifficulty(level));
                    }
                }
            });
            ui.add_space(12.0);

            ui.label("Start a game");
            ui.horizontal(|ui| {
                for mode in GameMode::ALL {
                    let policy = mode.policy(missed, self.session.rules());
                    let detail = match policy.countdown_secs {
                        Some(secs) => format!("{} notes, {secs}s", policy.total_questions),
                        None => format!("{} notes", policy.total_questions),
                    };
                    let button = egui::Button::new(format!("{}\n{detail}", mode.label()))
                        .min_size(egui::vec2(120.0, 48.0));
                    if ui.add(button).clicked() {
                        commands.push(Command::SelectMode(mode));
                    }
                }
            });
            if missed == 0 {
                ui.small("Review draws from the whole range until you miss a note.");
            } else {
                ui.small(format!("{missed} missed notes waiting for review"));
            }
            ui.add_space(16.0);

            egui::Grid::new("progress_stats")
                .num_columns(2)
                .spacing([24.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Best score");
                    ui.strong(record.best_score.to_string());
                    ui.end_row();
                    ui.label("Best streak");
                    ui.strong(record.best_streak.to_string());
                    ui.end_row();
                    ui.label("Games played");
                    ui.strong(record.total_games.to_string());
                    ui.end_row();
                    ui.label("Average score");
                    ui.strong(record.average_score().to_string());
                    ui.end_row();
                });
        });
    }

    fn game_ui(&mut self, ui: &mut Ui, commands: &mut Vec<Command>) {
        let tokens = self.tokens();
        let phase = self.session.phase();
        let feedback_pending = self.session.feedback_pending();
        let state = self.session.state().clone();

        ui.horizontal(|ui| {
            ui.label(format!("Score: {}", state.score));
            ui.separator();
            ui.label(format!("Streak: {}", state.streak));
            ui.separator();
            ui.label(format!(
                "Question {}/{}",
                state.question_index, state.total_questions
            ));
            if let Some(remaining) = state.time_remaining {
                ui.separator();
                let text = egui::RichText::new(format!("Time: {remaining}s"));
                let text = if remaining <= 10 {
                    text.color(tokens.incorrect)
                } else {
                    text
                };
                ui.label(text);
            }
        });
        ui.add_space(8.0);

        let note_color = match &self.feedback {
            Some(fb) if feedback_pending && fb.outcome.is_correct() => tokens.correct,
            Some(_) if feedback_pending => tokens.incorrect,
            _ => ui.visuals().text_color(),
        };
        ui.vertical_centered(|ui| {
            StaffView::new(state.current_note)
                .note_color(note_color)
                .show_clef(self.music_font)
                .show(ui);
        });

        ui.vertical_centered(|ui| {
            if phase == Phase::Paused {
                ui.heading("Paused");
            } else if let (true, Some(fb)) = (feedback_pending, &self.feedback) {
                let (text, color) = match fb.outcome {
                    Outcome::Correct => ("Correct!".to_string(), tokens.correct),
                    Outcome::Incorrect => (
                        format!("Wrong! The answer was {}", fb.note.letter()),
                        tokens.incorrect,
                    ),
                };
                ui.heading(egui::RichText::new(text).color(color));
            } else {
                ui.heading(" ");
            }
        });
        ui.add_space(8.0);

        let answers_enabled = phase == Phase::Active && !feedback_pending;
        ui.horizontal(|ui| {
            for letter in PitchLetter::ALL {
                let mut button = egui::Button::new(
                    egui::RichText::new(letter.to_string()).size(24.0),
                )
                .min_size(egui::vec2(52.0, 52.0));
                if let (true, Some(fb)) = (feedback_pending, &self.feedback) {
                    if letter == fb.note.letter() {
                        button = button.fill(tokens.correct);
                    } else if letter == fb.chosen {
                        button = button.fill(tokens.incorrect);
                    }
                }
                if ui.add_enabled(answers_enabled, button).clicked() {
                    commands.push(Command::SubmitAnswer(letter));
                }
            }
        });
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            let pause_label = if phase == Phase::Paused {
                "Resume"
            } else {
                "Pause"
            };
            if ui.button(pause_label).clicked() {
                commands.push(Command::TogglePause);
            }
            if ui.add_enabled(answers_enabled, egui::Button::new("Skip")).clicked() {
                commands.push(Command::Skip);
            }
            if ui.button("Menu").clicked() {
                commands.push(Command::ToMenu);
            }
        });
    }

    fn results_ui(&mut self, ui: &mut Ui, commands: &mut Vec<Command>) {
        let tokens = self.tokens();
        ui.vertical_centered(|ui| {
            ui.add_space(16.0);
            ui.heading("Game over");
            let Some(analytics) = &self.analytics else {
                if ui.button("Menu").clicked() {
                    commands.push(Command::ToMenu);
                }
                return;
            };
            let result = &analytics.result;
            let stars = analytics.rating() as usize;
            ui.label(
                egui::RichText::new(format!("{}{}", "★".repeat(stars), "☆".repeat(3 - stars)))
                    .size(32.0)
                    .color(tokens.accent),
            );
            ui.add_space(8.0);
            egui::Grid::new("results_stats")
                .num_columns(2)
                .spacing([24.0, 6.0])
                .show(ui, |ui| {
                    ui.label("Score");
                    ui.strong(result.score.to_string());
                    ui.end_row();
                    ui.label("Accuracy");
                    ui.strong(format!(
                        "{}% ({}/{})",
                        result.accuracy(),
                        result.correct_answers,
                        result.total_answers
                    ));
                    ui.end_row();
                    ui.label("Best streak");
                    ui.strong(result.max_streak.to_string());
                    ui.end_row();
                });

            let weakest = analytics.weakest_notes(3);
            if !weakest.is_empty() {
                ui.add_space(8.0);
                ui.label("Keep practising");
                for (note, misses) in weakest {
                    ui.label(format!("{note}: missed {misses}x"));
                }
            }

            ui.add_space(12.0);
            ui.horizontal(|ui| {
                if ui.button("Play again").clicked() {
                    commands.push(Command::PlayAgain);
                }
                if ui.button("Menu").clicked() {
                    commands.push(Command::ToMenu);
                }
            });
        });
    }
}

impl eframe::App for NotefyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        let events = self.session.advance(elapsed);
        self.handle_events(events);

        let mut commands = Vec::new();
        self.collect_shortcuts(ctx, &mut commands);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| self.top_bar(ui));
        egui::CentralPanel::default().show(ctx, |ui| match self.session.phase() {
            Phase::Menu => self.menu_ui(ui, &mut commands),
            Phase::Active | Phase::Paused => self.game_ui(ui, &mut commands),
            Phase::Ended => self.results_ui(ui, &mut commands),
        });

        for command in commands {
            debug!(?command, "ui command");
            let events = self.session.dispatch(command);
            self.handle_events(events);
        }

        if self.session.phase() == Phase::Active {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl Drop for NotefyApp {
    fn drop(&mut self) {
        self.session.shutdown();
    }
}
