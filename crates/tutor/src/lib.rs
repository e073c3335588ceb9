pub mod analytics;
pub mod generator;
pub mod scoring;
pub mod session;
pub mod timers;

pub use analytics::SessionAnalytics;
pub use generator::next_note;
pub use scoring::ScoringEngine;
pub use session::{Command, GameEvent, GameSession, Phase, SessionState};
pub use timers::{Scheduler, TimerHandle, TimerKind};
