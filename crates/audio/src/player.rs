use tracing::{info, warn};

use notefy_domain::Outcome;

use crate::backend::{AudioBackend, CpalBackend, NullBackend};
use crate::dsp::ToneSequence;

/// Plays answer cues. Never fails: a broken backend only logs.
pub struct FeedbackPlayer {
    backend: Box<dyn AudioBackend>,
    enabled: bool,
}

impl FeedbackPlayer {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        Self {
            backend,
            enabled: true,
        }
    }

    /// Uses the default output device, or stays silent if there is none.
    pub fn system_default() -> Self {
        match CpalBackend::new() {
            Ok(backend) => Self::new(Box::new(backend)),
            Err(err) => {
                info!(%err, "audio unavailable, feedback tones disabled");
                Self::new(Box::new(NullBackend))
            }
        }
    }

    pub fn silent() -> Self {
        Self::new(Box::new(NullBackend))
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn cue(&self, outcome: Outcome) {
        if !self.enabled {
            return;
        }
        let tone = ToneSequence::for_outcome(outcome);
        if let Err(err) = self.backend.play(&tone) {
            warn!(%err, backend = self.backend.name(), "skipping feedback tone");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use anyhow::{bail, Result};

    use super::*;

    struct CountingBackend {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl AudioBackend for CountingBackend {
        fn name(&self) -> &str {
            "counting"
        }

        fn play(&self, _tone: &ToneSequence) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                bail!("device busy");
            }
            Ok(())
        }
    }

    fn player(fail: bool) -> (Arc<AtomicUsize>, FeedbackPlayer) {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = CountingBackend {
            calls: calls.clone(),
            fail,
        };
        (calls, FeedbackPlayer::new(Box::new(backend)))
    }

    #[test]
    fn cues_reach_the_backend() {
        let (calls, player) = player(false);
        player.cue(Outcome::Correct);
        player.cue(Outcome::Incorrect);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn disabled_player_stays_quiet() {
        let (calls, mut player) = player(false);
        player.set_enabled(false);
        player.cue(Outcome::Correct);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn backend_errors_are_swallowed() {
        let (calls, player) = player(true);
        player.cue(Outcome::Incorrect);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
