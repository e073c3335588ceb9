use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use notefy_domain::Outcome;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToneStep {
    pub frequency: f32,
    /// Seconds from the start of the sequence.
    pub at: f32,
}

/// A short sine cue whose pitch steps through `steps` under a decaying gain.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToneSequence {
    pub steps: Vec<ToneStep>,
    pub duration: f32,
    pub gain_start: f32,
    pub gain_end: f32,
}

impl ToneSequence {
    pub fn for_outcome(outcome: Outcome) -> Self {
        let steps = match outcome {
            // C5, E5, G5
            Outcome::Correct => vec![
                ToneStep { frequency: 523.25, at: 0.0 },
                ToneStep { frequency: 659.25, at: 0.1 },
                ToneStep { frequency: 783.99, at: 0.2 },
            ],
            // A3, F#3
            Outcome::Incorrect => vec![
                ToneStep { frequency: 220.0, at: 0.0 },
                ToneStep { frequency: 185.0, at: 0.1 },
            ],
        };
        Self {
            steps,
            duration: 0.3,
            gain_start: 0.3,
            gain_end: 0.01,
        }
    }

    pub fn frequency_at(&self, t: f32) -> f32 {
        self.steps
            .iter()
            .take_while(|step| step.at <= t)
            .last()
            .or_else(|| self.steps.first())
            .map(|step| step.frequency)
            .unwrap_or(0.0)
    }

    /// Exponential ramp from `gain_start` to `gain_end` over the duration.
    pub fn gain_at(&self, t: f32) -> f32 {
        if self.duration <= 0.0 || self.gain_start <= 0.0 {
            return 0.0;
        }
        let progress = (t / self.duration).clamp(0.0, 1.0);
        self.gain_start * (self.gain_end / self.gain_start).powf(progress)
    }

    /// Mono samples at `sample_rate`.
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let rate = sample_rate.max(1) as f32;
        let len = (self.duration * rate).round().max(0.0) as usize;
        let mut phase = 0.0f32;
        let mut samples = Vec::with_capacity(len);
        for i in 0..len {
            let t = i as f32 / rate;
            samples.push(phase.sin() * self.gain_at(t));
            phase = (phase + TAU * self.frequency_at(t) / rate) % TAU;
        }
        samples
    }
}
