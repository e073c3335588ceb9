pub mod backend;
pub mod dsp;
pub mod player;

pub use backend::{AudioBackend, CpalBackend, NullBackend};
pub use dsp::{ToneSequence, ToneStep};
pub use player::FeedbackPlayer;
