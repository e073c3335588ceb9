pub mod theme;

pub use theme::{ThemeMode, ThemeTokens};
