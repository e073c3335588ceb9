use egui::{Color32, FontData, FontDefinitions, FontFamily, Rounding, Stroke, Visuals};
use once_cell::sync::OnceCell;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemeMode {
    Night,
    Paper,
}

impl ThemeMode {
    pub fn name(self) -> &'static str {
        match self {
            ThemeMode::Night => "night",
            ThemeMode::Paper => "paper",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "night" | "dark" => Some(ThemeMode::Night),
            "paper" | "light" => Some(ThemeMode::Paper),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ThemeTokens {
    pub accent: Color32,
    pub correct: Color32,
    pub incorrect: Color32,
    pub neutral_bg: Color32,
    pub neutral_surface: Color32,
    pub neutral_panel: Color32,
    pub text_primary: Color32,
}

#[derive(Clone, Debug)]
pub struct Theme {
    pub tokens: ThemeTokens,
    pub visuals: Visuals,
}

pub fn theme(mode: ThemeMode) -> Theme {
    match mode {
        ThemeMode::Night => night(),
        ThemeMode::Paper => paper(),
    }
}

pub fn night() -> Theme {
    let tokens = ThemeTokens {
        accent: Color32::from_rgb(0x8E, 0x7C, 0xFF),
        correct: Color32::from_rgb(0x3C, 0xD0, 0x7A),
        incorrect: Color32::from_rgb(0xFF, 0x5C, 0x5C),
        neutral_bg: Color32::from_rgb(0x12, 0x13, 0x1A),
        neutral_surface: Color32::from_rgb(0x1D, 0x1F, 0x2A),
        neutral_panel: Color32::from_rgb(0x2A, 0x2D, 0x3C),
        text_primary: Color32::from_rgb(0xEC, 0xEC, 0xF2),
    };

    let mut visuals = Visuals::dark();
    visuals.window_rounding = Rounding::same(8.0);
    visuals.panel_fill = tokens.neutral_surface;
    visuals.widgets.noninteractive.bg_fill = tokens.neutral_surface;
    visuals.widgets.inactive.bg_fill = tokens.neutral_panel;
    visuals.widgets.hovered.bg_fill = tokens.neutral_panel.linear_multiply(1.15);
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, tokens.text_primary);
    visuals.selection.bg_fill = tokens.accent;

    Theme { tokens, visuals }
}

pub fn paper() -> Theme {
    let tokens = ThemeTokens {
        accent: Color32::from_rgb(0x5B, 0x4B, 0xDB),
        correct: Color32::from_rgb(0x1E, 0x9E, 0x58),
        incorrect: Color32::from_rgb(0xD6, 0x36, 0x36),
        neutral_bg: Color32::from_rgb(0xFB, 0xF8, 0xF1),
        neutral_surface: Color32::from_rgb(0xFF, 0xFD, 0xF8),
        neutral_panel: Color32::from_rgb(0xEE, 0xE9, 0xDE),
        text_primary: Color32::from_rgb(0x22, 0x22, 0x2B),
    };

    let mut visuals = Visuals::light();
    visuals.window_rounding = Rounding::same(10.0);
    visuals.panel_fill = tokens.neutral_bg;
    visuals.widgets.noninteractive.bg_fill = tokens.neutral_surface;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, tokens.text_primary);
    visuals.widgets.inactive.bg_fill = tokens.neutral_panel;
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, tokens.text_primary);
    visuals.widgets.inactive.bg_stroke = Stroke::new(1.0, Color32::from_gray(200));
    visuals.selection.bg_fill = tokens.accent;
    visuals.selection.stroke = Stroke::new(1.0, tokens.text_primary);

    Theme { tokens, visuals }
}

pub fn apply(ctx: &egui::Context, mode: ThemeMode) {
    ctx.set_visuals(theme(mode).visuals);
}

// egui's bundled fonts have no musical symbols; the clef needs one of these.
static MUSIC_FONT: OnceCell<bool> = OnceCell::new();

/// Loads a music font as a fallback for proportional text. Returns whether
/// one was found; the answer is cached after the first call.
pub fn ensure_music_font(ctx: &egui::Context) -> bool {
    *MUSIC_FONT.get_or_init(|| {
        let candidates = [
            "assets/fonts/NotoMusic-Regular.ttf",
            "../assets/fonts/NotoMusic-Regular.ttf",
            "../../assets/fonts/NotoMusic-Regular.ttf",
            "/usr/share/fonts/truetype/noto/NotoMusic-Regular.ttf",
        ];
        let Some(bytes) = candidates.iter().find_map(|p| std::fs::read(p).ok()) else {
            return false;
        };
        let mut defs = FontDefinitions::default();
        defs.font_data
            .insert("NotoMusic".into(), FontData::from_owned(bytes));
        defs.families
            .entry(FontFamily::Proportional)
            .or_default()
            .push("NotoMusic".into());
        ctx.set_fonts(defs);
        true
    })
}
