pub mod layout;

use egui::{Align2, Color32, FontId, Pos2, Rect, Response, Sense, Stroke, Ui};
use notefy_domain::NoteId;

pub use layout::{ledger_lines_for, NoteGlyph, StemDirection};

use layout::{
    LEDGER_HALF_WIDTH, NOTEHEAD_RADIUS, STAFF_LEFT, STAFF_LINES, STAFF_RIGHT, VIEW_HEIGHT,
    VIEW_WIDTH,
};

const TREBLE_CLEF: &str = "\u{1D11E}";

/// Draws the treble staff and, when set, the current note.
pub struct StaffView {
    glyph: Option<NoteGlyph>,
    note_color: Option<Color32>,
    show_clef: bool,
    height: f32,
}

impl StaffView {
    pub fn new(note: Option<NoteId>) -> Self {
        Self {
            glyph: note.map(NoteGlyph::for_note),
            note_color: None,
            show_clef: true,
            height: VIEW_HEIGHT,
        }
    }

    /// Tints the notehead and stem, e.g. after an answer.
    pub fn note_color(mut self, color: Color32) -> Self {
        self.note_color = Some(color);
        self
    }

    /// The clef needs a font with musical symbols; skip it otherwise.
    pub fn show_clef(mut self, show: bool) -> Self {
        self.show_clef = show;
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn glyph(&self) -> Option<&NoteGlyph> {
        self.glyph.as_ref()
    }

    pub fn show(self, ui: &mut Ui) -> Response {
        let (rect, response) =
            ui.allocate_at_least(egui::vec2(ui.available_width(), self.height), Sense::hover());
        let painter = ui.painter_at(rect);
        let map = ViewMapping::fit(rect);
        let ink = ui.visuals().text_color();
        let line = Stroke::new(1.5 * map.scale, ink);

        for y in STAFF_LINES {
            painter.line_segment(
                [map.pos(STAFF_LEFT, y as f32), map.pos(STAFF_RIGHT, y as f32)],
                line,
            );
        }

        if self.show_clef {
            painter.text(
                map.pos(72.0, 115.0),
                Align2::CENTER_CENTER,
                TREBLE_CLEF,
                FontId::proportional(90.0 * map.scale),
                ink,
            );
        }

        if let Some(glyph) = &self.glyph {
            let color = self.note_color.unwrap_or(ink);
            for ledger in &glyph.ledger_lines {
                painter.line_segment(
                    [
                        map.pos(glyph.x - LEDGER_HALF_WIDTH, *ledger as f32),
                        map.pos(glyph.x + LEDGER_HALF_WIDTH, *ledger as f32),
                    ],
                    line,
                );
            }
            painter.circle_filled(
                map.pos(glyph.x, glyph.y as f32),
                NOTEHEAD_RADIUS * map.scale,
                color,
            );
            let ((x0, y0), (x1, y1)) = glyph.stem_segment();
            painter.line_segment(
                [map.pos(x0, y0), map.pos(x1, y1)],
                Stroke::new(2.0 * map.scale, color),
            );
        }
        response
    }
}

/// Uniform scale from the reference view box into a screen rect, centred.
struct ViewMapping {
    origin: Pos2,
    scale: f32,
}

impl ViewMapping {
    fn fit(rect: Rect) -> Self {
        let scale = (rect.width() / VIEW_WIDTH)
            .min(rect.height() / VIEW_HEIGHT)
            .max(0.01);
        let origin = Pos2 {
            x: rect.center().x - VIEW_WIDTH * scale / 2.0,
            y: rect.center().y - VIEW_HEIGHT * scale / 2.0,
        };
        Self { origin, scale }
    }

    fn pos(&self, x: f32, y: f32) -> Pos2 {
        Pos2 {
            x: self.origin.x + x * self.scale,
            y: self.origin.y + y * self.scale,
        }
    }
}
