use notefy_domain::NoteId;

/// Reference drawing space; the widget scales it to whatever it is given.
pub const VIEW_WIDTH: f32 = 400.0;
pub const VIEW_HEIGHT: f32 = 260.0;

pub const STAFF_LEFT: f32 = 50.0;
pub const STAFF_RIGHT: f32 = 350.0;
/// y of the five staff lines, top to bottom.
pub const STAFF_LINES: [i32; 5] = [70, 90, 110, 130, 150];
pub const MIDDLE_LINE: i32 = 110;

pub const NOTE_X: f32 = 200.0;
pub const NOTEHEAD_RADIUS: f32 = 7.0;
pub const LEDGER_HALF_WIDTH: f32 = 15.0;
const STEM_OFFSET: f32 = 8.0;
const STEM_LENGTH: f32 = 30.0;
const LINE_GAP: i32 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StemDirection {
    Up,
    Down,
}

impl StemDirection {
    /// Notes below the middle line take an up stem; the middle line itself
    /// takes a down stem.
    pub fn for_position(y: i32) -> Self {
        if y > MIDDLE_LINE {
            StemDirection::Up
        } else {
            StemDirection::Down
        }
    }
}

/// Everything needed to draw one note on the staff.
#[derive(Clone, Debug, PartialEq)]
pub struct NoteGlyph {
    pub note: NoteId,
    pub x: f32,
    pub y: i32,
    pub stem: StemDirection,
    pub ledger_lines: Vec<i32>,
}

impl NoteGlyph {
    pub fn for_note(note: NoteId) -> Self {
        let y = note.position().y;
        Self {
            note,
            x: NOTE_X,
            y,
            stem: StemDirection::for_position(y),
            ledger_lines: ledger_lines_for(y),
        }
    }

    pub fn has_ledger(&self) -> bool {
        !self.ledger_lines.is_empty()
    }

    /// Stem as ((x, y_start), (x, y_end)).
    pub fn stem_segment(&self) -> ((f32, f32), (f32, f32)) {
        let y = self.y as f32;
        match self.stem {
            StemDirection::Up => {
                let x = self.x + STEM_OFFSET;
                ((x, y), (x, y - STEM_LENGTH))
            }
            StemDirection::Down => {
                let x = self.x - STEM_OFFSET;
                ((x, y), (x, y + STEM_LENGTH))
            }
        }
    }
}

/// Ledger lines between the staff and a note at `y`, nearest the staff first.
pub fn ledger_lines_for(y: i32) -> Vec<i32> {
    let top = STAFF_LINES[0];
    let bottom = STAFF_LINES[STAFF_LINES.len() - 1];
    if y > bottom {
        (1..)
            .map(|i| bottom + i * LINE_GAP)
            .take_while(|line| *line <= y)
            .collect()
    } else if y < top {
        (1..)
            .map(|i| top - i * LINE_GAP)
            .take_while(|line| *line >= y)
            .collect()
    } else {
        Vec::new()
    }
}
