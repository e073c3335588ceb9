use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// The seven natural pitch letters a learner can answer with.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PitchLetter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl PitchLetter {
    pub const ALL: [PitchLetter; 7] = [
        PitchLetter::C,
        PitchLetter::D,
        PitchLetter::E,
        PitchLetter::F,
        PitchLetter::G,
        PitchLetter::A,
        PitchLetter::B,
    ];

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            'E' => Some(Self::E),
            'F' => Some(Self::F),
            'G' => Some(Self::G),
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
            Self::F => 'F',
            Self::G => 'G',
            Self::A => 'A',
            Self::B => 'B',
        }
    }
}

impl fmt::Display for PitchLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Vertical placement of a note on the treble staff.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaffPosition {
    /// Reference y coordinate; staff lines sit at 70, 90, 110, 130 and 150.
    pub y: i32,
    pub ledger: bool,
}

/// A natural note from C3 to C6, named by letter and octave.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NoteId {
    C3,
    D3,
    E3,
    F3,
    G3,
    A3,
    B3,
    C4,
    D4,
    E4,
    F4,
    G4,
    A4,
    B4,
    C5,
    D5,
    E5,
    F5,
    G5,
    A5,
    B5,
    C6,
}

const CATALOG: [(NoteId, PitchLetter, u8, StaffPosition); 22] = [
    (NoteId::C3, PitchLetter::C, 3, StaffPosition { y: 240, ledger: true }),
    (NoteId::D3, PitchLetter::D, 3, StaffPosition { y: 230, ledger: true }),
    (NoteId::E3, PitchLetter::E, 3, StaffPosition { y: 220, ledger: true }),
    (NoteId::F3, PitchLetter::F, 3, StaffPosition { y: 210, ledger: true }),
    (NoteId::G3, PitchLetter::G, 3, StaffPosition { y: 200, ledger: true }),
    (NoteId::A3, PitchLetter::A, 3, StaffPosition { y: 190, ledger: true }),
    (NoteId::B3, PitchLetter::B, 3, StaffPosition { y: 180, ledger: true }),
    // Middle C
    (NoteId::C4, PitchLetter::C, 4, StaffPosition { y: 170, ledger: true }),
    (NoteId::D4, PitchLetter::D, 4, StaffPosition { y: 160, ledger: false }),
    (NoteId::E4, PitchLetter::E, 4, StaffPosition { y: 150, ledger: false }),
    (NoteId::F4, PitchLetter::F, 4, StaffPosition { y: 140, ledger: false }),
    (NoteId::G4, PitchLetter::G, 4, StaffPosition { y: 130, ledger: false }),
    (NoteId::A4, PitchLetter::A, 4, StaffPosition { y: 120, ledger: false }),
    (NoteId::B4, PitchLetter::B, 4, StaffPosition { y: 110, ledger: false }),
    (NoteId::C5, PitchLetter::C, 5, StaffPosition { y: 100, ledger: false }),
    (NoteId::D5, PitchLetter::D, 5, StaffPosition { y: 90, ledger: false }),
    (NoteId::E5, PitchLetter::E, 5, StaffPosition { y: 80, ledger: false }),
    (NoteId::F5, PitchLetter::F, 5, StaffPosition { y: 70, ledger: false }),
    (NoteId::G5, PitchLetter::G, 5, StaffPosition { y: 60, ledger: false }),
    (NoteId::A5, PitchLetter::A, 5, StaffPosition { y: 50, ledger: true }),
    (NoteId::B5, PitchLetter::B, 5, StaffPosition { y: 40, ledger: true }),
    (NoteId::C6, PitchLetter::C, 6, StaffPosition { y: 30, ledger: true }),
];

impl NoteId {
    /// Every note in the catalog, lowest first.
    pub fn all() -> impl Iterator<Item = NoteId> {
        CATALOG.iter().map(|(note, ..)| *note)
    }

    fn entry(self) -> &'static (NoteId, PitchLetter, u8, StaffPosition) {
        // The catalog is ordered by discriminant.
        &CATALOG[self as usize]
    }

    pub fn letter(self) -> PitchLetter {
        self.entry().1
    }

    pub fn octave(self) -> u8 {
        self.entry().2
    }

    pub fn position(self) -> StaffPosition {
        self.entry().3
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter(), self.octave())
    }
}

impl FromStr for NoteId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let letter = chars
            .next()
            .and_then(PitchLetter::from_char)
            .ok_or_else(|| DomainError::validation(format!("unknown note {s:?}")))?;
        let octave: u8 = chars
            .as_str()
            .parse()
            .map_err(|_| DomainError::validation(format!("unknown note {s:?}")))?;
        CATALOG
            .iter()
            .find(|(_, l, o, _)| *l == letter && *o == octave)
            .map(|(note, ..)| *note)
            .ok_or_else(|| DomainError::validation(format!("note {s:?} is outside the catalog")))
    }
}
