//! The fixed 12-tone universe: referential collections and modal attributes

use std::fmt;

use serde::Serialize;

use crate::pcset::PcSet;

/// Number of pitch classes in 12-tone equal temperament
pub const NUM_PCS: u8 = 12;

/// Number of interval classes (1..=6)
pub const NUM_ICS: usize = 6;

/// {0, 1, 3, 4, 6, 7, 9, 10}
const OCTATONIC: PcSet = PcSet::from_mask(0b0110_1101_1011);
/// {0, 2, 4, 6, 8, 10}
const WHOLE_TONE: PcSet = PcSet::from_mask(0b0101_0101_0101);
/// {0, 1, 4, 5, 8, 9}
const HEXATONIC: PcSet = PcSet::from_mask(0b0011_0011_0011);

/// C major scale {0, 2, 4, 5, 7, 9, 11}; all 12 transpositions form the
/// diatonic reference family.
pub const DIATONIC: PcSet = PcSet::from_mask(0b1010_1011_0101);

/// Referential collection families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RefCol {
    Octatonic,
    WholeTone,
    Hexatonic,
}

/// Families in display order
pub const REF_COLS: [RefCol; 3] = [RefCol::Octatonic, RefCol::WholeTone, RefCol::Hexatonic];

impl RefCol {
    /// Single-letter key used in modal attributes
    pub fn key(&self) -> &'static str {
        match self {
            Self::Octatonic => "O",
            Self::WholeTone => "W",
            Self::Hexatonic => "H",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Octatonic => "Octatonic",
            Self::WholeTone => "Whole-tone",
            Self::Hexatonic => "Hexatonic",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Octatonic => 0,
            Self::WholeTone => 1,
            Self::Hexatonic => 2,
        }
    }

    /// First transposition of the family
    pub fn representative(&self) -> PcSet {
        match self {
            Self::Octatonic => OCTATONIC,
            Self::WholeTone => WHOLE_TONE,
            Self::Hexatonic => HEXATONIC,
        }
    }

    /// Number of distinct transpositions
    pub fn num_transpositions(&self) -> u8 {
        match self {
            Self::Octatonic => 3,
            Self::WholeTone => 2,
            Self::Hexatonic => 4,
        }
    }

    /// All members of the family in ascending transposition order
    pub fn transpositions(&self) -> impl Iterator<Item = PcSet> + use<> {
        let rep = self.representative();
        (0..self.num_transpositions()).map(move |n| rep.transpose(n))
    }
}

impl fmt::Display for RefCol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// All 12 transpositions of the diatonic collection
pub fn diatonic_transpositions() -> impl Iterator<Item = PcSet> {
    (0..NUM_PCS).map(|n| DIATONIC.transpose(n))
}

/// Membership of a set in a referential family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum ModalAttribute {
    /// Contained in a member of the family
    Contained(RefCol),
    /// Hexachord one pitch class away from a member of the family
    Primed(RefCol),
    Diatonic,
}

impl ModalAttribute {
    pub fn token(&self) -> String {
        match self {
            Self::Contained(col) => col.key().to_string(),
            Self::Primed(col) => format!("{}'", col.key()),
            Self::Diatonic => "D".to_string(),
        }
    }
}

impl fmt::Display for ModalAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

impl From<ModalAttribute> for String {
    fn from(attr: ModalAttribute) -> Self {
        attr.token()
    }
}
