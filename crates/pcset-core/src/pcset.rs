//! Pitch-class set engine
//!
//! A [`PcSet`] is a 12-bit mask over the pitch classes 0..=11. It is `Copy`,
//! so every operation returns a new value and the caller decides what to keep.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PcSetError, Result};
use crate::universe::{ModalAttribute, NUM_ICS, NUM_PCS, REF_COLS, RefCol, diatonic_transpositions};

/// A pitch class in 0..=11
pub type PitchClass = u8;

const FULL_MASK: u16 = 0x0FFF;

/// Unordered set of pitch classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<u8>", try_from = "Vec<u8>")]
pub struct PcSet(u16);

fn check_pc(pc: i32) -> Result<PitchClass> {
    if (0..NUM_PCS as i32).contains(&pc) {
        Ok(pc as PitchClass)
    } else {
        Err(PcSetError::PitchClassOutOfRange(pc))
    }
}

/// Every submask of `mask`, from `mask` itself down to zero
fn submasks(mask: u16) -> impl Iterator<Item = u16> {
    std::iter::successors(Some(mask), move |&sub| {
        if sub == 0 { None } else { Some((sub - 1) & mask) }
    })
}

impl PcSet {
    pub const fn new() -> Self {
        Self(0)
    }

    /// The aggregate {0..11}
    pub const fn chromatic() -> Self {
        Self(FULL_MASK)
    }

    /// Bit `n` of `mask` is pitch class `n`; bits above 11 are ignored.
    pub const fn from_mask(mask: u16) -> Self {
        Self(mask & FULL_MASK)
    }

    pub const fn mask(&self) -> u16 {
        self.0
    }

    /// Build a set from pitch classes, rejecting anything outside 0..=11
    pub fn from_pcs<I>(pcs: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<i32>,
    {
        let mut set = Self::new();
        for pc in pcs {
            set.0 |= 1 << check_pc(pc.into())?;
        }
        Ok(set)
    }

    /// Project MIDI pitches (or any non-negative pitch numbers) onto pitch classes
    pub fn from_pitches<I: IntoIterator<Item = u8>>(pitches: I) -> Self {
        pitches
            .into_iter()
            .fold(Self::new(), |set, pitch| Self(set.0 | 1 << (pitch % NUM_PCS)))
    }

    /// Add a pitch class; returns whether the set changed
    pub fn insert(&mut self, pc: PitchClass) -> Result<bool> {
        let bit: u16 = 1 << check_pc(pc as i32)?;
        let changed = self.0 & bit == 0;
        self.0 |= bit;
        Ok(changed)
    }

    /// Remove a pitch class; returns whether the set changed
    pub fn remove(&mut self, pc: PitchClass) -> Result<bool> {
        let bit: u16 = 1 << check_pc(pc as i32)?;
        let changed = self.0 & bit != 0;
        self.0 &= !bit;
        Ok(changed)
    }

    pub fn contains(&self, pc: PitchClass) -> bool {
        pc < NUM_PCS && self.0 & (1 << pc) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Members in ascending order
    pub fn iter(self) -> impl Iterator<Item = PitchClass> {
        (0..NUM_PCS).filter(move |&pc| self.0 & (1 << pc) != 0)
    }

    pub fn to_vec(self) -> Vec<PitchClass> {
        self.iter().collect()
    }

    // ------------------------------------------------------------------
    // Set algebra
    // ------------------------------------------------------------------

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Complement relative to the aggregate
    pub fn complement(self) -> Self {
        Self(!self.0 & FULL_MASK)
    }

    pub fn is_subset(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    // ------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------

    /// Tn: {(x + n) mod 12}
    pub fn transpose(self, n: u8) -> Self {
        let n = n % NUM_PCS;
        Self(((self.0 << n) | (self.0 >> (NUM_PCS - n))) & FULL_MASK)
    }

    /// TnI: {(n - x) mod 12}
    pub fn invert(self, n: u8) -> Self {
        let n = n % NUM_PCS;
        self.iter()
            .fold(Self::new(), |set, pc| Self(set.0 | 1 << ((n + NUM_PCS - pc) % NUM_PCS)))
    }

    // ------------------------------------------------------------------
    // Canonical forms
    // ------------------------------------------------------------------

    /// Most left-packed rotation of the set.
    ///
    /// Rotations are compared by span (last - first), then by the distance
    /// from the first element to the second-to-last, third-to-last and so on.
    /// A complete tie keeps the rotation starting on the lowest pitch class.
    pub fn normal_form(self) -> Vec<PitchClass> {
        let pcs = self.to_vec();
        let n = pcs.len();
        if n <= 1 {
            return pcs;
        }

        (0..n)
            .map(|i| {
                let rotation: Vec<u8> = pcs[i..]
                    .iter()
                    .copied()
                    .chain(pcs[..i].iter().map(|&pc| pc + NUM_PCS))
                    .collect();
                let packing: Vec<u8> = (1..n).rev().map(|j| rotation[j] - rotation[0]).collect();
                (packing, rotation)
            })
            .min_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, rotation)| rotation.into_iter().map(|pc| pc % NUM_PCS).collect())
            .unwrap_or_default()
    }

    /// Lexicographically smaller of the zero-based normal forms of the set
    /// and of its inversion
    pub fn prime_form(self) -> Vec<PitchClass> {
        if self.is_empty() {
            return Vec::new();
        }

        let zero_based = |nf: Vec<u8>| -> Vec<u8> {
            let first = nf[0];
            nf.into_iter().map(|pc| (pc + NUM_PCS - first) % NUM_PCS).collect()
        };

        let original = zero_based(self.normal_form());
        let inverted = zero_based(self.invert(0).normal_form());
        original.min(inverted)
    }

    /// The prime form as a set
    pub fn prime_form_set(self) -> Self {
        self.prime_form()
            .into_iter()
            .fold(Self::new(), |set, pc| Self(set.0 | 1 << pc))
    }

    // ------------------------------------------------------------------
    // Vectors
    // ------------------------------------------------------------------

    /// Interval-class vector: entry `i` counts pairs at interval class `i + 1`
    pub fn icv(self) -> [u8; NUM_ICS] {
        let pcs = self.to_vec();
        let mut icv = [0u8; NUM_ICS];
        for (i, &a) in pcs.iter().enumerate() {
            for &b in &pcs[i + 1..] {
                let interval = b - a;
                let ic = interval.min(NUM_PCS - interval);
                icv[ic as usize - 1] += 1;
            }
        }
        icv
    }

    /// Index vector: entry `k` counts pairs (a, b), a == b included, with
    /// a + b = k (mod 12)
    pub fn index_vector(self) -> [u8; NUM_PCS as usize] {
        let pcs = self.to_vec();
        let mut iv = [0u8; NUM_PCS as usize];
        for (i, &a) in pcs.iter().enumerate() {
            for &b in &pcs[i..] {
                iv[((a + b) % NUM_PCS) as usize] += 1;
            }
        }
        iv
    }

    // ------------------------------------------------------------------
    // Transformation levels
    // ------------------------------------------------------------------

    /// Every Tn and TnI that maps the prime form onto this set
    pub fn transformation_levels(self) -> TransformationLevels {
        let pf = self.prime_form_set();
        TransformationLevels {
            tn: (0..NUM_PCS).filter(|&n| pf.transpose(n) == self).collect(),
            tni: (0..NUM_PCS).filter(|&n| pf.invert(n) == self).collect(),
        }
    }

    // ------------------------------------------------------------------
    // Referential collections
    // ------------------------------------------------------------------

    /// The member of `col` leaving the fewest pitch classes of this set
    /// outside it; ties go to the lowest transposition.
    pub fn enclosure(self, col: RefCol) -> Enclosure {
        let mut best: Option<Enclosure> = None;
        for collection in col.transpositions() {
            let foreign = self.difference(collection);
            if best.is_none_or(|b| foreign.len() < b.foreign.len()) {
                best = Some(Enclosure { collection, foreign });
            }
        }
        best.unwrap_or(Enclosure {
            collection: col.representative(),
            foreign: self.difference(col.representative()),
        })
    }

    /// Per family: 2 when contained, 1 when one pitch class is foreign,
    /// 0 otherwise; plus diatonic containment.
    pub fn referential_collections(self) -> ReferentialScores {
        let mut scores = [0u8; 3];
        for col in REF_COLS {
            scores[col.index()] = match self.enclosure(col).foreign.len() {
                0 => 2,
                1 => 1,
                _ => 0,
            };
        }
        ReferentialScores {
            scores,
            diatonic: diatonic_transpositions().any(|d| self.is_subset(d)),
        }
    }

    /// Modal attributes in family order, diatonic last. Primed attributes
    /// are only given to hexachords.
    pub fn modal_attributes(self) -> Vec<ModalAttribute> {
        let scores = self.referential_collections();
        let mut attrs = Vec::new();
        for col in REF_COLS {
            match scores.score(col) {
                2 => attrs.push(ModalAttribute::Contained(col)),
                1 if self.len() == 6 => attrs.push(ModalAttribute::Primed(col)),
                _ => {}
            }
        }
        if scores.diatonic {
            attrs.push(ModalAttribute::Diatonic);
        }
        attrs
    }

    /// Per family, what the closest member adds to this set. Empty when more
    /// than one pitch class of the set is foreign to every member.
    pub fn modal_complements(self) -> [(RefCol, PcSet); 3] {
        REF_COLS.map(|col| {
            let enclosure = self.enclosure(col);
            let complement = if enclosure.foreign.len() <= 1 {
                enclosure.collection.difference(self)
            } else {
                Self::new()
            };
            (col, complement)
        })
    }

    // ------------------------------------------------------------------
    // Inclusion / complementation search
    // ------------------------------------------------------------------

    /// Subsets of this set belonging to the set class of `target`, each
    /// paired with what remains of this set. Only for smaller targets.
    pub fn inclusion(self, target: PcSet) -> Vec<(PcSet, PcSet)> {
        let size = target.len();
        if size == 0 || size >= self.len() {
            return Vec::new();
        }
        let target_pf = target.prime_form();
        let members: Vec<PcSet> = submasks(self.0)
            .map(Self)
            .filter(|m| m.len() == size && m.prime_form() == target_pf)
            .collect();
        sorted_by_normal_form(members)
            .into_iter()
            .map(|member| (member, self.difference(member)))
            .collect()
    }

    /// Supersets of this set belonging to the set class of `target`, each
    /// paired with the pitch classes added. Only for larger targets.
    pub fn complementation(self, target: PcSet) -> Vec<(PcSet, PcSet)> {
        let size = target.len();
        if size <= self.len() {
            return Vec::new();
        }
        let target_pf = target.prime_form();
        let supersets: Vec<PcSet> = submasks(self.complement().0)
            .map(|extra| Self(self.0 | extra))
            .filter(|s| s.len() == size && s.prime_form() == target_pf)
            .collect();
        sorted_by_normal_form(supersets)
            .into_iter()
            .map(|superset| (superset, superset.difference(self)))
            .collect()
    }
}

fn sorted_by_normal_form(mut sets: Vec<PcSet>) -> Vec<PcSet> {
    sets.sort_by_cached_key(|s| s.normal_form());
    sets
}

impl fmt::Display for PcSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pcs: Vec<String> = self.iter().map(|pc| pc.to_string()).collect();
        write!(f, "{{{}}}", pcs.join(","))
    }
}

impl From<PcSet> for Vec<u8> {
    fn from(set: PcSet) -> Self {
        set.to_vec()
    }
}

impl TryFrom<Vec<u8>> for PcSet {
    type Error = PcSetError;

    fn try_from(pcs: Vec<u8>) -> Result<Self> {
        Self::from_pcs(pcs)
    }
}

/// Closest member of a referential family and the pitch classes outside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enclosure {
    pub collection: PcSet,
    pub foreign: PcSet,
}

/// Referential collection scores of a set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferentialScores {
    scores: [u8; 3],
    pub diatonic: bool,
}

impl ReferentialScores {
    pub fn score(&self, col: RefCol) -> u8 {
        self.scores[col.index()]
    }
}

/// A single Tn or TnI operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum TransformationLevel {
    Tn(u8),
    TnI(u8),
}

impl TransformationLevel {
    pub fn apply(&self, set: PcSet) -> PcSet {
        match *self {
            Self::Tn(n) => set.transpose(n),
            Self::TnI(n) => set.invert(n),
        }
    }
}

impl fmt::Display for TransformationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tn(n) => write!(f, "T{}", n),
            Self::TnI(n) => write!(f, "T{}I", n),
        }
    }
}

impl From<TransformationLevel> for String {
    fn from(level: TransformationLevel) -> Self {
        level.to_string()
    }
}

/// Levels carrying the prime form onto a set, each list ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformationLevels {
    pub tn: Vec<u8>,
    pub tni: Vec<u8>,
}

impl TransformationLevels {
    /// Tn levels first, then TnI
    pub fn all(&self) -> impl Iterator<Item = TransformationLevel> + '_ {
        self.tn
            .iter()
            .map(|&n| TransformationLevel::Tn(n))
            .chain(self.tni.iter().map(|&n| TransformationLevel::TnI(n)))
    }

    /// Smallest Tn, or smallest TnI when no transposition fits
    pub fn basic(&self) -> Option<TransformationLevel> {
        self.all().next()
    }
}
