//! Set-class catalog
//!
//! Built once from the embedded Forte table. Everything the query layer
//! consults at runtime (names, Z partners, symmetry, inclusion counts and the
//! modal set complexes) is computed and validated here at load time, so a
//! corrupt table is reported before the first query.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PcSetError, Result};
use crate::pcset::PcSet;
use crate::pf_str::{from_pf_str, to_pf_str};
use crate::universe::{ModalAttribute, NUM_PCS};

const CATALOG_JSON: &str = include_str!("../data/set_classes.json");

/// Cardinalities tabulated in a modal set complex
pub const MSC_CARDINALITIES: [usize; 3] = [3, 4, 6];

const MAX_CARD: usize = NUM_PCS as usize;
const NUM_MASKS: usize = 1 << NUM_PCS;

#[derive(Debug, Deserialize)]
struct CatalogData {
    #[serde(rename = "setClasses")]
    set_classes: Vec<SetClassRecord>,
}

/// One row of the embedded table. A `Z-corr` that is absent and one that is
/// `null` both mean the class has no Z partner.
#[derive(Debug, Deserialize)]
struct SetClassRecord {
    #[serde(rename = "SN")]
    name: String,
    #[serde(rename = "PF")]
    prime_form: String,
    #[serde(rename = "Z-corr", default)]
    z_corr: Option<String>,
}

/// A set class and its invariants
#[derive(Debug, Clone, Serialize)]
pub struct SetClass {
    #[serde(rename = "SN")]
    pub name: String,
    pub cardinality: usize,
    pub ordinal: usize,
    #[serde(rename = "PF")]
    pub prime_form: String,
    #[serde(rename = "Z-corr")]
    pub z_corr: Option<String>,
    /// Number of Tn and TnI operators mapping the class onto itself
    pub symmetry: [u8; 2],
    #[serde(skip)]
    representative: PcSet,
    /// Indexed by target cardinality; empty for the class's own cardinality
    #[serde(skip)]
    inclusion: Vec<Vec<u32>>,
}

impl SetClass {
    /// The prime form as a pitch-class set
    pub fn representative(&self) -> PcSet {
        self.representative
    }
}

/// Member row of a modal set complex table
#[derive(Debug, Clone, Serialize)]
pub struct MscMember {
    #[serde(rename = "SN")]
    pub name: String,
    #[serde(rename = "MA")]
    pub modal_attributes: Vec<ModalAttribute>,
    pub symmetry: [u8; 2],
    /// How many times the member is embedded in the nexus
    pub inclusion: u32,
    #[serde(rename = "Z-corr")]
    pub z_corr: Option<String>,
}

/// Trichords, tetrachords and hexachords embedded in a nexus set
#[derive(Debug, Clone, Serialize)]
pub struct ModalSetComplex {
    pub nexus: String,
    pub trichords: Vec<MscMember>,
    pub tetrachords: Vec<MscMember>,
    pub hexachords: Vec<MscMember>,
}

impl ModalSetComplex {
    pub fn members(&self, cardinality: usize) -> &[MscMember] {
        match cardinality {
            3 => &self.trichords,
            4 => &self.tetrachords,
            6 => &self.hexachords,
            _ => &[],
        }
    }
}

/// Immutable set-class catalog
#[derive(Debug)]
pub struct Catalog {
    classes: Vec<SetClass>,
    /// SN_VECS: class indices per cardinality, in ordinal order
    by_cardinality: Vec<Vec<usize>>,
    by_name: HashMap<String, usize>,
    /// PFToSN
    by_prime_form: HashMap<String, usize>,
    /// Class index of every 12-bit mask (the empty set has none)
    by_mask: Vec<Option<usize>>,
    msc: Vec<ModalSetComplex>,
}

/// Split `"4-Z15"` into (4, 15, true)
fn parse_set_name(name: &str) -> Result<(usize, usize, bool)> {
    let invalid = || PcSetError::Catalog(format!("malformed set name {:?}", name));
    let (card, ordinal) = name.split_once('-').ok_or_else(invalid)?;
    let (ordinal, z) = match ordinal.strip_prefix('Z') {
        Some(rest) => (rest, true),
        None => (ordinal, false),
    };
    let card: usize = card.parse().map_err(|_| invalid())?;
    let ordinal: usize = ordinal.parse().map_err(|_| invalid())?;
    if !(1..=MAX_CARD).contains(&card) || ordinal == 0 {
        return Err(invalid());
    }
    Ok((card, ordinal, z))
}

fn symmetry(set: PcSet) -> [u8; 2] {
    let tn = (0..NUM_PCS).filter(|&n| set.transpose(n) == set).count();
    let tni = (0..NUM_PCS).filter(|&n| set.invert(n) == set).count();
    [tn as u8, tni as u8]
}

impl Catalog {
    /// Load the embedded table
    pub fn load() -> Result<Self> {
        Self::from_json(CATALOG_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let data: CatalogData = serde_json::from_str(json)?;
        Self::build(data.set_classes)
    }

    fn build(records: Vec<SetClassRecord>) -> Result<Self> {
        let mut classes: Vec<SetClass> = Vec::with_capacity(records.len());
        let mut by_cardinality: Vec<Vec<usize>> = vec![Vec::new(); MAX_CARD + 1];
        let mut by_name = HashMap::new();
        let mut by_prime_form = HashMap::new();

        for record in records {
            let (cardinality, ordinal, z) = parse_set_name(&record.name)?;
            let pcs = from_pf_str(&record.prime_form)?;
            let representative = PcSet::from_pcs(pcs.iter().copied())?;

            if pcs.len() != cardinality || representative.len() != cardinality {
                return Err(PcSetError::Catalog(format!(
                    "{}: prime form {} does not have {} pitch classes",
                    record.name, record.prime_form, cardinality
                )));
            }
            if to_pf_str(&representative.prime_form()) != record.prime_form {
                return Err(PcSetError::Catalog(format!(
                    "{}: {} is not in prime form",
                    record.name, record.prime_form
                )));
            }
            if ordinal != by_cardinality[cardinality].len() + 1 {
                return Err(PcSetError::Catalog(format!("{}: out of ordinal order", record.name)));
            }
            if z != record.z_corr.is_some() {
                return Err(PcSetError::Catalog(format!(
                    "{}: Z marker and Z-correspondent disagree",
                    record.name
                )));
            }

            let index = classes.len();
            if by_name.insert(record.name.clone(), index).is_some() {
                return Err(PcSetError::Catalog(format!("duplicate set name {}", record.name)));
            }
            if by_prime_form.insert(record.prime_form.clone(), index).is_some() {
                return Err(PcSetError::Catalog(format!("duplicate prime form {}", record.prime_form)));
            }
            by_cardinality[cardinality].push(index);

            classes.push(SetClass {
                name: record.name,
                cardinality,
                ordinal,
                prime_form: record.prime_form,
                z_corr: record.z_corr,
                symmetry: symmetry(representative),
                representative,
                inclusion: Vec::new(),
            });
        }

        for class in &classes {
            let Some(partner) = &class.z_corr else { continue };
            let other = by_name
                .get(partner)
                .map(|&i| &classes[i])
                .ok_or_else(|| PcSetError::Catalog(format!("{}: unknown Z-correspondent {}", class.name, partner)))?;
            if other.z_corr.as_deref() != Some(class.name.as_str())
                || other.representative.icv() != class.representative.icv()
            {
                return Err(PcSetError::Catalog(format!(
                    "{} and {} are not Z-correspondents",
                    class.name, other.name
                )));
            }
        }

        let mut by_mask = vec![None; NUM_MASKS];
        for (mask, slot) in by_mask.iter_mut().enumerate().skip(1) {
            let pf = to_pf_str(&PcSet::from_mask(mask as u16).prime_form());
            let index = by_prime_form
                .get(&pf)
                .ok_or_else(|| PcSetError::Catalog(format!("no set class with prime form {}", pf)))?;
            *slot = Some(*index);
        }

        let mut catalog = Self {
            classes,
            by_cardinality,
            by_name,
            by_prime_form,
            by_mask,
            msc: Vec::new(),
        };
        catalog.build_inclusion_table();
        catalog.build_modal_set_complexes();
        Ok(catalog)
    }

    /// For every host class and every other cardinality, count the subsets
    /// (smaller targets) or supersets (larger targets) of the host's prime
    /// form falling into each target class.
    fn build_inclusion_table(&mut self) {
        for host in 0..self.classes.len() {
            let rep = self.classes[host].representative;
            let host_card = self.classes[host].cardinality;

            let mut table: Vec<Vec<u32>> = (0..=MAX_CARD)
                .map(|card| {
                    if card == host_card {
                        Vec::new()
                    } else {
                        vec![0; self.by_cardinality[card].len()]
                    }
                })
                .collect();

            for (mask, index) in self.by_mask.iter().enumerate() {
                let Some(index) = *index else { continue };
                let other = PcSet::from_mask(mask as u16);
                if other.len() == host_card || !(other.is_subset(rep) || rep.is_subset(other)) {
                    continue;
                }
                let target = &self.classes[index];
                table[target.cardinality][target.ordinal - 1] += 1;
            }

            self.classes[host].inclusion = table;
        }
    }

    /// Every class of cardinality 7..=9 is a nexus; its complex lists the
    /// trichords, tetrachords and hexachords it embeds.
    fn build_modal_set_complexes(&mut self) {
        let mut complexes = Vec::new();
        for card in 7..=9 {
            for &nexus in &self.by_cardinality[card] {
                let host = &self.classes[nexus];
                let [trichords, tetrachords, hexachords] = MSC_CARDINALITIES.map(|member_card| {
                    self.by_cardinality[member_card]
                        .iter()
                        .map(|&i| &self.classes[i])
                        .zip(host.inclusion[member_card].iter())
                        .filter(|(_, count)| **count > 0)
                        .map(|(member, &count)| MscMember {
                            name: member.name.clone(),
                            modal_attributes: member.representative.modal_attributes(),
                            symmetry: member.symmetry,
                            inclusion: count,
                            z_corr: if member_card == 3 { None } else { member.z_corr.clone() },
                        })
                        .collect::<Vec<_>>()
                });
                complexes.push(ModalSetComplex {
                    nexus: host.name.clone(),
                    trichords,
                    tetrachords,
                    hexachords,
                });
            }
        }
        self.msc = complexes;
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub fn set_classes(&self) -> &[SetClass] {
        &self.classes
    }

    /// Classes of one cardinality in ordinal order (SN_VECS[c])
    pub fn classes_of_cardinality(&self, cardinality: usize) -> impl Iterator<Item = &SetClass> {
        self.by_cardinality
            .get(cardinality)
            .into_iter()
            .flatten()
            .map(|&i| &self.classes[i])
    }

    /// Names of one cardinality in ordinal order
    pub fn set_names(&self, cardinality: usize) -> Vec<&str> {
        self.classes_of_cardinality(cardinality)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// 1-based ordinal lookup
    pub fn set_class_at(&self, cardinality: usize, ordinal: usize) -> Option<&SetClass> {
        let index = *self.by_cardinality.get(cardinality)?.get(ordinal.checked_sub(1)?)?;
        Some(&self.classes[index])
    }

    pub fn set_class(&self, name: &str) -> Option<&SetClass> {
        self.by_name.get(name).map(|&i| &self.classes[i])
    }

    /// Like [`Catalog::set_class`] but a miss is an error
    pub fn require(&self, name: &str) -> Result<&SetClass> {
        self.set_class(name)
            .ok_or_else(|| PcSetError::UnknownSetClass(name.to_string()))
    }

    /// PFToSN
    pub fn name_for_prime_form(&self, pf: &str) -> Option<&str> {
        self.by_prime_form
            .get(pf)
            .map(|&i| self.classes[i].name.as_str())
    }

    /// Set class of any non-empty set
    pub fn set_class_of(&self, set: PcSet) -> Option<&SetClass> {
        self.by_mask[set.mask() as usize].map(|i| &self.classes[i])
    }

    /// Counts of each class of `target_card` (in ordinal order) embedded in
    /// or embedding the host. `None` for unknown hosts and for the host's own
    /// cardinality.
    pub fn inclusion_counts(&self, host: &str, target_card: usize) -> Option<&[u32]> {
        let counts = self.set_class(host)?.inclusion.get(target_card)?;
        if counts.is_empty() { None } else { Some(counts) }
    }

    pub fn nexus_names(&self) -> impl Iterator<Item = &str> {
        self.msc.iter().map(|m| m.nexus.as_str())
    }

    pub fn modal_set_complex(&self, nexus: &str) -> Option<&ModalSetComplex> {
        self.msc.iter().find(|m| m.nexus == nexus)
    }
}
