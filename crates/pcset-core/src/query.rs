//! Set profile queries
//!
//! Pure functions of a [`PcSet`] and the [`Catalog`]. Each query has a range
//! of cardinalities it is defined for; outside that range it returns an empty
//! value instead of an error so the shell can render blanks.

use serde::Serialize;

use crate::catalog::{Catalog, SetClass};
use crate::error::Result;
use crate::pcset::{PcSet, PitchClass, TransformationLevel};
use crate::pf_str::to_pf_str;
use crate::universe::{ModalAttribute, NUM_ICS, NUM_PCS, RefCol};

fn named(set: PcSet) -> bool {
    (3..=9).contains(&set.len())
}

/// Forte name of the set's class, empty outside cardinalities 3..=9
pub fn set_name(set: PcSet, catalog: &Catalog) -> String {
    if !named(set) {
        return String::new();
    }
    catalog
        .name_for_prime_form(&to_pf_str(&set.prime_form()))
        .unwrap_or_default()
        .to_string()
}

/// Most basic Tn/TnI level carrying the prime form onto the set
pub fn transformation_level(set: PcSet) -> Option<TransformationLevel> {
    if !named(set) {
        return None;
    }
    set.transformation_levels().basic()
}

pub fn modal_attributes(set: PcSet) -> Vec<ModalAttribute> {
    if !named(set) {
        return Vec::new();
    }
    set.modal_attributes()
}

pub fn interval_class_vector(set: PcSet) -> Option<[u8; NUM_ICS]> {
    (2..=9).contains(&set.len()).then(|| set.icv())
}

/// Index vector; every slot is blank outside cardinalities 2..=9
pub fn index_vector(set: PcSet) -> [Option<u8>; NUM_PCS as usize] {
    if !(2..=9).contains(&set.len()) {
        return [None; NUM_PCS as usize];
    }
    set.index_vector().map(Some)
}

/// Normal form of the complement; empty for the empty set
pub fn literal_complement(set: PcSet) -> Vec<PitchClass> {
    if set.is_empty() {
        return Vec::new();
    }
    set.complement().normal_form()
}

/// Prime form of the complement; empty for the empty set
pub fn abstract_complement(set: PcSet) -> Vec<PitchClass> {
    if set.is_empty() {
        return Vec::new();
    }
    set.complement().prime_form()
}

pub fn abstract_complement_name(set: PcSet, catalog: &Catalog) -> String {
    if set.is_empty() {
        return String::new();
    }
    set_name(set.complement(), catalog)
}

/// The Z-related partner class, for cardinalities 4..=8
pub fn z_correspondent<'a>(set: PcSet, catalog: &'a Catalog) -> Option<&'a SetClass> {
    if !(4..=8).contains(&set.len()) {
        return None;
    }
    let partner = catalog.set_class_of(set)?.z_corr.as_deref()?;
    catalog.set_class(partner)
}

/// Modal complements that complete the set to a whole family member, or
/// that leave a hexachord with a single foreign pitch class. Family order.
pub fn modal_complements(set: PcSet) -> Vec<(RefCol, PcSet)> {
    if !named(set) {
        return Vec::new();
    }
    set.modal_complements()
        .into_iter()
        .filter(|&(col, complement)| {
            let member = set.enclosure(col).collection;
            let union = set.union(complement);
            (union == member && !complement.is_empty())
                || (set.len() == 6 && union.len() == member.len() + 1)
        })
        .collect()
}

/// Comma-joined pitch classes, "0,1,4,6"
pub fn format_pcs(pcs: &[PitchClass]) -> String {
    pcs.iter()
        .map(|pc| pc.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Space-joined attribute tokens, "O H D"
pub fn format_attributes(attrs: &[ModalAttribute]) -> String {
    attrs.iter()
        .map(|a| a.token())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One-line description: `"SN (level[, MA])"` for named sets, the normal
/// form for dyads and cardinalities 10..=12, the pitch class for a single
/// note and nothing for the empty set.
pub fn summary(set: PcSet, catalog: &Catalog) -> String {
    match set.len() {
        0 => String::new(),
        1 => set.iter().next().map(|pc| pc.to_string()).unwrap_or_default(),
        2 | 10..=12 => format_pcs(&set.normal_form()),
        _ => {
            let name = set_name(set, catalog);
            let level = transformation_level(set)
                .map(|l| l.to_string())
                .unwrap_or_default();
            let attrs = format_attributes(&modal_attributes(set));
            if attrs.is_empty() {
                format!("{} ({})", name, level)
            } else {
                format!("{} ({}, {})", name, level, attrs)
            }
        }
    }
}

// ======================================================================
// Profile
// ======================================================================

/// A modal complement with its own normal form and name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModalComplement {
    pub collection: RefCol,
    pub normal_form: Vec<PitchClass>,
    pub set_name: String,
}

/// Every derived field of a set, as the shell displays them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetProfile {
    pub set: PcSet,
    pub normal_form: Vec<PitchClass>,
    pub prime_form: String,
    pub set_name: String,
    pub transformation_level: Option<TransformationLevel>,
    pub modal_attributes: Vec<ModalAttribute>,
    pub icv: Option<[u8; NUM_ICS]>,
    pub index_vector: [Option<u8>; NUM_PCS as usize],
    pub literal_complement: Vec<PitchClass>,
    pub abstract_complement: String,
    pub abstract_complement_name: String,
    pub z_correspondent: Option<String>,
    pub z_correspondent_prime_form: Option<String>,
    pub modal_complements: Vec<ModalComplement>,
    pub summary: String,
}

impl SetProfile {
    pub fn new(set: PcSet, catalog: &Catalog) -> Self {
        let z = z_correspondent(set, catalog);
        Self {
            set,
            normal_form: set.normal_form(),
            prime_form: to_pf_str(&set.prime_form()),
            set_name: set_name(set, catalog),
            transformation_level: transformation_level(set),
            modal_attributes: modal_attributes(set),
            icv: interval_class_vector(set),
            index_vector: index_vector(set),
            literal_complement: literal_complement(set),
            abstract_complement: to_pf_str(&abstract_complement(set)),
            abstract_complement_name: abstract_complement_name(set, catalog),
            z_correspondent: z.map(|c| c.name.clone()),
            z_correspondent_prime_form: z.map(|c| c.prime_form.clone()),
            modal_complements: modal_complements(set)
                .into_iter()
                .map(|(collection, complement)| ModalComplement {
                    collection,
                    normal_form: complement.normal_form(),
                    set_name: set_name(complement, catalog),
                })
                .collect(),
            summary: summary(set, catalog),
        }
    }

    /// ICV rendered as digits, "111111"
    pub fn icv_string(&self) -> String {
        self.icv
            .map(|icv| icv.iter().map(|n| n.to_string()).collect())
            .unwrap_or_default()
    }
}

// ======================================================================
// Target set classes
// ======================================================================

/// Entry of the target set-class menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntry {
    pub name: String,
    pub cardinality: usize,
    /// Inclusion count relative to the current set class, when defined
    pub count: Option<u32>,
    /// Targets at the current cardinality cannot be searched
    pub enabled: bool,
}

impl TargetEntry {
    pub fn label(&self) -> String {
        match self.count {
            Some(count) => format!("{:5} ({})", self.name, count),
            None => self.name.clone(),
        }
    }
}

/// All set classes of cardinality 3..=9, in Forte order
pub fn target_menu(set: PcSet, catalog: &Catalog) -> Vec<TargetEntry> {
    let card = set.len();
    let host = if named(set) { catalog.set_class_of(set) } else { None };

    (3..=9)
        .flat_map(|target_card| {
            let counts = host.and_then(|h| catalog.inclusion_counts(&h.name, target_card));
            catalog
                .classes_of_cardinality(target_card)
                .map(move |class| TargetEntry {
                    name: class.name.clone(),
                    cardinality: target_card,
                    count: counts.and_then(|c| c.get(class.ordinal - 1).copied()),
                    enabled: target_card != card,
                })
        })
        .collect()
}

/// Row of the target set-class member table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetMember {
    pub member: PcSet,
    pub normal_form: Vec<PitchClass>,
    pub level: Option<TransformationLevel>,
    pub modal_attributes: Vec<ModalAttribute>,
    pub difference: Vec<PitchClass>,
    /// Summary of the difference when it has at least three pitch classes
    pub difference_summary: String,
}

/// Members of the target class included in the set (smaller targets) or
/// including it (larger targets)
pub fn target_members(set: PcSet, target: &str, catalog: &Catalog) -> Result<Vec<TargetMember>> {
    let target = catalog.require(target)?;
    if !(1..=11).contains(&set.len()) {
        return Ok(Vec::new());
    }

    let representative = target.representative();
    let pairs = if target.cardinality < set.len() {
        set.inclusion(representative)
    } else {
        set.complementation(representative)
    };

    Ok(pairs
        .into_iter()
        .map(|(member, difference)| TargetMember {
            member,
            normal_form: member.normal_form(),
            level: transformation_level(member),
            modal_attributes: modal_attributes(member),
            difference: difference.normal_form(),
            difference_summary: if difference.len() < 3 {
                String::new()
            } else {
                summary(difference, catalog)
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PcSetError;

    fn set(pcs: &[u8]) -> PcSet {
        PcSet::from_pcs(pcs.iter().copied()).unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::load().unwrap()
    }

    #[test]
    fn test_all_interval_tetrachord() {
        let cat = catalog();
        let s = set(&[0, 1, 4, 6]);
        assert_eq!(s.normal_form(), vec![0, 1, 4, 6]);
        assert_eq!(to_pf_str(&s.prime_form()), "0146");
        assert_eq!(set_name(s, &cat), "4-Z15");
        assert_eq!(interval_class_vector(s), Some([1, 1, 1, 1, 1, 1]));
        assert_eq!(z_correspondent(s, &cat).map(|c| c.name.as_str()), Some("4-Z29"));

        let profile = SetProfile::new(s, &cat);
        assert_eq!(profile.z_correspondent_prime_form.as_deref(), Some("0137"));
        assert_eq!(profile.icv_string(), "111111");
    }

    #[test]
    fn test_augmented_triad() {
        let cat = catalog();
        let s = set(&[0, 4, 8]);
        assert_eq!(s.normal_form(), vec![0, 4, 8]);
        assert_eq!(set_name(s, &cat), "3-12");
        assert_eq!(interval_class_vector(s), Some([0, 0, 0, 3, 0, 0]));
        assert_eq!(transformation_level(s).map(|l| l.to_string()).as_deref(), Some("T0"));
        assert_eq!(format_attributes(&modal_attributes(s)), "W H");
        assert_eq!(summary(s, &cat), "3-12 (T0, W H)");
    }

    #[test]
    fn test_heptachord_complements() {
        let cat = catalog();
        let s = set(&[0, 1, 3, 5, 6, 8, 10]);
        assert_eq!(abstract_complement(s).len(), 5);
        assert_eq!(literal_complement(s), set(&[2, 4, 7, 9, 11]).normal_form());
        assert_eq!(abstract_complement_name(s, &cat), "5-35");
        assert_eq!(set_name(s, &cat), "7-35");
    }

    #[test]
    fn test_aggregate() {
        let cat = catalog();
        let s = PcSet::chromatic();
        assert_eq!(s.normal_form(), (0..12).collect::<Vec<u8>>());
        assert_eq!(set_name(s, &cat), "");
        assert_eq!(s.icv(), [12, 12, 12, 12, 12, 6]);
        assert_eq!(interval_class_vector(s), None);
        assert!(literal_complement(s).is_empty());
        assert_eq!(summary(s, &cat), "0,1,2,3,4,5,6,7,8,9,10,11");
    }

    #[test]
    fn test_empty_set_is_blank() {
        let cat = catalog();
        let profile = SetProfile::new(PcSet::new(), &cat);
        assert!(profile.normal_form.is_empty());
        assert_eq!(profile.prime_form, "");
        assert_eq!(profile.set_name, "");
        assert_eq!(profile.transformation_level, None);
        assert!(profile.modal_attributes.is_empty());
        assert_eq!(profile.icv, None);
        assert_eq!(profile.index_vector, [None; 12]);
        assert!(profile.literal_complement.is_empty());
        assert_eq!(profile.abstract_complement, "");
        assert_eq!(profile.abstract_complement_name, "");
        assert_eq!(profile.z_correspondent, None);
        assert!(profile.modal_complements.is_empty());
        assert_eq!(profile.summary, "");
    }

    #[test]
    fn test_major_scale() {
        let cat = catalog();
        let s = set(&[0, 2, 4, 5, 7, 9, 11]);
        assert!(s.referential_collections().diatonic);
        assert!(modal_attributes(s).contains(&ModalAttribute::Diatonic));
        assert_eq!(set_name(s, &cat), "7-35");
        assert_eq!(summary(s, &cat), "7-35 (T11, D)");
    }

    #[test]
    fn test_summary_small_sets() {
        let cat = catalog();
        assert_eq!(summary(set(&[7]), &cat), "7");
        assert_eq!(summary(set(&[11, 0]), &cat), "11,0");
        assert_eq!(summary(set(&[0, 1, 2]), &cat), "3-1 (T0)");
    }

    #[test]
    fn test_named_sets_round_trip_through_catalog() {
        let cat = catalog();
        for mask in 0..=0x0FFFu16 {
            let s = PcSet::from_mask(mask);
            let name = set_name(s, &cat);
            if named(s) {
                let class = cat.set_class(&name).unwrap();
                assert_eq!(class.prime_form, to_pf_str(&s.prime_form()));
                let level = transformation_level(s).unwrap();
                assert_eq!(level.apply(class.representative()), s);
            } else {
                assert!(name.is_empty());
                assert_eq!(transformation_level(s), None);
            }
            assert_eq!(literal_complement(s).len() + s.len(), if s.is_empty() { 0 } else { 12 });
        }
    }

    #[test]
    fn test_z_correspondence_is_symmetric() {
        let cat = catalog();
        for mask in 0..=0x0FFFu16 {
            let a = PcSet::from_mask(mask);
            let Some(b) = z_correspondent(a, &cat) else { continue };
            let b_set = b.representative();
            let back = z_correspondent(b_set, &cat).unwrap();
            assert_eq!(back.name, set_name(a, &cat));
            assert_eq!(a.icv(), b_set.icv());
        }
    }

    #[test]
    fn test_index_vector_blanks() {
        assert_eq!(index_vector(set(&[3])), [None; 12]);
        assert_eq!(index_vector(PcSet::chromatic()), [None; 12]);
        let iv = index_vector(set(&[0, 1]));
        assert_eq!(iv[0], Some(1));
        assert_eq!(iv[1], Some(1));
        assert_eq!(iv[2], Some(1));
        assert_eq!(iv[3], Some(0));
    }

    #[test]
    fn test_modal_complement_filter() {
        // Dominant seventh sits in one octatonic member and completes it
        let dom7 = set(&[7, 11, 2, 5]);
        let mcomps = modal_complements(dom7);
        let cols: Vec<RefCol> = mcomps.iter().map(|(c, _)| *c).collect();
        assert_eq!(cols, vec![RefCol::Octatonic]);
        assert_eq!(mcomps[0].1, set(&[1, 4, 8, 10]));

        // 6-34 is primed in two families
        let mystic = set(&[0, 1, 3, 5, 7, 9]);
        let mcomps = modal_complements(mystic);
        assert_eq!(mcomps, vec![
            (RefCol::Octatonic, mystic.enclosure(RefCol::Octatonic).collection.difference(mystic)),
            (RefCol::WholeTone, mystic.enclosure(RefCol::WholeTone).collection.difference(mystic)),
        ]);

        // A set filling a whole family member has nothing to add
        assert!(modal_complements(RefCol::WholeTone.representative()).is_empty());
        assert!(modal_complements(set(&[0, 1])).is_empty());
    }

    #[test]
    fn test_profile_modal_complement_names() {
        let cat = catalog();
        let profile = SetProfile::new(set(&[0, 4, 8]), &cat);
        let rows: Vec<(RefCol, &str)> = profile
            .modal_complements
            .iter()
            .map(|m| (m.collection, m.set_name.as_str()))
            .collect();
        assert_eq!(rows, vec![(RefCol::WholeTone, "3-12"), (RefCol::Hexatonic, "3-12")]);
    }

    #[test]
    fn test_target_menu() {
        let cat = catalog();
        let major = set(&[0, 2, 4, 5, 7, 9, 11]);
        let menu = target_menu(major, &cat);
        assert_eq!(menu.len(), 12 + 29 + 38 + 50 + 38 + 29 + 12);

        let chromatic_trichord = &menu[0];
        assert_eq!(chromatic_trichord.name, "3-1");
        assert_eq!(chromatic_trichord.count, Some(0));
        let minor_triad = menu.iter().find(|e| e.name == "3-11").unwrap();
        assert_eq!(minor_triad.count, Some(6));
        assert_eq!(minor_triad.label(), "3-11  (6)");
        assert!(menu.iter().filter(|e| e.cardinality == 7).all(|e| !e.enabled && e.count.is_none()));

        let empty_menu = target_menu(PcSet::new(), &cat);
        assert!(empty_menu.iter().all(|e| e.enabled && e.count.is_none()));
    }

    #[test]
    fn test_target_members_inclusion() {
        let cat = catalog();
        let major = set(&[0, 2, 4, 5, 7, 9, 11]);
        let rows = target_members(major, "3-11", &cat).unwrap();
        assert_eq!(rows.len(), 6);
        let first = &rows[0];
        assert_eq!(first.normal_form, vec![0, 4, 7]);
        assert_eq!(first.level.map(|l| l.to_string()).as_deref(), Some("T7I"));
        assert_eq!(first.difference, vec![9, 11, 2, 5]);
        assert_eq!(first.difference_summary, summary(set(&[2, 5, 9, 11]), &cat));
    }

    #[test]
    fn test_target_members_complementation() {
        let cat = catalog();
        let triad = set(&[0, 4, 7]);
        let rows = target_members(triad, "4-26", &cat).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].normal_form, vec![4, 7, 9, 0]);
        assert_eq!(rows[0].difference, vec![9]);
        assert_eq!(rows[0].difference_summary, "");

        assert!(target_members(triad, "3-2", &cat).unwrap().is_empty());
        assert!(target_members(PcSet::new(), "3-2", &cat).unwrap().is_empty());
        assert!(matches!(
            target_members(triad, "3-99", &cat),
            Err(PcSetError::UnknownSetClass(_))
        ));
    }
}
