//! pcset-core: Pitch-class set theory engine and set-class catalog

pub mod catalog;
mod error;
pub mod pcset;
pub mod pf_str;
pub mod query;
pub mod session;
pub mod universe;

pub use catalog::{Catalog, ModalSetComplex, MscMember, SetClass};
pub use error::{PcSetError, Result};
pub use pcset::{Enclosure, PcSet, PitchClass, ReferentialScores, TransformationLevel, TransformationLevels};
pub use pf_str::{from_pf_str, to_pf_str};
pub use query::SetProfile;
pub use session::Session;
pub use universe::{ModalAttribute, REF_COLS, RefCol};
