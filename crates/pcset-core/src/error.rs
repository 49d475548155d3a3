//! Error types for pcset

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PcSetError {
    #[error("Pitch class out of range: {0}")]
    PitchClassOutOfRange(i32),
    #[error("Invalid prime form character: {0:?}")]
    InvalidPrimeFormChar(char),
    #[error("Unknown set class: {0}")]
    UnknownSetClass(String),
    #[error("Catalog error: {0}")]
    Catalog(String),
    #[error("Catalog data error: {0}")]
    CatalogData(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PcSetError>;
