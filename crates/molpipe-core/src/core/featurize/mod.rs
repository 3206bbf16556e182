pub mod coulomb;

use crate::core::models::molecule::Molecule;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FeaturizeError {
    #[error("Record '{id}' has {count} atoms, exceeding the configured maximum of {max}")]
    AtomCountExceeded { id: String, count: usize, max: usize },

    #[error("Record '{id}' has no atoms left to featurize")]
    NoAtoms { id: String },

    #[error("Record '{id}' has coincident atoms at indices {first} and {second}")]
    CoincidentAtoms {
        id: String,
        first: usize,
        second: usize,
    },
}

/// Converts a molecular structure into a fixed-length numeric vector.
///
/// Implementations must return vectors of exactly `feature_len()` values for
/// every record they accept, so the resulting dataset is rectangular.
pub trait Featurizer {
    /// The length of every feature vector this featurizer produces.
    fn feature_len(&self) -> usize;

    /// Featurizes a single record.
    ///
    /// # Errors
    ///
    /// Returns a [`FeaturizeError`] identifying the offending record when the
    /// structure cannot be represented (too many atoms, degenerate geometry).
    fn featurize(&self, molecule: &Molecule) -> Result<Vec<f64>, FeaturizeError>;
}
