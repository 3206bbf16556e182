use crate::core::elements;
use nalgebra::Point3;
use std::collections::BTreeMap;

/// A single atom within a loaded molecular record.
///
/// The atomic number is resolved from the element symbol at construction time
/// so downstream code (featurizers in particular) never has to re-consult the
/// element table or handle unknown symbols.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The element symbol as it appeared in the input (e.g. "C", "Cl").
    pub element: String,
    /// The nuclear charge Z.
    pub atomic_number: u32,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// The partial charge in elementary charge units, 0.0 when the input
    /// carries no charge column.
    pub partial_charge: f64,
}

impl Atom {
    /// Creates an atom from a known element symbol.
    ///
    /// Returns `None` when the symbol is not in the element table.
    pub fn new(element: &str, position: Point3<f64>) -> Option<Self> {
        let atomic_number = elements::atomic_number(element)?;
        Some(Self {
            element: element.to_string(),
            atomic_number,
            position,
            partial_charge: 0.0,
        })
    }

    pub fn is_hydrogen(&self) -> bool {
        self.atomic_number == elements::HYDROGEN
    }
}

/// One record of the input file: an identified molecule with free-form
/// properties.
///
/// Records are immutable once loaded; every downstream stage reads them and
/// produces new values instead of mutating in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    /// Unique record identifier within one input file.
    pub id: String,
    pub atoms: Vec<Atom>,
    /// `key=value` properties from the record's comment line. Ordered so
    /// writing a record back is deterministic.
    pub properties: BTreeMap<String, String>,
}

impl Molecule {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            atoms: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| !a.is_hydrogen()).count()
    }

    /// Fetches a named property parsed as a float, typically the regression
    /// label (e.g. an atomization energy).
    pub fn numeric_property(&self, name: &str) -> Option<f64> {
        self.properties.get(name)?.parse().ok()
    }
}
