use super::{FeaturizeError, Featurizer};
use crate::core::models::molecule::{Atom, Molecule};
use nalgebra::{DMatrix, SymmetricEigen, distance};

const MIN_PAIR_DISTANCE: f64 = 1e-9;

/// Coulomb-matrix eigenvalue featurizer.
///
/// Builds the `max_atoms x max_atoms` Coulomb matrix of a structure
/// (`0.5 * Z^2.4` on the diagonal, `Z_i * Z_j / r_ij` off it, zero padding
/// beyond the molecule's atoms) and summarizes it as the eigenvalue spectrum
/// sorted by descending absolute value. Padding rows contribute trailing
/// zeros, so the output length is `max_atoms` for every record.
#[derive(Debug, Clone, PartialEq)]
pub struct CoulombMatrixEig {
    max_atoms: usize,
    remove_hydrogens: bool,
}

impl CoulombMatrixEig {
    pub fn new(max_atoms: usize, remove_hydrogens: bool) -> Self {
        Self {
            max_atoms,
            remove_hydrogens,
        }
    }

    pub fn max_atoms(&self) -> usize {
        self.max_atoms
    }

    fn selected_atoms<'a>(&self, molecule: &'a Molecule) -> Vec<&'a Atom> {
        molecule
            .atoms
            .iter()
            .filter(|a| !(self.remove_hydrogens && a.is_hydrogen()))
            .collect()
    }
}

impl Featurizer for CoulombMatrixEig {
    fn feature_len(&self) -> usize {
        self.max_atoms
    }

    fn featurize(&self, molecule: &Molecule) -> Result<Vec<f64>, FeaturizeError> {
        let atoms = self.selected_atoms(molecule);
        if atoms.is_empty() {
            return Err(FeaturizeError::NoAtoms {
                id: molecule.id.clone(),
            });
        }
        if atoms.len() > self.max_atoms {
            return Err(FeaturizeError::AtomCountExceeded {
                id: molecule.id.clone(),
                count: atoms.len(),
                max: self.max_atoms,
            });
        }

        let mut matrix = DMatrix::<f64>::zeros(self.max_atoms, self.max_atoms);
        for (i, atom_i) in atoms.iter().enumerate() {
            let z_i = f64::from(atom_i.atomic_number);
            matrix[(i, i)] = 0.5 * z_i.powf(2.4);
            for (j, atom_j) in atoms.iter().enumerate().skip(i + 1) {
                let r = distance(&atom_i.position, &atom_j.position);
                if r < MIN_PAIR_DISTANCE {
                    return Err(FeaturizeError::CoincidentAtoms {
                        id: molecule.id.clone(),
                        first: i,
                        second: j,
                    });
                }
                let value = z_i * f64::from(atom_j.atomic_number) / r;
                matrix[(i, j)] = value;
                matrix[(j, i)] = value;
            }
        }

        let mut eigenvalues: Vec<f64> = SymmetricEigen::new(matrix).eigenvalues.iter().copied().collect();
        eigenvalues.sort_by(|a, b| {
            b.abs()
                .partial_cmp(&a.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(eigenvalues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn molecule(id: &str, atoms: &[(&str, [f64; 3])]) -> Molecule {
        let mut mol = Molecule::new(id);
        for (symbol, [x, y, z]) in atoms {
            mol.atoms
                .push(Atom::new(symbol, Point3::new(*x, *y, *z)).unwrap());
        }
        mol
    }

    #[test]
    fn single_atom_yields_diagonal_term_and_padding() {
        let featurizer = CoulombMatrixEig::new(4, false);
        let mol = molecule("carbon", &[("C", [0.0, 0.0, 0.0])]);

        let features = featurizer.featurize(&mol).unwrap();
        assert_eq!(features.len(), 4);
        let expected = 0.5 * 6f64.powf(2.4);
        assert!((features[0] - expected).abs() < 1e-9);
        assert_eq!(&features[1..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn hydrogen_pair_spectrum_matches_closed_form() {
        // Matrix [[0.5, 1.0], [1.0, 0.5]] has eigenvalues 1.5 and -0.5.
        let featurizer = CoulombMatrixEig::new(2, false);
        let mol = molecule("h2", &[("H", [0.0, 0.0, 0.0]), ("H", [1.0, 0.0, 0.0])]);

        let features = featurizer.featurize(&mol).unwrap();
        assert!((features[0] - 1.5).abs() < 1e-9);
        assert!((features[1] + 0.5).abs() < 1e-9);
    }

    #[test]
    fn output_length_is_constant_across_sizes() {
        let featurizer = CoulombMatrixEig::new(5, false);
        let one = featurizer
            .featurize(&molecule("a", &[("O", [0.0, 0.0, 0.0])]))
            .unwrap();
        let two = featurizer
            .featurize(&molecule(
                "b",
                &[("O", [0.0, 0.0, 0.0]), ("H", [0.96, 0.0, 0.0])],
            ))
            .unwrap();
        assert_eq!(one.len(), 5);
        assert_eq!(two.len(), 5);
    }

    #[test]
    fn oversized_record_is_rejected_with_identity() {
        let featurizer = CoulombMatrixEig::new(1, false);
        let mol = molecule("big", &[("C", [0.0, 0.0, 0.0]), ("O", [1.2, 0.0, 0.0])]);

        assert_eq!(
            featurizer.featurize(&mol).unwrap_err(),
            FeaturizeError::AtomCountExceeded {
                id: "big".into(),
                count: 2,
                max: 1,
            }
        );
    }

    #[test]
    fn hydrogen_removal_resolves_oversized_records() {
        let mol = molecule(
            "methane",
            &[
                ("C", [0.0, 0.0, 0.0]),
                ("H", [0.63, 0.63, 0.63]),
                ("H", [-0.63, -0.63, 0.63]),
                ("H", [-0.63, 0.63, -0.63]),
                ("H", [0.63, -0.63, -0.63]),
            ],
        );

        let strict = CoulombMatrixEig::new(2, false);
        assert!(matches!(
            strict.featurize(&mol),
            Err(FeaturizeError::AtomCountExceeded { .. })
        ));

        let heavy_only = CoulombMatrixEig::new(2, true);
        let features = heavy_only.featurize(&mol).unwrap();
        assert_eq!(features.len(), 2);
        assert!((features[0] - 0.5 * 6f64.powf(2.4)).abs() < 1e-9);
        assert_eq!(features[1], 0.0);
    }

    #[test]
    fn empty_molecule_is_rejected() {
        let featurizer = CoulombMatrixEig::new(3, true);
        let mol = molecule("h-only", &[("H", [0.0, 0.0, 0.0])]);
        assert_eq!(
            featurizer.featurize(&mol).unwrap_err(),
            FeaturizeError::NoAtoms { id: "h-only".into() }
        );
    }

    #[test]
    fn coincident_atoms_are_rejected() {
        let featurizer = CoulombMatrixEig::new(2, false);
        let mol = molecule("dup", &[("C", [1.0, 1.0, 1.0]), ("O", [1.0, 1.0, 1.0])]);
        assert_eq!(
            featurizer.featurize(&mol).unwrap_err(),
            FeaturizeError::CoincidentAtoms {
                id: "dup".into(),
                first: 0,
                second: 1,
            }
        );
    }
}
