use phf::{Map, phf_map};

/// Nuclear charges for the element symbols this pipeline accepts.
///
/// Covers periods 1-4 plus the heavier elements that show up in small-molecule
/// datasets (halogens, common metals). Lookup is case-sensitive on the
/// conventional capitalization; [`atomic_number`] handles the common
/// all-caps/all-lowercase spellings seen in the wild.
#[rustfmt::skip]
pub static ATOMIC_NUMBERS: Map<&'static str, u32> = phf_map! {
    "H"  => 1,  "He" => 2,
    "Li" => 3,  "Be" => 4,  "B"  => 5,  "C"  => 6,  "N"  => 7,
    "O"  => 8,  "F"  => 9,  "Ne" => 10,
    "Na" => 11, "Mg" => 12, "Al" => 13, "Si" => 14, "P"  => 15,
    "S"  => 16, "Cl" => 17, "Ar" => 18,
    "K"  => 19, "Ca" => 20, "Sc" => 21, "Ti" => 22, "V"  => 23,
    "Cr" => 24, "Mn" => 25, "Fe" => 26, "Co" => 27, "Ni" => 28,
    "Cu" => 29, "Zn" => 30, "Ga" => 31, "Ge" => 32, "As" => 33,
    "Se" => 34, "Br" => 35, "Kr" => 36,
    "Ru" => 44, "Rh" => 45, "Pd" => 46, "Ag" => 47, "Cd" => 48,
    "Sn" => 50, "Sb" => 51, "Te" => 52, "I"  => 53, "Xe" => 54,
    "Pt" => 78, "Au" => 79, "Hg" => 80, "Pb" => 82, "Bi" => 83,
};

pub const HYDROGEN: u32 = 1;

/// Resolves an element symbol to its atomic number.
///
/// Accepts the conventional capitalization directly and normalizes
/// single-case spellings ("CL", "cl") before giving up.
pub fn atomic_number(symbol: &str) -> Option<u32> {
    if let Some(&z) = ATOMIC_NUMBERS.get(symbol) {
        return Some(z);
    }
    let normalized: String = symbol
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect();
    ATOMIC_NUMBERS.get(normalized.as_str()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_elements_resolve() {
        assert_eq!(atomic_number("H"), Some(1));
        assert_eq!(atomic_number("C"), Some(6));
        assert_eq!(atomic_number("N"), Some(7));
        assert_eq!(atomic_number("O"), Some(8));
        assert_eq!(atomic_number("S"), Some(16));
        assert_eq!(atomic_number("Br"), Some(35));
    }

    #[test]
    fn lookup_normalizes_single_case_spellings() {
        assert_eq!(atomic_number("CL"), Some(17));
        assert_eq!(atomic_number("cl"), Some(17));
        assert_eq!(atomic_number("fe"), Some(26));
    }

    #[test]
    fn unknown_symbols_return_none() {
        assert_eq!(atomic_number("Xx"), None);
        assert_eq!(atomic_number(""), None);
        assert_eq!(atomic_number("12"), None);
    }
}
