use crate::core::models::molecule::Molecule;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing record-oriented chemical
/// file formats.
///
/// Implementors handle format-specific parsing and serialization; the default
/// methods provide the path-based conveniences on top of the stream forms.
pub trait ChemicalFile {
    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads all molecular records from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Molecule>, Self::Error>;

    /// Writes molecular records to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(molecules: &[Molecule], writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Reads all molecular records from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Molecule>, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes molecular records to a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(molecules: &[Molecule], path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(molecules, &mut writer)
    }
}
