use crate::core::io::traits::ChemicalFile;
use crate::core::models::molecule::{Atom, Molecule};
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: XyzParseErrorKind,
    },
    #[error("Record '{id}' is truncated: expected {expected} atom lines, found {found}")]
    TruncatedRecord {
        id: String,
        expected: usize,
        found: usize,
    },
    #[error("No records found in input")]
    Empty,
}

#[derive(Debug, Error)]
pub enum XyzParseErrorKind {
    #[error("Invalid atom count (value: '{value}')")]
    InvalidAtomCount { value: String },
    #[error("Invalid float in {field} column (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
    #[error("Atom line has {found} fields, expected at least 4 (symbol x y z)")]
    TooFewFields { found: usize },
    #[error("Unknown element symbol '{symbol}'")]
    UnknownElement { symbol: String },
}

fn parse_float(
    value: &str,
    field: &'static str,
    line: usize,
) -> Result<f64, XyzError> {
    value.parse().map_err(|_| XyzError::Parse {
        line,
        kind: XyzParseErrorKind::InvalidFloat {
            field,
            value: value.to_string(),
        },
    })
}

/// Record-oriented extended-XYZ files.
///
/// Each record is an atom-count line, a comment line carrying
/// whitespace-separated `key=value` properties, and one line per atom of the
/// form `symbol x y z [charge]`. Records follow each other back to back;
/// blank lines between records are tolerated. A record whose properties
/// include `id=...` keeps that identifier, otherwise one is synthesized from
/// the record's ordinal position.
pub struct XyzFile;

impl ChemicalFile for XyzFile {
    type Error = XyzError;

    fn read_from(reader: &mut impl BufRead) -> Result<Vec<Molecule>, Self::Error> {
        let mut molecules = Vec::new();
        let mut lines = reader.lines().enumerate();

        loop {
            // Atom-count line, skipping blank separators.
            let (count_line_num, atom_count) = loop {
                match lines.next() {
                    None => {
                        if molecules.is_empty() {
                            return Err(XyzError::Empty);
                        }
                        return Ok(molecules);
                    }
                    Some((idx, line_res)) => {
                        let line = line_res?;
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        let count: usize =
                            trimmed.parse().map_err(|_| XyzError::Parse {
                                line: idx + 1,
                                kind: XyzParseErrorKind::InvalidAtomCount {
                                    value: trimmed.to_string(),
                                },
                            })?;
                        break (idx + 1, count);
                    }
                }
            };

            let mut molecule = Molecule::new(format!("record-{}", molecules.len()));
            if let Some((_, line_res)) = lines.next() {
                let comment = line_res?;
                for token in comment.split_whitespace() {
                    if let Some((key, value)) = token.split_once('=') {
                        molecule
                            .properties
                            .insert(key.to_string(), value.to_string());
                    }
                }
                if let Some(id) = molecule.properties.get("id") {
                    molecule.id = id.clone();
                }
            } else {
                return Err(XyzError::TruncatedRecord {
                    id: molecule.id,
                    expected: atom_count,
                    found: 0,
                });
            }

            for i in 0..atom_count {
                let Some((idx, line_res)) = lines.next() else {
                    return Err(XyzError::TruncatedRecord {
                        id: molecule.id,
                        expected: atom_count,
                        found: i,
                    });
                };
                let line = line_res?;
                let line_num = idx + 1;
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() < 4 {
                    return Err(XyzError::Parse {
                        line: line_num,
                        kind: XyzParseErrorKind::TooFewFields {
                            found: fields.len(),
                        },
                    });
                }

                let x = parse_float(fields[1], "x", line_num)?;
                let y = parse_float(fields[2], "y", line_num)?;
                let z = parse_float(fields[3], "z", line_num)?;

                let mut atom = Atom::new(fields[0], Point3::new(x, y, z)).ok_or_else(|| {
                    XyzError::Parse {
                        line: line_num,
                        kind: XyzParseErrorKind::UnknownElement {
                            symbol: fields[0].to_string(),
                        },
                    }
                })?;
                if let Some(charge_str) = fields.get(4) {
                    atom.partial_charge = parse_float(charge_str, "charge", line_num)?;
                }
                molecule.atoms.push(atom);
            }

            molecules.push(molecule);
        }
    }

    fn write_to(molecules: &[Molecule], writer: &mut impl Write) -> Result<(), Self::Error> {
        for molecule in molecules {
            writeln!(writer, "{}", molecule.atom_count())?;

            let mut comment = format!("id={}", molecule.id);
            for (key, value) in &molecule.properties {
                if key != "id" {
                    comment.push_str(&format!(" {}={}", key, value));
                }
            }
            writeln!(writer, "{}", comment)?;

            for atom in &molecule.atoms {
                writeln!(
                    writer,
                    "{:<2} {:>14.8} {:>14.8} {:>14.8} {:>12.6}",
                    atom.element,
                    atom.position.x,
                    atom.position.y,
                    atom.position.z,
                    atom.partial_charge
                )?;
            }
        }
        Ok(())
    }
}
