use crate::core::formats::traits::FormatRead;
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PdbParseErrorKind,
    },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Line is too short for an ATOM/HETATM record (must cover columns 1-54)")]
    LineTooShort,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PdbAtom {
    pub serial: usize,
    pub name: String,
    pub alt_loc: char,
    pub residue_name: String,
    pub chain_id: char,
    pub residue_seq: isize,
    pub insert_code: char,
    pub position: Point3<f64>,
    pub occupancy: f64,
    pub temp_factor: f64,
    pub element: String,
    pub charge: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbModel {
    pub atoms: Vec<PdbAtom>,
}

/// Models of a PDB file; a file without `ENDMDL` yields a single model.
#[derive(Debug, Clone, PartialEq)]
pub struct PdbData {
    pub models: Vec<PdbModel>,
}

impl PdbData {
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn first_model(&self) -> &PdbModel {
        &self.models[0]
    }
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn slice_char(line: &str, index: usize) -> char {
    line.get(index..index + 1)
        .and_then(|s| s.chars().next())
        .filter(|c| !c.is_whitespace())
        .unwrap_or(' ')
}

fn parse_float_field(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
) -> Result<f64, PdbError> {
    let text = slice_and_trim(line, start, end);
    text.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: text.into(),
        },
    })
}

fn parse_optional_float(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
) -> Result<f64, PdbError> {
    if slice_and_trim(line, start, end).is_empty() {
        return Ok(0.0);
    }
    parse_float_field(line, line_num, start, end)
}

fn parse_atom_line(line: &str, line_num: usize) -> Result<PdbAtom, PdbError> {
    if line.len() < 54 {
        return Err(PdbError::Parse {
            line: line_num,
            kind: PdbParseErrorKind::LineTooShort,
        });
    }

    let serial_str = slice_and_trim(line, 6, 11);
    let serial: usize = serial_str.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidInt {
            columns: "7-11".into(),
            value: serial_str.into(),
        },
    })?;

    let seq_str = slice_and_trim(line, 22, 26);
    let residue_seq: isize = seq_str.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidInt {
            columns: "23-26".into(),
            value: seq_str.into(),
        },
    })?;

    Ok(PdbAtom {
        serial,
        name: slice_and_trim(line, 12, 16).to_string(),
        alt_loc: slice_char(line, 16),
        residue_name: slice_and_trim(line, 17, 20).to_string(),
        chain_id: slice_char(line, 21),
        residue_seq,
        insert_code: slice_char(line, 26),
        position: Point3::new(
            parse_float_field(line, line_num, 30, 38)?,
            parse_float_field(line, line_num, 38, 46)?,
            parse_float_field(line, line_num, 46, 54)?,
        ),
        occupancy: parse_optional_float(line, line_num, 54, 60)?,
        temp_factor: parse_optional_float(line, line_num, 60, 66)?,
        element: slice_and_trim(line, 76, 78).to_string(),
        charge: slice_and_trim(line, 78, 80).to_string(),
    })
}

impl FormatRead for PdbData {
    type Error = PdbError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self, Self::Error> {
        let mut models: Vec<PdbModel> = Vec::new();
        let mut current = PdbModel::default();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record = slice_and_trim(&line, 0, 6);
            match record {
                "ATOM" | "HETATM" => {
                    current.atoms.push(parse_atom_line(&line, line_num)?);
                }
                "ENDMDL" => {
                    models.push(std::mem::take(&mut current));
                }
                _ => {}
            }
        }

        if !current.atoms.is_empty() {
            models.push(current);
        }
        if models.iter().all(|m| m.atoms.is_empty()) {
            return Err(PdbError::MissingRecord("ATOM/HETATM records".into()));
        }
        Ok(PdbData { models })
    }
}
