use crate::core::formats::traits::FormatRead;
use nalgebra::{Point3, Vector3};
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GroError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: GroParseErrorKind,
    },
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum GroParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Atom line is too short (must cover the three coordinate fields)")]
    LineTooShort,
    #[error("Invalid atom count (value: '{value}')")]
    InvalidAtomCount { value: String },
    #[error("Box vector line carries {found} values, expected at least 3")]
    BoxVector { found: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroAtom {
    pub residue_id: usize,
    pub residue_name: String,
    pub atom_name: String,
    pub atom_id: usize,
    pub position: Point3<f64>,
    pub velocity: Option<Vector3<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroFrame {
    pub comment: String,
    pub atoms: Vec<GroAtom>,
    pub box_vector: Vec<f64>,
}

/// Frames of a (possibly concatenated) GRO file. Coordinates are in nm.
#[derive(Debug, Clone, PartialEq)]
pub struct GroData {
    pub frames: Vec<GroFrame>,
}

impl GroData {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Atom count of the first frame, the one all analyses consume.
    pub fn atom_count(&self) -> usize {
        self.frames.first().map_or(0, |f| f.atoms.len())
    }

    pub fn first_frame(&self) -> &GroFrame {
        &self.frames[0]
    }
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_int_field(line: &str, line_num: usize, start: usize, end: usize) -> Result<usize, GroError> {
    let text = slice_and_trim(line, start, end);
    text.parse().map_err(|_| GroError::Parse {
        line: line_num,
        kind: GroParseErrorKind::InvalidInt {
            columns: format!("{}-{}", start + 1, end),
            value: text.into(),
        },
    })
}

fn parse_float_field(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
) -> Result<f64, GroError> {
    let text = slice_and_trim(line, start, end);
    text.parse().map_err(|_| GroError::Parse {
        line: line_num,
        kind: GroParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: text.into(),
        },
    })
}

fn parse_atom_line(line: &str, line_num: usize) -> Result<GroAtom, GroError> {
    if line.len() < 44 {
        return Err(GroError::Parse {
            line: line_num,
            kind: GroParseErrorKind::LineTooShort,
        });
    }

    let residue_id = parse_int_field(line, line_num, 0, 5)?;
    let residue_name = slice_and_trim(line, 5, 10).to_string();
    let atom_name = slice_and_trim(line, 10, 15).to_string();
    let atom_id = parse_int_field(line, line_num, 15, 20)?;
    let position = Point3::new(
        parse_float_field(line, line_num, 20, 28)?,
        parse_float_field(line, line_num, 28, 36)?,
        parse_float_field(line, line_num, 36, 44)?,
    );

    let has_velocity = line
        .get(44..)
        .map(str::trim)
        .is_some_and(|tail| !tail.is_empty());
    let velocity = if has_velocity {
        Some(Vector3::new(
            parse_float_field(line, line_num, 44, 52)?,
            parse_float_field(line, line_num, 52, 60)?,
            parse_float_field(line, line_num, 60, 68)?,
        ))
    } else {
        None
    };

    Ok(GroAtom {
        residue_id,
        residue_name,
        atom_name,
        atom_id,
        position,
        velocity,
    })
}

impl FormatRead for GroData {
    type Error = GroError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self, Self::Error> {
        let mut lines = reader.lines().enumerate();
        let mut frames = Vec::new();

        'frames: loop {
            // Comment line; blank lines between frames are tolerated.
            let comment = loop {
                match lines.next() {
                    None => break 'frames,
                    Some((_, line_res)) => {
                        let line = line_res?;
                        if !line.trim().is_empty() {
                            break line.trim_end().to_string();
                        }
                    }
                }
            };

            let (count_idx, count_res) = lines
                .next()
                .ok_or_else(|| GroError::MissingRecord("atom count line".into()))?;
            let count_line = count_res?;
            let count_text = count_line.trim();
            let atom_count: usize =
                count_text.parse().map_err(|_| GroError::Parse {
                    line: count_idx + 1,
                    kind: GroParseErrorKind::InvalidAtomCount {
                        value: count_text.into(),
                    },
                })?;

            let mut atoms = Vec::with_capacity(atom_count);
            for _ in 0..atom_count {
                let (atom_idx, atom_res) = lines
                    .next()
                    .ok_or_else(|| GroError::MissingRecord("atom line".into()))?;
                atoms.push(parse_atom_line(&atom_res?, atom_idx + 1)?);
            }

            let (box_idx, box_res) = lines
                .next()
                .ok_or_else(|| GroError::MissingRecord("box vector line".into()))?;
            let box_line = box_res?;
            let mut box_vector = Vec::new();
            for token in box_line.split_whitespace() {
                let value = token.parse::<f64>().map_err(|_| GroError::Parse {
                    line: box_idx + 1,
                    kind: GroParseErrorKind::InvalidFloat {
                        columns: "box vector".into(),
                        value: token.into(),
                    },
                })?;
                box_vector.push(value);
            }
            if box_vector.len() < 3 {
                return Err(GroError::Parse {
                    line: box_idx + 1,
                    kind: GroParseErrorKind::BoxVector {
                        found: box_vector.len(),
                    },
                });
            }

            frames.push(GroFrame {
                comment,
                atoms,
                box_vector,
            });
        }

        if frames.is_empty() {
            return Err(GroError::MissingRecord("at least one frame".into()));
        }
        Ok(GroData { frames })
    }
}
