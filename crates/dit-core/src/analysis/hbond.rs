use crate::analysis::error::AnalysisError;
use crate::core::formats::gro::GroFrame;
use crate::core::formats::xpm::{XpmKind, XpmMatrix};
use crate::core::formats::xvg::XvgData;
use crate::core::utils::stats;
use itertools::Itertools;
use std::io::BufRead;
use tracing::warn;

/// Default label template; the twelve `{d,h,a}_{resname,resnum,atomname,atomnum}`
/// placeholders are substituted per hydrogen bond.
pub const DEFAULT_NAME_TEMPLATE: &str = "d_resname-d_resnum@d_atomname...a_resname-a_resnum@a_atomname";

/// Donor, hydrogen and acceptor atom numbers of one hydrogen bond, as
/// 1-based serials into the companion coordinate frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HbondTriple {
    pub donor: usize,
    pub hydrogen: usize,
    pub acceptor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperation {
    And,
    Or,
}

/// Per-hbond presence over time, one row per labelled hydrogen bond.
#[derive(Debug, Clone, PartialEq)]
pub struct HbondAnalysis {
    pub labels: Vec<String>,
    pub times: Vec<f64>,
    pub existence: Vec<Vec<bool>>,
}

fn group_name(line: &str) -> Option<&str> {
    line.strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .map(str::trim)
}

/// Reads the donor/hydrogen/acceptor triples of the trailing `hbonds_*`
/// group, scanning the file bottom-up until its header is met.
pub fn read_hbond_triples(reader: impl BufRead) -> Result<Vec<HbondTriple>, AnalysisError> {
    let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;

    let mut triples = Vec::new();
    let mut found_header = false;
    for (index, line) in lines.iter().enumerate().rev() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }
        if let Some(name) = group_name(trimmed) {
            if name.starts_with("hbonds_") {
                found_header = true;
                break;
            }
            return Err(AnalysisError::SchemaMismatch(format!(
                "trailing index group '{}' is not an hbonds_ group",
                name
            )));
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(AnalysisError::SchemaMismatch(format!(
                "hbond triple on line {} has {} fields, expected donor, hydrogen and acceptor",
                index + 1,
                fields.len()
            )));
        }
        let mut numbers = [0usize; 3];
        for (slot, field) in numbers.iter_mut().zip(&fields) {
            *slot = field.parse().map_err(|_| AnalysisError::NumericParse {
                line: index + 1,
                value: field.to_string(),
            })?;
        }
        triples.push(HbondTriple {
            donor: numbers[0],
            hydrogen: numbers[1],
            acceptor: numbers[2],
        });
    }
    if !found_header {
        return Err(AnalysisError::SchemaMismatch(
            "index file contains no hbonds_ group".into(),
        ));
    }
    triples.reverse();
    Ok(triples)
}

/// Builds one label per triple from `template`.
///
/// The literal templates `number` and `id` yield the 0-based position and the
/// 1-based original index; any other template has its placeholders replaced
/// with fields of the atoms the triple points at.
pub fn compose_labels(
    triples: &[HbondTriple],
    frame: &GroFrame,
    template: &str,
) -> Result<Vec<String>, AnalysisError> {
    if template == "number" {
        return Ok((0..triples.len()).map(|i| i.to_string()).collect());
    }
    if template == "id" {
        return Ok((1..=triples.len()).map(|i| i.to_string()).collect());
    }

    let atom_at = |serial: usize| {
        serial
            .checked_sub(1)
            .and_then(|i| frame.atoms.get(i))
            .ok_or_else(|| {
                AnalysisError::OutOfRange(format!(
                    "atom {} is not in the coordinate frame of {} atoms",
                    serial,
                    frame.atoms.len()
                ))
            })
    };

    let mut labels = Vec::with_capacity(triples.len());
    for triple in triples {
        let mut label = template.to_string();
        for (prefix, serial) in [
            ("d", triple.donor),
            ("h", triple.hydrogen),
            ("a", triple.acceptor),
        ] {
            let atom = atom_at(serial)?;
            label = label
                .replace(&format!("{}_resname", prefix), &atom.residue_name)
                .replace(&format!("{}_resnum", prefix), &atom.residue_id.to_string())
                .replace(&format!("{}_atomname", prefix), &atom.atom_name)
                .replace(&format!("{}_atomnum", prefix), &serial.to_string());
        }
        labels.push(label);
    }
    Ok(labels)
}

impl HbondAnalysis {
    /// Pairs labels with the rows of a discrete occupancy map.
    ///
    /// A map taller than the label list has its excess rows dropped from the
    /// top with a warning; a shorter map is fatal.
    pub fn from_parts(labels: Vec<String>, map: &XpmMatrix) -> Result<Self, AnalysisError> {
        if map.kind != XpmKind::Discrete {
            return Err(AnalysisError::SchemaMismatch(
                "occupancy map is not a discrete matrix".into(),
            ));
        }
        if map.height < labels.len() {
            return Err(AnalysisError::SchemaMismatch(format!(
                "occupancy map has {} rows for {} hydrogen bonds",
                map.height,
                labels.len()
            )));
        }
        let excess = map.height - labels.len();
        if excess > 0 {
            warn!(
                excess,
                "occupancy map is taller than the hbond list, dropping rows from the top"
            );
        }
        let existence = map.value_matrix[excess..]
            .iter()
            .map(|row| row.iter().map(|value| *value != 0.0).collect())
            .collect();
        Ok(Self {
            labels,
            times: map.x_axis.clone(),
            existence,
        })
    }

    /// Fraction of frames each hydrogen bond is present in.
    pub fn occupancies(&self) -> Vec<f64> {
        self.existence
            .iter()
            .map(|row| row.iter().filter(|present| **present).count() as f64 / row.len() as f64)
            .collect()
    }

    /// Appends the pointwise conjunction or disjunction of the selected rows
    /// as a new row labelled `and(..)` or `or(..)`.
    pub fn apply_set_operation(
        &mut self,
        operation: SetOperation,
        ids: &[usize],
    ) -> Result<(), AnalysisError> {
        if ids.is_empty() {
            return Err(AnalysisError::OutOfRange(
                "no hydrogen bond ids selected".into(),
            ));
        }
        for id in ids {
            if *id >= self.existence.len() {
                return Err(AnalysisError::OutOfRange(format!(
                    "hbond id {} out of range 0..{}",
                    id,
                    self.existence.len()
                )));
            }
        }

        let mut combined = self.existence[ids[0]].clone();
        for id in &ids[1..] {
            for (slot, present) in combined.iter_mut().zip(&self.existence[*id]) {
                *slot = match operation {
                    SetOperation::And => *slot && *present,
                    SetOperation::Or => *slot || *present,
                };
            }
        }
        let name = match operation {
            SetOperation::And => "and",
            SetOperation::Or => "or",
        };
        self.labels.push(format!("{}({})", name, ids.iter().join(",")));
        self.existence.push(combined);
        Ok(())
    }

    /// Per-hbond mean and population standard deviation of a companion
    /// quantity (distance or angle), taken over the frames the bond is
    /// present in. A bond that is never present yields `None`.
    ///
    /// The companion table holds time in column 0 and one column per row of
    /// this analysis, in order.
    pub fn stats_over_present(
        &self,
        table: &XvgData,
    ) -> Result<Vec<Option<(f64, f64)>>, AnalysisError> {
        if table.row_count != self.times.len() {
            return Err(AnalysisError::SchemaMismatch(format!(
                "companion table has {} rows for {} frames",
                table.row_count,
                self.times.len()
            )));
        }
        if table.column_count < self.existence.len() + 1 {
            return Err(AnalysisError::SchemaMismatch(format!(
                "companion table has {} columns for {} hydrogen bonds",
                table.column_count,
                self.existence.len()
            )));
        }

        let mut results = Vec::with_capacity(self.existence.len());
        for (index, row) in self.existence.iter().enumerate() {
            let values: Vec<f64> = row
                .iter()
                .zip(&table.columns[index + 1])
                .filter(|(present, _)| **present)
                .map(|(_, value)| *value)
                .collect();
            if values.is_empty() {
                results.push(None);
            } else {
                results.push(Some((stats::mean(&values), stats::population_std(&values))));
            }
        }
        Ok(results)
    }
}
