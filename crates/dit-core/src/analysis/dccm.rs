use crate::analysis::error::AnalysisError;
use crate::core::formats::xpm::XpmMatrix;
use crate::core::utils::stats::round_to;
use nalgebra::DMatrix;
use std::io::BufRead;

pub const DCCM_TITLE: &str = "DCCM by DIT";

#[derive(Debug, Clone)]
pub struct DccmOptions {
    pub precision: u32,
    pub colormap: String,
}

impl Default for DccmOptions {
    fn default() -> Self {
        Self {
            precision: 3,
            colormap: "bwr".to_string(),
        }
    }
}

fn read_numbers(reader: &mut impl BufRead) -> Result<Vec<f64>, AnalysisError> {
    let mut values = Vec::new();
    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        for token in line.split_whitespace() {
            let value = token.parse::<f64>().map_err(|_| AnalysisError::NumericParse {
                line: line_num + 1,
                value: token.to_string(),
            })?;
            values.push(value);
        }
    }
    Ok(values)
}

/// Derives the residue cross-correlation matrix from an ASCII covariance
/// dump and packages it as a Continuous matrix spanning `[-1, 1]`.
///
/// The dump must hold `3·M²` numbers: one Cartesian triple per residue pair,
/// summed into the covariance entry. `M` is inferred and must be an exact
/// integer square root.
pub fn dccm_from_ascii(
    reader: &mut impl BufRead,
    options: &DccmOptions,
) -> Result<XpmMatrix, AnalysisError> {
    let values = read_numbers(reader)?;

    if values.is_empty() || values.len() % 3 != 0 {
        return Err(AnalysisError::SchemaMismatch(format!(
            "covariance dump holds {} numbers, expected a positive multiple of 3",
            values.len()
        )));
    }
    let pair_count = values.len() / 3;
    let residue_count = (pair_count as f64).sqrt().round() as usize;
    if residue_count * residue_count != pair_count {
        return Err(AnalysisError::SchemaMismatch(format!(
            "{} covariance triples do not form a square residue matrix",
            pair_count
        )));
    }

    let covariance = DMatrix::from_fn(residue_count, residue_count, |i, j| {
        let base = 3 * (i * residue_count + j);
        values[base] + values[base + 1] + values[base + 2]
    });

    for i in 0..residue_count {
        let diagonal = covariance[(i, i)];
        if diagonal <= 0.0 {
            return Err(AnalysisError::OutOfRange(format!(
                "covariance diagonal [{}][{}] = {} must be positive",
                i, i, diagonal
            )));
        }
    }

    let correlation = DMatrix::from_fn(residue_count, residue_count, |i, j| {
        let value = covariance[(i, j)] / (covariance[(i, i)] * covariance[(j, j)]).sqrt();
        round_to(value, options.precision)
    });

    // Axis 1..=M; stored rows run top-to-bottom, so residue M comes first.
    let x_axis: Vec<f64> = (1..=residue_count).map(|i| i as f64).collect();
    let y_axis: Vec<f64> = (1..=residue_count).rev().map(|i| i as f64).collect();
    let value_matrix: Vec<Vec<f64>> = (0..residue_count)
        .rev()
        .map(|i| (0..residue_count).map(|j| correlation[(i, j)]).collect())
        .collect();

    let mut matrix = XpmMatrix::continuous_from_values(
        DCCM_TITLE,
        "",
        "Residue No.",
        "Residue No.",
        x_axis,
        y_axis,
        value_matrix,
        &options.colormap,
        options.precision,
    )?;
    matrix.refresh_with_range(&options.colormap, options.precision, -1.0, 1.0)?;
    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(text: &str) -> Result<XpmMatrix, AnalysisError> {
        dccm_from_ascii(&mut Cursor::new(text), &DccmOptions::default())
    }

    #[test]
    fn two_residue_correlation() {
        // Summed covariance blocks: [[4, 2], [2, 9]].
        let text = "1 1 2\n1 0 1\n2 0 0\n4 4 1\n";
        let xpm = run(text).unwrap();

        assert_eq!(xpm.title, DCCM_TITLE);
        assert_eq!((xpm.width, xpm.height), (2, 2));
        assert_eq!(xpm.x_label, "Residue No.");
        assert_eq!(xpm.x_axis, vec![1.0, 2.0]);
        assert_eq!(xpm.y_axis, vec![2.0, 1.0]);
        // Top row is residue 2: corr(2,1) = 2/sqrt(36) = 0.333.
        assert_eq!(xpm.value_matrix, vec![vec![0.333, 1.0], vec![1.0, 0.333]]);
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let text = "2 1 1\n0.5 0.25 0.25\n0.5 0.5 0\n3 3 3\n";
        let xpm = run(text).unwrap();
        let m = &xpm.value_matrix;
        for i in 0..2 {
            for j in 0..2 {
                assert!((m[i][j] - m[j][i]).abs() <= 1e-3);
            }
        }
        assert_eq!(m[0][1], 1.0);
        assert_eq!(m[1][0], 1.0);
    }

    #[test]
    fn palette_spans_minus_one_to_one() {
        let text = "1 1 2\n1 0 1\n2 0 0\n4 4 1\n";
        let xpm = run(text).unwrap();
        assert_eq!(xpm.notes.first().map(String::as_str), Some("-1.000"));
        assert_eq!(xpm.notes.last().map(String::as_str), Some("1.000"));
    }

    #[test]
    fn non_square_triple_count_is_rejected() {
        assert!(matches!(
            run("1 2 3\n4 5 6\n7 8 9\n"),
            Err(AnalysisError::SchemaMismatch(_))
        ));
        assert!(matches!(
            run("1 2 3 4\n"),
            Err(AnalysisError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn non_positive_diagonal_is_rejected() {
        let text = "0 0 0\n1 0 1\n2 0 0\n4 4 1\n";
        assert!(matches!(run(text), Err(AnalysisError::OutOfRange(_))));
    }

    #[test]
    fn non_numeric_token_is_rejected() {
        assert!(matches!(
            run("1 1 nope\n"),
            Err(AnalysisError::NumericParse { line: 1, .. })
        ));
    }
}
