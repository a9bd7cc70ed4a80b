use crate::analysis::error::AnalysisError;
use crate::core::formats::xpm::{XpmError, XpmKind, XpmMatrix, palette_token};
use crate::core::utils::colormap;
use std::io::{BufRead, Write};

/// Pixel-wise difference `A − B` of two Continuous matrices.
///
/// The numeric matrix is exact; only the palette is regenerated from the new
/// value range.
pub fn diff(
    a: &XpmMatrix,
    b: &XpmMatrix,
    colormap_id: &str,
    precision: u32,
) -> Result<XpmMatrix, AnalysisError> {
    if a.kind != XpmKind::Continuous || b.kind != XpmKind::Continuous {
        return Err(AnalysisError::SchemaMismatch(
            "difference requires two Continuous matrices".into(),
        ));
    }
    if !a.is_shape_compatible(b) {
        return Err(AnalysisError::SchemaMismatch(format!(
            "matrices are not shape-compatible: {}x{} vs {}x{}",
            a.width, a.height, b.width, b.height
        )));
    }

    let mut result = a.clone();
    result.value_matrix = a
        .value_matrix
        .iter()
        .zip(&b.value_matrix)
        .map(|(row_a, row_b)| row_a.iter().zip(row_b).map(|(x, y)| x - y).collect())
        .collect();
    result.refresh_by_values(colormap_id, precision)?;
    Ok(result)
}

fn taken_from_first(row: usize, col: usize, width: usize, height: usize) -> bool {
    (row as f64) / (height as f64) + (col as f64) / (width as f64) < 1.0
}

/// Merges two shape-compatible matrices along the anti-diagonal: pixels in
/// the upper-left half-plane (anti-diagonal included) come from `a`, the
/// rest from `b`. The merged values drive a fresh palette.
pub fn merge(
    a: &XpmMatrix,
    b: &XpmMatrix,
    colormap_id: &str,
    precision: u32,
) -> Result<XpmMatrix, AnalysisError> {
    if !a.is_shape_compatible(b) {
        return Err(AnalysisError::SchemaMismatch(format!(
            "matrices are not shape-compatible: {}x{}/{:?} vs {}x{}/{:?}",
            a.width, a.height, a.kind, b.width, b.height, b.kind
        )));
    }

    match a.kind {
        XpmKind::Continuous => {
            let mut result = a.clone();
            result.value_matrix = (0..a.height)
                .map(|row| {
                    (0..a.width)
                        .map(|col| {
                            if taken_from_first(row, col, a.width, a.height) {
                                a.value_matrix[row][col]
                            } else {
                                b.value_matrix[row][col]
                            }
                        })
                        .collect()
                })
                .collect();
            result.refresh_by_values(colormap_id, precision)?;
            Ok(result)
        }
        XpmKind::Discrete => merge_discrete(a, b, colormap_id),
    }
}

fn merge_discrete(
    a: &XpmMatrix,
    b: &XpmMatrix,
    colormap_id: &str,
) -> Result<XpmMatrix, AnalysisError> {
    // Merged note labels, in first-appearance order, become the new palette.
    let mut labels: Vec<String> = Vec::new();
    let mut value_matrix = Vec::with_capacity(a.height);
    for row in 0..a.height {
        let mut value_row = Vec::with_capacity(a.width);
        for col in 0..a.width {
            let source = if taken_from_first(row, col, a.width, a.height) {
                a
            } else {
                b
            };
            let index = source.value_matrix[row][col] as usize;
            let label = source.notes.get(index).cloned().unwrap_or_default();
            let merged_index = match labels.iter().position(|l| l == &label) {
                Some(i) => i,
                None => {
                    labels.push(label);
                    labels.len() - 1
                }
            };
            value_row.push(merged_index as f64);
        }
        value_matrix.push(value_row);
    }

    let colors = colormap::discrete_series(colormap_id, labels.len())
        .ok_or_else(|| XpmError::UnknownColormap(colormap_id.to_string()))?;
    let chars: Vec<String> = (0..labels.len())
        .map(|i| palette_token(i, a.chars_per_pixel))
        .collect();
    let dot_matrix = value_matrix
        .iter()
        .map(|row| row.iter().map(|&v| chars[v as usize].clone()).collect())
        .collect();

    let mut result = a.clone();
    result.color_count = labels.len();
    result.chars = chars;
    result.colors = colors;
    result.notes = labels;
    result.dot_matrix = dot_matrix;
    result.value_matrix = value_matrix;
    Ok(result)
}

/// Index bounds for [`cut`], each half-open and in stored orientation
/// (row 0 is the top of the image).
#[derive(Debug, Clone, Copy, Default)]
pub struct CutBounds {
    pub xmin: Option<usize>,
    pub xmax: Option<usize>,
    pub ymin: Option<usize>,
    pub ymax: Option<usize>,
}

/// Trims the matrix to the sub-range `[xmin, xmax) × [ymin, ymax)`.
pub fn cut(xpm: &XpmMatrix, bounds: CutBounds) -> Result<XpmMatrix, AnalysisError> {
    let xmin = bounds.xmin.unwrap_or(0);
    let xmax = bounds.xmax.unwrap_or(xpm.width);
    let ymin = bounds.ymin.unwrap_or(0);
    let ymax = bounds.ymax.unwrap_or(xpm.height);

    if xmax > xpm.width || ymax > xpm.height {
        return Err(AnalysisError::OutOfRange(format!(
            "cut bounds exceed the {}x{} matrix",
            xpm.width, xpm.height
        )));
    }
    if xmin >= xmax || ymin >= ymax {
        return Err(AnalysisError::OutOfRange(format!(
            "cut range [{}, {}) x [{}, {}) has zero extent",
            xmin, xmax, ymin, ymax
        )));
    }

    let mut result = xpm.clone();
    result.x_axis = xpm.x_axis[xmin..xmax].to_vec();
    result.y_axis = xpm.y_axis[ymin..ymax].to_vec();
    result.dot_matrix = xpm.dot_matrix[ymin..ymax]
        .iter()
        .map(|row| row[xmin..xmax].to_vec())
        .collect();
    result.value_matrix = xpm.value_matrix[ymin..ymax]
        .iter()
        .map(|row| row[xmin..xmax].to_vec())
        .collect();
    result.width = xmax - xmin;
    result.height = ymax - ymin;
    Ok(result)
}

fn mapping_comments(xpm: &XpmMatrix) -> Vec<String> {
    xpm.notes
        .iter()
        .enumerate()
        .map(|(i, note)| format!("# {}: {}", i, note))
        .collect()
}

/// Emits `(x, y, z)` rows in row-major order, prefixed by index→label
/// comments when the source is Discrete.
pub fn write_csv(xpm: &XpmMatrix, writer: &mut impl Write) -> Result<(), AnalysisError> {
    if xpm.kind == XpmKind::Discrete {
        for comment in mapping_comments(xpm) {
            writeln!(writer, "{}", comment)?;
        }
    }

    let fallback = |label: &str, default: &str| {
        if label.is_empty() {
            default.to_string()
        } else {
            label.to_string()
        }
    };
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        fallback(&xpm.x_label, "x"),
        fallback(&xpm.y_label, "y"),
        fallback(&xpm.legend, "z"),
    ])?;
    for row in 0..xpm.height {
        for col in 0..xpm.width {
            csv_writer.write_record([
                xpm.x_axis[col].to_string(),
                xpm.y_axis[row].to_string(),
                xpm.value_matrix[row][col].to_string(),
            ])?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

/// Emits the x-axis row, the y-axis top-to-bottom and bottom-to-top, then
/// the full value matrix row by row.
pub fn write_dat(xpm: &XpmMatrix, writer: &mut impl Write) -> Result<(), AnalysisError> {
    if xpm.kind == XpmKind::Discrete {
        for comment in mapping_comments(xpm) {
            writeln!(writer, "{}", comment)?;
        }
    }

    let join = |values: &[f64]| {
        values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    };
    writeln!(writer, "{}", join(&xpm.x_axis))?;
    writeln!(writer, "{}", join(&xpm.y_axis))?;
    let ascending: Vec<f64> = xpm.y_axis.iter().rev().copied().collect();
    writeln!(writer, "{}", join(&ascending))?;
    for row in &xpm.value_matrix {
        writeln!(writer, "{}", join(row))?;
    }
    Ok(())
}

/// Reconstructs a Continuous matrix from [`write_dat`] output.
pub fn read_dat(reader: &mut impl BufRead) -> Result<XpmMatrix, AnalysisError> {
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (line_num, line_res) in reader.lines().enumerate() {
        let line = line_res?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut row = Vec::new();
        for token in trimmed.split_whitespace() {
            let value = token.parse::<f64>().map_err(|_| AnalysisError::NumericParse {
                line: line_num + 1,
                value: token.to_string(),
            })?;
            row.push(value);
        }
        rows.push(row);
    }

    if rows.len() < 3 {
        return Err(AnalysisError::SchemaMismatch(
            "DAT input must carry an x-axis row and two y-axis rows".into(),
        ));
    }
    let x_axis = rows[0].clone();
    let y_descending = rows[1].clone();
    let y_ascending = rows[2].clone();
    let mirrored: Vec<f64> = y_descending.iter().rev().copied().collect();
    if y_ascending != mirrored {
        return Err(AnalysisError::SchemaMismatch(
            "second and third DAT rows are not mirror images of the y axis".into(),
        ));
    }

    let value_rows = rows[3..].to_vec();
    if value_rows.len() != y_descending.len() {
        return Err(AnalysisError::SchemaMismatch(format!(
            "expected {} matrix rows, found {}",
            y_descending.len(),
            value_rows.len()
        )));
    }
    if value_rows.iter().any(|row| row.len() != x_axis.len()) {
        return Err(AnalysisError::SchemaMismatch(
            "matrix rows do not all match the x-axis length".into(),
        ));
    }

    Ok(XpmMatrix::continuous_from_values(
        "",
        "",
        "",
        "",
        x_axis,
        y_descending,
        value_rows,
        colormap::DEFAULT_COLORMAP,
        3,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn continuous(values: Vec<Vec<f64>>) -> XpmMatrix {
        let width = values[0].len();
        let height = values.len();
        let x_axis: Vec<f64> = (0..width).map(|i| i as f64).collect();
        let y_axis: Vec<f64> = (0..height).map(|i| (height - i) as f64).collect();
        XpmMatrix::continuous_from_values(
            "demo", "", "x", "y", x_axis, y_axis, values, "bwr", 3,
        )
        .unwrap()
    }

    fn discrete(notes: &[&str], values: Vec<Vec<f64>>) -> XpmMatrix {
        let width = values[0].len();
        let height = values.len();
        let chars: Vec<String> = (0..notes.len()).map(|i| palette_token(i, 1)).collect();
        let dot_matrix = values
            .iter()
            .map(|row| row.iter().map(|&v| chars[v as usize].clone()).collect())
            .collect();
        XpmMatrix {
            title: "demo".into(),
            legend: String::new(),
            kind: XpmKind::Discrete,
            x_label: "x".into(),
            y_label: "y".into(),
            width,
            height,
            color_count: notes.len(),
            chars_per_pixel: 1,
            chars,
            colors: colormap::discrete_series("bwr", notes.len()).unwrap(),
            notes: notes.iter().map(|s| s.to_string()).collect(),
            x_axis: (0..width).map(|i| i as f64).collect(),
            y_axis: (0..height).map(|i| (height - i) as f64).collect(),
            dot_matrix,
            value_matrix: values,
        }
    }

    #[test]
    fn diff_subtracts_values_exactly() {
        let a = continuous(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = continuous(vec![vec![0.0, 1.0], vec![2.0, 3.0]]);
        let d = diff(&a, &b, "bwr", 3).unwrap();
        assert_eq!(d.value_matrix, vec![vec![1.0, 1.0], vec![1.0, 1.0]]);
        assert_eq!(d.notes.len(), d.color_count);
        assert_eq!(d.dot_matrix.len(), d.height);
    }

    #[test]
    fn diff_rejects_discrete_and_mismatched_shapes() {
        let a = continuous(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let disc = discrete(&["off", "on"], vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        assert!(matches!(
            diff(&a, &disc, "bwr", 3),
            Err(AnalysisError::SchemaMismatch(_))
        ));

        let wide = continuous(vec![vec![1.0, 2.0, 3.0]]);
        assert!(matches!(
            diff(&a, &wide, "bwr", 3),
            Err(AnalysisError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn merge_takes_upper_left_half_from_first() {
        let a = continuous(vec![vec![1.0, 1.0], vec![1.0, 1.0]]);
        let b = continuous(vec![vec![5.0, 5.0], vec![5.0, 5.0]]);
        let merged = merge(&a, &b, "bwr", 3).unwrap();
        assert_eq!(
            merged.value_matrix,
            vec![vec![1.0, 1.0], vec![1.0, 5.0]]
        );
        let from_a = merged
            .value_matrix
            .iter()
            .flatten()
            .filter(|&&v| v == 1.0)
            .count();
        // 2x2: anti-diagonal cells belong to the first matrix.
        assert_eq!(from_a, 3);
    }

    #[test]
    fn merge_discrete_rebuilds_palette_from_labels() {
        let a = discrete(&["absent", "present"], vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        let b = discrete(&["none", "yes"], vec![vec![0.0, 0.0], vec![0.0, 1.0]]);
        let merged = merge(&a, &b, "bwr", 3).unwrap();

        assert_eq!(merged.kind, XpmKind::Discrete);
        // Pixels: (0,0)=a:absent (0,1)=a:present (1,0)=a:present (1,1)=b:yes.
        assert_eq!(merged.notes, vec!["absent", "present", "yes"]);
        assert_eq!(merged.color_count, 3);
        assert_eq!(merged.chars.len(), 3);
        assert_eq!(merged.colors.len(), 3);
        assert_eq!(
            merged.value_matrix,
            vec![vec![0.0, 1.0], vec![1.0, 2.0]]
        );
    }

    #[test]
    fn cut_trims_axes_and_both_matrices() {
        let xpm = continuous(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let bounds = CutBounds {
            xmin: Some(1),
            ..CutBounds::default()
        };
        let cut_xpm = cut(&xpm, bounds).unwrap();
        assert_eq!((cut_xpm.width, cut_xpm.height), (2, 2));
        assert_eq!(cut_xpm.x_axis, vec![1.0, 2.0]);
        assert_eq!(
            cut_xpm.value_matrix,
            vec![vec![2.0, 3.0], vec![5.0, 6.0]]
        );
    }

    #[test]
    fn cut_rejects_zero_extent_and_overrun() {
        let xpm = continuous(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert!(matches!(
            cut(
                &xpm,
                CutBounds {
                    xmin: Some(1),
                    xmax: Some(1),
                    ..CutBounds::default()
                }
            ),
            Err(AnalysisError::OutOfRange(_))
        ));
        assert!(matches!(
            cut(
                &xpm,
                CutBounds {
                    ymax: Some(9),
                    ..CutBounds::default()
                }
            ),
            Err(AnalysisError::OutOfRange(_))
        ));
    }

    #[test]
    fn csv_emits_width_times_height_rows() {
        let xpm = continuous(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let mut buffer = Vec::new();
        write_csv(&xpm, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "x,y,z");
        assert_eq!(lines.len(), 1 + xpm.width * xpm.height);
        assert_eq!(lines[1], "0,2,1");
    }

    #[test]
    fn discrete_csv_lists_the_index_mapping() {
        let xpm = discrete(&["absent", "present"], vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        let mut buffer = Vec::new();
        write_csv(&xpm, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("# 0: absent\n# 1: present\n"));
    }

    #[test]
    fn dat_round_trip_preserves_the_value_matrix() {
        let xpm = continuous(vec![vec![1.5, 2.0, 3.0], vec![4.0, 5.0, 6.25]]);
        let mut buffer = Vec::new();
        write_dat(&xpm, &mut buffer).unwrap();

        let restored = read_dat(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(restored.value_matrix, xpm.value_matrix);
        assert_eq!(restored.x_axis, xpm.x_axis);
        assert_eq!(restored.y_axis, xpm.y_axis);
        assert_eq!(restored.kind, XpmKind::Continuous);
    }

    #[test]
    fn dat_reader_rejects_mismatched_y_rows() {
        let text = "0 1\n2 1\n2 1\n0 0\n0 0\n";
        assert!(matches!(
            read_dat(&mut Cursor::new(text)),
            Err(AnalysisError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn dat_reader_rejects_non_numeric_tokens() {
        let text = "0 1\n2 1\n1 2\nx y\n0 0\n";
        assert!(matches!(
            read_dat(&mut Cursor::new(text)),
            Err(AnalysisError::NumericParse { .. })
        ));
    }
}
