use crate::analysis::error::AnalysisError;
use crate::core::formats::xvg::XvgData;
use crate::core::utils::stats::{mean, normal_ppf, population_std};
use std::io::Write;

/// Per-column averages over a row range, parallel to `heads`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnAverages {
    pub heads: Vec<String>,
    pub averages: Vec<f64>,
    pub stds: Vec<f64>,
}

/// Per-column moving averages with a symmetric confidence band.
///
/// Cells below the window size are `None`; the companion CSV renders them as
/// the literal `nan`.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverages {
    pub heads: Vec<String>,
    pub mvave: Vec<Vec<Option<f64>>>,
    pub high: Vec<Vec<Option<f64>>>,
    pub low: Vec<Vec<Option<f64>>>,
}

/// Averages every column (x included) over the half-open row range
/// `[begin, end)`, with the population standard deviation.
pub fn calc_average(
    table: &XvgData,
    begin: usize,
    end: Option<usize>,
) -> Result<ColumnAverages, AnalysisError> {
    let end = end.unwrap_or(table.row_count);
    if begin >= end || end > table.row_count {
        return Err(AnalysisError::OutOfRange(format!(
            "row range [{}, {}) is not within 0..{}",
            begin, end, table.row_count
        )));
    }

    let mut averages = Vec::with_capacity(table.column_count);
    let mut stds = Vec::with_capacity(table.column_count);
    for column in &table.columns {
        let window = &column[begin..end];
        averages.push(mean(window));
        stds.push(population_std(window));
    }

    Ok(ColumnAverages {
        heads: table.heads.clone(),
        averages,
        stds,
    })
}

/// Moving average with window `window_size` and confidence `confidence`.
///
/// For each column the first `window_size` entries are missing; afterwards
/// `mvave[i]` is the mean of the preceding window and the band is
/// `mean ± z·std` with `z` the normal quantile of the confidence level.
pub fn calc_mvave(
    table: &XvgData,
    window_size: usize,
    confidence: f64,
) -> Result<MovingAverages, AnalysisError> {
    if window_size < 1 {
        return Err(AnalysisError::OutOfRange(
            "window size must be at least 1".into(),
        ));
    }
    if table.row_count > 1 && window_size > table.row_count / 2 {
        return Err(AnalysisError::OutOfRange(format!(
            "window size {} exceeds half of the {} rows",
            window_size, table.row_count
        )));
    }
    if confidence <= 0.0 || confidence >= 1.0 {
        return Err(AnalysisError::OutOfRange(format!(
            "confidence {} is not within (0, 1)",
            confidence
        )));
    }
    let z = normal_ppf(confidence);

    let mut mvave = Vec::with_capacity(table.column_count);
    let mut high = Vec::with_capacity(table.column_count);
    let mut low = Vec::with_capacity(table.column_count);
    for column in &table.columns {
        let mut ave_col = Vec::with_capacity(table.row_count);
        let mut high_col = Vec::with_capacity(table.row_count);
        let mut low_col = Vec::with_capacity(table.row_count);
        for i in 0..table.row_count {
            if i < window_size {
                ave_col.push(None);
                high_col.push(None);
                low_col.push(None);
                continue;
            }
            let window = &column[i - window_size..i];
            let m = mean(window);
            let s = population_std(window);
            ave_col.push(Some(m));
            high_col.push(Some(m + z * s));
            low_col.push(Some(m - z * s));
        }
        mvave.push(ave_col);
        high.push(high_col);
        low.push(low_col);
    }

    Ok(MovingAverages {
        heads: table.heads.clone(),
        mvave,
        high,
        low,
    })
}

impl MovingAverages {
    /// Writes the moving averages as CSV: one header row equal to `heads`,
    /// one data row per original row, missing cells as the literal `nan`.
    pub fn write_csv(&self, writer: &mut impl Write) -> Result<(), AnalysisError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.heads)?;

        let row_count = self.mvave.first().map_or(0, |c| c.len());
        for row in 0..row_count {
            let record: Vec<String> = self
                .mvave
                .iter()
                .map(|column| match column[row] {
                    Some(value) => value.to_string(),
                    None => "nan".to_string(),
                })
                .collect();
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
