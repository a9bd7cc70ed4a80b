use crate::analysis::error::AnalysisError;
use crate::core::formats::xvg::XvgData;

/// Assembles one table out of columns picked from several.
///
/// Column 0 of the first table becomes the x column; `selections[i]` lists
/// the columns to carry over from `tables[i]`, in order. All tables must
/// agree on row count.
pub fn combine(tables: &[XvgData], selections: &[Vec<usize>]) -> Result<XvgData, AnalysisError> {
    let first = tables.first().ok_or_else(|| {
        AnalysisError::SchemaMismatch("no tables given to combine".into())
    })?;
    if tables.len() != selections.len() {
        return Err(AnalysisError::SchemaMismatch(format!(
            "{} column selections given for {} tables",
            selections.len(),
            tables.len()
        )));
    }
    for table in tables {
        if table.row_count != first.row_count {
            return Err(AnalysisError::SchemaMismatch(format!(
                "table '{}' has {} rows where '{}' has {}",
                table.title, table.row_count, first.title, first.row_count
            )));
        }
    }

    let mut columns = vec![first.columns[0].clone()];
    let mut heads = vec![first.heads[0].clone()];
    for (table, selection) in tables.iter().zip(selections) {
        for &index in selection {
            if index >= table.column_count {
                return Err(AnalysisError::OutOfRange(format!(
                    "column {} is not in table '{}' with {} columns",
                    index, table.title, table.column_count
                )));
            }
            columns.push(table.columns[index].clone());
            heads.push(table.heads[index].clone());
        }
    }

    Ok(XvgData {
        title: first.title.clone(),
        x_label: first.x_label.clone(),
        y_label: first.y_label.clone(),
        legends: heads[1..].to_vec(),
        column_count: columns.len(),
        row_count: first.row_count,
        columns,
        heads,
        row_tags: Vec::new(),
    })
}
