use crate::analysis::error::AnalysisError;
use crate::core::formats::xvg::XvgData;

/// Legends an energy table must carry, in this exact order.
pub const ENERGY_LEGENDS: [&str; 4] = ["LJ (SR)", "Disper. corr.", "Coulomb (SR)", "Coul. recip."];

const OUTPUT_LEGENDS: [&str; 9] = [
    "LJ (SR)",
    "Disper. corr.",
    "Coulomb (SR)",
    "Coul. recip.",
    "LJ (all)",
    "Coulomb (all)",
    "Short-Range",
    "Long-Range",
    "Total",
];

fn check_schema(table: &XvgData, role: &str) -> Result<(), AnalysisError> {
    if table.column_count != 5 {
        return Err(AnalysisError::SchemaMismatch(format!(
            "{} table has {} columns, expected 5 (time plus four energy terms)",
            role, table.column_count
        )));
    }
    if table.legends != ENERGY_LEGENDS {
        return Err(AnalysisError::SchemaMismatch(format!(
            "{} table legends are {:?}, expected {:?}",
            role, table.legends, ENERGY_LEGENDS
        )));
    }
    Ok(())
}

/// Decomposes the binding energy of a complex into the standard terms.
///
/// All three inputs must carry the five-column energy schema over an
/// identical time column. Each interaction term is
/// `E_complex − E_receptor − E_ligand`; the remaining columns are the
/// derived sums (LJ all, Coulomb all, short-range, long-range, total).
pub fn decompose(
    complex: &XvgData,
    receptor: &XvgData,
    ligand: &XvgData,
) -> Result<XvgData, AnalysisError> {
    check_schema(complex, "complex")?;
    check_schema(receptor, "receptor")?;
    check_schema(ligand, "ligand")?;

    for (role, table) in [("receptor", receptor), ("ligand", ligand)] {
        if table.columns[0] != complex.columns[0] {
            return Err(AnalysisError::SchemaMismatch(format!(
                "{} time column differs from the complex time column",
                role
            )));
        }
    }

    let rows = complex.row_count;
    let mut diffs: Vec<Vec<f64>> = Vec::with_capacity(4);
    for term in 1..5 {
        let column = (0..rows)
            .map(|r| {
                complex.columns[term][r] - receptor.columns[term][r] - ligand.columns[term][r]
            })
            .collect();
        diffs.push(column);
    }

    let paired = |a: usize, b: usize| -> Vec<f64> {
        (0..rows).map(|r| diffs[a][r] + diffs[b][r]).collect()
    };
    let lj_all = paired(0, 1);
    let coulomb_all = paired(2, 3);
    let short_range = paired(0, 2);
    let long_range = paired(1, 3);
    let total: Vec<f64> = (0..rows).map(|r| lj_all[r] + coulomb_all[r]).collect();

    let mut columns = vec![complex.columns[0].clone()];
    columns.extend(diffs);
    columns.extend([lj_all, coulomb_all, short_range, long_range, total]);

    Ok(XvgData::from_columns(
        "Interaction Energy",
        &complex.x_label,
        "Energy (kJ/mol)",
        OUTPUT_LEGENDS.iter().map(|s| s.to_string()).collect(),
        columns,
    ))
}
