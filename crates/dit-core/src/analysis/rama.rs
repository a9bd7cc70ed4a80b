use crate::analysis::error::AnalysisError;
use crate::core::formats::xvg::XvgData;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

const TABLE_DIM: usize = 361;

/// Residue-context classes of a Ramachandran plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RamaClass {
    General,
    Glycine,
    Proline,
    PreProline,
}

pub const RAMA_CLASSES: [RamaClass; 4] = [
    RamaClass::General,
    RamaClass::Glycine,
    RamaClass::Proline,
    RamaClass::PreProline,
];

impl RamaClass {
    pub fn data_file_name(&self) -> &'static str {
        match self {
            RamaClass::General => "pref_general.data",
            RamaClass::Glycine => "pref_glycine.data",
            RamaClass::Proline => "pref_proline.data",
            RamaClass::PreProline => "pref_preproline.data",
        }
    }

    /// Density below this bound marks a dihedral as an outlier.
    pub fn outlier_bound(&self) -> f64 {
        match self {
            RamaClass::General => 0.0005,
            _ => 0.002,
        }
    }
}

impl fmt::Display for RamaClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RamaClass::General => "General",
            RamaClass::Glycine => "GLY",
            RamaClass::Proline => "PRO",
            RamaClass::PreProline => "Pre-PRO",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RamaPoint {
    pub phi: f64,
    pub psi: f64,
    pub tag: String,
    pub class: RamaClass,
    pub outlier: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RamaAnalysis {
    pub points: Vec<RamaPoint>,
}

impl RamaAnalysis {
    pub fn outlier_count(&self) -> usize {
        self.points.iter().filter(|p| p.outlier).count()
    }

    /// Points of one class, split into (normals, outliers).
    pub fn partition(&self, class: RamaClass) -> (Vec<&RamaPoint>, Vec<&RamaPoint>) {
        self.points
            .iter()
            .filter(|p| p.class == class)
            .partition(|p| !p.outlier)
    }
}

/// A 361x361 reference density grid indexed by `(int(psi)+180, int(phi)+180)`.
struct DensityTable {
    grid: Vec<Vec<f64>>,
}

impl DensityTable {
    fn load(path: &Path) -> Result<Self, AnalysisError> {
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => AnalysisError::InputMissing {
                path: path.to_path_buf(),
            },
            _ => AnalysisError::Io(err),
        })?;
        let reader = BufReader::new(file);

        let mut grid = vec![vec![0.0; TABLE_DIM]; TABLE_DIM];
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let malformed = || AnalysisError::ReferenceTable {
                path: path.to_path_buf(),
                line: line_num + 1,
            };
            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            if tokens.len() != 3 {
                return Err(malformed());
            }
            let phi: f64 = tokens[0].parse().map_err(|_| malformed())?;
            let psi: f64 = tokens[1].parse().map_err(|_| malformed())?;
            let density: f64 = tokens[2].parse().map_err(|_| malformed())?;

            // The source grid is 2 degrees wide; duplicate each sample into
            // the four adjacent cells to close the gaps.
            let row = (psi as i64 + 180) as usize;
            let col = (phi as i64 + 180) as usize;
            for r in [row.checked_sub(1), Some(row)].into_iter().flatten() {
                for c in [col.checked_sub(1), Some(col)].into_iter().flatten() {
                    if r < TABLE_DIM && c < TABLE_DIM {
                        grid[r][c] = density;
                    }
                }
            }
        }
        Ok(Self { grid })
    }

    fn density_at(&self, phi: f64, psi: f64) -> Option<f64> {
        if !(-180.0..=180.0).contains(&phi) || !(-180.0..=180.0).contains(&psi) {
            return None;
        }
        let row = (psi as i64 + 180) as usize;
        let col = (phi as i64 + 180) as usize;
        Some(self.grid[row][col])
    }
}

fn classify_row(tag: &str, next_tag: Option<&str>) -> RamaClass {
    if next_tag.is_some_and(|next| next.contains("PRO")) {
        RamaClass::PreProline
    } else if tag.contains("PRO") {
        RamaClass::Proline
    } else if tag.contains("GLY") {
        RamaClass::Glycine
    } else {
        RamaClass::General
    }
}

/// Classifies every dihedral of a tagged φ/ψ table against the reference
/// density tables found in `data_dir`.
///
/// The table's first two columns are φ and ψ in degrees; the trailing tag
/// column names the residue. A residue directly preceding a proline is
/// classified `Pre-PRO` regardless of its own type.
pub fn classify(table: &XvgData, data_dir: &Path) -> Result<RamaAnalysis, AnalysisError> {
    if table.column_count < 2 {
        return Err(AnalysisError::SchemaMismatch(format!(
            "dihedral table has {} numeric columns, expected phi and psi",
            table.column_count
        )));
    }
    if !table.has_row_tags() {
        return Err(AnalysisError::SchemaMismatch(
            "dihedral table carries no residue tag column".into(),
        ));
    }

    let load = |class: RamaClass| DensityTable::load(&data_dir.join(class.data_file_name()));
    let general = load(RamaClass::General)?;
    let glycine = load(RamaClass::Glycine)?;
    let proline = load(RamaClass::Proline)?;
    let preproline = load(RamaClass::PreProline)?;
    let table_of = |class: RamaClass| match class {
        RamaClass::General => &general,
        RamaClass::Glycine => &glycine,
        RamaClass::Proline => &proline,
        RamaClass::PreProline => &preproline,
    };

    let mut points = Vec::with_capacity(table.row_count);
    for i in 0..table.row_count {
        let phi = table.columns[0][i];
        let psi = table.columns[1][i];
        let tag = table.row_tags[i].clone();
        let next_tag = table.row_tags.get(i + 1).map(String::as_str);
        let class = classify_row(&tag, next_tag);

        let density = table_of(class).density_at(phi, psi).ok_or_else(|| {
            AnalysisError::OutOfRange(format!(
                "dihedral ({}, {}) of residue {} is outside [-180, 180]",
                phi, psi, tag
            ))
        })?;
        points.push(RamaPoint {
            phi,
            psi,
            tag,
            class,
            outlier: density < class.outlier_bound(),
        });
    }

    Ok(RamaAnalysis { points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_data_dir(general_rows: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("pref_general.data"),
            format!("# general reference\n{}", general_rows),
        )
        .unwrap();
        for name in [
            "pref_glycine.data",
            "pref_proline.data",
            "pref_preproline.data",
        ] {
            fs::write(dir.path().join(name), "# empty reference\n").unwrap();
        }
        dir
    }

    fn tagged_table(rows: Vec<(f64, f64, &str)>) -> XvgData {
        let mut phi = Vec::new();
        let mut psi = Vec::new();
        let mut tags = Vec::new();
        for (p, s, tag) in rows {
            phi.push(p);
            psi.push(s);
            tags.push(tag.to_string());
        }
        let mut table =
            XvgData::from_columns("Ramachandran", "Phi", "Psi", Vec::new(), vec![phi, psi]);
        table.row_tags = tags;
        table
    }

    #[test]
    fn residue_context_drives_the_class() {
        let dir = write_data_dir("");
        let table = tagged_table(vec![
            (-60.0, -45.0, "ALA-1"),
            (-60.0, -45.0, "PRO-2"),
            (-60.0, -45.0, "GLY-3"),
            (-60.0, -45.0, "VAL-4"),
        ]);
        let analysis = classify(&table, dir.path()).unwrap();
        let classes: Vec<RamaClass> = analysis.points.iter().map(|p| p.class).collect();
        assert_eq!(
            classes,
            vec![
                RamaClass::PreProline,
                RamaClass::Proline,
                RamaClass::Glycine,
                RamaClass::General,
            ]
        );
    }

    #[test]
    fn density_fill_covers_adjacent_cells() {
        let dir = write_data_dir("-59 -45 0.5\n");
        let table = tagged_table(vec![
            (-60.5, -45.2, "ALA-1"),
            (-10.0, 100.0, "ALA-2"),
        ]);
        let analysis = classify(&table, dir.path()).unwrap();
        // (-60.5, -45.2) lands one cell left and below the sample; the
        // duplicate fill makes it a normal point.
        assert!(!analysis.points[0].outlier);
        assert!(analysis.points[1].outlier);
        assert_eq!(analysis.outlier_count(), 1);
    }

    #[test]
    fn partition_splits_normals_from_outliers() {
        let dir = write_data_dir("-59 -45 0.5\n");
        let table = tagged_table(vec![
            (-60.5, -45.2, "ALA-1"),
            (-10.0, 100.0, "ALA-2"),
        ]);
        let analysis = classify(&table, dir.path()).unwrap();
        let (normals, outliers) = analysis.partition(RamaClass::General);
        assert_eq!(normals.len(), 1);
        assert_eq!(outliers.len(), 1);
    }

    #[test]
    fn glycine_bound_is_stricter_than_general() {
        assert_eq!(RamaClass::General.outlier_bound(), 0.0005);
        assert_eq!(RamaClass::Glycine.outlier_bound(), 0.002);
    }

    #[test]
    fn out_of_range_dihedral_is_fatal() {
        let dir = write_data_dir("");
        let table = tagged_table(vec![(-200.0, 0.0, "ALA-1")]);
        assert!(matches!(
            classify(&table, dir.path()),
            Err(AnalysisError::OutOfRange(_))
        ));
    }

    #[test]
    fn untagged_table_is_rejected() {
        let dir = write_data_dir("");
        let table =
            XvgData::from_columns("t", "Phi", "Psi", Vec::new(), vec![vec![0.0], vec![0.0]]);
        assert!(matches!(
            classify(&table, dir.path()),
            Err(AnalysisError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn missing_reference_file_is_reported_with_its_path() {
        let dir = tempdir().unwrap();
        let table = tagged_table(vec![(0.0, 0.0, "ALA-1")]);
        let err = classify(&table, dir.path()).unwrap_err();
        match err {
            AnalysisError::InputMissing { path } => {
                assert!(path.ends_with("pref_general.data"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_reference_row_is_fatal() {
        let dir = write_data_dir("-59 -45\n");
        let table = tagged_table(vec![(0.0, 0.0, "ALA-1")]);
        assert!(matches!(
            classify(&table, dir.path()),
            Err(AnalysisError::ReferenceTable { line: 2, .. })
        ));
    }
}
