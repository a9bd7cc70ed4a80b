use crate::cli::HbondArgs;
use crate::commands::read_input;
use crate::error::{CliError, Result};
use crate::utils::selection::parse_selection;
use dit_core::analysis::hbond::{self, HbondAnalysis, SetOperation};
use dit_core::analysis::AnalysisError;
use dit_core::core::formats::gro::GroData;
use dit_core::core::formats::xpm::XpmMatrix;
use dit_core::core::formats::xvg::XvgData;
use dit_core::core::utils::outfile;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Per-bond mean and standard deviation, `None` for bonds that are never
/// present.
type BondStats = Vec<Option<(f64, f64)>>;

pub fn run(args: HbondArgs) -> Result<()> {
    let gro: GroData = read_input(&args.gro)?;
    let map: XpmMatrix = read_input(&args.xpm)?;
    let triples = read_triples(&args.ndx)?;

    let labels = hbond::compose_labels(&triples, gro.first_frame(), &args.name_template)?;
    let mut analysis = HbondAnalysis::from_parts(labels, &map)?;
    info!(
        "{} hydrogen bonds tracked over {} frames.",
        analysis.labels.len(),
        analysis.times.len()
    );

    // Companion tables follow the map rows, so their statistics are taken
    // before any derived set-operation row is appended.
    let dist_stats = companion_stats(&analysis, args.dist.as_deref())?;
    let angle_stats = companion_stats(&analysis, args.angle.as_deref())?;

    if let Some(text) = &args.and {
        analysis.apply_set_operation(SetOperation::And, &parse_selection(text)?)?;
    } else if let Some(text) = &args.or {
        analysis.apply_set_operation(SetOperation::Or, &parse_selection(text)?)?;
    }

    let occupancies = analysis.occupancies();
    match &args.output {
        Some(path) => {
            let target = outfile::deconflict(path);
            let mut writer = BufWriter::new(File::create(&target)?);
            write_table(
                &analysis,
                &occupancies,
                dist_stats.as_ref(),
                angle_stats.as_ref(),
                &mut writer,
            )?;
            writer.flush()?;
            info!("Occupancy table written to {:?}", &target);
        }
        None => print_table(
            &analysis,
            &occupancies,
            dist_stats.as_ref(),
            angle_stats.as_ref(),
        ),
    }
    Ok(())
}

/// Reads the donor/hydrogen/acceptor triples of the trailing hbonds group,
/// reporting a missing file as such rather than as a bare I/O failure.
fn read_triples(path: &Path) -> Result<Vec<hbond::HbondTriple>> {
    if !path.exists() {
        return Err(AnalysisError::InputMissing {
            path: path.to_path_buf(),
        }
        .into());
    }
    let reader = BufReader::new(File::open(path)?);
    hbond::read_hbond_triples(reader).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

fn companion_stats(analysis: &HbondAnalysis, path: Option<&Path>) -> Result<Option<BondStats>> {
    match path {
        Some(path) => {
            let table: XvgData = read_input(path)?;
            Ok(Some(analysis.stats_over_present(&table)?))
        }
        None => Ok(None),
    }
}

/// Writes the occupancy table as CSV, missing statistics as the literal
/// `nan` cell the moving-average export also uses.
fn write_table(
    analysis: &HbondAnalysis,
    occupancies: &[f64],
    dist_stats: Option<&BondStats>,
    angle_stats: Option<&BondStats>,
    writer: &mut impl Write,
) -> std::result::Result<(), AnalysisError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = vec!["id", "label", "occupancy"];
    if dist_stats.is_some() {
        header.extend(["distance_mean", "distance_std"]);
    }
    if angle_stats.is_some() {
        header.extend(["angle_mean", "angle_std"]);
    }
    csv_writer.write_record(&header)?;

    for (id, label) in analysis.labels.iter().enumerate() {
        let mut record = vec![
            id.to_string(),
            label.clone(),
            format!("{:.6}", occupancies[id]),
        ];
        for stats in [dist_stats, angle_stats].into_iter().flatten() {
            match stats.get(id) {
                Some(Some((mean, std))) => {
                    record.push(format!("{:.6}", mean));
                    record.push(format!("{:.6}", std));
                }
                _ => {
                    record.push("nan".to_string());
                    record.push("nan".to_string());
                }
            }
        }
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn print_table(
    analysis: &HbondAnalysis,
    occupancies: &[f64],
    dist_stats: Option<&BondStats>,
    angle_stats: Option<&BondStats>,
) {
    let width = analysis
        .labels
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max("hydrogen bond".len());

    let mut header = format!("{:>4}  {:<width$}  {:>10}", "id", "hydrogen bond", "occupancy");
    if dist_stats.is_some() {
        header.push_str(&format!("  {:>17}", "distance (nm)"));
    }
    if angle_stats.is_some() {
        header.push_str(&format!("  {:>17}", "angle (deg)"));
    }
    println!("{}", header);

    for (id, label) in analysis.labels.iter().enumerate() {
        let mut line = format!(
            "{:>4}  {:<width$}  {:>9.2}%",
            id,
            label,
            occupancies[id] * 100.0
        );
        for stats in [dist_stats, angle_stats].into_iter().flatten() {
            line.push_str(&format!("  {:>17}", stat_cell(stats, id)));
        }
        println!("{}", line);
    }
}

fn stat_cell(stats: &[Option<(f64, f64)>], id: usize) -> String {
    match stats.get(id) {
        Some(Some((mean, std))) => format!("{:.3} ± {:.3}", mean, std),
        _ => "-".to_string(),
    }
}
