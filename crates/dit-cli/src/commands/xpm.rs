use crate::cli::{
    CutOpts, HeatmapOpts, XpmArgs, XpmCommands, XpmExportArgs, XpmPairArgs, XpmShowArgs,
};
use crate::commands::{derive_output, dispatch_plot, read_input, write_output};
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use dit_core::analysis::matrix::{self, CutBounds};
use dit_core::core::formats::xpm::{XpmFrameSeries, XpmMatrix};
use dit_core::core::utils::outfile;
use dit_core::render::builders::{self, HeatmapOptions};
use dit_core::render::{PlotMode, RenderError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

enum ExportKind {
    Csv,
    Dat,
}

enum PairKind {
    Diff,
    Merge,
}

pub fn run(args: XpmArgs, config: &CliConfig) -> Result<()> {
    match args.command {
        XpmCommands::Show(args) => show(args, config),
        XpmCommands::ToCsv(args) => export(args, ExportKind::Csv),
        XpmCommands::ToDat(args) => export(args, ExportKind::Dat),
        XpmCommands::Diff(args) => pair(args, config, PairKind::Diff),
        XpmCommands::Merge(args) => pair(args, config, PairKind::Merge),
    }
}

/// Reads one frame of a matrix file and applies the cut bounds, if any.
fn load_frame(path: &Path, frame: usize, cut: &CutOpts) -> Result<XpmMatrix> {
    let series: XpmFrameSeries = read_input(path)?;
    let count = series.frames.len();
    let matrix = series.frames.into_iter().nth(frame).ok_or_else(|| {
        CliError::Argument(format!(
            "frame {} is not in a file of {} frames",
            frame, count
        ))
    })?;
    apply_cut(matrix, cut)
}

fn apply_cut(matrix: XpmMatrix, cut: &CutOpts) -> Result<XpmMatrix> {
    if cut.xmin.is_none() && cut.xmax.is_none() && cut.ymin.is_none() && cut.ymax.is_none() {
        return Ok(matrix);
    }
    let bounds = CutBounds {
        xmin: cut.xmin,
        xmax: cut.xmax,
        ymin: cut.ymin,
        ymax: cut.ymax,
    };
    Ok(matrix::cut(&matrix, bounds)?)
}

/// The plot mode of a matrix is not shared with the curve commands, so only
/// the flag itself and the built-in default are consulted.
fn heatmap_options(opts: &HeatmapOpts, config: &CliConfig) -> Result<HeatmapOptions> {
    let mode_text = opts.mode.clone().unwrap_or_else(|| "imshow".to_string());
    let mode: PlotMode = mode_text.parse().map_err(RenderError::from)?;

    Ok(HeatmapOptions {
        mode,
        colormap: opts.colormap.clone().or_else(|| config.colormap.clone()),
        interpolation: opts.interpolation.clone(),
        interpolation_fold: opts.interpolation_fold,
        z_range: opts.zmin.zip(opts.zmax),
        z_precision: opts.z_precision,
        alpha: opts.alpha.or(config.alpha),
        colorbar_location: opts
            .colorbar_location
            .clone()
            .or_else(|| config.colorbar_location.clone()),
    })
}

fn show(args: XpmShowArgs, config: &CliConfig) -> Result<()> {
    let matrix = load_frame(&args.input, args.frame, &args.cut)?;
    let options = heatmap_options(&args.heatmap, config)?;
    let request = builders::matrix_heatmap(&matrix, &options)?;
    dispatch_plot(&request, args.dump.as_deref())
}

fn export(args: XpmExportArgs, kind: ExportKind) -> Result<()> {
    let matrix = load_frame(&args.input, args.frame, &args.cut)?;

    let extension = match kind {
        ExportKind::Csv => ".csv",
        ExportKind::Dat => ".dat",
    };
    let output = args
        .output
        .unwrap_or_else(|| derive_output(&args.input, extension));
    let target = outfile::deconflict(&output);
    let mut writer = BufWriter::new(File::create(&target)?);
    match kind {
        ExportKind::Csv => matrix::write_csv(&matrix, &mut writer)?,
        ExportKind::Dat => matrix::write_dat(&matrix, &mut writer)?,
    }
    writer.flush()?;
    info!("Matrix exported to {:?}", &target);
    Ok(())
}

fn pair(args: XpmPairArgs, config: &CliConfig, kind: PairKind) -> Result<()> {
    let [first, second] = args.input.as_slice() else {
        return Err(CliError::Argument(
            "exactly two input files are required".to_string(),
        ));
    };
    let a: XpmMatrix = read_input(first)?;
    let b: XpmMatrix = read_input(second)?;

    let colormap = args
        .colormap
        .clone()
        .or_else(|| config.colormap.clone())
        .unwrap_or_else(|| "bwr".to_string());
    let (result, default_name) = match kind {
        PairKind::Diff => (matrix::diff(&a, &b, &colormap, args.precision)?, "diff.xpm"),
        PairKind::Merge => (
            matrix::merge(&a, &b, &colormap, args.precision)?,
            "merge.xpm",
        ),
    };

    let output = args.output.unwrap_or_else(|| PathBuf::from(default_name));
    write_output(&result, &output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const CONTINUOUS: &str = r#"/* XPM */
static char * gromacs_xpm[] = {
"3 2 3 1",
"A c #0000FF " /* "0" */,
"B c #FFFFFF " /* "0.5" */,
"C c #FF0000 " /* "1" */,
/* title:   "Demo Landscape" */
/* legend:  "G" */
/* x-label: "Time (ps)" */
/* y-label: "Residue" */
/* type:    "Continuous" */
/* x-axis:  0 1 2 */
/* y-axis:  10 20 */
"ABC",
"CBA"
};
"#;

    fn cut_opts() -> CutOpts {
        CutOpts {
            xmin: None,
            xmax: None,
            ymin: None,
            ymax: None,
        }
    }

    #[test]
    fn frames_beyond_the_file_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("demo.xpm");
        fs::write(&path, CONTINUOUS).unwrap();

        let result = load_frame(&path, 1, &cut_opts());
        assert!(matches!(result, Err(CliError::Argument(_))));
    }

    #[test]
    fn cut_bounds_trim_the_loaded_frame() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("demo.xpm");
        fs::write(&path, CONTINUOUS).unwrap();

        let cut = CutOpts {
            xmin: Some(1),
            xmax: Some(3),
            ymin: None,
            ymax: Some(1),
        };
        let matrix = load_frame(&path, 0, &cut).unwrap();
        assert_eq!((matrix.width, matrix.height), (2, 1));
        assert_eq!(matrix.value_matrix, vec![vec![0.5, 1.0]]);
        assert_eq!(matrix.x_axis, vec![1.0, 2.0]);
    }

    #[test]
    fn export_derives_the_output_name_and_writes_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("demo.xpm");
        fs::write(&path, CONTINUOUS).unwrap();

        let args = XpmExportArgs {
            input: path,
            frame: 0,
            cut: cut_opts(),
            output: None,
        };
        export(args, ExportKind::Csv).unwrap();

        let content = fs::read_to_string(dir.path().join("demo.csv")).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Time (ps),Residue,G"));
        assert_eq!(lines.next(), Some("0,20,0"));
    }

    #[test]
    fn diff_of_a_matrix_with_itself_is_flat_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("demo.xpm");
        fs::write(&path, CONTINUOUS).unwrap();
        let output = dir.path().join("diff.xpm");

        let args = XpmPairArgs {
            input: vec![path.clone(), path],
            colormap: None,
            precision: 3,
            output: Some(output.clone()),
        };
        pair(args, &CliConfig::default(), PairKind::Diff).unwrap();

        let written: XpmMatrix = read_input(&output).unwrap();
        assert_eq!((written.width, written.height), (3, 2));
        assert!(
            written
                .value_matrix
                .iter()
                .all(|row| row.iter().all(|&v| v == 0.0))
        );
    }

    #[test]
    fn unknown_heatmap_mode_is_rejected() {
        let opts = HeatmapOpts {
            mode: Some("spiral".to_string()),
            colormap: None,
            interpolation: None,
            interpolation_fold: None,
            zmin: None,
            zmax: None,
            z_precision: None,
            alpha: None,
            colorbar_location: None,
        };
        assert!(matches!(
            heatmap_options(&opts, &CliConfig::default()),
            Err(CliError::Render(_))
        ));
    }
}
