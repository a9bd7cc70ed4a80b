use clap::{Args, Parser, Subcommand};
use dit_core::analysis::hbond::DEFAULT_NAME_TEMPLATE;
use dit_core::core::formats::ndx::DEFAULT_ROW_WIDTH;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "DIT Project Developers",
    version,
    about = "DIT - Dynamics Insight Toolkit, a command-line companion for analyzing and visualizing the textual outputs of molecular dynamics simulations.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Read defaults from this configuration file instead of the standard location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plot, summarize, and recombine XVG tables.
    Xvg(XvgArgs),
    /// Plot, cut, export, and stitch XPM matrices.
    Xpm(XpmArgs),
    /// Inspect and edit NDX index groups.
    Ndx(NdxArgs),
    /// Turn an ASCII covariance dump into a cross-correlation XPM matrix.
    Dccm(DccmArgs),
    /// Summarize a hydrogen bond existence map with named bonds.
    Hbond(HbondArgs),
    /// Manage the local reference data directory.
    Data(DataArgs),
}

/// Arguments for the `xvg` subcommand.
#[derive(Args, Debug)]
pub struct XvgArgs {
    #[command(subcommand)]
    pub command: XvgCommands,
}

/// Available commands for XVG tables.
#[derive(Subcommand, Debug)]
pub enum XvgCommands {
    /// Draw the columns of one table as curves.
    Show(XvgShowArgs),
    /// Draw selected columns of several tables on one canvas.
    Compare(XvgCompareArgs),
    /// Print per-column averages over a row window.
    Ave(XvgAveArgs),
    /// Write per-column moving averages with a confidence band to CSV.
    Mvave(XvgMvaveArgs),
    /// Merge selected columns of several tables into one table.
    Combine(XvgCombineArgs),
    /// Derive an interaction energy table from complex, receptor, and ligand energies.
    Energy(XvgEnergyArgs),
    /// Classify backbone dihedrals against reference densities and plot them.
    Rama(XvgRamaArgs),
}

/// Row-window and styling options shared by the curve-drawing commands.
#[derive(Args, Debug, Clone)]
pub struct CurveOpts {
    /// Plot mode (line, stack, scatter, bar, box, violin).
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<String>,

    /// First row to draw (0-based).
    #[arg(short, long, value_name = "INT", default_value_t = 0)]
    pub begin: usize,

    /// Row to stop drawing at (exclusive); defaults to the last row.
    #[arg(short, long, value_name = "INT")]
    pub end: Option<usize>,

    /// Lower x-axis bound of the canvas.
    #[arg(long, value_name = "FLOAT", requires = "xmax")]
    pub xmin: Option<f64>,

    /// Upper x-axis bound of the canvas.
    #[arg(long, value_name = "FLOAT", requires = "xmin")]
    pub xmax: Option<f64>,

    /// Lower y-axis bound of the canvas.
    #[arg(long, value_name = "FLOAT", requires = "ymax")]
    pub ymin: Option<f64>,

    /// Upper y-axis bound of the canvas.
    #[arg(long, value_name = "FLOAT", requires = "ymin")]
    pub ymax: Option<f64>,

    /// Opacity of the drawn series.
    #[arg(long, value_name = "FLOAT")]
    pub alpha: Option<f64>,

    /// Legend placement hint passed to the renderer.
    #[arg(long, value_name = "WHERE")]
    pub legend_location: Option<String>,
}

/// Arguments for `xvg show`.
#[derive(Args, Debug)]
pub struct XvgShowArgs {
    /// Path to the input XVG table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Y columns to draw, e.g. '1,3-5'; defaults to every column behind x.
    #[arg(short, long, value_name = "SELECTION")]
    pub columns: Option<String>,

    #[command(flatten)]
    pub curve: CurveOpts,

    /// Write the plot request as TOML to this path instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub dump: Option<PathBuf>,
}

/// Arguments for `xvg compare`.
#[derive(Args, Debug)]
pub struct XvgCompareArgs {
    /// Paths of the input XVG tables.
    #[arg(short, long, required = true, num_args(1..), value_name = "PATH")]
    pub input: Vec<PathBuf>,

    /// One y-column selection per input table, e.g. '1' '2,3'.
    #[arg(short, long, required = true, num_args(1..), value_name = "SELECTION")]
    pub columns: Vec<String>,

    #[command(flatten)]
    pub curve: CurveOpts,

    /// Write the plot request as TOML to this path instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub dump: Option<PathBuf>,
}

/// Arguments for `xvg ave`.
#[derive(Args, Debug)]
pub struct XvgAveArgs {
    /// Path to the input XVG table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// First row of the averaging window (0-based).
    #[arg(short, long, value_name = "INT", default_value_t = 0)]
    pub begin: usize,

    /// Row to stop averaging at (exclusive); defaults to the last row.
    #[arg(short, long, value_name = "INT")]
    pub end: Option<usize>,
}

/// Arguments for `xvg mvave`.
#[derive(Args, Debug)]
pub struct XvgMvaveArgs {
    /// Path to the input XVG table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the output CSV file; defaults to the input name with a new extension.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Number of preceding rows each moving average is taken over.
    #[arg(short, long, value_name = "INT", default_value_t = 50)]
    pub window_size: usize,

    /// Confidence level of the band, strictly between 0 and 1.
    #[arg(long, value_name = "FLOAT", default_value_t = 0.90)]
    pub confidence: f64,
}

/// Arguments for `xvg combine`.
#[derive(Args, Debug)]
pub struct XvgCombineArgs {
    /// Paths of the input XVG tables.
    #[arg(short, long, required = true, num_args(1..), value_name = "PATH")]
    pub input: Vec<PathBuf>,

    /// One y-column selection per input table, e.g. '1' '2,3'.
    #[arg(short, long, required = true, num_args(1..), value_name = "SELECTION")]
    pub columns: Vec<String>,

    /// Path for the output XVG file.
    #[arg(short, long, value_name = "PATH", default_value = "combine.xvg")]
    pub output: PathBuf,
}

/// Arguments for `xvg energy`.
#[derive(Args, Debug)]
pub struct XvgEnergyArgs {
    /// Path to the complex energy table.
    #[arg(long, required = true, value_name = "PATH")]
    pub complex: PathBuf,

    /// Path to the receptor energy table.
    #[arg(long, required = true, value_name = "PATH")]
    pub receptor: PathBuf,

    /// Path to the ligand energy table.
    #[arg(long, required = true, value_name = "PATH")]
    pub ligand: PathBuf,

    /// Path for the output XVG file.
    #[arg(short, long, value_name = "PATH", default_value = "interaction_energy.xvg")]
    pub output: PathBuf,
}

/// Arguments for `xvg rama`.
#[derive(Args, Debug)]
pub struct XvgRamaArgs {
    /// Path to the input table of tagged phi/psi rows.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory holding the reference density tables.
    #[arg(long, value_name = "DIR")]
    pub refdata: Option<PathBuf>,

    /// Write the plot request as TOML to this path instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub dump: Option<PathBuf>,
}

/// Arguments for the `xpm` subcommand.
#[derive(Args, Debug)]
pub struct XpmArgs {
    #[command(subcommand)]
    pub command: XpmCommands,
}

/// Available commands for XPM matrices.
#[derive(Subcommand, Debug)]
pub enum XpmCommands {
    /// Draw one frame of a matrix as a heatmap-family plot.
    Show(XpmShowArgs),
    /// Export one frame as x,y,z CSV rows.
    ToCsv(XpmExportArgs),
    /// Export one frame as a whitespace-separated DAT grid.
    ToDat(XpmExportArgs),
    /// Write the pixel-wise difference of two continuous matrices.
    Diff(XpmPairArgs),
    /// Stitch two matrices together along the anti-diagonal.
    Merge(XpmPairArgs),
}

/// Index bounds trimming a matrix before it is drawn or exported.
#[derive(Args, Debug, Clone, Copy)]
pub struct CutOpts {
    /// First x index to keep.
    #[arg(long, value_name = "INT")]
    pub xmin: Option<usize>,

    /// One past the last x index to keep.
    #[arg(long, value_name = "INT")]
    pub xmax: Option<usize>,

    /// First y index to keep (row 0 is the top of the image).
    #[arg(long, value_name = "INT")]
    pub ymin: Option<usize>,

    /// One past the last y index to keep.
    #[arg(long, value_name = "INT")]
    pub ymax: Option<usize>,
}

/// Styling options of the heatmap-family plots.
#[derive(Args, Debug, Clone)]
pub struct HeatmapOpts {
    /// Plot mode (imshow, pcolormesh, 3d, contour).
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Color scale applied by the renderer.
    #[arg(long, value_name = "NAME")]
    pub colormap: Option<String>,

    /// Interpolation applied to a continuous matrix.
    #[arg(long, value_name = "METHOD")]
    pub interpolation: Option<String>,

    /// Grid refinement factor of the interpolation.
    #[arg(long, value_name = "INT")]
    pub interpolation_fold: Option<u32>,

    /// Lower bound of the color scale.
    #[arg(long, value_name = "FLOAT", requires = "zmax")]
    pub zmin: Option<f64>,

    /// Upper bound of the color scale.
    #[arg(long, value_name = "FLOAT", requires = "zmin")]
    pub zmax: Option<f64>,

    /// Decimal places of the colorbar tick labels.
    #[arg(long, value_name = "INT")]
    pub z_precision: Option<u32>,

    /// Opacity of the drawn matrix.
    #[arg(long, value_name = "FLOAT")]
    pub alpha: Option<f64>,

    /// Colorbar placement hint passed to the renderer.
    #[arg(long, value_name = "WHERE")]
    pub colorbar_location: Option<String>,
}

/// Arguments for `xpm show`.
#[derive(Args, Debug)]
pub struct XpmShowArgs {
    /// Path to the input XPM matrix.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Frame to draw when the file concatenates several matrices.
    #[arg(long, value_name = "INT", default_value_t = 0)]
    pub frame: usize,

    #[command(flatten)]
    pub cut: CutOpts,

    #[command(flatten)]
    pub heatmap: HeatmapOpts,

    /// Write the plot request as TOML to this path instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub dump: Option<PathBuf>,
}

/// Arguments for `xpm to-csv` and `xpm to-dat`.
#[derive(Args, Debug)]
pub struct XpmExportArgs {
    /// Path to the input XPM matrix.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Frame to export when the file concatenates several matrices.
    #[arg(long, value_name = "INT", default_value_t = 0)]
    pub frame: usize,

    #[command(flatten)]
    pub cut: CutOpts,

    /// Path for the output file; defaults to the input name with a new extension.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for `xpm diff` and `xpm merge`.
#[derive(Args, Debug)]
pub struct XpmPairArgs {
    /// Paths of exactly two input XPM matrices.
    #[arg(short, long, required = true, num_args(2), value_name = "PATH")]
    pub input: Vec<PathBuf>,

    /// Color scale of the regenerated palette.
    #[arg(long, value_name = "NAME")]
    pub colormap: Option<String>,

    /// Decimal places of the regenerated palette labels.
    #[arg(long, value_name = "INT", default_value_t = 3)]
    pub precision: u32,

    /// Path for the output XPM file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `ndx` subcommand.
#[derive(Args, Debug)]
pub struct NdxArgs {
    #[command(subcommand)]
    pub command: NdxCommands,
}

/// Available commands for NDX index groups.
#[derive(Subcommand, Debug)]
pub enum NdxCommands {
    /// List the group names with their sizes.
    Show(NdxShowArgs),
    /// Reflow the groups to a fixed number of indices per row.
    Format(NdxFormatArgs),
    /// Remove the named groups.
    Rm(NdxEditArgs),
    /// Keep only the named groups.
    Keep(NdxEditArgs),
}

/// Arguments for `ndx show`.
#[derive(Args, Debug)]
pub struct NdxShowArgs {
    /// Path to the input NDX file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,
}

/// Arguments for `ndx format`.
#[derive(Args, Debug)]
pub struct NdxFormatArgs {
    /// Path to the input NDX file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Number of indices per row.
    #[arg(short = 'w', long, value_name = "INT", default_value_t = DEFAULT_ROW_WIDTH)]
    pub row_width: usize,

    /// Path for the output NDX file; prints to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for `ndx rm` and `ndx keep`.
#[derive(Args, Debug)]
pub struct NdxEditArgs {
    /// Path to the input NDX file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Names of the groups to act on.
    #[arg(required = true, num_args(1..), value_name = "GROUP")]
    pub groups: Vec<String>,

    /// Path for the output NDX file.
    #[arg(short, long, value_name = "PATH", default_value = "output.ndx")]
    pub output: PathBuf,
}

/// Arguments for the `dccm` command.
#[derive(Args, Debug)]
pub struct DccmArgs {
    /// Path to the ASCII covariance dump (one Cartesian triple per residue pair).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Color scale of the generated palette.
    #[arg(long, value_name = "NAME")]
    pub colormap: Option<String>,

    /// Decimal places of the generated palette labels.
    #[arg(long, value_name = "INT", default_value_t = 3)]
    pub precision: u32,

    /// Path for the output XPM file.
    #[arg(short, long, value_name = "PATH", default_value = "dccm.xpm")]
    pub output: PathBuf,
}

/// Arguments for the `hbond` command.
#[derive(Args, Debug)]
pub struct HbondArgs {
    /// Path to the coordinate file naming the atoms.
    #[arg(short = 's', long, required = true, value_name = "PATH")]
    pub gro: PathBuf,

    /// Path to the index file whose trailing hbonds group lists the triples.
    #[arg(short = 'n', long, required = true, value_name = "PATH")]
    pub ndx: PathBuf,

    /// Path to the hydrogen bond existence map.
    #[arg(short = 'm', long, required = true, value_name = "PATH")]
    pub xpm: PathBuf,

    /// Naming template for the bonds; 'number' and 'id' are shorthands.
    #[arg(long, value_name = "TEMPLATE", default_value = DEFAULT_NAME_TEMPLATE)]
    pub name_template: String,

    /// Also report the intersection of these bonds, e.g. '0,2-4'.
    #[arg(long, value_name = "SELECTION", conflicts_with = "or")]
    pub and: Option<String>,

    /// Also report the union of these bonds, e.g. '0,2-4'.
    #[arg(long, value_name = "SELECTION")]
    pub or: Option<String>,

    /// Distance table whose y columns follow the map rows.
    #[arg(long, value_name = "PATH")]
    pub dist: Option<PathBuf>,

    /// Angle table whose y columns follow the map rows.
    #[arg(long, value_name = "PATH")]
    pub angle: Option<PathBuf>,

    /// Write the occupancy table as CSV to this path instead of printing it.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `data` subcommand.
#[derive(Args, Debug)]
pub struct DataArgs {
    #[command(subcommand)]
    pub command: DataCommands,
}

/// Available commands for data management.
#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Show the absolute path to the local data directory.
    Path,
    /// Set a custom absolute path for the local data directory.
    SetPath {
        /// The new path to use for storing data files.
        #[arg(required = true)]
        path: PathBuf,
    },
    /// Reset the data path to its default, OS-specific location.
    ResetPath,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn global_flags_are_accepted_after_the_subcommand() {
        let cli = Cli::parse_from(["dit", "xvg", "show", "-i", "rmsd.xvg", "-vv"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        let Commands::Xvg(args) = cli.command else {
            panic!("Expected 'xvg' subcommand");
        };
        let XvgCommands::Show(show) = args.command else {
            panic!("Expected 'xvg show' subcommand");
        };
        assert_eq!(show.input, PathBuf::from("rmsd.xvg"));
        assert!(show.columns.is_none());
        assert_eq!(show.curve.begin, 0);
        assert!(show.dump.is_none());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["dit", "xvg", "ave", "-i", "a.xvg", "-q", "-v"]);
        assert!(result.is_err());
    }

    #[test]
    fn compare_collects_inputs_and_selections() {
        let cli = Cli::parse_from([
            "dit", "xvg", "compare", "-i", "a.xvg", "b.xvg", "-c", "1", "2,3", "--xmin", "0",
            "--xmax", "10",
        ]);
        let Commands::Xvg(args) = cli.command else {
            panic!("Expected 'xvg' subcommand");
        };
        let XvgCommands::Compare(compare) = args.command else {
            panic!("Expected 'xvg compare' subcommand");
        };
        assert_eq!(compare.input.len(), 2);
        assert_eq!(compare.columns, vec!["1", "2,3"]);
        assert_eq!(compare.curve.xmin, Some(0.0));
        assert_eq!(compare.curve.xmax, Some(10.0));
    }

    #[test]
    fn axis_bounds_must_come_in_pairs() {
        let result =
            Cli::try_parse_from(["dit", "xvg", "show", "-i", "a.xvg", "--xmin", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn xpm_pair_commands_take_exactly_two_inputs() {
        let result = Cli::try_parse_from(["dit", "xpm", "diff", "-i", "a.xpm"]);
        assert!(result.is_err());

        let cli = Cli::parse_from(["dit", "xpm", "diff", "-i", "a.xpm", "b.xpm"]);
        let Commands::Xpm(args) = cli.command else {
            panic!("Expected 'xpm' subcommand");
        };
        let XpmCommands::Diff(diff) = args.command else {
            panic!("Expected 'xpm diff' subcommand");
        };
        assert_eq!(diff.precision, 3);
        assert!(diff.colormap.is_none());
    }

    #[test]
    fn ndx_edit_commands_take_group_names_positionally() {
        let cli = Cli::parse_from(["dit", "ndx", "rm", "-i", "index.ndx", "Protein", "SOL"]);
        let Commands::Ndx(args) = cli.command else {
            panic!("Expected 'ndx' subcommand");
        };
        let NdxCommands::Rm(rm) = args.command else {
            panic!("Expected 'ndx rm' subcommand");
        };
        assert_eq!(rm.groups, vec!["Protein", "SOL"]);
        assert_eq!(rm.output, PathBuf::from("output.ndx"));
    }

    #[test]
    fn hbond_set_operations_are_mutually_exclusive() {
        let base = [
            "dit", "hbond", "-s", "top.gro", "-n", "index.ndx", "-m", "map.xpm",
        ];
        let mut with_both: Vec<&str> = base.to_vec();
        with_both.extend(["--and", "0,1", "--or", "2"]);
        assert!(Cli::try_parse_from(with_both).is_err());

        let mut with_and: Vec<&str> = base.to_vec();
        with_and.extend(["--and", "0,1"]);
        let cli = Cli::parse_from(with_and);
        let Commands::Hbond(args) = cli.command else {
            panic!("Expected 'hbond' subcommand");
        };
        assert_eq!(args.and.as_deref(), Some("0,1"));
        assert_eq!(args.name_template, DEFAULT_NAME_TEMPLATE);
    }

    #[test]
    fn data_set_path_requires_a_path() {
        assert!(Cli::try_parse_from(["dit", "data", "set-path"]).is_err());

        let cli = Cli::parse_from(["dit", "data", "set-path", "/opt/dit-data"]);
        let Commands::Data(args) = cli.command else {
            panic!("Expected 'data' subcommand");
        };
        assert!(matches!(
            args.command,
            DataCommands::SetPath { path } if path == PathBuf::from("/opt/dit-data")
        ));
    }
}
