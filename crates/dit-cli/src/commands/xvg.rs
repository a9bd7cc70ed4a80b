use crate::cli::{
    CurveOpts, XvgArgs, XvgAveArgs, XvgCombineArgs, XvgCommands, XvgCompareArgs, XvgEnergyArgs,
    XvgMvaveArgs, XvgRamaArgs, XvgShowArgs,
};
use crate::commands::{derive_output, dispatch_plot, read_input, write_output};
use crate::config::CliConfig;
use crate::data::DataManager;
use crate::error::{CliError, Result};
use crate::utils::selection::parse_selection;
use dit_core::analysis::rama::RAMA_CLASSES;
use dit_core::analysis::{combine, energy, rama, stats};
use dit_core::core::formats::xvg::XvgData;
use dit_core::core::utils::outfile;
use dit_core::render::builders::{self, CurveOptions};
use dit_core::render::{PlotMode, RenderError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

pub fn run(args: XvgArgs, config: &CliConfig) -> Result<()> {
    match args.command {
        XvgCommands::Show(args) => show(args, config),
        XvgCommands::Compare(args) => compare(args, config),
        XvgCommands::Ave(args) => ave(args),
        XvgCommands::Mvave(args) => mvave(args),
        XvgCommands::Combine(args) => combine_tables(args),
        XvgCommands::Energy(args) => energy_decompose(args),
        XvgCommands::Rama(args) => ramachandran(args, config),
    }
}

fn curve_options(
    opts: &CurveOpts,
    columns: Vec<usize>,
    config: &CliConfig,
) -> Result<CurveOptions> {
    let mode_text = opts
        .mode
        .clone()
        .or_else(|| config.plot_mode.clone())
        .unwrap_or_else(|| "line".to_string());
    let mode: PlotMode = mode_text.parse().map_err(RenderError::from)?;

    Ok(CurveOptions {
        mode,
        columns,
        begin: opts.begin,
        end: opts.end,
        x_range: opts.xmin.zip(opts.xmax),
        y_range: opts.ymin.zip(opts.ymax),
        alpha: opts.alpha.or(config.alpha),
        legend_location: opts
            .legend_location
            .clone()
            .or_else(|| config.legend_location.clone()),
    })
}

fn read_tables(paths: &[PathBuf]) -> Result<Vec<XvgData>> {
    paths.iter().map(|path| read_input(path)).collect()
}

fn parse_selections(texts: &[String]) -> Result<Vec<Vec<usize>>> {
    texts
        .iter()
        .map(|text| parse_selection(text).map_err(CliError::from))
        .collect()
}

fn show(args: XvgShowArgs, config: &CliConfig) -> Result<()> {
    let table: XvgData = read_input(&args.input)?;
    let columns = match &args.columns {
        Some(text) => parse_selection(text)?,
        None => Vec::new(),
    };
    let options = curve_options(&args.curve, columns, config)?;
    let request = builders::xvg_curves(&table, &options)?;
    dispatch_plot(&request, args.dump.as_deref())
}

fn compare(args: XvgCompareArgs, config: &CliConfig) -> Result<()> {
    if args.input.len() != args.columns.len() {
        return Err(CliError::Argument(format!(
            "{} input files but {} column selections; give one selection per file",
            args.input.len(),
            args.columns.len()
        )));
    }
    let tables = read_tables(&args.input)?;
    let selections = parse_selections(&args.columns)?;
    let combined = combine::combine(&tables, &selections)?;

    let options = curve_options(&args.curve, Vec::new(), config)?;
    let request = builders::xvg_curves(&combined, &options)?;
    dispatch_plot(&request, args.dump.as_deref())
}

fn ave(args: XvgAveArgs) -> Result<()> {
    let table: XvgData = read_input(&args.input)?;
    let averages = stats::calc_average(&table, args.begin, args.end)?;

    let width = averages
        .heads
        .iter()
        .map(|head| head.len())
        .max()
        .unwrap_or(0)
        .max("column".len());
    println!("{:>width$}  {:>16}  {:>16}", "column", "average", "std");
    for (i, head) in averages.heads.iter().enumerate() {
        println!(
            "{:>width$}  {:>16.6}  {:>16.6}",
            head, averages.averages[i], averages.stds[i]
        );
    }
    Ok(())
}

fn mvave(args: XvgMvaveArgs) -> Result<()> {
    let table: XvgData = read_input(&args.input)?;
    let averages = stats::calc_mvave(&table, args.window_size, args.confidence)?;

    let output = args
        .output
        .unwrap_or_else(|| derive_output(&args.input, "_mvave.csv"));
    let target = outfile::deconflict(&output);
    let mut writer = BufWriter::new(File::create(&target)?);
    averages.write_csv(&mut writer)?;
    writer.flush()?;
    info!("Moving averages written to {:?}", &target);
    Ok(())
}

fn combine_tables(args: XvgCombineArgs) -> Result<()> {
    if args.input.len() != args.columns.len() {
        return Err(CliError::Argument(format!(
            "{} input files but {} column selections; give one selection per file",
            args.input.len(),
            args.columns.len()
        )));
    }
    let tables = read_tables(&args.input)?;
    let selections = parse_selections(&args.columns)?;
    let combined = combine::combine(&tables, &selections)?;
    write_output(&combined, &args.output)?;
    Ok(())
}

fn energy_decompose(args: XvgEnergyArgs) -> Result<()> {
    let complex: XvgData = read_input(&args.complex)?;
    let receptor: XvgData = read_input(&args.receptor)?;
    let ligand: XvgData = read_input(&args.ligand)?;
    let decomposed = energy::decompose(&complex, &receptor, &ligand)?;
    write_output(&decomposed, &args.output)?;
    Ok(())
}

fn ramachandran(args: XvgRamaArgs, config: &CliConfig) -> Result<()> {
    let table: XvgData = read_input(&args.input)?;
    let refdata = match args.refdata.clone().or_else(|| config.rama_refdata.clone()) {
        Some(dir) => dir,
        None => DataManager::new()?.ramachandran_dir(),
    };
    info!("Reading reference densities from {:?}", &refdata);

    let analysis = rama::classify(&table, &refdata)?;
    for class in RAMA_CLASSES {
        let (normals, outliers) = analysis.partition(class);
        if normals.is_empty() && outliers.is_empty() {
            continue;
        }
        info!(
            "{}: {} residues, {} outliers",
            class,
            normals.len() + outliers.len(),
            outliers.len()
        );
    }

    let request = builders::ramachandran(&analysis)?;
    dispatch_plot(&request, args.dump.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const RMSD: &str = r#"@    title "RMSD"
@    xaxis  label "Time (ps)"
@    yaxis  label "(nm)"
@ s0 legend "backbone"
0.0  0.10
10.0 0.14
20.0 0.12
30.0 0.16
"#;

    const GYRATE: &str = r#"@    title "Radius of gyration"
@    xaxis  label "Time (ps)"
@    yaxis  label "(nm)"
@ s0 legend "Rg"
0.0  1.50
10.0 1.52
20.0 1.49
30.0 1.51
"#;

    fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn xvg_command(cli: Cli) -> XvgCommands {
        let Commands::Xvg(args) = cli.command else {
            panic!("Expected 'xvg' subcommand");
        };
        args.command
    }

    #[test]
    fn mvave_derives_the_output_name_from_the_input() {
        let dir = tempdir().unwrap();
        let input = write_fixture(dir.path(), "rmsd.xvg", RMSD);

        let cli = Cli::parse_from([
            "dit",
            "xvg",
            "mvave",
            "-i",
            input.to_str().unwrap(),
            "-w",
            "2",
        ]);
        let XvgCommands::Mvave(args) = xvg_command(cli) else {
            panic!("Expected 'xvg mvave' subcommand");
        };
        mvave(args).unwrap();

        let content = fs::read_to_string(dir.path().join("rmsd_mvave.csv")).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Time (ps),backbone (nm)"));
        assert!(lines.next().unwrap().starts_with("nan"));
    }

    #[test]
    fn combine_writes_a_reparsable_table() {
        let dir = tempdir().unwrap();
        let rmsd = write_fixture(dir.path(), "rmsd.xvg", RMSD);
        let gyrate = write_fixture(dir.path(), "gyrate.xvg", GYRATE);
        let output = dir.path().join("combined.xvg");

        let args = XvgCombineArgs {
            input: vec![rmsd, gyrate],
            columns: vec!["1".to_string(), "1".to_string()],
            output: output.clone(),
        };
        combine_tables(args).unwrap();

        let combined: XvgData = read_input(&output).unwrap();
        assert_eq!(combined.column_count, 3);
        assert_eq!(combined.row_count, 4);
        assert_eq!(combined.legends, vec!["backbone (nm)", "Rg (nm)"]);
    }

    #[test]
    fn compare_requires_one_selection_per_file() {
        let args = XvgCompareArgs {
            input: vec![PathBuf::from("a.xvg"), PathBuf::from("b.xvg")],
            columns: vec!["1".to_string()],
            curve: CurveOpts {
                mode: None,
                begin: 0,
                end: None,
                xmin: None,
                xmax: None,
                ymin: None,
                ymax: None,
                alpha: None,
                legend_location: None,
            },
            dump: None,
        };
        assert!(matches!(
            compare(args, &CliConfig::default()),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn show_dumps_the_request_to_the_given_path() {
        let dir = tempdir().unwrap();
        let input = write_fixture(dir.path(), "rmsd.xvg", RMSD);
        let dump = dir.path().join("request.toml");

        let cli = Cli::parse_from([
            "dit",
            "xvg",
            "show",
            "-i",
            input.to_str().unwrap(),
            "--dump",
            dump.to_str().unwrap(),
        ]);
        let XvgCommands::Show(args) = xvg_command(cli) else {
            panic!("Expected 'xvg show' subcommand");
        };
        show(args, &CliConfig::default()).unwrap();

        let content = fs::read_to_string(&dump).unwrap();
        assert!(content.contains("mode = \"line\""));
        assert!(content.contains("backbone (nm)"));
    }

    #[test]
    fn config_supplies_the_mode_when_the_flag_is_absent() {
        let config = CliConfig {
            plot_mode: Some("scatter".to_string()),
            ..CliConfig::default()
        };
        let opts = CurveOpts {
            mode: None,
            begin: 0,
            end: None,
            xmin: Some(0.0),
            xmax: Some(30.0),
            ymin: None,
            ymax: None,
            alpha: None,
            legend_location: None,
        };
        let options = curve_options(&opts, Vec::new(), &config).unwrap();
        assert_eq!(options.mode, PlotMode::Scatter);
        assert_eq!(options.x_range, Some((0.0, 30.0)));

        let explicit = CurveOpts {
            mode: Some("bar".to_string()),
            ..opts
        };
        let options = curve_options(&explicit, Vec::new(), &config).unwrap();
        assert_eq!(options.mode, PlotMode::Bar);
    }

    #[test]
    fn unknown_mode_is_reported_as_a_render_error() {
        let opts = CurveOpts {
            mode: Some("spiral".to_string()),
            begin: 0,
            end: None,
            xmin: None,
            xmax: None,
            ymin: None,
            ymax: None,
            alpha: None,
            legend_location: None,
        };
        assert!(matches!(
            curve_options(&opts, Vec::new(), &CliConfig::default()),
            Err(CliError::Render(_))
        ));
    }
}
