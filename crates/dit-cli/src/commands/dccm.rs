use crate::cli::DccmArgs;
use crate::commands::write_output;
use crate::config::CliConfig;
use crate::error::Result;
use dit_core::analysis::AnalysisError;
use dit_core::analysis::dccm::{DccmOptions, dccm_from_ascii};
use std::fs::File;
use std::io::BufReader;
use tracing::info;

pub fn run(args: DccmArgs, config: &CliConfig) -> Result<()> {
    if !args.input.exists() {
        return Err(AnalysisError::InputMissing {
            path: args.input.clone(),
        }
        .into());
    }
    let mut reader = BufReader::new(File::open(&args.input)?);

    let options = DccmOptions {
        precision: args.precision,
        colormap: args
            .colormap
            .clone()
            .or_else(|| config.colormap.clone())
            .unwrap_or_else(|| "bwr".to_string()),
    };
    let matrix = dccm_from_ascii(&mut reader, &options)?;
    info!(
        "Cross-correlation matrix of {} residues derived.",
        matrix.width
    );

    write_output(&matrix, &args.output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::read_input;
    use dit_core::analysis::dccm::DCCM_TITLE;
    use dit_core::core::formats::xpm::XpmMatrix;
    use std::fs;
    use tempfile::tempdir;

    const COVARIANCE: &str = "1 0 0\n0.5 0 0\n0.5 0 0\n1 0 0\n";

    #[test]
    fn covariance_dump_becomes_a_normalized_matrix() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("covar.dat");
        fs::write(&input, COVARIANCE).unwrap();
        let output = dir.path().join("dccm.xpm");

        let args = DccmArgs {
            input,
            colormap: None,
            precision: 3,
            output: output.clone(),
        };
        run(args, &CliConfig::default()).unwrap();

        let written: XpmMatrix = read_input(&output).unwrap();
        assert_eq!(written.title, DCCM_TITLE);
        assert_eq!((written.width, written.height), (2, 2));

        // Stored rows run top-to-bottom, so residue 2 comes first; the
        // palette quantizes the written values to 64 levels over [-1, 1].
        assert_eq!(written.value_matrix[0][1], 1.0);
        assert_eq!(written.value_matrix[1][0], 1.0);
        assert!((written.value_matrix[0][0] - 0.5).abs() < 0.02);
        assert!((written.value_matrix[1][1] - 0.5).abs() < 0.02);
    }

    #[test]
    fn missing_input_is_reported_as_such() {
        let dir = tempdir().unwrap();
        let args = DccmArgs {
            input: dir.path().join("absent.dat"),
            colormap: None,
            precision: 3,
            output: dir.path().join("dccm.xpm"),
        };
        let result = run(args, &CliConfig::default());
        assert!(matches!(
            result,
            Err(crate::error::CliError::Analysis(
                AnalysisError::InputMissing { .. }
            ))
        ));
    }
}
