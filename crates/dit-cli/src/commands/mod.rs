pub mod data;
pub mod dccm;
pub mod hbond;
pub mod ndx;
pub mod xpm;
pub mod xvg;

use crate::error::{CliError, Result};
use dit_core::analysis::AnalysisError;
use dit_core::core::formats::traits::{FormatRead, FormatWrite};
use dit_core::core::utils::outfile;
use dit_core::render::{DumpBackend, OutputDirective, PlotRequest, RenderBackend};
use std::path::{Path, PathBuf};
use tracing::info;

/// Reads and parses an input file, reporting a missing path as such rather
/// than as a bare I/O failure.
pub fn read_input<T>(path: &Path) -> Result<T>
where
    T: FormatRead,
    T::Error: Send + Sync + 'static,
{
    if !path.exists() {
        return Err(AnalysisError::InputMissing {
            path: path.to_path_buf(),
        }
        .into());
    }
    T::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

/// Writes a value object, renaming the target first if it already exists.
/// Returns the path actually written.
pub fn write_output<T>(value: &T, path: &Path) -> Result<PathBuf>
where
    T: FormatWrite,
    T::Error: Send + Sync + 'static,
{
    let target = outfile::deconflict(path);
    value
        .write_to_path(&target)
        .map_err(|e| CliError::Other(e.into()))?;
    info!("Output written to {:?}", &target);
    Ok(target)
}

/// Derives a sibling output path from the input stem, e.g. `rmsd.xvg` with
/// suffix `_mvave.csv` becomes `rmsd_mvave.csv`.
pub fn derive_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}{}", stem, suffix))
}

/// Hands a plot request to the dump backend, targeting stdout or a file.
pub fn dispatch_plot(request: &PlotRequest, dump: Option<&Path>) -> Result<()> {
    let directive = match dump {
        Some(path) => OutputDirective::Save(path.to_path_buf()),
        None => OutputDirective::Show,
    };
    DumpBackend.render(request, &directive)?;
    Ok(())
}
