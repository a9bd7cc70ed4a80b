use crate::error::{CliError, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialPlotConfig {
    mode: Option<String>,
    colormap: Option<String>,
    alpha: Option<f64>,
    legend_location: Option<String>,
    colorbar_location: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialRamachandranConfig {
    refdata: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialCliConfig {
    plot: Option<PartialPlotConfig>,
    ramachandran: Option<PartialRamachandranConfig>,
}

/// Defaults read from `dit.toml`, consulted whenever a command-line option
/// is absent. Every field is optional; commands fall back to their built-in
/// defaults last.
#[derive(Debug, Default, Clone)]
pub struct CliConfig {
    pub plot_mode: Option<String>,
    pub colormap: Option<String>,
    pub alpha: Option<f64>,
    pub legend_location: Option<String>,
    pub colorbar_location: Option<String>,
    pub rama_refdata: Option<PathBuf>,
}

impl CliConfig {
    /// Loads the configuration, either from an explicitly given file or from
    /// `dit.toml` under the OS-specific config directory.
    ///
    /// An explicit path must exist and parse; a missing file at the default
    /// location simply yields the built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("No configuration file found, using built-in defaults.");
                    return Ok(Self::default());
                }
            },
        };

        debug!("Loading configuration from {:?}", &path);
        let content = std::fs::read_to_string(&path).map_err(|e| CliError::FileParsing {
            path: path.clone(),
            source: e.into(),
        })?;
        let partial: PartialCliConfig =
            toml::from_str(&content).map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            })?;

        let plot = partial.plot.unwrap_or_default();
        let ramachandran = partial.ramachandran.unwrap_or_default();
        Ok(Self {
            plot_mode: plot.mode,
            colormap: plot.colormap,
            alpha: plot.alpha,
            legend_location: plot.legend_location,
            colorbar_location: plot.colorbar_location,
            rama_refdata: ramachandran.refdata,
        })
    }

    fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "duivy", "dit").map(|dirs| dirs.config_dir().join("dit.toml"))
    }
}
