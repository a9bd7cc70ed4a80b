use crate::core::utils::outfile;
use crate::render::request::{PlotRequest, RequestError};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to serialize the plot request: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("{0}")]
    InvalidSelection(String),
}

/// Where a backend should put its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDirective {
    Show,
    Save(PathBuf),
}

/// The seam an actual plotting engine plugs into.
pub trait RenderBackend {
    fn render(&self, request: &PlotRequest, output: &OutputDirective) -> Result<(), RenderError>;
}

/// Backend that renders nothing and writes the request itself as TOML,
/// either to stdout or to a collision-safe file.
#[derive(Debug, Default, Clone, Copy)]
pub struct DumpBackend;

impl RenderBackend for DumpBackend {
    fn render(&self, request: &PlotRequest, output: &OutputDirective) -> Result<(), RenderError> {
        let dump = toml::to_string_pretty(request)?;
        match output {
            OutputDirective::Show => io::stdout().write_all(dump.as_bytes())?,
            OutputDirective::Save(path) => {
                let path = outfile::deconflict(path);
                std::fs::write(&path, dump)?;
                info!(path = %path.display(), mode = %request.mode, "plot request dumped");
            }
        }
        Ok(())
    }
}
