use crate::cli::{DataArgs, DataCommands};
use crate::data::DataManager;
use crate::error::{CliError, Result};
use std::path::PathBuf;
use tracing::warn;

pub fn run(args: DataArgs) -> Result<()> {
    match args.command {
        DataCommands::Path => handle_path(),
        DataCommands::SetPath { path } => handle_set_path(path),
        DataCommands::ResetPath => handle_reset_path(),
    }
}

fn handle_path() -> Result<()> {
    let manager = DataManager::new()?;
    println!("{}", manager.get_data_path().display());
    Ok(())
}

fn handle_set_path(path: PathBuf) -> Result<()> {
    if path.is_relative() {
        return Err(CliError::Argument(format!(
            "data path {:?} must be absolute",
            path
        )));
    }
    if !path.exists() {
        warn!(
            "Directory {:?} does not exist yet; analyses that need reference data will fail until it is provisioned.",
            path
        );
    }
    DataManager::set_custom_path(&path)?;
    println!("Data path set to: {:?}", path);
    Ok(())
}

fn handle_reset_path() -> Result<()> {
    DataManager::reset_path()?;
    println!("Data path reset to the default location.");
    Ok(())
}
