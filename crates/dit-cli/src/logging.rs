use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self},
    prelude::*,
};

/// Console filter for the global flags: `-v` raises WARN to INFO, `-vv` to
/// DEBUG, `-vvv` to TRACE. `--quiet` switches console logging off entirely.
fn console_level(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(console_level(verbosity, quiet))
        .with(stderr_layer);

    if let Some(path) = log_file {
        let file = File::create(&path).map_err(CliError::Io)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_target(true);

        subscriber.with(file_layer).init();
    } else {
        subscriber.init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dit_core::core::formats::ndx::IndexGroups;
    use dit_core::core::formats::traits::FormatRead;
    use serial_test::serial;
    use std::io::Cursor;
    use std::sync::Once;
    use std::thread;
    use std::time::Duration;
    use tracing::{debug, error, info, trace, warn};

    static INIT: Once = Once::new();

    fn ensure_global_logger_is_set() {
        INIT.call_once(|| {
            setup_logging(3, false, None).expect("Failed to set up global logger for tests");
        });
    }

    #[test]
    fn repeated_verbose_flags_raise_the_console_level() {
        assert_eq!(console_level(0, false), LevelFilter::WARN);
        assert_eq!(console_level(1, false), LevelFilter::INFO);
        assert_eq!(console_level(2, false), LevelFilter::DEBUG);
        assert_eq!(console_level(3, false), LevelFilter::TRACE);
        assert_eq!(console_level(7, false), LevelFilter::TRACE);
    }

    #[test]
    fn quiet_switches_the_console_off() {
        assert_eq!(console_level(0, true), LevelFilter::OFF);
        assert_eq!(console_level(3, true), LevelFilter::OFF);
    }

    #[test]
    #[serial]
    fn command_lifecycle_events_reach_the_global_logger() {
        ensure_global_logger_is_set();

        info!("Dispatching to 'xvg' command.");
        debug!("Full CLI arguments parsed.");
        trace!("palette entry 'o' resolved");
        warn!("Output file exists; writing a timestamped name instead");
        error!("Command failed: matrix dimensions differ");
    }

    #[test]
    #[serial]
    fn log_file_captures_parser_warnings() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("dit.log");

        let file = File::create(log_path.clone()).unwrap();
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true);
        let subscriber = tracing_subscriber::registry().with(file_layer);

        let groups = tracing::subscriber::with_default(subscriber, || {
            let ndx = "[ Protein ]\n1 2 3\n[ Protein ]\n4 5 6\n";
            IndexGroups::read_from(&mut Cursor::new(ndx)).unwrap()
        });
        assert_eq!(groups.len(), 1);

        thread::sleep(Duration::from_millis(100));

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Duplicate group name 'Protein'"));
        assert!(content.contains("WARN"));
        assert!(content.contains("ThreadId"));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_path_is_an_io_error() {
        let invalid_path = PathBuf::from("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let result = setup_logging(0, false, Some(invalid_path));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
