use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Returns a path that is safe to create without clobbering existing data.
///
/// When `path` does not exist it is returned unchanged. When it does, a
/// `_YYYYmmddHHMMSS` suffix is inserted before the extension, a warning is
/// logged, and the renamed path is returned. Existing files are never
/// overwritten.
pub fn deconflict(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stamp = Local::now().format("%Y%m%d%H%M%S");
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let renamed = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, stamp, ext.to_string_lossy()),
        None => format!("{}_{}", stem, stamp),
    };
    let new_path = path.with_file_name(renamed);
    warn!(
        "Output '{}' already exists; writing '{}' instead",
        path.display(),
        new_path.display()
    );
    new_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn fresh_path_is_returned_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xvg");
        assert_eq!(deconflict(&path), path);
    }

    #[test]
    fn existing_path_gains_timestamp_before_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xvg");
        fs::write(&path, "data").unwrap();

        let renamed = deconflict(&path);
        assert_ne!(renamed, path);

        let name = renamed.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("out_"));
        assert!(name.ends_with(".xvg"));
        // stem + '_' + 14-digit stamp + ".xvg"
        assert_eq!(name.len(), "out_".len() + 14 + ".xvg".len());
    }

    #[test]
    fn extensionless_path_gains_trailing_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("outfile");
        fs::write(&path, "data").unwrap();

        let renamed = deconflict(&path);
        let name = renamed.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("outfile_"));
        assert_eq!(name.len(), "outfile_".len() + 14);
    }
}
