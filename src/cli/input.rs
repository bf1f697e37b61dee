use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::error::RirmapError;

/// Files never picked up as an address list
pub const EXCLUDED_LIST_FILES: &[&str] = &["requirements.txt"];

/// Find the most recently modified file with `extension` in `dir`
pub fn newest_with_extension(
    dir: &Path,
    extension: &str,
    excluded: &[&str],
) -> Result<Option<PathBuf>, RirmapError> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.extension().and_then(OsStr::to_str) != Some(extension) {
            continue;
        }
        if path
            .file_name()
            .and_then(OsStr::to_str)
            .is_some_and(|name| excluded.contains(&name))
        {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified()?;
        if newest.as_ref().is_none_or(|(time, _)| modified > *time) {
            newest = Some((modified, path));
        }
    }

    Ok(newest.map(|(_, path)| path))
}

/// Read one token per line, with all whitespace removed
///
/// Blank lines are skipped.
pub fn read_address_list(path: &Path) -> Result<Vec<String>, RirmapError> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|token| !token.is_empty())
        .collect())
}
