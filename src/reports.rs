// src/reports.rs
use std::fs;
use std::path::Path;

use crate::errors::{Result, RunnerError};

/// Read every report file in `<project_root>/<reports_dir>` whose name ends
/// with `extension`.
///
/// With `sorted` the reports come back in file-name order, otherwise in
/// whatever order the filesystem lists them.
pub fn collect_reports(
    project_root: &Path,
    reports_dir: &Path,
    extension: &str,
    sorted: bool,
) -> Result<Vec<String>> {
    let dir = project_root.join(reports_dir);
    if !dir.is_dir() {
        return Err(RunnerError::ReportsMissing);
    }

    let mut reports = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        // Follows symlinks; dangling links are skipped.
        let is_file = fs::metadata(entry.path()).map(|m| m.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.ends_with(extension) {
            continue;
        }
        let bytes = fs::read(entry.path())?;
        // UTF-8 reports pass through unchanged; invalid bytes become U+FFFD.
        reports.push((file_name, String::from_utf8_lossy(&bytes).into_owned()));
    }

    if sorted {
        reports.sort_by(|a, b| a.0.cmp(&b.0));
    }

    log::debug!("Collected {} report(s) from {}", reports.len(), dir.display());
    Ok(reports.into_iter().map(|(_, content)| content).collect())
}
