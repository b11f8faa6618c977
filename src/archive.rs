// src/archive.rs
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::errors::{Result, RunnerError};

const MAX_FILENAME_LEN: usize = 255;

static SAFE_FILENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._ -]+$").expect("filename pattern is valid"));

/// A client-supplied archive filename that has been checked for safe use
/// as a single path component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    /// The filename as uploaded, e.g. `demo.zip`.
    pub file_name: String,
    /// The filename without its extension, e.g. `demo`.
    pub project_name: String,
}

impl ArchiveName {
    pub fn parse(filename: &str) -> Result<Self> {
        let reject = |reason: &str| RunnerError::InvalidFilename {
            name: filename.to_string(),
            reason: reason.to_string(),
        };

        if filename.trim().is_empty() {
            return Err(reject("filename is empty"));
        }
        if filename.len() > MAX_FILENAME_LEN {
            return Err(reject("filename is too long"));
        }
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return Err(reject("filename must not contain path separators or '..'"));
        }
        if filename.starts_with('.') {
            return Err(reject("filename must not start with '.'"));
        }
        if !SAFE_FILENAME.is_match(filename) {
            return Err(reject("filename contains unsupported characters"));
        }

        let stem = Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if stem.is_empty() || stem == filename {
            return Err(reject("filename must have an extension, e.g. project.zip"));
        }
        if stem.trim() != stem {
            return Err(reject("project name must not start or end with whitespace"));
        }

        Ok(Self {
            file_name: filename.to_string(),
            project_name: stem.to_string(),
        })
    }
}

/// A project tree materialized from an uploaded archive.
#[derive(Debug, Clone)]
pub struct ExtractedProject {
    pub name: String,
    pub root: PathBuf,
}

/// Write the uploaded bytes to `<dir>/<file_name>`.
pub fn save_upload(dir: &Path, name: &ArchiveName, bytes: &[u8]) -> Result<PathBuf> {
    let path = dir.join(&name.file_name);
    fs::write(&path, bytes)?;
    Ok(path)
}

/// Extract every entry of a ZIP archive under `dest`.
///
/// Entries whose path would escape `dest` are skipped. Returns the number
/// of regular files written.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<usize> {
    let file = fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut count: usize = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        let entry_path = match entry.enclosed_name() {
            Some(p) => p,
            None => {
                log::warn!("Skipping archive entry with unsafe path: {}", entry.name());
                continue;
            }
        };
        let output_path = dest.join(&entry_path);

        if entry.is_dir() {
            fs::create_dir_all(&output_path)?;
            continue;
        }

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut outfile = fs::File::create(&output_path)?;
        io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&output_path, fs::Permissions::from_mode(mode & 0o777))?;
        }

        count += 1;
    }
    Ok(count)
}

/// Resolve the project root for `name` under `dir` and check that the
/// descriptor file sits directly inside it.
pub fn locate_project(dir: &Path, name: &ArchiveName, descriptor: &str) -> Result<ExtractedProject> {
    let root = dir.join(&name.project_name);
    if !root.join(descriptor).is_file() {
        return Err(RunnerError::InvalidProject {
            descriptor: descriptor.to_string(),
        });
    }
    Ok(ExtractedProject {
        name: name.project_name.clone(),
        root,
    })
}
