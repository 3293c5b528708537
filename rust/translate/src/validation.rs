// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Path validation and batch file discovery

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const IFC_EXTENSION: &str = "ifc";

/// Check that `path` names a readable `.ifc` file
pub fn validate_input_file(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(Error::validation("No file selected"));
    }
    if !path.exists() {
        return Err(Error::validation(format!(
            "File does not exist: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(Error::validation(format!(
            "Path is not a file: {}",
            path.display()
        )));
    }
    if !has_extension(path, IFC_EXTENSION) {
        let suffix = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_else(|| "no extension".to_string());
        return Err(Error::validation(format!(
            "File must be .ifc format, got: {}",
            suffix
        )));
    }
    if fs::File::open(path).is_err() {
        return Err(Error::validation(format!(
            "No read permission for file: {}",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

/// Check that `path` names a directory we can create files in
pub fn validate_output_directory(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(Error::validation("No output directory selected"));
    }
    check_directory(path)?;

    // Probe is removed when dropped
    if let Err(e) = tempfile::Builder::new()
        .prefix(".ifc-translate-probe")
        .tempfile_in(path)
    {
        tracing::debug!(dir = %path.display(), error = %e, "Write probe failed");
        return Err(Error::validation(format!(
            "No write permission for directory: {}",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

/// Check that `path` names a directory we can list
pub fn validate_input_directory(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(Error::validation("No input directory selected"));
    }
    check_directory(path)?;

    if fs::read_dir(path).is_err() {
        return Err(Error::validation(format!(
            "No read permission for directory: {}",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

fn check_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::validation(format!(
            "Directory does not exist: {}",
            path.display()
        )));
    }
    if !path.is_dir() {
        return Err(Error::validation(format!(
            "Path is not a directory: {}",
            path.display()
        )));
    }
    Ok(())
}

/// `output_dir` joined with the input's file name
///
/// An existing file of the same name is overwritten later on.
pub fn build_output_path(input: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    match input.file_name() {
        Some(name) => output_dir.as_ref().join(name),
        None => output_dir.as_ref().to_path_buf(),
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Matching files directly inside a directory
///
/// Every call to [`FileDiscovery::scan`] (or every iteration) lists the
/// directory again, so a discovery can be reused after files change.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    directory: PathBuf,
    extension: String,
}

impl FileDiscovery {
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Sorted, de-duplicated regular files with the configured extension
    pub fn scan(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    dir = %self.directory.display(),
                    error = %e,
                    "Unable to list directory"
                );
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && has_extension(path, &self.extension))
            .collect();
        files.sort();
        files.dedup();
        files
    }
}

impl IntoIterator for &FileDiscovery {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.scan().into_iter()
    }
}

/// Discover `.ifc` files directly inside `directory`
pub fn discover_files(directory: impl Into<PathBuf>) -> FileDiscovery {
    FileDiscovery {
        directory: directory.into(),
        extension: IFC_EXTENSION.to_string(),
    }
}
