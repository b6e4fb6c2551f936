//! Directory listing used by template discovery.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{TemplateError, TemplateResult};

/// Recursively lists files with a given extension.
///
/// Discovery takes a lister at construction so tests can supply a fixed
/// file list instead of touching the filesystem.
#[cfg_attr(test, mockall::automock)]
pub trait DirectoryLister {
    /// All files under `base_dir` whose extension is exactly `extension`, sorted by path.
    fn list_files(&self, base_dir: &Path, extension: &str) -> TemplateResult<Vec<PathBuf>>;
}

/// Lists files from the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list_files(&self, base_dir: &Path, extension: &str) -> TemplateResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(base_dir).sort_by_file_name() {
            let entry = entry.map_err(|source| TemplateError::Walk {
                path: base_dir.to_path_buf(),
                source,
            })?;

            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == extension)
            {
                files.push(entry.into_path());
            }
        }

        files.sort();
        debug!(
            "Found {} .{} file(s) under {:?}",
            files.len(),
            extension,
            base_dir
        );
        Ok(files)
    }
}
