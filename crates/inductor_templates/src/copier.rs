//! Copies static assets (scripts, answer-file helpers, ...) next to the
//! rendered output.

use std::fs;
use std::path::Path;

use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::error::{TemplateError, TemplateResult};
use crate::key::{PARTIAL_TEMPLATE_EXT, ROOT_TEMPLATE_EXT};

/// Recursively copies a directory, leaving out hidden entries, template
/// sources and the output directory itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCopier;

impl StaticCopier {
    pub fn new() -> Self {
        Self
    }

    /// Copy `src_dir` into `out_dir`, creating it when missing. Returns the
    /// number of files copied.
    pub fn copy(&self, src_dir: &Path, out_dir: &Path) -> TemplateResult<usize> {
        if !src_dir.is_dir() {
            return Err(TemplateError::NotADirectory(src_dir.to_path_buf()));
        }
        if out_dir.exists() && !out_dir.is_dir() {
            return Err(TemplateError::NotADirectory(out_dir.to_path_buf()));
        }
        fs::create_dir_all(out_dir)?;

        let src_dir = fs::canonicalize(src_dir)?;
        let out_dir = fs::canonicalize(out_dir)?;
        info!("Copying static files from {:?} to {:?}", src_dir, out_dir);

        let walker = WalkDir::new(&src_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !skip(entry, &out_dir));

        let mut copied = 0;
        for entry in walker {
            let entry = entry.map_err(|source| TemplateError::Walk {
                path: src_dir.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&src_dir) else {
                continue;
            };
            let target = out_dir.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            debug!("Copied {:?}", relative);
            copied += 1;
        }

        info!("Copied {} file(s)", copied);
        Ok(copied)
    }
}

fn skip(entry: &DirEntry, out_dir: &Path) -> bool {
    if entry.file_name().to_string_lossy().starts_with('.') {
        return true;
    }
    if entry.file_type().is_dir() {
        return entry.path() == out_dir;
    }
    entry
        .path()
        .extension()
        .is_some_and(|ext| ext == ROOT_TEMPLATE_EXT || ext == PARTIAL_TEMPLATE_EXT)
}
