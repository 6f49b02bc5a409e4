use crate::error::QueryLensError;
use crate::languages;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Walk a directory and collect all script files.
/// Respects .gitignore, .ignore, and global gitignore rules.
pub fn walk_directory(path: &Path, max_depth: Option<usize>, ext_filter: &[String]) -> Result<Vec<PathBuf>, QueryLensError> {
    if !path.is_dir() {
        return Err(QueryLensError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let mut builder = WalkBuilder::new(path);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .sort_by_file_path(|a, b| a.cmp(b));

    // ignore's max_depth counts the root itself; ours counts levels below it.
    if let Some(d) = max_depth {
        builder.max_depth(Some(d + 1));
    }

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.map_err(|e| QueryLensError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::other(e.to_string()),
        })?;

        let entry_path = entry.path();
        if !entry_path.is_file() || !languages::is_supported_file(entry_path) {
            continue;
        }
        if !ext_filter.is_empty() {
            let ext = entry_path.extension().and_then(|e| e.to_str());
            if !ext.is_some_and(|ext| ext_filter.iter().any(|f| f == ext)) {
                continue;
            }
        }
        files.push(entry_path.to_path_buf());
    }

    tracing::debug!(root = %path.display(), files = files.len(), "walked directory");
    Ok(files)
}
