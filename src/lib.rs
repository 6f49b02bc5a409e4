mod error;
mod languages;
mod output;
mod parser;
mod walk;
pub mod config;
pub mod detector;
pub mod editor;
pub mod syntax;

use std::fs;
use std::path::Path;

pub use config::{load_config, load_config_from_str, DetectorConfig, ExecutePayload};
pub use detector::relaxed::parse_relaxed;
pub use detector::{ClientBinding, DetectedQuery, QueryRegistry};
pub use error::QueryLensError;
pub use languages::{detect_language, Language};
pub use output::OutputFormat;
use output::FileQueries;
use regex::Regex;
use syntax::SyntaxTree;

/// Parse `source` and detect every client query in it.
pub fn detect_queries(
    source: &str,
    language: Language,
    config: &DetectorConfig,
) -> Result<QueryRegistry, QueryLensError> {
    let tree = SyntaxTree::parse(source, language)?;
    Ok(QueryRegistry::detect(&tree, config))
}

/// Options for processing paths
pub struct ProcessOptions {
    pub config: DetectorConfig,
    pub format: OutputFormat,
    pub depth: Option<usize>,
    pub ext: Vec<String>,
    /// Keep only the query containing this byte offset (single files only).
    pub at: Option<usize>,
    /// Keep only queries whose label (`user.findMany`, `$connect`) matches.
    pub filter: Option<String>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            config: DetectorConfig::default(),
            format: OutputFormat::Plain,
            depth: None,
            ext: Vec::new(),
            at: None,
            filter: None,
        }
    }
}

/// Process a file or directory and return formatted output
pub fn process_path(path: &str, options: &ProcessOptions) -> Result<String, QueryLensError> {
    let path = Path::new(path);

    if !path.exists() {
        return Err(QueryLensError::PathNotFound(path.display().to_string()));
    }
    let filter = options.filter.as_deref().map(Regex::new).transpose()?;

    let files: Vec<FileQueries> = if path.is_file() {
        vec![process_file(path, &options.config)?]
    } else if path.is_dir() {
        if options.at.is_some() {
            return Err(QueryLensError::InvalidPath(
                "--at only works on single files, not directories".to_string(),
            ));
        }
        let mut results = Vec::new();
        for file_path in walk::walk_directory(path, options.depth, &options.ext)? {
            match process_file(&file_path, &options.config) {
                Ok(file) => results.push(file),
                Err(e) => {
                    eprintln!("Warning: Failed to process {}: {}", file_path.display(), e);
                }
            }
        }
        results
    } else {
        return Err(QueryLensError::InvalidPath(path.display().to_string()));
    };

    let filtered: Vec<FileQueries> = files
        .into_iter()
        .map(|mut file| {
            file.queries.retain(|query| {
                options.at.map_or(true, |pos| query.contains(pos))
                    && filter.as_ref().map_or(true, |re| re.is_match(&query.label()))
            });
            file
        })
        .collect();

    match options.format {
        OutputFormat::Plain => Ok(output::plain::format_output(&filtered)),
        OutputFormat::Json => output::json::format_output(&filtered),
    }
}

fn process_file(path: &Path, config: &DetectorConfig) -> Result<FileQueries, QueryLensError> {
    let source = fs::read_to_string(path).map_err(|e| QueryLensError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let language = languages::detect_language(path)?;
    let registry = detect_queries(&source, language, config)?;

    Ok(FileQueries {
        path: path.to_string_lossy().to_string(),
        binding: registry.binding().cloned(),
        queries: registry.iter().cloned().collect(),
    })
}
