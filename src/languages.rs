use crate::error::QueryLensError;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    TypeScript,
    Tsx,
    JavaScript,
    Jsx,
}

/// Detect language from file extension
pub fn detect_language(path: &Path) -> Result<Language, QueryLensError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| QueryLensError::NoExtension(path.display().to_string()))?;

    match extension {
        "ts" | "mts" | "cts" => Ok(Language::TypeScript),
        "tsx" => Ok(Language::Tsx),
        "js" | "mjs" | "cjs" => Ok(Language::JavaScript),
        "jsx" => Ok(Language::Jsx),
        _ => Err(QueryLensError::UnsupportedExtension(extension.to_string())),
    }
}

/// Check if a file should be processed based on its extension
pub fn is_supported_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| matches!(ext, "ts" | "mts" | "cts" | "tsx" | "js" | "mjs" | "cjs" | "jsx"))
        .unwrap_or(false)
}

/// Get tree-sitter Language for a given language enum
pub fn ts_language(lang: Language) -> tree_sitter::Language {
    match lang {
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        Language::JavaScript | Language::Jsx => tree_sitter_javascript::LANGUAGE.into(),
    }
}
