use crate::error::QueryLensError;
use crate::languages::{ts_language, Language};
use tree_sitter::{Parser, Tree};

/// Create a Tree-sitter parser configured for `language`
pub fn new_parser(language: Language) -> Result<Parser, QueryLensError> {
    let mut parser = Parser::new();
    parser
        .set_language(&ts_language(language))
        .map_err(|e| QueryLensError::ParseError(format!("Failed to set language: {}", e)))?;
    Ok(parser)
}

/// Parse source code into a Tree-sitter AST
pub fn parse(source: &str, language: Language) -> Result<Tree, QueryLensError> {
    let mut parser = new_parser(language)?;
    reparse(&mut parser, source, None)
}

/// Parse `source`, reusing the unchanged parts of `old_tree` when it has
/// already been edited to match the new text.
pub fn reparse(
    parser: &mut Parser,
    source: &str,
    old_tree: Option<&Tree>,
) -> Result<Tree, QueryLensError> {
    parser
        .parse(source, old_tree)
        .ok_or_else(|| QueryLensError::ParseError("Failed to parse source code".to_string()))
}
