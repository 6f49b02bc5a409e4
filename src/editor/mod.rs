pub mod selection;
pub mod trigger;

use crate::config::DetectorConfig;
use crate::detector::{DetectedQuery, QueryRegistry};
use crate::error::QueryLensError;
use crate::languages::Language;
use crate::parser;
use crate::syntax::SyntaxTree;
use tracing::debug;
use tree_sitter::{InputEdit, Parser, Point};

pub use selection::{first_cursor, Selection, SelectionRange};
pub use trigger::{
    ExecutionTrigger, KeyChord, KeyEvent, Modifiers, RequestId, RequestIds, TriggerOutcome,
    TriggerState,
};

/// Replace `[from, to)` of the document with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub from: usize,
    pub to: usize,
    pub insert: String,
}

impl TextChange {
    pub fn new(from: usize, to: usize, insert: impl Into<String>) -> Self {
        Self {
            from,
            to,
            insert: insert.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }

    pub fn delete(from: usize, to: usize) -> Self {
        Self::new(from, to, "")
    }
}

/// One editor update. All change offsets refer to the document as it was
/// before the transaction, and changes must not overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    pub changes: Vec<TextChange>,
    /// New selection, in post-change coordinates. When absent the current
    /// selection is mapped through the changes.
    pub selection: Option<Selection>,
}

impl Transaction {
    pub fn changes(changes: Vec<TextChange>) -> Self {
        Self {
            changes,
            selection: None,
        }
    }

    pub fn select(selection: Selection) -> Self {
        Self {
            changes: Vec::new(),
            selection: Some(selection),
        }
    }
}

/// Detection state attached to one editor view.
///
/// Owns the document, its syntax tree, and the query registry. Every
/// transaction that changes the text re-parses incrementally and rebuilds
/// the registry; selection-only transactions leave the registry untouched.
pub struct QueryEditor {
    config: DetectorConfig,
    parser: Parser,
    document: SyntaxTree,
    registry: QueryRegistry,
    selection: Selection,
    trigger: ExecutionTrigger,
    request_ids: RequestIds,
}

impl QueryEditor {
    pub fn new(source: &str, language: Language, config: DetectorConfig) -> Result<Self, QueryLensError> {
        let chord: KeyChord = config.run_key.parse()?;
        let mut parser = parser::new_parser(language)?;
        let tree = parser::reparse(&mut parser, source, None)?;
        let document = SyntaxTree::from_parts(source.to_string(), tree, language);
        let registry = QueryRegistry::detect(&document, &config);
        let trigger = ExecutionTrigger::new(chord, config.payload);

        Ok(Self {
            config,
            parser,
            document,
            registry,
            selection: Selection::cursor(0),
            trigger,
            request_ids: RequestIds::default(),
        })
    }

    pub fn source(&self) -> &str {
        self.document.source()
    }

    pub fn document(&self) -> &SyntaxTree {
        &self.document
    }

    pub fn registry(&self) -> &QueryRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn cursor(&self) -> usize {
        first_cursor(&self.selection)
    }

    pub fn query_at_cursor(&self) -> Option<&DetectedQuery> {
        self.registry.at(self.cursor())
    }

    pub fn trigger_state(&self) -> TriggerState {
        self.trigger.state()
    }

    pub fn on_execute(&mut self, callback: impl FnMut(&str) + 'static) {
        self.trigger.on_execute(callback);
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> TriggerOutcome {
        self.trigger
            .handle_key(event, &self.registry, &self.selection, &mut self.request_ids)
    }

    /// Apply a transaction. Returns whether the document text changed.
    ///
    /// Invalid changes (out of bounds, splitting a UTF-8 character,
    /// overlapping) are rejected and leave the editor untouched.
    pub fn apply(&mut self, transaction: Transaction) -> Result<bool, QueryLensError> {
        let mut changes = transaction.changes;
        changes.sort_by_key(|change| (change.from, change.to));
        validate_changes(self.source(), &changes)?;

        let old_source = self.source();
        let mut new_source = old_source.to_string();
        let mut edited_tree = self.document.tree().clone();
        // Bottom-to-top, so earlier offsets stay valid.
        for change in changes.iter().rev() {
            edited_tree.edit(&input_edit(&new_source, change));
            new_source.replace_range(change.from..change.to, &change.insert);
        }
        let document_changed = new_source != old_source;

        let selection = match transaction.selection {
            Some(selection) => selection,
            None => self
                .selection
                .map(|pos| map_position(pos, &changes)),
        };
        if let Some(range) = selection.ranges().iter().find(|r| r.to() > new_source.len()) {
            return Err(QueryLensError::InvalidEdit(format!(
                "selection {}..{} is outside the document ({} bytes)",
                range.from(),
                range.to(),
                new_source.len()
            )));
        }

        if document_changed {
            let tree = parser::reparse(&mut self.parser, &new_source, Some(&edited_tree))?;
            self.document = SyntaxTree::from_parts(new_source, tree, self.document.language());
            debug!(changes = changes.len(), bytes = self.document.source().len(), "document changed");
        }
        self.registry = std::mem::take(&mut self.registry).update(
            document_changed,
            &self.document,
            &self.config,
        );
        self.selection = selection;
        Ok(document_changed)
    }
}

fn validate_changes(source: &str, changes: &[TextChange]) -> Result<(), QueryLensError> {
    for change in changes {
        if change.from > change.to || change.to > source.len() {
            return Err(QueryLensError::InvalidEdit(format!(
                "change {}..{} is outside the document ({} bytes)",
                change.from,
                change.to,
                source.len()
            )));
        }
        if !source.is_char_boundary(change.from) || !source.is_char_boundary(change.to) {
            return Err(QueryLensError::InvalidEdit(format!(
                "change {}..{} splits a character",
                change.from, change.to
            )));
        }
    }
    for w in changes.windows(2) {
        if w[1].from < w[0].to {
            return Err(QueryLensError::InvalidEdit(
                "Overlapping changes detected".to_string(),
            ));
        }
    }
    Ok(())
}

fn input_edit(source: &str, change: &TextChange) -> InputEdit {
    let start_position = point_at(source, change.from);
    InputEdit {
        start_byte: change.from,
        old_end_byte: change.to,
        new_end_byte: change.from + change.insert.len(),
        start_position,
        old_end_position: point_at(source, change.to),
        new_end_position: advance(start_position, &change.insert),
    }
}

fn point_at(source: &str, byte: usize) -> Point {
    advance(Point::new(0, 0), &source[..byte])
}

fn advance(start: Point, text: &str) -> Point {
    match text.rfind('\n') {
        Some(last_newline) => Point::new(
            start.row + text.matches('\n').count(),
            text.len() - last_newline - 1,
        ),
        None => Point::new(start.row, start.column + text.len()),
    }
}

/// Where `pos` ends up after `changes` (ascending, pre-change coordinates).
/// Positions inside a replaced span land after the inserted text.
fn map_position(pos: usize, changes: &[TextChange]) -> usize {
    let mut mapped = pos;
    for change in changes {
        if change.to <= pos {
            mapped = mapped - (change.to - change.from) + change.insert.len();
        } else if change.from < pos {
            return mapped - (pos - change.from) + change.insert.len();
        } else {
            break;
        }
    }
    mapped
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_at_counts_rows_and_columns() {
        let source = "ab\ncde\nf";
        assert_eq!(point_at(source, 0), Point::new(0, 0));
        assert_eq!(point_at(source, 2), Point::new(0, 2));
        assert_eq!(point_at(source, 5), Point::new(1, 2));
        assert_eq!(point_at(source, source.len()), Point::new(2, 1));
    }

    #[test]
    fn advance_over_inserted_lines() {
        assert_eq!(advance(Point::new(3, 4), "xy"), Point::new(3, 6));
        assert_eq!(advance(Point::new(3, 4), "x\nyz"), Point::new(4, 2));
    }

    #[test]
    fn map_position_through_changes() {
        let changes = vec![TextChange::insert(2, "abc"), TextChange::new(10, 14, "z")];
        assert_eq!(map_position(1, &changes), 1);
        assert_eq!(map_position(2, &changes), 5);
        assert_eq!(map_position(8, &changes), 11);
        assert_eq!(map_position(12, &changes), 14);
        assert_eq!(map_position(20, &changes), 20);
    }

    #[test]
    fn validate_rejects_overlap_and_bounds() {
        let source = "0123456789";
        assert!(validate_changes(source, &[TextChange::new(2, 5, ""), TextChange::new(4, 6, "")]).is_err());
        assert!(validate_changes(source, &[TextChange::new(8, 11, "")]).is_err());
        assert!(validate_changes(source, &[TextChange::new(6, 4, "")]).is_err());
        assert!(validate_changes(source, &[TextChange::new(0, 2, ""), TextChange::new(2, 4, "")]).is_ok());
    }

    #[test]
    fn validate_rejects_split_characters() {
        assert!(validate_changes("é", &[TextChange::insert(1, "x")]).is_err());
    }
}
