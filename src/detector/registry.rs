use super::arguments::extract_argument;
use super::binding::resolve_binding;
use super::matcher::{find_calls, RawMatch};
use super::{ClientBinding, DetectedQuery};
use crate::config::DetectorConfig;
use crate::syntax::SyntaxTree;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Detected queries of one document state, keyed by start offset.
///
/// Entries never overlap: when a matched call sits inside another matched
/// call, only the outer one is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRegistry {
    binding: Option<ClientBinding>,
    entries: BTreeMap<usize, DetectedQuery>,
}

impl QueryRegistry {
    /// Resolve the client binding and build the registry in one pass.
    pub fn detect(tree: &SyntaxTree, config: &DetectorConfig) -> Self {
        let binding = resolve_binding(tree, &config.client_class);
        Self::build(tree, binding.as_ref())
    }

    /// Match every call rooted at `binding`. No binding means no queries.
    pub fn build(tree: &SyntaxTree, binding: Option<&ClientBinding>) -> Self {
        let mut registry = QueryRegistry {
            binding: binding.cloned(),
            entries: BTreeMap::new(),
        };
        let Some(binding) = binding else {
            return registry;
        };

        for raw in find_calls(tree.root(), binding) {
            registry.insert(detected_query(raw));
        }
        debug!(
            binding = %binding.variable_name,
            queries = registry.len(),
            "built query registry"
        );
        registry
    }

    /// Rebuild from `tree` when the document changed; otherwise keep `self` as is.
    pub fn update(self, document_changed: bool, tree: &SyntaxTree, config: &DetectorConfig) -> Self {
        if document_changed {
            Self::detect(tree, config)
        } else {
            self
        }
    }

    /// Entries intersecting `[from, to)` in ascending order. An empty range
    /// selects the entry containing `from`, if any.
    pub fn between(&self, from: usize, to: usize) -> impl Iterator<Item = &DetectedQuery> + '_ {
        let end = to.max(from.saturating_add(1));
        let straddling = self
            .entries
            .range(..from)
            .next_back()
            .map(|(_, query)| query)
            .filter(|query| query.to > from);
        straddling
            .into_iter()
            .chain(self.entries.range(from..end).map(|(_, query)| query))
    }

    /// The entry whose range contains `pos`.
    pub fn at(&self, pos: usize) -> Option<&DetectedQuery> {
        self.entries
            .range(..=pos)
            .next_back()
            .map(|(_, query)| query)
            .filter(|query| query.contains(pos))
    }

    pub fn binding(&self) -> Option<&ClientBinding> {
        self.binding.as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DetectedQuery> + '_ {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, query: DetectedQuery) {
        if let Some(last) = self.entries.values().next_back() {
            debug_assert!(
                query.from >= last.from,
                "matches must arrive in source order: {:?} after {:?}",
                query.range(),
                last.range()
            );
            if query.from < last.to {
                trace!(inner = ?query.range(), outer = ?last.range(), "dropping nested query");
                return;
            }
        }
        debug_assert!(
            !self.entries.contains_key(&query.from),
            "duplicate query range {:?}",
            query.range()
        );
        self.entries.insert(query.from, query);
    }
}

fn detected_query(raw: RawMatch) -> DetectedQuery {
    let argument = extract_argument(raw.call);
    DetectedQuery {
        from: raw.call.from(),
        to: raw.call.to(),
        line_start: raw.call.start_line(),
        line_end: raw.call.end_line(),
        entity_name: raw.entity.map(|e| e.text().to_string()),
        operation: raw.operation.text().to_string(),
        text: raw.call.text().to_string(),
        raw_argument_text: argument.raw_text,
        parsed_arguments: argument.parsed,
    }
}

impl<'a> IntoIterator for &'a QueryRegistry {
    type Item = &'a DetectedQuery;
    type IntoIter = std::collections::btree_map::Values<'a, usize, DetectedQuery>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
