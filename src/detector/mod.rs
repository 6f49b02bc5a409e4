//! Recognition of database-client calls in a script.
//!
//! A detection pass resolves the variable bound to `new <client_class>()`,
//! collects every `await <binding>.<op>(...)` / `await <binding>.<entity>.<op>(...)`
//! call, and stores them in a [`QueryRegistry`] ordered by start offset.

pub mod arguments;
pub mod binding;
pub mod matcher;
pub mod registry;
pub mod relaxed;

use serde::Serialize;
use serde_json::Value;
use std::ops::Range;

pub use binding::resolve_binding;
pub use matcher::{find_calls, RawMatch};
pub use registry::QueryRegistry;

/// The variable holding the client instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientBinding {
    pub variable_name: String,
    /// 1-based line of the declaration.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedQuery {
    pub from: usize,
    pub to: usize,
    pub line_start: usize,
    pub line_end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    pub operation: String,
    /// Source of the call expression, without `await` or any assignment prefix.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_argument_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_arguments: Option<Value>,
}

impl DetectedQuery {
    pub fn range(&self) -> Range<usize> {
        self.from..self.to
    }

    pub fn contains(&self, pos: usize) -> bool {
        self.from <= pos && pos < self.to
    }

    /// `entity.operation`, or just `operation` for top-level calls.
    pub fn label(&self) -> String {
        match &self.entity_name {
            Some(entity) => format!("{}.{}", entity, self.operation),
            None => self.operation.clone(),
        }
    }
}
