pub mod plain;
pub mod json;

use crate::detector::{ClientBinding, DetectedQuery};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// Detection results for one file.
#[derive(Debug, Clone)]
pub struct FileQueries {
    pub path: String,
    pub binding: Option<ClientBinding>,
    pub queries: Vec<DetectedQuery>,
}
