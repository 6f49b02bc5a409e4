use crate::error::QueryLensError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// What an execution callback receives for the query under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutePayload {
    /// The full call text, e.g. `client.user.findMany({})`.
    #[default]
    Call,
    /// The raw argument text, falling back to the call text for calls without one.
    Argument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DetectorConfig {
    /// Constructor name whose instance is tracked (`new Client()`).
    pub client_class: String,
    /// Key binding that runs the query under the cursor.
    pub run_key: String,
    pub payload: ExecutePayload,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            client_class: "Client".to_string(),
            run_key: "Mod-Enter".to_string(),
            payload: ExecutePayload::Call,
        }
    }
}

impl DetectorConfig {
    pub fn with_client_class(mut self, client_class: impl Into<String>) -> Self {
        self.client_class = client_class.into();
        self
    }
}

/// Load a detector config from a JSON file.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<DetectorConfig, QueryLensError> {
    tracing::debug!("Reading config file");
    let contents = fs::read_to_string(path).map_err(|e| QueryLensError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    load_config_from_str(&contents, path)
}

/// Load a detector config from a string. The path is used for error messages.
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<DetectorConfig, QueryLensError> {
    let config: DetectorConfig =
        serde_json::from_str(contents).map_err(|e| QueryLensError::InvalidConfig {
            path: path.display().to_string(),
            message: format!("JSON parse error: {}", e),
        })?;

    if config.client_class.trim().is_empty() {
        return Err(QueryLensError::InvalidConfig {
            path: path.display().to_string(),
            message: "clientClass must not be empty".to_string(),
        });
    }
    tracing::debug!(client_class = %config.client_class, "Config loaded");
    Ok(config)
}
