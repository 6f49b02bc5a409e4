use super::FileQueries;
use crate::detector::{ClientBinding, DetectedQuery};
use crate::error::QueryLensError;
use serde::Serialize;

#[derive(Serialize)]
struct JsonOutput<'a> {
    files: Vec<FileOutput<'a>>,
}

#[derive(Serialize)]
struct FileOutput<'a> {
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    binding: Option<&'a ClientBinding>,
    queries: &'a [DetectedQuery],
}

/// Format detected queries as pretty-printed JSON
pub fn format_output(files: &[FileQueries]) -> Result<String, QueryLensError> {
    let output = JsonOutput {
        files: files
            .iter()
            .map(|file| FileOutput {
                path: &file.path,
                binding: file.binding.as_ref(),
                queries: &file.queries,
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&output)?)
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn serializes_camel_case_fields() {
        let files = vec![FileQueries {
            path: "a.ts".to_string(),
            binding: Some(ClientBinding {
                variable_name: "client".to_string(),
                line: 1,
            }),
            queries: vec![DetectedQuery {
                from: 28,
                to: 52,
                line_start: 2,
                line_end: 2,
                entity_name: Some("user".to_string()),
                operation: "findMany".to_string(),
                text: "client.user.findMany({})".to_string(),
                raw_argument_text: Some("{}".to_string()),
                parsed_arguments: Some(json!({})),
            }],
        }];
        let value: Value = serde_json::from_str(&format_output(&files).unwrap()).unwrap();
        let query = &value["files"][0]["queries"][0];
        assert_eq!(value["files"][0]["binding"]["variableName"], "client");
        assert_eq!(query["entityName"], "user");
        assert_eq!(query["rawArgumentText"], "{}");
        assert_eq!(query["lineStart"], 2);
    }

    #[test]
    fn absent_fields_are_omitted() {
        let files = vec![FileQueries {
            path: "b.js".to_string(),
            binding: None,
            queries: vec![],
        }];
        let value: Value = serde_json::from_str(&format_output(&files).unwrap()).unwrap();
        assert!(value["files"][0].get("binding").is_none());
        assert_eq!(value["files"][0]["queries"], json!([]));
    }
}
