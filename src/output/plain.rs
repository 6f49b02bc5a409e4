use super::FileQueries;
use crate::detector::DetectedQuery;

/// Format detected queries as plain text, one header per file.
pub fn format_output(files: &[FileQueries]) -> String {
    let mut output = String::new();

    for file in files {
        if file.queries.is_empty() {
            continue;
        }

        match &file.binding {
            Some(binding) => output.push_str(&format!(
                "{} (client: {}, line {})\n",
                file.path, binding.variable_name, binding.line
            )),
            None => {
                output.push_str(&file.path);
                output.push('\n');
            }
        }

        for query in &file.queries {
            output.push_str(&format_query(query));
            output.push('\n');
        }
    }

    output
}

fn format_query(query: &DetectedQuery) -> String {
    let mut lines = query.text.lines();
    let first = lines.next().unwrap_or_default();
    let more = if lines.next().is_some() { " ..." } else { "" };
    format!(
        "  L{} {} [{}..{}] {}{}",
        query.line_start,
        query.label(),
        query.from,
        query.to,
        first,
        more
    )
}
