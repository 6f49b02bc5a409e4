use super::relaxed;
use crate::syntax::{NodeKind, SyntaxNode};
use serde_json::Value;

/// The sole literal argument of a matched call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedArgument {
    pub raw_text: Option<String>,
    pub parsed: Option<Value>,
}

/// Argument kinds in priority order.
const LITERAL_KINDS: [NodeKind; 3] = [
    NodeKind::ObjectLiteral,
    NodeKind::TemplateString,
    NodeKind::StringLiteral,
];

/// Slice the object, template or string literal passed to `call`, then try a
/// relaxed parse of it. Calls without such an argument (`$connect()`) yield
/// an empty result.
pub fn extract_argument(call: SyntaxNode) -> ExtractedArgument {
    let Some(literal) = argument_literal(call) else {
        return ExtractedArgument::default();
    };
    ExtractedArgument {
        raw_text: Some(literal.text().to_string()),
        parsed: relaxed::value_from_node(literal),
    }
}

fn argument_literal(call: SyntaxNode) -> Option<SyntaxNode> {
    let last = call.last_child()?;
    match last.kind() {
        // tagged template: client.$queryRaw`SELECT 1`
        NodeKind::TemplateString => Some(last),
        NodeKind::ArgumentList => {
            let args = last.named_children();
            LITERAL_KINDS
                .iter()
                .find_map(|kind| args.iter().find(|arg| arg.kind() == *kind).copied())
        }
        _ => None,
    }
}
