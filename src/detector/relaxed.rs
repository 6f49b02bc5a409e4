//! Lenient conversion of JavaScript literals into JSON values.
//!
//! Accepts what a person types inside a query argument: unquoted keys,
//! single quotes, trailing commas, comments, hex numbers and unary signs.
//! Anything that needs evaluation (identifiers, shorthand properties,
//! spreads, template strings, calls) makes the whole conversion fail.

use crate::languages::Language;
use crate::parser;
use crate::syntax::{NodeKind, SyntaxNode};
use serde_json::{Map, Number, Value};
use tracing::debug;

/// Parse free-standing literal text, e.g. `{ where: { id: 1 }, }`.
pub fn parse_relaxed(text: &str) -> Option<Value> {
    // Parentheses keep `{ ... }` from being read as a block statement.
    let wrapped = format!("({})", text);
    let tree = match parser::parse(&wrapped, Language::JavaScript) {
        Ok(tree) => tree,
        Err(e) => {
            debug!(error = %e, "relaxed parse unavailable");
            return None;
        }
    };
    let root = SyntaxNode::new(tree.root_node(), &wrapped);
    if root.has_error() {
        return None;
    }
    let statements = root.named_children();
    let [statement] = statements.as_slice() else {
        return None;
    };
    let expr = statement
        .first_child()
        .filter(|n| n.kind() == NodeKind::ParenthesizedExpression)?;
    if expr.range() != (0..wrapped.len()) {
        return None;
    }
    value_from_node(expr)
}

/// Convert an already-parsed literal node.
pub fn value_from_node(node: SyntaxNode) -> Option<Value> {
    if node.has_error() {
        return None;
    }
    match node.kind() {
        NodeKind::ObjectLiteral => {
            let mut map = Map::new();
            for member in node.named_children() {
                if member.kind() != NodeKind::Pair {
                    return None;
                }
                let key = property_key(member.child_by_field("key")?)?;
                let value = value_from_node(member.child_by_field("value")?)?;
                map.insert(key, value);
            }
            Some(Value::Object(map))
        }
        NodeKind::ArrayLiteral => node
            .named_children()
            .into_iter()
            .map(value_from_node)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        NodeKind::StringLiteral => string_value(node).map(Value::String),
        NodeKind::Number => number_value(node.text()),
        NodeKind::True => Some(Value::Bool(true)),
        NodeKind::False => Some(Value::Bool(false)),
        NodeKind::Null => Some(Value::Null),
        NodeKind::UnaryExpression => signed_number(node),
        NodeKind::ParenthesizedExpression => match node.named_children().as_slice() {
            [inner] => value_from_node(*inner),
            _ => None,
        },
        _ => None,
    }
}

fn property_key(key: SyntaxNode) -> Option<String> {
    match key.kind() {
        NodeKind::PropertyName => Some(key.text().to_string()),
        NodeKind::StringLiteral => string_value(key),
        NodeKind::Number => Some(key.text().to_string()),
        _ => None,
    }
}

fn string_value(node: SyntaxNode) -> Option<String> {
    let mut out = String::new();
    for part in node.children() {
        match part.kind() {
            NodeKind::StringFragment => out.push_str(part.text()),
            NodeKind::EscapeSequence => unescape_into(part.text(), &mut out)?,
            _ => {}
        }
    }
    Some(out)
}

fn unescape_into(escape: &str, out: &mut String) -> Option<()> {
    let body = escape.strip_prefix('\\')?;
    let mut chars = body.chars();
    let first = chars.next()?;
    match first {
        'n' => out.push('\n'),
        't' => out.push('\t'),
        'r' => out.push('\r'),
        'b' => out.push('\u{8}'),
        'f' => out.push('\u{c}'),
        'v' => out.push('\u{b}'),
        '0' if body.len() == 1 => out.push('\0'),
        'x' => out.push(char::from_u32(u32::from_str_radix(&body[1..], 16).ok()?)?),
        'u' => {
            let hex = body[1..].trim_start_matches('{').trim_end_matches('}');
            out.push(char::from_u32(u32::from_str_radix(hex, 16).ok()?)?);
        }
        // line continuation
        '\n' | '\r' => {}
        other => out.push(other),
    }
    Some(())
}

fn number_value(text: &str) -> Option<Value> {
    let text = text.replace('_', "");
    let lower = text.to_ascii_lowercase();
    let radix = [("0x", 16), ("0o", 8), ("0b", 2)]
        .into_iter()
        .find(|(prefix, _)| lower.starts_with(prefix));
    if let Some((prefix, radix)) = radix {
        return i64::from_str_radix(&lower[prefix.len()..], radix)
            .ok()
            .map(Value::from);
    }
    if let Ok(int) = text.parse::<i64>() {
        return Some(Value::from(int));
    }
    // BigInt literals (`10n`) fail here and stay unparsed.
    let float = text.parse::<f64>().ok()?;
    Number::from_f64(float).map(Value::Number)
}

fn signed_number(node: SyntaxNode) -> Option<Value> {
    let operator = node.child_by_field("operator")?.text();
    let argument = node.child_by_field("argument")?;
    if argument.kind() != NodeKind::Number {
        return None;
    }
    let value = number_value(argument.text())?;
    match operator {
        "+" => Some(value),
        "-" => {
            if let Some(int) = value.as_i64() {
                Some(Value::from(-int))
            } else {
                Number::from_f64(-value.as_f64()?).map(Value::Number)
            }
        }
        _ => None,
    }
}
