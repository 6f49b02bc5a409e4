use super::ClientBinding;
use crate::syntax::{NodeKind, SyntaxNode};
use tracing::trace;

/// A call recognized by shape, before its argument is extracted.
#[derive(Debug, Clone, Copy)]
pub struct RawMatch<'a> {
    pub call: SyntaxNode<'a>,
    pub entity: Option<SyntaxNode<'a>>,
    pub operation: SyntaxNode<'a>,
}

/// Every awaited call rooted at `binding` under `root`, in source order.
///
/// Two shapes are recognized:
/// - `await client.$connect()`: the callee's object is the binding itself
/// - `await client.user.findMany({})`: the callee's object is `client.user`
///
/// Anything else is skipped without aborting the walk.
pub fn find_calls<'a>(root: SyntaxNode<'a>, binding: &ClientBinding) -> Vec<RawMatch<'a>> {
    root.descendants()
        .filter(|node| node.kind() == NodeKind::AwaitExpression)
        .filter_map(|node| match_awaited_call(node, &binding.variable_name))
        .collect()
}

fn match_awaited_call<'a>(await_expr: SyntaxNode<'a>, binding: &str) -> Option<RawMatch<'a>> {
    let keyword = await_expr.first_child()?;
    if keyword.kind() != NodeKind::AwaitKeyword {
        return None;
    }

    let call = keyword.next_sibling()?;
    if call.kind() != NodeKind::CallExpression {
        trace!(range = ?await_expr.range(), "awaited expression is not a call");
        return None;
    }

    let callee = call.first_child()?;
    if callee.kind() != NodeKind::MemberExpression {
        return None;
    }

    let operation = callee
        .last_child()
        .filter(|n| n.kind() == NodeKind::PropertyName)?;
    let object = callee.first_child()?;

    match object.kind() {
        NodeKind::VariableName if object.text() == binding => Some(RawMatch {
            call,
            entity: None,
            operation,
        }),
        NodeKind::MemberExpression => {
            let root = object.first_child()?;
            if root.kind() != NodeKind::VariableName || root.text() != binding {
                trace!(range = ?call.range(), "member chain not rooted at the client");
                return None;
            }
            let entity = object
                .last_child()
                .filter(|n| n.kind() == NodeKind::PropertyName)?;
            Some(RawMatch {
                call,
                entity: Some(entity),
                operation,
            })
        }
        _ => None,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::Language;
    use crate::syntax::SyntaxTree;

    fn client() -> ClientBinding {
        ClientBinding {
            variable_name: "client".to_string(),
            line: 1,
        }
    }

    fn labels(source: &str) -> Vec<(Option<String>, String)> {
        let tree = SyntaxTree::parse(source, Language::TypeScript).unwrap();
        find_calls(tree.root(), &client())
            .into_iter()
            .map(|m| {
                (
                    m.entity.map(|e| e.text().to_string()),
                    m.operation.text().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn matches_top_level_operation() {
        assert_eq!(labels("await client.$connect()"), vec![(None, "$connect".to_string())]);
    }

    #[test]
    fn matches_entity_operation() {
        assert_eq!(
            labels("await client.post.create({ data: {} })"),
            vec![(Some("post".to_string()), "create".to_string())]
        );
    }

    #[test]
    fn rejects_call_without_await() {
        assert!(labels("client.user.findMany({})").is_empty());
    }

    #[test]
    fn rejects_chains_deeper_than_one_entity() {
        assert!(labels("await client.a.b.c()").is_empty());
    }

    #[test]
    fn rejects_chained_promise_calls() {
        assert!(labels("await client.user.findMany().then(log)").is_empty());
    }

    #[test]
    fn rejects_other_objects() {
        assert!(labels("await other.user.findMany()").is_empty());
        assert!(labels("await fetch(url)").is_empty());
    }

    #[test]
    fn rejects_computed_members() {
        assert!(labels("await client['user'].findMany()").is_empty());
    }

    #[test]
    fn call_range_excludes_await() {
        let source = "await client.$disconnect()";
        let tree = SyntaxTree::parse(source, Language::TypeScript).unwrap();
        let matches = find_calls(tree.root(), &client());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].call.range(), 6..source.len());
    }
}
