use super::ClientBinding;
use crate::syntax::{NodeKind, SyntaxNode, SyntaxTree};
use tracing::{debug, trace};

/// Find the variable bound to the first `new <client_class>()` construction.
///
/// Constructions that are not directly assigned in a declaration
/// (`connect(new Client())`, `this.db = new Client()`) are skipped and the
/// scan continues. Returns `None` when the document has no such binding yet.
pub fn resolve_binding(tree: &SyntaxTree, client_class: &str) -> Option<ClientBinding> {
    let binding = tree
        .root()
        .descendants()
        .filter(|node| node.kind() == NodeKind::NewExpression)
        .find_map(|node| binding_for_construction(node, client_class));

    match &binding {
        Some(b) => debug!(variable = %b.variable_name, line = b.line, "resolved client binding"),
        None => debug!(client_class, "no client construction found"),
    }
    binding
}

fn binding_for_construction(new_expr: SyntaxNode, client_class: &str) -> Option<ClientBinding> {
    let constructor = constructor_name(new_expr)?;
    if constructor.text() != client_class {
        return None;
    }

    let declarator = new_expr
        .parent()
        .filter(|n| n.kind() == NodeKind::VariableDeclarator)?;
    let declaration = declarator
        .parent()
        .filter(|n| n.kind() == NodeKind::VariableDeclaration);
    let Some(declaration) = declaration else {
        trace!(range = ?new_expr.range(), "client construction outside a declaration");
        return None;
    };

    // The construction must be the declarator's initializer, not part of its type annotation.
    let value = declarator.child_by_field("value")?;
    if value.range() != new_expr.range() {
        return None;
    }

    let name = declarator
        .child_by_field("name")
        .filter(|n| n.kind() == NodeKind::VariableName);
    let Some(name) = name else {
        trace!(range = ?declarator.range(), "client bound to a destructuring pattern");
        return None;
    };

    Some(ClientBinding {
        variable_name: name.text().to_string(),
        line: declaration.start_line(),
    })
}

/// The identifier directly after the `new` keyword.
fn constructor_name(new_expr: SyntaxNode) -> Option<SyntaxNode> {
    let keyword = new_expr
        .first_child()
        .filter(|n| n.kind() == NodeKind::NewKeyword)?;
    keyword
        .next_sibling()
        .filter(|n| n.kind() == NodeKind::VariableName)
}
