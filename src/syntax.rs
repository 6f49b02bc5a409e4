//! Read-only view over a parsed document.
//!
//! Grammar node kind strings are translated into [`NodeKind`] in one place
//! ([`NodeKind::from_grammar`]), so the detector matches on an exhaustive
//! enum instead of comparing strings scattered through the code.

use crate::error::QueryLensError;
use crate::languages::Language;
use crate::parser;
use std::ops::Range;
use tree_sitter::{Node, Tree, TreeCursor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    NewExpression,
    CallExpression,
    MemberExpression,
    /// A plain identifier in expression position.
    VariableName,
    /// The name after `.` in a member expression.
    PropertyName,
    AwaitExpression,
    AwaitKeyword,
    NewKeyword,
    VariableDeclarator,
    VariableDeclaration,
    ArgumentList,
    ObjectLiteral,
    ArrayLiteral,
    Pair,
    TemplateString,
    TemplateSubstitution,
    StringLiteral,
    StringFragment,
    EscapeSequence,
    Number,
    True,
    False,
    Null,
    UnaryExpression,
    ParenthesizedExpression,
    Comment,
    Error,
    Other,
}

impl NodeKind {
    pub fn from_grammar(kind: &str) -> NodeKind {
        match kind {
            "new_expression" => NodeKind::NewExpression,
            "call_expression" => NodeKind::CallExpression,
            "member_expression" => NodeKind::MemberExpression,
            "identifier" => NodeKind::VariableName,
            "property_identifier" => NodeKind::PropertyName,
            "await_expression" => NodeKind::AwaitExpression,
            "await" => NodeKind::AwaitKeyword,
            "new" => NodeKind::NewKeyword,
            "variable_declarator" => NodeKind::VariableDeclarator,
            "lexical_declaration" | "variable_declaration" => NodeKind::VariableDeclaration,
            "arguments" => NodeKind::ArgumentList,
            "object" => NodeKind::ObjectLiteral,
            "array" => NodeKind::ArrayLiteral,
            "pair" => NodeKind::Pair,
            "template_string" => NodeKind::TemplateString,
            "template_substitution" => NodeKind::TemplateSubstitution,
            "string" => NodeKind::StringLiteral,
            "string_fragment" => NodeKind::StringFragment,
            "escape_sequence" => NodeKind::EscapeSequence,
            "number" => NodeKind::Number,
            "true" => NodeKind::True,
            "false" => NodeKind::False,
            "null" => NodeKind::Null,
            "unary_expression" => NodeKind::UnaryExpression,
            "parenthesized_expression" => NodeKind::ParenthesizedExpression,
            "comment" | "html_comment" => NodeKind::Comment,
            "ERROR" => NodeKind::Error,
            _ => NodeKind::Other,
        }
    }
}

/// A parsed document: the source text and the tree built from it.
///
/// Trees are replaced wholesale after every edit; nodes borrowed from one
/// `SyntaxTree` cannot outlive it.
pub struct SyntaxTree {
    source: String,
    tree: Tree,
    language: Language,
}

impl SyntaxTree {
    pub fn parse(source: &str, language: Language) -> Result<Self, QueryLensError> {
        let tree = parser::parse(source, language)?;
        Ok(Self::from_parts(source.to_string(), tree, language))
    }

    pub fn from_parts(source: String, tree: Tree, language: Language) -> Self {
        Self { source, tree, language }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode::new(self.tree.root_node(), &self.source)
    }
}

#[derive(Clone, Copy)]
pub struct SyntaxNode<'a> {
    node: Node<'a>,
    source: &'a str,
}

impl<'a> SyntaxNode<'a> {
    pub fn new(node: Node<'a>, source: &'a str) -> Self {
        Self { node, source }
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_grammar(self.node.kind())
    }

    /// Half-open byte range `[from, to)` in the document.
    pub fn range(&self) -> Range<usize> {
        self.node.byte_range()
    }

    pub fn from(&self) -> usize {
        self.node.start_byte()
    }

    pub fn to(&self) -> usize {
        self.node.end_byte()
    }

    /// 1-based line of the first byte.
    pub fn start_line(&self) -> usize {
        self.node.start_position().row + 1
    }

    /// 1-based line of the last byte.
    pub fn end_line(&self) -> usize {
        self.node.end_position().row + 1
    }

    pub fn text(&self) -> &'a str {
        &self.source[self.node.byte_range()]
    }

    pub fn has_error(&self) -> bool {
        self.node.has_error()
    }

    pub fn parent(&self) -> Option<SyntaxNode<'a>> {
        self.node.parent().map(|n| self.wrap(n))
    }

    pub fn first_child(&self) -> Option<SyntaxNode<'a>> {
        self.node.child(0).map(|n| self.wrap(n))
    }

    pub fn last_child(&self) -> Option<SyntaxNode<'a>> {
        let mut cursor = self.node.walk();
        let last = self.node.children(&mut cursor).last();
        last.map(|n| self.wrap(n))
    }

    pub fn next_sibling(&self) -> Option<SyntaxNode<'a>> {
        self.node.next_sibling().map(|n| self.wrap(n))
    }

    pub fn child_by_field(&self, field: &str) -> Option<SyntaxNode<'a>> {
        self.node.child_by_field_name(field).map(|n| self.wrap(n))
    }

    pub fn children(&self) -> Vec<SyntaxNode<'a>> {
        let mut cursor = self.node.walk();
        self.node
            .children(&mut cursor)
            .map(|n| self.wrap(n))
            .collect()
    }

    /// Named children, with comments filtered out.
    pub fn named_children(&self) -> Vec<SyntaxNode<'a>> {
        let mut cursor = self.node.walk();
        self.node
            .named_children(&mut cursor)
            .map(|n| self.wrap(n))
            .filter(|n| n.kind() != NodeKind::Comment)
            .collect()
    }

    /// Pre-order walk over this node and all of its descendants: parents
    /// before children, children left to right.
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants {
            cursor: self.node.walk(),
            source: self.source,
            done: false,
        }
    }

    fn wrap(&self, node: Node<'a>) -> SyntaxNode<'a> {
        SyntaxNode::new(node, self.source)
    }
}

impl std::fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.range())
    }
}

pub struct Descendants<'a> {
    cursor: TreeCursor<'a>,
    source: &'a str,
    done: bool,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = SyntaxNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = SyntaxNode::new(self.cursor.node(), self.source);

        // Advance: first child, else next sibling, else climb until a sibling exists.
        if !self.cursor.goto_first_child() {
            loop {
                if self.cursor.goto_next_sibling() {
                    break;
                }
                if self.cursor.depth() == 0 || !self.cursor.goto_parent() {
                    self.done = true;
                    break;
                }
            }
        }
        Some(current)
    }
}
