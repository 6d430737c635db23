//! Debug rendering of trees

use std::fmt::Write;

use serde::Serialize;

use super::{ContainerId, NodeId, SyntaxKind, Tree};

/// Serializable snapshot of a subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugNode {
    pub kind: SyntaxKind,
    pub start: u32,
    pub end: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DebugNode>,
}

impl Tree {
    /// Indented `<kind start..end>` dump of a subtree
    pub fn debug_string(&self, node: impl Into<NodeId>) -> String {
        let mut out = String::new();
        self.write_debug(&mut out, node.into(), 0);
        out
    }

    /// Dump of the root followed by every comment
    pub fn debug_dump(&self) -> String {
        let mut out = self.debug_string(self.root());
        for comment in self.comments() {
            out.push('\n');
            out.push_str(&self.debug_string(*comment));
        }
        out
    }

    fn write_debug(&self, out: &mut String, node: NodeId, level: usize) {
        let indent = "  ".repeat(level);
        let range = self.range(node);
        match node {
            NodeId::Token(id) => {
                let _ = write!(
                    out,
                    "{indent}{:?} {}..{}",
                    self.tokens.get(id).text(),
                    u32::from(range.start()),
                    u32::from(range.end())
                );
            }
            NodeId::Container(id) => {
                let kind = self.kind(id);
                let _ = write!(
                    out,
                    "{indent}<{kind} {}..{}>",
                    u32::from(range.start()),
                    u32::from(range.end())
                );
                let children = self.children(id);
                if !children.is_empty() {
                    out.push('\n');
                    for child in children {
                        self.write_debug(out, *child, level + 1);
                        out.push('\n');
                    }
                    out.push_str(&indent);
                }
                let _ = write!(out, "</{kind}>");
            }
        }
    }

    /// Serializable snapshot of a subtree
    pub fn debug_node(&self, node: impl Into<NodeId>) -> DebugNode {
        let node = node.into();
        let range = self.range(node);
        let (text, children) = match node {
            NodeId::Token(id) => (Some(self.tokens.get(id).text().to_string()), Vec::new()),
            NodeId::Container(id) => (
                None,
                self.children(id)
                    .iter()
                    .map(|child| self.debug_node(*child))
                    .collect(),
            ),
        };
        DebugNode {
            kind: self.kind(node),
            start: range.start().into(),
            end: range.end().into(),
            text,
            children,
        }
    }

    /// Snapshot of the root and every comment
    pub fn debug_nodes(&self) -> Vec<DebugNode> {
        std::iter::once(self.root())
            .chain(self.comments().iter().copied())
            .map(|id: ContainerId| self.debug_node(id))
            .collect()
    }
}
