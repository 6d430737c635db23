//! Indentation of blocks and fragments
//!
//! A kind with the `IndentAligner` shape is a block body. Its indentation is
//! the whitespace starting the line of its content, or, when the content
//! begins mid-line (`if (x) { a(); }`), the enclosing aligner's indentation
//! plus one default unit.

use crate::syntax::{ContainerId, NodeId, Tree};

fn aligners<'a>(tree: &'a Tree, node: NodeId) -> impl Iterator<Item = ContainerId> + 'a {
    tree.ancestors(node)
        .filter(move |id| tree.grammar().is_aligner(tree.kind(*id)))
}

/// Indentation of the nearest enclosing block
pub fn indent(tree: &Tree, node: impl Into<NodeId>) -> String {
    aligners(tree, node.into())
        .next()
        .map(|aligner| aligner_indent(tree, aligner))
        .unwrap_or_default()
}

/// Indentation of the block enclosing the nearest one
pub fn parent_indent(tree: &Tree, node: impl Into<NodeId>) -> String {
    aligners(tree, node.into())
        .nth(1)
        .map(|aligner| aligner_indent(tree, aligner))
        .unwrap_or_default()
}

/// Current indentation of an aligner's content
pub fn aligner_indent(tree: &Tree, aligner: ContainerId) -> String {
    let children = tree.children(aligner);
    let inner = if children.len() > 1 {
        children.get(1)
    } else {
        children.first()
    };

    if let Some(inner) = inner.copied() {
        if let Some(range) = tree.token_range(inner) {
            let line_start = tree.tokens().line_start(range.start);
            if line_start >= tree.token_range_with_trivia(inner).start {
                return tree.tokens().text_of(line_start..range.start);
            }
        }
    }

    indent(tree, aligner) + &default_unit(tree)
}

/// The indentation unit of the tree's source, falling back to the grammar's
pub fn default_unit(tree: &Tree) -> String {
    let grammar = tree.grammar();
    let fallback = if grammar.uses_tabs() {
        "\t".to_string()
    } else {
        " ".repeat(grammar.indent_width())
    };
    indentation_unit(&tree.text(), &fallback)
}

/// Detect the indentation unit of a source.
///
/// A line starting with a tab means tabs. Otherwise the smallest run of
/// leading spaces wins if more than 10% of the indented lines use it.
/// Comment lines are ignored.
pub fn indentation_unit(source: &str, fallback: &str) -> String {
    let mut counts: Vec<(usize, usize)> = Vec::new();
    for line in source.split('\n') {
        if line.is_empty() {
            continue;
        }
        if line.starts_with('\t') {
            return "\t".to_string();
        }
        let content = line.trim_start_matches(' ');
        if content.starts_with('#') || content.starts_with("//") || content.trim().is_empty() {
            continue;
        }
        let width = line.len() - content.len();
        if width > 0 {
            match counts.iter_mut().find(|(w, _)| *w == width) {
                Some((_, count)) => *count += 1,
                None => counts.push((width, 1)),
            }
        }
    }

    let total: usize = counts.iter().map(|(_, count)| count).sum();
    match counts.iter().min_by_key(|(width, _)| *width) {
        Some((width, count)) if *count as f32 / total as f32 > 0.1 => " ".repeat(*width),
        _ => fallback.to_string(),
    }
}

/// Prefix every line start in the node's range (whitespace and comments
/// around it included) with `unit`; blank lines are left alone
pub fn increase_indentation(tree: &mut Tree, node: ContainerId, unit: &str) {
    if unit.is_empty() {
        return;
    }
    let range = tree.token_range_with_trivia(node);
    let (mut index, mut stop) = (range.start, range.end);
    while index < stop {
        if index == 0 || tree.tokens.at(index - 1).is_newline() {
            let token = tree.tokens.at(index);
            if token.is_newline() {
                // blank line
            } else if token.is_whitespace() {
                let text = format!("{}{unit}", token.text());
                let id = tree.tokens.id_at(index);
                tree.tokens.set_text(id, text);
            } else {
                let id = tree.create_token(unit);
                tree.tokens.insert_one(index, id);
                index += 1;
                stop += 1;
            }
        }
        index += 1;
    }
}

/// Strip `unit` from the leading whitespace of every line start in the
/// node's range
pub fn decrease_indentation(tree: &mut Tree, node: ContainerId, unit: &str) {
    if unit.is_empty() {
        return;
    }
    let range = tree.token_range_with_trivia(node);
    let (mut index, mut stop) = (range.start, range.end);
    while index < stop {
        let at_line_start = index == 0 || tree.tokens.at(index - 1).is_newline();
        let token = tree.tokens.at(index);
        if at_line_start && !token.is_newline() && token.is_whitespace() {
            if let Some(rest) = token.text().strip_prefix(unit) {
                let rest = rest.to_string();
                if rest.is_empty() {
                    tree.tokens.remove(index..index + 1);
                    stop -= 1;
                    continue;
                }
                let id = tree.tokens.id_at(index);
                tree.tokens.set_text(id, rest);
            }
        }
        index += 1;
    }
}
