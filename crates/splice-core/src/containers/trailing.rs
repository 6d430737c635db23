//! Lists of clauses hanging off a block, like `elif`/`except` in Python or
//! `else if`/`catch` in JavaScript.
//!
//! Clauses either go on their own lines (Python) or continue the closing
//! brace's line (`} catch (e) {`). The first existing clause decides which
//! style the list follows; an empty list uses the grammar's default.

use tracing::trace;

use super::ListMut;
use crate::error::SpliceError;
use crate::grammar::ListPolicy;
use crate::indent;
use crate::result::Result;
use crate::syntax::{ContainerId, Tree};

impl Tree {
    /// Whether clauses start on their own line
    pub(crate) fn newline_spacing(&self, id: ContainerId, policy: &ListPolicy) -> bool {
        let elements = self.list_elements(id, policy);
        let Some(first) = elements.first().and_then(|first| self.token_range(*first)) else {
            return policy.multiline;
        };
        let trivia = self.token_range_with_trivia(id);
        self.tokens.line_of(trivia.start) != self.tokens.line_of(first.start)
    }

    /// Lines where an inline clause can start: the start line of every
    /// existing clause, then the stop line of the last one
    pub(crate) fn inline_clause_lines(&self, id: ContainerId, policy: &ListPolicy) -> Vec<usize> {
        let ranges: Vec<_> = self
            .list_elements(id, policy)
            .into_iter()
            .filter_map(|element| self.line_range(element))
            .collect();
        let Some(last) = ranges.last() else {
            let trivia = self.token_range_with_trivia(id);
            return vec![self.tokens.line_of(trivia.start)];
        };
        // The line after the last clause appends behind it
        let mut lines: Vec<usize> = ranges.iter().map(|range| range.start).collect();
        lines.push(last.end);
        lines
    }
}

impl ListMut<'_> {
    pub(super) fn add_inline_clause(&mut self, line: usize, mut fragment: Tree) -> Result<ContainerId> {
        let available = self.available_lines();
        if !available.contains(&line) {
            return Err(SpliceError::line_unavailable(line, available));
        }
        let elements = self.elements();
        let index = elements
            .iter()
            .position(|element| {
                self.tree
                    .line_range(*element)
                    .is_some_and(|range| range.start == line)
            })
            .unwrap_or(elements.len());
        trace!(line, index, "inline clause");

        let unit = indent::indent(self.tree, self.id);
        let root = fragment.root();
        indent::increase_indentation(&mut fragment, root, &unit);
        while !fragment.tokens.is_empty() && fragment.tokens.at(0).is_whitespace() {
            fragment.tokens.remove(0..1);
        }
        self.add(index, fragment)
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::javascript;
    use crate::syntax::{SyntaxKind, Tree, TreeBuilder};

    fn try_catch(source: &str, catches: usize) -> Tree {
        let mut builder = TreeBuilder::new(javascript(), source);
        builder.node(SyntaxKind::Program, |b| {
            b.node(SyntaxKind::Try, |b| {
                b.token("try");
                b.node(SyntaxKind::EnclosedBody, |b| {
                    b.tokens(&["{", "}"]);
                });
                b.node(SyntaxKind::CatchClauseList, |b| {
                    for _ in 0..catches {
                        b.node(SyntaxKind::CatchClause, |b| {
                            b.tokens(&["catch", "{", "}"]);
                        });
                    }
                });
            });
        });
        builder.finish().unwrap()
    }

    #[test]
    fn test_first_catch_goes_after_the_brace() {
        let mut tree = try_catch("try {}\n", 0);
        let list = tree.find(SyntaxKind::CatchClauseList).unwrap();
        assert_eq!(tree.available_lines(list).unwrap(), vec![0]);

        let clause = Tree::from_source(javascript(), SyntaxKind::CatchClause, "catch {}");
        tree.list_mut(list).unwrap().add_at_line(0, clause).unwrap();
        assert_eq!(tree.text(), "try {} catch {}\n");
    }

    #[test]
    fn test_clause_before_existing_one() {
        let mut tree = try_catch("try {} catch {}\n", 1);
        let list = tree.find(SyntaxKind::CatchClauseList).unwrap();
        let clause = Tree::from_source(javascript(), SyntaxKind::CatchClause, "catch {}");
        tree.list_mut(list).unwrap().add_at_line(0, clause).unwrap();
        assert_eq!(tree.text(), "try {} catch {} catch {}\n");
        assert_eq!(tree.elements(list).len(), 2);
    }

    #[test]
    fn test_clause_appended_after_single_line_clause() {
        let mut tree = try_catch("try {} catch {}\n", 1);
        let list = tree.find(SyntaxKind::CatchClauseList).unwrap();
        assert_eq!(tree.available_lines(list).unwrap(), vec![0, 1]);

        let existing = tree.elements(list)[0];
        let clause = Tree::from_source(javascript(), SyntaxKind::CatchClause, "catch (e) {}");
        let added = tree.list_mut(list).unwrap().add_at_line(1, clause).unwrap();
        assert_eq!(tree.text(), "try {} catch {} catch (e) {}\n");
        assert_eq!(tree.elements(list), vec![existing, added]);

        tree.list_mut(list).unwrap().remove(added).unwrap();
        assert_eq!(tree.text(), "try {} catch {}\n");
    }
}
