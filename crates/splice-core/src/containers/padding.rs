//! Blank-line policy of line-padded lists
//!
//! A padded list keeps at least the declared number of blank lines between
//! neighboring elements whose kind (or first child's kind) has a rule, e.g.
//! two blank lines around top-level Python definitions. Standalone comments
//! between elements count as neighbors, so the policy is evaluated against
//! what sits visually next to an element.

use std::ops::Range;

use tracing::trace;

use super::ListMut;
use crate::result::Result;
use crate::syntax::{ContainerId, TokenId, Tree};

impl ListMut<'_> {
    pub(super) fn minimum_blank_lines(&self, node: ContainerId) -> usize {
        let Some(rules) = &self.policy.padding else {
            return 0;
        };
        let top_level = self.top_level();
        let kind = self.tree.kind(node);
        let inner = self
            .tree
            .children(node)
            .first()
            .and_then(|child| child.as_container())
            .map(|child| self.tree.kind(child));
        rules
            .iter()
            .filter(|rule| rule.scope.applies(top_level))
            .filter(|rule| rule.kind == kind || Some(rule.kind) == inner)
            .map(|rule| rule.lines)
            .max()
            .unwrap_or(0)
    }

    /// Elements and the comments between them, in stream order
    fn elements_and_standalone_comments(&self) -> Vec<ContainerId> {
        let range = self.tree.token_range_with_trivia(self.id);
        let elements = self.elements();
        let element_ranges: Vec<Range<usize>> = elements
            .iter()
            .filter_map(|element| self.tree.token_range(*element))
            .collect();

        let mut items: Vec<(usize, ContainerId)> = elements
            .iter()
            .filter_map(|element| {
                self.tree
                    .token_range(*element)
                    .map(|visible| (visible.start, *element))
            })
            .collect();
        for comment in self.tree.comments() {
            let Some(visible) = self.tree.token_range(*comment) else {
                continue;
            };
            let standalone = range.start <= visible.start
                && visible.end <= range.end
                && !element_ranges
                    .iter()
                    .any(|element| element.start <= visible.start && visible.end <= element.end);
            if standalone {
                items.push((visible.start, *comment));
            }
        }
        items.sort_by_key(|(start, _)| *start);
        items.into_iter().map(|(_, id)| id).collect()
    }

    /// Blocks of consecutive blank lines inside the list, as line ranges
    fn contiguous_blank_lines(&self) -> Vec<Range<usize>> {
        let tokens = self.tree.tokens();
        let mut blocks: Vec<Range<usize>> = Vec::new();
        for line in tokens.line_ranges(self.tree.token_range_with_trivia(self.id)) {
            if !line.clone().all(|index| tokens.at(index).is_whitespace()) {
                continue;
            }
            match blocks.last_mut() {
                Some(block) if block.end == line.start => block.end = line.end,
                _ => blocks.push(line),
            }
        }
        blocks
            .into_iter()
            .map(|block| {
                let lines = tokens.lines_of(block);
                lines.start..lines.start.max(lines.end - 1)
            })
            .collect()
    }

    pub(super) fn ensure_minimum_separation(
        &mut self,
        left: ContainerId,
        right: ContainerId,
        is_comment: bool,
    ) {
        if !is_comment
            && (!self.policy.accepts(self.tree.kind(left))
                || !self.policy.accepts(self.tree.kind(right)))
        {
            return;
        }
        let minimum = self
            .minimum_blank_lines(left)
            .max(self.minimum_blank_lines(right));
        let (Some(above), Some(below), Some(visible)) = (
            self.tree.line_range(left),
            self.tree.line_range(right),
            self.tree.token_range(right),
        ) else {
            return;
        };
        let blank = below.start.saturating_sub(above.end);
        if blank >= minimum {
            return;
        }
        trace!(blank, minimum, "padding blank lines");
        let line_start = self.tree.tokens.line_start(visible.start);
        let newlines: Vec<TokenId> = (blank..minimum)
            .map(|_| self.tree.tokens.create_newline())
            .collect();
        self.tree.tokens.insert(line_start, newlines);
    }

    fn remove_leading_blank_lines(&mut self, element: ContainerId, max: usize) {
        let Some(start) = self.tree.line_range(element).map(|lines| lines.start) else {
            return;
        };
        let block = self
            .contiguous_blank_lines()
            .into_iter()
            .find(|block| block.end == start)
            .unwrap_or(0..0);
        let lines = block.start.max(block.end.saturating_sub(max))..block.end;
        let removal = self.tree.tokens.lines_to_token_range(lines);
        self.tree.tokens.remove(removal);
    }

    fn remove_trailing_blank_lines(&mut self, element: ContainerId, max: usize) {
        let Some(stop) = self.tree.line_range(element).map(|lines| lines.end) else {
            return;
        };
        let block = self
            .contiguous_blank_lines()
            .into_iter()
            .find(|block| block.start == stop)
            .unwrap_or(0..0);
        let lines = block.start..block.end.min(block.start + max);
        let removal = self.tree.tokens.lines_to_token_range(lines);
        self.tree.tokens.remove(removal);
    }

    /// Restore the minimum separation around a freshly added element or
    /// standalone comment
    pub(super) fn pad_around(&mut self, added: ContainerId, is_comment: bool) {
        let items = self.elements_and_standalone_comments();
        let Some(index) = items.iter().position(|item| *item == added) else {
            return;
        };
        if index > 0 {
            self.ensure_minimum_separation(items[index - 1], items[index], is_comment);
        }
        if index + 1 < items.len() {
            self.ensure_minimum_separation(items[index], items[index + 1], false);
        }
    }

    /// Remove an element together with the blank lines its rule demanded,
    /// then re-pad its former neighbors
    pub(super) fn remove_padded(&mut self, element: ContainerId) -> Result<Tree> {
        let max = self.minimum_blank_lines(element);
        let elements = self.elements();
        let index = elements
            .iter()
            .position(|other| *other == element)
            .unwrap_or(elements.len());
        if index + 1 < elements.len() {
            self.remove_trailing_blank_lines(element, max);
        }
        if index != 0 {
            self.remove_leading_blank_lines(element, max);
        }

        let fragment = self.remove_element(element)?;
        let elements = self.elements();
        if index > 0 && index < elements.len() {
            self.ensure_minimum_separation(elements[index - 1], elements[index], false);
        }
        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::python;
    use crate::syntax::{SyntaxKind, Tree, TreeBuilder};

    fn functions(source: &str, names: &[&str]) -> Tree {
        let mut builder = TreeBuilder::new(python(), source);
        builder.node(SyntaxKind::Program, |b| {
            b.node(SyntaxKind::StatementList, |b| {
                for name in names {
                    b.node(SyntaxKind::Statement, |b| {
                        b.node(SyntaxKind::Function, |b| {
                            b.tokens(&["def", name, "(", ")", ":"]);
                            b.node(SyntaxKind::EnclosedBody, |b| {
                                b.node(SyntaxKind::StatementList, |b| {
                                    b.node(SyntaxKind::Statement, |b| {
                                        b.token("pass");
                                    });
                                });
                            });
                        });
                    });
                }
            });
        });
        builder.finish().unwrap()
    }

    fn function(name: &str) -> Tree {
        Tree::from_source(
            python(),
            SyntaxKind::Function,
            &format!("def {name}():\n    pass"),
        )
    }

    #[test]
    fn test_top_level_functions_get_two_blank_lines() {
        let mut tree = functions("def a():\n    pass\n", &["a"]);
        let list = tree.find(SyntaxKind::StatementList).unwrap();
        assert_eq!(tree.available_lines(list).unwrap(), vec![0, 2, 3]);

        tree.list_mut(list).unwrap().add_at_line(2, function("b")).unwrap();
        assert_eq!(tree.text(), "def a():\n    pass\n\n\ndef b():\n    pass\n");
    }

    #[test]
    fn test_removal_strips_required_blank_lines() {
        let source = "def a():\n    pass\n\n\ndef b():\n    pass\n";
        let mut tree = functions(source, &["a", "b"]);
        let list = tree.find(SyntaxKind::StatementList).unwrap();
        let second = tree.elements(list)[1];
        tree.list_mut(list).unwrap().remove(second).unwrap();
        assert_eq!(tree.text(), "def a():\n    pass\n");
    }

    #[test]
    fn test_removing_middle_keeps_minimum() {
        let source = "def a():\n    pass\n\n\ndef b():\n    pass\n\n\ndef c():\n    pass\n";
        let mut tree = functions(source, &["a", "b", "c"]);
        let list = tree.find(SyntaxKind::StatementList).unwrap();
        let middle = tree.elements(list)[1];
        tree.list_mut(list).unwrap().remove(middle).unwrap();
        assert_eq!(tree.text(), "def a():\n    pass\n\n\ndef c():\n    pass\n");
    }
}
