//! Fixed slots separated by a delimiter, e.g. JavaScript's
//! `(positional, {named})` parameters. Slots come and go; the delimiter
//! between two visible slots follows them.

use crate::syntax::{ContainerId, NodeId, TokenId, Tree};

impl Tree {
    pub(crate) fn tuple_elements(&self, id: ContainerId) -> Vec<ContainerId> {
        self.children(id)
            .iter()
            .filter_map(|child| child.as_container())
            .collect()
    }

    fn neighbor_in(&self, tuple: ContainerId, token: Option<TokenId>) -> Option<TokenId> {
        token.filter(|token| self.contains(tuple, *token))
    }

    pub(super) fn tuple_setup_spacing(
        &mut self,
        tuple: ContainerId,
        child: NodeId,
        delimiter: &str,
    ) -> usize {
        let left = self.neighbor_in(tuple, self.right_most_left(child));
        let right = self.neighbor_in(tuple, self.left_most_right(child));
        let child_index = self
            .children(tuple)
            .iter()
            .position(|other| *other == child)
            .unwrap_or(0);

        if let Some(left) = left.and_then(|token| self.tokens.get(token).index()) {
            let separator = self.create_token(delimiter);
            let space = self.create_token(" ");
            self.tokens.insert(left + 1, [separator, space]);
            self.insert_child(tuple, child_index, NodeId::Token(separator));
        } else if let Some(right) = right.and_then(|token| self.tokens.get(token).index()) {
            let separator = self.create_token(delimiter);
            let space = self.create_token(" ");
            self.tokens.insert(right, [separator, space]);
            self.insert_child(tuple, child_index + 1, NodeId::Token(separator));
        }
        self.token_range_with_trivia(child).end
    }

    pub(super) fn tuple_remove_spacing(&mut self, tuple: ContainerId, child: NodeId, delimiter: &str) {
        let is_delimiter =
            |tree: &Tree, token: &TokenId| tree.tokens.get(*token).text() == delimiter;
        let separator = self
            .neighbor_in(tuple, self.right_most_left(child))
            .filter(|token| is_delimiter(self, token))
            .or_else(|| {
                self.neighbor_in(tuple, self.left_most_right(child))
                    .filter(|token| is_delimiter(self, token))
            });
        let Some(separator) = separator else {
            return;
        };
        let removal = self.token_range_with_trivia(separator);
        self.tokens.remove(removal);
        if let Some(parent) = self.parent(separator) {
            self.remove_child(parent, NodeId::Token(separator));
        }
    }
}
