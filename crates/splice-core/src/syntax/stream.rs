//! Token stream
//!
//! The stream is the single source of truth for the text of a tree: every
//! byte of the source belongs to exactly one token, and concatenating the
//! tokens in order reproduces the source. Structural nodes only reference
//! tokens by [`TokenId`].
//!
//! After every mutation the stream recomputes, for every token, its byte
//! range, the number of newlines before it (its zero-based line) and its
//! position in the stream. This is O(tokens) per edit.
//!
//! Line queries work on *token* positions: a line is the run of tokens
//! between two newline tokens, the newline included at its end.

use std::collections::HashSet;
use std::ops::Range;

use biome_text_size::{TextRange, TextSize};

use super::node::{ContainerId, TokenId};

/// Check whether text is empty or made only of whitespace
pub fn is_whitespace(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// An atomic unit of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: String,
    newline: bool,
    pub(crate) parent: Option<ContainerId>,
    range: TextRange,
    prior_newlines: usize,
    index: Option<usize>,
}

impl Token {
    fn new(text: String) -> Self {
        Self {
            newline: text == "\n",
            text,
            parent: None,
            range: TextRange::default(),
            prior_newlines: 0,
            index: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether this token is a line break
    pub fn is_newline(&self) -> bool {
        self.newline
    }

    /// Whether this token is whitespace (newlines included)
    pub fn is_whitespace(&self) -> bool {
        is_whitespace(&self.text)
    }

    /// Byte range in the current source
    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Zero-based line, i.e. the number of newline tokens before this one
    pub fn line(&self) -> usize {
        self.prior_newlines
    }

    /// Position in the stream, `None` once the token has been removed
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Owning container, `None` for hidden tokens
    pub fn parent(&self) -> Option<ContainerId> {
        self.parent
    }
}

/// Ordered, mutable sequence of every token of a tree
#[derive(Debug, Clone, Default)]
pub struct TokenStream {
    slab: Vec<Token>,
    order: Vec<TokenId>,
}

impl TokenStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a token that is not yet part of the sequence
    pub(crate) fn create(&mut self, text: impl Into<String>) -> TokenId {
        let id = TokenId::new(self.slab.len());
        self.slab.push(Token::new(text.into()));
        id
    }

    pub(crate) fn create_newline(&mut self) -> TokenId {
        self.create("\n")
    }

    /// Number of tokens currently in the sequence
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Number of allocated tokens, including removed ones
    pub(crate) fn allocated(&self) -> usize {
        self.slab.len()
    }

    pub fn get(&self, id: TokenId) -> &Token {
        &self.slab[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: TokenId) -> &mut Token {
        &mut self.slab[id.index()]
    }

    /// Token id at a stream position
    pub fn id_at(&self, index: usize) -> TokenId {
        self.order[index]
    }

    /// Token at a stream position
    pub fn at(&self, index: usize) -> &Token {
        self.get(self.order[index])
    }

    pub fn ids(&self) -> &[TokenId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &Token)> + '_ {
        self.order.iter().map(|id| (*id, self.get(*id)))
    }

    pub fn contains(&self, id: TokenId) -> bool {
        self.get(id).index.is_some()
    }

    /// Insert tokens at a position
    pub(crate) fn insert(&mut self, index: usize, ids: impl IntoIterator<Item = TokenId>) {
        let tail = self.order.split_off(index);
        self.order.extend(ids);
        self.order.extend(tail);
        self.update_invariants();
    }

    pub(crate) fn insert_one(&mut self, index: usize, id: TokenId) {
        self.insert(index, std::iter::once(id));
    }

    /// Remove a range of positions, returning the removed ids in order
    pub(crate) fn remove(&mut self, range: Range<usize>) -> Vec<TokenId> {
        let removed: Vec<TokenId> = self.order.drain(range).collect();
        for id in &removed {
            self.get_mut(*id).index = None;
        }
        self.update_invariants();
        removed
    }

    /// Remove specific tokens wherever they are
    pub(crate) fn remove_ids(&mut self, ids: &[TokenId]) {
        if ids.is_empty() {
            return;
        }
        let removed: HashSet<TokenId> = ids.iter().copied().collect();
        for id in &removed {
            self.get_mut(*id).index = None;
        }
        self.order.retain(|id| !removed.contains(id));
        self.update_invariants();
    }

    /// Replace the token at a position with another one
    pub(crate) fn replace(&mut self, index: usize, id: TokenId) -> TokenId {
        let old = std::mem::replace(&mut self.order[index], id);
        self.get_mut(old).index = None;
        self.update_invariants();
        old
    }

    /// Change the text of a token in place
    pub(crate) fn set_text(&mut self, id: TokenId, text: impl Into<String>) {
        let token = self.get_mut(id);
        token.text = text.into();
        token.newline = token.text == "\n";
        self.update_invariants();
    }

    fn update_invariants(&mut self) {
        let mut offset = TextSize::from(0);
        let mut prior_newlines = 0;
        for (index, id) in self.order.iter().enumerate() {
            let token = &mut self.slab[id.index()];
            token.range = TextRange::at(offset, TextSize::of(token.text.as_str()));
            token.prior_newlines = prior_newlines;
            token.index = Some(index);
            offset = token.range.end();
            if token.newline {
                prior_newlines += 1;
            }
        }
    }

    /// Full text of the stream
    pub fn text(&self) -> String {
        self.text_of(0..self.len())
    }

    /// Text of a range of positions
    pub fn text_of(&self, range: Range<usize>) -> String {
        self.order[range]
            .iter()
            .map(|id| self.get(*id).text())
            .collect()
    }

    /// Number of lines, an empty stream has one
    pub fn line_count(&self) -> usize {
        self.order
            .last()
            .map_or(1, |id| self.get(*id).prior_newlines + 1)
    }

    /// Line of the token at a position; the end of the stream maps to the
    /// line following the last newline
    pub fn line_of(&self, index: usize) -> usize {
        if index < self.len() {
            return self.at(index).prior_newlines;
        }
        match self.order.last() {
            Some(id) => {
                let last = self.get(*id);
                last.prior_newlines + usize::from(last.newline)
            }
            None => 0,
        }
    }

    /// Lines touched by a range of token positions
    pub fn lines_of(&self, range: Range<usize>) -> Range<usize> {
        if self.is_empty() {
            return 0..0;
        }
        let mut stop = 1;
        if range.end > 0 {
            let before_stop = self.at(range.end - 1);
            stop = before_stop.prior_newlines + 1;
            if before_stop.newline {
                stop += 1;
            }
        }
        self.line_of(range.start)..stop
    }

    /// Token positions of a line, excluding its trailing newline
    pub fn line_token_range(&self, line: usize) -> Range<usize> {
        let start = if line == 0 {
            0
        } else {
            self.iter()
                .position(|(_, token)| token.newline && token.prior_newlines == line - 1)
                .map_or(self.len(), |index| index + 1)
        };
        start..self.line_end(start)
    }

    /// Token positions covering whole lines, trailing newlines included
    pub fn lines_to_token_range(&self, lines: Range<usize>) -> Range<usize> {
        let start = self.line_token_range(lines.start).start;
        if lines.is_empty() {
            return start..start;
        }
        let stop = (self.line_token_range(lines.end - 1).end + 1).min(self.len());
        start..stop
    }

    /// Byte range of a line, without its newline
    pub fn line_text_range(&self, line: usize) -> TextRange {
        let tokens = self.line_token_range(line);
        let start = self.offset_at(tokens.start);
        let end = self.offset_at(tokens.end);
        TextRange::new(start, end)
    }

    /// Byte offset of a position; the end of the stream maps to the text length
    pub fn offset_at(&self, index: usize) -> TextSize {
        if index < self.len() {
            self.at(index).range.start()
        } else {
            self.order
                .last()
                .map_or(TextSize::from(0), |id| self.get(*id).range.end())
        }
    }

    /// Whether every token of a line is whitespace
    pub fn is_blank_line(&self, line: usize) -> bool {
        let range = self.line_token_range(line);
        range.into_iter().all(|index| self.at(index).is_whitespace())
    }

    /// Position of the closest newline strictly before `position`
    pub fn previous_newline(&self, position: usize) -> Option<usize> {
        (0..position.min(self.len()))
            .rev()
            .find(|index| self.at(*index).newline)
    }

    /// Position of the first newline at or after `position`
    pub fn next_newline(&self, position: usize) -> Option<usize> {
        (position..self.len()).find(|index| self.at(*index).newline)
    }

    /// First position of the line containing `position`
    pub fn line_start(&self, position: usize) -> usize {
        self.previous_newline(position).map_or(0, |index| index + 1)
    }

    /// Position of the newline ending the line containing `position`, or the
    /// stream length on the last line
    pub fn line_end(&self, position: usize) -> usize {
        self.next_newline(position).unwrap_or(self.len())
    }

    /// Walk left from `position` over non-newline whitespace
    pub fn expand_left_on_line(&self, position: usize) -> usize {
        let mut position = position;
        while position > 0 {
            let token = self.at(position - 1);
            if token.newline || !token.is_whitespace() {
                break;
            }
            position -= 1;
        }
        position
    }

    /// Walk right from `position` over non-newline whitespace
    pub fn expand_right_on_line(&self, position: usize) -> usize {
        let mut position = position;
        while position < self.len() {
            let token = self.at(position);
            if token.newline || !token.is_whitespace() {
                break;
            }
            position += 1;
        }
        position
    }

    /// Full lines, newline included, whose start lies in `eligible`
    pub fn line_ranges(&self, eligible: Range<usize>) -> Vec<Range<usize>> {
        let mut start = eligible.start;
        while start < self.len() && !(start == 0 || self.at(start - 1).newline) {
            start += 1;
        }
        if start >= self.len() {
            return Vec::new();
        }

        let mut ranges = Vec::new();
        let mut next_start = start;
        for index in start..eligible.end.min(self.len()) {
            if self.at(index).newline {
                ranges.push(next_start..index + 1);
                next_start = index + 1;
            }
        }
        ranges
    }

    /// Grow a removal range over adjacent whitespace on one side only.
    ///
    /// The left side wins and may swallow the newline ending the previous
    /// line; otherwise the right side is extended up to and including the
    /// newline ending the current line.
    pub fn include_line_whitespace_on_one_side(&self, range: Range<usize>) -> Range<usize> {
        let mut left = range.start;
        while left > 0 && self.at(left - 1).is_whitespace() {
            left -= 1;
        }
        let line_start = self.line_start(range.start);
        let start = left.max(line_start.saturating_sub(1));
        if start != range.start {
            return start..range.end;
        }

        let mut right = range.end;
        while right < self.len() && self.at(right).is_whitespace() {
            right += 1;
        }
        let stop = right.min(self.line_end(range.end) + 1);
        range.start..stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(parts: &[&str]) -> TokenStream {
        let mut stream = TokenStream::new();
        let ids: Vec<TokenId> = parts.iter().map(|part| stream.create(*part)).collect();
        stream.insert(0, ids);
        stream
    }

    #[test]
    fn test_invariants_after_insert() {
        let mut tokens = stream(&["def", " ", "foo", "\n", "pass", "\n"]);
        assert_eq!(tokens.text(), "def foo\npass\n");
        assert_eq!(tokens.at(4).line(), 1);
        assert_eq!(tokens.at(4).range(), TextRange::new(8.into(), 12.into()));

        let id = tokens.create("# c");
        tokens.insert_one(3, id);
        assert_eq!(tokens.text(), "def foo# c\npass\n");
        assert_eq!(tokens.get(id).index(), Some(3));
        assert_eq!(tokens.at(5).index(), Some(5));
    }

    #[test]
    fn test_removed_tokens_lose_their_index() {
        let mut tokens = stream(&["a", " ", "b"]);
        let removed = tokens.remove(0..2);
        assert_eq!(tokens.text(), "b");
        assert!(removed.iter().all(|id| !tokens.contains(*id)));
        assert_eq!(tokens.at(0).range().start(), TextSize::from(0));
    }

    #[test]
    fn test_line_queries() {
        let tokens = stream(&["a", "\n", "  ", "\n", "b", " ", "c", "\n"]);
        assert_eq!(tokens.line_count(), 3);
        assert_eq!(tokens.line_token_range(0), 0..1);
        assert_eq!(tokens.line_token_range(1), 2..3);
        assert_eq!(tokens.line_token_range(2), 4..7);
        assert_eq!(tokens.line_token_range(3), 8..8);
        assert!(tokens.is_blank_line(1));
        assert!(!tokens.is_blank_line(2));
        assert_eq!(tokens.lines_of(4..7), 2..3);
        assert_eq!(tokens.lines_of(0..8), 0..4);
        assert_eq!(tokens.lines_to_token_range(1..2), 2..4);
        assert_eq!(tokens.line_start(6), 4);
        assert_eq!(tokens.line_end(4), 7);
        assert_eq!(tokens.previous_newline(1), None);
        assert_eq!(tokens.next_newline(4), Some(7));
        assert_eq!(tokens.line_of(8), 3);
        assert_eq!(
            tokens.line_text_range(2),
            TextRange::new(5.into(), 8.into())
        );
    }

    #[test]
    fn test_line_ranges_skip_partial_first_line() {
        let tokens = stream(&["a", " ", "b", "\n", "c", "\n"]);
        assert_eq!(tokens.line_ranges(1..6), vec![4..6]);
        assert_eq!(tokens.line_ranges(0..6), vec![0..4, 4..6]);
    }

    #[test]
    fn test_expand_on_line_stops_at_newlines() {
        let tokens = stream(&["a", "\n", "  ", "b", " ", "\n"]);
        assert_eq!(tokens.expand_left_on_line(3), 2);
        assert_eq!(tokens.expand_right_on_line(4), 5);
    }

    #[test]
    fn test_line_whitespace_prefers_left() {
        let tokens = stream(&["import", " ", "a", "\n", "import", " ", "b", "\n"]);
        assert_eq!(tokens.include_line_whitespace_on_one_side(4..7), 3..7);
        assert_eq!(tokens.include_line_whitespace_on_one_side(0..3), 0..4);
    }

    #[test]
    fn test_set_text_updates_offsets() {
        let mut tokens = stream(&["  ", "x", "\n"]);
        let id = tokens.id_at(0);
        tokens.set_text(id, "    ");
        assert_eq!(tokens.text(), "    x\n");
        assert_eq!(tokens.at(1).range().start(), TextSize::from(4));
    }
}
