use tracing::debug;

use crate::error::SpliceError;
use crate::grammar::{OptionalPolicy, Placement};
use crate::indent;
use crate::result::Result;
use crate::syntax::{ContainerId, NodeId, SyntaxKind, TokenId, Tree};

/// Edit handle for an optional container, see [`Tree::optional_mut`]
#[derive(Debug)]
pub struct OptionalMut<'a> {
    tree: &'a mut Tree,
    id: ContainerId,
    policy: OptionalPolicy,
}

impl Tree {
    pub(crate) fn optional_element(
        &self,
        id: ContainerId,
        policy: &OptionalPolicy,
    ) -> Option<ContainerId> {
        self.children(id)
            .iter()
            .filter_map(|child| child.as_container())
            .find(|child| self.kind(*child) == policy.element)
    }
}

impl<'a> OptionalMut<'a> {
    pub(crate) fn new(tree: &'a mut Tree, id: ContainerId, policy: OptionalPolicy) -> Self {
        Self { tree, id, policy }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn policy(&self) -> &OptionalPolicy {
        &self.policy
    }

    pub fn element(&self) -> Option<ContainerId> {
        self.tree.optional_element(self.id, &self.policy)
    }

    pub fn is_present(&self) -> bool {
        self.tree.is_visible(self.id)
    }

    pub fn can_add(&self, kind: SyntaxKind) -> bool {
        self.policy.accepts(kind)
    }

    fn kind(&self) -> SyntaxKind {
        self.tree.kind(self.id)
    }

    /// Make the optional present with `fragment` as its element, replacing
    /// the current one. Returns the element.
    pub fn set(&mut self, fragment: Tree) -> Result<ContainerId> {
        let kind = fragment.kind(fragment.root());
        if !self.policy.accepts(kind) {
            return Err(SpliceError::kind_mismatch(self.kind(), kind));
        }
        debug!(optional = %self.kind(), %kind, present = self.is_present(), "setting optional");

        if self.is_present() || !self.tree.children(self.id).is_empty() {
            self.clear()?;
        }
        let mut fragment = fragment;
        if kind != self.policy.element {
            fragment.wrap_root(self.policy.element);
        }

        // A clause after content that ends the source without a newline
        let mut line_break = None;
        let index = match self.policy.placement {
            Placement::Spaced => self.tree.setup_spacing_before_becoming_visible(self.id),
            Placement::Adjacent => self.tree.token_range_with_trivia(self.id).start,
            Placement::Multiline => {
                let trivia = self.tree.token_range_with_trivia(self.id);
                match self
                    .tree
                    .tokens
                    .next_newline(trivia.start)
                    .filter(|newline| *newline < trivia.end)
                {
                    Some(newline) => newline + 1,
                    None => {
                        line_break = Some(self.tree.tokens.create_newline());
                        trivia.end
                    }
                }
            }
            Placement::TrailingInline => {
                let trivia = self.tree.token_range_with_trivia(self.id);
                self.tree
                    .tokens
                    .next_newline(trivia.start)
                    .filter(|newline| *newline < trivia.end)
                    .unwrap_or(trivia.end)
            }
        };

        let (root, content) = match self.policy.placement {
            Placement::Multiline => {
                let unit = indent::indent(self.tree, self.id);
                let root = fragment.root();
                indent::increase_indentation(&mut fragment, root, &unit);
                fragment.ensure_trailing_newline();
                let graft = self.tree.graft(fragment);
                (graft.root, graft.tokens)
            }
            Placement::TrailingInline => {
                let unit = indent::indent(self.tree, self.id);
                let root = fragment.root();
                indent::increase_indentation(&mut fragment, root, &unit);
                let graft = self.tree.graft_visible(fragment);
                let space = self.tree.create_token(" ");
                (graft.root, std::iter::once(space).chain(graft.tokens).collect())
            }
            Placement::Spaced | Placement::Adjacent => {
                let graft = self.tree.graft_visible(fragment);
                (graft.root, graft.tokens)
            }
        };

        let prefix = self.tree.literal(self.policy.prefix);
        let postfix = self.tree.literal(self.policy.postfix);
        let tokens: Vec<TokenId> = line_break
            .into_iter()
            .chain(prefix)
            .chain(content)
            .chain(postfix)
            .collect();
        self.tree.tokens.insert(index, tokens);

        if let Some(prefix) = prefix {
            self.tree.push_child(self.id, NodeId::Token(prefix));
        }
        self.tree.push_child(self.id, NodeId::Container(root));
        if let Some(postfix) = postfix {
            self.tree.push_child(self.id, NodeId::Token(postfix));
        }
        self.tree.update_comments();
        Ok(root)
    }

    /// Make the optional absent, taking its prefix, postfix and the
    /// separating whitespace with the element
    pub fn clear(&mut self) -> Result<()> {
        let Some(range) = self.tree.token_range(self.id) else {
            self.tree.clear_children(self.id);
            return Ok(());
        };
        debug!(optional = %self.kind(), "clearing optional");

        match self.policy.placement {
            Placement::Multiline | Placement::TrailingInline => {
                let tokens = &self.tree.tokens;
                let start = tokens.expand_left_on_line(range.start);
                let mut stop = tokens.expand_right_on_line(range.end);
                if start > 0 && tokens.at(start - 1).is_newline() && stop < tokens.len() {
                    stop += 1;
                }
                self.tree.tokens.remove(start..stop);
            }
            Placement::Spaced => {
                self.tree.remove_spacing_before_becoming_invisible(self.id);
                if let Some(range) = self.tree.token_range(self.id) {
                    self.tree.tokens.remove(range);
                }
            }
            Placement::Adjacent => {
                self.tree.tokens.remove(range);
            }
        }
        self.tree.clear_children(self.id);
        self.tree.update_comments();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::SpliceError;
    use crate::grammar::{javascript, python};
    use crate::syntax::{SyntaxKind, Tree, TreeBuilder};

    fn js_class(source: &str) -> Tree {
        let mut builder = TreeBuilder::new(javascript(), source);
        builder.node(SyntaxKind::Program, |b| {
            b.node(SyntaxKind::Class, |b| {
                b.token("class");
                b.node(SyntaxKind::Identifier, |b| {
                    b.token("A");
                });
                b.node(SyntaxKind::ExtendsOptional, |_| {});
                b.node(SyntaxKind::EnclosedBody, |b| {
                    b.tokens(&["{", "}"]);
                });
            });
        });
        builder.finish().unwrap()
    }

    #[test]
    fn test_set_then_replace_extends() {
        let mut tree = js_class("class A {}\n");
        let extends = tree.find(SyntaxKind::ExtendsOptional).unwrap();

        let base = Tree::from_source(javascript(), SyntaxKind::Type, "Base");
        tree.optional_mut(extends).unwrap().set(base).unwrap();
        assert_eq!(tree.text(), "class A extends Base {}\n");

        let other = Tree::from_source(javascript(), SyntaxKind::Type, "Other");
        let element = tree.optional_mut(extends).unwrap().set(other).unwrap();
        assert_eq!(tree.text(), "class A extends Other {}\n");
        assert_eq!(tree.kind(element), SyntaxKind::ExtendsType);

        tree.optional_mut(extends).unwrap().clear().unwrap();
        assert_eq!(tree.text(), "class A {}\n");
        assert!(tree.children(extends).is_empty());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut tree = js_class("class A {}\n");
        let extends = tree.find(SyntaxKind::ExtendsOptional).unwrap();
        tree.optional_mut(extends).unwrap().clear().unwrap();
        tree.optional_mut(extends).unwrap().clear().unwrap();
        assert_eq!(tree.text(), "class A {}\n");
    }

    #[test]
    fn test_python_base_class_is_enclosed() {
        let mut builder = TreeBuilder::new(python(), "class A:\n    pass\n");
        builder.node(SyntaxKind::Program, |b| {
            b.node(SyntaxKind::Class, |b| {
                b.token("class");
                b.node(SyntaxKind::Identifier, |b| {
                    b.token("A");
                });
                b.node(SyntaxKind::ExtendsListOptional, |_| {});
                b.token(":");
                b.node(SyntaxKind::EnclosedBody, |b| {
                    b.node(SyntaxKind::ClassMemberList, |b| {
                        b.node(SyntaxKind::Member, |b| {
                            b.token("pass");
                        });
                    });
                });
            });
        });
        let mut tree = builder.finish().unwrap();
        let extends = tree.find(SyntaxKind::ExtendsListOptional).unwrap();
        let base = Tree::from_source(python(), SyntaxKind::ExtendsType, "Base");
        tree.optional_mut(extends).unwrap().set(base).unwrap();
        assert_eq!(tree.text(), "class A(Base):\n    pass\n");

        let list = tree.find(SyntaxKind::ExtendsList).unwrap();
        assert_eq!(tree.elements(list).len(), 1);
    }

    #[test]
    fn test_python_else_goes_on_its_own_line() {
        let mut builder = TreeBuilder::new(python(), "if x:\n    a\n");
        builder.node(SyntaxKind::Program, |b| {
            b.node(SyntaxKind::If, |b| {
                b.tokens(&["if", "x", ":"]);
                b.node(SyntaxKind::EnclosedBody, |b| {
                    b.node(SyntaxKind::StatementList, |b| {
                        b.node(SyntaxKind::Statement, |b| {
                            b.token("a");
                        });
                    });
                });
                b.node(SyntaxKind::ElseClauseOptional, |_| {});
            });
        });
        let mut tree = builder.finish().unwrap();
        let optional = tree.find(SyntaxKind::ElseClauseOptional).unwrap();
        let clause = Tree::from_source(python(), SyntaxKind::ElseClause, "else:\n    b");
        tree.optional_mut(optional).unwrap().set(clause).unwrap();
        assert_eq!(tree.text(), "if x:\n    a\nelse:\n    b\n");

        tree.remove(optional).unwrap();
        assert_eq!(tree.text(), "if x:\n    a\n");
    }

    #[test]
    fn test_python_else_after_unterminated_last_line() {
        let mut builder = TreeBuilder::new(python(), "if x:\n    a");
        builder.node(SyntaxKind::Program, |b| {
            b.node(SyntaxKind::If, |b| {
                b.tokens(&["if", "x", ":"]);
                b.node(SyntaxKind::EnclosedBody, |b| {
                    b.node(SyntaxKind::StatementList, |b| {
                        b.node(SyntaxKind::Statement, |b| {
                            b.token("a");
                        });
                    });
                });
                b.node(SyntaxKind::ElseClauseOptional, |_| {});
            });
        });
        let mut tree = builder.finish().unwrap();
        let optional = tree.find(SyntaxKind::ElseClauseOptional).unwrap();
        let clause = Tree::from_source(python(), SyntaxKind::ElseClause, "else:\n    b");
        tree.optional_mut(optional).unwrap().set(clause).unwrap();
        assert_eq!(tree.text(), "if x:\n    a\nelse:\n    b\n");

        tree.optional_mut(optional).unwrap().clear().unwrap();
        assert_eq!(tree.text(), "if x:\n    a\n");
    }

    #[test]
    fn test_javascript_else_follows_the_brace() {
        let mut builder = TreeBuilder::new(javascript(), "if (x) {\n  a();\n}\n");
        builder.node(SyntaxKind::Program, |b| {
            b.node(SyntaxKind::If, |b| {
                b.tokens(&["if", "(", "x", ")"]);
                b.node(SyntaxKind::EnclosedBody, |b| {
                    b.token("{");
                    b.node(SyntaxKind::StatementList, |b| {
                        b.node(SyntaxKind::Statement, |b| {
                            b.tokens(&["a", "(", ")", ";"]);
                        });
                    });
                    b.token("}");
                });
                b.node(SyntaxKind::ElseClauseOptional, |_| {});
            });
        });
        let mut tree = builder.finish().unwrap();
        let optional = tree.find(SyntaxKind::ElseClauseOptional).unwrap();
        let clause = Tree::from_source(javascript(), SyntaxKind::ElseClause, "else {}");
        tree.optional_mut(optional).unwrap().set(clause).unwrap();
        assert_eq!(tree.text(), "if (x) {\n  a();\n} else {}\n");

        tree.optional_mut(optional).unwrap().clear().unwrap();
        assert_eq!(tree.text(), "if (x) {\n  a();\n}\n");
    }

    #[test]
    fn test_adjacent_type_annotation() {
        let mut builder = TreeBuilder::new(python(), "def f(x):\n    pass\n");
        builder.node(SyntaxKind::Program, |b| {
            b.node(SyntaxKind::Function, |b| {
                b.tokens(&["def", "f", "("]);
                b.node(SyntaxKind::ParameterList, |b| {
                    b.node(SyntaxKind::Parameter, |b| {
                        b.token("x");
                        b.node(SyntaxKind::TypeOptional, |_| {});
                    });
                });
                b.tokens(&[")", ":"]);
                b.node(SyntaxKind::EnclosedBody, |b| {
                    b.node(SyntaxKind::StatementList, |b| {
                        b.node(SyntaxKind::Statement, |b| {
                            b.token("pass");
                        });
                    });
                });
            });
        });
        let mut tree = builder.finish().unwrap();
        let optional = tree.find(SyntaxKind::TypeOptional).unwrap();
        let annotation = Tree::from_source(python(), SyntaxKind::Type, "int");
        tree.optional_mut(optional).unwrap().set(annotation).unwrap();
        assert_eq!(tree.text(), "def f(x: int):\n    pass\n");

        tree.optional_mut(optional).unwrap().clear().unwrap();
        assert_eq!(tree.text(), "def f(x):\n    pass\n");
    }

    #[test]
    fn test_set_rejects_foreign_kinds() {
        let mut tree = js_class("class A {}\n");
        let extends = tree.find(SyntaxKind::ExtendsOptional).unwrap();
        let call = Tree::from_source(javascript(), SyntaxKind::Call, "f()");
        let result = tree.optional_mut(extends).unwrap().set(call);
        assert!(matches!(result, Err(SpliceError::KindMismatch { .. })));
        assert_eq!(tree.text(), "class A {}\n");
    }
}
