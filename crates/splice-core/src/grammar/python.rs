use std::sync::{Arc, OnceLock};

use super::{ChildSpacing, Grammar, Language, ListPolicy, OptionalPolicy, Placement, Scope, Shape};
use crate::syntax::SyntaxKind::{self, *};

const STATEMENTS: &[SyntaxKind] = &[
    Function, Class, Import, If, Try, Return, Expression, Assignment, Call,
];

const MEMBERS: &[SyntaxKind] = &[Method, Function, Class, Property, Assignment];

/// Python: indentation-delimited bodies, `pass` placeholders and PEP 8
/// blank lines around top-level definitions
pub fn python() -> Arc<Grammar> {
    static GRAMMAR: OnceLock<Arc<Grammar>> = OnceLock::new();
    GRAMMAR.get_or_init(|| Arc::new(build())).clone()
}

fn build() -> Grammar {
    Grammar::new(Language::Python, 4)
        .list(
            StatementList,
            ListPolicy::lines(Statement)
                .inner(STATEMENTS)
                .bounded(Scope::Always, Scope::Nested)
                .placeholder("pass", Scope::Nested)
                .blank_lines(Function, 2, Scope::TopLevel)
                .blank_lines(Class, 2, Scope::TopLevel)
                .blank_lines(Method, 1, Scope::Always),
        )
        .list(
            ClassMemberList,
            ListPolicy::lines(Member)
                .inner(MEMBERS)
                .bounded(Scope::Always, Scope::Nested)
                .placeholder("pass", Scope::Always)
                .blank_lines(Method, 1, Scope::Always)
                .blank_lines(Function, 1, Scope::Always),
        )
        .list(ImportList, ListPolicy::lines(Statement).inner(&[Import]))
        .list(
            DecoratorList,
            ListPolicy::delimited(Decorator, "")
                .multiline(true)
                .bounded(Scope::Never, Scope::Always),
        )
        .list(
            ParameterList,
            ListPolicy::delimited(Parameter, ",").retain_first(&["self", "cls"]),
        )
        .list(ArgumentList, ListPolicy::delimited(Argument, ","))
        .list(ExtendsList, ListPolicy::delimited(ExtendsType, ","))
        .list(ElseIfClauseList, ListPolicy::trailing(ElseIfClause, true))
        .list(CatchClauseList, ListPolicy::trailing(CatchClause, true))
        .with(EnclosedBody, Shape::IndentAligner)
        .with(Class, Shape::Plain(ChildSpacing::None))
        .optional(
            ExtendsListOptional,
            OptionalPolicy::new(ExtendsList)
                .inner(&[ExtendsType])
                .enclosed("(", ")"),
        )
        .optional(
            TypeOptional,
            OptionalPolicy::new(Type)
                .prefix(": ")
                .placement(Placement::Adjacent),
        )
        .optional(ReturnTypeOptional, OptionalPolicy::new(Type).prefix("-> "))
        .optional(
            ElseClauseOptional,
            OptionalPolicy::new(ElseClause).placement(Placement::Multiline),
        )
        .optional(
            FinallyClauseOptional,
            OptionalPolicy::new(FinallyClause).placement(Placement::Multiline),
        )
        .alias("module", Program)
        .alias("function_definition", Function)
        .alias("class_definition", Class)
        .alias("import_statement", Import)
        .alias("import_from_statement", Import)
        .alias("expression_statement", Expression)
        .alias("if_statement", If)
        .alias("elif_clause", ElseIfClause)
        .alias("try_statement", Try)
        .alias("except_clause", CatchClause)
        .alias("return_statement", Return)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_list_policy() {
        let grammar = python();
        let policy = grammar.list_policy(StatementList).unwrap();
        assert_eq!(policy.element, Statement);
        assert!(policy.accepts(Function));
        assert!(!policy.accepts(Argument));
        assert!(policy.is_padded());
        assert_eq!(policy.placeholder.as_ref().map(|p| p.text), Some("pass"));
    }

    #[test]
    fn test_type_optional_is_adjacent() {
        let grammar = python();
        let policy = grammar.optional_policy(TypeOptional).unwrap();
        assert_eq!(policy.placement, Placement::Adjacent);
        assert_eq!(policy.prefix, ": ");
    }
}
