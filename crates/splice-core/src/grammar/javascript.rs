use std::sync::{Arc, OnceLock};

use super::{Grammar, Language, ListPolicy, OptionalPolicy, Placement, Scope, Shape, TuplePolicy};
use crate::syntax::SyntaxKind::{self, *};

const STATEMENTS: &[SyntaxKind] = &[
    Function, Class, Import, If, Try, Return, Expression, Assignment, Call,
];

/// JavaScript: brace-delimited bodies with clauses on the closing brace's line
pub fn javascript() -> Arc<Grammar> {
    static GRAMMAR: OnceLock<Arc<Grammar>> = OnceLock::new();
    GRAMMAR.get_or_init(|| Arc::new(build())).clone()
}

fn build() -> Grammar {
    Grammar::new(Language::JavaScript, 2)
        .list(
            StatementList,
            ListPolicy::lines(Statement)
                .inner(STATEMENTS)
                .blank_lines(Function, 1, Scope::Always)
                .blank_lines(Class, 1, Scope::Always),
        )
        .list(
            ClassMemberList,
            ListPolicy::lines(Member)
                .inner(&[Method, Property])
                .blank_lines(Method, 1, Scope::Always),
        )
        .list(ImportList, ListPolicy::lines(Statement).inner(&[Import]))
        .list(
            DecoratorList,
            ListPolicy::delimited(Decorator, "")
                .multiline(true)
                .bounded(Scope::Never, Scope::Always),
        )
        .list(ParameterList, ListPolicy::delimited(Parameter, ","))
        .list(NamedParameterList, ListPolicy::delimited(Parameter, ","))
        .list(ArgumentList, ListPolicy::delimited(Argument, ","))
        .list(ElseIfClauseList, ListPolicy::trailing(ElseIfClause, false))
        .list(CatchClauseList, ListPolicy::trailing(CatchClause, false))
        .with(EnclosedBody, Shape::IndentAligner)
        .with(Parameters, Shape::Tuple(TuplePolicy { delimiter: "," }))
        .optional(
            ParameterListOptional,
            OptionalPolicy::new(ParameterList).inner(&[Parameter]),
        )
        .optional(
            NamedParameterListOptional,
            OptionalPolicy::new(NamedParameterList)
                .inner(&[Parameter])
                .enclosed("{", "}"),
        )
        .optional(
            ArgumentListOptional,
            OptionalPolicy::new(ArgumentList)
                .inner(&[Argument])
                .enclosed("(", ")"),
        )
        .optional(
            ExtendsOptional,
            OptionalPolicy::new(ExtendsType)
                .inner(&[Type, Identifier])
                .prefix("extends "),
        )
        .optional(
            ElseClauseOptional,
            OptionalPolicy::new(ElseClause).placement(Placement::TrailingInline),
        )
        .optional(
            FinallyClauseOptional,
            OptionalPolicy::new(FinallyClause).placement(Placement::TrailingInline),
        )
        .optional(
            TypeOptional,
            OptionalPolicy::new(Type)
                .prefix(": ")
                .placement(Placement::Adjacent),
        )
        .alias("function_declaration", Function)
        .alias("class_declaration", Class)
        .alias("method_definition", Method)
        .alias("statement_block", EnclosedBody)
        .alias("class_body", EnclosedBody)
        .alias("import_statement", Import)
        .alias("expression_statement", Expression)
        .alias("if_statement", If)
        .alias("try_statement", Try)
        .alias("return_statement", Return)
        .alias("call_expression", Call)
        .comment_type("html_comment")
}
