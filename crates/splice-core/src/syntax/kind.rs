//! Syntax kind enumeration for splice trees
//!
//! One closed set of kinds shared by every grammar. What a kind *does* when
//! it is a container (list, optional, aligner...) is decided by the
//! [`Grammar`](crate::grammar::Grammar) of the tree, not by the kind itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of a node in a splice tree
///
/// This enum covers:
/// - Leaf kinds (plain tokens and newline tokens)
/// - Structural kinds (programs, statements, bodies)
/// - Declarations (functions, classes, imports)
/// - Repeated and optional slots (lists, optionals, tuples)
/// - Comments
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum SyntaxKind {
    // ==================
    // Leaves (0-9)
    // ==================
    /// Any token that is not a line break
    Token = 0,
    /// A single `\n`
    Newline = 1,

    // ==================
    // Structure (10-49)
    // ==================
    Program = 10,
    Statement = 11,
    StatementList = 12,
    /// Indented or braced body of a block
    EnclosedBody = 13,
    Expression = 14,
    Assignment = 15,
    Return = 16,
    Identifier = 17,
    Call = 18,

    // ==================
    // Declarations (50-99)
    // ==================
    Import = 50,
    ImportList = 51,
    Function = 52,
    Method = 53,
    Class = 54,
    Member = 55,
    ClassMemberList = 56,
    Property = 57,
    Type = 58,
    TypeOptional = 59,
    ReturnTypeOptional = 60,
    ExtendsType = 61,
    ExtendsOptional = 62,
    ExtendsList = 63,
    ExtendsListOptional = 64,
    Decorator = 65,
    DecoratorList = 66,

    // ==================
    // Parameters and arguments (100-149)
    // ==================
    Parameter = 100,
    ParameterList = 101,
    ParameterListOptional = 102,
    NamedParameterList = 103,
    NamedParameterListOptional = 104,
    /// Fixed-arity group of parameter slots, e.g. `(a, {b})`
    Parameters = 105,
    Argument = 106,
    ArgumentList = 107,
    ArgumentListOptional = 108,

    // ==================
    // Control flow (150-199)
    // ==================
    If = 150,
    Condition = 151,
    ElseClause = 152,
    ElseClauseOptional = 153,
    ElseIfClause = 154,
    ElseIfClauseList = 155,
    Try = 156,
    CatchClause = 157,
    CatchClauseList = 158,
    FinallyClause = 159,
    FinallyClauseOptional = 160,

    // ==================
    // Comments (200-209)
    // ==================
    Comment = 200,
    CommentText = 201,
}

impl SyntaxKind {
    /// Every kind, in declaration order
    pub const ALL: &'static [SyntaxKind] = &[
        Self::Token,
        Self::Newline,
        Self::Program,
        Self::Statement,
        Self::StatementList,
        Self::EnclosedBody,
        Self::Expression,
        Self::Assignment,
        Self::Return,
        Self::Identifier,
        Self::Call,
        Self::Import,
        Self::ImportList,
        Self::Function,
        Self::Method,
        Self::Class,
        Self::Member,
        Self::ClassMemberList,
        Self::Property,
        Self::Type,
        Self::TypeOptional,
        Self::ReturnTypeOptional,
        Self::ExtendsType,
        Self::ExtendsOptional,
        Self::ExtendsList,
        Self::ExtendsListOptional,
        Self::Decorator,
        Self::DecoratorList,
        Self::Parameter,
        Self::ParameterList,
        Self::ParameterListOptional,
        Self::NamedParameterList,
        Self::NamedParameterListOptional,
        Self::Parameters,
        Self::Argument,
        Self::ArgumentList,
        Self::ArgumentListOptional,
        Self::If,
        Self::Condition,
        Self::ElseClause,
        Self::ElseClauseOptional,
        Self::ElseIfClause,
        Self::ElseIfClauseList,
        Self::Try,
        Self::CatchClause,
        Self::CatchClauseList,
        Self::FinallyClause,
        Self::FinallyClauseOptional,
        Self::Comment,
        Self::CommentText,
    ];

    /// Check if this is a leaf kind
    pub const fn is_token(self) -> bool {
        matches!(self, Self::Token | Self::Newline)
    }

    /// Check if this kind only ever appears in the comment list
    pub const fn is_comment(self) -> bool {
        matches!(self, Self::Comment | Self::CommentText)
    }

    /// Stable snake_case name, used by parse-tree conversion and dumps
    pub const fn name(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Newline => "newline",
            Self::Program => "program",
            Self::Statement => "statement",
            Self::StatementList => "statement_list",
            Self::EnclosedBody => "enclosed_body",
            Self::Expression => "expression",
            Self::Assignment => "assignment",
            Self::Return => "return",
            Self::Identifier => "identifier",
            Self::Call => "call",
            Self::Import => "import",
            Self::ImportList => "import_list",
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
            Self::Member => "member",
            Self::ClassMemberList => "class_member_list",
            Self::Property => "property",
            Self::Type => "type",
            Self::TypeOptional => "type_optional",
            Self::ReturnTypeOptional => "return_type_optional",
            Self::ExtendsType => "extends_type",
            Self::ExtendsOptional => "extends_optional",
            Self::ExtendsList => "extends_list",
            Self::ExtendsListOptional => "extends_list_optional",
            Self::Decorator => "decorator",
            Self::DecoratorList => "decorator_list",
            Self::Parameter => "parameter",
            Self::ParameterList => "parameter_list",
            Self::ParameterListOptional => "parameter_list_optional",
            Self::NamedParameterList => "named_parameter_list",
            Self::NamedParameterListOptional => "named_parameter_list_optional",
            Self::Parameters => "parameters",
            Self::Argument => "argument",
            Self::ArgumentList => "argument_list",
            Self::ArgumentListOptional => "argument_list_optional",
            Self::If => "if",
            Self::Condition => "condition",
            Self::ElseClause => "else_clause",
            Self::ElseClauseOptional => "else_clause_optional",
            Self::ElseIfClause => "else_if_clause",
            Self::ElseIfClauseList => "else_if_clause_list",
            Self::Try => "try",
            Self::CatchClause => "catch_clause",
            Self::CatchClauseList => "catch_clause_list",
            Self::FinallyClause => "finally_clause",
            Self::FinallyClauseOptional => "finally_clause_optional",
            Self::Comment => "comment",
            Self::CommentText => "comment_text",
        }
    }

    /// Look a kind up by its snake_case name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SyntaxKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown syntax kind '{s}'"))
    }
}
