use ziv_derive::NamedEnum;

/// The closed set of AST node kinds.
///
/// `Invalid` occupies arena slot zero and is never produced by the parser;
/// every other variant corresponds to a production in the grammar or to one
/// of the parser's error-recovery nodes (`Error`, `Placeholder`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, NamedEnum)]
pub enum NodeKind {
    /// Sentinel occupying arena index 0; never linked into a real tree.
    Invalid,
    /// Root of a parsed file.
    FileStart,
    /// Synthetic end-of-file marker, last child appended to the root.
    FileEnd,
    /// `module Ident ... end module`
    ModuleDecl,
    /// `import Ident [as Ident] [{ ... }]`
    Import,
    /// `fn Ident [...] (...) [-> Type] : Block`
    FunctionDecl,
    /// The identifier naming a function declaration.
    FunctionName,
    /// Bracketed generic parameter list on a function declaration.
    GenericParams,
    /// A single generic parameter, optionally trait-bound.
    GenericParam,
    /// Parenthesised, comma-separated parameter list.
    ParameterList,
    /// A single `[take|ref|mut ref]? Ident : Type` parameter.
    Parameter,
    /// A type annotation, primitive name plus optional generic arguments.
    TypeSpec,
    /// `{ ... }` block of statements.
    CodeBlock,
    /// `(let|mut|const) Ident : Type = Expr ;`
    VariableDecl,
    /// The initializer expression wrapped under a `VariableDecl`.
    VariableInit,
    /// A bare expression used as a statement.
    ExpressionStmt,
    /// `if ... Block (else ...)?`
    IfStmt,
    /// The `else` arm of an `if`.
    ElseBranch,
    /// `while Cond Block`
    WhileLoop,
    /// `do Block while Cond`
    DoWhileLoop,
    /// `for Init ; Cond ; Step Block`
    ForLoop,
    /// `match Expr (case ...)* end`
    MatchStmt,
    /// A single `case` arm of a `match`.
    MatchCase,
    /// `return Expr? ;`
    ReturnStmt,
    /// `break ;`
    BreakStmt,
    /// `continue ;`
    ContinueStmt,
    /// An integer, float, string, char, or boolean literal.
    LiteralExpr,
    /// A bare identifier reference.
    IdentifierExpr,
    /// `lhs OP rhs`
    BinaryExpr,
    /// `OP operand`
    UnaryExpr,
    /// `lhs = rhs`
    AssignmentExpr,
    /// `Ident ( ArgList? )`
    FunctionCall,
    /// Comma-separated call arguments.
    ArgumentList,
    /// `expr [ index ]`
    IndexExpr,
    /// A node synthesized at a parse error site.
    Error,
    /// A placeholder node used where a production could not complete.
    Placeholder,
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Invalid
    }
}
