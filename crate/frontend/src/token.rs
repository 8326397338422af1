use std::fmt;

use ziv_ir::SourceLocation;

use crate::token_kind::TokenKind;

/// A single lexed token: its kind, spelling, and source location.
///
/// `spelling` holds the literal source bytes for identifiers and literals,
/// is empty for structural tokens (`Sof`/`Eof`/`Indent`/`Dedent`), and
/// otherwise mirrors `kind.spelling()` for symbols and keywords.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub spelling: String,
    pub location: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, spelling: impl Into<String>, location: SourceLocation) -> Self {
        Token {
            kind,
            spelling: spelling.into(),
            location,
        }
    }

    /// Builds a token for a fixed-spelling kind (symbol or keyword),
    /// filling `spelling` from `kind.spelling()`.
    pub fn fixed(kind: TokenKind, location: SourceLocation) -> Self {
        Token::new(kind, kind.spelling(), location)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.spelling.is_empty() {
            write!(f, "{}", self.kind.name())
        } else {
            write!(f, "{} '{}'", self.kind.name(), self.spelling)
        }
    }
}
