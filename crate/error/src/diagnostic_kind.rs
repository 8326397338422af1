use crate::severity::Severity;

/// Declares the closed set of diagnostic kinds and their registry metadata
/// in one place, the same way the language's own diagnostic table is a
/// single generated array keyed by kind: one macro invocation below lists,
/// per kind, its stable numeric code, severity, message template (with
/// positional `{0}`, `{1}`, … placeholders), optional hint, and notes. The
/// macro expands to the `DiagnosticKind` enum plus its accessor methods,
/// without hand-keeping four parallel `match` blocks in sync.
macro_rules! diagnostic_registry {
    (
        $( $variant:ident = $code:literal, $severity:ident, $template:literal, $hint:expr, [ $($note:literal),* $(,)? ] );* $(;)?
    ) => {
        /// A diagnostic kind. The numeric discriminant is the `ZIV-<digits>`
        /// code's digit portion.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum DiagnosticKind {
            $( $variant = $code ),*
        }

        impl DiagnosticKind {
            /// Stable diagnostic code, e.g. `ZIV-1002`.
            pub fn code(&self) -> String {
                format!("ZIV-{}", *self as u32)
            }

            pub fn severity(&self) -> Severity {
                match self {
                    $( DiagnosticKind::$variant => Severity::$severity ),*
                }
            }

            /// Message template with `{0}`, `{1}`, … placeholders.
            pub fn message_template(&self) -> &'static str {
                match self {
                    $( DiagnosticKind::$variant => $template ),*
                }
            }

            pub fn hint(&self) -> Option<&'static str> {
                match self {
                    $( DiagnosticKind::$variant => $hint ),*
                }
            }

            /// Up to four supplementary notes.
            pub fn notes(&self) -> &'static [&'static str] {
                match self {
                    $( DiagnosticKind::$variant => &[ $($note),* ] ),*
                }
            }

            /// `https://ziv-language.github.io/book/diagnostics/ZIV-NNNN`
            pub fn doc_path(&self) -> String {
                format!("https://ziv-language.github.io/book/diagnostics/{}", self.code())
            }

            /// `true` for kinds raised while scanning source text.
            pub fn is_lex_error(&self) -> bool {
                (*self as u32) >= 1000 && (*self as u32) < 1100
            }

            /// `true` for kinds raised while building the AST.
            pub fn is_parse_error(&self) -> bool {
                (*self as u32) >= 1100 && (*self as u32) < 2000
            }

            /// `true` for kinds raised while checking the AST.
            pub fn is_semantic_error(&self) -> bool {
                (*self as u32) >= 2000 && (*self as u32) < 3000
            }
        }
    };
}

diagnostic_registry! {
    InvalidCharacter = 1000, Error, "invalid character {0}", None, [];
    UnterminatedString = 1002, Error, "unterminated string literal", Some("close the string with a matching '\"' before the end of the line"), [];
    UnterminatedCharacter = 1003, Error, "unterminated character literal", Some("close the character literal with a matching \"'\""), [];
    UnterminatedComment = 1004, Error, "unterminated block comment", Some("close the comment with a matching '--#'"), [];
    InvalidEscapeSequence = 1005, Error, "invalid escape sequence {0}", None, [];
    InvalidNumber = 1006, Error, "invalid numeric literal {0}", None, [];
    InvalidIndentation = 1007, Error, "inconsistent indentation", Some("indent by a multiple of the file's indent width"), [];
    TabInIndentation = 1008, Error, "tab character in indentation", Some("use spaces for indentation"), [];

    UnexpectedToken = 1100, Error, "unexpected token {1}, expected {0}", None, [];
    AmbiguousComparison = 1101, Error, "chained comparisons are ambiguous", Some("parenthesize the comparisons to disambiguate"), [];

    VariableMissingType = 2000, Error, "variable declaration missing a type annotation", None, [];
    VariableRedeclaration = 2001, Error, "variable {0} is already declared in this scope", None, [];
    FunctionMissingName = 2002, Error, "function declaration missing a name", None, [];
    TypeMismatch = 2003, Error, "type mismatch: expected {0}, found {1}", None, [];
    UndeclaredIdentifier = 2004, Error, "undeclared identifier {0}", None, []
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_matches_discriminant() {
        assert_eq!(DiagnosticKind::UnterminatedString.code(), "ZIV-1002");
    }

    #[test]
    fn phase_predicates_partition_the_ranges() {
        assert!(DiagnosticKind::InvalidCharacter.is_lex_error());
        assert!(DiagnosticKind::UnexpectedToken.is_parse_error());
        assert!(DiagnosticKind::VariableRedeclaration.is_semantic_error());
        assert!(!DiagnosticKind::InvalidCharacter.is_semantic_error());
    }

    #[test]
    fn doc_path_embeds_code() {
        assert_eq!(
            DiagnosticKind::TypeMismatch.doc_path(),
            "https://ziv-language.github.io/book/diagnostics/ZIV-2003"
        );
    }
}
