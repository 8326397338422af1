use ziv_derive::NamedEnum;

pub const TYPE_NAME_INT: &str = PrimitiveType::Int.name();
pub const TYPE_NAME_FLOAT: &str = PrimitiveType::Float.name();
pub const TYPE_NAME_BOOL: &str = PrimitiveType::Bool.name();
pub const TYPE_NAME_STRING: &str = PrimitiveType::String.name();
pub const TYPE_NAME_CHAR: &str = PrimitiveType::Char.name();
pub const TYPE_NAME_NONE: &str = PrimitiveType::None.name();
pub const TYPE_NAME_ERROR: &str = PrimitiveType::Error.name();

/// The canonical, singleton primitive types of the semantic type system.
///
/// Every primitive kind has exactly one value of this enum representing it;
/// there is no per-declaration allocation the way a struct or generic type
/// would need one. `None` stands for the unresolved/top type handed out
/// before a declaration's type annotation has been checked, and `Error` is
/// handed out once a type error has already been diagnosed so later checks
/// don't cascade further complaints about the same expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, NamedEnum)]
pub enum PrimitiveType {
    /// Signed integer literal/value type.
    #[name = "int"]
    Int,
    /// Floating point literal/value type.
    #[name = "float"]
    Float,
    /// Boolean type.
    #[name = "bool"]
    Bool,
    /// String type.
    #[name = "string"]
    String,
    /// Single-character type.
    #[name = "char"]
    Char,
    /// Top/unresolved type, compatible with everything.
    #[name = "none"]
    None,
    /// Sentinel type handed out once an error has already been reported.
    #[name = "error"]
    Error,
}

impl PrimitiveType {
    /// Recognizes one of the primitive type-specifier keywords; returns
    /// `None` for anything else (including generic type names, which the
    /// parser accepts syntactically but the checker does not resolve).
    pub fn from_keyword(spelling: &str) -> Option<PrimitiveType> {
        PrimitiveType::from_str(spelling)
    }

    /// Two types are compatible iff they are identical or either is `None`.
    pub fn is_compatible_with(&self, other: &PrimitiveType) -> bool {
        *self == PrimitiveType::None || *other == PrimitiveType::None || self == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_compatible_with_everything() {
        assert!(PrimitiveType::None.is_compatible_with(&PrimitiveType::Int));
        assert!(PrimitiveType::Bool.is_compatible_with(&PrimitiveType::None));
    }

    #[test]
    fn identical_types_are_compatible() {
        assert!(PrimitiveType::String.is_compatible_with(&PrimitiveType::String));
    }

    #[test]
    fn distinct_concrete_types_are_incompatible() {
        assert!(!PrimitiveType::Int.is_compatible_with(&PrimitiveType::Float));
    }

    #[test]
    fn from_keyword_recognizes_primitive_spellings() {
        assert_eq!(PrimitiveType::from_keyword("int"), Some(PrimitiveType::Int));
        assert_eq!(PrimitiveType::from_keyword("widget"), None);
    }
}
