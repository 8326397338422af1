use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A position and span within a single compilation unit's source text.
///
/// Two locations are equal iff every field matches, including `file`; the
/// ordering used for `Ord`/`PartialOrd` is the tuple order
/// `(file, offset, line, column, length)`, which is enough to sort
/// diagnostics deterministically within and across files.
#[derive(Debug, Clone)]
pub struct SourceLocation {
    /// Name of the originating source buffer (shared, not re-allocated per token)
    pub file: Arc<str>,
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
    /// 0-based byte offset from the start of the buffer
    pub offset: usize,
    /// Length in bytes of the spanned text
    pub length: usize,
}

impl SourceLocation {
    /// Creates a new source location.
    pub fn new(file: Arc<str>, line: usize, column: usize, offset: usize, length: usize) -> Self {
        SourceLocation {
            file,
            line,
            column,
            offset,
            length,
        }
    }

    /// A placeholder location used for synthesized nodes that have no
    /// meaningful source span (e.g. the sentinel AST node).
    pub fn synthetic(file: Arc<str>) -> Self {
        SourceLocation {
            file,
            line: 0,
            column: 0,
            offset: 0,
            length: 0,
        }
    }
}

impl PartialEq for SourceLocation {
    fn eq(&self, other: &Self) -> bool {
        self.file == other.file
            && self.line == other.line
            && self.column == other.column
            && self.offset == other.offset
            && self.length == other.length
    }
}

impl Eq for SourceLocation {}

impl PartialOrd for SourceLocation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceLocation {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.file.as_ref(), self.offset, self.line, self.column, self.length).cmp(&(
            other.file.as_ref(),
            other.offset,
            other.line,
            other.column,
            other.length,
        ))
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}
