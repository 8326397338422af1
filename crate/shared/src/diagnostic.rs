use std::sync::Arc;

use ziv_error::{DiagnosticKind, Severity};
use ziv_ir::SourceLocation;

/// A raw diagnostic: the kind, where it happened, and the formatted
/// message. Rendering detail (source line, hint, notes, doc URL) lives in
/// [`DiagnosticMessage`], built from this plus registry metadata by the
/// emitter.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub location: SourceLocation,
    pub message: String,
}

/// The fully enriched diagnostic handed to a [`DiagnosticConsumer`].
///
/// `sequence` is the monotonically increasing order the emitter produced
/// this diagnostic in, used by consumers to print `[<N>] ...` prefixes and
/// by tests asserting delivery order.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    pub sequence: usize,
    pub code: String,
    pub severity: Severity,
    pub file: Arc<str>,
    pub line: usize,
    pub column: usize,
    pub length: usize,
    pub message: String,
    pub source_line: Option<String>,
    pub hint: Option<&'static str>,
    pub notes: &'static [&'static str],
    pub doc_url: String,
}
