use std::sync::Arc;

use ziv_error::DiagnosticKind;
use ziv_ir::SourceLocation;

use crate::diagnostic::{Diagnostic, DiagnosticMessage};
use crate::diagnostic_consumer::DiagnosticConsumer;
use crate::phase::PhaseContext;

/// Anything that can hand back a 1-based source line by number. Implemented
/// by the frontend's `SourceBuffer`; declared here instead so this crate
/// doesn't depend on the frontend crate that depends on it.
pub trait LineSource {
    fn line(&self, number: usize) -> Option<&str>;
}

/// Binds a source and a consumer; formats and routes diagnostics.
pub struct DiagnosticEmitter<'a> {
    source: &'a dyn LineSource,
    consumer: &'a mut dyn DiagnosticConsumer,
    sequence: usize,
}

impl<'a> DiagnosticEmitter<'a> {
    pub fn new(source: &'a dyn LineSource, consumer: &'a mut dyn DiagnosticConsumer) -> Self {
        DiagnosticEmitter {
            source,
            consumer,
            sequence: 0,
        }
    }

    /// Looks up `kind`'s registry metadata, formats its message template
    /// with `args` substituted positionally (`{0}`, `{1}`, …), fetches the
    /// source line the location points at, records the severity against
    /// the phase context, and hands the result to the consumer.
    pub fn emit(&mut self, kind: DiagnosticKind, location: SourceLocation, args: &[&str]) -> Diagnostic {
        let message = format_template(kind.message_template(), args);
        let diagnostic = Diagnostic {
            kind,
            location: location.clone(),
            message: message.clone(),
        };

        self.sequence += 1;
        let severity = kind.severity();
        match severity {
            ziv_error::Severity::Error => PhaseContext::record_error(),
            ziv_error::Severity::Warning => PhaseContext::record_warning(),
            _ => {}
        }

        let source_line = self.source.line(location.line).map(str::to_owned);
        let enriched = DiagnosticMessage {
            sequence: self.sequence,
            code: kind.code(),
            severity,
            file: Arc::clone(&location.file),
            line: location.line,
            column: location.column,
            length: location.length,
            message,
            source_line,
            hint: kind.hint(),
            notes: kind.notes(),
            doc_url: kind.doc_path(),
        };
        self.consumer.report(&enriched);

        diagnostic
    }
}

fn format_template(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(end) = template[i + 1..].find('}') {
                let idx_str = &template[i + 1..i + 1 + end];
                if let Ok(idx) = idx_str.parse::<usize>() {
                    if let Some(arg) = args.get(idx) {
                        out.push_str(arg);
                        i += end + 2;
                        continue;
                    }
                }
            }
        }
        let ch = template[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_positional_placeholders() {
        assert_eq!(format_template("expected {0}, found {1}", &["int", "bool"]), "expected int, found bool");
    }

    #[test]
    fn leaves_unmatched_placeholders_untouched() {
        assert_eq!(format_template("no args here {0}", &[]), "no args here {0}");
    }
}
