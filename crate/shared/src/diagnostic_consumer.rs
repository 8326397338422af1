use colored::Colorize;
use ziv_error::Severity;

use crate::diagnostic::DiagnosticMessage;

/// Sink for enriched diagnostics. The emitter calls `report` once per
/// diagnostic, in emission order.
pub trait DiagnosticConsumer {
    fn report(&mut self, message: &DiagnosticMessage);
}

/// Prints diagnostics to standard error in a `code: message` console
/// format, with the offending source line, a caret, hint, and notes
/// following when present.
#[derive(Debug, Default)]
pub struct ConsoleDiagnosticConsumer;

impl ConsoleDiagnosticConsumer {
    pub fn new() -> Self {
        ConsoleDiagnosticConsumer
    }
}

impl DiagnosticConsumer for ConsoleDiagnosticConsumer {
    fn report(&mut self, message: &DiagnosticMessage) {
        let severity = match message.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Note => "note".blue().bold(),
            Severity::Help => "help".green().bold(),
        };

        eprintln!(
            "[{}] {}:{}:{} <{}>: {}: {}",
            message.sequence, message.file, message.line, message.column, message.code, severity, message.message
        );

        let source_line = message.source_line.as_deref().unwrap_or("");
        eprintln!("     {}", source_line);

        let caret_indent = " ".repeat(message.column.saturating_sub(1));
        eprintln!("     {}{}", caret_indent, "^".red().bold());

        if let Some(hint) = message.hint {
            eprintln!("→ help: {}", hint);
        }
        for note in message.notes {
            eprintln!("• note: {}", note);
        }
        eprintln!("{}", message.doc_url);
    }
}

/// Collects diagnostics in memory instead of printing them; used by tests
/// and by any caller that wants to inspect diagnostics before deciding how
/// (or whether) to render them.
#[derive(Debug, Default)]
pub struct AccumulatingDiagnosticConsumer {
    messages: Vec<DiagnosticMessage>,
}

impl AccumulatingDiagnosticConsumer {
    pub fn new() -> Self {
        AccumulatingDiagnosticConsumer { messages: Vec::new() }
    }

    pub fn messages(&self) -> &[DiagnosticMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<DiagnosticMessage> {
        self.messages
    }
}

impl DiagnosticConsumer for AccumulatingDiagnosticConsumer {
    fn report(&mut self, message: &DiagnosticMessage) {
        self.messages.push(message.clone());
    }
}
