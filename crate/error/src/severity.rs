use ziv_derive::NamedEnum;

/// Severity of a diagnostic, also selects its console color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, NamedEnum)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl Severity {
    /// `true` for `Error`; used by the phase context to decide whether a
    /// phase produced unrecoverable diagnostics.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Severity::Error)
    }
}
