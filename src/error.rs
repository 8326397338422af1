use crate::exit;

/// Errors the CLI layer can produce, each carrying the [`exit::Code`] it
/// should be reported under.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Io {
        source: std::io::Error,
        path: String,
        code: exit::Code,
    },

    #[error("{message}")]
    Generic { message: String, code: exit::Code },
}

impl CliError {
    pub fn exit_code(&self) -> exit::Code {
        match self {
            CliError::Io { code, .. } => *code,
            CliError::Generic { code, .. } => *code,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
