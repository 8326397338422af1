/// Top-level error type for failures that happen below the diagnostic
/// engine, before there is a source buffer to anchor a proper diagnostic
/// against (e.g. the file cannot even be opened).
#[derive(Debug, thiserror::Error)]
pub enum ZivError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{path} is not valid UTF-8")]
    InvalidEncoding { path: String },
}

pub type ZivResult<T> = Result<T, ZivError>;
