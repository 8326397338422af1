pub mod diagnostic_kind;
pub mod severity;
pub mod ziv_error;

pub use diagnostic_kind::DiagnosticKind;
pub use severity::Severity;
pub use ziv_error::{ZivError, ZivResult};
