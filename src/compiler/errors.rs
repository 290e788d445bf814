//! Fatal (structural) errors. Recoverable problems are [`crate::compiler::types::Diagnostic`]s,
//! not `Err` values — see SPEC_FULL §7.

use std::fmt::Display;

/// Errors that abort a whole pipeline invocation.
#[derive(Debug)]
pub enum CoreError {
    /// No root element, or the root has no `Controller` child.
    MissingController,
    /// The element tree could not be read as L5X at all.
    MalformedXml(String),
    /// The requested input file or directory could not be read.
    Io { path: String, message: String },
    /// `--use-ir` validation reported one or more errors.
    ValidationFailed(Vec<String>),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingController => {
                write!(f, "no <Controller> element found in input")
            }
            Self::MalformedXml(msg) => write!(f, "malformed XML: {msg}"),
            Self::Io { path, message } => write!(f, "{path}: {message}"),
            Self::ValidationFailed(errors) => {
                writeln!(f, "validation failed:")?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "  - {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CoreError {}
