//! Shared diagnostic and reporting types threaded through every pipeline
//! stage (SPEC_FULL §7, ambient stack).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{label}: {}", self.message)
    }
}

/// Accumulated diagnostics for a single top-level conversion operation.
/// Mirrors the original project's `ConversionMetadata`/`RoundTripInfo`.
#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    pub source: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub fidelity_score: Option<f64>,
}

impl ConversionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(Diagnostic::warning(message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Diagnostic::error(message));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn merge(&mut self, other: ConversionReport) {
        self.diagnostics.extend(other.diagnostics);
        if self.fidelity_score.is_none() {
            self.fidelity_score = other.fidelity_score;
        }
    }
}
