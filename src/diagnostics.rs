use std::fmt;

use thiserror::Error;

/// Byte offsets `start..end` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    pub start: usize,
    pub end: usize,
}

impl SourceSpan {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// A parse error message, optionally pinned to the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Option<SourceSpan>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(span) = self.span {
            write!(f, " ({}..{})", span.start, span.end)?;
        }
        Ok(())
    }
}

/// Host-level failures. Language errors never show up here; they are
/// ordinary `Error` values.
#[derive(Debug, Error)]
pub enum MarmosetError {
    #[error("parser errors:\n{}", render_diagnostics(.0))]
    Parse(Vec<Diagnostic>),
    #[error("ERROR: {0}")]
    Runtime(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

pub type Result<T> = std::result::Result<T, MarmosetError>;

fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|diag| format!("\t{}", diag.message))
        .collect::<Vec<_>>()
        .join("\n")
}
