//! User-facing error diagnostics.
//!
//! Every domain error renders to a [`Diagnostic`] carrying a short title (used
//! for the workflow error annotation) and a detail message.

use crate::core::metadata::MetadataError;
use crate::ops::select::SelectError;
use crate::toolchain::ToolchainError;
use crate::util::process::ProcessError;

/// Title used when no domain error is found in an error chain.
pub const GENERIC_TITLE: &str = "Packaging failed";

/// A titled diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Short title
    pub title: String,
    /// Primary message
    pub message: String,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic {
            title: title.into(),
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Build a diagnostic for an arbitrary error chain.
    ///
    /// The first domain error found in the chain supplies the title and
    /// suggestions; the message is always the full chain so no context added
    /// along the way is lost.
    pub fn from_error(err: &anyhow::Error) -> Self {
        let full = format!("{:#}", err);

        let found = err.chain().find_map(|cause| {
            if let Some(e) = cause.downcast_ref::<ProcessError>() {
                Some(e.to_diagnostic())
            } else if let Some(e) = cause.downcast_ref::<MetadataError>() {
                Some(e.to_diagnostic())
            } else if let Some(e) = cause.downcast_ref::<ToolchainError>() {
                Some(e.to_diagnostic())
            } else {
                cause.downcast_ref::<SelectError>().map(|e| e.to_diagnostic())
            }
        });

        match found {
            Some(diag) => Diagnostic {
                message: full,
                ..diag
            },
            None => Diagnostic::error(GENERIC_TITLE, full),
        }
    }

    /// Message text including context and suggestions, one per line.
    pub fn detail(&self) -> String {
        let mut out = self.message.clone();
        for ctx in &self.context {
            out.push_str(&format!("\n  {}", ctx));
        }
        for suggestion in &self.suggestions {
            out.push_str(&format!("\nhelp: {}", suggestion));
        }
        out
    }
}
