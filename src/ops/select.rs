//! Choosing the package to install.

use thiserror::Error;

use crate::core::metadata::{Metadata, Package};
use crate::util::diagnostic::Diagnostic;

/// The requested package cannot be resolved to exactly one package.
#[derive(Debug, Error)]
pub enum SelectError {
    #[error(
        "the Cargo workspace contains {count} packages, but the input `package` was not set"
    )]
    Ambiguous { count: usize, available: Vec<String> },

    #[error("the Cargo workspace does not contain a package called `{requested}`")]
    NotFound {
        requested: String,
        available: Vec<String>,
    },
}

impl SelectError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            SelectError::Ambiguous { available, .. } => {
                let diag = Diagnostic::error("Ambiguous package", self.to_string());
                if available.is_empty() {
                    diag.with_suggestion("Run from a directory containing a Cargo workspace")
                } else {
                    diag.with_context(format!("available packages: {}", available.join(", ")))
                        .with_suggestion("Set the `package` input to one of the packages above")
                }
            }
            SelectError::NotFound { available, .. } => {
                Diagnostic::error("Package not found", self.to_string())
                    .with_context(format!(
                        "available packages: {}",
                        if available.is_empty() {
                            "(none)".to_string()
                        } else {
                            available.join(", ")
                        }
                    ))
                    .with_suggestion("Package names are matched exactly and case-sensitively")
            }
        }
    }
}

/// Resolve the package to build.
///
/// Without a requested name the workspace must contain exactly one package.
/// With a name, the first package whose name matches exactly is returned.
pub fn select_package<'a>(
    requested: Option<&str>,
    metadata: &'a Metadata,
) -> Result<&'a Package, SelectError> {
    match requested {
        None => match metadata.packages.as_slice() {
            [only] => {
                tracing::info!("using default package: {}", only.name);
                Ok(only)
            }
            packages => Err(SelectError::Ambiguous {
                count: packages.len(),
                available: metadata.package_names(),
            }),
        },
        Some(name) => metadata.package(name).ok_or_else(|| SelectError::NotFound {
            requested: name.to_string(),
            available: metadata.package_names(),
        }),
    }
}
