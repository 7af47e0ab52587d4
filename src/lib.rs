//! package-binary - install a Cargo package's binaries and zip them up
//!
//! This crate provides the library behind the `package-binary` CI step:
//! reading `cargo metadata`, choosing the package and target, running
//! `cargo install`, and archiving the installed binaries.

pub mod core;
pub mod ops;
pub mod toolchain;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a mock process executor, a recording
/// reporter and metadata fixtures.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{Metadata, MetadataError, Package, Target};
pub use ops::{package_binary, PackageOptions, PackageResult};
pub use toolchain::{Toolchain, ToolchainError};
