//! High-level operations.
//!
//! One module per pipeline stage, composed by [`package_binary`].

pub mod archive;
pub mod install;
pub mod metadata;
pub mod package_binary;
pub mod select;
pub mod target;

pub use archive::{archive_name, package_binaries, ArchiveOptions, ArchiveResult};
pub use install::{install_package, InstallOptions};
pub use metadata::{fetch_metadata_json, load_metadata};
pub use package_binary::{
    package_binary, PackageOptions, PackageResult, OUTPUT_ARCHIVE_FILE, OUTPUT_ARCHIVE_NAME,
};
pub use select::{select_package, SelectError};
pub use target::{default_target_triple, resolve_target};
