//! Core data structures.
//!
//! The workspace model produced by `cargo metadata`: packages, their build
//! targets, and the validating parser that builds them.

pub mod metadata;

pub use metadata::{parse_metadata, Metadata, MetadataError, Package, Target};
