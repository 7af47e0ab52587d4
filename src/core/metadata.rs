//! Typed model of `cargo metadata` output.
//!
//! The document is parsed into a `serde_json::Value` tree and then projected
//! field by field. Projection fails closed: a missing or mistyped key is an
//! error naming the key and the object it belongs to, never a default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error projecting a metadata document into the typed model.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("{object} is not a JSON object")]
    NotAnObject { object: String },

    #[error("missing field `{key}` in {object}")]
    MissingField { key: String, object: String },

    #[error("field `{key}` in {object} is not {expected}")]
    InvalidField {
        key: String,
        object: String,
        expected: &'static str,
    },

    #[error("metadata format version {found} does not match requested version {expected}")]
    UnsupportedFormatVersion { expected: u32, found: u32 },
}

impl MetadataError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error("Malformed Cargo metadata", self.to_string());
        match self {
            MetadataError::UnsupportedFormatVersion { .. } => diag
                .with_suggestion("Use a Cargo release that supports the requested format version"),
            _ => diag,
        }
    }
}

/// A single build output unit within a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    /// Kinds as listed by Cargo (`bin`, `lib`, `test`, ...), in source order.
    pub kind: Vec<String>,
}

impl Target {
    /// Whether this target produces an installable binary.
    pub fn is_bin(&self) -> bool {
        self.kind.iter().any(|k| k == "bin")
    }
}

/// A buildable package within the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    /// Opaque version string; only used for naming the archive.
    pub version: String,
    pub manifest_path: PathBuf,
    pub targets: Vec<Target>,
}

impl Package {
    /// Directory containing the manifest, i.e. the install source.
    pub fn manifest_dir(&self) -> Option<&Path> {
        self.manifest_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
    }

    /// Targets that `cargo install` will produce.
    pub fn binaries(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| t.is_bin())
    }
}

/// The full parsed metadata document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Schema version of the document format.
    pub version: u32,
    pub packages: Vec<Package>,
}

impl Metadata {
    /// First package with exactly this name.
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Package names in document order.
    pub fn package_names(&self) -> Vec<String> {
        self.packages.iter().map(|p| p.name.clone()).collect()
    }

    /// Names that occur more than once, sorted.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for pkg in &self.packages {
            *counts.entry(pkg.name.as_str()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(name, _)| name)
            .collect()
    }
}

/// Parse `cargo metadata` JSON output.
pub fn parse_metadata(json: &str) -> Result<Metadata, MetadataError> {
    let value: Value = serde_json::from_str(json)?;
    metadata_from_value(&value)
}

/// Project an already-parsed JSON tree into [`Metadata`].
pub fn metadata_from_value(value: &Value) -> Result<Metadata, MetadataError> {
    let root = Object::new(value, "metadata".to_string())?;

    let version = root.u32("version")?;
    let packages = root
        .array("packages")?
        .iter()
        .enumerate()
        .map(|(i, v)| package_from_value(v, format!("packages[{}]", i)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Metadata { version, packages })
}

fn package_from_value(value: &Value, path: String) -> Result<Package, MetadataError> {
    let obj = Object::new(value, path)?;

    let targets = obj
        .array("targets")?
        .iter()
        .enumerate()
        .map(|(i, v)| target_from_value(v, format!("{}.targets[{}]", obj.path, i)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Package {
        name: obj.string("name")?,
        version: obj.string("version")?,
        manifest_path: PathBuf::from(obj.string("manifest_path")?),
        targets,
    })
}

fn target_from_value(value: &Value, path: String) -> Result<Target, MetadataError> {
    let obj = Object::new(value, path)?;

    let kind = obj
        .array("kind")?
        .iter()
        .map(|k| {
            k.as_str()
                .map(str::to_string)
                .ok_or_else(|| obj.invalid("kind", "an array of strings"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Target {
        name: obj.string("name")?,
        kind,
    })
}

/// A JSON object together with its location in the document.
struct Object<'a> {
    map: &'a Map<String, Value>,
    path: String,
}

impl<'a> Object<'a> {
    fn new(value: &'a Value, path: String) -> Result<Self, MetadataError> {
        match value.as_object() {
            Some(map) => Ok(Object { map, path }),
            None => Err(MetadataError::NotAnObject { object: path }),
        }
    }

    fn field(&self, key: &str) -> Result<&'a Value, MetadataError> {
        self.map.get(key).ok_or_else(|| MetadataError::MissingField {
            key: key.to_string(),
            object: self.path.clone(),
        })
    }

    fn invalid(&self, key: &str, expected: &'static str) -> MetadataError {
        MetadataError::InvalidField {
            key: key.to_string(),
            object: self.path.clone(),
            expected,
        }
    }

    fn string(&self, key: &str) -> Result<String, MetadataError> {
        self.field(key)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.invalid(key, "a string"))
    }

    fn u32(&self, key: &str) -> Result<u32, MetadataError> {
        self.field(key)?
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| self.invalid(key, "an unsigned integer"))
    }

    fn array(&self, key: &str) -> Result<&'a Vec<Value>, MetadataError> {
        self.field(key)?
            .as_array()
            .ok_or_else(|| self.invalid(key, "an array"))
    }
}
