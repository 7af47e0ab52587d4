//! Test fixtures for `cargo metadata` documents.
//!
//! Generators build documents as `serde_json::Value` so individual tests can
//! remove or retype fields before projecting them.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

/// A single-package workspace as printed by
/// `cargo metadata --no-deps --format-version 1`, trimmed of unused keys.
pub const SINGLE_PACKAGE_METADATA: &str = r#"{
  "packages": [
    {
      "name": "tool",
      "version": "0.1.0",
      "id": "path+file:///work/tool#0.1.0",
      "license": null,
      "dependencies": [],
      "targets": [
        {
          "kind": ["bin"],
          "crate_types": ["bin"],
          "name": "tool",
          "src_path": "/work/tool/src/main.rs",
          "edition": "2021",
          "doc": true,
          "doctest": false,
          "test": true
        }
      ],
      "features": {},
      "manifest_path": "/work/tool/Cargo.toml",
      "edition": "2021"
    }
  ],
  "workspace_members": ["path+file:///work/tool#0.1.0"],
  "resolve": null,
  "target_directory": "/work/tool/target",
  "version": 1,
  "workspace_root": "/work/tool"
}"#;

/// A target object.
pub fn target_json(name: &str, kinds: &[&str]) -> Value {
    json!({
        "name": name,
        "kind": kinds,
        "src_path": format!("/work/src/{}.rs", name),
    })
}

/// A package object whose manifest lives at `/work/<name>/Cargo.toml`.
pub fn package_json(name: &str, version: &str, targets: &[Value]) -> Value {
    json!({
        "name": name,
        "version": version,
        "manifest_path": format!("/work/{}/Cargo.toml", name),
        "targets": targets,
    })
}

/// A format-version-1 metadata document.
pub fn metadata_json(packages: &[Value]) -> Value {
    json!({
        "version": 1,
        "packages": packages,
    })
}

/// Create empty files (and their parent directories) under `root`.
pub fn touch_files(root: &Path, files: &[&str]) {
    for file in files {
        let path = root.join(file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }
}
