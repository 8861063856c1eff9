//! Common test utilities for polyrun tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a temporary project with `polyrun.toml` and one directory per target
pub fn create_project(config: &str, targets: &[&str]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("polyrun.toml"), config).expect("Failed to write polyrun.toml");
    for target in targets {
        std::fs::create_dir_all(dir.path().join(target)).expect("Failed to create target dir");
    }
    let path = dir.path().canonicalize().expect("Failed to canonicalize temp dir");
    (dir, path)
}

/// Writes a `package.json` with the given script names into `dir`
pub fn write_package_json(dir: &Path, scripts: &[&str]) {
    let scripts: serde_json::Map<String, serde_json::Value> = scripts
        .iter()
        .map(|name| (name.to_string(), serde_json::Value::from("echo ok")))
        .collect();
    let manifest = serde_json::json!({ "name": "fixture", "scripts": scripts });
    std::fs::write(
        dir.join("package.json"),
        serde_json::to_string_pretty(&manifest).expect("Failed to serialize manifest"),
    )
    .expect("Failed to write package.json");
}

/// Creates an empty marker file such as `Cargo.toml`
pub fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    std::fs::write(path, "").expect("Failed to touch file");
}

/// Writes a script and marks it executable
pub fn write_executable(path: &Path, contents: &str) {
    touch(path);
    std::fs::write(path, contents).expect("Failed to write script");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to chmod script");
    }
}

/// Reads a file, or returns an empty string if it does not exist
pub fn read_or_empty(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}

/// A three-target project: `proto` <- `lib` <- `app`, plus an independent `docs`
///
/// Each shell command appends `<target>:<command>` to `<root>/log.txt`.
pub const LAYERED_PROJECT: &str = r#"
[project]
name = "layered"
version = "0.9.0"

[defaults]
auto_detect = false

[toolchains.logger.commands]
build = "echo ${target}:build >> ${root}/log.txt"
test = "echo ${target}:test >> ${root}/log.txt"
lint = false
ci = ["build", "test"]

[targets.app]
toolchain = "logger"
depends_on = ["lib"]

[targets.lib]
toolchain = "logger"
depends_on = ["proto"]

[targets.proto]
type = "auxiliary"
toolchain = "logger"

[targets.docs]
type = "auxiliary"
toolchain = "logger"
[targets.docs.commands]
test = false
"#;

pub const LAYERED_TARGETS: &[&str] = &["app", "lib", "proto", "docs"];
