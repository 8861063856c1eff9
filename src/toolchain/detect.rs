//! Toolchain auto-detection
//!
//! Infers which toolchain applies to a directory from the files it contains.
//! [`DETECTION_RULES`] is the single ordered source of truth: the first rule
//! with a matching file wins. Lockfile rules sit above the manifest they share
//! (`pnpm-lock.yaml` above `package.json`) so the more specific tool is chosen
//! when both files are present.

use std::path::Path;

use serde::Serialize;

/// Ordered `(pattern, toolchain)` rules. Patterns containing a wildcard are globs.
pub const DETECTION_RULES: &[(&str, &str)] = &[
    ("Cargo.toml", "cargo"),
    ("pnpm-lock.yaml", "pnpm"),
    ("yarn.lock", "yarn"),
    ("bun.lockb", "bun"),
    ("bun.lock", "bun"),
    ("deno.json", "deno"),
    ("deno.jsonc", "deno"),
    ("package.json", "npm"),
    ("go.mod", "go"),
    ("uv.lock", "uv"),
    ("poetry.lock", "poetry"),
    ("pyproject.toml", "python"),
    ("setup.py", "python"),
    ("requirements.txt", "python"),
    ("pom.xml", "maven"),
    ("build.gradle.kts", "gradle"),
    ("build.gradle", "gradle"),
    ("*.sln", "dotnet"),
    ("*.csproj", "dotnet"),
    ("*.fsproj", "dotnet"),
    ("build.zig", "zig"),
    ("Package.swift", "swift"),
    ("mix.exs", "mix"),
    ("Gemfile", "bundler"),
    ("pubspec.yaml", "dart"),
    ("composer.json", "composer"),
    ("stack.yaml", "stack"),
    ("*.cabal", "cabal"),
    ("dune-project", "dune"),
    ("CMakeLists.txt", "cmake"),
    ("Makefile", "make"),
    ("makefile", "make"),
    ("GNUmakefile", "make"),
];

/// A single rule hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionMatch {
    /// Toolchain the rule maps to
    pub toolchain: String,
    /// The rule's pattern
    pub pattern: String,
    /// File that matched
    pub file: String,
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn rule_matches(pattern: &str, file_name: &str) -> bool {
    if is_glob(pattern) {
        match glob::Pattern::new(pattern) {
            Ok(compiled) => compiled.matches(file_name),
            Err(e) => {
                tracing::warn!("Invalid detection pattern '{}': {}", pattern, e);
                false
            }
        }
    } else {
        pattern == file_name
    }
}

/// Sorted file names directly inside `dir` (empty if unreadable)
fn list_files(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Cannot read {} for detection: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    files.sort();
    files
}

/// Match a file listing against the rules, keeping rule order
pub fn match_files(files: &[String]) -> Vec<DetectionMatch> {
    DETECTION_RULES
        .iter()
        .filter_map(|(pattern, toolchain)| {
            files
                .iter()
                .find(|file| rule_matches(pattern, file))
                .map(|file| DetectionMatch {
                    toolchain: toolchain.to_string(),
                    pattern: pattern.to_string(),
                    file: file.clone(),
                })
        })
        .collect()
}

/// Every rule hit for a directory, in precedence order
pub fn detect_toolchains(dir: &Path) -> Vec<DetectionMatch> {
    match_files(&list_files(dir))
}

/// Detect the toolchain for a directory: the first matching rule wins
pub fn detect_toolchain(dir: &Path) -> Option<String> {
    let files = list_files(dir);
    let detected = DETECTION_RULES
        .iter()
        .find(|(pattern, _)| files.iter().any(|file| rule_matches(pattern, file)))
        .map(|(_, toolchain)| toolchain.to_string());

    match &detected {
        Some(name) => tracing::debug!("Detected toolchain '{}' in {}", name, dir.display()),
        None => tracing::debug!("No toolchain detected in {}", dir.display()),
    }

    detected
}
