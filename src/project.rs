//! A loaded project: configuration, toolchain resolver and target registry
//!
//! Every construction error surfaces here, before any command runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{Config, LoadedConfig};
use crate::error::ConfigError;
use crate::probe::{ScriptCache, SharedScriptCache};
use crate::target::Registry;
use crate::toolchain::ToolchainResolver;

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config_path: PathBuf,
    config: Config,
    resolver: ToolchainResolver,
    registry: Registry,
}

impl Project {
    /// Build the project using the process-wide script cache
    pub fn load(loaded: LoadedConfig) -> Result<Self, ConfigError> {
        Self::load_with_cache(loaded, SharedScriptCache::global())
    }

    pub fn load_with_cache(
        loaded: LoadedConfig,
        cache: Arc<dyn ScriptCache>,
    ) -> Result<Self, ConfigError> {
        let LoadedConfig { root, path, config } = loaded;

        let resolver = ToolchainResolver::new(&config.toolchains)?;
        let registry = Registry::from_config_with_resolver(&config, &root, &resolver, cache)?;

        tracing::debug!(
            "Loaded project at {} with {} targets",
            root.display(),
            registry.len()
        );

        Ok(Self {
            root,
            config_path: path,
            config,
            resolver,
            registry,
        })
    }

    /// `project.name`, or the root directory name
    pub fn name(&self) -> String {
        self.config
            .project
            .name
            .clone()
            .or_else(|| {
                self.root
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_default()
    }

    pub fn version(&self) -> Option<&str> {
        self.config.project.version.as_deref()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolver(&self) -> &ToolchainResolver {
        &self.resolver
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_file;
    use std::fs;
    use tempfile::TempDir;

    fn write_project(toml: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("polyrun.toml"), toml).unwrap();
        dir
    }

    #[test]
    fn test_load_builds_registry() {
        let dir = write_project(
            r#"
            [project]
            name = "hello"
            version = "1.4.0"

            [targets.rust]
            toolchain = "cargo"
            depends_on = ["proto"]

            [targets.proto]
            type = "auxiliary"
            [targets.proto.commands]
            build = "buf generate"
            "#,
        );

        let loaded = load_config_file(&dir.path().join("polyrun.toml")).unwrap();
        let project = Project::load_with_cache(loaded, Arc::new(SharedScriptCache::new())).unwrap();

        assert_eq!(project.name(), "hello");
        assert_eq!(project.version(), Some("1.4.0"));
        assert_eq!(project.registry().len(), 2);
        assert_eq!(
            project.registry().get("rust").unwrap().root_dir(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_name_falls_back_to_directory() {
        let dir = write_project("");
        let loaded = load_config_file(&dir.path().join("polyrun.toml")).unwrap();
        let project = Project::load(loaded).unwrap();

        let expected = dir
            .path()
            .canonicalize()
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert_eq!(project.name(), expected);
    }

    #[test]
    fn test_construction_errors_are_fatal() {
        let dir = write_project(
            r#"
            [toolchains.web]
            extends = "nmp"
            "#,
        );

        let loaded = load_config_file(&dir.path().join("polyrun.toml")).unwrap();
        let err = Project::load(loaded).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBaseToolchain { .. }));
    }
}
