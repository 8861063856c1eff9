//! Target registry and dependency ordering
//!
//! Construction validates the dependency graph and fails as a whole:
//! - no target depends on itself
//! - every dependency names a registered target
//! - the graph is acyclic
//!
//! Ordering is a depth-first post-order walk over target names in
//! lexicographic order, so dependencies come first and repeated calls agree.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::{BuildContext, Target};
use crate::config::Config;
use crate::error::ConfigError;
use crate::probe::ScriptCache;
use crate::toolchain::ToolchainResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnStack,
    Done,
}

/// Validated set of targets
#[derive(Debug, Clone, Default)]
pub struct Registry {
    targets: BTreeMap<String, Target>,
}

impl Registry {
    /// Build and validate a registry
    ///
    /// # Errors
    /// * `ConfigError::DuplicateTarget` - two targets share a name
    /// * `ConfigError::SelfDependency` - a target lists itself
    /// * `ConfigError::UnknownDependency` - a dependency is not registered
    /// * `ConfigError::CircularDependency` - the graph has a cycle
    pub fn build(targets: impl IntoIterator<Item = Target>) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for target in targets {
            let name = target.name().to_string();
            if map.insert(name.clone(), target).is_some() {
                return Err(ConfigError::DuplicateTarget { name });
            }
        }

        let registry = Self { targets: map };
        registry.validate()?;
        Ok(registry)
    }

    /// Resolve toolchains and build every target of `config`
    ///
    /// `root` must be absolute; it becomes `${root}` and the base of every
    /// target directory.
    pub fn from_config(
        config: &Config,
        root: &Path,
        cache: Arc<dyn ScriptCache>,
    ) -> Result<Self, ConfigError> {
        let resolver = ToolchainResolver::new(&config.toolchains)?;
        Self::from_config_with_resolver(config, root, &resolver, cache)
    }

    /// Like [`from_config`](Self::from_config) with an already built resolver
    pub fn from_config_with_resolver(
        config: &Config,
        root: &Path,
        resolver: &ToolchainResolver,
        cache: Arc<dyn ScriptCache>,
    ) -> Result<Self, ConfigError> {
        let ctx = BuildContext {
            root,
            resolver,
            version: config.project.version.as_deref(),
            auto_detect: config.defaults.auto_detect,
            default_timeout: (config.defaults.timeout > 0)
                .then(|| Duration::from_secs(config.defaults.timeout)),
            cache,
        };

        let targets = config
            .list_targets()
            .into_iter()
            .map(|name| Target::from_config(&name, &config.targets[&name], &ctx))
            .collect::<Result<Vec<_>, _>>()?;

        Self::build(targets)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for target in self.targets.values() {
            for dependency in target.depends_on() {
                if dependency == target.name() {
                    return Err(ConfigError::SelfDependency {
                        target: target.name().to_string(),
                    });
                }
                if !self.targets.contains_key(dependency) {
                    return Err(ConfigError::UnknownDependency {
                        target: target.name().to_string(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        self.walk(self.targets.keys().map(String::as_str))?;
        Ok(())
    }

    /// Post-order DFS from `roots`; each reachable target is emitted once
    fn walk<'a>(
        &'a self,
        roots: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<&'a Target>, ConfigError> {
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut order = Vec::with_capacity(self.targets.len());

        for root in roots {
            self.visit(root, &mut marks, &mut order)?;
        }

        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        marks: &mut HashMap<&'a str, Mark>,
        order: &mut Vec<&'a Target>,
    ) -> Result<(), ConfigError> {
        match marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::OnStack) => {
                return Err(ConfigError::CircularDependency {
                    target: name.to_string(),
                })
            }
            None => {}
        }

        let Some(target) = self.targets.get(name) else {
            return Err(ConfigError::UnknownTarget {
                name: name.to_string(),
            });
        };

        marks.insert(name, Mark::OnStack);
        for dependency in target.depends_on() {
            self.visit(dependency, marks, order)?;
        }
        marks.insert(name, Mark::Done);
        order.push(target);

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    /// Every target, ordered by name
    pub fn all(&self) -> Vec<&Target> {
        self.targets.values().collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.targets.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Every target, dependencies before dependents
    pub fn topological_order(&self) -> Result<Vec<&Target>, ConfigError> {
        self.walk(self.targets.keys().map(String::as_str))
    }

    /// The named targets and their transitive dependencies, dependencies first
    ///
    /// # Errors
    /// * `ConfigError::UnknownTarget` - a name is not registered
    pub fn order_for<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&Target>, ConfigError> {
        let mut roots: Vec<&str> = Vec::with_capacity(names.len());
        for name in names {
            let (key, _) = self
                .targets
                .get_key_value(name.as_ref())
                .ok_or_else(|| ConfigError::UnknownTarget {
                    name: name.as_ref().to_string(),
                })?;
            roots.push(key.as_str());
        }
        roots.sort_unstable();

        self.walk(roots)
    }
}
