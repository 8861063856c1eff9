//! Toolchain resolution
//!
//! Custom toolchains from configuration shadow built-ins of the same name.
//! A custom toolchain that `extends` a base starts from a copy of the base's
//! command table; each of its own entries then replaces the base entry with
//! the same key (no deep merge). Bases are looked up custom-first, so custom
//! toolchains can extend each other. A custom toolchain that extends its own
//! name extends the built-in it shadows.
//!
//! All custom toolchains are resolved eagerly in [`ToolchainResolver::new`],
//! so a bad `extends` surfaces before any target exists.

use std::collections::{BTreeMap, HashMap};

use super::{catalog, CommandTable, Toolchain};
use crate::config::{TargetConfig, ToolchainConfig};
use crate::error::ConfigError;

/// Resolves toolchain names to immutable [`Toolchain`]s
#[derive(Debug, Clone, Default)]
pub struct ToolchainResolver {
    custom: BTreeMap<String, Toolchain>,
}

impl ToolchainResolver {
    /// Build a resolver over the given custom toolchain declarations
    ///
    /// # Errors
    /// * `ConfigError::UnknownBaseToolchain` - an `extends` names no known toolchain
    /// * `ConfigError::ToolchainCycle` - an `extends` chain loops
    pub fn new(declared: &HashMap<String, ToolchainConfig>) -> Result<Self, ConfigError> {
        let mut custom = BTreeMap::new();

        // Sorted for deterministic error reporting
        let mut names: Vec<&String> = declared.keys().collect();
        names.sort();

        for name in names {
            let mut chain = Vec::new();
            resolve_custom(name, declared, &mut custom, &mut chain)?;
        }

        Ok(Self { custom })
    }

    /// Resolve a toolchain by name, custom before built-in
    pub fn resolve(&self, name: &str) -> Result<&Toolchain, ConfigError> {
        self.custom
            .get(name)
            .or_else(|| catalog::builtin(name))
            .ok_or_else(|| ConfigError::UnknownToolchain {
                name: name.to_string(),
            })
    }

    /// True if `name` resolves to any toolchain
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    /// Final command table for a target: its toolchain's table (empty when
    /// no toolchain applies) with the target's own overrides on top
    pub fn resolved_commands(
        &self,
        toolchain: Option<&str>,
        target: &TargetConfig,
    ) -> Result<CommandTable, ConfigError> {
        let mut commands = match toolchain {
            Some(name) => self.resolve(name)?.commands.clone(),
            None => CommandTable::new(),
        };

        for (key, def) in &target.commands {
            commands.insert(key.clone(), def.clone());
        }

        Ok(commands)
    }

    /// Names of every resolvable toolchain, custom and built-in, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.custom.keys().cloned().collect();
        for builtin in catalog::builtin_names() {
            if !self.custom.contains_key(builtin) {
                names.push(builtin.to_string());
            }
        }
        names.sort();
        names
    }
}

fn resolve_custom(
    name: &str,
    declared: &HashMap<String, ToolchainConfig>,
    resolved: &mut BTreeMap<String, Toolchain>,
    chain: &mut Vec<String>,
) -> Result<(), ConfigError> {
    if resolved.contains_key(name) {
        return Ok(());
    }

    if chain.iter().any(|n| n == name) {
        chain.push(name.to_string());
        return Err(ConfigError::ToolchainCycle {
            toolchain: chain[0].clone(),
            chain: chain.join(" -> "),
        });
    }

    let Some(config) = declared.get(name) else {
        return Ok(());
    };

    chain.push(name.to_string());

    let mut commands = match config.extends.as_deref() {
        Some(base) if base != name && declared.contains_key(base) => {
            resolve_custom(base, declared, resolved, chain)?;
            resolved
                .get(base)
                .map(|t| t.commands.clone())
                .unwrap_or_default()
        }
        Some(base) => catalog::builtin(base)
            .map(|t| t.commands.clone())
            .ok_or_else(|| ConfigError::UnknownBaseToolchain {
                toolchain: name.to_string(),
                base: base.to_string(),
            })?,
        None => CommandTable::new(),
    };

    for (key, def) in &config.commands {
        commands.insert(key.clone(), def.clone());
    }

    chain.pop();

    tracing::debug!(
        "Resolved toolchain '{}' ({} commands, extends {:?})",
        name,
        commands.len(),
        config.extends
    );

    resolved.insert(
        name.to_string(),
        Toolchain {
            name: name.to_string(),
            extends: config.extends.clone(),
            commands,
        },
    );

    Ok(())
}
