//! Script-availability cache
//!
//! Maps an absolute directory to its parsed `package.json`, or to a tombstone
//! when the manifest is missing or unparseable. Tombstones are cached exactly
//! like manifests and are only dropped by [`ScriptCache::clear`].
//!
//! [`SharedScriptCache`] has no eviction and no size bound; it assumes a
//! short-lived process. Long-running embeddings should inject their own
//! [`ScriptCache`] implementation.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use serde::Deserialize;

/// Manifest file consulted for package-manager scripts
pub const MANIFEST_FILE: &str = "package.json";

/// The parts of `package.json` that matter for script probing
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
}

impl PackageManifest {
    pub fn has_script(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }
}

/// Lookup of parsed manifests by directory
#[cfg_attr(test, mockall::automock)]
pub trait ScriptCache: Send + Sync {
    /// Parsed manifest for `dir`, or `None` when there is no usable manifest
    fn get(&self, dir: &Path) -> Option<Arc<PackageManifest>>;

    /// Drop every cached entry, tombstones included
    fn clear(&self);
}

type Entries = HashMap<PathBuf, Option<Arc<PackageManifest>>>;

/// Process-wide cache behind a read-mostly lock with a double-checked fill
#[derive(Debug, Default)]
pub struct SharedScriptCache {
    entries: RwLock<Entries>,
}

static GLOBAL: Lazy<Arc<SharedScriptCache>> = Lazy::new(|| Arc::new(SharedScriptCache::new()));

impl SharedScriptCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide instance used when no cache is injected
    pub fn global() -> Arc<SharedScriptCache> {
        Arc::clone(&GLOBAL)
    }

    /// Number of cached entries, tombstones included
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cache_key(dir: &Path) -> PathBuf {
    dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf())
}

/// Read and parse `<dir>/package.json`; `None` for missing or invalid files
fn load_manifest(dir: &Path) -> Option<Arc<PackageManifest>> {
    let path = dir.join(MANIFEST_FILE);
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("No manifest at {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str::<PackageManifest>(&content) {
        Ok(manifest) => Some(Arc::new(manifest)),
        Err(e) => {
            tracing::warn!("Ignoring unparseable manifest {}: {}", path.display(), e);
            None
        }
    }
}

impl ScriptCache for SharedScriptCache {
    fn get(&self, dir: &Path) -> Option<Arc<PackageManifest>> {
        let key = cache_key(dir);

        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get(&key) {
                return entry.clone();
            }
        }

        // Load outside any lock; a concurrent loader for the same key may win below
        let loaded = load_manifest(&key);

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.entry(key).or_insert(loaded).clone()
    }

    fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
