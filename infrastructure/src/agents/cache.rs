//! Registry cache keyed by scan inputs and file modification times.
//!
//! Owned by the composition root and passed by reference; there is no
//! process-wide cache.

use super::discovery::{FsAgentDiscovery, ScanInputs};
use council_domain::AgentRegistry;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;
use tracing::debug;

/// Resource paths and their modification times, in scan order.
///
/// Adding, removing or touching a resource changes the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSignature(Vec<(PathBuf, Option<SystemTime>)>);

impl ScanSignature {
    pub fn compute(inputs: &ScanInputs) -> Self {
        Self(
            inputs
                .resource_files()
                .into_iter()
                .map(|file| {
                    let modified = fs::metadata(&file.path).and_then(|m| m.modified()).ok();
                    (file.path, modified)
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct CacheEntry {
    inputs: ScanInputs,
    signature: ScanSignature,
    registry: Arc<AgentRegistry>,
}

/// Caches the last discovered registry.
#[derive(Default)]
pub struct RegistryCache {
    entry: Mutex<Option<CacheEntry>>,
}

impl RegistryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached registry if inputs and signature are unchanged,
    /// otherwise rescan and cache the result.
    pub fn get_or_discover(&self, inputs: &ScanInputs) -> Arc<AgentRegistry> {
        let signature = ScanSignature::compute(inputs);
        let mut entry = self.lock();

        if let Some(cached) = entry.as_ref()
            && cached.inputs == *inputs
            && cached.signature == signature
        {
            debug!("Agent registry cache hit");
            return Arc::clone(&cached.registry);
        }

        debug!("Agent registry cache miss, rescanning {} resources", signature.len());
        let registry = Arc::new(FsAgentDiscovery::discover(inputs));
        *entry = Some(CacheEntry {
            inputs: inputs.clone(),
            signature,
            registry: Arc::clone(&registry),
        });
        registry
    }

    /// Drop the cached registry; the next lookup rescans.
    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    pub fn is_cached(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<CacheEntry>> {
        // The entry is replaced wholesale, so a poisoned value is still consistent.
        self.entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, ScanInputs) {
        let root = tempfile::tempdir().unwrap();
        let builtin = root.path().join("builtin");
        fs::create_dir_all(&builtin).unwrap();
        fs::write(builtin.join("moderator.md"), "---\nid: moderator\n---\nbody").unwrap();
        (root, ScanInputs::new(builtin))
    }

    #[test]
    fn test_cache_hit_returns_same_registry() {
        let (_root, inputs) = setup();
        let cache = RegistryCache::new();

        let first = cache.get_or_discover(&inputs);
        let second = cache.get_or_discover(&inputs);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.is_cached());
    }

    #[test]
    fn test_new_resource_triggers_rescan() {
        let (_root, inputs) = setup();
        let cache = RegistryCache::new();

        let first = cache.get_or_discover(&inputs);
        fs::write(
            inputs.builtin_dir.join("summarizer.md"),
            "---\nid: summarizer\n---\nbody",
        )
        .unwrap();
        let second = cache.get_or_discover(&inputs);

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.contains("summarizer"));
    }

    #[test]
    fn test_invalidate_and_changed_inputs() {
        let (root, inputs) = setup();
        let cache = RegistryCache::new();

        let first = cache.get_or_discover(&inputs);
        cache.invalidate();
        assert!(!cache.is_cached());
        let second = cache.get_or_discover(&inputs);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);

        let other = inputs.with_contributed_dir(root.path().join("nobody"));
        let third = cache.get_or_discover(&other);
        assert!(!Arc::ptr_eq(&second, &third));
    }
}
