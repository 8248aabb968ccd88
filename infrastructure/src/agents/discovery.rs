//! Agent discovery from resource directories.
//!
//! Layout:
//! - primary collection: `<builtin_dir>/*.md` (provenance `builtin`)
//! - secondary collections: each namespace directory's `*.md` (provenance
//!   `contributed`); the directory name is the container name used for
//!   aliasing
//!
//! Collections are scanned in order (builtins first) and files within a
//! collection by name, so later entries overwrite earlier ones on collision.

use crate::config::FileAgentsConfig;
use council_domain::{AgentDefinition, AgentRegistry, ParsedResource, Provenance, parse_resource};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const RESOURCE_EXTENSION: &str = "md";

/// Directories to scan, in precedence order (lowest first).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ScanInputs {
    pub builtin_dir: PathBuf,
    pub contributed_dirs: Vec<PathBuf>,
}

/// One resource file together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFile {
    pub path: PathBuf,
    pub provenance: Provenance,
    /// Namespace directory name for contributed resources
    pub container: Option<String>,
}

impl ScanInputs {
    pub fn new(builtin_dir: impl Into<PathBuf>) -> Self {
        Self {
            builtin_dir: builtin_dir.into(),
            contributed_dirs: Vec::new(),
        }
    }

    pub fn with_contributed_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.contributed_dirs.push(dir.into());
        self
    }

    /// Resolve the `[agents]` section, expanding `contributed_root` into its
    /// sub-directories (sorted; names starting with `_` or `.` skipped).
    ///
    /// Explicit `contributed_dirs` come after the root's namespaces.
    pub fn from_config(config: &FileAgentsConfig) -> Self {
        let mut inputs = Self::new(&config.builtin_dir);

        if let Some(root) = &config.contributed_root {
            match fs::read_dir(root) {
                Ok(entries) => {
                    let mut dirs: Vec<PathBuf> = entries
                        .filter_map(Result::ok)
                        .map(|entry| entry.path())
                        .filter(|path| path.is_dir())
                        .filter(|path| {
                            path.file_name()
                                .and_then(|n| n.to_str())
                                .is_some_and(|n| !n.starts_with('_') && !n.starts_with('.'))
                        })
                        .collect();
                    dirs.sort();
                    inputs.contributed_dirs.extend(dirs);
                }
                Err(e) => warn!("Cannot read contributed root {}: {}", root.display(), e),
            }
        }

        inputs
            .contributed_dirs
            .extend(config.contributed_dirs.iter().cloned());
        inputs
    }

    /// All resource files to scan, in scan order.
    pub fn resource_files(&self) -> Vec<ResourceFile> {
        let mut files: Vec<ResourceFile> = list_resources(&self.builtin_dir)
            .into_iter()
            .map(|path| ResourceFile {
                path,
                provenance: Provenance::Builtin,
                container: None,
            })
            .collect();

        for dir in &self.contributed_dirs {
            let container = dir
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string);
            files.extend(list_resources(dir).into_iter().map(|path| ResourceFile {
                path,
                provenance: Provenance::Contributed,
                container: container.clone(),
            }));
        }

        files
    }
}

/// Filesystem-backed agent discovery
pub struct FsAgentDiscovery;

impl FsAgentDiscovery {
    /// Scan every collection and build a fresh registry.
    ///
    /// Never fails: unreadable files, files without a header and headers
    /// without an id are logged and skipped.
    pub fn discover(inputs: &ScanInputs) -> AgentRegistry {
        let mut registry = AgentRegistry::new();
        let mut loaded = 0usize;

        for file in inputs.resource_files() {
            if let Some(definition) = Self::load(&file) {
                debug!(
                    agent = %definition.id,
                    alias = ?definition.alias_of,
                    "Loaded {} agent from {}",
                    definition.provenance,
                    file.path.display()
                );
                registry.register(definition);
                loaded += 1;
            }
        }

        info!(
            "Discovered {} agents ({} registry keys)",
            loaded,
            registry.len()
        );
        registry
    }

    fn load(file: &ResourceFile) -> Option<AgentDefinition> {
        let text = match fs::read_to_string(&file.path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping unreadable resource {}: {}", file.path.display(), e);
                return None;
            }
        };

        let ParsedResource::Header { header, body } = parse_resource(&text) else {
            debug!("Skipping {}: no metadata header", file.path.display());
            return None;
        };

        match AgentDefinition::from_header(&header, &body, file.provenance) {
            Ok(definition) => Some(match &file.container {
                Some(container) => definition.with_container(container),
                None => definition,
            }),
            Err(reason) => {
                info!("Skipping {}: {}", file.path.display(), reason);
                None
            }
        }
    }
}

/// `*.md` files directly inside `dir`, sorted by path.
fn list_resources(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read agent directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(RESOURCE_EXTENSION))
        .collect();
    files.sort();
    files
}
