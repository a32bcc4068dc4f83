//! Directory-backed hook catalog.
//!
//! Hook files are read from an ordered list of directories. A file in a later
//! directory replaces the same-named file from an earlier one, and a
//! zero-length file masks it entirely. Definitions are kept sorted by file
//! name, which fixes the order hooks are reported in.
//!
//! With rescanning on, every resolve stamps the directories and their hook
//! files (size and modification time) and reloads when anything differs, so
//! files added, removed, or rewritten in place are all picked up.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use crate::definition::HookDefinition;
use crate::error::{CatalogError, ResolveError};
use crate::resolver::{HookResolver, MatchSet};
use crate::spec::{Hook, Spec};
use crate::stage::Stage;

/// Vendor-provided hook definitions.
pub const DEFAULT_HOOKS_DIR: &str = "/usr/share/containers/oci/hooks.d";
/// Administrator overrides; takes precedence over [`DEFAULT_HOOKS_DIR`].
pub const OVERRIDE_HOOKS_DIR: &str = "/etc/containers/oci/hooks.d";

const HOOK_FILE_SUFFIX: &str = ".json";

#[derive(Debug, Clone)]
pub struct CatalogOptions {
    /// Re-read the directories on resolve when they or their hook files changed.
    pub rescan: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self { rescan: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    name: String,
    len: u64,
    modified: Option<SystemTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DirStamp {
    Missing,
    Present {
        modified: Option<SystemTime>,
        files: Vec<FileStamp>,
    },
}

#[derive(Debug)]
struct Snapshot {
    definitions: Vec<HookDefinition>,
    stamps: Vec<DirStamp>,
}

/// In-memory index of hook definitions loaded from `hooks.d` directories.
pub struct HookCatalog {
    dirs: Vec<PathBuf>,
    options: CatalogOptions,
    snapshot: RwLock<Arc<Snapshot>>,
}

impl HookCatalog {
    /// Scan `dirs` in order. Missing directories are fine; unreadable ones are not.
    pub fn load<I, P>(dirs: I, options: CatalogOptions) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let dirs: Vec<PathBuf> = dirs.into_iter().map(Into::into).collect();
        let snapshot = scan(&dirs)?;
        tracing::info!(
            hooks = snapshot.definitions.len(),
            dirs = dirs.len(),
            "Loaded OCI hook catalog"
        );
        Ok(Self {
            dirs,
            options,
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Force a rescan. On failure the previous definitions stay in effect.
    pub fn reload(&self) -> Result<usize, CatalogError> {
        let fresh = Arc::new(scan(&self.dirs)?);
        let count = fresh.definitions.len();
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        tracing::info!(hooks = count, "Reloaded OCI hook catalog");
        Ok(count)
    }

    /// Currently loaded definitions, in match order.
    pub fn definitions(&self) -> Vec<HookDefinition> {
        self.loaded().definitions.clone()
    }

    pub fn len(&self) -> usize {
        self.loaded().definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn loaded(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn current(&self) -> Result<Arc<Snapshot>, CatalogError> {
        let snapshot = self.loaded();
        if !self.options.rescan {
            return Ok(snapshot);
        }

        let stamps = stamp_all(&self.dirs)?;
        if stamps == snapshot.stamps {
            return Ok(snapshot);
        }

        tracing::debug!("Hook directories changed, rescanning");
        let fresh = Arc::new(scan(&self.dirs)?);
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&fresh);
        tracing::info!(
            hooks = fresh.definitions.len(),
            "Rescanned OCI hook catalog"
        );
        Ok(fresh)
    }
}

impl HookResolver for HookCatalog {
    fn resolve(&self, spec: &Spec) -> Result<Option<MatchSet>, ResolveError> {
        let snapshot = self.current()?;
        if snapshot.definitions.is_empty() {
            return Ok(None);
        }

        let mut stages: BTreeMap<Stage, Vec<Hook>> = BTreeMap::new();
        for def in &snapshot.definitions {
            let matched = def
                .matches(spec)
                .map_err(|_| ResolveError::MissingProcessArgs {
                    hook: def.name().to_string(),
                })?;
            if !matched {
                continue;
            }
            tracing::debug!(hook = def.name(), stages = ?def.stages(), "Hook trigger matched");
            for stage in def.stages() {
                stages.entry(*stage).or_default().push(def.hook().clone());
            }
        }

        Ok(MatchSet::new(stages))
    }
}

fn stamp(dir: &Path) -> Result<DirStamp, CatalogError> {
    let metadata = match std::fs::metadata(dir) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(DirStamp::Missing),
        Err(source) => {
            return Err(CatalogError::Stat {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let read_dir_err = |source| CatalogError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(DirStamp::Missing),
        Err(e) => return Err(read_dir_err(e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(read_dir_err)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(HOOK_FILE_SUFFIX) {
            continue;
        }
        // A file that vanished mid-listing still gets a stamp; the next
        // listing will differ from it.
        let (len, modified) = match std::fs::metadata(entry.path()) {
            Ok(m) => (m.len(), m.modified().ok()),
            Err(_) => (0, None),
        };
        files.push(FileStamp {
            name,
            len,
            modified,
        });
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(DirStamp::Present {
        modified: metadata.modified().ok(),
        files,
    })
}

fn stamp_all(dirs: &[PathBuf]) -> Result<Vec<DirStamp>, CatalogError> {
    dirs.iter().map(|d| stamp(d)).collect()
}

fn scan(dirs: &[PathBuf]) -> Result<Snapshot, CatalogError> {
    // Stamp first so a change made mid-scan is picked up by the next resolve.
    let stamps = stamp_all(dirs)?;

    let mut by_name: BTreeMap<String, HookDefinition> = BTreeMap::new();
    for dir in dirs {
        scan_dir(dir, &mut by_name)?;
    }

    Ok(Snapshot {
        definitions: by_name.into_values().collect(),
        stamps,
    })
}

fn scan_dir(dir: &Path, by_name: &mut BTreeMap<String, HookDefinition>) -> Result<(), CatalogError> {
    let read_dir_err = |source| CatalogError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "Hook directory does not exist (skipping)");
            return Ok(());
        }
        Err(e) => return Err(read_dir_err(e)),
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry.map_err(read_dir_err)?.path();
        let is_hook_file = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(HOOK_FILE_SUFFIX));
        if is_hook_file {
            paths.push(path);
        }
    }
    paths.sort();

    for path in paths {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };

        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(err) => {
                tracing::warn!(path = %path.display(), "Failed to stat hook file (skipping): {}", err);
                by_name.remove(&name);
                continue;
            }
        };
        if metadata.is_dir() {
            continue;
        }
        if metadata.len() == 0 {
            if by_name.remove(&name).is_some() {
                tracing::debug!(path = %path.display(), "Hook masked by empty override file");
            }
            continue;
        }

        match HookDefinition::from_file(&path) {
            Ok(def) => {
                if by_name.insert(name, def).is_some() {
                    tracing::debug!(path = %path.display(), "Hook file overrides earlier definition");
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "Invalid hook file (skipping): {}", err);
                by_name.remove(&name);
            }
        }
    }

    Ok(())
}
