use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use super::model::{FileManifest, LooseFile, PackManifest};
use crate::error::{PackError, PackResult};

/// File name of the pack document at the base directory root.
pub const PACK_MANIFEST_NAME: &str = "pack.packmint.json";

/// Suffix that marks a per-file manifest document.
pub const FILE_MANIFEST_SUFFIX: &str = ".packmint.json";

/// In-memory representation of a pack: metadata plus every per-file
/// manifest keyed by the manifest document's relative path.
///
/// The map is the single source of truth between [`PackStore::load`] and
/// [`PackStore::save`]; nothing is written to disk outside of `save`.
#[derive(Debug)]
pub struct PackStore {
    base_dir: PathBuf,
    manifest: PackManifest,
    files: BTreeMap<String, FileManifest>,
}

impl PackStore {
    /// Create a fresh store for a pack that has not been persisted yet.
    pub fn new(base_dir: PathBuf, manifest: PackManifest) -> Self {
        Self {
            base_dir,
            manifest,
            files: BTreeMap::new(),
        }
    }

    /// Load a pack from its base directory.
    ///
    /// Reads the pack document, then walks the tree for `*.packmint.json`
    /// file manifests. Any malformed document is a hard error naming its
    /// path; there is no partial load.
    pub async fn load(base_dir: &Path) -> PackResult<Self> {
        let pack_path = base_dir.join(PACK_MANIFEST_NAME);
        let json = tokio::fs::read_to_string(&pack_path)
            .await
            .map_err(|source| PackError::Io {
                path: pack_path.clone(),
                source,
            })?;
        let manifest: PackManifest =
            serde_json::from_str(&json).map_err(|source| PackError::Manifest {
                path: pack_path.clone(),
                source,
            })?;

        let mut files = BTreeMap::new();
        for entry in WalkDir::new(base_dir) {
            let entry = entry.map_err(|e| PackError::Io {
                path: e.path().map(Path::to_path_buf).unwrap_or_default(),
                source: e.into(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path == pack_path {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(FILE_MANIFEST_SUFFIX) {
                continue;
            }

            let rel = relative_key(base_dir, path)?;
            let json = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| PackError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            let file_manifest: FileManifest =
                serde_json::from_str(&json).map_err(|source| PackError::Manifest {
                    path: path.to_path_buf(),
                    source,
                })?;
            files.insert(rel, file_manifest);
        }

        info!(
            "Loaded pack '{}' with {} file manifest(s)",
            manifest.name,
            files.len()
        );

        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            manifest,
            files,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Pack metadata only.
    pub fn manifest(&self) -> &PackManifest {
        &self.manifest
    }

    /// Every file manifest, keyed by the manifest document's relative path.
    pub fn manifests(&self) -> &BTreeMap<String, FileManifest> {
        &self.files
    }

    /// Files carried verbatim with the pack.
    pub fn loose_files(&self) -> &[LooseFile] {
        &self.manifest.files
    }

    /// Insert or overwrite the manifest at `rel_path`.
    ///
    /// Rejects paths that escape the base directory before touching the
    /// map; nothing is written to disk until [`PackStore::save`]. Keys
    /// missing the `.packmint.json` suffix get it appended, so every
    /// stored entry is found again by [`PackStore::load`].
    pub fn add_file_manifest(&mut self, rel_path: &str, manifest: FileManifest) -> PackResult<()> {
        let mut rel = normalize_rel_path(rel_path)?;
        if !rel.ends_with(FILE_MANIFEST_SUFFIX) {
            rel.push_str(FILE_MANIFEST_SUFFIX);
        }
        if manifest.sources.is_empty() {
            return Err(PackError::NoSources(rel));
        }
        debug!("Staged manifest {} -> {}", rel, manifest.filename);
        self.files.insert(rel, manifest);
        Ok(())
    }

    /// Remove the manifest at `rel_path`, if present.
    pub fn remove_file_manifest(&mut self, rel_path: &str) -> Option<FileManifest> {
        self.files.remove(rel_path)
    }

    /// Resolve a relative path against the base directory, rejecting
    /// traversal outside it.
    pub fn join_checked(&self, rel_path: &str) -> PackResult<PathBuf> {
        let rel = normalize_rel_path(rel_path)?;
        Ok(self.base_dir.join(rel))
    }

    /// Persist the pack document and every file manifest.
    ///
    /// Each document is written to a temp file and renamed into place, so
    /// a crash mid-save never leaves a half-written manifest.
    pub async fn save(&self) -> PackResult<()> {
        let pack_json = serde_json::to_string_pretty(&self.manifest)?;
        write_atomic(&self.base_dir.join(PACK_MANIFEST_NAME), pack_json.as_bytes()).await?;

        for (rel, manifest) in &self.files {
            let path = self.base_dir.join(rel);
            let json = serde_json::to_string_pretty(manifest)?;
            write_atomic(&path, json.as_bytes()).await?;
        }

        info!(
            "Saved pack '{}' ({} manifest documents)",
            self.manifest.name,
            self.files.len() + 1
        );
        Ok(())
    }
}

/// Normalize a user-supplied relative path, rejecting anything that could
/// escape the pack's base directory.
fn normalize_rel_path(raw: &str) -> PackResult<String> {
    let path = Path::new(raw);
    let mut parts = Vec::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => match part.to_str() {
                Some(part) => parts.push(part),
                None => return Err(PackError::PathViolation(raw.to_string())),
            },
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(PackError::PathViolation(raw.to_string()));
            }
        }
    }

    if parts.is_empty() {
        return Err(PackError::PathViolation(raw.to_string()));
    }

    Ok(parts.join("/"))
}

/// Relative key (forward slashes) for a manifest document under `base`.
fn relative_key(base: &Path, path: &Path) -> PackResult<String> {
    let rel = path
        .strip_prefix(base)
        .map_err(|_| PackError::PathViolation(path.display().to_string()))?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component.as_os_str().to_str() {
            Some(part) => parts.push(part),
            None => return Err(PackError::PathViolation(path.display().to_string())),
        }
    }
    Ok(parts.join("/"))
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> PackResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| PackError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!("{file_name}.tmp"));

    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|source| PackError::Io {
            path: tmp.clone(),
            source,
        })?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|source| PackError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(())
}
