use serde::{Deserialize, Serialize};

use crate::error::{PackError, PackResult};
use crate::hash::{self, ContentHashes};

/// Supported mod loaders — strongly typed, no magic strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Loader {
    Fabric,
    Forge,
    Neoforge,
    Quilt,
}

impl Loader {
    /// The tag providers use for this loader in release metadata.
    pub fn tag(&self) -> &'static str {
        match self {
            Loader::Fabric => "fabric",
            Loader::Forge => "forge",
            Loader::Neoforge => "neoforge",
            Loader::Quilt => "quilt",
        }
    }
}

impl std::fmt::Display for Loader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Loader descriptor stored in the pack document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoaderSpec {
    #[serde(rename = "type")]
    pub kind: Loader,
    pub version: String,
}

/// Which side of the game a file is required on.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    ClientOnly,
    ServerOnly,
    #[default]
    Both,
}

impl Side {
    /// Whether a file with this side belongs in an export for `target`.
    pub fn included_for(&self, target: Side) -> bool {
        match (self, target) {
            (Side::Both, _) | (_, Side::Both) => true,
            (Side::ClientOnly, Side::ClientOnly) => true,
            (Side::ServerOnly, Side::ServerOnly) => true,
            _ => false,
        }
    }
}

/// A file shipped verbatim with the pack, not obtained from a provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LooseFile {
    pub path: String,
    #[serde(default)]
    pub side: Side,
}

/// Top-level pack metadata, persisted as `pack.packmint.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackManifest {
    pub name: String,
    pub version: String,
    /// Target game version, e.g. "1.20.4".
    pub minecraft: String,
    pub loader: LoaderSpec,
    /// Loose files carried alongside the manifests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<LooseFile>,
}

/// Direct-download source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrlSource {
    pub url: String,
}

/// Source backed by a Modrinth project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModrinthSource {
    pub project_id: String,
    pub file_url: String,
}

/// Source backed by a CurseForge file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CurseforgeSource {
    pub project_id: String,
    pub file_id: String,
    pub file_url: String,
}

/// The set of providers that can supply a file. At least one must be
/// present; several may coexist and are tried in a fixed priority order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<UrlSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modrinth: Option<ModrinthSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curseforge: Option<CurseforgeSource>,
}

/// One concrete source, borrowed out of [`Sources`].
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    Url(&'a UrlSource),
    Modrinth(&'a ModrinthSource),
    Curseforge(&'a CurseforgeSource),
}

impl Source<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Url(_) => "url",
            Source::Modrinth(_) => "modrinth",
            Source::Curseforge(_) => "curseforge",
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Source::Url(s) => &s.url,
            Source::Modrinth(s) => &s.file_url,
            Source::Curseforge(s) => &s.file_url,
        }
    }
}

impl Sources {
    pub fn from_url(url: impl Into<String>) -> Self {
        Sources {
            url: Some(UrlSource { url: url.into() }),
            ..Sources::default()
        }
    }

    pub fn from_modrinth(project_id: impl Into<String>, file_url: impl Into<String>) -> Self {
        Sources {
            modrinth: Some(ModrinthSource {
                project_id: project_id.into(),
                file_url: file_url.into(),
            }),
            ..Sources::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.modrinth.is_none() && self.curseforge.is_none()
    }

    /// The declared sources in resolution priority order:
    /// url > modrinth > curseforge.
    pub fn ordered(&self) -> Vec<Source<'_>> {
        let mut out = Vec::new();
        if let Some(s) = &self.url {
            out.push(Source::Url(s));
        }
        if let Some(s) = &self.modrinth {
            out.push(Source::Modrinth(s));
        }
        if let Some(s) = &self.curseforge {
            out.push(Source::Curseforge(s));
        }
        out
    }
}

/// Declarative description of one externally-sourced artifact, persisted
/// as `<path>.packmint.json` next to where the artifact will live.
///
/// `hashes` are computed from the actual bytes at creation time and are
/// immutable afterwards; swapping the artifact means a new manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileManifest {
    pub filename: String,
    pub hashes: ContentHashes,
    pub file_size: u64,
    pub sources: Sources,
    #[serde(default)]
    pub side: Side,
}

impl FileManifest {
    /// Build a manifest from freshly downloaded bytes.
    pub fn from_bytes(
        filename: impl Into<String>,
        sources: Sources,
        side: Side,
        bytes: &[u8],
    ) -> PackResult<Self> {
        let filename = filename.into();
        if sources.is_empty() {
            return Err(PackError::NoSources(filename));
        }

        Ok(FileManifest {
            filename,
            hashes: hash::digest(bytes),
            file_size: bytes.len() as u64,
            sources,
            side,
        })
    }

    /// Build a manifest from a provider release file, cross-checking the
    /// provider's declared hashes against the downloaded bytes when the
    /// provider supplies any.
    pub fn from_release_file(
        filename: impl Into<String>,
        declared: Option<&ContentHashes>,
        sources: Sources,
        side: Side,
        bytes: &[u8],
    ) -> PackResult<Self> {
        let manifest = Self::from_bytes(filename, sources, side, bytes)?;

        if let Some(declared) = declared {
            if declared.sha1 != manifest.hashes.sha1 {
                return Err(PackError::IntegrityMismatch {
                    path: manifest.filename,
                    algorithm: "sha1",
                    expected: declared.sha1.clone(),
                    actual: manifest.hashes.sha1,
                });
            }
            if declared.sha512 != manifest.hashes.sha512 {
                return Err(PackError::IntegrityMismatch {
                    path: manifest.filename,
                    algorithm: "sha512",
                    expected: declared.sha512.clone(),
                    actual: manifest.hashes.sha512,
                });
            }
        }

        Ok(manifest)
    }
}
