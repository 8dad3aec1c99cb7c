pub mod curseforge;
pub mod modrinth;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::PackResult;
use crate::hash::ContentHashes;
use crate::pack::{Loader, Side};

pub use curseforge::Curseforge;
pub use modrinth::Modrinth;

/// One project in a provider's search results. Ordering is the provider's
/// own ranking and is not re-sorted locally.
#[derive(Debug, Clone)]
pub struct ProjectHit {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub side: Side,
}

/// One candidate file within a release.
#[derive(Debug, Clone)]
pub struct ReleaseFile {
    pub url: String,
    pub filename: String,
    /// Marks the canonical descriptor when a release ships several files.
    pub primary: bool,
    /// Hashes as declared by the provider; not every registry supplies
    /// the full pair, so manifests always recompute from actual bytes.
    pub hashes: Option<ContentHashes>,
}

/// Candidate release metadata, provider-agnostic.
#[derive(Debug, Clone)]
pub struct ProviderRelease {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub published: DateTime<Utc>,
    /// Loader tags this release declares ("fabric", "minecraft", ...).
    pub loaders: Vec<String>,
    /// Declared game versions; empty when the provider filtered already.
    pub game_versions: Vec<String>,
    pub files: Vec<ReleaseFile>,
}

/// The capability every registry client exposes. A not-found result is a
/// normal `Ok(None)` outcome; transport failures surface as
/// [`crate::PackError::Provider`].
#[async_trait]
pub trait Registry: Send + Sync {
    fn name(&self) -> &'static str;

    /// Best-effort ranked match against the provider's own index.
    async fn search(&self, query: &str) -> PackResult<Vec<ProjectHit>>;

    /// Releases declaring compatibility with the requested loader and
    /// game version.
    async fn list_releases(
        &self,
        project_id: &str,
        loader: Loader,
        game_version: &str,
    ) -> PackResult<Vec<ProviderRelease>>;

    /// Identify a release purely from file content, for idempotent
    /// re-import.
    async fn reverse_lookup(&self, bytes: &[u8]) -> PackResult<Option<ProviderRelease>>;
}
