use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::modrinth::check_status;
use super::{ProjectHit, ProviderRelease, Registry, ReleaseFile};
use crate::error::PackResult;
use crate::hash;
use crate::pack::{Loader, Side};

const CURSEFORGE_API: &str = "https://api.curseforge.com/v1";

/// CurseForge's game id for Minecraft.
const GAME_ID_MINECRAFT: u32 = 432;

/// Client for the CurseForge v1 REST API. Requires an API key.
pub struct Curseforge {
    client: Client,
    api_key: String,
}

// ── API response shapes ─────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CfMod {
    id: u64,
    slug: String,
    name: String,
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CfFile {
    id: u64,
    mod_id: u64,
    display_name: String,
    file_name: String,
    file_date: DateTime<Utc>,
    /// Absent when the author disallows third-party distribution.
    download_url: Option<String>,
    #[serde(default)]
    game_versions: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FingerprintMatches {
    #[serde(default)]
    exact_matches: Vec<FingerprintMatch>,
}

#[derive(Debug, Deserialize)]
struct FingerprintMatch {
    file: CfFile,
}

#[derive(Debug, Serialize)]
struct FingerprintQuery {
    fingerprints: Vec<u32>,
}

/// CurseForge encodes loaders as numeric `modLoaderType` values.
fn mod_loader_type(loader: Loader) -> u8 {
    match loader {
        Loader::Forge => 1,
        Loader::Fabric => 4,
        Loader::Quilt => 5,
        Loader::Neoforge => 6,
    }
}

impl CfFile {
    /// One CurseForge file is one release; `gameVersions` mixes game
    /// versions with loader names, so loader tags come from the caller's
    /// filter where one was applied.
    fn into_release(self, loaders: Vec<String>) -> ProviderRelease {
        let files = match self.download_url {
            Some(url) => vec![ReleaseFile {
                url,
                filename: self.file_name,
                primary: true,
                // CurseForge publishes sha1/md5 only, never the full
                // pair, so manifests recompute from the bytes.
                hashes: None,
            }],
            None => Vec::new(),
        };

        ProviderRelease {
            id: self.id.to_string(),
            project_id: self.mod_id.to_string(),
            name: self.display_name,
            published: self.file_date,
            loaders,
            game_versions: self
                .game_versions
                .iter()
                .filter(|v| v.chars().next().is_some_and(|c| c.is_ascii_digit()))
                .cloned()
                .collect(),
            files,
        }
    }
}

impl Curseforge {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    fn get(&self, url: String) -> reqwest::RequestBuilder {
        self.client.get(url).header("x-api-key", &self.api_key)
    }
}

#[async_trait]
impl Registry for Curseforge {
    fn name(&self) -> &'static str {
        "curseforge"
    }

    async fn search(&self, query: &str) -> PackResult<Vec<ProjectHit>> {
        let response = self
            .get(format!("{CURSEFORGE_API}/mods/search"))
            .query(&[
                ("gameId", GAME_ID_MINECRAFT.to_string()),
                ("searchFilter", query.to_string()),
            ])
            .send()
            .await?;
        let response = check_status("curseforge", response)?;
        let mods: Envelope<Vec<CfMod>> = response.json().await?;

        Ok(mods
            .data
            .into_iter()
            .map(|m| ProjectHit {
                id: m.id.to_string(),
                slug: m.slug,
                title: m.name,
                description: m.summary,
                // CurseForge does not expose per-side support.
                side: Side::Both,
            })
            .collect())
    }

    async fn list_releases(
        &self,
        project_id: &str,
        loader: Loader,
        game_version: &str,
    ) -> PackResult<Vec<ProviderRelease>> {
        let response = self
            .get(format!("{CURSEFORGE_API}/mods/{project_id}/files"))
            .query(&[
                ("gameVersion", game_version.to_string()),
                ("modLoaderType", mod_loader_type(loader).to_string()),
            ])
            .send()
            .await?;
        let response = check_status("curseforge", response)?;
        let files: Envelope<Vec<CfFile>> = response.json().await?;

        debug!(
            "CurseForge returned {} file(s) for {}",
            files.data.len(),
            project_id
        );
        Ok(files
            .data
            .into_iter()
            .map(|f| f.into_release(vec![loader.tag().to_string()]))
            .collect())
    }

    async fn reverse_lookup(&self, bytes: &[u8]) -> PackResult<Option<ProviderRelease>> {
        let fingerprint = hash::curseforge_fingerprint(bytes);
        let response = self
            .client
            .post(format!("{CURSEFORGE_API}/fingerprints/{GAME_ID_MINECRAFT}"))
            .header("x-api-key", &self.api_key)
            .json(&FingerprintQuery {
                fingerprints: vec![fingerprint],
            })
            .send()
            .await?;
        let response = check_status("curseforge", response)?;
        let matches: Envelope<FingerprintMatches> = response.json().await?;

        Ok(matches.data.exact_matches.into_iter().next().map(|m| {
            let loaders = m
                .file
                .game_versions
                .iter()
                .map(|v| v.to_ascii_lowercase())
                .collect();
            m.file.into_release(loaders)
        }))
    }
}
