use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::{ProjectHit, ProviderRelease, Registry, ReleaseFile};
use crate::error::{PackError, PackResult};
use crate::hash::{self, ContentHashes};
use crate::pack::{Loader, Side};

const MODRINTH_API: &str = "https://api.modrinth.com/v2";

/// Client for the Modrinth v2 REST API.
pub struct Modrinth {
    client: Client,
}

// ── API response shapes ─────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Vec<SearchProject>,
}

#[derive(Debug, Deserialize)]
struct SearchProject {
    #[serde(rename = "project_id")]
    id: String,
    slug: String,
    title: String,
    description: String,
    client_side: EnvType,
    server_side: EnvType,
}

#[derive(Debug, Deserialize)]
pub struct ModrinthProject {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub client_side: EnvType,
    pub server_side: EnvType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvType {
    Required,
    Optional,
    Unsupported,
}

#[derive(Debug, Deserialize)]
struct ModrinthVersion {
    id: String,
    #[serde(rename = "project_id")]
    project_id: String,
    name: String,
    #[serde(rename = "date_published")]
    published: DateTime<Utc>,
    loaders: Vec<String>,
    #[serde(default)]
    game_versions: Vec<String>,
    files: Vec<ModrinthFile>,
}

#[derive(Debug, Deserialize)]
struct ModrinthFile {
    url: String,
    filename: String,
    primary: bool,
    hashes: ModrinthFileHashes,
}

#[derive(Debug, Deserialize)]
struct ModrinthFileHashes {
    sha1: String,
    sha512: String,
}

/// Map Modrinth's per-environment support pair onto a [`Side`].
pub fn env_pair_to_side(client_side: EnvType, server_side: EnvType) -> Side {
    match (client_side, server_side) {
        (EnvType::Unsupported, EnvType::Required) => Side::ServerOnly,
        (EnvType::Unsupported, EnvType::Optional) => Side::ClientOnly,
        (EnvType::Required, EnvType::Unsupported) => Side::ClientOnly,
        (EnvType::Optional, EnvType::Unsupported) => Side::ServerOnly,
        _ => Side::Both,
    }
}

impl From<ModrinthVersion> for ProviderRelease {
    fn from(version: ModrinthVersion) -> Self {
        ProviderRelease {
            id: version.id,
            project_id: version.project_id,
            name: version.name,
            published: version.published,
            loaders: version.loaders,
            game_versions: version.game_versions,
            files: version
                .files
                .into_iter()
                .map(|f| ReleaseFile {
                    url: f.url,
                    filename: f.filename,
                    primary: f.primary,
                    hashes: Some(ContentHashes {
                        sha1: f.hashes.sha1,
                        sha512: f.hashes.sha512,
                    }),
                })
                .collect(),
        }
    }
}

impl Modrinth {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch a project by id or slug; 404 is a normal not-found.
    pub async fn get_project(&self, id_or_slug: &str) -> PackResult<Option<ModrinthProject>> {
        let url = format!("{MODRINTH_API}/project/{id_or_slug}");
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status("modrinth", response)?;
        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl Registry for Modrinth {
    fn name(&self) -> &'static str {
        "modrinth"
    }

    async fn search(&self, query: &str) -> PackResult<Vec<ProjectHit>> {
        let response = self
            .client
            .get(format!("{MODRINTH_API}/search"))
            .query(&[("query", query)])
            .send()
            .await?;
        let response = check_status("modrinth", response)?;
        let search: SearchResponse = response.json().await?;

        Ok(search
            .hits
            .into_iter()
            .map(|hit| ProjectHit {
                id: hit.id,
                slug: hit.slug,
                title: hit.title,
                description: hit.description,
                side: env_pair_to_side(hit.client_side, hit.server_side),
            })
            .collect())
    }

    async fn list_releases(
        &self,
        project_id: &str,
        loader: Loader,
        game_version: &str,
    ) -> PackResult<Vec<ProviderRelease>> {
        // "minecraft" marks loader-independent releases such as datapacks.
        let loaders = format!(r#"["minecraft","{}"]"#, loader.tag());
        let game_versions = format!(r#"["{game_version}"]"#);

        let response = self
            .client
            .get(format!("{MODRINTH_API}/project/{project_id}/version"))
            .query(&[("loaders", loaders), ("game_versions", game_versions)])
            .send()
            .await?;
        let response = check_status("modrinth", response)?;
        let versions: Vec<ModrinthVersion> = response.json().await?;

        debug!(
            "Modrinth returned {} release(s) for {}",
            versions.len(),
            project_id
        );
        Ok(versions.into_iter().map(ProviderRelease::from).collect())
    }

    async fn reverse_lookup(&self, bytes: &[u8]) -> PackResult<Option<ProviderRelease>> {
        let sha1 = hash::digest(bytes).sha1;
        let response = self
            .client
            .get(format!("{MODRINTH_API}/version_file/{sha1}"))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status("modrinth", response)?;
        let version: ModrinthVersion = response.json().await?;
        Ok(Some(version.into()))
    }
}

pub(super) fn check_status(
    provider: &'static str,
    response: reqwest::Response,
) -> PackResult<reqwest::Response> {
    let status = response.status();
    if !status.is_success() {
        return Err(PackError::Provider {
            provider,
            url: response.url().to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_version_payload() {
        let json = r#"{
            "id": "rA42Vocr",
            "project_id": "AANobbMI",
            "name": "Sodium 0.5.8",
            "date_published": "2024-02-08T12:30:00.123456Z",
            "loaders": ["fabric", "quilt"],
            "game_versions": ["1.20.4"],
            "files": [{
                "url": "https://cdn.modrinth.com/data/AANobbMI/sodium.jar",
                "filename": "sodium.jar",
                "primary": true,
                "hashes": { "sha1": "aa", "sha512": "bb" }
            }]
        }"#;
        let version: ModrinthVersion = serde_json::from_str(json).unwrap();
        let release: ProviderRelease = version.into();
        assert_eq!(release.id, "rA42Vocr");
        assert_eq!(release.loaders, ["fabric", "quilt"]);
        assert!(release.files[0].primary);
        assert_eq!(
            release.files[0].hashes.as_ref().unwrap().sha1,
            "aa"
        );
    }

    #[test]
    fn env_pair_mapping_matches_modrinth_semantics() {
        assert_eq!(
            env_pair_to_side(EnvType::Unsupported, EnvType::Required),
            Side::ServerOnly
        );
        assert_eq!(
            env_pair_to_side(EnvType::Required, EnvType::Unsupported),
            Side::ClientOnly
        );
        assert_eq!(
            env_pair_to_side(EnvType::Required, EnvType::Required),
            Side::Both
        );
        assert_eq!(
            env_pair_to_side(EnvType::Optional, EnvType::Optional),
            Side::Both
        );
    }

    #[test]
    fn unknown_env_type_is_rejected() {
        let err = serde_json::from_str::<EnvType>(r#""sometimes""#);
        assert!(err.is_err());
    }
}
