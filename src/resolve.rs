use std::collections::BTreeMap;

use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{PackError, PackResult};
use crate::hash;
use crate::pack::{FileManifest, Side};

/// Turns file manifests into verified bytes.
///
/// Sources are tried in the fixed priority order url > modrinth >
/// curseforge; a transport failure falls through to the next declared
/// source, an integrity mismatch never does.
pub struct Resolver {
    client: Client,
    /// Maximum number of parallel downloads.
    concurrency: usize,
}

impl Resolver {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            concurrency: 8,
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n;
        self
    }

    /// Resolve one manifest to its verified content.
    pub async fn resolve(&self, rel_path: &str, manifest: &FileManifest) -> PackResult<Vec<u8>> {
        let sources = manifest.sources.ordered();
        if sources.is_empty() {
            return Err(PackError::NoSources(rel_path.to_string()));
        }

        let mut last_failure = None;
        for source in sources {
            match self.fetch(source.url()).await {
                Ok(bytes) => {
                    verify_bytes(rel_path, manifest, &bytes)?;
                    debug!(
                        "Resolved {} from {} source ({} bytes)",
                        rel_path,
                        source.kind(),
                        bytes.len()
                    );
                    return Ok(bytes);
                }
                Err(e) => {
                    warn!(
                        "{} source failed for {}: {} (trying next)",
                        source.kind(),
                        rel_path,
                        e
                    );
                    last_failure = Some(e);
                }
            }
        }

        Err(PackError::SourceUnavailable {
            path: rel_path.to_string(),
            reason: last_failure
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no sources declared".to_string()),
        })
    }

    /// Resolve every manifest whose side matches `target`, with a bounded
    /// worker pool. One file's failure never aborts the rest; outcomes
    /// are collected per file.
    pub async fn resolve_all(
        &self,
        manifests: &BTreeMap<String, FileManifest>,
        target: Side,
    ) -> Vec<(String, PackResult<Vec<u8>>)> {
        let wanted: Vec<_> = manifests
            .iter()
            .filter(|(_, m)| m.side.included_for(target))
            .collect();

        info!(
            "Resolving {} of {} manifest(s), concurrency={}",
            wanted.len(),
            manifests.len(),
            self.concurrency
        );

        stream::iter(wanted)
            .map(|(rel_path, manifest)| async move {
                let outcome = self.resolve(rel_path, manifest).await;
                (rel_path.clone(), outcome)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    async fn fetch(&self, url: &str) -> PackResult<Vec<u8>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PackError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Check downloaded bytes against a manifest's stored hashes.
///
/// A mismatch is fatal for the file. The declared size is advisory only
/// and merely logs a warning when it disagrees.
pub fn verify_bytes(rel_path: &str, manifest: &FileManifest, bytes: &[u8]) -> PackResult<()> {
    let actual = hash::digest(bytes);

    if actual.sha1 != manifest.hashes.sha1 {
        return Err(PackError::IntegrityMismatch {
            path: rel_path.to_string(),
            algorithm: "sha1",
            expected: manifest.hashes.sha1.clone(),
            actual: actual.sha1,
        });
    }
    if actual.sha512 != manifest.hashes.sha512 {
        return Err(PackError::IntegrityMismatch {
            path: rel_path.to_string(),
            algorithm: "sha512",
            expected: manifest.hashes.sha512.clone(),
            actual: actual.sha512,
        });
    }

    if bytes.len() as u64 != manifest.file_size {
        warn!(
            "{}: declared size {} but got {} bytes (hashes match)",
            rel_path,
            manifest.file_size,
            bytes.len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::Sources;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one HTTP 200 response with `body`, then exit.
    async fn serve_once(body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(header.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
        });

        format!("http://{addr}/download.jar")
    }

    fn manifest_for(bytes: &[u8], url: &str) -> FileManifest {
        FileManifest::from_bytes("mod.jar", Sources::from_url(url), Side::Both, bytes).unwrap()
    }

    #[test]
    fn verify_accepts_matching_bytes() {
        let manifest = manifest_for(b"payload", "https://example.com/mod.jar");
        assert!(verify_bytes("mods/mod.packmint.json", &manifest, b"payload").is_ok());
    }

    #[test]
    fn verify_rejects_mismatched_bytes() {
        let manifest = manifest_for(b"payload", "https://example.com/mod.jar");
        let err = verify_bytes("mods/mod.packmint.json", &manifest, b"tampered").unwrap_err();
        match err {
            PackError::IntegrityMismatch {
                path, algorithm, ..
            } => {
                assert_eq!(path, "mods/mod.packmint.json");
                assert_eq!(algorithm, "sha1");
            }
            other => panic!("expected IntegrityMismatch, got {other}"),
        }
    }

    #[tokio::test]
    async fn resolve_returns_bytes_when_hashes_match() {
        let content = b"real jar content".to_vec();
        let url = serve_once(content.clone()).await;
        let manifest = manifest_for(&content, &url);

        let resolver = Resolver::new(Client::new());
        let bytes = resolver.resolve("mods/mod.packmint.json", &manifest).await.unwrap();
        assert_eq!(bytes, content);
    }

    #[tokio::test]
    async fn resolve_fails_closed_on_tampered_content() {
        let url = serve_once(b"tampered content".to_vec()).await;
        // Manifest hashes describe different bytes than the server sends.
        let manifest = manifest_for(b"expected content", &url);

        let resolver = Resolver::new(Client::new());
        let err = resolver
            .resolve("mods/mod.packmint.json", &manifest)
            .await
            .unwrap_err();
        assert!(matches!(err, PackError::IntegrityMismatch { .. }));
    }

    #[tokio::test]
    async fn unreachable_source_reports_source_unavailable() {
        // Bind-then-drop leaves a port nothing is listening on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let manifest = manifest_for(b"content", &format!("http://{addr}/gone.jar"));
        let resolver = Resolver::new(Client::new());
        let err = resolver
            .resolve("mods/gone.packmint.json", &manifest)
            .await
            .unwrap_err();
        assert!(matches!(err, PackError::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn resolve_all_skips_manifests_excluded_by_side() {
        let content = b"client jar".to_vec();
        let url = serve_once(content.clone()).await;

        let mut manifests = BTreeMap::new();
        manifests.insert(
            "mods/client.packmint.json".to_string(),
            FileManifest::from_bytes("client.jar", Sources::from_url(&url), Side::ClientOnly, &content)
                .unwrap(),
        );
        manifests.insert(
            "mods/server.packmint.json".to_string(),
            FileManifest::from_bytes(
                "server.jar",
                Sources::from_url("http://127.0.0.1:9/unreachable.jar"),
                Side::ServerOnly,
                b"server jar",
            )
            .unwrap(),
        );

        let resolver = Resolver::new(Client::new()).with_concurrency(2);
        let outcomes = resolver.resolve_all(&manifests, Side::ClientOnly).await;

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].0, "mods/client.packmint.json");
        assert_eq!(outcomes[0].1.as_ref().unwrap(), &content);
    }
}
