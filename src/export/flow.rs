use std::collections::BTreeMap;

use tracing::info;

use super::component::components_for;
use super::multimc;
use crate::error::{PackError, PackResult};
use crate::pack::{PackStore, Side};
use crate::resolve::Resolver;

/// Resolve a whole pack and compose the MultiMC bundle for `target`.
///
/// Manifests and loose files whose side is incompatible with `target`
/// are skipped. Per-file resolution failures are collected and reported
/// together; any failure aborts the export before composition.
///
/// When `pack_url` is supplied the bundle is metadata-only: the launcher
/// fetches the files itself on update, so nothing is resolved here.
pub async fn export_multimc(
    store: &PackStore,
    resolver: &Resolver,
    target: Side,
    pack_url: Option<&str>,
) -> PackResult<Vec<u8>> {
    let components = components_for(store.manifest());
    let files = match pack_url {
        Some(_) => BTreeMap::new(),
        None => resolve_files(store, resolver, target).await?,
    };

    info!(
        "Exporting '{}' for {:?} target with {} file(s)",
        store.manifest().name,
        target,
        files.len()
    );
    multimc::compose(store.manifest(), &components, &files, pack_url)
}

async fn resolve_files(
    store: &PackStore,
    resolver: &Resolver,
    target: Side,
) -> PackResult<BTreeMap<String, Vec<u8>>> {
    let mut files: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    let mut failures = Vec::new();

    let outcomes = resolver.resolve_all(store.manifests(), target).await;
    for (manifest_path, outcome) in outcomes {
        match outcome {
            Ok(bytes) => {
                // The store guarantees this key exists.
                let manifest = &store.manifests()[&manifest_path];
                files.insert(artifact_path(&manifest_path, &manifest.filename), bytes);
            }
            Err(e) => failures.push(format!("{manifest_path}: {e}")),
        }
    }

    for loose in store.loose_files() {
        if !loose.side.included_for(target) {
            continue;
        }
        let path = store.join_checked(&loose.path)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                files.insert(loose.path.clone(), bytes);
            }
            Err(source) => failures.push(format!(
                "{}: {}",
                loose.path,
                PackError::Io { path, source }
            )),
        }
    }

    if !failures.is_empty() {
        return Err(PackError::Export { failures });
    }

    Ok(files)
}

/// Where the artifact lands relative to the pack root: the manifest
/// document's directory joined with the declared filename.
fn artifact_path(manifest_rel_path: &str, filename: &str) -> String {
    match manifest_rel_path.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/{filename}"),
        None => filename.to_string(),
    }
}
