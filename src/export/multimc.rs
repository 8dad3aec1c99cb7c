use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use serde::Serialize;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::component::{MmcComponent, PackComponent};
use crate::error::PackResult;
use crate::pack::PackManifest;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MmcPack {
    format_version: u32,
    components: Vec<MmcComponent>,
}

/// Compose a MultiMC-compatible instance archive.
///
/// Pure given its inputs: `files` must already be resolved, side-filtered
/// bytes keyed by their relative path. When `pack_url` is given it is
/// embedded as a pre-launch self-update command; otherwise that metadata
/// is omitted entirely.
pub fn compose(
    pack: &PackManifest,
    components: &[PackComponent],
    files: &BTreeMap<String, Vec<u8>>,
    pack_url: Option<&str>,
) -> PackResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let mmc_pack = MmcPack {
        format_version: 1,
        components: components.iter().map(MmcComponent::from).collect(),
    };
    zip.start_file("mmc-pack.json", options)?;
    zip.write_all(serde_json::to_string_pretty(&mmc_pack)?.as_bytes())?;

    let mut instance_cfg = format!("InstanceType=OneSix\nname={}\n", pack.name);
    if let Some(url) = pack_url {
        instance_cfg.push_str(&format!("PreLaunchCommand=packmint install {url}\n"));
    }
    zip.start_file("instance.cfg", options)?;
    zip.write_all(instance_cfg.as_bytes())?;

    for (rel_path, bytes) in files {
        zip.start_file(format!(".minecraft/{rel_path}"), options)?;
        zip.write_all(bytes)?;
    }

    let cursor = zip.finish()?;
    info!(
        "Composed MultiMC bundle for '{}': {} component(s), {} file(s)",
        pack.name,
        components.len(),
        files.len()
    );
    Ok(cursor.into_inner())
}
