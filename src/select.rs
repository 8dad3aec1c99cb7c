use tracing::debug;

use crate::error::{PackError, PackResult};
use crate::pack::Loader;
use crate::providers::{ProviderRelease, ReleaseFile};

/// Pick the best release for a target loader and game version.
///
/// A release is eligible when its loader tags contain the generic
/// "minecraft" tag or the requested loader's tag, and when it either
/// declares no game versions (provider already filtered) or declares the
/// requested one. Most recent publication wins; ties break on the
/// provider-assigned id, descending.
pub fn select_release<'a>(
    releases: &'a [ProviderRelease],
    loader: Loader,
    game_version: &str,
) -> PackResult<&'a ProviderRelease> {
    let mut eligible: Vec<&ProviderRelease> = releases
        .iter()
        .filter(|r| {
            r.loaders
                .iter()
                .any(|tag| tag == "minecraft" || tag == loader.tag())
        })
        .filter(|r| {
            r.game_versions.is_empty() || r.game_versions.iter().any(|v| v == game_version)
        })
        .collect();

    eligible.sort_by(|a, b| {
        b.published
            .cmp(&a.published)
            .then_with(|| b.id.cmp(&a.id))
    });

    debug!(
        "{} of {} release(s) eligible for {loader} / {game_version}",
        eligible.len(),
        releases.len()
    );

    eligible
        .first()
        .copied()
        .ok_or_else(|| PackError::NoCompatibleRelease {
            loader: loader.to_string(),
            game_version: game_version.to_string(),
        })
}

/// The canonical file descriptor within a release: the one flagged
/// primary, else the first in provider order. `None` only when the
/// release has no files at all.
pub fn primary_file(release: &ProviderRelease) -> Option<&ReleaseFile> {
    release
        .files
        .iter()
        .find(|f| f.primary)
        .or_else(|| release.files.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn release(id: &str, loader: &str, ts: i64) -> ProviderRelease {
        ProviderRelease {
            id: id.to_string(),
            project_id: "proj".to_string(),
            name: format!("release {id}"),
            published: Utc.timestamp_opt(ts, 0).unwrap(),
            loaders: vec![loader.to_string()],
            game_versions: vec!["1.20.4".to_string()],
            files: Vec::new(),
        }
    }

    #[test]
    fn picks_most_recent_eligible_release() {
        let releases = vec![
            release("r1", "fabric", 1),
            release("r2", "forge", 2),
            release("r3", "fabric", 3),
        ];
        let chosen = select_release(&releases, Loader::Fabric, "1.20.4").unwrap();
        assert_eq!(chosen.id, "r3");
    }

    #[test]
    fn generic_minecraft_tag_is_always_eligible() {
        let releases = vec![release("dp1", "minecraft", 5)];
        let chosen = select_release(&releases, Loader::Forge, "1.20.4").unwrap();
        assert_eq!(chosen.id, "dp1");
    }

    #[test]
    fn no_eligible_release_is_an_error() {
        let releases = vec![release("r1", "forge", 1), release("r2", "forge", 2)];
        let err = select_release(&releases, Loader::Fabric, "1.20.4").unwrap_err();
        assert!(matches!(err, PackError::NoCompatibleRelease { .. }));
    }

    #[test]
    fn wrong_game_version_is_not_eligible() {
        let mut r = release("r1", "fabric", 1);
        r.game_versions = vec!["1.19.2".to_string()];
        let err = select_release(&[r], Loader::Fabric, "1.20.4").unwrap_err();
        assert!(matches!(err, PackError::NoCompatibleRelease { .. }));
    }

    #[test]
    fn timestamp_tie_breaks_on_id_descending() {
        let releases = vec![release("aaa", "fabric", 7), release("bbb", "fabric", 7)];
        let chosen = select_release(&releases, Loader::Fabric, "1.20.4").unwrap();
        assert_eq!(chosen.id, "bbb");
    }

    #[test]
    fn primary_file_falls_back_to_first_descriptor() {
        let mut r = release("r1", "fabric", 1);
        r.files = vec![
            ReleaseFile {
                url: "https://example.com/a.jar".into(),
                filename: "a.jar".into(),
                primary: false,
                hashes: None,
            },
            ReleaseFile {
                url: "https://example.com/b.jar".into(),
                filename: "b.jar".into(),
                primary: false,
                hashes: None,
            },
        ];
        assert_eq!(primary_file(&r).unwrap().filename, "a.jar");

        r.files[1].primary = true;
        assert_eq!(primary_file(&r).unwrap().filename, "b.jar");
    }
}
