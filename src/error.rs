use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the whole engine.
/// Every module returns `Result<T, PackError>`.
#[derive(Debug, Error)]
pub enum PackError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("{provider} returned HTTP {status} for {url}")]
    Provider {
        provider: &'static str,
        url: String,
        status: u16,
    },

    // ── Documents ───────────────────────────────────────
    #[error("malformed manifest at {path:?}: {source}")]
    Manifest {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Selection ───────────────────────────────────────
    #[error("no {loader} release compatible with minecraft {game_version}")]
    NoCompatibleRelease {
        loader: String,
        game_version: String,
    },

    // ── Integrity ───────────────────────────────────────
    #[error("{algorithm} mismatch for {path}: expected {expected}, got {actual}")]
    IntegrityMismatch {
        path: String,
        algorithm: &'static str,
        expected: String,
        actual: String,
    },

    // ── Resolution ──────────────────────────────────────
    #[error("no reachable source for {path}: {reason}")]
    SourceUnavailable { path: String, reason: String },

    #[error("manifest for {0} declares no sources")]
    NoSources(String),

    // ── Store ───────────────────────────────────────────
    #[error("path escapes the pack directory: {0}")]
    PathViolation(String),

    // ── Export ──────────────────────────────────────────
    #[error("export failed for {} file(s): {}", failures.len(), failures.join("; "))]
    Export { failures: Vec<String> },

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Convenience alias used throughout the crate.
pub type PackResult<T> = Result<T, PackError>;

impl From<std::io::Error> for PackError {
    fn from(source: std::io::Error) -> Self {
        PackError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}
