// ─── packmint ───
// Declarative, content-addressed modpack manager engine.
//
// Architecture:
//   hash      — sha1/sha512 digests + CurseForge fingerprinting
//   pack/     — data model + manifest store (load/save, path safety)
//   providers — Modrinth and CurseForge registry clients
//   select    — loader/game-version compatibility selection
//   resolve   — manifest -> verified bytes, bounded concurrency
//   export/   — MultiMC bundle composition

pub mod error;
pub mod export;
pub mod hash;
pub mod http;
pub mod pack;
pub mod providers;
pub mod resolve;
pub mod select;

pub use error::{PackError, PackResult};
pub use pack::{FileManifest, Loader, PackManifest, PackStore, Side, Sources};
pub use providers::{Curseforge, Modrinth, Registry};
pub use resolve::Resolver;
