pub mod model;
pub mod store;

pub use model::{
    CurseforgeSource, FileManifest, Loader, LoaderSpec, LooseFile, ModrinthSource, PackManifest,
    Side, Source, Sources, UrlSource,
};
pub use store::{PackStore, FILE_MANIFEST_SUFFIX, PACK_MANIFEST_NAME};
