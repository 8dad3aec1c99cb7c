use serde::Serialize;

use crate::pack::{Loader, PackManifest};

/// One piece of the runtime environment declared in the exported bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackComponent {
    Minecraft(String),
    FabricLoader(String),
    MinecraftForge(String),
    Neoforge(String),
    QuiltLoader(String),
}

impl PackComponent {
    /// The MultiMC component uid. Exhaustive by construction; adding a
    /// loader kind means adding exactly one arm here.
    pub fn uid(&self) -> &'static str {
        match self {
            PackComponent::Minecraft(_) => "net.minecraft",
            PackComponent::FabricLoader(_) => "net.fabricmc.fabric-loader",
            PackComponent::MinecraftForge(_) => "net.minecraftforge",
            PackComponent::Neoforge(_) => "net.neoforged",
            PackComponent::QuiltLoader(_) => "org.quiltmc.quilt-loader",
        }
    }

    pub fn version(&self) -> &str {
        match self {
            PackComponent::Minecraft(v)
            | PackComponent::FabricLoader(v)
            | PackComponent::MinecraftForge(v)
            | PackComponent::Neoforge(v)
            | PackComponent::QuiltLoader(v) => v,
        }
    }
}

/// Serialized form inside `mmc-pack.json`.
#[derive(Debug, Serialize)]
pub struct MmcComponent {
    pub uid: String,
    pub version: String,
}

impl From<&PackComponent> for MmcComponent {
    fn from(component: &PackComponent) -> Self {
        MmcComponent {
            uid: component.uid().to_string(),
            version: component.version().to_string(),
        }
    }
}

/// The ordered component list for a pack: the game version first, then
/// its loader.
pub fn components_for(pack: &PackManifest) -> Vec<PackComponent> {
    let loader_version = pack.loader.version.clone();
    vec![
        PackComponent::Minecraft(pack.minecraft.clone()),
        match pack.loader.kind {
            Loader::Fabric => PackComponent::FabricLoader(loader_version),
            Loader::Forge => PackComponent::MinecraftForge(loader_version),
            Loader::Neoforge => PackComponent::Neoforge(loader_version),
            Loader::Quilt => PackComponent::QuiltLoader(loader_version),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::LoaderSpec;

    fn pack_with(kind: Loader) -> PackManifest {
        PackManifest {
            name: "p".into(),
            version: "1.0.0".into(),
            minecraft: "1.20.4".into(),
            loader: LoaderSpec {
                kind,
                version: "0.16.10".into(),
            },
            files: Vec::new(),
        }
    }

    #[test]
    fn game_version_component_comes_first() {
        let components = components_for(&pack_with(Loader::Fabric));
        assert_eq!(components[0], PackComponent::Minecraft("1.20.4".into()));
        assert_eq!(components[1].uid(), "net.fabricmc.fabric-loader");
    }

    #[test]
    fn every_loader_kind_maps_to_a_distinct_uid() {
        let uids: Vec<_> = [Loader::Fabric, Loader::Forge, Loader::Neoforge, Loader::Quilt]
            .iter()
            .map(|&kind| components_for(&pack_with(kind))[1].uid())
            .collect();
        let mut deduped = uids.clone();
        deduped.dedup();
        assert_eq!(uids, deduped);
        assert_eq!(uids.len(), 4);
    }
}
