use thiserror::Error;

/// A broken cross-reference inside a [`Scene`](crate::Scene).
///
/// Scene loaders are expected never to produce these; `Scene::validate`
/// catches them before any rendering starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("instance {instance} references {kind} {index}, but the scene has {count}")]
    ObjectOutOfRange {
        instance: usize,
        kind: &'static str,
        index: usize,
        count: usize,
    },

    #[error("mesh \"{mesh}\" polygon {polygon} indexes past the {buffer} buffer")]
    PolygonIndexOutOfRange {
        mesh: String,
        polygon: usize,
        buffer: &'static str,
    },

    #[error("{owner} material slot {slot} does not resolve (table has {available} entries)")]
    MaterialSlotUnresolved {
        owner: String,
        slot: u32,
        available: usize,
    },

    #[error("{owner} references material {material}, but the scene has {count}")]
    MaterialOutOfRange {
        owner: String,
        material: usize,
        count: usize,
    },

    #[error("material \"{material}\" references node {node}, but the node store has {count}")]
    NodeOutOfRange {
        material: String,
        node: usize,
        count: usize,
    },

    #[error("texture node references texture {texture}, but the scene has {count}")]
    TextureOutOfRange { texture: usize, count: usize },

    #[error("sphere {sphere} has non-positive radius {radius}")]
    InvalidSphere { sphere: usize, radius: f32 },
}

pub type SceneResult<T> = Result<T, SceneError>;
