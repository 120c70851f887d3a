//! Renderer-facing side of the voxel engine.
//!
//! Drawing, the camera and ray intersection belong to an external renderer. This
//! module defines what the engine hands across that boundary:
//!
//! * `ObjectHandle` - opaque identity of every drawable (chunk containers, chunk
//!   batches, placed blocks)
//! * `SceneCommand` - attach/detach/hide instructions the renderer replays each frame
//! * `instancing` - per-type instance batches built from chunk block maps
//! * `spatial_registry` - the set of raycastable handles
//! * `raycast` - the ray query seam plus a CPU reference implementation

use std::fmt;

use crate::engine_state::voxels::{
    block::block_type::BlockType,
    chunk::{ChunkCoordinate, VoxelPosition},
};

pub mod instancing;
pub mod raycast;
pub mod spatial_registry;

pub use instancing::{InstanceBatch, InstanceBatcher, InstanceRaw};
pub use raycast::{CpuRaycaster, Ray, RayCaster, RayHit, SpatialTarget, TargetGeometry};
pub use spatial_registry::{SpatialObject, SpatialRegistry};

/// Opaque identity of a drawable handed to the renderer. Never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(pub u64);

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out monotonically increasing handles.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    last: u64,
}

impl HandleAllocator {
    /// Creates an allocator whose first handle is `#1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh handle.
    pub fn allocate(&mut self) -> ObjectHandle {
        self.last += 1;
        ObjectHandle(self.last)
    }
}

/// Scene graph changes produced during a frame, in the order they happened.
///
/// This is the renderer's view of the streaming and mutation work: it never has to
/// inspect the engine's internal state to keep its scene in sync.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    /// A chunk container with its batches entered the scene.
    AttachChunk {
        /// Container handle of the chunk.
        container: ObjectHandle,
        /// Which chunk.
        chunk: ChunkCoordinate,
        /// Drawable handles of the chunk's batches.
        batches: Vec<ObjectHandle>,
    },
    /// A chunk container and all of its batches left the scene.
    DetachChunk {
        /// Container handle of the chunk.
        container: ObjectHandle,
        /// Which chunk.
        chunk: ChunkCoordinate,
    },
    /// A placed block entered the scene.
    AttachBlock {
        /// Handle of the placed block.
        handle: ObjectHandle,
        /// Where it sits.
        position: VoxelPosition,
        /// What it is.
        block_type: BlockType,
    },
    /// A placed block left the scene.
    DetachBlock {
        /// Handle of the placed block.
        handle: ObjectHandle,
    },
    /// One instance of a batch now has a zero-scale transform.
    HideInstance {
        /// The batch.
        batch: ObjectHandle,
        /// Instance slot inside the batch.
        index: usize,
    },
}
