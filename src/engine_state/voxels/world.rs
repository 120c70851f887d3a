//! # World Module
//!
//! This module provides the `World` struct which owns everything that exists in the
//! voxel world at a given moment: the loaded chunks, the player-placed blocks, the
//! spatial registry offered to the renderer, and the queue of scene commands the
//! renderer has not consumed yet.
//!
//! ## Ownership
//!
//! The world is a plain aggregate owned by the engine state and mutated from the
//! main tick only. The chunk streamer and the mutation resolver both receive it by
//! `&mut` and keep the registry, the stores and the scene queue in step.

use crate::engine_state::rendering::{
    HandleAllocator, SceneCommand, SpatialObject, SpatialRegistry, SpatialTarget, TargetGeometry,
};

use super::{
    block::BlockResources,
    chunk::{store::ChunkStore, ChunkCoordinate, VoxelPosition},
    placed::PlacedBlocks,
};

/// The voxel world composed of loaded chunks and placed blocks.
#[derive(Debug)]
pub struct World {
    pub(crate) chunk_size: i32,
    pub(crate) chunks: ChunkStore,
    pub(crate) placed: PlacedBlocks,
    pub(crate) spatial: SpatialRegistry,
    pub(crate) handles: HandleAllocator,
    pub(crate) scene: Vec<SceneCommand>,
    pub(crate) resources: BlockResources,
}

impl World {
    /// Creates an empty world of `chunk_size` wide chunks drawn with `resources`.
    pub fn new(chunk_size: i32, resources: BlockResources) -> Self {
        Self {
            chunk_size,
            chunks: ChunkStore::new(),
            placed: PlacedBlocks::new(),
            spatial: SpatialRegistry::new(),
            handles: HandleAllocator::new(),
            scene: Vec::new(),
            resources,
        }
    }

    /// Horizontal chunk width in voxels.
    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    /// The loaded chunks.
    pub fn chunks(&self) -> &ChunkStore {
        &self.chunks
    }

    /// The player-placed blocks.
    pub fn placed(&self) -> &PlacedBlocks {
        &self.placed
    }

    /// Handles currently offered for ray casting.
    pub fn spatial(&self) -> &SpatialRegistry {
        &self.spatial
    }

    /// Shared block geometry and materials.
    pub fn resources(&self) -> &BlockResources {
        &self.resources
    }

    /// Scene commands queued since the last drain.
    pub fn pending_scene_commands(&self) -> &[SceneCommand] {
        &self.scene
    }

    /// Takes every queued scene command, oldest first.
    pub fn drain_scene_commands(&mut self) -> Vec<SceneCommand> {
        std::mem::take(&mut self.scene)
    }

    /// Whether a placed block or a visible chunk instance occupies `position`.
    pub fn is_occupied(&self, position: VoxelPosition) -> bool {
        if self.placed.at(position).is_some() {
            return true;
        }
        let chunk = ChunkCoordinate::containing(position, self.chunk_size);
        let Ok(loaded) = self.chunks.get(chunk) else {
            return false;
        };
        loaded
            .batches
            .values()
            .any(|batch| (0..batch.len()).any(|i| !batch.is_hidden(i) && batch.voxel(i) == Some(position)))
    }

    /// Geometry of every registered handle, sorted by handle.
    ///
    /// Registry entries whose owner has gone missing are skipped with an error log.
    pub fn spatial_targets(&self) -> Vec<SpatialTarget<'_>> {
        let mut targets = Vec::with_capacity(self.spatial.len());
        for handle in self.spatial.handles() {
            let geometry = match self.spatial.get(handle) {
                Some(SpatialObject::ChunkBatch { chunk, block_type }) => self
                    .chunks
                    .get(chunk)
                    .ok()
                    .and_then(|loaded| loaded.batch(block_type))
                    .map(TargetGeometry::Instances),
                Some(SpatialObject::PlacedBlock { position }) => Some(TargetGeometry::Block {
                    center: position.center(),
                }),
                None => None,
            };
            match geometry {
                Some(geometry) => targets.push(SpatialTarget { handle, geometry }),
                None => log::error!("registered handle {handle} has no geometry"),
            }
        }
        targets
    }

    /// Whether the registry holds exactly the batch handles of loaded chunks plus the
    /// handles of placed blocks.
    pub fn is_registry_consistent(&self) -> bool {
        let mut expected: Vec<_> = self
            .chunks
            .iter()
            .flat_map(|chunk| chunk.batch_handles())
            .chain(self.placed.iter().map(|block| block.handle))
            .collect();
        expected.sort_unstable();
        expected == self.spatial.handles()
    }
}
