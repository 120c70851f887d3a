//! The set of objects offered to the renderer for ray casting.
//!
//! Only two parties mutate the registry: the chunk streamer (chunk batch handles)
//! and the mutation resolver (placed block handles). Both run on the main tick.

use std::collections::HashMap;

use crate::engine_state::voxels::{
    block::block_type::BlockType,
    chunk::{ChunkCoordinate, VoxelPosition},
};

use super::ObjectHandle;

/// What a registered handle stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialObject {
    /// The batch of `block_type` instances in a loaded chunk.
    ChunkBatch {
        /// Owning chunk.
        chunk: ChunkCoordinate,
        /// Batch type.
        block_type: BlockType,
    },
    /// A standalone block placed by the player.
    PlacedBlock {
        /// Where it sits.
        position: VoxelPosition,
    },
}

/// Raycastable handles keyed by handle.
#[derive(Debug, Default)]
pub struct SpatialRegistry {
    objects: HashMap<ObjectHandle, SpatialObject>,
}

impl SpatialRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle`. Returns `false` if it was already registered.
    pub fn register(&mut self, handle: ObjectHandle, object: SpatialObject) -> bool {
        if self.objects.contains_key(&handle) {
            return false;
        }
        self.objects.insert(handle, object);
        true
    }

    /// Removes `handle`, returning what it stood for.
    pub fn unregister(&mut self, handle: ObjectHandle) -> Option<SpatialObject> {
        self.objects.remove(&handle)
    }

    /// What `handle` stands for, if registered.
    pub fn get(&self, handle: ObjectHandle) -> Option<SpatialObject> {
        self.objects.get(&handle).copied()
    }

    /// Whether `handle` is registered.
    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.objects.contains_key(&handle)
    }

    /// Number of registered handles.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Every registered handle, sorted.
    pub fn handles(&self) -> Vec<ObjectHandle> {
        let mut handles: Vec<_> = self.objects.keys().copied().collect();
        handles.sort_unstable();
        handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_unregister() {
        let mut registry = SpatialRegistry::new();
        let placed = SpatialObject::PlacedBlock {
            position: VoxelPosition::new(1, 2, 3),
        };
        assert!(registry.register(ObjectHandle(7), placed));
        assert!(!registry.register(ObjectHandle(7), placed));
        assert_eq!(registry.get(ObjectHandle(7)), Some(placed));
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.unregister(ObjectHandle(7)), Some(placed));
        assert_eq!(registry.unregister(ObjectHandle(7)), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn handles_are_listed_in_order() {
        let mut registry = SpatialRegistry::new();
        for id in [5, 1, 3] {
            registry.register(
                ObjectHandle(id),
                SpatialObject::ChunkBatch {
                    chunk: ChunkCoordinate::new(0, 0),
                    block_type: BlockType::Stone,
                },
            );
        }
        assert_eq!(
            registry.handles(),
            vec![ObjectHandle(1), ObjectHandle(3), ObjectHandle(5)]
        );
    }
}
