//! Blocks placed by the player.
//!
//! Placed blocks live outside the chunk system. Each one is a standalone drawable with
//! its own handle and survives chunk unloads.

use std::{collections::HashMap, rc::Rc};

use crate::engine_state::rendering::ObjectHandle;

use super::{
    block::{block_type::BlockType, BlockMaterial},
    chunk::VoxelPosition,
};

/// A single player-placed block.
#[derive(Debug, Clone)]
pub struct PlacedBlock {
    /// Drawable handle.
    pub handle: ObjectHandle,
    /// Occupied voxel.
    pub position: VoxelPosition,
    /// Block type.
    pub block_type: BlockType,
    /// Shared material of `block_type`.
    pub material: Rc<BlockMaterial>,
}

/// Placed blocks indexed both by handle and by position.
///
/// At most one placed block occupies a voxel.
#[derive(Debug, Default)]
pub struct PlacedBlocks {
    by_handle: HashMap<ObjectHandle, PlacedBlock>,
    by_position: HashMap<VoxelPosition, ObjectHandle>,
}

impl PlacedBlocks {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `block`. Returns `false` and drops it if its voxel is already taken.
    pub fn insert(&mut self, block: PlacedBlock) -> bool {
        if self.by_position.contains_key(&block.position) || self.by_handle.contains_key(&block.handle) {
            return false;
        }
        self.by_position.insert(block.position, block.handle);
        self.by_handle.insert(block.handle, block);
        true
    }

    /// Removes the block with `handle`.
    pub fn remove(&mut self, handle: ObjectHandle) -> Option<PlacedBlock> {
        let block = self.by_handle.remove(&handle)?;
        self.by_position.remove(&block.position);
        Some(block)
    }

    /// The block with `handle`.
    pub fn get(&self, handle: ObjectHandle) -> Option<&PlacedBlock> {
        self.by_handle.get(&handle)
    }

    /// The block occupying `position`.
    pub fn at(&self, position: VoxelPosition) -> Option<&PlacedBlock> {
        self.by_position
            .get(&position)
            .and_then(|handle| self.by_handle.get(handle))
    }

    /// Number of placed blocks.
    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    /// Whether nothing has been placed.
    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }

    /// Iterates placed blocks in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &PlacedBlock> {
        self.by_handle.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::BlockResources;

    fn placed(handle: u64, position: VoxelPosition) -> PlacedBlock {
        let resources = BlockResources::new();
        PlacedBlock {
            handle: ObjectHandle(handle),
            position,
            block_type: BlockType::Planks,
            material: Rc::clone(resources.material(BlockType::Planks).expect("planks material")),
        }
    }

    #[test]
    fn one_block_per_voxel() {
        let mut blocks = PlacedBlocks::new();
        let position = VoxelPosition::new(0, 5, 0);
        assert!(blocks.insert(placed(1, position)));
        assert!(!blocks.insert(placed(2, position)));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks.at(position).map(|b| b.handle), Some(ObjectHandle(1)));
    }

    #[test]
    fn removal_frees_the_voxel() {
        let mut blocks = PlacedBlocks::new();
        let position = VoxelPosition::new(-3, 1, 2);
        blocks.insert(placed(4, position));
        let removed = blocks.remove(ObjectHandle(4)).expect("placed");
        assert_eq!(removed.position, position);
        assert!(blocks.at(position).is_none());
        assert!(blocks.remove(ObjectHandle(4)).is_none());
        assert!(blocks.insert(placed(5, position)));
    }
}
