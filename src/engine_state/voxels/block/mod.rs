//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel engine:
//! block type definitions, block face handling, and the drawable resources shared by
//! every chunk batch and placed block.
//!
//! ## Sharing
//!
//! There is exactly one cube geometry and one material per block type for the whole
//! process. Batches and placed blocks hold `Rc` clones of them, so unloading a chunk
//! only drops the chunk's references and never the resources themselves.

use std::{collections::HashMap, rc::Rc};

use block_type::BlockType;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Maps each drawable block type to its texture indices for each face.
///
/// The inner array contains 6 texture indices in `BlockSide` order:
/// [Front, Back, Bottom, Top, Left, Right]
static BLOCK_TYPE_TO_TEXTURE_INDICES: [(BlockType, [usize; 6]); 6] = [
    (BlockType::Dirt, [1, 1, 1, 1, 1, 1]),
    (BlockType::Grass, [2, 2, 1, 3, 2, 2]),
    (BlockType::Stone, [4, 4, 4, 4, 4, 4]),
    (BlockType::Log, [5, 5, 6, 6, 5, 5]),
    (BlockType::Leaf, [7, 7, 7, 7, 7, 7]),
    (BlockType::Planks, [0, 0, 0, 0, 0, 0]),
];

/// The unit cube every voxel is drawn with.
#[derive(Debug, PartialEq)]
pub struct CubeGeometry {
    /// Edge length in world units.
    pub size: f32,
}

/// Per-type material description handed to the renderer.
#[derive(Debug, PartialEq)]
pub struct BlockMaterial {
    /// The block type this material draws.
    pub block_type: BlockType,
    /// Texture index per face in `BlockSide` order.
    pub texture_indices: [usize; 6],
    /// Transparent-tested types need their own material instance.
    pub alpha_tested: bool,
}

/// Process-lifetime drawable resources shared by all chunks and placed blocks.
#[derive(Debug, Clone)]
pub struct BlockResources {
    geometry: Rc<CubeGeometry>,
    materials: HashMap<BlockType, Rc<BlockMaterial>>,
}

impl BlockResources {
    /// Builds the geometry and one material for every drawable block type.
    pub fn new() -> Self {
        let materials = BLOCK_TYPE_TO_TEXTURE_INDICES
            .iter()
            .map(|&(block_type, texture_indices)| {
                let material = BlockMaterial {
                    block_type,
                    texture_indices,
                    alpha_tested: block_type == BlockType::Leaf,
                };
                (block_type, Rc::new(material))
            })
            .collect();

        Self {
            geometry: Rc::new(CubeGeometry { size: 1.0 }),
            materials,
        }
    }

    /// Returns a copy of these resources with `block_type` unregistered.
    ///
    /// Batches are never built for types without a material.
    pub fn without(mut self, block_type: BlockType) -> Self {
        self.materials.remove(&block_type);
        self
    }

    /// The shared cube geometry.
    pub fn geometry(&self) -> &Rc<CubeGeometry> {
        &self.geometry
    }

    /// The shared material for `block_type`, if it has a drawable representation.
    pub fn material(&self, block_type: BlockType) -> Option<&Rc<BlockMaterial>> {
        self.materials.get(&block_type)
    }
}

impl Default for BlockResources {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_placeable_type_is_drawable() {
        let resources = BlockResources::new();
        for block_type in BlockType::default_hotbar() {
            let material = resources.material(block_type).expect("material registered");
            assert_eq!(material.block_type, block_type);
        }
        assert!(resources.material(BlockType::Air).is_none());
    }

    #[test]
    fn only_leaves_are_alpha_tested() {
        let resources = BlockResources::new();
        for block_type in BlockType::default_hotbar() {
            let alpha_tested = resources.material(block_type).map(|m| m.alpha_tested);
            assert_eq!(alpha_tested, Some(block_type == BlockType::Leaf));
        }
    }

    #[test]
    fn clones_share_the_same_resources() {
        let resources = BlockResources::new();
        let clone = resources.clone();
        assert!(Rc::ptr_eq(resources.geometry(), clone.geometry()));
    }
}
