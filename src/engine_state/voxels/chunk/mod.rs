//! # Chunk Module
//!
//! This module provides the coordinate types that address chunks and voxels, the
//! sparse `BlockMap` holding a chunk's blocks, and the `LoadedChunk` record owned by
//! the chunk store.
//!
//! ## Sparse Storage
//!
//! A chunk spans `chunk_size` voxels along X and Z and an unbounded range along Y.
//! Only non-air voxels are stored, keyed by their chunk-local integer position, so
//! the memory used by a chunk is proportional to the generated terrain depth rather
//! than to a fixed cube of voxels.

use std::collections::{BTreeMap, HashMap};

use cgmath::Point3;

use crate::engine_state::rendering::{instancing::InstanceBatch, ObjectHandle};

use super::block::{block_side::BlockSide, block_type::BlockType};

pub mod chunk_creation;
pub mod store;

/// Identifies a chunk by its horizontal tile coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoordinate {
    /// Tile index along world X.
    pub cx: i32,
    /// Tile index along world Z.
    pub cz: i32,
}

impl ChunkCoordinate {
    /// Creates a chunk coordinate.
    pub fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Largest chunk index along either axis for `chunk_size` wide chunks.
    ///
    /// Keeps voxel coordinates of every chunk, and of the window around it, inside `i32`.
    pub fn max_index(chunk_size: i32) -> i32 {
        (i32::MAX / 4) / chunk_size.max(1)
    }

    /// The chunk containing the given world-space point, clamped to `max_index`.
    pub fn from_world_position(position: Point3<f32>, chunk_size: i32) -> Self {
        let size = chunk_size as f32;
        let limit = Self::max_index(chunk_size);
        Self {
            cx: ((position.x / size).floor() as i32).clamp(-limit, limit),
            cz: ((position.z / size).floor() as i32).clamp(-limit, limit),
        }
    }

    /// The chunk containing the given voxel.
    pub fn containing(voxel: VoxelPosition, chunk_size: i32) -> Self {
        Self {
            cx: voxel.x.div_euclid(chunk_size),
            cz: voxel.z.div_euclid(chunk_size),
        }
    }

    /// World-space voxel coordinates of this chunk's local origin.
    pub fn world_origin(&self, chunk_size: i32) -> VoxelPosition {
        VoxelPosition::new(
            self.cx.saturating_mul(chunk_size),
            0,
            self.cz.saturating_mul(chunk_size),
        )
    }

    /// Chebyshev (chessboard) distance between two chunk coordinates.
    pub fn chebyshev_distance(&self, other: &ChunkCoordinate) -> i32 {
        let dx = self.cx.saturating_sub(other.cx).saturating_abs();
        let dz = self.cz.saturating_sub(other.cz).saturating_abs();
        dx.max(dz)
    }

    /// Every coordinate within Chebyshev distance `radius` of this one, row by row.
    pub fn window(&self, radius: i32) -> impl Iterator<Item = ChunkCoordinate> {
        let center = *self;
        (-radius..=radius).flat_map(move |dz| {
            (-radius..=radius).map(move |dx| {
                ChunkCoordinate::new(center.cx.saturating_add(dx), center.cz.saturating_add(dz))
            })
        })
    }
}

/// A voxel position relative to its chunk's origin. `x` and `z` lie in `[0, chunk_size)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalPosition {
    /// Local X, `0..chunk_size`.
    pub x: i32,
    /// World height; chunks are not split vertically.
    pub y: i32,
    /// Local Z, `0..chunk_size`.
    pub z: i32,
}

impl LocalPosition {
    /// Creates a local position.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

/// An integer voxel position in world space.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoxelPosition {
    /// World X.
    pub x: i32,
    /// World Y.
    pub y: i32,
    /// World Z.
    pub z: i32,
}

impl VoxelPosition {
    /// Creates a voxel position.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The voxel whose unit cube contains `point`.
    pub fn from_world_point(point: Point3<f32>) -> Self {
        Self {
            x: point.x.floor() as i32,
            y: point.y.floor() as i32,
            z: point.z.floor() as i32,
        }
    }

    /// World-space centre of this voxel's unit cube.
    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            self.x as f32 + 0.5,
            self.y as f32 + 0.5,
            self.z as f32 + 0.5,
        )
    }

    /// The neighbouring voxel across `side`.
    pub fn neighbor(&self, side: BlockSide) -> Self {
        let [dx, dy, dz] = side.offset();
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Offsets a chunk-local position by the chunk's origin.
    pub fn from_local(chunk: ChunkCoordinate, local: LocalPosition, chunk_size: i32) -> Self {
        let origin = chunk.world_origin(chunk_size);
        Self::new(origin.x + local.x, local.y, origin.z + local.z)
    }
}

/// Sparse mapping from local voxel position to block type for a single chunk.
///
/// Air is never stored; `get` answers `BlockType::Air` for every absent key.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockMap {
    chunk_size: i32,
    blocks: HashMap<LocalPosition, BlockType>,
}

impl BlockMap {
    /// Creates an empty block map for chunks `chunk_size` voxels wide.
    pub fn new(chunk_size: i32) -> Self {
        Self {
            chunk_size,
            blocks: HashMap::new(),
        }
    }

    /// Width of the chunk this map belongs to.
    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    /// Whether `position` lies inside the chunk's horizontal bounds.
    pub fn in_bounds(&self, position: LocalPosition) -> bool {
        (0..self.chunk_size).contains(&position.x) && (0..self.chunk_size).contains(&position.z)
    }

    /// The block at `position`, or `Air` when nothing is stored there.
    pub fn get(&self, position: LocalPosition) -> BlockType {
        self.blocks
            .get(&position)
            .copied()
            .unwrap_or(BlockType::Air)
    }

    /// Whether a non-air block is stored at `position`.
    pub fn contains(&self, position: LocalPosition) -> bool {
        self.blocks.contains_key(&position)
    }

    /// Stores `block_type` at `position`, replacing what was there.
    ///
    /// Air and out-of-bounds positions are ignored; returns whether the block was stored.
    pub fn insert(&mut self, position: LocalPosition, block_type: BlockType) -> bool {
        if !block_type.is_solid() || !self.in_bounds(position) {
            return false;
        }
        self.blocks.insert(position, block_type);
        true
    }

    /// Stores `block_type` only if `position` is currently empty.
    pub fn insert_if_vacant(&mut self, position: LocalPosition, block_type: BlockType) -> bool {
        if self.contains(position) {
            return false;
        }
        self.insert(position, block_type)
    }

    /// Removes and returns the block at `position`.
    pub fn remove(&mut self, position: LocalPosition) -> Option<BlockType> {
        self.blocks.remove(&position)
    }

    /// Number of stored (non-air) voxels.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no voxels are stored.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterates every stored voxel in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (LocalPosition, BlockType)> + '_ {
        self.blocks.iter().map(|(position, block_type)| (*position, *block_type))
    }

    /// The highest stored voxel in the column at local `(x, z)`.
    pub fn column_top(&self, x: i32, z: i32) -> Option<(i32, BlockType)> {
        self.blocks
            .iter()
            .filter(|(position, _)| position.x == x && position.z == z)
            .max_by_key(|(position, _)| position.y)
            .map(|(position, block_type)| (position.y, *block_type))
    }
}

/// A chunk that is currently part of the streaming window.
///
/// The block map and batches are owned here and dropped with the chunk. The batches
/// only reference the shared block geometry and materials, which outlive every chunk.
#[derive(Debug)]
pub struct LoadedChunk {
    /// Which chunk this is.
    pub coordinate: ChunkCoordinate,
    /// Logical block data as generated.
    pub blocks: BlockMap,
    /// One drawable batch per block type present in `blocks`.
    pub batches: BTreeMap<BlockType, InstanceBatch>,
    /// Scene container the batches are attached under.
    pub container: ObjectHandle,
}

impl LoadedChunk {
    /// The batch drawing every `block_type` voxel of this chunk.
    pub fn batch(&self, block_type: BlockType) -> Option<&InstanceBatch> {
        self.batches.get(&block_type)
    }

    /// Mutable access to a batch, used to hide broken instances.
    pub fn batch_mut(&mut self, block_type: BlockType) -> Option<&mut InstanceBatch> {
        self.batches.get_mut(&block_type)
    }

    /// Drawable handles of every batch in this chunk.
    pub fn batch_handles(&self) -> impl Iterator<Item = ObjectHandle> + '_ {
        self.batches.values().map(|batch| batch.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_positions_floor_into_chunks() {
        let size = 16;
        let at = |x: f32, z: f32| ChunkCoordinate::from_world_position(Point3::new(x, 0.0, z), size);
        assert_eq!(at(0.0, 0.0), ChunkCoordinate::new(0, 0));
        assert_eq!(at(15.9, 15.9), ChunkCoordinate::new(0, 0));
        assert_eq!(at(16.0, -0.1), ChunkCoordinate::new(1, -1));
        assert_eq!(at(-16.0, -16.1), ChunkCoordinate::new(-1, -2));
    }

    #[test]
    fn distant_positions_clamp_to_the_addressable_range() {
        let size = 16;
        let limit = ChunkCoordinate::max_index(size);
        let far = ChunkCoordinate::from_world_position(Point3::new(4.0e10, 0.0, -4.0e10), size);
        assert_eq!(far, ChunkCoordinate::new(limit, -limit));

        let origin = far.world_origin(size);
        assert_eq!(origin.x, limit * size);
        assert!(far.window(3).all(|c| c.world_origin(size).x.checked_add(size).is_some()));
        assert_eq!(ChunkCoordinate::new(i32::MAX, 0).world_origin(size).x, i32::MAX);
        assert_eq!(
            ChunkCoordinate::new(i32::MIN, 0).chebyshev_distance(&ChunkCoordinate::new(i32::MAX, 0)),
            i32::MAX
        );
    }

    #[test]
    fn voxels_map_to_the_chunk_containing_them() {
        let size = 4;
        assert_eq!(
            ChunkCoordinate::containing(VoxelPosition::new(-1, 7, 4), size),
            ChunkCoordinate::new(-1, 1)
        );
        let local = VoxelPosition::from_local(ChunkCoordinate::new(-1, 1), LocalPosition::new(3, 7, 0), size);
        assert_eq!(local, VoxelPosition::new(-1, 7, 4));
    }

    #[test]
    fn window_is_the_chebyshev_square() {
        let center = ChunkCoordinate::new(3, -2);
        let window: Vec<_> = center.window(2).collect();
        assert_eq!(window.len(), 25);
        assert!(window.iter().all(|c| c.chebyshev_distance(&center) <= 2));
        assert_eq!(center.window(0).collect::<Vec<_>>(), vec![center]);
    }

    #[test]
    fn block_map_never_stores_air_or_out_of_bounds_voxels() {
        let mut blocks = BlockMap::new(4);
        assert!(!blocks.insert(LocalPosition::new(0, 0, 0), BlockType::Air));
        assert!(!blocks.insert(LocalPosition::new(4, 0, 0), BlockType::Stone));
        assert!(!blocks.insert(LocalPosition::new(0, 0, -1), BlockType::Stone));
        assert!(blocks.insert(LocalPosition::new(3, -40, 3), BlockType::Stone));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks.get(LocalPosition::new(1, 1, 1)), BlockType::Air);
    }

    #[test]
    fn insert_if_vacant_keeps_the_existing_block() {
        let mut blocks = BlockMap::new(4);
        blocks.insert(LocalPosition::new(1, 2, 1), BlockType::Log);
        assert!(!blocks.insert_if_vacant(LocalPosition::new(1, 2, 1), BlockType::Leaf));
        assert_eq!(blocks.get(LocalPosition::new(1, 2, 1)), BlockType::Log);
        assert_eq!(blocks.column_top(1, 1), Some((2, BlockType::Log)));
        assert_eq!(blocks.column_top(0, 0), None);
    }
}
