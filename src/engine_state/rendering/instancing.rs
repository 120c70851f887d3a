//! Per-type instance batches.
//!
//! Every block type present in a chunk is drawn as one instanced object: a shared cube
//! geometry, the type's shared material, and one transform per voxel. Breaking a block
//! never repacks a batch. The broken slot's transform is overwritten with a zero-scale
//! matrix and the slot is marked hidden, so instance indices handed out by ray hits stay
//! valid for the lifetime of the batch.

use std::{collections::BTreeMap, rc::Rc};

use bitvec::vec::BitVec;
use cgmath::{Matrix4, Point3, Vector3};

use crate::engine_state::voxels::{
    block::{block_type::BlockType, BlockMaterial, BlockResources, CubeGeometry},
    chunk::{BlockMap, ChunkCoordinate, LocalPosition, VoxelPosition},
};

use super::{HandleAllocator, ObjectHandle};

/// Per-instance model matrix in the layout expected by an instanced vertex shader.
///
/// # Memory Layout
/// Column-major 4x4 `f32` matrix, 64 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    /// Model matrix columns.
    pub model: [[f32; 4]; 4],
}

impl InstanceRaw {
    /// A unit cube centred on `center`.
    pub fn at(center: Point3<f32>) -> Self {
        let model = Matrix4::from_translation(Vector3::new(center.x, center.y, center.z));
        Self { model: model.into() }
    }

    /// The degenerate transform used to hide an instance.
    pub fn hidden() -> Self {
        Self {
            model: Matrix4::from_scale(0.0).into(),
        }
    }

    /// Whether this transform collapses the cube to a point.
    pub fn is_degenerate(&self) -> bool {
        self.model[0][0] == 0.0 && self.model[1][1] == 0.0 && self.model[2][2] == 0.0
    }
}

/// All voxels of one block type in one chunk, drawn in a single instanced call.
#[derive(Debug)]
pub struct InstanceBatch {
    /// Drawable handle of this batch.
    pub handle: ObjectHandle,
    /// The type every instance shares.
    pub block_type: BlockType,
    voxels: Vec<VoxelPosition>,
    transforms: Vec<InstanceRaw>,
    hidden: BitVec,
    geometry: Rc<CubeGeometry>,
    material: Rc<BlockMaterial>,
}

impl InstanceBatch {
    /// Number of instance slots, hidden ones included.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether the batch has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Number of slots that are still drawn.
    pub fn visible_count(&self) -> usize {
        self.hidden.count_zeros()
    }

    /// Per-instance transforms ready for upload.
    pub fn transforms(&self) -> &[InstanceRaw] {
        &self.transforms
    }

    /// The world voxel drawn by slot `index`.
    pub fn voxel(&self, index: usize) -> Option<VoxelPosition> {
        self.voxels.get(index).copied()
    }

    /// World-space centre of slot `index`.
    pub fn center(&self, index: usize) -> Option<Point3<f32>> {
        self.voxel(index).map(|voxel| voxel.center())
    }

    /// Whether slot `index` has been hidden. Out-of-range slots count as hidden.
    pub fn is_hidden(&self, index: usize) -> bool {
        self.hidden.get(index).map_or(true, |bit| *bit)
    }

    /// Iterates the centres of all slots that are still drawn, with their indices.
    pub fn visible_centers(&self) -> impl Iterator<Item = (usize, Point3<f32>)> + '_ {
        self.hidden
            .iter_zeros()
            .map(move |index| (index, self.voxels[index].center()))
    }

    /// Hides slot `index` by giving it a zero-scale transform.
    ///
    /// Returns `None` when the slot does not exist, otherwise whether the slot was
    /// visible before the call. Hiding a hidden slot re-applies the same transform.
    pub fn hide(&mut self, index: usize) -> Option<bool> {
        let transform = self.transforms.get_mut(index)?;
        *transform = InstanceRaw::hidden();
        let was_visible = !self.hidden.replace(index, true);
        Some(was_visible)
    }

    /// The geometry shared by every batch.
    pub fn geometry(&self) -> &Rc<CubeGeometry> {
        &self.geometry
    }

    /// The material shared by every batch of this type.
    pub fn material(&self) -> &Rc<BlockMaterial> {
        &self.material
    }
}

/// Builds instance batches from chunk block maps.
pub struct InstanceBatcher {
    resources: BlockResources,
}

impl InstanceBatcher {
    /// Creates a batcher drawing with the given shared resources.
    pub fn new(resources: BlockResources) -> Self {
        Self { resources }
    }

    /// The shared resources batches are built with.
    pub fn resources(&self) -> &BlockResources {
        &self.resources
    }

    /// Groups every stored voxel of `blocks` by type and builds one batch per group.
    ///
    /// Instances are ordered by local position so slot indices are stable for a given
    /// block map. Types without a registered material are skipped.
    pub fn build(
        &self,
        chunk: ChunkCoordinate,
        blocks: &BlockMap,
        handles: &mut HandleAllocator,
    ) -> BTreeMap<BlockType, InstanceBatch> {
        let mut groups: BTreeMap<BlockType, Vec<LocalPosition>> = BTreeMap::new();
        for (position, block_type) in blocks.iter() {
            if !block_type.is_solid() {
                continue;
            }
            groups.entry(block_type).or_default().push(position);
        }

        let chunk_size = blocks.chunk_size();
        let mut batches = BTreeMap::new();
        for (block_type, mut positions) in groups {
            let Some(material) = self.resources.material(block_type) else {
                log::warn!("no drawable registered for {block_type}, skipping its batch");
                continue;
            };
            positions.sort_unstable();

            let voxels: Vec<VoxelPosition> = positions
                .into_iter()
                .map(|local| VoxelPosition::from_local(chunk, local, chunk_size))
                .collect();
            let transforms = voxels.iter().map(|voxel| InstanceRaw::at(voxel.center())).collect();
            let hidden = BitVec::repeat(false, voxels.len());

            let batch = InstanceBatch {
                handle: handles.allocate(),
                block_type,
                voxels,
                transforms,
                hidden,
                geometry: Rc::clone(self.resources.geometry()),
                material: Rc::clone(material),
            };
            batches.insert(block_type, batch);
        }

        batches
    }
}
