//! # Block Interaction
//!
//! Turns the nearest hit of the interaction ray into a world edit.
//!
//! A hit lands either on one instance of a chunk batch or on a placed block. Breaking
//! a batch instance only hides it: the chunk's block map keeps the voxel, so a chunk
//! that is unloaded and streamed back in shows the block again. Breaking a placed
//! block removes it outright. Placing always creates a standalone placed block on
//! the far side of the struck face, never touching chunk data.

use std::rc::Rc;

use cgmath::{MetricSpace, Point3};
use thiserror::Error;

use crate::engine_state::{
    rendering::{ObjectHandle, RayHit, SceneCommand, SpatialObject},
    voxels::{
        block::{block_side::BlockSide, block_type::BlockType},
        chunk::VoxelPosition,
        placed::PlacedBlock,
        world::World,
    },
};

/// What the player asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAction {
    /// Remove the struck block.
    Break,
    /// Place a block of this type against the struck face.
    Place(BlockType),
}

/// Why an edit was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The new block would bury the player.
    #[error("placement overlaps the player")]
    InvalidPlacement,
    /// The hit carries no usable face normal.
    #[error("hit has no axis-aligned face normal")]
    DegenerateHit,
    /// Something already occupies the target voxel.
    #[error("target voxel is occupied")]
    Occupied,
    /// The struck handle is no longer registered.
    #[error("hit handle is not registered")]
    StaleTarget,
    /// A batch hit named no instance.
    #[error("batch hit without an instance index")]
    MissingInstance,
    /// A batch hit named an instance the batch does not have.
    #[error("instance index out of range")]
    InstanceOutOfRange,
    /// The selected type cannot be placed.
    #[error("block type cannot be placed")]
    NotPlaceable,
}

/// Result of resolving one action.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The ray hit nothing.
    NoHit,
    /// A chunk batch instance now has a zero-scale transform.
    InstanceHidden {
        /// The batch.
        handle: ObjectHandle,
        /// The hidden slot.
        index: usize,
    },
    /// A placed block was destroyed.
    PlacedBlockRemoved {
        /// Its former handle.
        handle: ObjectHandle,
        /// The voxel it freed.
        position: VoxelPosition,
    },
    /// A new placed block exists.
    Placed {
        /// Its handle.
        handle: ObjectHandle,
        /// Its voxel.
        position: VoxelPosition,
        /// Its type.
        block_type: BlockType,
    },
    /// Nothing changed.
    Rejected(Rejection),
}

impl MutationOutcome {
    /// Whether the world changed.
    pub fn is_applied(&self) -> bool {
        matches!(
            self,
            MutationOutcome::InstanceHidden { .. }
                | MutationOutcome::PlacedBlockRemoved { .. }
                | MutationOutcome::Placed { .. }
        )
    }
}

/// Applies break and place actions to the world.
#[derive(Debug, Clone)]
pub struct MutationResolver {
    placement_clearance: f32,
}

impl MutationResolver {
    /// Creates a resolver rejecting placements whose centre lies within
    /// `placement_clearance` of the player's feet or head voxel centre.
    pub fn new(placement_clearance: f32) -> Self {
        Self { placement_clearance }
    }

    /// Resolves `action` against the nearest hit. `feet` is the player's feet position.
    pub fn resolve(
        &self,
        hit: Option<&RayHit>,
        action: MutationAction,
        feet: Point3<f32>,
        world: &mut World,
    ) -> MutationOutcome {
        let Some(hit) = hit else {
            return MutationOutcome::NoHit;
        };
        let result = match action {
            MutationAction::Break => Self::break_block(hit, world),
            MutationAction::Place(block_type) => self.place_block(hit, block_type, feet, world),
        };
        match result {
            Ok(outcome) => {
                log::debug!("{action:?} applied: {outcome:?}");
                outcome
            }
            Err(rejection) => {
                log::debug!("{action:?} rejected: {rejection}");
                MutationOutcome::Rejected(rejection)
            }
        }
    }

    fn break_block(hit: &RayHit, world: &mut World) -> Result<MutationOutcome, Rejection> {
        match world.spatial.get(hit.target).ok_or(Rejection::StaleTarget)? {
            SpatialObject::ChunkBatch { chunk, block_type } => {
                let index = hit.instance.ok_or(Rejection::MissingInstance)?;
                let batch = world
                    .chunks
                    .get_mut(chunk)
                    .ok()
                    .and_then(|loaded| loaded.batch_mut(block_type))
                    .ok_or(Rejection::StaleTarget)?;
                let was_visible = batch.hide(index).ok_or(Rejection::InstanceOutOfRange)?;
                if was_visible {
                    world.scene.push(SceneCommand::HideInstance {
                        batch: hit.target,
                        index,
                    });
                }
                Ok(MutationOutcome::InstanceHidden {
                    handle: hit.target,
                    index,
                })
            }
            SpatialObject::PlacedBlock { position } => {
                let block = world.placed.remove(hit.target).ok_or(Rejection::StaleTarget)?;
                world.spatial.unregister(block.handle);
                world.scene.push(SceneCommand::DetachBlock { handle: block.handle });
                Ok(MutationOutcome::PlacedBlockRemoved {
                    handle: block.handle,
                    position,
                })
            }
        }
    }

    fn place_block(
        &self,
        hit: &RayHit,
        block_type: BlockType,
        feet: Point3<f32>,
        world: &mut World,
    ) -> Result<MutationOutcome, Rejection> {
        let material = world
            .resources
            .material(block_type)
            .map(Rc::clone)
            .ok_or(Rejection::NotPlaceable)?;
        let side = hit
            .face_normal
            .and_then(BlockSide::from_normal)
            .ok_or(Rejection::DegenerateHit)?;

        let struck = match world.spatial.get(hit.target).ok_or(Rejection::StaleTarget)? {
            SpatialObject::ChunkBatch { chunk, block_type } => {
                let index = hit.instance.ok_or(Rejection::MissingInstance)?;
                world
                    .chunks
                    .get(chunk)
                    .ok()
                    .and_then(|loaded| loaded.batch(block_type))
                    .ok_or(Rejection::StaleTarget)?
                    .voxel(index)
                    .ok_or(Rejection::InstanceOutOfRange)?
            }
            SpatialObject::PlacedBlock { position } => position,
        };
        let candidate = struck.neighbor(side);

        if self.buries_player(candidate, feet) {
            return Err(Rejection::InvalidPlacement);
        }
        if world.is_occupied(candidate) {
            return Err(Rejection::Occupied);
        }

        let handle = world.handles.allocate();
        let inserted = world.placed.insert(PlacedBlock {
            handle,
            position: candidate,
            block_type,
            material,
        });
        if !inserted {
            return Err(Rejection::Occupied);
        }
        world
            .spatial
            .register(handle, SpatialObject::PlacedBlock { position: candidate });
        world.scene.push(SceneCommand::AttachBlock {
            handle,
            position: candidate,
            block_type,
        });
        Ok(MutationOutcome::Placed {
            handle,
            position: candidate,
            block_type,
        })
    }

    /// Whether `candidate` is the voxel holding the player's feet or head.
    fn buries_player(&self, candidate: VoxelPosition, feet: Point3<f32>) -> bool {
        let feet_voxel = VoxelPosition::from_world_point(feet);
        let head_voxel = VoxelPosition::new(feet_voxel.x, feet_voxel.y + 1, feet_voxel.z);
        let center = candidate.center();
        [feet_voxel, head_voxel]
            .iter()
            .any(|occupied| occupied.center().distance(center) < self.placement_clearance)
    }
}
