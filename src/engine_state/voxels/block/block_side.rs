//! # Block Side Module
//!
//! This module defines the six faces of a voxel block and the conversions between
//! a face and its outward normal. Ray hits report normals as vectors; the mutation
//! resolver snaps them back to a face before computing a placement position.

use cgmath::{InnerSpace, Vector3};

/// How far a reported normal may stray from an axis before it stops counting as a face.
const AXIS_TOLERANCE: f32 = 1.0e-3;

/// Represents the six possible faces of a voxel block.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The front face (facing positive Z)
    Front = 0,

    /// The back face (facing negative Z)
    Back = 1,

    /// The bottom face (facing negative Y)
    Bottom = 2,

    /// The top face (facing positive Y)
    Top = 3,

    /// The left face (facing negative X)
    Left = 4,

    /// The right face (facing positive X)
    Right = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::Front,
            BlockSide::Back,
            BlockSide::Bottom,
            BlockSide::Top,
            BlockSide::Left,
            BlockSide::Right,
        ]
    }

    /// The integer step from a voxel to its neighbour across this face.
    pub fn offset(&self) -> [i32; 3] {
        match self {
            BlockSide::Front => [0, 0, 1],
            BlockSide::Back => [0, 0, -1],
            BlockSide::Bottom => [0, -1, 0],
            BlockSide::Top => [0, 1, 0],
            BlockSide::Left => [-1, 0, 0],
            BlockSide::Right => [1, 0, 0],
        }
    }

    /// The outward unit normal of this face.
    pub fn normal(&self) -> Vector3<f32> {
        let [x, y, z] = self.offset();
        Vector3::new(x as f32, y as f32, z as f32)
    }

    /// Classifies a face normal reported by a ray hit.
    ///
    /// Returns `None` for zero-length, non-finite or diagonal normals, which is how
    /// hits against geometry that does not produce faces show up.
    pub fn from_normal(normal: Vector3<f32>) -> Option<BlockSide> {
        if !(normal.x.is_finite() && normal.y.is_finite() && normal.z.is_finite()) {
            return None;
        }
        let length = normal.magnitude();
        if length <= AXIS_TOLERANCE {
            return None;
        }
        let n = normal / length;

        BlockSide::all()
            .into_iter()
            .find(|side| (side.normal() - n).magnitude() <= AXIS_TOLERANCE)
    }
}
