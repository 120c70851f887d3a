//! Ray queries against the registered world objects.
//!
//! The engine never performs intersection tests itself; it asks a `RayCaster` for the
//! hits along a ray and interprets the nearest one. Renderers implement `RayCaster`
//! against their own scene. `CpuRaycaster` tests rays against axis-aligned unit cubes
//! and serves headless runs and tests.

use cgmath::{InnerSpace, Point3, Vector3};

use crate::engine_state::voxels::block::block_side::BlockSide;

use super::{instancing::InstanceBatch, ObjectHandle};

/// A half-line with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Point3<f32>,
    /// Unit direction.
    pub direction: Vector3<f32>,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// A ray pointing straight down from `origin`.
    pub fn down(origin: Point3<f32>) -> Self {
        Self::new(origin, -Vector3::unit_y())
    }

    /// The point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

/// One intersection reported by a `RayCaster`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The object that was struck.
    pub target: ObjectHandle,
    /// Instance slot, when the object is an instanced batch.
    pub instance: Option<usize>,
    /// World-space intersection point.
    pub point: Point3<f32>,
    /// Distance from the ray origin.
    pub distance: f32,
    /// Outward normal of the struck face, when the geometry has faces.
    pub face_normal: Option<Vector3<f32>>,
}

/// Geometry of a registered object, as seen by a ray caster.
#[derive(Debug, Clone, Copy)]
pub enum TargetGeometry<'a> {
    /// Every visible instance of a chunk batch.
    Instances(&'a InstanceBatch),
    /// A single unit cube.
    Block {
        /// Cube centre.
        center: Point3<f32>,
    },
}

/// A raycastable object: its handle and its geometry.
#[derive(Debug, Clone, Copy)]
pub struct SpatialTarget<'a> {
    /// Handle reported in hits.
    pub handle: ObjectHandle,
    /// What to intersect.
    pub geometry: TargetGeometry<'a>,
}

/// The renderer's ray query.
pub trait RayCaster {
    /// Every hit within `max_distance` along `ray` against `targets`, nearest first.
    fn cast_ray(&self, ray: &Ray, max_distance: f32, targets: &[SpatialTarget<'_>]) -> Vec<RayHit>;
}

/// Reference ray caster testing against unit cubes on the CPU.
///
/// Hidden batch instances are skipped. A ray starting inside a cube reports a hit at
/// distance zero without a face normal.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuRaycaster;

impl RayCaster for CpuRaycaster {
    fn cast_ray(&self, ray: &Ray, max_distance: f32, targets: &[SpatialTarget<'_>]) -> Vec<RayHit> {
        let reach = (max_distance + 1.0) * (max_distance + 1.0);
        let in_reach = |center: Point3<f32>| (center - ray.origin).magnitude2() <= reach;

        let mut hits = Vec::new();
        let mut test = |handle: ObjectHandle, instance: Option<usize>, center: Point3<f32>| {
            if !in_reach(center) {
                return;
            }
            if let Some((distance, side)) = intersect_voxel(ray, center) {
                if distance <= max_distance {
                    hits.push(RayHit {
                        target: handle,
                        instance,
                        point: ray.at(distance),
                        distance,
                        face_normal: side.map(|side| side.normal()),
                    });
                }
            }
        };

        for target in targets {
            match target.geometry {
                TargetGeometry::Instances(batch) => {
                    for (index, center) in batch.visible_centers() {
                        test(target.handle, Some(index), center);
                    }
                }
                TargetGeometry::Block { center } => test(target.handle, None, center),
            }
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

/// The face a ray enters through when it travels along `axis` with sign of `direction`.
fn entry_side(axis: usize, direction: f32) -> BlockSide {
    match (axis, direction > 0.0) {
        (0, true) => BlockSide::Left,
        (0, false) => BlockSide::Right,
        (1, true) => BlockSide::Bottom,
        (1, false) => BlockSide::Top,
        (_, true) => BlockSide::Back,
        (_, false) => BlockSide::Front,
    }
}

/// Slab test against the unit cube centred on `center`.
///
/// Returns the entry distance and entry face, or distance zero and no face when the
/// origin is inside the cube.
fn intersect_voxel(ray: &Ray, center: Point3<f32>) -> Option<(f32, Option<BlockSide>)> {
    let half = Vector3::new(0.5, 0.5, 0.5);
    let min = center - half;
    let max = center + half;

    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;
    let mut entry = None;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let direction = ray.direction[axis];
        if direction.abs() < f32::EPSILON {
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }

        let t0 = (min[axis] - origin) / direction;
        let t1 = (max[axis] - origin) / direction;
        let (enter, exit) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        if enter > t_near {
            t_near = enter;
            entry = Some(entry_side(axis, direction));
        }
        t_far = t_far.min(exit);
        if t_near > t_far {
            return None;
        }
    }

    if t_far < 0.0 {
        return None;
    }
    if t_near < 0.0 {
        return Some((0.0, None));
    }
    Some((t_near, entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(handle: u64, x: f32, y: f32, z: f32) -> SpatialTarget<'static> {
        SpatialTarget {
            handle: ObjectHandle(handle),
            geometry: TargetGeometry::Block {
                center: Point3::new(x, y, z),
            },
        }
    }

    #[test]
    fn downward_ray_hits_the_top_face() {
        let targets = [block(1, 0.5, 0.5, 0.5)];
        let hits = CpuRaycaster.cast_ray(&Ray::down(Point3::new(0.5, 3.0, 0.5)), 10.0, &targets);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target, ObjectHandle(1));
        assert!((hits[0].distance - 2.0).abs() < 1e-5);
        assert_eq!(hits[0].face_normal, Some(Vector3::unit_y()));
        assert!((hits[0].point.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn hits_are_sorted_nearest_first_and_limited_by_distance() {
        let targets = [block(1, 0.5, 0.5, 5.5), block(2, 0.5, 0.5, 2.5), block(3, 0.5, 0.5, 20.5)];
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.0), Vector3::unit_z());
        let hits = CpuRaycaster.cast_ray(&ray, 8.0, &targets);
        let order: Vec<_> = hits.iter().map(|hit| hit.target).collect();
        assert_eq!(order, vec![ObjectHandle(2), ObjectHandle(1)]);
        assert_eq!(hits[0].face_normal, Some(-Vector3::unit_z()));
    }

    #[test]
    fn origin_inside_a_cube_has_no_face() {
        let targets = [block(1, 0.5, 0.5, 0.5)];
        let hits = CpuRaycaster.cast_ray(&Ray::down(Point3::new(0.5, 0.5, 0.5)), 4.0, &targets);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(hits[0].face_normal, None);
    }

    #[test]
    fn rays_pointing_away_miss() {
        let targets = [block(1, 0.5, 0.5, 0.5)];
        let ray = Ray::new(Point3::new(0.5, 3.0, 0.5), Vector3::unit_y());
        assert!(CpuRaycaster.cast_ray(&ray, 10.0, &targets).is_empty());
        let ray = Ray::new(Point3::new(3.0, 3.0, 0.5), -Vector3::unit_y());
        assert!(CpuRaycaster.cast_ray(&ray, 10.0, &targets).is_empty());
    }
}
