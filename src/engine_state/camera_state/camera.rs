//! # Camera Implementation
//!
//! The observer's eye: position and orientation in world space. The projection and
//! GPU uniforms belong to the renderer; the engine only needs the eye to aim the
//! interaction ray and to move the player.

use cgmath::*;
use std::f32::consts::FRAC_PI_2;

/// Safe limit for pitch to prevent gimbal lock
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// A first-person camera in 3D space.
///
/// Yaw is measured from +X towards +Z, pitch from the horizon upwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation (around X axis) in radians
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a camera at `position` with the given yaw and pitch.
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        let mut camera = Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        };
        camera.clamp_pitch();
        camera
    }

    /// Unit vector the camera looks along.
    pub fn view_direction(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Vector3::new(pitch_cos * yaw_cos, pitch_sin, pitch_cos * yaw_sin).normalize()
    }

    /// Horizontal forward and right unit vectors for walking.
    pub fn ground_axes(&self) -> (Vector3<f32>, Vector3<f32>) {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let forward = Vector3::new(yaw_cos, 0.0, yaw_sin);
        let right = Vector3::new(-yaw_sin, 0.0, yaw_cos);
        (forward, right)
    }

    /// View matrix for renderers that want one.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.view_direction(), Vector3::unit_y())
    }

    /// Rotates by a look delta, clamping pitch short of straight up or down.
    pub fn look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        if !yaw_delta.is_finite() || !pitch_delta.is_finite() {
            return;
        }
        self.yaw += Rad(yaw_delta);
        self.pitch += Rad(pitch_delta);
        self.clamp_pitch();
    }

    fn clamp_pitch(&mut self) {
        // Clamp pitch to prevent gimbal lock
        if self.pitch < -Rad(SAFE_FRAC_PI_2) {
            self.pitch = -Rad(SAFE_FRAC_PI_2);
        } else if self.pitch > Rad(SAFE_FRAC_PI_2) {
            self.pitch = Rad(SAFE_FRAC_PI_2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_yaw_looks_along_x() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        let direction = camera.view_direction();
        assert!((direction - Vector3::unit_x()).magnitude() < 1e-6);

        let (forward, right) = camera.ground_axes();
        assert!((forward - Vector3::unit_x()).magnitude() < 1e-6);
        assert!((right - Vector3::unit_z()).magnitude() < 1e-6);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Rad(0.0), Rad(0.0));
        camera.look(0.0, 10.0);
        assert!(camera.pitch.0 < FRAC_PI_2);
        assert!(camera.view_direction().y > 0.999);
        camera.look(0.0, -20.0);
        assert!(camera.pitch.0 > -FRAC_PI_2);
    }
}
