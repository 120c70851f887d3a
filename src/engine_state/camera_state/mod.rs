//! # Camera State Management
//!
//! The player: a camera on legs. Every frame with locked controls the player walks
//! along the view yaw, falls under gravity and is snapped onto whatever surface a
//! downward ray finds within reach of its feet. Falling below the respawn floor
//! teleports it back to the spawn point.
//!
//! The ground ray goes through the same `RayCaster` seam as the interaction ray, so
//! the player stands on placed blocks and chunk batches alike.

use cgmath::{Point3, Rad};

use crate::{
    application_state::FrameInput,
    config::WorldConfig,
    engine_state::rendering::{Ray, RayCaster, SpatialTarget},
};

pub mod camera;

pub use camera::Camera;

/// Physics constants of the player.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsSettings {
    /// Eye height above the feet.
    pub player_height: f32,
    /// Slack below the feet within which the ground still counts.
    pub ground_margin: f32,
    /// Downward acceleration.
    pub gravity: f32,
    /// Upward velocity given by a jump.
    pub jump_force: f32,
    /// Walking speed.
    pub move_speed: f32,
    /// Eye position after a respawn.
    pub spawn: Point3<f32>,
    /// Eye heights below this respawn the player.
    pub respawn_floor: f32,
}

impl From<&WorldConfig> for PhysicsSettings {
    fn from(config: &WorldConfig) -> Self {
        Self {
            player_height: config.player_height,
            ground_margin: config.ground_margin,
            gravity: config.gravity,
            jump_force: config.jump_force,
            move_speed: config.move_speed,
            spawn: Point3::from(config.spawn),
            respawn_floor: config.respawn_floor,
        }
    }
}

/// Result of one physics step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicsStep {
    /// The player stands on a surface after the step.
    pub grounded: bool,
    /// The player fell below the floor and was teleported.
    pub respawned: bool,
}

/// The observer moved by input and physics.
#[derive(Debug, Clone)]
pub struct PlayerController {
    camera: Camera,
    vertical_velocity: f32,
    grounded: bool,
    settings: PhysicsSettings,
}

impl PlayerController {
    /// Creates a player at the spawn point looking along +X.
    pub fn new(settings: PhysicsSettings) -> Self {
        Self {
            camera: Camera::new(settings.spawn, Rad(0.0), Rad(0.0)),
            vertical_velocity: 0.0,
            grounded: false,
            settings,
        }
    }

    /// The player's eye.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the eye, for teleports and scripted views.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Eye position.
    pub fn eye(&self) -> Point3<f32> {
        self.camera.position
    }

    /// Feet position, `player_height` below the eye.
    pub fn feet(&self) -> Point3<f32> {
        let eye = self.camera.position;
        Point3::new(eye.x, eye.y - self.settings.player_height, eye.z)
    }

    /// Whether the last step ended on a surface.
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Current vertical velocity.
    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    /// The constants this player moves with.
    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    /// Advances the player by `dt` seconds against `targets`.
    pub fn step<C: RayCaster + ?Sized>(
        &mut self,
        input: &FrameInput,
        dt: f32,
        caster: &C,
        targets: &[SpatialTarget<'_>],
    ) -> PhysicsStep {
        if !(dt.is_finite() && dt > 0.0) {
            return PhysicsStep {
                grounded: self.grounded,
                respawned: false,
            };
        }

        let previous_eye_y = self.camera.position.y;

        let intent = input.movement.normalized();
        let (forward, right) = self.camera.ground_axes();
        self.camera.position +=
            (forward * intent.forward + right * intent.strafe) * self.settings.move_speed * dt;

        if input.jump && self.grounded {
            self.vertical_velocity = self.settings.jump_force;
            self.grounded = false;
        }
        self.vertical_velocity -= self.settings.gravity * dt;
        self.camera.position.y += self.vertical_velocity * dt;

        // Cast from the higher of the old and new eye so fast falls cannot skip a surface.
        let origin_y = previous_eye_y.max(self.camera.position.y);
        let origin = Point3::new(self.camera.position.x, origin_y, self.camera.position.z);
        let reach = (origin_y - self.camera.position.y) + self.settings.player_height + self.settings.ground_margin;
        let ground = caster
            .cast_ray(&Ray::down(origin), reach, targets)
            .into_iter()
            .find(|hit| hit.face_normal.is_some());

        self.grounded = false;
        if let Some(hit) = ground {
            if self.vertical_velocity <= 0.0 {
                self.camera.position.y = hit.point.y + self.settings.player_height;
                self.vertical_velocity = 0.0;
                self.grounded = true;
            }
        }

        let mut respawned = false;
        if self.camera.position.y < self.settings.respawn_floor {
            log::info!("fell below {}, respawning", self.settings.respawn_floor);
            self.camera.position = self.settings.spawn;
            self.vertical_velocity = 0.0;
            respawned = true;
        }

        PhysicsStep {
            grounded: self.grounded,
            respawned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application_state::MovementIntent,
        engine_state::rendering::{CpuRaycaster, ObjectHandle, TargetGeometry},
    };

    const DT: f32 = 1.0 / 60.0;

    fn floor() -> Vec<SpatialTarget<'static>> {
        let mut targets = Vec::new();
        for x in -2..=2 {
            for z in -2..=2 {
                targets.push(SpatialTarget {
                    handle: ObjectHandle(targets.len() as u64 + 1),
                    geometry: TargetGeometry::Block {
                        center: Point3::new(x as f32 + 0.5, 0.5, z as f32 + 0.5),
                    },
                });
            }
        }
        targets
    }

    fn player_at(eye: [f32; 3]) -> PlayerController {
        let settings = PhysicsSettings {
            spawn: Point3::from(eye),
            ..PhysicsSettings::from(&WorldConfig::default())
        };
        PlayerController::new(settings)
    }

    fn locked() -> FrameInput {
        FrameInput {
            controls_locked: true,
            ..FrameInput::default()
        }
    }

    fn settle(player: &mut PlayerController, targets: &[SpatialTarget<'_>]) {
        for _ in 0..180 {
            player.step(&locked(), DT, &CpuRaycaster, targets);
        }
    }

    #[test]
    fn falls_and_lands_on_the_surface() {
        let targets = floor();
        let mut player = player_at([0.5, 4.0, 0.5]);
        settle(&mut player, &targets);

        assert!(player.is_grounded());
        assert_eq!(player.vertical_velocity(), 0.0);
        assert!((player.eye().y - (1.0 + player.settings().player_height)).abs() < 1e-4);
        assert!((player.feet().y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn jumping_requires_ground() {
        let targets = floor();
        let mut player = player_at([0.5, 4.0, 0.5]);
        let jump = FrameInput {
            jump: true,
            ..locked()
        };

        player.step(&jump, DT, &CpuRaycaster, &targets);
        assert!(player.vertical_velocity() < 0.0);

        settle(&mut player, &targets);
        let standing = player.eye().y;
        player.step(&jump, DT, &CpuRaycaster, &targets);
        assert!(!player.is_grounded());
        assert!(player.eye().y > standing);
    }

    #[test]
    fn walks_along_the_view_yaw() {
        let targets = floor();
        let mut player = player_at([0.5, 2.8, 0.5]);
        settle(&mut player, &targets);
        let start = player.eye();

        let walk = FrameInput {
            movement: MovementIntent::new(1.0, 0.0),
            ..locked()
        };
        player.step(&walk, DT, &CpuRaycaster, &targets);
        let moved = player.eye() - start;
        assert!((moved.x - player.settings().move_speed * DT).abs() < 1e-4);
        assert!(moved.z.abs() < 1e-6);
        assert!(player.is_grounded());
    }

    #[test]
    fn falling_below_the_floor_respawns() {
        let mut player = player_at([0.5, 10.0, 0.5]);
        player.camera_mut().position.y = -63.99;
        let mut respawned = false;
        for _ in 0..30 {
            respawned |= player.step(&locked(), DT, &CpuRaycaster, &[]).respawned;
        }
        assert!(respawned);
        assert!(player.eye().y > 0.0);
    }
}
