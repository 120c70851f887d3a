//! # Engine State Module
//!
//! The core engine module that owns the world and advances it one frame at a time.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `camera_state` - The player's eye and physics
//! * `interaction` - Break and place edits from the interaction ray
//! * `rendering` - Handles, scene commands, instance batches and the ray-cast seam
//! * `voxels` - Voxel data, chunks, terrain generation and streaming
//!
//! ## Frame Order
//!
//! Each call to `EngineState::update` runs, in order:
//!
//! 1. look and hotbar selection
//! 2. player physics, when controls are locked
//! 3. exactly one streaming tick around the player's eye
//! 4. at most one break or place
//!
//! Every chunk the streaming tick loads is generated, batched and registered before
//! `update` returns, so the renderer can draw the frame right after replaying the
//! drained scene commands.

use noise::{NoiseFn, Perlin};

use camera_state::{PhysicsSettings, PhysicsStep, PlayerController};
use interaction::{MutationAction, MutationOutcome, MutationResolver};
use rendering::{InstanceBatcher, Ray, RayCaster, SceneCommand};
use voxels::{
    block::BlockResources,
    chunk::chunk_creation::{TerrainGenerator, TerrainParams},
    streaming::{ChunkStreamer, StreamingReport},
    world::World,
};

use crate::{
    application_state::{FrameInput, Hotbar, PointerAction},
    config::WorldConfig,
    error::ConfigError,
};

pub mod camera_state;
pub mod interaction;
pub mod rendering;
pub mod voxels;

/// What one frame did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Physics result, when controls were locked.
    pub physics: Option<PhysicsStep>,
    /// Streaming result, when the player entered a new chunk.
    pub streaming: Option<StreamingReport>,
    /// Mutation result, when a pointer action was given.
    pub mutation: Option<MutationOutcome>,
}

/// The main state container for the voxel engine.
///
/// Generic over the terrain height noise so tests can pin the terrain; the default is
/// Perlin noise seeded from the configuration.
pub struct EngineState<N = Perlin> {
    config: WorldConfig,
    world: World,
    streamer: ChunkStreamer<N>,
    resolver: MutationResolver,
    player: PlayerController,
    hotbar: Hotbar,
}

impl EngineState<Perlin> {
    /// Validates `config`, builds the engine and streams in the spawn window.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let resources = BlockResources::new();
        let streamer = ChunkStreamer::new(&config, InstanceBatcher::new(resources.clone()));
        Ok(Self::assemble(config, streamer, resources))
    }
}

impl<N: NoiseFn<f64, 2>> EngineState<N> {
    /// Like `new`, but generating terrain heights from `noise`.
    pub fn with_noise(config: WorldConfig, noise: N) -> Result<Self, ConfigError> {
        config.validate()?;
        let resources = BlockResources::new();
        let generator = TerrainGenerator::with_noise(TerrainParams::from(&config), noise);
        let streamer = ChunkStreamer::with_generator(
            config.render_radius,
            generator,
            InstanceBatcher::new(resources.clone()),
        );
        Ok(Self::assemble(config, streamer, resources))
    }

    fn assemble(config: WorldConfig, mut streamer: ChunkStreamer<N>, resources: BlockResources) -> Self {
        let mut world = World::new(config.chunk_size, resources);
        let player = PlayerController::new(PhysicsSettings::from(&config));
        if let Some(report) = streamer.tick(player.eye(), &mut world) {
            log::info!(
                "spawned in chunk ({}, {}) with {} chunks loaded",
                report.center.cx,
                report.center.cz,
                report.loaded.len()
            );
        }

        Self {
            resolver: MutationResolver::new(config.placement_clearance),
            hotbar: Hotbar::new(config.hotbar_types()),
            config,
            world,
            streamer,
            player,
        }
    }

    /// Advances the engine by one frame of `dt` seconds.
    pub fn update<C: RayCaster + ?Sized>(&mut self, input: &FrameInput, dt: f32, caster: &C) -> FrameReport {
        if let Some((yaw, pitch)) = input.look {
            self.player.camera_mut().look(yaw, pitch);
        }
        if let Some(slot) = input.select_slot {
            if !self.hotbar.select(slot) {
                log::warn!("ignoring selection of hotbar slot {slot}");
            }
        }

        let physics = if input.controls_locked {
            let targets = self.world.spatial_targets();
            Some(self.player.step(input, dt, caster, &targets))
        } else {
            None
        };

        let streaming = self.streamer.tick(self.player.eye(), &mut self.world);

        let mutation = input.pointer.map(|pointer| {
            let action = match pointer {
                PointerAction::Break => MutationAction::Break,
                PointerAction::Place => MutationAction::Place(self.hotbar.selected_type()),
            };
            let camera = self.player.camera();
            let ray = Ray::new(camera.position, camera.view_direction());
            let hit = {
                let targets = self.world.spatial_targets();
                caster
                    .cast_ray(&ray, self.config.interaction_distance, &targets)
                    .into_iter()
                    .next()
            };
            self.resolver
                .resolve(hit.as_ref(), action, self.player.feet(), &mut self.world)
        });

        FrameReport {
            physics,
            streaming,
            mutation,
        }
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The player.
    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    /// Mutable access to the player, for teleports and scripted views.
    pub fn player_mut(&mut self) -> &mut PlayerController {
        &mut self.player
    }

    /// The hotbar.
    pub fn hotbar(&self) -> &Hotbar {
        &self.hotbar
    }

    /// The chunk streamer.
    pub fn streamer(&self) -> &ChunkStreamer<N> {
        &self.streamer
    }

    /// Takes the scene commands produced since the last call.
    pub fn drain_scene_commands(&mut self) -> Vec<SceneCommand> {
        self.world.drain_scene_commands()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{application_state::MovementIntent, engine_state::rendering::CpuRaycaster};
    use cgmath::{Point3, Rad};
    use noise::Constant;

    /// Flat terrain with its surface voxel at y = -5 and no trees.
    fn engine() -> EngineState<Constant> {
        let config = WorldConfig {
            chunk_size: 4,
            render_radius: 1,
            tree_probability: 0.0,
            spawn: [2.5, 0.0, 2.5],
            ..WorldConfig::default()
        };
        EngineState::with_noise(config, Constant::new(0.0)).expect("valid config")
    }

    fn locked() -> FrameInput {
        FrameInput {
            controls_locked: true,
            ..FrameInput::default()
        }
    }

    #[test]
    fn construction_streams_the_spawn_window() {
        let mut engine = engine();
        assert_eq!(engine.world().chunks().len(), 9);
        assert!(engine.world().is_registry_consistent());
        let attached = engine
            .drain_scene_commands()
            .iter()
            .filter(|command| matches!(command, SceneCommand::AttachChunk { .. }))
            .count();
        assert_eq!(attached, 9);
    }

    #[test]
    fn invalid_configs_are_refused() {
        let config = WorldConfig {
            chunk_size: 0,
            ..WorldConfig::default()
        };
        assert!(EngineState::new(config).is_err());
    }

    #[test]
    fn unlocked_controls_skip_physics() {
        let mut engine = engine();
        let eye = engine.player().eye();
        let report = engine.update(&FrameInput::default(), 0.1, &CpuRaycaster);
        assert_eq!(report.physics, None);
        assert_eq!(report.streaming, None);
        assert_eq!(engine.player().eye(), eye);
    }

    #[test]
    fn player_lands_and_breaks_the_block_below() {
        let mut engine = engine();
        for _ in 0..120 {
            engine.update(&locked(), 1.0 / 60.0, &CpuRaycaster);
        }
        assert!(engine.player().is_grounded());
        assert!((engine.player().feet().y - (-4.0)).abs() < 1e-3);

        engine.player_mut().camera_mut().pitch = Rad(-1.5);
        let report = engine.update(
            &FrameInput {
                pointer: Some(PointerAction::Break),
                ..FrameInput::default()
            },
            1.0 / 60.0,
            &CpuRaycaster,
        );
        assert!(matches!(report.mutation, Some(MutationOutcome::InstanceHidden { .. })));
    }

    #[test]
    fn walking_across_a_border_streams() {
        let mut engine = engine();
        engine.player_mut().camera_mut().position = Point3::new(2.5, -3.2, 2.5);
        engine.drain_scene_commands();

        let walk = FrameInput {
            movement: MovementIntent::new(1.0, 0.0),
            ..locked()
        };
        let mut streamed = None;
        for _ in 0..60 {
            if let Some(report) = engine.update(&walk, 1.0 / 30.0, &CpuRaycaster).streaming {
                streamed = Some(report);
                break;
            }
        }
        let report = streamed.expect("crossed into the next chunk");
        assert_eq!(report.loaded.len(), 3);
        assert_eq!(report.unloaded.len(), 3);
        assert!(engine.world().is_registry_consistent());
    }

    #[test]
    fn placing_uses_the_selected_slot() {
        let mut engine = engine();
        engine.player_mut().camera_mut().position = Point3::new(2.5, -3.2, 2.5);
        engine.player_mut().camera_mut().pitch = Rad(-0.6);

        let report = engine.update(
            &FrameInput {
                select_slot: Some(5),
                pointer: Some(PointerAction::Place),
                ..FrameInput::default()
            },
            1.0 / 60.0,
            &CpuRaycaster,
        );
        let Some(MutationOutcome::Placed { block_type, position, .. }) = report.mutation else {
            panic!("expected a placement, got {:?}", report.mutation);
        };
        assert_eq!(block_type, engine.hotbar().selected_type());
        assert_eq!(position.y, -4);
        assert!(engine.world().placed().at(position).is_some());
    }
}
