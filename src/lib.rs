#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! An infinite, chunked voxel world: procedurally generated terrain streamed around a
//! moving observer, drawn as per-type instance batches and edited by breaking and
//! placing blocks along an interaction ray.
//!
//! The crate is the engine half of a voxel game. Drawing, ray intersection against
//! the scene, input capture and the frame loop belong to the embedding application,
//! which talks to the engine through a handful of seams:
//!
//! * `application_state::FrameInput` - the input snapshot handed in every frame
//! * `engine_state::rendering::RayCaster` - the ray query the renderer provides
//! * `engine_state::rendering::SceneCommand` - attach, detach and hide instructions
//!   the renderer replays to keep its scene in sync
//!
//! ## Key Modules
//!
//! * `application_state` - Input snapshot types
//! * `config` - World constants and their JSON loading
//! * `engine_state` - The engine: terrain, chunks, streaming, batching, edits and physics
//! * `error` - Error types
//!
//! ## Usage
//!
//! ```no_run
//! use voxel_world::{
//!     application_state::FrameInput,
//!     config::WorldConfig,
//!     engine_state::{rendering::CpuRaycaster, EngineState},
//! };
//!
//! let mut engine = EngineState::new(WorldConfig::default()).expect("valid config");
//! loop {
//!     let report = engine.update(&FrameInput::default(), 1.0 / 60.0, &CpuRaycaster);
//!     for command in engine.drain_scene_commands() {
//!         // apply to the renderer's scene
//!         let _ = (command, &report);
//!     }
//! }
//! ```

use std::f32::consts::FRAC_PI_4;

use log::info;
use web_time::Instant;

use application_state::{FrameInput, MovementIntent, PointerAction};
use config::WorldConfig;
use engine_state::{interaction::MutationOutcome, rendering::CpuRaycaster, EngineState};
use error::ConfigError;

pub mod application_state;
pub mod config;
pub mod engine_state;
pub mod error;

/// Number of frames simulated by `run`.
pub const DEMO_FRAMES: u32 = 600;

/// Runs the engine headless through a scripted walk and logs what happened.
///
/// The first command line argument, when present, names a JSON configuration file.
pub fn run() -> Result<(), ConfigError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("loading configuration from {path}");
            WorldConfig::load(path)?
        }
        None => WorldConfig::default(),
    };

    let started = Instant::now();
    let mut engine = EngineState::new(config)?;
    info!("engine ready in {:?}", started.elapsed());

    let dt = 1.0 / 60.0;
    let mut scene_commands = engine.drain_scene_commands().len();
    let (mut loaded, mut unloaded, mut edits, mut rejected) = (0, 0, 0, 0);
    let mut respawns = 0;

    for frame in 0..DEMO_FRAMES {
        let input = scripted_input(frame);
        let report = engine.update(&input, dt, &CpuRaycaster);

        if let Some(streaming) = &report.streaming {
            loaded += streaming.loaded.len();
            unloaded += streaming.unloaded.len();
        }
        if report.physics.is_some_and(|step| step.respawned) {
            respawns += 1;
        }
        match report.mutation {
            Some(outcome) if outcome.is_applied() => edits += 1,
            Some(MutationOutcome::Rejected(_)) => rejected += 1,
            _ => {}
        }
        scene_commands += engine.drain_scene_commands().len();
    }

    let world = engine.world();
    let eye = engine.player().eye();
    info!(
        "{DEMO_FRAMES} frames in {:?}: {loaded} chunks loaded, {unloaded} unloaded, {} resident",
        started.elapsed(),
        world.chunks().len()
    );
    info!(
        "{edits} edits applied, {rejected} rejected, {} placed blocks, {scene_commands} scene commands, {respawns} respawns",
        world.placed().len()
    );
    info!("player ended at ({:.1}, {:.1}, {:.1})", eye.x, eye.y, eye.z);
    if !world.is_registry_consistent() {
        log::error!("spatial registry diverged from the loaded chunks and placed blocks");
    }

    Ok(())
}

/// Walks forward, turning every two seconds, looking down at the ground ahead and
/// alternately breaking and placing blocks.
fn scripted_input(frame: u32) -> FrameInput {
    let look = match frame {
        0 => Some((0.0, -FRAC_PI_4)),
        f if f % 120 == 0 => Some((FRAC_PI_4, 0.0)),
        _ => None,
    };
    let pointer = match frame % 90 {
        30 => Some(PointerAction::Break),
        60 => Some(PointerAction::Place),
        _ => None,
    };
    FrameInput {
        controls_locked: true,
        movement: MovementIntent::new(1.0, 0.0),
        jump: frame % 150 == 75,
        select_slot: Some((frame / 90) as usize % 6),
        pointer,
        look,
    }
}
