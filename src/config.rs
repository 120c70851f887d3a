//! # World Configuration
//!
//! Fixed constants that shape the world: chunk dimensions, streaming radius, terrain
//! noise parameters and player physics. The values are read once at start-up and are
//! never reloaded.
//!
//! Configuration can be loaded from a JSON file. Every field is optional in the file;
//! missing fields take their default value.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{engine_state::voxels::block::block_type::BlockType, error::ConfigError};

/// All tunable constants of the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for the terrain noise and the tree decoration RNG.
    pub seed: u32,
    /// Voxels per chunk side along X and Z.
    pub chunk_size: i32,
    /// Streaming radius in chunks (Chebyshev distance).
    pub render_radius: i32,
    /// Scale applied to world column coordinates before sampling the height noise.
    pub noise_frequency: f64,
    /// Height range covered by the noise, in voxels.
    pub noise_amplitude: f64,
    /// Lowest possible surface height.
    pub base_level: i32,
    /// How far below `base_level` voxels are still generated.
    pub stone_depth: i32,
    /// Chance that a grass column grows a tree.
    pub tree_probability: f64,
    /// Inclusive `(min, max)` trunk height.
    pub trunk_height: (i32, i32),
    /// Horizontal reach of the leaf canopy around the trunk.
    pub canopy_radius: i32,
    /// Distance from the feet to the eye.
    pub player_height: f32,
    /// Slack allowed by the ground check before the player counts as falling.
    pub ground_margin: f32,
    /// Downward acceleration, voxels per second squared.
    pub gravity: f32,
    /// Upward velocity applied on jump.
    pub jump_force: f32,
    /// Horizontal speed, voxels per second.
    pub move_speed: f32,
    /// Reach of the break/place ray.
    pub interaction_distance: f32,
    /// A placement closer than this to the feet or head voxel centre is refused.
    pub placement_clearance: f32,
    /// Eye position used at start-up and by the safety teleport.
    pub spawn: [f32; 3],
    /// Falling below this height teleports the player back to `spawn`.
    pub respawn_floor: f32,
    /// Block names for hotbar slots 0 through 5.
    pub hotbar: [String; 6],
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            chunk_size: 16,
            render_radius: 3,
            noise_frequency: 0.05,
            noise_amplitude: 10.0,
            base_level: -10,
            stone_depth: 6,
            tree_probability: 0.02,
            trunk_height: (4, 6),
            canopy_radius: 2,
            player_height: 1.8,
            ground_margin: 0.1,
            gravity: 20.0,
            jump_force: 8.0,
            move_speed: 5.0,
            interaction_distance: 8.0,
            placement_clearance: 0.1,
            spawn: [0.5, 10.0, 0.5],
            respawn_floor: -64.0,
            hotbar: BlockType::default_hotbar().map(|block_type| block_type.name().to_string()),
        }
    }
}

impl WorldConfig {
    /// Reads and validates a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parses and validates a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every constant is usable by the generator, streamer and physics.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: String| ConfigError::Invalid { field, reason };

        if self.chunk_size < 1 {
            return Err(invalid("chunk_size", format!("{} is not positive", self.chunk_size)));
        }
        if self.render_radius < 0 {
            return Err(invalid("render_radius", format!("{} is negative", self.render_radius)));
        }
        if !self.noise_frequency.is_finite() {
            return Err(invalid("noise_frequency", "must be finite".into()));
        }
        if !(self.noise_amplitude.is_finite() && self.noise_amplitude >= 0.0) {
            return Err(invalid("noise_amplitude", format!("{} is not a non-negative number", self.noise_amplitude)));
        }
        if self.stone_depth < 0 {
            return Err(invalid("stone_depth", format!("{} is negative", self.stone_depth)));
        }
        if !(0.0..=1.0).contains(&self.tree_probability) {
            return Err(invalid("tree_probability", format!("{} is outside [0, 1]", self.tree_probability)));
        }
        let (trunk_min, trunk_max) = self.trunk_height;
        if trunk_min < 1 || trunk_min > trunk_max {
            return Err(invalid("trunk_height", format!("({trunk_min}, {trunk_max}) is not a valid range")));
        }
        if self.canopy_radius < 0 {
            return Err(invalid("canopy_radius", format!("{} is negative", self.canopy_radius)));
        }
        if self.player_height.is_nan() || self.player_height <= 0.0 {
            return Err(invalid("player_height", format!("{} is not positive", self.player_height)));
        }
        if self.interaction_distance.is_nan() || self.interaction_distance <= 0.0 {
            return Err(invalid("interaction_distance", format!("{} is not positive", self.interaction_distance)));
        }
        if !(0.0..0.5).contains(&self.placement_clearance) || self.placement_clearance == 0.0 {
            return Err(invalid("placement_clearance", format!("{} is outside (0, 0.5)", self.placement_clearance)));
        }
        for name in &self.hotbar {
            match BlockType::from_name(name) {
                Some(block_type) if block_type.is_solid() => {}
                _ => return Err(invalid("hotbar", format!("`{name}` is not a placeable block"))),
            }
        }

        Ok(())
    }

    /// The hotbar as block types. Unknown names fall back to the default slot type.
    pub fn hotbar_types(&self) -> [BlockType; 6] {
        let defaults = BlockType::default_hotbar();
        std::array::from_fn(|slot| {
            BlockType::from_name(&self.hotbar[slot])
                .filter(BlockType::is_solid)
                .unwrap_or(defaults[slot])
        })
    }
}
