//! # Chunk Creation Module
//!
//! Terrain generation for a single chunk. Generation is a pure function of the chunk
//! coordinate: the height field comes from a fixed 2-D noise function and the tree
//! decoration RNG is seeded from the world seed and the chunk coordinate, so asking
//! for the same chunk twice always yields the same `BlockMap`.
//!
//! ## Column Layout
//!
//! For each column the surface height is
//! `floor(base_level + (noise + 1) / 2 * amplitude)`. The surface voxel is grass, the
//! two below it are dirt, and everything further down is stone until the cutoff at
//! `base_level - stone_depth`. Nothing below the cutoff is stored.
//!
//! Trees only grow on grass. Their canopy is clipped to the chunk's horizontal
//! bounds, so trees near a chunk edge lose the part of the canopy that would cross it.

use noise::{NoiseFn, Perlin};

use crate::config::WorldConfig;
use crate::engine_state::voxels::block::block_type::BlockType;

use super::{BlockMap, ChunkCoordinate, LocalPosition};

/// Parameters consumed by the terrain generator.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainParams {
    /// Seed for the height noise and tree placement.
    pub seed: u32,
    /// Voxels per chunk side.
    pub chunk_size: i32,
    /// Scale applied to world coordinates before sampling noise.
    pub noise_frequency: f64,
    /// Height range covered by the noise.
    pub noise_amplitude: f64,
    /// Lowest possible surface height.
    pub base_level: i32,
    /// Depth of generated stone below `base_level`.
    pub stone_depth: i32,
    /// Per-column tree chance.
    pub tree_probability: f64,
    /// Inclusive trunk height range.
    pub trunk_height: (i32, i32),
    /// Canopy reach around the trunk.
    pub canopy_radius: i32,
}

impl From<&WorldConfig> for TerrainParams {
    fn from(config: &WorldConfig) -> Self {
        Self {
            seed: config.seed,
            chunk_size: config.chunk_size,
            noise_frequency: config.noise_frequency,
            noise_amplitude: config.noise_amplitude,
            base_level: config.base_level,
            stone_depth: config.stone_depth,
            tree_probability: config.tree_probability,
            trunk_height: config.trunk_height,
            canopy_radius: config.canopy_radius,
        }
    }
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self::from(&WorldConfig::default())
    }
}

/// Maps a noise sample in `[-1, 1]` to a surface height.
pub fn height_from_noise(noise: f64, base_level: i32, amplitude: f64) -> i32 {
    (base_level as f64 + (noise + 1.0) / 2.0 * amplitude).floor() as i32
}

/// Generates chunk block maps from a height noise function.
///
/// The noise function defaults to Perlin noise seeded from the world seed. Any
/// `NoiseFn<f64, 2>` can be supplied instead, which is how tests pin the height field.
pub struct TerrainGenerator<N = Perlin> {
    params: TerrainParams,
    noise: N,
}

impl TerrainGenerator<Perlin> {
    /// Creates a generator sampling Perlin noise seeded with `params.seed`.
    pub fn new(params: TerrainParams) -> Self {
        let noise = Perlin::new(params.seed);
        Self { params, noise }
    }
}

impl<N: NoiseFn<f64, 2>> TerrainGenerator<N> {
    /// Creates a generator sampling the given noise function.
    pub fn with_noise(params: TerrainParams, noise: N) -> Self {
        Self { params, noise }
    }

    /// The parameters this generator was built with.
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Lowest height that is still generated.
    pub fn generation_cutoff(&self) -> i32 {
        self.params.base_level - self.params.stone_depth
    }

    /// Surface height of the world column at `(world_x, world_z)`.
    pub fn surface_height(&self, world_x: i32, world_z: i32) -> i32 {
        let frequency = self.params.noise_frequency;
        let sample = self
            .noise
            .get([world_x as f64 * frequency, world_z as f64 * frequency])
            .clamp(-1.0, 1.0);
        height_from_noise(sample, self.params.base_level, self.params.noise_amplitude)
    }

    /// Generates the block map of the chunk at `coordinate`.
    pub fn generate(&self, coordinate: ChunkCoordinate) -> BlockMap {
        let size = self.params.chunk_size;
        let origin = coordinate.world_origin(size);
        let cutoff = self.generation_cutoff();
        let mut blocks = BlockMap::new(size);
        let mut surfaces = Vec::with_capacity((size * size) as usize);

        for z in 0..size {
            for x in 0..size {
                let top = self.surface_height(origin.x + x, origin.z + z);
                for y in cutoff..=top {
                    let block_type = match top - y {
                        0 => BlockType::Grass,
                        1 | 2 => BlockType::Dirt,
                        _ => BlockType::Stone,
                    };
                    blocks.insert(LocalPosition::new(x, y, z), block_type);
                }
                surfaces.push(LocalPosition::new(x, top, z));
            }
        }

        // Decoration runs after every column is filled so a taller neighbour column
        // cannot overwrite a canopy.
        let mut rng = fastrand::Rng::with_seed(decoration_seed(self.params.seed, coordinate));
        let mut trees = 0;
        for surface in surfaces {
            if rng.f64() >= self.params.tree_probability {
                continue;
            }
            if blocks.get(surface) != BlockType::Grass {
                continue;
            }
            self.grow_tree(&mut blocks, surface, &mut rng);
            trees += 1;
        }

        log::trace!(
            "generated chunk ({}, {}): {} voxels, {} trees",
            coordinate.cx,
            coordinate.cz,
            blocks.len(),
            trees
        );

        blocks
    }

    /// Grows a log trunk above `surface` capped by a leaf canopy.
    fn grow_tree(&self, blocks: &mut BlockMap, surface: LocalPosition, rng: &mut fastrand::Rng) {
        let (min_height, max_height) = self.params.trunk_height;
        let height = rng.i32(min_height..=max_height);
        let trunk_top = surface.y + height;

        for y in surface.y + 1..=trunk_top {
            blocks.insert_if_vacant(LocalPosition::new(surface.x, y, surface.z), BlockType::Log);
        }

        let radius = self.params.canopy_radius;
        for dy in -1..=1 {
            let layer_radius = if dy == 1 { (radius - 1).max(0) } else { radius };
            for dz in -layer_radius..=layer_radius {
                for dx in -layer_radius..=layer_radius {
                    if layer_radius > 0 && dx.abs() == layer_radius && dz.abs() == layer_radius {
                        continue;
                    }
                    let leaf = LocalPosition::new(surface.x + dx, trunk_top + dy, surface.z + dz);
                    // Out-of-bounds leaves are dropped by the map.
                    blocks.insert_if_vacant(leaf, BlockType::Leaf);
                }
            }
        }
    }
}

/// Mixes the world seed with a chunk coordinate into a decoration RNG seed.
fn decoration_seed(seed: u32, coordinate: ChunkCoordinate) -> u64 {
    let cx = coordinate.cx as u32 as u64;
    let cz = coordinate.cz as u32 as u64;
    ((seed as u64) << 32)
        ^ cx.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ cz.wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
}

#[cfg(test)]
mod tests {
    use super::*;
    use noise::Constant;

    fn params(tree_probability: f64) -> TerrainParams {
        TerrainParams {
            chunk_size: 8,
            tree_probability,
            ..TerrainParams::default()
        }
    }

    #[test]
    fn height_matches_hand_computed_values() {
        assert_eq!(height_from_noise(-1.0, -10, 10.0), -10);
        assert_eq!(height_from_noise(0.0, -10, 10.0), -5);
        assert_eq!(height_from_noise(1.0, -10, 10.0), 0);
        assert_eq!(height_from_noise(0.5, -10, 10.0), -3);
    }

    #[test]
    fn constant_noise_sets_the_surface_of_column_zero() {
        for (noise, expected) in [(-1.0, -10), (0.0, -5), (1.0, 0)] {
            let generator = TerrainGenerator::with_noise(params(0.0), Constant::new(noise));
            let blocks = generator.generate(ChunkCoordinate::new(0, 0));
            assert_eq!(blocks.column_top(0, 0), Some((expected, BlockType::Grass)));
        }
    }

    #[test]
    fn generation_is_deterministic() {
        let generator = TerrainGenerator::new(params(0.3));
        for coordinate in [ChunkCoordinate::new(0, 0), ChunkCoordinate::new(-3, 7)] {
            assert_eq!(generator.generate(coordinate), generator.generate(coordinate));
        }

        let other = TerrainGenerator::new(params(0.3));
        let coordinate = ChunkCoordinate::new(5, -5);
        assert_eq!(generator.generate(coordinate), other.generate(coordinate));
    }

    #[test]
    fn columns_are_grass_over_two_dirt_over_stone() {
        let generator = TerrainGenerator::new(params(0.0));
        let coordinate = ChunkCoordinate::new(2, -1);
        let blocks = generator.generate(coordinate);
        let cutoff = generator.generation_cutoff();

        for z in 0..8 {
            for x in 0..8 {
                let origin = coordinate.world_origin(8);
                let top = generator.surface_height(origin.x + x, origin.z + z);
                assert_eq!(blocks.column_top(x, z), Some((top, BlockType::Grass)));
                for y in cutoff..top {
                    let expected = if top - y <= 2 { BlockType::Dirt } else { BlockType::Stone };
                    assert_eq!(blocks.get(LocalPosition::new(x, y, z)), expected);
                }
                assert_eq!(blocks.get(LocalPosition::new(x, cutoff - 1, z)), BlockType::Air);
            }
        }
    }

    #[test]
    fn trees_stay_above_the_surface_and_inside_the_chunk() {
        let generator = TerrainGenerator::with_noise(params(1.0), Constant::new(0.0));
        let blocks = generator.generate(ChunkCoordinate::new(0, 0));
        let surface = -5;

        let mut logs = 0;
        let mut leaves = 0;
        for (position, block_type) in blocks.iter() {
            assert!(blocks.in_bounds(position));
            match block_type {
                BlockType::Log => logs += 1,
                BlockType::Leaf => leaves += 1,
                _ => assert!(position.y <= surface),
            }
            if matches!(block_type, BlockType::Log | BlockType::Leaf) {
                assert!(position.y > surface);
            }
        }
        assert!(logs > 0);
        assert!(leaves > 0);
    }

    #[test]
    fn canopy_never_replaces_a_trunk() {
        let generator = TerrainGenerator::with_noise(
            TerrainParams {
                chunk_size: 1,
                tree_probability: 1.0,
                trunk_height: (4, 4),
                ..TerrainParams::default()
            },
            Constant::new(0.0),
        );
        let blocks = generator.generate(ChunkCoordinate::new(0, 0));
        for y in -4..=-1 {
            assert_eq!(blocks.get(LocalPosition::new(0, y, 0)), BlockType::Log);
        }
        assert_eq!(blocks.get(LocalPosition::new(0, 0, 0)), BlockType::Leaf);
        assert_eq!(blocks.len(), 12 + 4 + 1);
    }
}
