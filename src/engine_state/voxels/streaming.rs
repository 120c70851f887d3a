//! # Chunk Streaming
//!
//! Keeps the set of loaded chunks equal to the square window of chunks around the
//! observer. The streamer owns the window radius and the last observed chunk; the
//! chunk data itself lives in the `World`.
//!
//! ## Per-tick behaviour
//!
//! Almost every tick the observer is still inside the same chunk and `tick` returns
//! without touching anything. When the observer crosses a chunk border the streamer:
//!
//! 1. generates and batches every chunk of the new window that is not loaded yet,
//!    registers its batches for ray queries and queues an `AttachChunk` command
//! 2. removes every loaded chunk outside the new window, unregisters its batches and
//!    queues a `DetachChunk` command
//!
//! Generation runs synchronously, so every chunk of the window is fully present when
//! `tick` returns.

use cgmath::Point3;
use noise::{NoiseFn, Perlin};
use web_time::Instant;

use crate::{
    config::WorldConfig,
    engine_state::rendering::{InstanceBatcher, SceneCommand, SpatialObject},
};

use super::{
    chunk::{
        chunk_creation::{TerrainGenerator, TerrainParams},
        ChunkCoordinate, LoadedChunk,
    },
    world::World,
};

/// What a streaming pass changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingReport {
    /// The observer's new chunk.
    pub center: ChunkCoordinate,
    /// Chunks that entered the window, in load order.
    pub loaded: Vec<ChunkCoordinate>,
    /// Chunks that left the window, sorted.
    pub unloaded: Vec<ChunkCoordinate>,
}

/// Loads and unloads chunks around a moving observer.
pub struct ChunkStreamer<N = Perlin> {
    radius: i32,
    chunk_size: i32,
    current: Option<ChunkCoordinate>,
    generator: TerrainGenerator<N>,
    batcher: InstanceBatcher,
}

impl ChunkStreamer<Perlin> {
    /// Creates a streamer generating Perlin terrain as configured.
    pub fn new(config: &WorldConfig, batcher: InstanceBatcher) -> Self {
        Self::with_generator(config.render_radius, TerrainGenerator::new(TerrainParams::from(config)), batcher)
    }
}

impl<N: NoiseFn<f64, 2>> ChunkStreamer<N> {
    /// Creates a streamer around an existing generator.
    pub fn with_generator(radius: i32, generator: TerrainGenerator<N>, batcher: InstanceBatcher) -> Self {
        Self {
            radius,
            chunk_size: generator.params().chunk_size,
            current: None,
            generator,
            batcher,
        }
    }

    /// Window radius in chunks.
    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// The chunk the observer was in at the last pass, if any pass ran yet.
    pub fn current_chunk(&self) -> Option<ChunkCoordinate> {
        self.current
    }

    /// The terrain generator new chunks come from.
    pub fn generator(&self) -> &TerrainGenerator<N> {
        &self.generator
    }

    /// Runs one streaming pass for an observer at `observer`.
    ///
    /// Returns `None` without touching `world` when the observer is still in the chunk
    /// of the previous pass.
    pub fn tick(&mut self, observer: Point3<f32>, world: &mut World) -> Option<StreamingReport> {
        let center = ChunkCoordinate::from_world_position(observer, self.chunk_size);
        if self.current == Some(center) {
            return None;
        }
        self.current = Some(center);

        let started = Instant::now();
        let mut loaded = Vec::new();
        for coordinate in center.window(self.radius) {
            if world.chunks.has(coordinate) {
                continue;
            }
            self.load(coordinate, world);
            loaded.push(coordinate);
        }

        let unloaded: Vec<ChunkCoordinate> = world
            .chunks
            .coordinates()
            .into_iter()
            .filter(|coordinate| coordinate.chebyshev_distance(&center) > self.radius)
            .collect();
        for &coordinate in &unloaded {
            Self::unload(coordinate, world);
        }

        log::debug!(
            "streamed around chunk ({}, {}): {} loaded, {} unloaded in {:?}",
            center.cx,
            center.cz,
            loaded.len(),
            unloaded.len(),
            started.elapsed()
        );

        Some(StreamingReport {
            center,
            loaded,
            unloaded,
        })
    }

    fn load(&self, coordinate: ChunkCoordinate, world: &mut World) {
        let blocks = self.generator.generate(coordinate);
        let batches = self.batcher.build(coordinate, &blocks, &mut world.handles);
        let container = world.handles.allocate();

        for (block_type, batch) in &batches {
            let object = SpatialObject::ChunkBatch {
                chunk: coordinate,
                block_type: *block_type,
            };
            if !world.spatial.register(batch.handle, object) {
                log::error!("batch handle {} registered twice", batch.handle);
            }
        }
        log::trace!(
            "chunk ({}, {}) generated with {} voxels in {} batches",
            coordinate.cx,
            coordinate.cz,
            blocks.len(),
            batches.len()
        );

        let chunk = LoadedChunk {
            coordinate,
            blocks,
            batches,
            container,
        };
        let batch_handles = chunk.batch_handles().collect();
        if let Err(err) = world.chunks.insert(chunk) {
            log::error!("{err}");
            debug_assert!(false, "{err}");
            return;
        }
        world.scene.push(SceneCommand::AttachChunk {
            container,
            chunk: coordinate,
            batches: batch_handles,
        });
    }

    fn unload(coordinate: ChunkCoordinate, world: &mut World) {
        let chunk = match world.chunks.remove(coordinate) {
            Ok(chunk) => chunk,
            Err(err) => {
                log::error!("{err}");
                debug_assert!(false, "{err}");
                return;
            }
        };
        for handle in chunk.batch_handles() {
            world.spatial.unregister(handle);
        }
        world.scene.push(SceneCommand::DetachChunk {
            container: chunk.container,
            chunk: coordinate,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::BlockResources;
    use noise::Constant;
    use std::{collections::BTreeSet, rc::Rc};

    fn streamer(radius: i32) -> (ChunkStreamer<Constant>, World) {
        let params = TerrainParams {
            chunk_size: 4,
            tree_probability: 0.0,
            ..TerrainParams::default()
        };
        let resources = BlockResources::new();
        let generator = TerrainGenerator::with_noise(params, Constant::new(0.0));
        let streamer = ChunkStreamer::with_generator(radius, generator, InstanceBatcher::new(resources.clone()));
        (streamer, World::new(4, resources))
    }

    fn window(center: ChunkCoordinate, radius: i32) -> BTreeSet<ChunkCoordinate> {
        center.window(radius).collect()
    }

    fn loaded(world: &World) -> BTreeSet<ChunkCoordinate> {
        world.chunks().coordinates().into_iter().collect()
    }

    #[test]
    fn first_tick_loads_the_whole_window() {
        let (mut streamer, mut world) = streamer(1);
        let report = streamer.tick(Point3::new(1.0, 0.0, 1.0), &mut world).expect("first pass");

        assert_eq!(report.center, ChunkCoordinate::new(0, 0));
        assert_eq!(report.loaded.len(), 9);
        assert!(report.unloaded.is_empty());
        assert_eq!(loaded(&world), window(ChunkCoordinate::new(0, 0), 1));
        assert!(world.is_registry_consistent());
        assert_eq!(world.drain_scene_commands().len(), 9);
    }

    #[test]
    fn staying_in_the_same_chunk_is_a_no_op() {
        let (mut streamer, mut world) = streamer(1);
        streamer.tick(Point3::new(0.5, 0.0, 0.5), &mut world);
        world.drain_scene_commands();
        let handles = world.spatial().handles();

        assert_eq!(streamer.tick(Point3::new(3.9, 7.0, 3.9), &mut world), None);
        assert_eq!(world.spatial().handles(), handles);
        assert!(world.pending_scene_commands().is_empty());
    }

    #[test]
    fn moving_keeps_exactly_the_new_window() {
        let (mut streamer, mut world) = streamer(1);
        streamer.tick(Point3::new(0.5, 0.0, 0.5), &mut world);
        world.drain_scene_commands();

        let report = streamer.tick(Point3::new(4.5, 0.0, -0.5), &mut world).expect("moved");
        let center = ChunkCoordinate::new(1, -1);
        assert_eq!(report.center, center);
        assert_eq!(report.loaded.len(), 5);
        assert_eq!(report.unloaded.len(), 5);
        assert_eq!(loaded(&world), window(center, 1));
        assert!(world.is_registry_consistent());

        let detached = world
            .drain_scene_commands()
            .into_iter()
            .filter(|command| matches!(command, SceneCommand::DetachChunk { .. }))
            .count();
        assert_eq!(detached, 5);
    }

    #[test]
    fn unloading_releases_batches_but_not_shared_resources() {
        let (mut streamer, mut world) = streamer(0);
        streamer.tick(Point3::new(0.5, 0.0, 0.5), &mut world);
        let geometry = Rc::clone(world.resources().geometry());
        let shared_before = Rc::strong_count(&geometry);

        streamer.tick(Point3::new(40.5, 0.0, 0.5), &mut world);
        streamer.tick(Point3::new(80.5, 0.0, 0.5), &mut world);
        assert_eq!(world.chunks().len(), 1);
        assert_eq!(Rc::strong_count(&geometry), shared_before);
    }

    #[test]
    fn far_jumps_replace_the_window() {
        let (mut streamer, mut world) = streamer(2);
        streamer.tick(Point3::new(0.0, 0.0, 0.0), &mut world);
        let report = streamer.tick(Point3::new(-100.0, 0.0, 100.0), &mut world).expect("moved");
        assert_eq!(report.loaded.len(), 25);
        assert_eq!(report.unloaded.len(), 25);
        assert_eq!(loaded(&world), window(ChunkCoordinate::new(-25, 25), 2));
        assert_eq!(world.spatial().len(), world.chunks().iter().map(|c| c.batches.len()).sum::<usize>());
    }
}
