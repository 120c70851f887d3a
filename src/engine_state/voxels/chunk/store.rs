//! The set of currently loaded chunks.
//!
//! The store is the single source of truth for which chunks exist. Only the chunk
//! streamer inserts and removes entries; everyone else reads, or mutates batches in
//! place through `get_mut`.

use std::collections::HashMap;

use crate::error::WorldError;

use super::{ChunkCoordinate, LoadedChunk};

/// Loaded chunks keyed by coordinate. No two entries share a coordinate.
#[derive(Debug, Default)]
pub struct ChunkStore {
    chunks: HashMap<ChunkCoordinate, LoadedChunk>,
}

impl ChunkStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a chunk is loaded at `coordinate`.
    pub fn has(&self, coordinate: ChunkCoordinate) -> bool {
        self.chunks.contains_key(&coordinate)
    }

    /// Adds `chunk` under its own coordinate.
    pub fn insert(&mut self, chunk: LoadedChunk) -> Result<(), WorldError> {
        let coordinate = chunk.coordinate;
        if self.has(coordinate) {
            return Err(WorldError::DuplicateChunk(coordinate));
        }
        self.chunks.insert(coordinate, chunk);
        Ok(())
    }

    /// Removes and returns the chunk at `coordinate`.
    pub fn remove(&mut self, coordinate: ChunkCoordinate) -> Result<LoadedChunk, WorldError> {
        self.chunks
            .remove(&coordinate)
            .ok_or(WorldError::ChunkNotFound(coordinate))
    }

    /// The chunk at `coordinate`.
    pub fn get(&self, coordinate: ChunkCoordinate) -> Result<&LoadedChunk, WorldError> {
        self.chunks
            .get(&coordinate)
            .ok_or(WorldError::ChunkNotFound(coordinate))
    }

    /// Mutable access to the chunk at `coordinate`.
    pub fn get_mut(&mut self, coordinate: ChunkCoordinate) -> Result<&mut LoadedChunk, WorldError> {
        self.chunks
            .get_mut(&coordinate)
            .ok_or(WorldError::ChunkNotFound(coordinate))
    }

    /// Number of loaded chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether no chunk is loaded.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Every loaded coordinate, sorted.
    pub fn coordinates(&self) -> Vec<ChunkCoordinate> {
        let mut coordinates: Vec<_> = self.chunks.keys().copied().collect();
        coordinates.sort_unstable();
        coordinates
    }

    /// Iterates loaded chunks in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &LoadedChunk> {
        self.chunks.values()
    }
}
