//! Error types for the voxel world.

use thiserror::Error;

use crate::engine_state::voxels::chunk::ChunkCoordinate;

/// Chunk store failures. Under correct streaming these indicate a bookkeeping bug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// Lookup or removal of a coordinate that is not loaded.
    #[error("no chunk loaded at ({}, {})", .0.cx, .0.cz)]
    ChunkNotFound(ChunkCoordinate),

    /// Insertion of a coordinate that is already loaded.
    #[error("chunk ({}, {}) is already loaded", .0.cx, .0.cz)]
    DuplicateChunk(ChunkCoordinate),
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for a `WorldConfig`.
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its usable range.
    #[error("invalid `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}
