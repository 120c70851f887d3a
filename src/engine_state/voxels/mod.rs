//! # Voxel World Core
//!
//! This module contains the voxel data side of the engine: what exists in the world,
//! where it came from and how it changes as the observer moves.
//!
//! ## Architecture
//!
//! * **Block**: block types, faces and the drawable resources shared by every chunk
//! * **Chunk**: coordinates, the sparse block map, terrain generation and the chunk store
//! * **Placed**: standalone blocks created by the player
//! * **Streaming**: loads and unloads chunks around the observer
//! * **World**: the aggregate owning chunks, placed blocks and the spatial registry
//!
//! ## Data Flow
//!
//! 1. The streamer notices the observer entered a new chunk
//! 2. Missing chunks of the window are generated, batched and registered
//! 3. Chunks that left the window are removed and unregistered
//! 4. The renderer replays the queued scene commands and draws
//!
//! Everything here runs on the main tick. Nothing is shared across threads.

pub mod block;
pub mod chunk;
pub mod placed;
pub mod streaming;
pub mod world;
