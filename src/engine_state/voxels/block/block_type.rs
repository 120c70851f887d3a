//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world.
//! It provides functionality for block type identification, name lookup and
//! conversion from the compact integer form used by the hotbar.

use std::{fmt, str::FromStr};

use num_derive::FromPrimitive;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// `Air` exists so that lookups have something to answer with; it is never stored
/// in a block map (absence of an entry means air). The `FromPrimitive` derive allows
/// conversion from hotbar slot integers.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, FromPrimitive)]
pub enum BlockType {
    /// Empty space. Never stored.
    Air,

    /// Plain dirt, found in the two layers under the grass surface.
    Dirt,

    /// The topmost voxel of every generated column.
    Grass,

    /// Everything under the dirt layers down to the generation cutoff.
    Stone,

    /// Tree trunk.
    Log,

    /// Tree canopy. Rendered with an alpha-tested material.
    Leaf,

    /// Player-only building material; never generated.
    Planks,
}

/// Lookup table used to parse block names coming from configuration files.
static BLOCK_NAMES: phf::Map<&'static str, BlockType> = phf::phf_map! {
    "air" => BlockType::Air,
    "dirt" => BlockType::Dirt,
    "grass" => BlockType::Grass,
    "stone" => BlockType::Stone,
    "log" => BlockType::Log,
    "leaf" => BlockType::Leaf,
    "planks" => BlockType::Planks,
};

impl BlockType {
    /// Converts a `BlockTypeSize` to a `BlockType`, returning `None` for unknown values.
    pub fn from_int(btype: BlockTypeSize) -> Option<Self> {
        num::FromPrimitive::from_u8(btype)
    }

    /// Maps a zero-based hotbar slot to the placeable type it selects.
    ///
    /// Slot 0 is `Dirt`; there is no slot for `Air`.
    pub fn from_slot(slot: usize) -> Option<Self> {
        let slot = BlockTypeSize::try_from(slot).ok()?;
        Self::from_int(slot.checked_add(1)?)
    }

    /// The type `from_slot` gives each of the six hotbar slots, in slot order.
    pub fn default_hotbar() -> [BlockType; 6] {
        std::array::from_fn(|slot| Self::from_slot(slot).unwrap_or(BlockType::Planks))
    }

    /// Looks a block type up by its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        BLOCK_NAMES.get(name).copied()
    }

    /// The lowercase name used in configuration files and logs.
    pub fn name(&self) -> &'static str {
        match self {
            BlockType::Air => "air",
            BlockType::Dirt => "dirt",
            BlockType::Grass => "grass",
            BlockType::Stone => "stone",
            BlockType::Log => "log",
            BlockType::Leaf => "leaf",
            BlockType::Planks => "planks",
        }
    }

    /// Returns `true` for every type except `Air`.
    pub fn is_solid(&self) -> bool {
        *self != BlockType::Air
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(&s.to_ascii_lowercase()).ok_or_else(|| format!("unknown block type `{s}`"))
    }
}
