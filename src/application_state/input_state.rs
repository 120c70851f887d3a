//! # Input State
//!
//! This module defines the per-frame input snapshot handed to the engine. Capturing
//! keys, pointers and touches is the embedding application's job; by the time input
//! reaches the engine it has been reduced to intents.

use crate::engine_state::voxels::block::block_type::BlockType;

/// Directional movement intent, each axis in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementIntent {
    /// Positive is forward along the view yaw.
    pub forward: f32,
    /// Positive is to the right of the view yaw.
    pub strafe: f32,
}

impl MovementIntent {
    /// Creates an intent from raw axis values.
    pub fn new(forward: f32, strafe: f32) -> Self {
        Self { forward, strafe }
    }

    /// Clamps both axes to `[-1, 1]` and rescales to unit length if the combined
    /// length exceeds one. Non-finite axes count as zero.
    pub fn normalized(&self) -> Self {
        let clamp = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        let (forward, strafe) = (clamp(self.forward), clamp(self.strafe));
        let length = (forward * forward + strafe * strafe).sqrt();
        if length > 1.0 {
            Self::new(forward / length, strafe / length)
        } else {
            Self::new(forward, strafe)
        }
    }

}

/// A pointer action aimed at the screen centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    /// Remove the targeted block.
    Break,
    /// Place the selected block against the targeted face.
    Place,
}

/// Everything the engine needs to know about input for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    /// Whether the pointer is captured; movement and physics only run while it is.
    pub controls_locked: bool,
    /// Walking intent.
    pub movement: MovementIntent,
    /// Jump was triggered this frame.
    pub jump: bool,
    /// Hotbar slot chosen this frame.
    pub select_slot: Option<usize>,
    /// Break or place this frame.
    pub pointer: Option<PointerAction>,
    /// Look delta in radians, `(yaw, pitch)`.
    pub look: Option<(f32, f32)>,
}

/// The six placeable block types and the selected slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotbar {
    slots: [BlockType; 6],
    selected: usize,
}

impl Hotbar {
    /// Creates a hotbar with the first slot selected.
    pub fn new(slots: [BlockType; 6]) -> Self {
        Self { slots, selected: 0 }
    }

    /// Selects `slot`. Out-of-range slots are ignored and return `false`.
    pub fn select(&mut self, slot: usize) -> bool {
        if slot >= self.slots.len() {
            return false;
        }
        self.selected = slot;
        true
    }

    /// Index of the selected slot.
    pub fn selected_slot(&self) -> usize {
        self.selected
    }

    /// Block type in the selected slot.
    pub fn selected_type(&self) -> BlockType {
        self.slots[self.selected]
    }

    /// All slots in order.
    pub fn slots(&self) -> &[BlockType; 6] {
        &self.slots
    }
}

impl Default for Hotbar {
    fn default() -> Self {
        Self::new(BlockType::default_hotbar())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_intent_is_rescaled() {
        let intent = MovementIntent::new(1.0, 1.0).normalized();
        let length = (intent.forward * intent.forward + intent.strafe * intent.strafe).sqrt();
        assert!((length - 1.0).abs() < 1e-6);
        assert!((intent.forward - intent.strafe).abs() < 1e-6);
    }

    #[test]
    fn small_and_out_of_range_intents() {
        assert_eq!(MovementIntent::new(0.5, 0.0).normalized(), MovementIntent::new(0.5, 0.0));
        assert_eq!(MovementIntent::new(-4.0, 0.0).normalized(), MovementIntent::new(-1.0, 0.0));
        assert_eq!(MovementIntent::new(f32::NAN, 0.3).normalized(), MovementIntent::new(0.0, 0.3));
        assert_eq!(MovementIntent::default().normalized(), MovementIntent::default());
    }

    #[test]
    fn hotbar_selection() {
        let mut hotbar = Hotbar::default();
        assert_eq!(hotbar.selected_type(), BlockType::Dirt);
        assert!(hotbar.select(2));
        assert_eq!(hotbar.selected_type(), BlockType::Stone);
        assert!(hotbar.select(5));
        assert_eq!(hotbar.selected_type(), BlockType::Planks);
        assert!(!hotbar.select(6));
        assert_eq!(hotbar.selected_slot(), 5);
    }
}
