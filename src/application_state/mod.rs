//! # Application State
//!
//! The boundary between the embedding application and the engine. Window handling,
//! device input capture and on-screen UI live in the application; this module only
//! holds the input snapshot types it hands to the engine every frame.

pub mod input_state;

pub use input_state::{FrameInput, Hotbar, MovementIntent, PointerAction};
