//! Top-down open-world driving sandbox.
//!
//! The simulation core (`world`, `vehicle`, `effects`, `session`) is plain
//! Rust over Bevy math types and can be driven without an `App`.  The Bevy
//! plugins in `session`, `rendering` and `hud` wire it to the keyboard, the
//! frame clock and the screen.

pub mod config;
pub mod constants;
pub mod effects;
pub mod error;
pub mod hud;
pub mod input;
pub mod rendering;
pub mod session;
pub mod vehicle;
pub mod world;
