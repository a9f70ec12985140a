//! Per-frame control snapshot.
//!
//! [`DriveInput`] is the input abstraction layer: keyboard (and any future
//! touch / gamepad source) writes it, the simulation only reads it.  Tests
//! populate it directly.
//!
//! ## Key map
//!
//! | Action | Keys |
//! |--------|------|
//! | throttle | ↑ / W |
//! | brake / reverse | ↓ / S |
//! | steer left | ← / A |
//! | steer right | → / D |
//! | drift | Shift / Space |
//! | boost | B / Enter |
//! | nitro | N |

use bevy::prelude::*;

/// Boolean control flags sampled once per frame.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub drift: bool,
    pub boost: bool,
    pub nos: bool,
}

impl DriveInput {
    /// True when neither throttle nor brake is held.
    pub fn coasting(&self) -> bool {
        !self.up && !self.down
    }
}

/// Translate the held keys into a fresh [`DriveInput`].
///
/// Overwrites every field so a released key clears its flag on the next frame.
pub fn keyboard_to_input_system(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<DriveInput>) {
    let any = |codes: &[KeyCode]| keys.any_pressed(codes.iter().copied());
    *input = DriveInput {
        up: any(&[KeyCode::ArrowUp, KeyCode::KeyW]),
        down: any(&[KeyCode::ArrowDown, KeyCode::KeyS]),
        left: any(&[KeyCode::ArrowLeft, KeyCode::KeyA]),
        right: any(&[KeyCode::ArrowRight, KeyCode::KeyD]),
        drift: any(&[KeyCode::ShiftLeft, KeyCode::ShiftRight, KeyCode::Space]),
        boost: any(&[KeyCode::KeyB, KeyCode::Enter]),
        nos: any(&[KeyCode::KeyN]),
    };
}
