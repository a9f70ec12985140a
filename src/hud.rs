//! Speedometer and nitro readout.
//!
//! The values are derived from [`Vehicle`] state and never written back; the
//! Bevy side is two text nodes refreshed once per frame.

use crate::constants::{HUD_FONT_SIZE, SPEEDOMETER_DIVISOR};
use crate::session::{session_tick_system, Session};
use crate::vehicle::Vehicle;
use bevy::prelude::*;
use std::fmt;

/// What the nitro button shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NitroReadout {
    Ready,
    /// Seconds until the next activation is allowed.
    Charging(f32),
}

impl fmt::Display for NitroReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NitroReadout::Ready => write!(f, "NOS"),
            NitroReadout::Charging(secs) => write!(f, "{secs:.1}"),
        }
    }
}

impl Vehicle {
    /// Speedometer value in "km/h": `round(|speed| / 10)`.
    pub fn speed_readout(&self) -> u32 {
        (self.speed.abs() / SPEEDOMETER_DIVISOR).round() as u32
    }

    pub fn nitro_readout(&self) -> NitroReadout {
        let cooldown = self.nitro.cooldown();
        if cooldown > 0.0 {
            NitroReadout::Charging(cooldown)
        } else {
            NitroReadout::Ready
        }
    }
}

// ── Components ────────────────────────────────────────────────────────────────

/// Marker for the speedometer text container.
#[derive(Component)]
pub struct SpeedometerDisplay;

/// Marker for the nitro readout text container.
#[derive(Component)]
pub struct NitroDisplay;

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_hud).add_systems(
            Update,
            (speedometer_display_system, nitro_display_system).after(session_tick_system),
        );
    }
}

fn ready_color() -> Color {
    Color::srgb(0.95, 0.88, 0.45)
}

fn charging_color() -> Color {
    Color::srgb(0.5, 0.5, 0.5)
}

/// Spawn the bottom-left speedometer and the nitro readout beside it.
pub fn setup_hud(mut commands: Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(16.0),
                bottom: Val::Px(16.0),
                ..default()
            },
            SpeedometerDisplay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("0 km/h"),
                TextFont {
                    font_size: HUD_FONT_SIZE,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(16.0),
                bottom: Val::Px(16.0),
                ..default()
            },
            NitroDisplay,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(NitroReadout::Ready.to_string()),
                TextFont {
                    font_size: HUD_FONT_SIZE,
                    ..default()
                },
                TextColor(ready_color()),
            ));
        });
}

pub fn speedometer_display_system(
    session: Res<Session>,
    parent_query: Query<&Children, With<SpeedometerDisplay>>,
    mut text_query: Query<&mut Text>,
) {
    let label = format!("{} km/h", session.vehicle.speed_readout());
    for children in parent_query.iter() {
        for child in children.iter() {
            if let Ok(mut text) = text_query.get_mut(child) {
                *text = Text::new(label.clone());
            }
        }
    }
}

/// Refresh the nitro readout and grey it out while charging.
pub fn nitro_display_system(
    session: Res<Session>,
    parent_query: Query<&Children, With<NitroDisplay>>,
    mut text_query: Query<(&mut Text, &mut TextColor)>,
) {
    let readout = session.vehicle.nitro_readout();
    let color = match readout {
        NitroReadout::Ready => ready_color(),
        NitroReadout::Charging(_) => charging_color(),
    };
    for children in parent_query.iter() {
        for child in children.iter() {
            if let Ok((mut text, mut text_color)) = text_query.get_mut(child) {
                *text = Text::new(readout.to_string());
                text_color.0 = color;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NitroTuning, VehicleTuning};
    use crate::vehicle::Nitro;
    use crate::vehicle::NitroPhase;

    fn car() -> Vehicle {
        Vehicle::spawn(Vec2::ZERO, VehicleTuning::default(), NitroTuning::default())
    }

    #[test]
    fn speed_readout_rounds_magnitude() {
        let mut v = car();
        v.speed = 804.0;
        assert_eq!(v.speed_readout(), 80);
        v.speed = -125.0;
        assert_eq!(v.speed_readout(), 13);
        v.speed = 0.0;
        assert_eq!(v.speed_readout(), 0);
    }

    #[test]
    fn nitro_readout_follows_cooldown() {
        let mut v = car();
        assert_eq!(v.nitro_readout(), NitroReadout::Ready);
        assert_eq!(v.nitro_readout().to_string(), "NOS");

        v.nitro = Nitro::from_parts(NitroPhase::Cooldown, 12.34);
        assert_eq!(v.nitro_readout(), NitroReadout::Charging(12.34));
        assert_eq!(v.nitro_readout().to_string(), "12.3");
    }
}
