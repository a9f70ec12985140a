use bevy::prelude::*;
use bevy::window::WindowResolution;
use driftfield::hud::HudPlugin;
use driftfield::rendering::RenderingPlugin;
use driftfield::session::SessionPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Driftfield".into(),
                resolution: WindowResolution::new(1200, 680),
                ..Default::default()
            }),
            ..Default::default()
        }))
        // Config load and session creation run first in Startup; rendering
        // and HUD setup are ordered after them inside their plugins.
        .add_plugins((SessionPlugin, RenderingPlugin, HudPlugin))
        .run();
}
