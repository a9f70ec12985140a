//! Mirrors session state into Bevy entities.
//!
//! | Layer     | Source                 | Draw                       | Fallback            | z   |
//! |-----------|------------------------|----------------------------|---------------------|-----|
//! | Ground    | `World` bounds         | one tiled `Sprite`         | flat colour quad    | 0.0 |
//! | Roads     | `World::roads`         | tiled `Sprite` + gizmo rim | asphalt quad        | 1.0 |
//! | Objects   | `World::objects`       | `Sprite` per object        | quad / `Mesh2d` disc| 2.0 |
//! | Smoke     | `Effects::particles`   | pooled `Mesh2d` discs      | always procedural   | 3.0 |
//! | Vehicle   | `Session::vehicle`     | `Sprite` at half scale     | red body+headlights | 4.0 |
//!
//! The simulation uses screen-style coordinates (y down, clockwise turns);
//! everything here goes through [`to_render`] / [`to_render_angle`] to land
//! in Bevy's y-up space.  Nothing in this module writes to the session.

use crate::session::{session_tick_system, start_session_system, Session};
use crate::world::{ObjectKind, RoadSegment, WorldObject};
use bevy::prelude::*;
use bevy_asset::io::file::FileAssetReader;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use std::path::{Path, PathBuf};

const GROUND_Z: f32 = 0.0;
const ROAD_Z: f32 = 1.0;
const OBJECT_Z: f32 = 2.0;
const SMOKE_Z: f32 = 3.0;
const VEHICLE_Z: f32 = 4.0;

/// Scale applied to the car sprite.
const VEHICLE_SPRITE_SCALE: f32 = 0.5;
/// Fallback car body, forward along local +x.
const VEHICLE_BODY_SIZE: Vec2 = Vec2::new(60.0, 30.0);
const HEADLIGHT_SIZE: Vec2 = Vec2::new(10.0, 5.0);
const HEADLIGHT_OFFSET: Vec2 = Vec2::new(25.0, 7.5);

/// Background tint behind everything.
pub const CLEAR_COLOR: Color = Color::srgb(0.2, 0.2, 0.2);

// ── Coordinates ───────────────────────────────────────────────────────────────

/// Simulation point to Bevy world point.
pub fn to_render(p: Vec2) -> Vec2 {
    Vec2::new(p.x, -p.y)
}

/// Simulation heading to Bevy z rotation.
pub fn to_render_angle(angle: f32) -> f32 {
    -angle
}

// ── Assets ────────────────────────────────────────────────────────────────────

/// Every sprite the scene can use, keyed by file stem under `assets/`.
pub const SPRITE_NAMES: [&str; 6] = ["car", "tree", "house", "stone", "road", "ground"];

/// Optional image handles.  `None` means the file was absent at startup and
/// the primitive fallback is drawn instead.
#[derive(Resource, Debug, Default, Clone)]
pub struct SpriteAssets {
    pub car: Option<Handle<Image>>,
    pub tree: Option<Handle<Image>>,
    pub house: Option<Handle<Image>>,
    pub stone: Option<Handle<Image>>,
    pub road: Option<Handle<Image>>,
    pub ground: Option<Handle<Image>>,
}

impl SpriteAssets {
    pub fn get(&self, name: &str) -> Option<&Handle<Image>> {
        match name {
            "car" => self.car.as_ref(),
            "tree" => self.tree.as_ref(),
            "house" => self.house.as_ref(),
            "stone" => self.stone.as_ref(),
            "road" => self.road.as_ref(),
            "ground" => self.ground.as_ref(),
            _ => None,
        }
    }

    fn slot(&mut self, name: &str) -> Option<&mut Option<Handle<Image>>> {
        match name {
            "car" => Some(&mut self.car),
            "tree" => Some(&mut self.tree),
            "house" => Some(&mut self.house),
            "stone" => Some(&mut self.stone),
            "road" => Some(&mut self.road),
            "ground" => Some(&mut self.ground),
            _ => None,
        }
    }

    pub fn object(&self, kind: ObjectKind) -> Option<&Handle<Image>> {
        self.get(kind.asset_name())
    }

    /// Names that resolved to an image.
    pub fn present(&self) -> impl Iterator<Item = &'static str> + '_ {
        SPRITE_NAMES.into_iter().filter(move |name| self.get(name).is_some())
    }
}

/// Directory the default `AssetPlugin` reads from: `BEVY_ASSET_ROOT`, else
/// `CARGO_MANIFEST_DIR`, else the executable's directory, then `assets/`.
pub fn asset_root() -> PathBuf {
    FileAssetReader::get_base_path().join(AssetPlugin::default().file_path)
}

/// On-disk location of sprite `name` under `root`.
pub fn sprite_file(root: &Path, name: &str) -> PathBuf {
    root.join(format!("{name}.png"))
}

/// Startup system: queue every sprite that exists on disk.
pub fn load_sprite_assets(mut commands: Commands, asset_server: Res<AssetServer>) {
    let root = asset_root();
    let mut assets = SpriteAssets::default();
    for name in SPRITE_NAMES {
        let file = format!("{name}.png");
        let on_disk = sprite_file(&root, name);
        if let Some(slot) = assets.slot(name) {
            if on_disk.exists() {
                *slot = Some(asset_server.load(file));
            } else {
                warn!("Sprite {} not found; drawing fallback shape", on_disk.display());
            }
        }
    }
    info!("Sprites available: {:?}", assets.present().collect::<Vec<_>>());
    commands.insert_resource(assets);
}

// ── Components & resources ────────────────────────────────────────────────────

/// Marker for the vehicle's root entity.
#[derive(Component)]
pub struct VehicleSprite;

/// A tiled sprite whose tiles still need scaling to `tile_size` world units.
/// Removed once the image has loaded and the stretch is set.
#[derive(Component)]
pub struct TiledSurface {
    pub tile_size: f32,
}

/// Marker for pooled smoke discs.
#[derive(Component)]
pub struct SmokePuff;

/// Unit-radius disc shared by smoke and the tree / stone fallback.
#[derive(Resource)]
pub struct DiscMesh(pub Handle<Mesh>);

/// Smoke entities reused frame to frame.  Slot `i` shows particle `i`; slots
/// past the live count are hidden rather than despawned.
#[derive(Resource, Default)]
pub struct SmokePool {
    slots: Vec<(Entity, Handle<ColorMaterial>)>,
}

fn smoke_color(alpha: f32) -> Color {
    Color::srgba(0.78, 0.78, 0.78, alpha)
}

fn ground_color() -> Color {
    Color::srgb(0.27, 0.42, 0.22)
}

fn road_color() -> Color {
    Color::srgb(0.3, 0.3, 0.32)
}

fn road_border_color() -> Color {
    Color::srgba(0.9, 0.9, 0.85, 0.8)
}

fn object_color(kind: ObjectKind) -> Color {
    match kind {
        ObjectKind::Tree => Color::srgb(0.13, 0.45, 0.16),
        ObjectKind::Stone => Color::srgb(0.55, 0.55, 0.55),
        ObjectKind::House => Color::srgb(0.6, 0.35, 0.2),
    }
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(CLEAR_COLOR))
            .init_resource::<SmokePool>()
            .add_systems(Startup, (setup_camera, init_disc_mesh, load_sprite_assets))
            .add_systems(
                Startup,
                (spawn_world_sprites, spawn_vehicle_sprite)
                    .after(start_session_system)
                    .after(init_disc_mesh)
                    .after(load_sprite_assets),
            )
            .add_systems(
                Update,
                (
                    sync_vehicle_sprite_system,
                    sync_smoke_system,
                    camera_follow_system,
                    road_border_gizmo_system,
                    fit_tile_scale_system,
                )
                    .after(session_tick_system),
            );
    }
}

pub fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn init_disc_mesh(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let handle = meshes.add(circle_mesh(1.0, 16));
    commands.insert_resource(DiscMesh(handle));
}

// ── Startup: static scene ─────────────────────────────────────────────────────

/// Stretch that draws an image `image_width` pixels wide as `tile_size` units.
pub fn tile_stretch(tile_size: f32, image_width: f32) -> f32 {
    if image_width > 0.0 {
        tile_size / image_width
    } else {
        1.0
    }
}

fn tiled_sprite(image: Handle<Image>, size: Vec2) -> Sprite {
    Sprite {
        image,
        custom_size: Some(size),
        image_mode: SpriteImageMode::Tiled {
            tile_x: true,
            tile_y: true,
            stretch_value: 1.0,
        },
        ..default()
    }
}

/// Ground, roads and every world object.  The world never changes after
/// generation, so these entities are spawned once.
pub fn spawn_world_sprites(
    mut commands: Commands,
    session: Res<Session>,
    sprites: Res<SpriteAssets>,
    disc: Res<DiscMesh>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let world = &session.world;
    let tile_size = world.config.tile_size;
    let size = Vec2::new(world.width, world.height);
    let ground_at = Transform::from_translation(to_render(size * 0.5).extend(GROUND_Z));
    match &sprites.ground {
        Some(image) => {
            commands.spawn((
                tiled_sprite(image.clone(), size),
                TiledSurface { tile_size },
                ground_at,
            ));
        }
        None => {
            commands.spawn((Sprite::from_color(ground_color(), size), ground_at));
        }
    }

    for road in &world.roads {
        let road_at = Transform::from_translation(to_render(road.center()).extend(ROAD_Z));
        match &sprites.road {
            Some(image) => {
                commands.spawn((
                    tiled_sprite(image.clone(), road.size),
                    TiledSurface { tile_size },
                    road_at,
                ));
            }
            None => {
                commands.spawn((Sprite::from_color(road_color(), road.size), road_at));
            }
        }
    }

    let tree_mat = materials.add(ColorMaterial::from_color(object_color(ObjectKind::Tree)));
    let stone_mat = materials.add(ColorMaterial::from_color(object_color(ObjectKind::Stone)));
    for obj in &world.objects {
        let transform = object_transform(obj);
        match (sprites.object(obj.kind), obj.kind) {
            (Some(image), _) => {
                commands.spawn((Sprite::from_image(image.clone()), transform));
            }
            (None, ObjectKind::House) => {
                let side = obj.radius * 2.0;
                commands.spawn((
                    Sprite::from_color(object_color(ObjectKind::House), Vec2::splat(side)),
                    transform.with_scale(Vec3::ONE),
                ));
            }
            (None, kind) => {
                let mat = if kind == ObjectKind::Tree {
                    tree_mat.clone()
                } else {
                    stone_mat.clone()
                };
                commands.spawn((
                    Mesh2d(disc.0.clone()),
                    MeshMaterial2d(mat),
                    transform.with_scale(Vec3::splat(obj.radius)),
                ));
            }
        }
    }
    info!(
        "Spawned scene: {} roads, {} objects",
        world.roads.len(),
        world.objects.len()
    );
}

/// Placement for an object sprite drawn at its native size times `scale`.
pub fn object_transform(obj: &WorldObject) -> Transform {
    let angle = if obj.kind.rotates() { obj.angle } else { 0.0 };
    Transform::from_translation(to_render(obj.position).extend(OBJECT_Z))
        .with_rotation(Quat::from_rotation_z(to_render_angle(angle)))
        .with_scale(Vec3::new(obj.scale, obj.scale, 1.0))
}

pub fn spawn_vehicle_sprite(
    mut commands: Commands,
    session: Res<Session>,
    sprites: Res<SpriteAssets>,
) {
    let transform = vehicle_transform(&session);
    match &sprites.car {
        Some(image) => {
            commands.spawn((
                VehicleSprite,
                Sprite::from_image(image.clone()),
                transform.with_scale(Vec3::new(VEHICLE_SPRITE_SCALE, VEHICLE_SPRITE_SCALE, 1.0)),
            ));
        }
        None => {
            commands
                .spawn((
                    VehicleSprite,
                    Sprite::from_color(Color::srgb(0.9, 0.1, 0.1), VEHICLE_BODY_SIZE),
                    transform,
                ))
                .with_children(|parent| {
                    for side in [-1.0, 1.0] {
                        let offset = Vec2::new(HEADLIGHT_OFFSET.x, HEADLIGHT_OFFSET.y * side);
                        parent.spawn((
                            Sprite::from_color(Color::srgb(1.0, 0.95, 0.2), HEADLIGHT_SIZE),
                            Transform::from_translation(offset.extend(0.1)),
                        ));
                    }
                });
        }
    }
}

fn vehicle_transform(session: &Session) -> Transform {
    let v = &session.vehicle;
    Transform::from_translation(to_render(v.position).extend(VEHICLE_Z))
        .with_rotation(Quat::from_rotation_z(to_render_angle(v.heading)))
}

// ── Update systems ────────────────────────────────────────────────────────────

pub fn sync_vehicle_sprite_system(
    session: Res<Session>,
    mut query: Query<&mut Transform, With<VehicleSprite>>,
) {
    let target = vehicle_transform(&session);
    for mut transform in query.iter_mut() {
        transform.translation = target.translation;
        transform.rotation = target.rotation;
    }
}

/// Show one pooled disc per live particle, growing the pool when needed.
pub fn sync_smoke_system(
    mut commands: Commands,
    session: Res<Session>,
    disc: Res<DiscMesh>,
    mut pool: ResMut<SmokePool>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut query: Query<(&mut Transform, &mut Visibility), With<SmokePuff>>,
) {
    let particles = session.effects.particles();

    for (i, particle) in particles.iter().enumerate() {
        let transform = Transform::from_translation(to_render(particle.position).extend(SMOKE_Z))
            .with_scale(Vec3::new(particle.size, particle.size, 1.0));
        let color = smoke_color(particle.alpha());

        if let Some((entity, material)) = pool.slots.get(i) {
            if let Ok((mut t, mut vis)) = query.get_mut(*entity) {
                *t = transform;
                *vis = Visibility::Visible;
            }
            if let Some(mat) = materials.get_mut(material) {
                mat.color = color;
            }
        } else {
            let material = materials.add(ColorMaterial::from_color(color));
            let entity = commands
                .spawn((
                    SmokePuff,
                    Mesh2d(disc.0.clone()),
                    MeshMaterial2d(material.clone()),
                    transform,
                    Visibility::Visible,
                ))
                .id();
            pool.slots.push((entity, material));
        }
    }

    for (entity, _) in pool.slots.iter().skip(particles.len()) {
        if let Ok((_, mut vis)) = query.get_mut(*entity) {
            *vis = Visibility::Hidden;
        }
    }
}

/// Once a tiled image has loaded, scale its tiles to the world tile size.
pub fn fit_tile_scale_system(
    mut commands: Commands,
    images: Res<Assets<Image>>,
    mut query: Query<(Entity, &mut Sprite, &TiledSurface)>,
) {
    for (entity, mut sprite, surface) in query.iter_mut() {
        let Some(image) = images.get(&sprite.image) else {
            continue;
        };
        let stretch = tile_stretch(surface.tile_size, image.width() as f32);
        if let SpriteImageMode::Tiled { stretch_value, .. } = &mut sprite.image_mode {
            *stretch_value = stretch;
        }
        commands.entity(entity).remove::<TiledSurface>();
    }
}

pub fn camera_follow_system(
    session: Res<Session>,
    mut camera: Query<&mut Transform, (With<Camera2d>, Without<VehicleSprite>)>,
) {
    let Ok(mut transform) = camera.single_mut() else {
        return;
    };
    let target = to_render(session.vehicle.position);
    transform.translation.x = target.x;
    transform.translation.y = target.y;
}

/// Corners of a road in render space, counter-clockwise from the origin.
pub fn road_corners(road: &RoadSegment) -> [Vec2; 4] {
    let min = road.origin;
    let max = road.origin + road.size;
    [
        to_render(min),
        to_render(Vec2::new(max.x, min.y)),
        to_render(max),
        to_render(Vec2::new(min.x, max.y)),
    ]
}

pub fn road_border_gizmo_system(session: Res<Session>, mut gizmos: Gizmos) {
    let color = road_border_color();
    for road in &session.world.roads {
        let corners = road_corners(road);
        for i in 0..corners.len() {
            gizmos.line_2d(corners[i], corners[(i + 1) % corners.len()], color);
        }
    }
}

// ── Mesh helper ───────────────────────────────────────────────────────────────

/// Filled circle approximated by an `n`-sided polygon, fanned from the centre.
fn circle_mesh(radius: f32, sides: u32) -> Mesh {
    let n = sides as usize;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(n + 1);

    positions.push([0.0, 0.0, 0.0]);
    normals.push([0.0, 0.0, 1.0]);
    uvs.push([0.5, 0.5]);

    for i in 0..n {
        let angle = std::f32::consts::TAU * i as f32 / n as f32;
        let x = radius * angle.cos();
        let y = radius * angle.sin();
        positions.push([x, y, 0.0]);
        normals.push([0.0, 0.0, 1.0]);
        uvs.push([x / (2.0 * radius) + 0.5, y / (2.0 * radius) + 0.5]);
    }

    let mut indices: Vec<u32> = Vec::with_capacity(n * 3);
    for i in 0..n as u32 {
        indices.extend_from_slice(&[0, i + 1, (i + 1) % n as u32 + 1]);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}
