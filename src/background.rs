//! Bevy integration for the particle field.
//!
//! The field runs as a small state machine. Setup looks for the primary
//! window; without one the plugin stays `Static` and only the overlay for
//! nested content exists. While `Running`, one system draws a frame into
//! the software canvas and uploads it to the sprite image, and the input
//! listeners keep the pointer and surface size current. `Stopped` tears the
//! canvas and pool down so no further frames are drawn.

use bevy::asset::RenderAssetUsages;
use bevy::input::touch::{TouchInput, TouchPhase};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::window::{PrimaryWindow, WindowResized};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::camera::spawn_2d_camera;
use crate::canvas::{DrawSurface, PixelCanvas};
use crate::presets::{load_presets_system, PresetManager, PresetSource};
use crate::render::draw_frame;
use crate::simulation::{FieldParams, ParticleField, Pointer};

pub struct ParticleBackgroundPlugin;

impl Plugin for ParticleBackgroundPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<BackgroundState>()
            .init_resource::<FieldParams>()
            .init_resource::<Pointer>()
            .init_resource::<FieldRng>()
            .init_resource::<FrameStats>()
            .init_resource::<PresetSource>()
            .init_resource::<PresetManager>()
            .add_event::<BackgroundCommand>()
            // Normally registered by the window and input plugins
            .add_event::<CursorMoved>()
            .add_event::<TouchInput>()
            .add_event::<WindowResized>()
            .configure_sets(Startup, BackgroundSet::Setup)
            .add_systems(
                Startup,
                (load_presets_system, spawn_2d_camera).before(BackgroundSet::Setup),
            )
            .add_systems(Startup, setup_background.in_set(BackgroundSet::Setup))
            .add_systems(OnEnter(BackgroundState::Running), build_field)
            .add_systems(OnEnter(BackgroundState::Stopped), teardown_field)
            .add_systems(Update, handle_commands)
            .add_systems(
                Update,
                (track_cursor, track_touch, handle_resize, animate_field)
                    .chain()
                    .after(handle_commands)
                    .run_if(in_state(BackgroundState::Running))
                    .run_if(resource_exists::<ParticleField>),
            );

        app.register_type::<BackgroundState>();
    }
}

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum BackgroundState {
    /// Before setup has looked for a drawing surface
    #[default]
    Pending,
    Running,
    Stopped,
    /// No drawing surface; only nested content is shown
    Static,
}

/// Systems that spawn nested content should run after this set and parent
/// their entities to the `BackgroundOverlay` node.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum BackgroundSet {
    Setup,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundCommand {
    Stop,
    Resume,
    /// Respawn the pool with the current params
    Reinitialize,
}

/// Random source for spawning and jitter.
#[derive(Resource)]
pub struct FieldRng(pub StdRng);

impl Default for FieldRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub draw_calls: u64,
    pub last_frame_draws: usize,
}

/// The drawing surface and the image it is uploaded to.
#[derive(Resource)]
pub struct FieldCanvas {
    pub surface: PixelCanvas,
    pub image: Handle<Image>,
}

// Components

#[derive(Component)]
pub struct FieldSprite;

/// UI root composed above the animated surface.
#[derive(Component)]
pub struct BackgroundOverlay;

// Systems

fn surface_size(window: &Window) -> Option<UVec2> {
    let width = window.resolution.width().floor();
    let height = window.resolution.height().floor();
    (width >= 1.0 && height >= 1.0).then(|| UVec2::new(width as u32, height as u32))
}

fn canvas_image(size: UVec2) -> Image {
    Image::new_fill(
        Extent3d {
            width: size.x,
            height: size.y,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        &[0, 0, 0, 255],
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
}

fn setup_background(
    mut commands: Commands,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut next_state: ResMut<NextState<BackgroundState>>,
) {
    commands.spawn((
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            align_items: AlignItems::Center,
            justify_content: JustifyContent::Center,
            ..default()
        },
        BackgroundOverlay,
    ));

    match windows.single().ok().and_then(surface_size) {
        Some(_) => next_state.set(BackgroundState::Running),
        None => {
            warn!("No drawing surface available, particle field disabled");
            next_state.set(BackgroundState::Static);
        }
    }
}

fn build_field(
    mut commands: Commands,
    windows: Query<&Window, With<PrimaryWindow>>,
    params: Res<FieldParams>,
    mut rng: ResMut<FieldRng>,
    mut images: ResMut<Assets<Image>>,
    mut next_state: ResMut<NextState<BackgroundState>>,
) {
    let Some(size) = windows.single().ok().and_then(surface_size) else {
        warn!("Drawing surface lost, particle field disabled");
        next_state.set(BackgroundState::Static);
        return;
    };

    let image = images.add(canvas_image(size));
    commands.spawn((
        Sprite {
            image: image.clone(),
            custom_size: Some(size.as_vec2()),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, -10.0),
        FieldSprite,
    ));

    let field = ParticleField::new(size.as_vec2(), &params, &mut rng.0);
    info!(
        "Particle field running: {} particles on {}x{}",
        field.len(),
        size.x,
        size.y
    );
    commands.insert_resource(field);
    commands.insert_resource(FieldCanvas {
        surface: PixelCanvas::new(size.x, size.y),
        image,
    });
}

fn teardown_field(
    mut commands: Commands,
    sprites: Query<Entity, With<FieldSprite>>,
    canvas: Option<Res<FieldCanvas>>,
    mut images: ResMut<Assets<Image>>,
) {
    for entity in sprites.iter() {
        commands.entity(entity).despawn();
    }
    if let Some(canvas) = canvas {
        images.remove(&canvas.image);
    }
    commands.remove_resource::<FieldCanvas>();
    commands.remove_resource::<ParticleField>();
    info!("Particle field stopped");
}

fn handle_commands(
    mut events: EventReader<BackgroundCommand>,
    state: Res<State<BackgroundState>>,
    mut next_state: ResMut<NextState<BackgroundState>>,
    mut field: Option<ResMut<ParticleField>>,
    params: Res<FieldParams>,
    mut rng: ResMut<FieldRng>,
) {
    for event in events.read() {
        match (event, state.get()) {
            (BackgroundCommand::Stop, BackgroundState::Running) => {
                next_state.set(BackgroundState::Stopped);
            }
            (BackgroundCommand::Resume, BackgroundState::Stopped) => {
                info!("Particle field resuming");
                next_state.set(BackgroundState::Running);
            }
            (BackgroundCommand::Reinitialize, BackgroundState::Running) => {
                if let Some(field) = field.as_deref_mut() {
                    field.reinitialize(&params, &mut rng.0);
                    debug!("Particle pool reinitialized ({} particles)", field.len());
                }
            }
            (event, state) => debug!("Ignoring {event:?} while {state:?}"),
        }
    }
}

fn track_cursor(mut cursor: EventReader<CursorMoved>, mut pointer: ResMut<Pointer>) {
    if let Some(moved) = cursor.read().last() {
        pointer.position = moved.position;
    }
}

// Only the first touch point steers the field
fn track_touch(mut touches: EventReader<TouchInput>, mut pointer: ResMut<Pointer>) {
    let first = touches
        .read()
        .filter(|touch| touch.phase == TouchPhase::Moved)
        .fold(None::<&TouchInput>, |best, touch| match best {
            Some(best) if best.id < touch.id => Some(best),
            _ => Some(touch),
        });
    if let Some(touch) = first {
        pointer.position = touch.position;
    }
}

fn handle_resize(
    mut resized: EventReader<WindowResized>,
    primary: Query<Entity, With<PrimaryWindow>>,
    mut field: ResMut<ParticleField>,
    mut canvas: ResMut<FieldCanvas>,
    mut sprites: Query<&mut Sprite, With<FieldSprite>>,
    params: Res<FieldParams>,
    mut rng: ResMut<FieldRng>,
    mut images: ResMut<Assets<Image>>,
) {
    let primary = primary.single().ok();
    let Some(size) = resized
        .read()
        .filter(|event| Some(event.window) == primary)
        .last()
        .map(|event| Vec2::new(event.width, event.height).floor())
    else {
        return;
    };
    // Minimised windows report zero; keep the current pool until restored
    if size.x < 1.0 || size.y < 1.0 {
        return;
    }
    let size = size.as_uvec2();
    if size == canvas.surface.size() {
        return;
    }

    canvas.surface.resize(size.x, size.y);
    if let Some(image) = images.get_mut(&canvas.image) {
        image.resize(Extent3d {
            width: size.x,
            height: size.y,
            depth_or_array_layers: 1,
        });
    }
    for mut sprite in sprites.iter_mut() {
        sprite.custom_size = Some(size.as_vec2());
    }
    field.resize(size.as_vec2(), &params, &mut rng.0);
    info!("Surface resized to {}x{}, pool reinitialized", size.x, size.y);
}

fn animate_field(
    mut field: ResMut<ParticleField>,
    mut canvas: ResMut<FieldCanvas>,
    pointer: Res<Pointer>,
    params: Res<FieldParams>,
    mut rng: ResMut<FieldRng>,
    mut images: ResMut<Assets<Image>>,
    mut stats: ResMut<FrameStats>,
) {
    let FieldCanvas { surface, image: handle } = &mut *canvas;
    let draws = draw_frame(&mut field, pointer.position, &params, surface, &mut rng.0);

    if let Some(image) = images.get_mut(handle.id()) {
        let pixels = surface.pixels();
        match &mut image.data {
            Some(data) if data.len() == pixels.len() => data.copy_from_slice(pixels),
            data => *data = Some(pixels.to_vec()),
        }
    }

    stats.frames += 1;
    stats.draw_calls += draws as u64;
    stats.last_frame_draws = draws;
}
