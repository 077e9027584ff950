pub mod background;
pub mod camera;
pub mod canvas;
pub mod constants;
pub mod presets;
pub mod render;
pub mod simulation;
pub mod ui;

use bevy::prelude::*;

// Re-exports
pub use background::{
    BackgroundCommand, BackgroundOverlay, BackgroundSet, BackgroundState, FrameStats,
    ParticleBackgroundPlugin,
};
pub use simulation::{FieldParams, ParticleField, Pointer};

/// Windowed app with the field, the tuning panel and a static hero overlay.
pub fn app() -> App {
    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(bevy::log::LogPlugin {
                level: bevy::log::Level::INFO,
                filter: "wgpu=warn,naga=warn,info".into(),
                ..default()
            })
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Vortex Field".into(),
                    ..default()
                }),
                ..default()
            }),
    )
    .add_plugins((
        bevy_egui::EguiPlugin {
            enable_multipass_for_primary_context: false,
        },
        ParticleBackgroundPlugin,
        ui::UiPlugin,
    ))
    .add_systems(Startup, spawn_hero.after(BackgroundSet::Setup));

    app
}

// Nested content shown above the field
fn spawn_hero(mut commands: Commands, overlay: Query<Entity, With<BackgroundOverlay>>) {
    let Ok(overlay) = overlay.single() else {
        return;
    };
    commands.entity(overlay).with_children(|parent| {
        parent.spawn((
            Text::new("ATMOSPHERIC FRICTION"),
            TextFont {
                font_size: 28.0,
                ..default()
            },
            TextColor(Color::srgba(1.0, 1.0, 1.0, 0.3)),
        ));
        parent.spawn((
            Text::new("INTERACTIVE KINETIC ENVIRONMENT"),
            TextFont {
                font_size: 11.0,
                ..default()
            },
            TextColor(Color::srgba(1.0, 1.0, 1.0, 0.12)),
            Node {
                margin: UiRect::top(Val::Px(16.0)),
                ..default()
            },
        ));
    });
}
