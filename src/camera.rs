use bevy::prelude::*;

#[derive(Component)]
pub struct FieldCamera;

// The canvas sprite is centred on this camera, so image row 0 lines up with
// the top of the window
pub fn spawn_2d_camera(mut commands: Commands, existing: Query<(), With<FieldCamera>>) {
    if !existing.is_empty() {
        return;
    }

    commands.spawn((
        Camera2d,
        Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb_u8(9, 9, 11)),
            ..default()
        },
        FieldCamera,
    ));
    info!("Spawned 2D camera");
}
