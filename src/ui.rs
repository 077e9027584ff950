use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::background::{BackgroundCommand, BackgroundState, FieldRng, FrameStats};
use crate::presets::{apply_preset, PresetManager};
use crate::simulation::{FieldParams, ParticleField};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PanelVisibility>()
            .add_systems(Update, (handle_hotkeys, draw_ui.run_if(panel_visible)).chain());
    }
}

#[derive(Resource)]
pub struct PanelVisibility {
    pub visible: bool,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self { visible: true }
    }
}

fn panel_visible(panel: Res<PanelVisibility>) -> bool {
    panel.visible
}

fn toggle_command(state: &BackgroundState) -> Option<BackgroundCommand> {
    match state {
        BackgroundState::Running => Some(BackgroundCommand::Stop),
        BackgroundState::Stopped => Some(BackgroundCommand::Resume),
        _ => None,
    }
}

fn handle_hotkeys(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<BackgroundState>>,
    mut commands_ev: EventWriter<BackgroundCommand>,
    mut panel: ResMut<PanelVisibility>,
    mut presets: ResMut<PresetManager>,
    mut params: ResMut<FieldParams>,
    mut rng: ResMut<FieldRng>,
    mut field: Option<ResMut<ParticleField>>,
) {
    if keys.just_pressed(KeyCode::Space) {
        if let Some(command) = toggle_command(state.get()) {
            commands_ev.write(command);
        }
    }

    if keys.just_pressed(KeyCode::KeyR) {
        commands_ev.write(BackgroundCommand::Reinitialize);
    }

    if keys.just_pressed(KeyCode::KeyH) {
        panel.visible = !panel.visible;
    }

    // Cycle presets with P
    if keys.just_pressed(KeyCode::KeyP) {
        presets.next();
        if let Some(preset) = presets.current_preset() {
            apply_preset(preset, &mut params, &mut rng, field.as_deref_mut());
        }
    }
}

fn draw_ui(
    mut contexts: EguiContexts,
    mut params: ResMut<FieldParams>,
    mut presets: ResMut<PresetManager>,
    mut rng: ResMut<FieldRng>,
    mut field: Option<ResMut<ParticleField>>,
    mut commands_ev: EventWriter<BackgroundCommand>,
    stats: Res<FrameStats>,
    state: Res<State<BackgroundState>>,
) {
    let mut selected_preset = None;
    let mut reinitialize = false;

    egui::SidePanel::left("field_panel")
        .resizable(true)
        .default_width(260.0)
        .min_width(220.0)
        .max_width(360.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.heading("Particle Field");
            ui.separator();

            egui::CollapsingHeader::new("Status")
                .default_open(true)
                .show(ui, |ui| {
                    ui.label(format!("State: {:?}", state.get()));
                    ui.label(format!("Frames: {}", stats.frames));
                    ui.label(format!("Draws last frame: {}", stats.last_frame_draws));
                    ui.label(format!("Total draws: {}", stats.draw_calls));

                    match toggle_command(state.get()) {
                        Some(BackgroundCommand::Stop) => {
                            if ui.button("Stop").clicked() {
                                commands_ev.write(BackgroundCommand::Stop);
                            }
                        }
                        Some(command) => {
                            if ui.button("Resume").clicked() {
                                commands_ev.write(command);
                            }
                        }
                        None => {
                            ui.colored_label(egui::Color32::YELLOW, "No drawing surface");
                        }
                    }
                    ui.label("Hotkey: Space");
                });

            egui::CollapsingHeader::new("Presets")
                .default_open(true)
                .show(ui, |ui| {
                    for (index, preset) in presets.presets.iter().enumerate() {
                        if ui
                            .selectable_label(index == presets.current, preset.name.as_str())
                            .clicked()
                        {
                            selected_preset = Some(index);
                        }
                    }
                    ui.label("Hotkey: P");
                });

            egui::CollapsingHeader::new("Pointer Forces")
                .default_open(true)
                .show(ui, |ui| {
                    ui.add(
                        egui::Slider::new(&mut params.interaction_radius, 10.0..=400.0)
                            .text("Radius"),
                    );
                    ui.add(egui::Slider::new(&mut params.pull_strength, 0.0..=1.0).text("Pull"));
                    ui.add(
                        egui::Slider::new(&mut params.vortex_strength, 0.0..=0.5).text("Vortex"),
                    );
                    ui.add(egui::Slider::new(&mut params.glow_scale, 0.0..=1.0).text("Glow"));
                    ui.add(
                        egui::Slider::new(&mut params.glow_decay, 0.5..=0.999)
                            .text("Glow decay"),
                    );
                });

            egui::CollapsingHeader::new("Motion")
                .default_open(true)
                .show(ui, |ui| {
                    ui.add(egui::Slider::new(&mut params.damping, 0.8..=1.0).text("Damping"));
                    ui.add(egui::Slider::new(&mut params.jitter, 0.0..=0.2).text("Jitter"));
                    ui.add(
                        egui::Slider::new(&mut params.wrap_margin, 0.0..=100.0)
                            .text("Wrap margin"),
                    );
                });

            egui::CollapsingHeader::new("Appearance")
                .default_open(false)
                .show(ui, |ui| {
                    ui.add(egui::Slider::new(&mut params.trail_alpha, 0.01..=1.0).text("Trail"));
                    ui.add(egui::Slider::new(&mut params.alpha_cap, 0.1..=1.0).text("Opacity cap"));
                    ui.add(
                        egui::Slider::new(&mut params.glow_threshold, 0.0..=1.0)
                            .text("Halo threshold"),
                    );
                    ui.add(egui::Slider::new(&mut params.glow_blur, 0.0..=30.0).text("Halo blur"));
                    ui.add(egui::Slider::new(&mut params.size_scale, 0.5..=5.0).text("Size"));
                });

            egui::CollapsingHeader::new("Pool")
                .default_open(true)
                .show(ui, |ui| {
                    // Pool-shape changes only take effect on respawn
                    reinitialize |= ui
                        .add(
                            egui::Slider::new(&mut params.particle_count, 0..=3000)
                                .text("Particles"),
                        )
                        .changed();
                    reinitialize |= ui
                        .add(egui::Slider::new(&mut params.glass_ratio, 0.0..=1.0).text("Glass"))
                        .changed();
                    if ui.button("Respawn").clicked() {
                        reinitialize = true;
                    }
                    ui.label("Hotkey: R");
                });

            ui.separator();

            if ui.button("Reset to Defaults").clicked() {
                *params = FieldParams::default();
                reinitialize = true;
            }
            ui.label("Hotkey: H hides this panel");
        });

    if let Some(index) = selected_preset {
        if let Some(preset) = presets.select(index) {
            apply_preset(preset, &mut params, &mut rng, field.as_deref_mut());
        }
    } else if reinitialize {
        commands_ev.write(BackgroundCommand::Reinitialize);
    }
}
