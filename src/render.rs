use bevy::math::Vec2;
use rand::Rng;

use crate::canvas::DrawSurface;
use crate::simulation::{FieldParams, ParticleField};

/// One display frame: fade the previous frame, then update and draw every
/// particle in turn. Returns the number of circles drawn.
pub fn draw_frame(
    field: &mut ParticleField,
    pointer: Vec2,
    params: &FieldParams,
    surface: &mut impl DrawSurface,
    rng: &mut impl Rng,
) -> usize {
    // Motion blur
    surface.fill_overlay(params.trail());

    let mut draws = 0;
    field.step_each(pointer, params, rng, |particle| {
        surface.fill_circle(
            particle.position,
            particle.radius(params),
            particle.fill(params),
            particle.glow_style(params),
        );
        draws += 1;
    });
    draws
}
