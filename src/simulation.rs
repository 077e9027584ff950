use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::canvas::{Glow, Rgba};
use crate::constants::{
    ALPHA_CAP, CHARCOAL_COLOR, DAMPING, GLASS_COLOR, GLASS_RATIO, GLOW_BLUR, GLOW_DECAY,
    GLOW_SCALE, GLOW_THRESHOLD, GLOW_TINT, INTERACTION_RADIUS, JITTER, PARTICLE_COUNT,
    POINTER_SENTINEL, PULL_STRENGTH, ROTATION_SPEED_GAIN, SIZE_SCALE, TRAIL_ALPHA, TRAIL_COLOR,
    VORTEX_MULTIPLIER, VORTEX_STRENGTH, WRAP_MARGIN,
};

/// Tuning values for the field. Every field falls back to its default when
/// missing from a preset file.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldParams {
    pub particle_count: usize,
    pub interaction_radius: f32,
    pub pull_strength: f32,
    pub vortex_strength: f32,
    pub glow_scale: f32,
    pub glow_decay: f32,
    pub damping: f32,
    pub jitter: f32,
    pub wrap_margin: f32,
    pub alpha_cap: f32,
    pub glow_threshold: f32,
    pub glow_blur: f32,
    pub size_scale: f32,
    pub glass_ratio: f32,
    pub trail_color: [u8; 3],
    pub trail_alpha: f32,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            interaction_radius: INTERACTION_RADIUS,
            pull_strength: PULL_STRENGTH,
            vortex_strength: VORTEX_STRENGTH,
            glow_scale: GLOW_SCALE,
            glow_decay: GLOW_DECAY,
            damping: DAMPING,
            jitter: JITTER,
            wrap_margin: WRAP_MARGIN,
            alpha_cap: ALPHA_CAP,
            glow_threshold: GLOW_THRESHOLD,
            glow_blur: GLOW_BLUR,
            size_scale: SIZE_SCALE,
            glass_ratio: GLASS_RATIO,
            trail_color: TRAIL_COLOR,
            trail_alpha: TRAIL_ALPHA,
        }
    }
}

impl FieldParams {
    pub fn trail(&self) -> Rgba {
        Rgba::new(self.trail_color, self.trail_alpha)
    }
}

/// Latest pointer position in surface coordinates (origin top-left).
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
    pub position: Vec2,
}

impl Default for Pointer {
    fn default() -> Self {
        Self {
            position: Vec2::from(POINTER_SENTINEL),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Palette {
    Charcoal,
    Glass,
}

impl Palette {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Palette::Charcoal => CHARCOAL_COLOR,
            Palette::Glass => GLASS_COLOR,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub alpha: f32,
    pub palette: Palette,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub glow: f32,
}

/// Proximity force in `0..=1` for a particle `distance` away from the
/// pointer, or `None` outside the interaction radius.
pub fn interaction_force(distance: f32, radius: f32) -> Option<f32> {
    let distance = if distance.is_finite() { distance.max(0.0) } else { 0.0 };
    if radius <= 0.0 || distance >= radius {
        return None;
    }
    Some(((radius - distance) / radius).clamp(0.0, 1.0))
}

fn centered(rng: &mut impl Rng) -> f32 {
    rng.gen::<f32>() - 0.5
}

impl Particle {
    pub fn spawn(bounds: Vec2, params: &FieldParams, rng: &mut impl Rng) -> Self {
        let palette = if rng.gen::<f32>() < params.glass_ratio {
            Palette::Glass
        } else {
            Palette::Charcoal
        };
        Self {
            position: Vec2::new(rng.gen::<f32>() * bounds.x, rng.gen::<f32>() * bounds.y),
            velocity: Vec2::new(centered(rng), centered(rng)) * 0.2,
            size: rng.gen::<f32>() * 0.75 + 0.15,
            alpha: rng.gen::<f32>() * 0.4 + 0.1,
            palette,
            rotation: rng.gen::<f32>() * std::f32::consts::TAU,
            rotation_speed: centered(rng) * 0.05,
            glow: 0.0,
        }
    }

    /// Advance one frame. Returns the pointer force that was applied, if any.
    pub fn update(
        &mut self,
        pointer: Vec2,
        bounds: Vec2,
        params: &FieldParams,
        rng: &mut impl Rng,
    ) -> Option<f32> {
        let offset = pointer - self.position;
        let distance = offset.length();
        let force = interaction_force(distance, params.interaction_radius);

        match force {
            Some(force) => {
                // On the pointer itself, push against the current heading
                let dir = if distance > f32::EPSILON {
                    offset / distance
                } else {
                    (-self.velocity).try_normalize().unwrap_or(Vec2::X)
                };
                self.velocity += dir * force * params.pull_strength;
                self.velocity +=
                    Vec2::new(dir.y, -dir.x) * force * params.vortex_strength * VORTEX_MULTIPLIER;
                self.glow = (force * params.glow_scale).clamp(0.0, 1.0);
            }
            None => self.glow = (self.glow * params.glow_decay).clamp(0.0, 1.0),
        }

        self.position += self.velocity;
        self.velocity *= params.damping;
        self.velocity += Vec2::new(centered(rng), centered(rng)) * params.jitter;

        self.rotation += self.rotation_speed
            + (self.velocity.x.abs() + self.velocity.y.abs()) * ROTATION_SPEED_GAIN;

        self.position.x = wrap(self.position.x, bounds.x, params.wrap_margin);
        self.position.y = wrap(self.position.y, bounds.y, params.wrap_margin);

        force
    }

    pub fn radius(&self, params: &FieldParams) -> f32 {
        self.size * params.size_scale
    }

    pub fn draw_opacity(&self, params: &FieldParams) -> f32 {
        (self.alpha + self.glow).min(params.alpha_cap)
    }

    pub fn fill(&self, params: &FieldParams) -> Rgba {
        Rgba::new(self.palette.rgb(), self.draw_opacity(params))
    }

    /// Halo style, only once the glow passes the threshold.
    pub fn glow_style(&self, params: &FieldParams) -> Option<Glow> {
        (self.glow > params.glow_threshold).then(|| Glow {
            blur: params.glow_blur * self.glow,
            color: Rgba::new(GLOW_TINT, self.glow),
        })
    }
}

fn wrap(value: f32, bound: f32, margin: f32) -> f32 {
    if value < -margin {
        bound + margin
    } else if value > bound + margin {
        -margin
    } else {
        value
    }
}

/// The particle pool and the surface it lives on.
#[derive(Resource, Clone, Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    bounds: Vec2,
}

impl ParticleField {
    pub fn new(bounds: Vec2, params: &FieldParams, rng: &mut impl Rng) -> Self {
        let mut field = Self {
            particles: Vec::new(),
            bounds,
        };
        field.reinitialize(params, rng);
        field
    }

    /// Discard the pool and respawn it for the new bounds.
    pub fn resize(&mut self, bounds: Vec2, params: &FieldParams, rng: &mut impl Rng) {
        self.bounds = bounds;
        self.reinitialize(params, rng);
    }

    pub fn reinitialize(&mut self, params: &FieldParams, rng: &mut impl Rng) {
        let bounds = self.bounds;
        self.particles = (0..params.particle_count)
            .map(|_| Particle::spawn(bounds, params, rng))
            .collect();
    }

    /// Update every particle without drawing.
    pub fn step(&mut self, pointer: Vec2, params: &FieldParams, rng: &mut impl Rng) {
        self.step_each(pointer, params, rng, |_| {});
    }

    /// Update every particle, handing each one to `visit` right after its update.
    pub fn step_each(
        &mut self,
        pointer: Vec2,
        params: &FieldParams,
        rng: &mut impl Rng,
        mut visit: impl FnMut(&Particle),
    ) {
        let bounds = self.bounds;
        for particle in &mut self.particles {
            particle.update(pointer, bounds, params, rng);
            visit(particle);
        }
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn still_particle(position: Vec2) -> Particle {
        Particle {
            position,
            velocity: Vec2::ZERO,
            size: 0.5,
            alpha: 0.3,
            palette: Palette::Charcoal,
            rotation: 0.0,
            rotation_speed: 0.0,
            glow: 0.0,
        }
    }

    fn quiet_params() -> FieldParams {
        FieldParams {
            jitter: 0.0,
            ..default()
        }
    }

    fn assert_within_margin(field: &ParticleField, margin: f32) {
        let bounds = field.bounds();
        for p in field.particles() {
            assert!(p.position.x >= -margin && p.position.x <= bounds.x + margin, "{p:?}");
            assert!(p.position.y >= -margin && p.position.y <= bounds.y + margin, "{p:?}");
        }
    }

    #[test]
    fn force_is_zero_at_radius_and_one_at_center() {
        assert_eq!(interaction_force(150.0, 150.0), None);
        assert_eq!(interaction_force(200.0, 150.0), None);
        let edge = interaction_force(149.999, 150.0).unwrap();
        assert!(edge < 1e-4);
        assert_eq!(interaction_force(0.0, 150.0), Some(1.0));
        assert_eq!(interaction_force(75.0, 150.0), Some(0.5));
    }

    #[test]
    fn force_guards_degenerate_distances() {
        assert_eq!(interaction_force(-3.0, 150.0), Some(1.0));
        assert_eq!(interaction_force(f32::NAN, 150.0), Some(1.0));
        assert_eq!(interaction_force(10.0, 0.0), None);
    }

    #[test]
    fn new_field_fills_pool_inside_bounds() {
        let params = FieldParams::default();
        let field = ParticleField::new(Vec2::new(800.0, 600.0), &params, &mut rng());
        assert_eq!(field.len(), 550);
        for p in field.particles() {
            assert!((0.0..800.0).contains(&p.position.x));
            assert!((0.0..600.0).contains(&p.position.y));
            assert!((0.15..0.9).contains(&p.size));
            assert!((0.1..0.5).contains(&p.alpha));
            assert!(p.velocity.x.abs() <= 0.1 && p.velocity.y.abs() <= 0.1);
            assert_eq!(p.glow, 0.0);
        }
    }

    #[test]
    fn palettes_follow_glass_ratio() {
        let params = FieldParams {
            particle_count: 10_000,
            ..default()
        };
        let field = ParticleField::new(Vec2::splat(100.0), &params, &mut rng());
        let glass = field
            .particles()
            .iter()
            .filter(|p| p.palette == Palette::Glass)
            .count() as f32;
        let ratio = glass / 10_000.0;
        assert!((ratio - 0.3).abs() < 0.03, "ratio = {ratio}");
    }

    #[test]
    fn sentinel_pointer_gives_only_damped_drift() {
        let params = FieldParams::default();
        let mut rng = rng();
        let mut field = ParticleField::new(Vec2::new(800.0, 600.0), &params, &mut rng);
        let sentinel = Pointer::default().position;

        for _ in 0..300 {
            field.step(sentinel, &params, &mut rng);
            for p in field.particles() {
                assert_eq!(p.glow, 0.0);
                // Damping bounds the jitter-driven speed well below any swirl
                assert!(p.velocity.length() < 1.0, "{p:?}");
            }
            assert_within_margin(&field, params.wrap_margin);
        }
    }

    #[test]
    fn sentinel_pointer_without_jitter_only_damps() {
        let params = quiet_params();
        let mut rng = rng();
        let mut field = ParticleField::new(Vec2::new(800.0, 600.0), &params, &mut rng);
        let sentinel = Pointer::default().position;

        for _ in 0..50 {
            let before: Vec<Vec2> = field.particles().iter().map(|p| p.velocity).collect();
            field.step(sentinel, &params, &mut rng);
            for (p, previous) in field.particles().iter().zip(before) {
                assert_eq!(p.velocity, previous * params.damping);
                assert_eq!(p.glow, 0.0);
            }
        }
    }

    #[test]
    fn pointer_on_particle_applies_full_force_without_nan() {
        let params = FieldParams::default();
        let mut p = still_particle(Vec2::new(100.0, 100.0));
        let force = p.update(Vec2::new(100.0, 100.0), Vec2::new(800.0, 600.0), &params, &mut rng());
        assert_eq!(force, Some(1.0));
        assert!((p.glow - 0.7).abs() < 1e-6);
        assert!(p.position.is_finite());
        assert!(p.velocity.is_finite());

        // Full pull plus full swirl, undamped and without jitter
        let params = FieldParams {
            damping: 1.0,
            ..quiet_params()
        };
        let mut p = still_particle(Vec2::new(100.0, 100.0));
        p.update(Vec2::new(100.0, 100.0), Vec2::new(800.0, 600.0), &params, &mut rng());
        let swirl = params.vortex_strength * VORTEX_MULTIPLIER;
        let expected = (params.pull_strength.powi(2) + swirl.powi(2)).sqrt();
        assert!((p.velocity.length() - expected).abs() < 1e-5, "{:?}", p.velocity);
        assert!((expected - 0.71).abs() < 0.01);

        // A moving particle is pushed back against its heading
        let mut p = still_particle(Vec2::new(100.0, 100.0));
        p.velocity = Vec2::new(0.0, 2.0);
        p.update(p.position, Vec2::new(800.0, 600.0), &params, &mut rng());
        assert!((p.velocity.y - (2.0 - params.pull_strength)).abs() < 1e-5);
    }

    #[test]
    fn pull_moves_toward_pointer() {
        let params = FieldParams {
            vortex_strength: 0.0,
            ..quiet_params()
        };
        let mut p = still_particle(Vec2::new(100.0, 100.0));
        let force = p
            .update(Vec2::new(150.0, 100.0), Vec2::new(800.0, 600.0), &params, &mut rng())
            .unwrap();
        let expected = force * params.pull_strength;
        assert!((p.position.x - (100.0 + expected)).abs() < 1e-5);
        assert!((p.velocity.x - expected * params.damping).abs() < 1e-6);
        assert_eq!(p.velocity.y, 0.0);
    }

    #[test]
    fn vortex_pushes_perpendicular_to_pointer() {
        let params = FieldParams {
            pull_strength: 0.0,
            ..quiet_params()
        };
        let mut p = still_particle(Vec2::new(100.0, 100.0));
        let force = p
            .update(Vec2::new(150.0, 100.0), Vec2::new(800.0, 600.0), &params, &mut rng())
            .unwrap();
        assert_eq!(p.velocity.x, 0.0);
        let expected = -force * params.vortex_strength * VORTEX_MULTIPLIER * params.damping;
        assert!((p.velocity.y - expected).abs() < 1e-6);
    }

    #[test]
    fn glow_decays_outside_radius() {
        let params = quiet_params();
        let mut p = still_particle(Vec2::new(400.0, 300.0));
        p.glow = 1.0;
        let sentinel = Pointer::default().position;
        let mut rng = rng();
        let mut previous = p.glow;
        for _ in 0..90 {
            p.update(sentinel, Vec2::new(800.0, 600.0), &params, &mut rng);
            assert!(p.glow <= previous);
            assert!((p.glow - previous * params.glow_decay).abs() < 1e-7);
            assert!((0.0..=1.0).contains(&p.glow));
            previous = p.glow;
        }
        assert!(p.glow < 1e-3, "glow = {}", p.glow);
    }

    #[test]
    fn wraps_to_opposite_edge_past_margin() {
        let params = quiet_params();
        let bounds = Vec2::new(800.0, 600.0);
        let sentinel = Pointer::default().position;

        let mut p = still_particle(Vec2::new(-25.0, 300.0));
        p.update(sentinel, bounds, &params, &mut rng());
        assert_eq!(p.position, Vec2::new(820.0, 300.0));

        let mut p = still_particle(Vec2::new(400.0, 625.0));
        p.update(sentinel, bounds, &params, &mut rng());
        assert_eq!(p.position, Vec2::new(400.0, -20.0));

        // Inside the margin nothing wraps
        let mut p = still_particle(Vec2::new(-15.0, 610.0));
        p.update(sentinel, bounds, &params, &mut rng());
        assert_eq!(p.position, Vec2::new(-15.0, 610.0));
    }

    #[test]
    fn wrap_invariant_holds_under_strong_forces() {
        let params = FieldParams {
            pull_strength: 3.0,
            vortex_strength: 1.0,
            ..default()
        };
        let mut rng = rng();
        let mut field = ParticleField::new(Vec2::new(320.0, 240.0), &params, &mut rng);
        for frame in 0..400 {
            let pointer = Vec2::new((frame * 7 % 320) as f32, (frame * 3 % 240) as f32);
            field.step(pointer, &params, &mut rng);
            assert_within_margin(&field, params.wrap_margin);
            for p in field.particles() {
                assert!((0.0..=1.0).contains(&p.glow));
            }
        }
    }

    #[test]
    fn resize_respawns_inside_new_bounds() {
        let params = FieldParams::default();
        let mut rng = rng();
        let mut field = ParticleField::new(Vec2::new(800.0, 600.0), &params, &mut rng);
        field.resize(Vec2::new(200.0, 100.0), &params, &mut rng);
        assert_eq!(field.len(), params.particle_count);
        assert_eq!(field.bounds(), Vec2::new(200.0, 100.0));
        for p in field.particles() {
            assert!((0.0..200.0).contains(&p.position.x));
            assert!((0.0..100.0).contains(&p.position.y));
        }
    }

    #[test]
    fn opacity_is_capped_and_halo_needs_threshold() {
        let params = FieldParams::default();
        let mut p = still_particle(Vec2::ZERO);
        p.alpha = 0.4;
        p.glow = 0.7;
        assert_eq!(p.draw_opacity(&params), 0.85);
        let halo = p.glow_style(&params).unwrap();
        assert!((halo.blur - 7.0).abs() < 1e-5);
        assert_eq!(halo.color, Rgba::new(GLOW_TINT, 0.7));

        p.glow = 0.25;
        assert!(p.glow_style(&params).is_none());
        assert!((p.draw_opacity(&params) - 0.65).abs() < 1e-6);
    }

    #[test]
    fn params_fill_missing_fields_from_defaults() {
        let params: FieldParams =
            serde_json::from_str(r#"{ "particle_count": 42, "vortex_strength": 0.2 }"#).unwrap();
        assert_eq!(params.particle_count, 42);
        assert_eq!(params.vortex_strength, 0.2);
        assert_eq!(params.interaction_radius, INTERACTION_RADIUS);
        assert_eq!(params.trail_color, TRAIL_COLOR);
    }
}
