// Shared constants for the particle field
// Tuning values are defaults only; the live values sit in `FieldParams`

/// Number of particles in the pool
pub const PARTICLE_COUNT: usize = 550;

/// Distance within which the pointer affects a particle
pub const INTERACTION_RADIUS: f32 = 150.0;

/// Radial pull toward the pointer at full force
pub const PULL_STRENGTH: f32 = 0.12;

/// Tangential swirl strength, scaled by `VORTEX_MULTIPLIER` when applied
pub const VORTEX_STRENGTH: f32 = 0.07;
pub const VORTEX_MULTIPLIER: f32 = 10.0;

/// Glow assigned at full force
pub const GLOW_SCALE: f32 = 0.7;

/// Per-frame glow decay outside the interaction radius
pub const GLOW_DECAY: f32 = 0.92;

/// Per-frame velocity damping
pub const DAMPING: f32 = 0.95;

/// Per-frame random velocity jitter amplitude
pub const JITTER: f32 = 0.04;

/// How far past an edge a particle may drift before wrapping
pub const WRAP_MARGIN: f32 = 20.0;

/// Upper bound on drawn opacity
pub const ALPHA_CAP: f32 = 0.85;

/// Glow above which the soft halo is drawn
pub const GLOW_THRESHOLD: f32 = 0.25;

/// Halo blur radius at glow 1.0
pub const GLOW_BLUR: f32 = 10.0;

/// Drawn radius multiplier over the particle size
pub const SIZE_SCALE: f32 = 1.6;

/// Rotation gained per unit of speed
pub const ROTATION_SPEED_GAIN: f32 = 0.05;

/// Fading trail overlay
pub const TRAIL_COLOR: [u8; 3] = [10, 10, 12];
pub const TRAIL_ALPHA: f32 = 0.18;

/// Share of particles drawn from the glass palette
pub const GLASS_RATIO: f32 = 0.3;

pub const CHARCOAL_COLOR: [u8; 3] = [80, 80, 85];
pub const GLASS_COLOR: [u8; 3] = [240, 245, 255];
pub const GLOW_TINT: [u8; 3] = [180, 220, 255];

/// Pointer position used before any input arrives
pub const POINTER_SENTINEL: [f32; 2] = [-1000.0, -1000.0];
