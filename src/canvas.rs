//! Software drawing surface for the particle field.
//!
//! `DrawSurface` is the small slice of a 2D context the field needs: a
//! full-surface overlay and filled circles with an optional soft halo.
//! `PixelCanvas` implements it over an RGBA8 buffer that is uploaded to a
//! Bevy `Image` once per frame.

use bevy::math::{UVec2, Vec2};

/// Straight-alpha colour. Channels are sRGB bytes, alpha is `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(rgb: [u8; 3], a: f32) -> Self {
        Self { r: rgb[0], g: rgb[1], b: rgb[2], a }
    }

    fn alpha_u16(&self) -> u16 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u16
    }
}

/// Soft halo drawn behind a circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    /// Distance in pixels over which the halo fades out past the circle edge.
    pub blur: f32,
    pub color: Rgba,
}

/// Minimal 2D drawing context.
pub trait DrawSurface {
    fn size(&self) -> UVec2;

    /// Blend `color` over every pixel.
    fn fill_overlay(&mut self, color: Rgba);

    /// Fill a circle centred at `center`, optionally with a halo behind it.
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba, glow: Option<Glow>);
}

/// Alpha blend a single channel, `alpha` in `0..=255`
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 127) / 255) as u8
}

#[inline]
fn blend_pixel(dest: &mut [u8], color: Rgba, alpha: u16) {
    if alpha == 0 {
        return;
    }
    dest[0] = blend_channel(color.r, dest[0], alpha);
    dest[1] = blend_channel(color.g, dest[1], alpha);
    dest[2] = blend_channel(color.b, dest[2], alpha);
    dest[3] = 255;
}

/// RGBA8 pixel buffer, row 0 at the top.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        let mut canvas = Self {
            pixels: Vec::new(),
            width: 0,
            height: 0,
        };
        canvas.resize(width, height);
        canvas
    }

    /// Reallocate to the new size and clear to opaque black.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = [0, 0, 0, 255].repeat((width as usize) * (height as usize));
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }
}

impl DrawSurface for PixelCanvas {
    fn size(&self) -> UVec2 {
        UVec2::new(self.width, self.height)
    }

    fn fill_overlay(&mut self, color: Rgba) {
        let alpha = color.alpha_u16();
        for px in self.pixels.chunks_exact_mut(4) {
            blend_pixel(px, color, alpha);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba, glow: Option<Glow>) {
        if self.width == 0 || self.height == 0 || radius <= 0.0 {
            return;
        }
        let glow = glow.filter(|g| g.blur > 0.0 && g.color.a > 0.0);
        let reach = radius + glow.map_or(0.0, |g| g.blur) + 1.0;

        // Clip the bounding box to the surface
        let min_x = (center.x - reach).floor().max(0.0) as u32;
        let min_y = (center.y - reach).floor().max(0.0) as u32;
        let max_x = (center.x + reach).ceil().min(self.width as f32);
        let max_y = (center.y + reach).ceil().min(self.height as f32);
        if max_x <= 0.0 || max_y <= 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as u32, max_y as u32);

        for y in min_y..max_y {
            for x in min_x..max_x {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5).distance(center);
                let i = ((y * self.width + x) * 4) as usize;
                let px = &mut self.pixels[i..i + 4];

                if let Some(glow) = glow {
                    if d > radius && d < radius + glow.blur {
                        let falloff = 1.0 - (d - radius) / glow.blur;
                        let halo = Rgba { a: glow.color.a * falloff * 0.5, ..glow.color };
                        blend_pixel(px, halo, halo.alpha_u16());
                    }
                }

                let coverage = (radius + 0.5 - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    let core = Rgba { a: color.a * coverage, ..color };
                    blend_pixel(px, core, core.alpha_u16());
                }
            }
        }
    }
}
