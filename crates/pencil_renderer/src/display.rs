//! Display pass: turns accumulated radiance into a viewable image.

use pencil_math::{step, Color, Vec2, Vec3, Vec3Ext};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::accumulation::AccumulationBuffer;
use crate::sampling::pixel_rng;

/// Mixed into the seed so dither noise never repeats the path streams.
const DITHER_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Tone and framing controls for the display pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub exposure: f32,
    /// Darkening towards the corners
    pub vignette: f32,
    /// Blend between linear and `1 - exp(-2c)` tone response
    pub tone_mix: f32,
    /// Per-channel exponent applied before gamma
    pub channel_curve: Vec3,
    pub gamma: f32,
    /// Amplitude of the uniform dither noise
    pub dither: f32,
    /// Pixels outside a centered frame of this aspect ratio are black
    pub frame_aspect: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            exposure: 3.5,
            vignette: 0.1,
            tone_mix: 0.5,
            channel_curve: Vec3::new(1.0, 1.02, 1.05),
            gamma: 0.45,
            dither: 0.01,
            frame_aspect: 16.0 / 9.0,
        }
    }
}

impl DisplaySettings {
    /// Vignette, exposure and the tone curves for one pixel.
    ///
    /// `uv` is the pixel position in [0, 1) with the origin at the bottom left.
    pub fn tonemap(&self, color: Color, uv: Vec2) -> Color {
        let centered = uv - 0.5;
        let mut color = color * (1.0 - centered.dot(centered) * self.vignette);

        color *= self.exposure;
        color = color.max(Color::ZERO);
        color = color.mix(Color::ONE - (color * -2.0).exp(), self.tone_mix);
        color = color.pow_each(self.channel_curve);
        color.powf(self.gamma)
    }

    /// 1.0 inside the centered frame, 0.0 in the letterbox bars.
    pub fn frame_mask(&self, uv: Vec2, resolution: Vec2) -> f32 {
        let framed = (uv - 0.5) * resolution / Vec2::new(resolution.y, resolution.x);
        step(framed.y.abs(), 0.5 / self.frame_aspect)
            * step(framed.x.abs(), 0.5 * self.frame_aspect)
    }
}

/// RGBA float image, row 0 at the top.
#[derive(Debug, Clone)]
pub struct DisplayImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl DisplayImage {
    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Raw bytes of the float buffer, for uploading as a texture.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Convert to 8-bit RGBA, clamping each channel to [0, 1].
    pub fn to_rgba8(&self) -> image::RgbaImage {
        let bytes = self
            .pixels
            .iter()
            .flat_map(|px| px.map(|c| (255.0 * c.clamp(0.0, 1.0)).round() as u8))
            .collect();
        image::RgbaImage::from_raw(self.width, self.height, bytes)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    /// Save as an 8-bit image; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> image::ImageResult<()> {
        self.to_rgba8().save(path)
    }
}

/// Run the display pass over the whole accumulation buffer.
///
/// `frame` and `seed` pick the dither noise, so resolving the same buffer
/// twice in one frame gives identical images.
pub fn resolve(
    accumulation: &AccumulationBuffer,
    settings: &DisplaySettings,
    frame: u32,
    seed: u64,
) -> DisplayImage {
    let (width, height) = (accumulation.width(), accumulation.height());
    let resolution = Vec2::new(width as f32, height as f32);
    let mut pixels = vec![[0.0; 4]; (width as usize) * (height as usize)];

    pixels
        .par_chunks_mut(width.max(1) as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            for (x, pixel) in row.iter_mut().enumerate() {
                let x = x as u32;
                let uv = Vec2::new(x as f32, (height - 1 - y) as f32) / resolution;

                let mut color = settings.tonemap(accumulation.average(x, y), uv);
                let mut rng = pixel_rng(x, y, frame, seed ^ DITHER_STREAM);
                let noise = Vec3::new(rng.gen(), rng.gen(), rng.gen());
                color += (noise - 0.5) * settings.dither;
                color *= settings.frame_mask(uv, resolution);

                *pixel = color.extend(1.0).to_array();
            }
        });

    DisplayImage {
        width,
        height,
        pixels,
    }
}
