//! Noise texture storage and bilinear sampling.
//!
//! The renderer only ever reads the red channel, but textures keep all four
//! channels so an RGBA image from disk can be used unchanged.

use std::path::Path;

use pencil_math::{Vec2, Vec4};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use thiserror::Error;

/// Width and height of the synthetic noise field.
pub const DEFAULT_NOISE_SIZE: u32 = 64;

/// Errors that can occur while building or loading a noise texture.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture must be at least 1x1, got {width}x{height}")]
    Empty { width: u32, height: u32 },

    #[error("Texture is {width}x{height} but {len} texels were supplied")]
    SizeMismatch { width: u32, height: u32, len: usize },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Number of texels in a `width` x `height` texture, computed without `u32` overflow.
fn texel_count(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize)
}

/// A tiling 2D field of RGBA values in [0, 1].
#[derive(Clone, Debug)]
pub struct NoiseTexture {
    /// Texture width in texels
    width: u32,

    /// Texture height in texels
    height: u32,

    /// Texel data, row-major, `[R, G, B, A]`
    texels: Vec<[f32; 4]>,
}

impl NoiseTexture {
    /// Create a texture from RGBA float texels (row-major).
    pub fn from_rgba(width: u32, height: u32, texels: Vec<[f32; 4]>) -> TextureResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty { width, height });
        }
        if texels.len() != texel_count(width, height) {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                len: texels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Synthesize uniform white noise, one random value per texel broadcast
    /// to all four channels.
    ///
    /// Zero dimensions are bumped to 1 so the result is always sampleable.
    pub fn synthetic(width: u32, height: u32, seed: u64) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

        let texels = (0..texel_count(width, height))
            .map(|_| {
                let v: f32 = rng.gen();
                [v; 4]
            })
            .collect();

        Self {
            width,
            height,
            texels,
        }
    }

    /// Load a noise texture from an image file.
    ///
    /// Values are taken as stored (`byte / 255`), no sRGB decoding: the data
    /// is noise, not color.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let texels = rgba
            .pixels()
            .map(|p| {
                [
                    p[0] as f32 / 255.0,
                    p[1] as f32 / 255.0,
                    p[2] as f32 / 255.0,
                    p[3] as f32 / 255.0,
                ]
            })
            .collect();

        log::debug!("Loaded noise texture {} ({}x{})", path.display(), width, height);
        Self::from_rgba(width, height, texels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample with bilinear filtering and wrap-around addressing.
    ///
    /// `uv` is in texture-repeat units: one unit spans the whole texture.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let size = Vec2::new(self.width as f32, self.height as f32);
        let p = uv * size;
        let p = p - size * (p / size).floor();

        let ip = p.floor();
        let fp = p - ip;

        let x0 = (ip.x as u32).min(self.width - 1);
        let y0 = (ip.y as u32).min(self.height - 1);
        let x1 = (x0 + 1) % self.width;
        let y1 = (y0 + 1) % self.height;

        let a = self.texel(x0, y0);
        let b = self.texel(x1, y0);
        let c = self.texel(x0, y1);
        let d = self.texel(x1, y1);

        a.lerp(b, fp.x).lerp(c.lerp(d, fp.x), fp.y)
    }

    /// Get texel at integer coordinates.
    fn texel(&self, x: u32, y: u32) -> Vec4 {
        let idx = y as usize * self.width as usize + x as usize;
        self.texels
            .get(idx)
            .copied()
            .map(Vec4::from_array)
            .unwrap_or(Vec4::ZERO)
    }
}

impl Default for NoiseTexture {
    fn default() -> Self {
        Self::synthetic(DEFAULT_NOISE_SIZE, DEFAULT_NOISE_SIZE, 0)
    }
}
