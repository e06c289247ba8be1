//! Pencil Core - shared scene inputs for the SDF path tracer.
//!
//! This crate provides:
//!
//! - **Noise textures**: `NoiseTexture`, a small tiling field of pseudo-random
//!   values sampled bilinearly to perturb surfaces
//! - **Texture loading**: reading a noise field from an image on disk
//!
//! # Example
//!
//! ```ignore
//! use pencil_core::NoiseTexture;
//!
//! // Prefer a texture on disk, fall back to synthetic noise
//! let noise = NoiseTexture::load("noise_gray_64x64.png")
//!     .unwrap_or_else(|_| NoiseTexture::synthetic(64, 64, 7));
//! let r = noise.sample(pencil_math::Vec2::new(0.25, 0.5)).x;
//! ```

pub mod noise;

// Re-export commonly used types
pub use noise::{NoiseTexture, TextureError, TextureResult, DEFAULT_NOISE_SIZE};
