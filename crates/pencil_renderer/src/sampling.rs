//! Direction sampling and per-pixel random streams.
//!
//! Both lobe samplers draw the azimuth first and the polar term second.
//! Keeping that order keeps renders reproducible for a given seed.

use std::collections::hash_map::DefaultHasher;
use std::f32::consts::TAU;
use std::hash::{Hash, Hasher};

use pencil_math::{Vec3, Vec3Ext};
use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Random stream used for one pixel in one frame.
pub type PixelRng = Xoshiro256PlusPlus;

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Independent stream for pixel `(x, y)` in frame `frame`.
///
/// The tuple is hashed so neighbouring pixels and consecutive frames do not
/// get correlated seeds.
pub fn pixel_rng(x: u32, y: u32, frame: u32, seed: u64) -> PixelRng {
    let mut hasher = DefaultHasher::new();
    (x, y, frame, seed).hash(&mut hasher);
    PixelRng::seed_from_u64(hasher.finish())
}

/// Two unit vectors perpendicular to `dir` and to each other.
///
/// The first tangent is `(-1,-1,-1) x dir`, which vanishes for directions
/// along the main diagonal; those fall back to glam's orthonormal pair.
pub fn orthonormal_basis(dir: Vec3) -> (Vec3, Vec3) {
    match Vec3::splat(-1.0).cross(dir).try_normalize() {
        Some(o1) => {
            let o2 = dir.cross(o1).normalize_or_fallback(dir.any_orthonormal_vector());
            (o1, o2)
        }
        None => dir.any_orthonormal_pair(),
    }
}

/// Direction in the hemisphere around `dir` with density proportional to
/// `cos(theta)^power`.
///
/// `power = 1` gives the Lambertian (cosine-weighted) lobe; larger powers
/// tighten the lobe towards `dir`.
pub fn sample_cosine_power(dir: Vec3, power: f32, rng: &mut dyn RngCore) -> Vec3 {
    let dir = dir.normalize_or_fallback(Vec3::Y);
    let (o1, o2) = orthonormal_basis(dir);

    let phi = gen_f32(rng) * TAU;
    let cos_theta = gen_f32(rng).powf(1.0 / (power + 1.0));
    lobe_direction(dir, o1, o2, phi, cos_theta)
}

/// Direction uniformly distributed over the spherical cap around `axis`
/// whose cosine to the axis lies in `[1 - extent, 1]`.
pub fn sample_cone(axis: Vec3, extent: f32, rng: &mut dyn RngCore) -> Vec3 {
    let axis = axis.normalize_or_fallback(Vec3::Y);
    let (o1, o2) = orthonormal_basis(axis);

    let phi = gen_f32(rng) * TAU;
    let cos_theta = 1.0 - gen_f32(rng) * extent;
    lobe_direction(axis, o1, o2, phi, cos_theta)
}

#[inline]
fn lobe_direction(dir: Vec3, o1: Vec3, o2: Vec3, phi: f32, cos_theta: f32) -> Vec3 {
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    phi.cos() * sin_theta * o1 + phi.sin() * sin_theta * o2 + cos_theta * dir
}
