// Shader-style helpers
//
// glam covers dot/cross/length/normalize and component-wise min/max/clamp.
// The few GLSL built-ins it lacks live here: floored `mod`, `mix`, `step`,
// `reflect`, per-channel `pow` and 2D rotation construction.

use glam::{Mat2, Vec2, Vec3};

/// Rotation matrix for a counter-clockwise rotation by `angle` radians.
#[inline]
pub fn rot2(angle: f32) -> Mat2 {
    Mat2::from_angle(angle)
}

/// Linear blend `a + (b - a) * t`.
#[inline]
pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// GLSL `step`: 0.0 when `x < edge`, otherwise 1.0.
#[inline]
pub fn step(edge: f32, x: f32) -> f32 {
    if x < edge {
        0.0
    } else {
        1.0
    }
}

/// Extension trait for Vec2 with shader-style helpers.
pub trait Vec2Ext {
    /// Floored modulo, `x - y * floor(x / y)`, applied per component.
    ///
    /// Unlike `%` the result always has the sign of `y`.
    fn glsl_mod(self, y: f32) -> Vec2;
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn glsl_mod(self, y: f32) -> Vec2 {
        self - y * (self / y).floor()
    }
}

/// Extension trait for Vec3 with shading helpers.
pub trait Vec3Ext {
    /// Reflect an incident vector about a (unit) normal.
    fn reflect(self, normal: Vec3) -> Vec3;

    /// Normalize, falling back to `fallback` for zero-length or non-finite input.
    fn normalize_or_fallback(self, fallback: Vec3) -> Vec3;

    /// Mix two colors component-wise.
    fn mix(self, other: Vec3, t: f32) -> Vec3;

    /// Raise each component to its own exponent.
    fn pow_each(self, exponents: Vec3) -> Vec3;
}

impl Vec3Ext for Vec3 {
    #[inline]
    fn reflect(self, normal: Vec3) -> Vec3 {
        self - 2.0 * self.dot(normal) * normal
    }

    #[inline]
    fn normalize_or_fallback(self, fallback: Vec3) -> Vec3 {
        self.try_normalize().unwrap_or(fallback)
    }

    #[inline]
    fn mix(self, other: Vec3, t: f32) -> Vec3 {
        self + (other - self) * t
    }

    #[inline]
    fn pow_each(self, exponents: Vec3) -> Vec3 {
        Vec3::new(
            self.x.powf(exponents.x),
            self.y.powf(exponents.y),
            self.z.powf(exponents.z),
        )
    }
}
