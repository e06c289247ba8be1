//! Distance-function primitives and CSG combinators.
//!
//! All primitives are centred at the origin; callers move the query point
//! into the primitive's frame. Exact primitives return the Euclidean
//! distance; the combinators keep the result a lower bound.

use pencil_math::{rot2, Vec2, Vec3};
use std::f32::consts::FRAC_PI_3;

/// Rounded 2D box with half extents `b` and corner radius `r`.
///
/// Exact. The rounding is carved from inside `b`, so the outline still
/// touches `±b` along each axis.
#[inline]
pub fn sd_round_box(p: Vec2, b: Vec2, r: f32) -> f32 {
    let q = p.abs() - (b - Vec2::splat(r));
    q.max(Vec2::ZERO).length() + q.x.max(q.y).min(0.0) - r
}

/// Capped cylinder around the Y axis with bevelled rims.
#[inline]
pub fn sd_rounded_cylinder(p: Vec3, radius: f32, half_height: f32, bevel: f32) -> f32 {
    let p2 = Vec2::new(Vec2::new(p.x, p.z).length(), p.y);
    sd_round_box(p2, Vec2::new(radius, half_height), bevel)
}

/// Rounded hexagon in the XY plane, built as the union of three boxes
/// rotated by 60 degrees.
///
/// `apothem` is the centre-to-flat-side distance, `rounding` the corner
/// radius. The flats sit at exactly `apothem`.
pub fn sd_hexagon(p: Vec2, apothem: f32, rounding: f32) -> f32 {
    let half_width = (apothem - rounding) / FRAC_PI_3.tan() + rounding;
    let extent = Vec2::new(half_width, apothem);
    let rot = rot2(-FRAC_PI_3);

    let hex1 = sd_round_box(p, extent, rounding);
    let p = rot * p;
    let hex2 = sd_round_box(p, extent, rounding);
    let p = rot * p;
    let hex3 = sd_round_box(p, extent, rounding);

    hex1.min(hex2.min(hex3))
}

/// Infinite cone with its apex at the origin opening towards -Y.
///
/// `c` is `(sin, cos)` of the half angle.
pub fn sd_cone(p: Vec3, c: Vec2) -> f32 {
    let q = Vec2::new(Vec2::new(p.x, p.z).length(), -p.y);
    let d = (q - c * q.dot(c).max(0.0)).length();
    if q.x * c.y - q.y * c.x < 0.0 {
        -d
    } else {
        d
    }
}

#[inline]
pub fn sd_sphere(p: Vec3, radius: f32) -> f32 {
    p.length() - radius
}

/// Infinite cylinder along the Z axis.
#[inline]
pub fn sd_infinite_cylinder(p: Vec3, radius: f32) -> f32 {
    Vec2::new(p.x, p.y).length() - radius
}

/// CSG union.
#[inline]
pub fn op_union(a: f32, b: f32) -> f32 {
    a.min(b)
}

/// CSG intersection.
#[inline]
pub fn op_intersect(a: f32, b: f32) -> f32 {
    a.max(b)
}

/// CSG subtraction: `a` with `b` carved out.
#[inline]
pub fn op_subtract(a: f32, b: f32) -> f32 {
    a.max(-b)
}
