//! Scene distance fields.
//!
//! A scene answers one question per point: how far is the nearest surface,
//! and what is it made of. Both are returned together so the caller never
//! has to read back per-pixel state.

use pencil_core::NoiseTexture;
use pencil_math::{rot2, Vec2, Vec3};

use crate::material::Material;
use crate::sdf::{
    op_intersect, op_subtract, op_union, sd_cone, sd_hexagon, sd_infinite_cylinder, sd_sphere,
};

/// Distance to the closest surface and its material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSample {
    pub distance: f32,
    pub material: Material,
}

/// Trait for implicit scenes that can be sphere traced.
pub trait DistanceField: Send + Sync {
    /// Evaluate the field at `p`.
    ///
    /// The distance must never overestimate the distance to the true
    /// surface. `grain` enables fine surface displacement; the integrator
    /// clears it for the rest of a path once the path has left the pencil.
    fn evaluate(&self, p: Vec3, grain: bool) -> SceneSample;
}

/// Running arg-min over candidate surfaces.
///
/// A candidate only replaces the current best when strictly closer, so
/// among equal distances the one considered first wins. Feed candidates in
/// priority order.
#[derive(Debug, Clone, Copy)]
pub struct ClosestSurface {
    best: SceneSample,
}

impl ClosestSurface {
    pub fn new(distance: f32, material: Material) -> Self {
        Self {
            best: SceneSample { distance, material },
        }
    }

    #[inline]
    pub fn consider(mut self, distance: f32, material: Material) -> Self {
        if distance < self.best.distance {
            self.best = SceneSample { distance, material };
        }
        self
    }

    pub fn finish(self) -> SceneSample {
        self.best
    }
}

// Pencil proportions
const PENCIL_HEIGHT: f32 = 4.0;
const PENCIL_TURN: f32 = 2.1;
const PENCIL_SHIFT: f32 = 10.0;
const CONE_HALF_ANGLE: f32 = 0.23;
const SHELL_APOTHEM: f32 = 4.0;
const SHELL_ROUNDING: f32 = 1.0;
const WOOD_APOTHEM: f32 = 3.95;
const WOOD_ROUNDING: f32 = 0.95;
const LEAD_RADIUS: f32 = 1.1;
const LEAD_GAP: f32 = 0.01;

// Surface displacement
const WOOD_GRAIN_SCALE: f32 = 0.25;
const WOOD_GRAIN_BIAS: f32 = 0.4;
const WOOD_GRAIN_DEPTH: f32 = 0.1;
const LEAD_RIDGE_BIAS: f32 = 0.3;
const LEAD_RIDGE_DEPTH: f32 = 0.05;

/// Distances to each part of the creative block scene at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockDistances {
    pub ground: f32,
    pub lead: f32,
    pub wood: f32,
    pub paint_shell: f32,
}

impl BlockDistances {
    /// Minimum over all parts. Ties go to ground, then lead, wood and
    /// finally the paint shell.
    pub fn closest(&self) -> SceneSample {
        ClosestSurface::new(self.ground, Material::Ground)
            .consider(self.lead, Material::LeadCore)
            .consider(self.wood, Material::WoodCore)
            .consider(self.paint_shell, Material::PlasticShell)
            .finish()
    }
}

/// A sharpened hexagonal pencil lying on a gently curved ground.
#[derive(Debug, Clone)]
pub struct CreativeBlock {
    noise: NoiseTexture,
}

impl CreativeBlock {
    pub fn new(noise: NoiseTexture) -> Self {
        Self { noise }
    }

    /// Height of the ground surface below `(x, z)`.
    ///
    /// The ground bends down away from the camera and levels off past z = 100.
    pub fn ground_height(z: f32) -> f32 {
        ((z.min(100.0) * 0.03).cos() - 1.0) * 2.0
    }

    /// Move a world point into the pencil frame (pencil axis along Z, tip
    /// near the origin pointing +Z).
    pub fn to_local(p: Vec3) -> Vec3 {
        let xz = rot2(PENCIL_TURN) * Vec2::new(p.x, p.z);
        Vec3::new(xz.x, p.y - PENCIL_HEIGHT, xz.y - PENCIL_SHIFT)
    }

    /// Distances to every part of the scene.
    pub fn distances(&self, p: Vec3, grain: bool) -> BlockDistances {
        let ground = p.y - Self::ground_height(p.z);

        let q = Self::to_local(p);
        let (sin_a, cos_a) = CONE_HALF_ANGLE.sin_cos();
        let cone = sd_cone(Vec3::new(q.x, q.z, q.y), Vec2::new(sin_a, cos_a));
        let section = Vec2::new(q.x, q.y);

        let shell = sd_hexagon(section, SHELL_APOTHEM, SHELL_ROUNDING);
        let wood_body = sd_hexagon(section, WOOD_APOTHEM, WOOD_ROUNDING);
        let lead_body = sd_infinite_cylinder(q, LEAD_RADIUS);

        let paint_shell = op_intersect(shell, op_subtract(cone, wood_body));

        let mut wood = op_intersect(wood_body, cone);
        wood = op_subtract(wood, lead_body - LEAD_GAP);
        if grain {
            let grain_sample = self.noise.sample(section * WOOD_GRAIN_SCALE).x;
            wood += (grain_sample - WOOD_GRAIN_BIAS) * WOOD_GRAIN_DEPTH;
        }

        let mut lead = op_intersect(lead_body, cone);
        lead = op_intersect(lead, q.z + 1.0);
        lead = op_union(lead, sd_sphere(q + Vec3::new(0.0, 0.0, 1.05), sin_a));
        let ridge = self.noise.sample(Vec2::splat(q.x.atan2(q.z) * 0.5)).x;
        lead += (ridge - LEAD_RIDGE_BIAS) * LEAD_RIDGE_DEPTH;

        BlockDistances {
            ground,
            lead,
            wood,
            paint_shell,
        }
    }
}

impl Default for CreativeBlock {
    fn default() -> Self {
        Self::new(NoiseTexture::default())
    }
}

impl DistanceField for CreativeBlock {
    fn evaluate(&self, p: Vec3, grain: bool) -> SceneSample {
        self.distances(p, grain).closest()
    }
}

/// Flat ground at a fixed height.
#[derive(Debug, Clone, Copy)]
pub struct GroundPlane {
    pub height: f32,
}

impl DistanceField for GroundPlane {
    fn evaluate(&self, p: Vec3, _grain: bool) -> SceneSample {
        SceneSample {
            distance: p.y - self.height,
            material: Material::Ground,
        }
    }
}

/// A single sphere.
#[derive(Debug, Clone, Copy)]
pub struct SphereField {
    pub center: Vec3,
    pub radius: f32,
    pub material: Material,
}

impl DistanceField for SphereField {
    fn evaluate(&self, p: Vec3, _grain: bool) -> SceneSample {
        SceneSample {
            distance: sd_sphere(p - self.center, self.radius),
            material: self.material,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Inverse of `CreativeBlock::to_local`.
    fn to_world(q: Vec3) -> Vec3 {
        let xz = rot2(-PENCIL_TURN) * Vec2::new(q.x, q.z + PENCIL_SHIFT);
        Vec3::new(xz.x, q.y + PENCIL_HEIGHT, xz.y)
    }

    fn scene() -> CreativeBlock {
        CreativeBlock::new(NoiseTexture::synthetic(64, 64, 11))
    }

    #[test]
    fn test_local_frame_round_trip() {
        let p = Vec3::new(12.0, -3.0, 40.0);
        assert!((to_world(CreativeBlock::to_local(p)) - p).length() < 1e-4);
    }

    #[test]
    fn test_tie_break_priority() {
        let tied = BlockDistances {
            ground: 1.0,
            lead: 1.0,
            wood: 1.0,
            paint_shell: 1.0,
        };
        assert_eq!(tied.closest().material, Material::Ground);

        let tied = BlockDistances { ground: 2.0, ..tied };
        assert_eq!(tied.closest().material, Material::LeadCore);

        let tied = BlockDistances { lead: 2.0, ..tied };
        assert_eq!(tied.closest().material, Material::WoodCore);

        let tied = BlockDistances { wood: 2.0, ..tied };
        assert_eq!(tied.closest().material, Material::PlasticShell);

        // Strictly closer later candidates still win
        let d = BlockDistances {
            ground: 0.5,
            lead: 0.5,
            wood: 0.25,
            paint_shell: 0.25,
        };
        let best = d.closest();
        assert_eq!(best.material, Material::WoodCore);
        assert_eq!(best.distance, 0.25);
    }

    #[test]
    fn test_tie_break_is_repeatable() {
        let d = BlockDistances {
            ground: 3.0,
            lead: 0.75,
            wood: 0.75,
            paint_shell: 0.75,
        };
        let first = d.closest();
        for _ in 0..100 {
            assert_eq!(d.closest(), first);
        }
    }

    #[test]
    fn test_material_classification() {
        let scene = scene();

        // Deep inside the lead, far behind the tip
        let lead = scene.evaluate(to_world(Vec3::new(0.0, 0.0, -30.0)), false);
        assert_eq!(lead.material, Material::LeadCore);
        assert!(lead.distance < 0.0);

        // Between lead and shell in the sharpened cone
        let wood = scene.evaluate(to_world(Vec3::new(0.0, 2.0, -12.0)), false);
        assert_eq!(wood.material, Material::WoodCore);

        // Inside the thin lacquer layer on a flat side
        let shell = scene.evaluate(to_world(Vec3::new(0.0, 3.975, -30.0)), false);
        assert_eq!(shell.material, Material::PlasticShell);
        assert!(shell.distance < 0.0);

        // Just above the ground, far from the pencil
        let z = 100.0;
        let above = Vec3::new(100.0, CreativeBlock::ground_height(z) + 0.08, z);
        let ground = scene.evaluate(above, true);
        assert_eq!(ground.material, Material::Ground);
        assert!((ground.distance - 0.08).abs() < 1e-4);
    }

    #[test]
    fn test_pencil_lower_bound_outside_bounding_cylinder() {
        let scene = scene();
        let mut rng = StdRng::seed_from_u64(9);
        // Circumradius of the rounded shell hexagon
        let inner = SHELL_APOTHEM - SHELL_ROUNDING;
        let half_width = inner / std::f32::consts::FRAC_PI_3.tan() + SHELL_ROUNDING;
        let radius = Vec2::new(half_width - SHELL_ROUNDING, inner).length() + SHELL_ROUNDING;
        // Largest inward displacement any noise value can apply
        let max_displacement = WOOD_GRAIN_BIAS * WOOD_GRAIN_DEPTH;

        for _ in 0..5000 {
            let q = Vec3::new(
                rng.gen_range(-30.0..30.0),
                rng.gen_range(-30.0..30.0),
                rng.gen_range(-60.0..20.0),
            );
            let radial = Vec2::new(q.x, q.y).length();
            if radial <= radius {
                continue;
            }

            let d = scene.distances(to_world(q), true);
            let bound = radial - radius - max_displacement - 1e-3;
            assert!(d.paint_shell >= bound, "shell {} < {} at {:?}", d.paint_shell, bound, q);
            assert!(d.wood >= bound, "wood {} < {} at {:?}", d.wood, bound, q);
            assert!(d.lead >= bound, "lead {} < {} at {:?}", d.lead, bound, q);
        }
    }

    #[test]
    fn test_grain_only_displaces_wood() {
        let scene = scene();
        let mut rng = StdRng::seed_from_u64(12);
        let mut displaced = 0;

        for _ in 0..200 {
            let q = Vec3::new(
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-3.0..3.0),
                rng.gen_range(-30.0..-11.0),
            );
            let p = to_world(q);
            let with = scene.distances(p, true);
            let without = scene.distances(p, false);

            assert_eq!(with.lead.to_bits(), without.lead.to_bits());
            assert_eq!(with.paint_shell.to_bits(), without.paint_shell.to_bits());
            assert_eq!(with.ground.to_bits(), without.ground.to_bits());

            let offset = with.wood - without.wood;
            let low = -WOOD_GRAIN_BIAS * WOOD_GRAIN_DEPTH;
            let high = (1.0 - WOOD_GRAIN_BIAS) * WOOD_GRAIN_DEPTH;
            assert!(offset >= low - 1e-5 && offset <= high + 1e-5, "offset {offset} at {q:?}");
            if offset != 0.0 {
                displaced += 1;
            }
        }
        assert!(displaced > 150, "grain moved only {displaced} of 200 wood samples");
    }

    #[test]
    fn test_evaluate_is_bit_identical() {
        let scene = scene();
        let mut rng = StdRng::seed_from_u64(10);

        for _ in 0..100 {
            let p = Vec3::new(
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-5.0..20.0),
                rng.gen_range(-50.0..50.0),
            );
            let a = scene.evaluate(p, true);
            let b = scene.evaluate(p, true);
            assert_eq!(a.distance.to_bits(), b.distance.to_bits());
            assert_eq!(a.material, b.material);
        }
    }

    #[test]
    fn test_simple_fields() {
        let plane = GroundPlane { height: 1.0 };
        assert_eq!(plane.evaluate(Vec3::new(5.0, 3.0, -2.0), true).distance, 2.0);

        let sphere = SphereField {
            center: Vec3::new(0.0, 0.0, 5.0),
            radius: 1.0,
            material: Material::LeadCore,
        };
        let s = sphere.evaluate(Vec3::ZERO, true);
        assert_eq!(s.distance, 4.0);
        assert_eq!(s.material, Material::LeadCore);
    }
}
