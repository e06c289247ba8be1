//! Surface materials and their scattering rules.

use pencil_math::{mix, Color, Vec2, Vec2Ext, Vec3, Vec3Ext};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::sampling::{gen_f32, sample_cone, sample_cosine_power};

/// Material of the closest surface, as reported by the scene evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Material {
    /// Ground plane with a painted grid
    Ground,
    /// Red lacquer around the pencil body
    PlasticShell,
    /// Exposed wood of the sharpened cone
    WoodCore,
    /// Graphite lead
    LeadCore,
}

/// Tunable albedos and lobe shapes for each material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Ground color inside the grid cells
    pub ground: Color,
    /// Ground color on the grid lines
    pub ground_lines: Color,
    /// Wood albedo before the cubing that darkens it
    pub wood: Color,
    /// Diffuse albedo under the lacquer
    pub plastic: Color,
    /// Reflectance of the lacquer at normal incidence
    pub plastic_f0: f32,
    /// Scalar albedo of the graphite
    pub lead: f32,
    /// Cone extent (in cosine) of the graphite glossy lobe
    pub lead_gloss: f32,
    /// Exponent of the diffuse lobes
    pub diffuse_power: f32,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            ground: Color::splat(0.8),
            ground_lines: Color::new(0.25, 0.3, 0.35),
            wood: Color::new(211.0, 183.0, 155.0) / 255.0,
            plastic: Color::new(180.0, 2.0, 1.0) / 255.0,
            plastic_f0: 0.04,
            lead: 0.05,
            lead_gloss: 0.3,
            diffuse_power: 1.0,
        }
    }
}

/// Outcome of a bounce: the new direction and the throughput multiplier.
#[derive(Debug, Clone, Copy)]
pub struct Scatter {
    pub direction: Vec3,
    pub attenuation: Color,
}

/// Grid line spacings and half-thicknesses painted on the ground.
const FLOOR_GRIDS: [(f32, f32); 3] = [(10.0, 0.10), (5.0, 0.05), (1.0, 0.03)];

/// Signed distance to the nearest grid line in the ground plane.
///
/// Negative on a line, positive inside a cell.
pub fn floor_pattern(uv: Vec2) -> f32 {
    FLOOR_GRIDS
        .iter()
        .map(|&(unit, thickness)| {
            let cell = (uv.glsl_mod(unit) - Vec2::splat(unit * 0.5)).abs();
            -cell.x.max(cell.y) + unit * 0.5 - thickness
        })
        .fold(f32::INFINITY, f32::min)
}

/// Schlick's approximation with the cosine clamped away from 1.
///
/// `cos_theta` is the cosine between the reversed view ray and the normal.
pub fn fresnel(cos_theta: f32, f0: f32) -> f32 {
    mix(f0, 1.0, (1.0 - cos_theta.min(0.99)).powi(5))
}

impl Material {
    /// Scatter a ray arriving along `incoming` at `point` with `normal`.
    pub fn scatter(
        &self,
        incoming: Vec3,
        point: Vec3,
        normal: Vec3,
        palette: &Palette,
        rng: &mut dyn RngCore,
    ) -> Scatter {
        match self {
            Material::Ground => {
                let on_cell = floor_pattern(Vec2::new(point.x, point.z)) >= 0.0;
                Scatter {
                    direction: sample_cosine_power(normal, palette.diffuse_power, rng),
                    attenuation: if on_cell { palette.ground } else { palette.ground_lines },
                }
            }
            Material::WoodCore => Scatter {
                direction: sample_cosine_power(normal, palette.diffuse_power, rng),
                attenuation: palette.wood * palette.wood * palette.wood,
            },
            Material::PlasticShell => {
                let f = fresnel((-incoming).dot(normal), palette.plastic_f0);
                if gen_f32(rng) < f {
                    Scatter {
                        direction: incoming.reflect(normal),
                        attenuation: Color::ONE,
                    }
                } else {
                    Scatter {
                        direction: sample_cosine_power(normal, palette.diffuse_power, rng),
                        attenuation: palette.plastic,
                    }
                }
            }
            Material::LeadCore => Scatter {
                direction: sample_cone(incoming.reflect(normal), palette.lead_gloss, rng),
                attenuation: Color::splat(palette.lead),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_floor_pattern_lines_and_cells() {
        // Origin lies on all three grids
        assert!(floor_pattern(Vec2::ZERO) < 0.0);
        // Centre of a unit cell
        assert!(floor_pattern(Vec2::new(0.5, 0.5)) > 0.0);
        // Thin unit line, just outside its half-thickness
        assert!(floor_pattern(Vec2::new(3.0 + 0.031, 0.5)) > 0.0);
        assert!(floor_pattern(Vec2::new(3.0 + 0.029, 0.5)) < 0.0);
        // Major line is thicker than the unit line
        assert!(floor_pattern(Vec2::new(10.0 + 0.09, 0.5)) < 0.0);
        assert!(floor_pattern(Vec2::new(10.0 + 0.11, 0.5)) > 0.0);
        // Mid line at 5 units
        assert!(floor_pattern(Vec2::new(0.5, -5.0 + 0.04)) < 0.0);
        assert!(floor_pattern(Vec2::new(0.5, -5.0 + 0.06)) > 0.0);
    }

    #[test]
    fn test_fresnel_range() {
        assert!((fresnel(1.0, 0.04) - (0.04 + 0.96 * 0.01f32.powi(5))).abs() < 1e-6);
        assert!((fresnel(0.0, 0.04) - 1.0).abs() < 1e-6);
        assert!(fresnel(0.5, 0.04) > 0.04);
    }

    #[test]
    fn test_ground_albedo() {
        let palette = Palette::default();
        let mut rng = StdRng::seed_from_u64(5);

        let cell_point = Vec3::new(0.5, 0.0, 0.5);
        let cell = Material::Ground.scatter(-Vec3::Y, cell_point, Vec3::Y, &palette, &mut rng);
        assert_eq!(cell.attenuation, palette.ground);
        assert!(cell.direction.y >= 0.0);

        let line = Material::Ground.scatter(-Vec3::Y, Vec3::ZERO, Vec3::Y, &palette, &mut rng);
        assert_eq!(line.attenuation, palette.ground_lines);
    }

    #[test]
    fn test_plastic_head_on_is_mostly_diffuse() {
        let palette = Palette::default();
        let mut rng = StdRng::seed_from_u64(6);
        let mirror = (0..2000)
            .map(|_| {
                Material::PlasticShell.scatter(-Vec3::Y, Vec3::ZERO, Vec3::Y, &palette, &mut rng)
            })
            .filter(|s| s.attenuation == Color::ONE)
            .count();

        // Expected ~4% of bounces reflect at normal incidence
        assert!(mirror > 20 && mirror < 200, "mirror count {}", mirror);
    }

    #[test]
    fn test_lead_reflects_into_cone() {
        let palette = Palette::default();
        let mut rng = StdRng::seed_from_u64(7);
        let incoming = Vec3::new(1.0, -1.0, 0.0).normalize();
        let mirror = incoming.reflect(Vec3::Y);

        for _ in 0..1000 {
            let s = Material::LeadCore.scatter(incoming, Vec3::ZERO, Vec3::Y, &palette, &mut rng);
            assert!(s.direction.dot(mirror) >= 1.0 - palette.lead_gloss - 1e-5);
            assert_eq!(s.attenuation, Color::splat(0.05));
        }
    }

    #[test]
    fn test_albedos_below_one() {
        let p = Palette::default();
        let wood = p.wood * p.wood * p.wood;
        for albedo in [p.ground, p.ground_lines, wood, p.plastic, Color::splat(p.lead)] {
            assert!(albedo.max_element() < 1.0);
            assert!(albedo.min_element() >= 0.0);
        }
    }
}
