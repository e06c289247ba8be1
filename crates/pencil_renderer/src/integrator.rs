//! Path integrator: one random light path per call.
//!
//! Each step either continues the path with a new ray and throughput or
//! terminates it with a final radiance estimate.

use pencil_math::{Color, Ray};
use rand::RngCore;

use crate::config::RenderConfig;
use crate::march::{march, MarchOutcome};
use crate::material::Material;
use crate::scene::DistanceField;

/// Offset along the normal when spawning the next ray from a hit.
const SURFACE_OFFSET: f32 = 0.01;

/// Result of advancing a path by one bounce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounce {
    Continue { ray: Ray, throughput: Color },
    Terminate(Color),
}

/// Per-path state that survives across bounces.
#[derive(Debug, Clone, Copy)]
pub struct PathState {
    /// Apply wood grain displacement when evaluating the scene
    pub grain: bool,
    /// Surface interactions so far; 0 while tracing the primary ray
    pub bounce: u32,
}

impl Default for PathState {
    fn default() -> Self {
        Self {
            grain: true,
            bounce: 0,
        }
    }
}

/// Advance the path by tracing `ray` once.
///
/// `near_clip` only applies to the primary ray. A hit bumps `state.bounce`.
pub fn step_path(
    field: &dyn DistanceField,
    ray: &Ray,
    throughput: Color,
    near_clip: f32,
    state: &mut PathState,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Bounce {
    let primary = state.bounce == 0;
    let clip = if primary { near_clip } else { 0.0 };

    match march(field, ray, clip, state.grain, &config.march) {
        MarchOutcome::Hit {
            point,
            normal,
            material,
            ..
        } => {
            let scatter = material.scatter(ray.direction, point, normal, &config.palette, rng);
            if material == Material::Ground && primary {
                state.grain = false;
            }
            state.bounce += 1;

            Bounce::Continue {
                ray: Ray::new(point + normal * SURFACE_OFFSET, scatter.direction),
                throughput: throughput * scatter.attenuation,
            }
        }
        MarchOutcome::Miss { .. } | MarchOutcome::Stalled { .. } => {
            Bounce::Terminate(config.environment.radiance(ray.direction) * throughput)
        }
    }
}

/// Estimate the radiance arriving along `ray`.
///
/// A path still alive after `max_bounces` is closed with the environment
/// seen along its last direction.
pub fn trace_path(
    field: &dyn DistanceField,
    ray: Ray,
    near_clip: f32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let mut state = PathState::default();
    let mut ray = ray;
    let mut throughput = Color::ONE;

    for _ in 0..config.max_bounces {
        match step_path(field, &ray, throughput, near_clip, &mut state, config, rng) {
            Bounce::Continue {
                ray: next,
                throughput: next_throughput,
            } => {
                ray = next;
                throughput = next_throughput;
            }
            Bounce::Terminate(radiance) => return radiance,
        }
    }

    config.environment.radiance(ray.direction) * throughput
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::scene::{CreativeBlock, GroundPlane, SphereField};
    use crate::sampling::pixel_rng;
    use pencil_core::NoiseTexture;
    use pencil_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_miss_returns_environment() {
        let config = RenderConfig::default();
        let field = GroundPlane { height: 0.0 };
        let mut rng = StdRng::seed_from_u64(1);
        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::Y);

        let radiance = trace_path(&field, ray, 0.0, &config, &mut rng);
        assert_eq!(radiance, config.environment.radiance(Vec3::Y));
    }

    #[test]
    fn test_ground_first_bounce_clears_grain() {
        let config = RenderConfig::default();
        let field = GroundPlane { height: 0.0 };
        let mut rng = StdRng::seed_from_u64(2);
        let mut state = PathState::default();
        let ray = Ray::new(Vec3::new(0.5, 5.0, 0.5), -Vec3::Y);

        let step = step_path(&field, &ray, Color::ONE, 0.0, &mut state, &config, &mut rng);
        assert!(matches!(step, Bounce::Continue { .. }));
        assert!(!state.grain);
        assert_eq!(state.bounce, 1);
    }

    #[test]
    fn test_later_ground_bounce_keeps_grain() {
        let config = RenderConfig::default();
        let field = GroundPlane { height: 0.0 };
        let mut rng = StdRng::seed_from_u64(3);
        let mut state = PathState {
            bounce: 1,
            ..PathState::default()
        };
        let ray = Ray::new(Vec3::new(0.5, 5.0, 0.5), -Vec3::Y);

        step_path(&field, &ray, Color::ONE, 0.0, &mut state, &config, &mut rng);
        assert!(state.grain);
        assert_eq!(state.bounce, 2);
    }

    #[test]
    fn test_continue_offsets_origin_and_scales_throughput() {
        let config = RenderConfig::default();
        let field = SphereField {
            center: Vec3::ZERO,
            radius: 1.0,
            material: Material::WoodCore,
        };
        let mut rng = StdRng::seed_from_u64(4);
        let mut state = PathState::default();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);

        match step_path(&field, &ray, Color::ONE, 0.0, &mut state, &config, &mut rng) {
            Bounce::Continue { ray, throughput } => {
                assert!((ray.origin - Vec3::new(0.0, 0.0, -1.0 - SURFACE_OFFSET)).length() < 2e-3);
                assert!(ray.direction.z <= 1e-5);
                let wood = config.palette.wood;
                assert!((throughput - wood * wood * wood).length() < 1e-6);
            }
            other => panic!("expected a bounce, got {:?}", other),
        }
    }

    #[test]
    fn test_bounce_cap_closes_with_environment() {
        // A closed box of ground: every bounce hits, no path escapes
        struct Shell;
        impl DistanceField for Shell {
            fn evaluate(&self, p: Vec3, _grain: bool) -> crate::scene::SceneSample {
                crate::scene::SceneSample {
                    distance: 10.0 - p.length(),
                    material: Material::WoodCore,
                }
            }
        }

        let config = RenderConfig {
            max_bounces: 3,
            environment: Environment::Uniform(Color::ONE),
            ..RenderConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(5);
        let radiance = trace_path(&Shell, Ray::new(Vec3::ZERO, Vec3::X), 0.0, &config, &mut rng);

        let wood = config.palette.wood * config.palette.wood * config.palette.wood;
        let expected = wood * wood * wood;
        assert!((radiance - expected).length() < 1e-5, "{:?} vs {:?}", radiance, expected);
    }

    #[test]
    fn test_throughput_non_negative_and_bounded() {
        let config = RenderConfig::default();
        let field = CreativeBlock::new(NoiseTexture::synthetic(64, 64, 3));
        let bound = config.environment.max_radiance();
        let mut dir_rng = StdRng::seed_from_u64(6);

        for i in 0..300 {
            // Rays fired at the pencil from all around
            let target = Vec3::new(
                dir_rng.gen_range(-20.0..20.0),
                dir_rng.gen_range(0.0..8.0),
                dir_rng.gen_range(-20.0..20.0),
            );
            let origin = Vec3::new(
                dir_rng.gen_range(-60.0..60.0),
                dir_rng.gen_range(5.0..40.0),
                dir_rng.gen_range(-60.0..60.0),
            );
            let mut rng = pixel_rng(i, 0, 0, 0);
            let ray = Ray::new(origin, target - origin);
            let radiance = trace_path(&field, ray, 0.0, &config, &mut rng);

            assert!(radiance.is_finite(), "non-finite radiance {:?}", radiance);
            assert!(radiance.min_element() >= 0.0, "negative radiance {:?}", radiance);
            assert!(
                radiance.cmple(bound + Vec3::splat(1e-4)).all(),
                "radiance {:?} above environment bound {:?}",
                radiance,
                bound
            );
        }
    }
}
