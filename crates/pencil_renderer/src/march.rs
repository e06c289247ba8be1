//! Sphere tracing through a distance field.

use pencil_math::{Ray, Vec3, Vec3Ext};
use serde::{Deserialize, Serialize};

use crate::material::Material;
use crate::scene::DistanceField;

/// Sphere tracing configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarchConfig {
    /// Maximum number of marching steps
    pub max_steps: u32,
    /// Distance threshold for surface hit
    pub epsilon: f32,
    /// Offset used for finite-difference normals
    pub normal_epsilon: f32,
    /// Unconverged rays whose last step is longer than this escaped the scene
    pub far_threshold: f32,
    /// Rays that travel further than this are misses
    pub max_distance: f32,
    /// Sign applied to every field sample; -1.0 marches from inside solids
    pub flip: f32,
}

impl Default for MarchConfig {
    fn default() -> Self {
        Self {
            max_steps: 100,
            epsilon: 1e-3,
            normal_epsilon: 1e-3,
            far_threshold: 0.1,
            max_distance: 1e5,
            flip: 1.0,
        }
    }
}

/// Result of marching one ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarchOutcome {
    /// Converged onto a surface.
    Hit {
        point: Vec3,
        normal: Vec3,
        material: Material,
        /// Distance travelled along the ray
        t: f32,
        /// Field evaluations spent marching (normals excluded)
        steps: u32,
    },
    /// Left the scene, diverged, or ran out of steps far from any surface.
    Miss { last_distance: f32 },
    /// Ran out of steps while still creeping along a surface.
    Stalled { last_distance: f32 },
}

impl MarchOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, MarchOutcome::Hit { .. })
    }
}

/// March `ray` through `field`, starting `near_clip` along the ray.
pub fn march(
    field: &dyn DistanceField,
    ray: &Ray,
    near_clip: f32,
    grain: bool,
    config: &MarchConfig,
) -> MarchOutcome {
    let mut t = near_clip;
    let mut k = f32::INFINITY;

    for step in 0..config.max_steps {
        let sample = field.evaluate(ray.at(t), grain);
        k = sample.distance * config.flip;

        if !k.is_finite() {
            return MarchOutcome::Miss { last_distance: k };
        }

        if k.abs() < config.epsilon {
            let point = ray.at(t);
            return MarchOutcome::Hit {
                point,
                normal: estimate_normal(field, point, sample.distance, grain, config),
                material: sample.material,
                t,
                steps: step + 1,
            };
        }

        t += k;
        if !t.is_finite() || t > config.max_distance {
            return MarchOutcome::Miss { last_distance: k };
        }
    }

    if k.abs() > config.far_threshold {
        MarchOutcome::Miss { last_distance: k }
    } else {
        MarchOutcome::Stalled { last_distance: k }
    }
}

/// Forward-difference gradient around a converged point, flipped to face
/// the side the ray marched through.
///
/// `distance` is the field value already sampled at `point`, so only three
/// extra evaluations are needed.
fn estimate_normal(
    field: &dyn DistanceField,
    point: Vec3,
    distance: f32,
    grain: bool,
    config: &MarchConfig,
) -> Vec3 {
    let e = config.normal_epsilon;
    let sample = |offset: Vec3| field.evaluate(point + offset, grain).distance - distance;

    let gradient = Vec3::new(
        sample(Vec3::new(e, 0.0, 0.0)),
        sample(Vec3::new(0.0, e, 0.0)),
        sample(Vec3::new(0.0, 0.0, e)),
    );
    gradient.normalize_or_fallback(Vec3::Y) * config.flip
}
