//! Radiance arriving from outside the scene.

use pencil_math::{Color, Vec3};
use serde::{Deserialize, Serialize};

/// What a ray sees once it leaves the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    /// Stylized overcast sky with a tight key lobe towards the sun and a
    /// faint fill from the opposite side.
    Sun { direction: Vec3 },
    /// Constant radiance in every direction.
    Uniform(Color),
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Sun {
            direction: Vec3::new(-1.0, 0.8, -0.7).normalize(),
        }
    }
}

impl Environment {
    /// Radiance seen looking along `view`.
    pub fn radiance(&self, view: Vec3) -> Color {
        match *self {
            Environment::Sun { direction } => {
                let fill_dir = (direction * Vec3::new(-1.0, 1.0, -1.0)).normalize_or_zero();
                let fill = (fill_dir.dot(view) + 0.2).max(0.0);
                let key = (direction.dot(view) - 0.5).max(0.0).powi(3);
                Color::splat(fill * 0.015 + key * 10.0) * 1.5
            }
            Environment::Uniform(color) => color,
        }
    }

    /// Upper bound on the radiance of any direction, per channel.
    pub fn max_radiance(&self) -> Color {
        match *self {
            // fill <= 1.2, key <= 0.5^3
            Environment::Sun { .. } => Color::splat((1.2 * 0.015 + 0.125 * 10.0) * 1.5),
            Environment::Uniform(color) => color,
        }
    }
}
