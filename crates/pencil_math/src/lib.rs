// Re-export glam for convenience
pub use glam::*;

// Pencil math types
mod ext;
mod ray;
pub use ext::{mix, rot2, step, Vec2Ext, Vec3Ext};
pub use ray::Ray;

/// Linear RGB color.
pub type Color = Vec3;
