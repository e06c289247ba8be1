//! Pencil Renderer - progressive SDF path tracing
//!
//! A Monte Carlo path tracer over signed distance fields. Surfaces are found
//! by sphere tracing, shaded with a handful of stylized materials and lit by
//! an analytic sky. Each frame adds one sample per pixel to an accumulation
//! buffer that a display pass turns into an image.

mod accumulation;
mod bucket;
mod camera;
mod config;
mod display;
mod environment;
mod integrator;
mod march;
mod material;
mod renderer;
mod sampling;
mod scene;
pub mod sdf;

pub use accumulation::AccumulationBuffer;
pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::{bokeh_sample, Camera, CameraSettings};
pub use config::{RenderConfig, RenderError, RenderResult};
pub use display::{resolve, DisplayImage, DisplaySettings};
pub use environment::Environment;
pub use integrator::{step_path, trace_path, Bounce, PathState};
pub use march::{march, MarchConfig, MarchOutcome};
pub use material::{floor_pattern, fresnel, Material, Palette, Scatter};
pub use renderer::{FrameStats, Renderer};
pub use sampling::{orthonormal_basis, pixel_rng, sample_cone, sample_cosine_power, PixelRng};
pub use scene::{
    BlockDistances, ClosestSurface, CreativeBlock, DistanceField, GroundPlane, SceneSample,
    SphereField,
};

/// Re-export the math types used across the public API
pub use pencil_math::{Color, Ray, Vec2, Vec3};
