//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that are traced independently and
//! in parallel using rayon. Each bucket returns its own samples, so no two
//! workers ever touch the same accumulation cell.

use pencil_math::Color;

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::integrator::trace_path;
use crate::sampling::pixel_rng;
use crate::scene::DistanceField;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 32;

/// Tile the image into buckets, row-major; edge buckets are clipped.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh));
            x += bucket_size;
        }
        y += bucket_size;
    }

    buckets
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// One radiance sample per pixel, row-major within the bucket
    pub samples: Vec<Color>,
}

impl BucketResult {
    /// Create a new bucket result.
    pub fn new(bucket: Bucket, samples: Vec<Color>) -> Self {
        Self { bucket, samples }
    }
}

/// Trace one path through every pixel of a bucket.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    field: &dyn DistanceField,
    config: &RenderConfig,
    frame: u32,
) -> BucketResult {
    let mut samples = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let x = bucket.x + local_x;
            let y = bucket.y + local_y;
            let mut rng = pixel_rng(x, y, frame, config.seed);

            let ray = camera.get_ray(x, y, &mut rng);
            samples.push(trace_path(field, ray, camera.near_clip(), config, &mut rng));
        }
    }

    BucketResult::new(*bucket, samples)
}
