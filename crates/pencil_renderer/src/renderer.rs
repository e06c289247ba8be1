//! Progressive frame renderer.
//!
//! Owns the scene, camera and accumulation buffer. Every call to
//! [`Renderer::render_frame`] traces one path per pixel, bucket by bucket in
//! parallel, and adds the results to the running sums.

use std::time::{Duration, Instant};

use log::{debug, info};
use pencil_core::NoiseTexture;
use rayon::prelude::*;

use crate::accumulation::AccumulationBuffer;
use crate::bucket::{generate_buckets, render_bucket, Bucket, BucketResult};
use crate::camera::Camera;
use crate::config::{RenderConfig, RenderResult};
use crate::display::{self, DisplayImage};
use crate::scene::{CreativeBlock, DistanceField};

/// Timing for one rendered frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameStats {
    /// Index of the frame that was just rendered
    pub frame: u32,
    pub buckets: usize,
    pub elapsed: Duration,
}

pub struct Renderer {
    config: RenderConfig,
    scene: Box<dyn DistanceField>,
    camera: Camera,
    buckets: Vec<Bucket>,
    accumulation: AccumulationBuffer,
    frame: u32,
}

impl Renderer {
    /// Create a renderer for an arbitrary distance field.
    pub fn new(config: RenderConfig, scene: Box<dyn DistanceField>) -> RenderResult<Self> {
        config.validate()?;

        let camera = Camera::new(config.camera, config.width, config.height);
        let buckets = generate_buckets(config.width, config.height, config.bucket_size);
        let accumulation = AccumulationBuffer::new(config.width, config.height);

        info!(
            "Renderer ready: {}x{}, {} buckets, {} bounces",
            config.width,
            config.height,
            buckets.len(),
            config.max_bounces
        );

        Ok(Self {
            config,
            scene,
            camera,
            buckets,
            accumulation,
            frame: 0,
        })
    }

    /// Create a renderer for the creative block scene.
    ///
    /// Without a noise texture the scene synthesizes one from
    /// `config.noise_seed`.
    pub fn creative_block(config: RenderConfig, noise: Option<NoiseTexture>) -> RenderResult<Self> {
        let noise = noise.unwrap_or_else(|| {
            debug!("Using synthetic noise (seed {})", config.noise_seed);
            NoiseTexture::synthetic(
                pencil_core::DEFAULT_NOISE_SIZE,
                pencil_core::DEFAULT_NOISE_SIZE,
                config.noise_seed,
            )
        });
        Self::new(config, Box::new(CreativeBlock::new(noise)))
    }

    /// Trace one sample per pixel and add it to the accumulation buffer.
    pub fn render_frame(&mut self) -> FrameStats {
        let start = Instant::now();
        let frame = self.frame;

        let results: Vec<BucketResult> = self
            .buckets
            .par_iter()
            .map(|bucket| {
                render_bucket(bucket, &self.camera, self.scene.as_ref(), &self.config, frame)
            })
            .collect();

        for result in &results {
            self.accumulation.add_bucket(result);
        }
        self.frame += 1;

        let stats = FrameStats {
            frame,
            buckets: results.len(),
            elapsed: start.elapsed(),
        };
        debug!(
            "Frame {} rendered in {:.2}ms",
            stats.frame,
            stats.elapsed.as_secs_f64() * 1000.0
        );
        stats
    }

    /// Render `count` frames and log a summary.
    pub fn render_frames(&mut self, count: u32) -> Duration {
        let start = Instant::now();
        for _ in 0..count {
            self.render_frame();
        }
        let elapsed = start.elapsed();
        info!(
            "Rendered {} frames ({} accumulated) in {:.2}s",
            count,
            self.frame,
            elapsed.as_secs_f64()
        );
        elapsed
    }

    /// Run the display pass over everything accumulated so far.
    pub fn resolve(&self) -> DisplayImage {
        display::resolve(
            &self.accumulation,
            &self.config.display,
            self.frame,
            self.config.seed,
        )
    }

    /// Drop accumulated samples and restart from frame 0.
    pub fn reset(&mut self) {
        self.accumulation.reset();
        self.frame = 0;
    }

    /// Number of frames accumulated since construction or the last reset.
    pub fn frame_index(&self) -> u32 {
        self.frame
    }

    pub fn accumulation(&self) -> &AccumulationBuffer {
        &self.accumulation
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }
}
