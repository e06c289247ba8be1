//! Thin-lens camera for ray generation.

use pencil_math::{rot2, step, Mat2, Ray, Vec2, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::sampling::gen_f32;

/// Camera placement and lens, independent of image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Distance from the eye to the image plane in uv units
    pub focal_length: f32,
    /// Radius of the bokeh aperture; 0 gives a pinhole
    pub aperture: f32,
    /// Focus distance as a fraction of the eye-to-target distance
    pub focus_scale: f32,
    /// Near clip of primary rays as a fraction of the eye's distance from the origin
    pub near_clip_scale: f32,
    /// Aspect ratio of the framed picture; narrower images are zoomed out to keep it
    pub frame_aspect: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(140.0, 60.0, 60.0) * 1.5,
            look_at: Vec3::new(0.0, 4.0, 0.0),
            focal_length: 6.5,
            aperture: 3.0,
            focus_scale: 0.99,
            near_clip_scale: 0.7,
            frame_aspect: 16.0 / 9.0,
        }
    }
}

impl CameraSettings {
    /// Set camera position.
    pub fn with_position(mut self, position: Vec3, look_at: Vec3) -> Self {
        self.position = position;
        self.look_at = look_at;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, focal_length: f32, aperture: f32) -> Self {
        self.focal_length = focal_length;
        self.aperture = aperture;
        self
    }
}

/// Camera for generating rays into the scene.
#[derive(Debug, Clone)]
pub struct Camera {
    settings: CameraSettings,
    resolution: Vec2,

    // Cached computed values
    aspect: f32,
    frame_zoom: f32,
    focus_distance: f32,
    near_clip: f32,
    pitch: Mat2,
    yaw: Mat2,
}

impl Camera {
    pub fn new(settings: CameraSettings, width: u32, height: u32) -> Self {
        let resolution = Vec2::new(width.max(1) as f32, height.max(1) as f32);
        let aspect = resolution.x / resolution.y;

        let look = settings.look_at - settings.position;
        let pitch = -look.y.atan2(Vec2::new(look.x, look.z).length());
        let yaw = -look.x.atan2(look.z);

        Self {
            settings,
            resolution,
            aspect,
            frame_zoom: (settings.frame_aspect / aspect).max(1.0),
            focus_distance: look.length() * settings.focus_scale,
            near_clip: settings.position.length() * settings.near_clip_scale,
            pitch: rot2(pitch),
            yaw: rot2(yaw),
        }
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// Distance along primary rays where marching starts.
    pub fn near_clip(&self) -> f32 {
        self.near_clip
    }

    /// Generate a jittered ray through pixel `(x, y)`, row 0 at the top.
    pub fn get_ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        let row = self.resolution.y - 1.0 - y as f32;
        let jitter = Vec2::new(gen_f32(rng), gen_f32(rng));

        let mut uv = (Vec2::new(x as f32, row) + jitter - 0.5) / self.resolution - 0.5;
        uv.x *= self.aspect;
        uv *= self.frame_zoom;

        let mut origin = Vec3::ZERO;
        let mut dir = Vec3::new(uv.x, uv.y, self.settings.focal_length).normalize();

        if self.settings.aperture > 0.0 {
            let lens = bokeh_sample(rng) * self.settings.aperture;
            origin.x += lens.x;
            origin.y += lens.y;
            dir.x -= lens.x * dir.z / self.focus_distance;
            dir.y -= lens.y * dir.z / self.focus_distance;
        }

        let (origin, dir) = self.orient(origin, dir);
        Ray::new(origin + self.settings.position, dir)
    }

    /// Rotate from camera space to world space: pitch about X, then yaw about Y.
    fn orient(&self, origin: Vec3, dir: Vec3) -> (Vec3, Vec3) {
        let pitch = |v: Vec3| {
            let yz = self.pitch * Vec2::new(v.y, v.z);
            Vec3::new(v.x, yz.x, yz.y)
        };
        let yaw = |v: Vec3| {
            let xz = self.yaw * Vec2::new(v.x, v.z);
            Vec3::new(xz.x, v.y, xz.y)
        };

        (yaw(pitch(origin)), yaw(pitch(dir)))
    }
}

/// Sample the lens aperture.
///
/// Folds a 3x1 parallelogram of uniform samples into a hexagon-like bokeh
/// shape of unit size.
pub fn bokeh_sample(rng: &mut dyn RngCore) -> Vec2 {
    let mut a = Vec2::new(gen_f32(rng), gen_f32(rng));
    a.x = a.x * 3.0 - 1.0;
    a -= Vec2::splat(step(1.0, a.x + a.y));
    a.x += a.y * 0.5;
    a.y *= 0.75f32.sqrt();
    a
}
