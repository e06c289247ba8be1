//! Render configuration and the errors raised when it is invalid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bucket::DEFAULT_BUCKET_SIZE;
use crate::camera::CameraSettings;
use crate::display::DisplaySettings;
use crate::environment::Environment;
use crate::march::MarchConfig;
use crate::material::Palette;

/// Errors that can occur while setting up a render.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid resolution {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),

    #[error("Invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration.
///
/// Defaults reproduce the creative block picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Maximum number of surface interactions per path
    pub max_bounces: u32,
    /// Seed mixed into every per-pixel random stream
    pub seed: u64,
    /// Side length of the square tiles rendered in parallel
    pub bucket_size: u32,
    /// Seed for the synthetic noise texture when none is loaded
    pub noise_seed: u64,
    pub camera: CameraSettings,
    pub march: MarchConfig,
    pub palette: Palette,
    pub environment: Environment,
    pub display: DisplaySettings,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 540,
            max_bounces: 10,
            seed: 0,
            bucket_size: DEFAULT_BUCKET_SIZE,
            noise_seed: 0,
            camera: CameraSettings::default(),
            march: MarchConfig::default(),
            palette: Palette::default(),
            environment: Environment::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from JSON; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> RenderResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_max_bounces(mut self, max_bounces: u32) -> Self {
        self.max_bounces = max_bounces;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_camera(mut self, camera: CameraSettings) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Check that the configuration can produce an image.
    pub fn validate(&self) -> RenderResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidResolution {
                width: self.width,
                height: self.height,
            });
        }

        let camera = &self.camera;
        if !camera.position.is_finite() || !camera.look_at.is_finite() {
            return Err(RenderError::InvalidCamera(
                "position and look_at must be finite".to_string(),
            ));
        }
        if camera.position == camera.look_at {
            return Err(RenderError::InvalidCamera(
                "position and look_at must differ".to_string(),
            ));
        }
        if !(camera.focal_length > 0.0) {
            return Err(RenderError::InvalidCamera(format!(
                "focal length must be positive, got {}",
                camera.focal_length
            )));
        }
        if !(camera.aperture >= 0.0) || !(camera.focus_scale > 0.0) {
            return Err(RenderError::InvalidCamera(
                "aperture must be non-negative and focus scale positive".to_string(),
            ));
        }
        if !(camera.frame_aspect > 0.0) {
            return Err(RenderError::InvalidCamera(format!(
                "frame aspect must be positive, got {}",
                camera.frame_aspect
            )));
        }

        if self.bucket_size == 0 {
            return Err(invalid("bucket_size", "must be at least 1"));
        }
        if self.march.max_steps == 0 {
            return Err(invalid("march.max_steps", "must be at least 1"));
        }
        if !(self.march.epsilon > 0.0) || !(self.march.normal_epsilon > 0.0) {
            return Err(invalid("march.epsilon", "epsilons must be positive"));
        }
        if self.march.flip.abs() != 1.0 {
            return Err(invalid(
                "march.flip",
                format!("must be 1 or -1, got {}", self.march.flip),
            ));
        }
        if !(self.display.frame_aspect > 0.0) {
            return Err(invalid("display.frame_aspect", "must be positive"));
        }

        Ok(())
    }
}

fn invalid(name: &'static str, reason: impl Into<String>) -> RenderError {
    RenderError::InvalidSetting {
        name,
        reason: reason.into(),
    }
}
