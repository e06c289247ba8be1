use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use pencil_core::NoiseTexture;
use pencil_renderer::{RenderConfig, Renderer};

/// Render the creative block scene progressively and save the result.
#[derive(Parser, Debug)]
#[command(name = "pencil", version)]
struct Args {
    /// Image width in pixels (overrides the config file)
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels (overrides the config file)
    #[arg(long)]
    height: Option<u32>,

    /// Number of frames to accumulate
    #[arg(short, long, default_value_t = 64)]
    frames: u32,

    /// Output image; the format follows the extension
    #[arg(short, long, default_value = "creative_block.png")]
    output: PathBuf,

    /// Noise texture image; synthetic noise is used when absent
    #[arg(long)]
    noise: Option<PathBuf>,

    /// JSON render configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the per-pixel random streams
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum bounces per path
    #[arg(long)]
    bounces: Option<u32>,

    /// Log progress every this many frames (0 disables)
    #[arg(long, default_value_t = 16)]
    progress_every: u32,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn render_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => RenderConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(bounces) = self.bounces {
            config.max_bounces = bounces;
        }

        Ok(config)
    }

    fn noise(&self) -> Option<NoiseTexture> {
        let path = self.noise.as_ref()?;
        match NoiseTexture::load(path) {
            Ok(texture) => {
                log::info!(
                    "Loaded noise texture {} ({}x{})",
                    path.display(),
                    texture.width(),
                    texture.height()
                );
                Some(texture)
            }
            Err(e) => {
                log::warn!("{e}; falling back to synthetic noise");
                None
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.render_config()?;

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    log::info!(
        "Rendering {}x{}, {} frames -> {}",
        config.width,
        config.height,
        args.frames,
        args.output.display()
    );

    let mut renderer =
        Renderer::creative_block(config, args.noise()).context("Invalid render configuration")?;

    let start = Instant::now();
    for _ in 0..args.frames {
        let stats = renderer.render_frame();
        let done = stats.frame + 1;
        if args.progress_every > 0 && done % args.progress_every == 0 {
            log::info!(
                "Frame {}/{} ({:.1} frames/s)",
                done,
                args.frames,
                done as f64 / start.elapsed().as_secs_f64().max(1e-9)
            );
        }
    }
    log::info!(
        "Accumulated {} frames in {:.2}s",
        renderer.frame_index(),
        start.elapsed().as_secs_f64()
    );

    renderer
        .resolve()
        .save(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_override_defaults() {
        let args = Args::parse_from([
            "pencil", "--width", "320", "--height", "180", "--seed", "3", "--bounces", "4",
        ]);
        let config = args.render_config().unwrap();

        assert_eq!((config.width, config.height), (320, 180));
        assert_eq!(config.seed, 3);
        assert_eq!(config.max_bounces, 4);
        assert_eq!(args.frames, 64);
    }

    #[test]
    fn test_missing_noise_falls_back() {
        let args = Args::parse_from(["pencil", "--noise", "/nonexistent/noise.png"]);
        assert!(args.noise().is_none());
    }

    #[test]
    fn test_missing_config_is_error() {
        let args = Args::parse_from(["pencil", "--config", "/nonexistent/pencil.json"]);
        assert!(args.render_config().is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
