use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use mcrt_core::RenderSettings;
use mcrt_renderer::{cornell_camera, render, RenderConfig, Scene};

mod output;

/// Render a scene with the Monte Carlo path tracer.
#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON render settings; built-in defaults when omitted
    #[clap(value_parser)]
    settings: Option<PathBuf>,

    /// Output image (.ppm, .png, ...)
    #[clap(short, long, value_parser, default_value = "out.ppm")]
    output: PathBuf,

    /// Width in pixels of the generated image
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Height in pixels of the generated image
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,

    /// Samples per pixel
    #[clap(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    samples: Option<u32>,

    /// Maximum bounce depth
    #[clap(long, value_parser)]
    max_depth: Option<u32>,

    /// Base random seed
    #[clap(long, value_parser)]
    seed: Option<u64>,
}

impl Args {
    fn settings(&self) -> Result<RenderSettings> {
        let mut settings = match &self.settings {
            Some(path) => RenderSettings::from_file(path)
                .with_context(|| format!("Failed to load settings {}", path.display()))?,
            None => RenderSettings::default(),
        };

        if let Some(width) = self.width {
            settings.width = width;
        }
        if let Some(height) = self.height {
            settings.height = height;
        }
        if let Some(samples) = self.samples {
            settings.samples_per_pixel = samples;
        }
        if let Some(max_depth) = self.max_depth {
            settings.max_depth = max_depth;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }

        settings.validate()?;
        Ok(settings)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let settings = args.settings()?;

    let start = Instant::now();
    let scene = Scene::from_settings(&settings).context("Failed to build scene")?;
    log::info!(
        "Scene {:?} ready in {:.2?} ({} models)",
        settings.scene,
        start.elapsed(),
        settings.models.len()
    );

    let camera = cornell_camera(settings.width, settings.height);
    let config = RenderConfig::from_settings(&settings);
    let image = render(&camera, scene.world(), scene.lights(), &config);

    output::save(&image, &args.output)?;
    Ok(())
}
