use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use linetrace::{DebugSink, Pipeline, VectorizeConfig, VectorizeOutput};
use linetrace_cli::BatchConfig;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single image to SVG
    Convert {
        /// Path to the input image (JPEG or PNG)
        #[arg(short, long)]
        input: PathBuf,
        /// Output directory for the generated SVG files
        #[arg(short, long, default_value = "out")]
        output_dir: PathBuf,
        /// Simplification tolerance in pixels
        #[arg(long, default_value = "0.8")]
        tolerance: f64,
        /// Spline smoothing factor
        #[arg(long, default_value = "0.002")]
        smoothing: f64,
        /// Samples per smoothed path
        #[arg(long, default_value = "200")]
        num_points: usize,
        /// Minimum connected-component area in pixels
        #[arg(long, default_value = "50")]
        min_component_area: usize,
        /// SVG document scale multiplier
        #[arg(long, default_value = "1.0")]
        scale: f64,
        /// SVG stroke width
        #[arg(long, default_value = "1.2")]
        stroke_width: f64,
        /// Also write intermediate binary mask and skeleton images
        #[arg(long)]
        debug: bool,
    },
    /// Convert a batch of images using a configuration file
    Batch {
        /// Path to the TOML or JSON configuration file
        #[arg(short, long)]
        config: PathBuf,
        /// Also write intermediate images for every job
        #[arg(long)]
        debug: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Convert {
            input,
            output_dir,
            tolerance,
            smoothing,
            num_points,
            min_component_area,
            scale,
            stroke_width,
            debug,
        } => {
            let config = VectorizeConfig {
                tolerance: *tolerance,
                smoothing: *smoothing,
                num_points: *num_points,
                min_component_area: *min_component_area,
                scale: *scale,
                stroke_width: *stroke_width,
            };
            let name = input
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "output".to_string());
            convert_image(input, output_dir, &name, &config, *debug)?;
        }
        Commands::Batch { config, debug } => {
            run_batch(config, *debug)?;
        }
    }

    Ok(())
}

fn convert_image(
    input: &Path,
    output_dir: &Path,
    name: &str,
    config: &VectorizeConfig,
    debug: bool,
) -> Result<VectorizeOutput> {
    info!("Converting {:?}", input);
    let image = image::open(input)?;
    std::fs::create_dir_all(output_dir)?;

    let pipeline = Pipeline::from_config(config);
    let output = if debug {
        let debug_dir = output_dir.join(format!("{name}_debug"));
        std::fs::create_dir_all(&debug_dir)?;
        pipeline.process_with_debug(&image, Some(&DebugSink::new(debug_dir)))?
    } else {
        pipeline.process(&image)?
    };

    let paths_file = output_dir.join(format!("{name}_paths.svg"));
    let mask_file = output_dir.join(format!("{name}_mask.svg"));
    std::fs::write(&paths_file, &output.paths_svg)?;
    std::fs::write(&mask_file, &output.mask_svg)?;

    for warning in &output.warnings {
        warn!("{:?} while converting {:?}", warning, input);
    }
    info!(
        "Extracted {} paths -> {}",
        output.paths_count,
        paths_file.display()
    );
    Ok(output)
}

fn run_batch(config_path: &Path, debug: bool) -> Result<()> {
    let batch = BatchConfig::from_file(config_path)?;
    info!(
        "Running {} jobs into {}",
        batch.jobs.len(),
        batch.output_dir
    );
    let output_dir = PathBuf::from(&batch.output_dir);
    std::fs::create_dir_all(&output_dir)?;

    let mut failures = 0usize;
    for job in &batch.jobs {
        if let Some(description) = &job.description {
            info!("Job '{}': {}", job.name, description);
        }
        let input = PathBuf::from(&job.input);
        match convert_image(&input, &output_dir, &job.name, &job.config, debug) {
            Ok(_) => {}
            Err(err) => {
                error!("Job '{}' failed: {err:#}", job.name);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(color_eyre::eyre::eyre!(
            "{failures} of {} jobs failed",
            batch.jobs.len()
        ));
    }
    info!("Batch conversion completed");
    Ok(())
}
