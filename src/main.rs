// SPDX-License-Identifier: GPL-3.0-only

use clap::{Args, Parser, Subcommand};
use depth_mesh::Config;
use depth_mesh::depth::DepthFileFormat;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "depth-mesh")]
#[command(about = "Reconstruct 3D meshes from depth images")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Config file (default: ~/.config/depth-mesh/config.json if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Depth file selection shared by commands that read a frame
#[derive(Args, Clone)]
pub struct InputArgs {
    /// Depth image (16-bit millimetre PNG or raw little-endian f32 metres)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Input format (inferred from the extension when omitted)
    #[arg(short, long)]
    pub format: Option<DepthFileFormat>,

    /// Frame width, required for raw input
    #[arg(long)]
    pub width: Option<usize>,

    /// Frame height, required for raw input
    #[arg(long)]
    pub height: Option<usize>,
}

/// Intrinsics overrides; unset values come from the config rescaled to the frame
#[derive(Args, Clone, Default)]
pub struct IntrinsicsArgs {
    #[arg(long)]
    pub fx: Option<f32>,
    #[arg(long)]
    pub fy: Option<f32>,
    #[arg(long)]
    pub cx: Option<f32>,
    #[arg(long)]
    pub cy: Option<f32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build render and collision meshes and export a scene directory
    Build {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        intrinsics: IntrinsicsArgs,

        /// Collision mesh decimation factor (1 disables the collision mesh)
        #[arg(short, long)]
        decimation: Option<u32>,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print resolution and depth statistics of a frame
    Info {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Smooth a JSON array of {t, x, y, z} samples with the One-Euro filter
    Smooth {
        /// Input JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Minimum cutoff frequency in Hz
        #[arg(long)]
        min_cutoff: Option<f32>,

        /// Speed coefficient
        #[arg(long)]
        beta: Option<f32>,

        /// Output JSON file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration as JSON
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=depth_mesh=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Build {
            input,
            intrinsics,
            decimation,
            output,
        } => cli::build_scene(&config, &input, &intrinsics, decimation, output),
        Commands::Info { input } => cli::print_info(&config, &input),
        Commands::Smooth {
            input,
            min_cutoff,
            beta,
            output,
        } => cli::smooth_samples(&config, &input, min_cutoff, beta, output),
        Commands::Config => cli::print_config(&config),
    }
}
