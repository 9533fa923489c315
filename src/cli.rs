// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! - Building and exporting meshes from a depth file
//! - Inspecting depth files
//! - Smoothing recorded 3D tracks

use crate::{InputArgs, IntrinsicsArgs};
use depth_mesh::depth::{DepthFrame, Intrinsics, load_depth};
use depth_mesh::filters::OneEuroFilter;
use depth_mesh::pipelines::scene::{SceneExportOptions, export_scene};
use depth_mesh::{Config, DepthMeshBuilder, Point3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn load_frame(input: &InputArgs) -> Result<DepthFrame, Box<dyn std::error::Error>> {
    let dimensions = match (input.width, input.height) {
        (Some(w), Some(h)) => Some((w, h)),
        _ => None,
    };
    Ok(load_depth(&input.input, input.format, dimensions)?)
}

/// Config intrinsics rescaled to the frame, with per-field overrides
fn resolve_intrinsics(config: &Config, frame: &DepthFrame, args: &IntrinsicsArgs) -> Intrinsics {
    let base = config
        .intrinsics
        .for_frame(frame.width(), frame.height());
    Intrinsics::new(
        args.fx.unwrap_or(base.fx),
        args.fy.unwrap_or(base.fy),
        args.cx.unwrap_or(base.cx),
        args.cy.unwrap_or(base.cy),
    )
}

/// Build meshes for a depth file and export them as a scene
pub fn build_scene(
    config: &Config,
    input: &InputArgs,
    intrinsics: &IntrinsicsArgs,
    decimation: Option<u32>,
    output: Option<PathBuf>,
) -> CliResult {
    let frame = load_frame(input)?;
    let intrinsics = resolve_intrinsics(config, &frame, intrinsics);

    let stats = frame.stats(config.mesh.min_valid_depth);
    if stats.valid == 0 {
        warn!(
            replacement = config.mesh.invalid_replacement,
            "Frame has no valid samples, mesh will be a flat plane"
        );
    }

    let mut settings = config.mesh.clone();
    if let Some(factor) = decimation {
        settings.collision_decimation = factor;
    }

    let mut builder = DepthMeshBuilder::new(settings);
    let mesh = builder.build(&frame, &intrinsics)?;

    let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
    let options = SceneExportOptions {
        settings: config.export.clone(),
        min_valid_depth: config.mesh.min_valid_depth,
        scene_name: None,
    };

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = rt.block_on(export_scene(&frame, &mesh, &output_dir, &options))?;

    println!("Scene written to {}", result.scene_dir.display());
    println!(
        "  mesh:       {}x{} points, {} triangles",
        mesh.render.width,
        mesh.render.height,
        mesh.render.triangle_count()
    );
    if let (Some(collision), Some(_)) = (&mesh.collision, &result.collision_path) {
        println!(
            "  collision:  {}x{} points, {} triangles",
            collision.width,
            collision.height,
            collision.triangle_count()
        );
    }
    if let Some(path) = &result.pointcloud_path {
        println!("  pointcloud: {}", path.display());
    }

    Ok(())
}

/// Print resolution and depth statistics
pub fn print_info(config: &Config, input: &InputArgs) -> CliResult {
    let frame = load_frame(input)?;
    let stats = frame.stats(config.mesh.min_valid_depth);

    println!("{}", input.input.display());
    println!("  resolution: {}x{}", frame.width(), frame.height());
    println!(
        "  valid:      {} / {} ({:.1}%)",
        stats.valid,
        stats.total,
        stats.valid_ratio() * 100.0
    );
    match (stats.min_depth, stats.max_depth) {
        (Some(min), Some(max)) => println!("  depth:      {:.3} m .. {:.3} m", min, max),
        _ => println!("  depth:      no valid samples"),
    }

    Ok(())
}

/// One timestamped 3D sample
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrackSample {
    pub t: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Run a recorded track through the One-Euro filter
pub fn smooth_track(samples: &[TrackSample], min_cutoff: f32, beta: f32) -> Vec<TrackSample> {
    let mut filter = OneEuroFilter::new(min_cutoff, beta);
    if let Some(first) = samples.first() {
        filter.reset(first.t, Point3::new(first.x, first.y, first.z));
    }

    samples
        .iter()
        .map(|s| {
            let p = filter.step(s.t, Point3::new(s.x, s.y, s.z));
            TrackSample {
                t: s.t,
                x: p.x,
                y: p.y,
                z: p.z,
            }
        })
        .collect()
}

/// Smooth a JSON track file
pub fn smooth_samples(
    config: &Config,
    input: &Path,
    min_cutoff: Option<f32>,
    beta: Option<f32>,
    output: Option<PathBuf>,
) -> CliResult {
    let text = std::fs::read_to_string(input)?;
    let samples: Vec<TrackSample> = serde_json::from_str(&text)?;

    let smoothed = smooth_track(
        &samples,
        min_cutoff.unwrap_or(config.filter.min_cutoff),
        beta.unwrap_or(config.filter.beta),
    );
    let json = serde_json::to_string_pretty(&smoothed)?;

    match output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{}", json),
    }

    Ok(())
}

/// Print the effective configuration
pub fn print_config(config: &Config) -> CliResult {
    println!("{}", config.to_json()?);
    Ok(())
}
