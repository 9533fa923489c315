// SPDX-License-Identifier: GPL-3.0-only

//! Scene export pipeline
//!
//! Writes one reconstructed frame to a timestamped directory:
//! - depth.png - grayscale depth preview
//! - mesh.glb - full resolution render mesh
//! - collision.glb - decimated collision mesh (when built and enabled)
//! - pointcloud.las - render grid as a point cloud (when enabled)

mod gltf_export;
mod las_export;

pub use gltf_export::{encode_glb, export_mesh_glb};
pub use las_export::export_point_cloud_las;

use crate::config::ExportSettings;
use crate::depth::DepthFrame;
use crate::errors::ExportError;
use crate::mesh::DepthMesh;
use image::GrayImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Options for a scene export
#[derive(Debug, Clone)]
pub struct SceneExportOptions {
    pub settings: ExportSettings,
    /// Samples below this are drawn black in the preview
    pub min_valid_depth: f32,
    /// Directory name override (default: `scene_<timestamp>`)
    pub scene_name: Option<String>,
}

/// Paths written by [`export_scene`]
#[derive(Debug, Clone)]
pub struct SceneExportResult {
    pub scene_dir: PathBuf,
    pub depth_preview_path: PathBuf,
    pub mesh_path: PathBuf,
    pub collision_path: Option<PathBuf>,
    pub pointcloud_path: Option<PathBuf>,
}

/// Export a reconstructed frame into a new scene directory under `output_dir`
pub async fn export_scene(
    frame: &DepthFrame,
    mesh: &DepthMesh,
    output_dir: &Path,
    options: &SceneExportOptions,
) -> Result<SceneExportResult, ExportError> {
    let dir_name = options.scene_name.clone().unwrap_or_else(|| {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        format!("scene_{}", timestamp)
    });
    let scene_dir = output_dir.join(dir_name);
    tokio::fs::create_dir_all(&scene_dir).await?;

    info!(scene_dir = %scene_dir.display(), "Exporting scene");

    let settings = &options.settings;

    // 1. Depth preview
    let depth_preview_path = scene_dir.join("depth.png");
    save_depth_preview(
        frame,
        &depth_preview_path,
        options.min_valid_depth,
        settings.preview_min_depth,
        settings.preview_max_depth,
    )
    .await?;
    debug!(path = %depth_preview_path.display(), "Saved depth preview");

    // 2. Render mesh
    let mesh_path = scene_dir.join("mesh.glb");
    export_mesh_glb(&mesh.render, &mesh_path).await?;

    // 3. Collision mesh
    let collision_path = match (&mesh.collision, settings.write_collision_mesh) {
        (Some(collision), true) => {
            let path = scene_dir.join("collision.glb");
            export_mesh_glb(collision, &path).await?;
            Some(path)
        }
        _ => None,
    };

    // 4. Point cloud
    let pointcloud_path = if settings.write_point_cloud {
        let path = scene_dir.join("pointcloud.las");
        export_point_cloud_las(&mesh.render, &path).await?;
        Some(path)
    } else {
        None
    };

    info!(scene_dir = %scene_dir.display(), "Scene export complete");

    Ok(SceneExportResult {
        scene_dir,
        depth_preview_path,
        mesh_path,
        collision_path,
        pointcloud_path,
    })
}

/// Save a depth frame as an 8-bit grayscale PNG (closer = brighter, invalid = black)
pub async fn save_depth_preview(
    frame: &DepthFrame,
    path: &Path,
    min_valid_depth: f32,
    near: f32,
    far: f32,
) -> Result<(), ExportError> {
    let gray = depth_preview_image(frame, min_valid_depth, near, far)?;
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        gray.save(&path)
            .map_err(|e| ExportError::Encode(format!("depth preview PNG: {}", e)))
    })
    .await?
}

/// Map depth to 8-bit intensity over `[near, far]`
pub fn depth_preview_image(
    frame: &DepthFrame,
    min_valid_depth: f32,
    near: f32,
    far: f32,
) -> Result<GrayImage, ExportError> {
    let range = (far - near).max(f32::EPSILON);

    let gray_data: Vec<u8> = frame
        .data()
        .iter()
        .map(|&d| {
            if d.is_nan() || d < min_valid_depth {
                0u8
            } else {
                let normalized = 1.0 - (d - near) / range;
                (normalized.clamp(0.0, 1.0) * 255.0) as u8
            }
        })
        .collect();

    GrayImage::from_raw(frame.width() as u32, frame.height() as u32, gray_data)
        .ok_or_else(|| ExportError::Encode("failed to create grayscale image".to_string()))
}
