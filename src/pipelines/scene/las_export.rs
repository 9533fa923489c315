// SPDX-License-Identifier: GPL-3.0-only

//! LAS point cloud export
//!
//! Writes every grid point (including substituted invalid samples, the grid
//! is dense by construction) as an uncompressed LAS 1.4 file with 1 mm
//! precision.

use crate::errors::ExportError;
use crate::mesh::PointGrid;
use las::{Builder, Point, Writer};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Coordinate quantisation (metres)
const LAS_SCALE: f64 = 0.001;

/// Export a point grid as a LAS file
pub async fn export_point_cloud_las(
    grid: &PointGrid,
    output_path: &Path,
) -> Result<(), ExportError> {
    let grid = grid.clone();
    let output_path = output_path.to_path_buf();

    tokio::task::spawn_blocking(move || export_las_sync(&grid, &output_path)).await?
}

fn export_las_sync(grid: &PointGrid, output_path: &PathBuf) -> Result<(), ExportError> {
    let (min, max) = grid.bounds().ok_or(ExportError::Empty)?;

    info!(
        point_count = grid.points.len(),
        path = %output_path.display(),
        "Exporting point cloud"
    );

    let mut builder = Builder::from((1, 4));
    builder.point_format.is_compressed = false;

    // Offsets at the bounds centre keep quantised coordinates small
    let transform = |lo: f32, hi: f32| las::Transform {
        scale: LAS_SCALE,
        offset: (lo as f64 + hi as f64) / 2.0,
    };
    builder.transforms = las::Vector {
        x: transform(min.x, max.x),
        y: transform(min.y, max.y),
        z: transform(min.z, max.z),
    };

    let header = builder
        .into_header()
        .map_err(|e| ExportError::Encode(format!("LAS header: {}", e)))?;

    let mut writer = Writer::from_path(output_path, header)
        .map_err(|e| ExportError::Encode(format!("LAS writer: {}", e)))?;

    for p in &grid.points {
        let point = Point {
            x: p.x as f64,
            y: p.y as f64,
            z: p.z as f64,
            ..Default::default()
        };

        writer
            .write_point(point)
            .map_err(|e| ExportError::Encode(format!("LAS point: {}", e)))?;
    }

    writer
        .close()
        .map_err(|e| ExportError::Encode(format!("LAS close: {}", e)))?;

    debug!(path = %output_path.display(), "LAS export complete");

    Ok(())
}
