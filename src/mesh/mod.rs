// SPDX-License-Identifier: GPL-3.0-only

//! Depth-to-mesh reconstruction
//!
//! Converts a [`DepthFrame`](crate::depth::DepthFrame) into a regular grid of
//! camera-space points plus a fixed triangulation of that grid. A full
//! resolution grid serves as the render mesh; an optional decimated grid
//! serves as a cheaper collision proxy.

mod builder;
mod point;
pub mod triangulation;
mod unproject;

pub use builder::{DepthMesh, DepthMeshBuilder};
pub use point::Point3;
pub use triangulation::{TriangulationCache, grid_indices, triangle_index_count};
pub use unproject::{UnprojectParams, build_point_grid, unproject_into};

use std::sync::Arc;

/// Grid of unprojected points with its triangulation
///
/// Points are owned by the caller. The index buffer is immutable and may be
/// shared with the builder's cache for the same resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PointGrid {
    /// Grid width in points
    pub width: usize,
    /// Grid height in points
    pub height: usize,
    /// Row-major points, `width * height`
    pub points: Vec<Point3>,
    /// Triangle list, `6 * (width - 1) * (height - 1)` indices
    pub indices: Arc<[u32]>,
}

impl PointGrid {
    /// Point at column `u`, row `v`
    pub fn point(&self, u: usize, v: usize) -> Option<Point3> {
        if u >= self.width || v >= self.height {
            return None;
        }
        self.points.get(v * self.width + u).copied()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds `(min, max)`, `None` for an empty grid
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
        )
    }

    /// Points as raw bytes (native endian, 12 bytes per point)
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.points)
    }
}
