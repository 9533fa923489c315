// SPDX-License-Identifier: GPL-3.0-only

//! Per-frame mesh builder
//!
//! Wraps [`unproject_into`] for the two grids a frame produces: the full
//! resolution render mesh and the decimated collision mesh. Each keeps its
//! own triangulation cache so index buffers survive across frames of the
//! same size.

use super::{Point3, PointGrid, TriangulationCache, UnprojectParams, unproject_into};
use crate::config::MeshSettings;
use crate::constants::decimated_dimension;
use crate::depth::{DepthFrame, Intrinsics};
use crate::errors::MeshError;
use tracing::{debug, info};

/// Render mesh plus optional collision mesh for one frame
#[derive(Debug, Clone)]
pub struct DepthMesh {
    pub render: PointGrid,
    /// `None` when collision decimation is disabled
    pub collision: Option<PointGrid>,
}

/// Reusable depth-to-mesh builder
pub struct DepthMeshBuilder {
    settings: MeshSettings,
    render_topology: TriangulationCache,
    collision_topology: TriangulationCache,
}

impl DepthMeshBuilder {
    pub fn new(settings: MeshSettings) -> Self {
        Self {
            settings,
            render_topology: TriangulationCache::new(),
            collision_topology: TriangulationCache::new(),
        }
    }

    pub fn settings(&self) -> &MeshSettings {
        &self.settings
    }

    fn params(&self) -> UnprojectParams {
        UnprojectParams {
            min_valid_depth: self.settings.min_valid_depth,
            invalid_replacement: self.settings.invalid_replacement,
        }
    }

    /// Whether [`build`](Self::build) produces a collision mesh
    pub fn collision_enabled(&self) -> bool {
        self.settings.collision_decimation > 1
    }

    /// Collision grid size for a source frame
    pub fn collision_dimensions(&self, width: usize, height: usize) -> (usize, usize) {
        let factor = self.settings.collision_decimation;
        (
            decimated_dimension(width, factor),
            decimated_dimension(height, factor),
        )
    }

    /// Full resolution mesh; `intrinsics` are at the frame's resolution
    pub fn build_render_mesh(
        &mut self,
        frame: &DepthFrame,
        intrinsics: &Intrinsics,
    ) -> Result<PointGrid, MeshError> {
        let params = self.params();
        build_grid(
            &mut self.render_topology,
            frame,
            frame.width(),
            frame.height(),
            &params,
            intrinsics,
        )
    }

    /// Decimated mesh; `intrinsics` are at the frame's resolution and get
    /// rescaled to the decimated grid here
    pub fn build_collision_mesh(
        &mut self,
        frame: &DepthFrame,
        intrinsics: &Intrinsics,
    ) -> Result<PointGrid, MeshError> {
        let (width, height) = self.collision_dimensions(frame.width(), frame.height());
        let scaled =
            intrinsics.for_resampled_grid(frame.width(), frame.height(), width, height);
        let params = self.params();

        build_grid(
            &mut self.collision_topology,
            frame,
            width,
            height,
            &params,
            &scaled,
        )
    }

    /// Build the render mesh and, when enabled, the collision mesh
    pub fn build(
        &mut self,
        frame: &DepthFrame,
        intrinsics: &Intrinsics,
    ) -> Result<DepthMesh, MeshError> {
        let render = self.build_render_mesh(frame, intrinsics)?;
        let collision = if self.collision_enabled() {
            Some(self.build_collision_mesh(frame, intrinsics)?)
        } else {
            None
        };

        info!(
            width = render.width,
            height = render.height,
            triangles = render.triangle_count(),
            collision = ?collision.as_ref().map(|c| (c.width, c.height)),
            "Built depth mesh"
        );

        Ok(DepthMesh { render, collision })
    }
}

fn build_grid(
    topology: &mut TriangulationCache,
    frame: &DepthFrame,
    width: usize,
    height: usize,
    params: &UnprojectParams,
    intrinsics: &Intrinsics,
) -> Result<PointGrid, MeshError> {
    let mut points = vec![Point3::ZERO; width.saturating_mul(height)];
    unproject_into(frame, width, height, params, intrinsics, &mut points)?;

    debug!(width, height, "Unprojected depth grid");

    Ok(PointGrid {
        width,
        height,
        points,
        indices: topology.get(width, height),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn settings(decimation: u32) -> MeshSettings {
        MeshSettings {
            min_valid_depth: 0.01,
            invalid_replacement: 5.0,
            collision_decimation: decimation,
        }
    }

    #[test]
    fn test_render_mesh_matches_free_function() {
        let data: Vec<f32> = (0..20).map(|i| 0.5 + i as f32 * 0.1).collect();
        let frame = DepthFrame::new(5, 4, data).unwrap();
        let k = Intrinsics::new(50.0, 50.0, 2.0, 1.5);

        let mut builder = DepthMeshBuilder::new(settings(1));
        let a = builder.build_render_mesh(&frame, &k).unwrap();
        let b = super::super::build_point_grid(
            &frame,
            5,
            4,
            &UnprojectParams {
                min_valid_depth: 0.01,
                invalid_replacement: 5.0,
            },
            &k,
        )
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_index_buffer_reused_across_frames() {
        let k = Intrinsics::new(50.0, 50.0, 2.0, 2.0);
        let mut builder = DepthMeshBuilder::new(settings(2));

        let first = builder
            .build(&DepthFrame::filled(8, 6, 1.0).unwrap(), &k)
            .unwrap();
        let second = builder
            .build(&DepthFrame::filled(8, 6, 2.0).unwrap(), &k)
            .unwrap();

        assert!(Arc::ptr_eq(&first.render.indices, &second.render.indices));
        let (c1, c2) = (first.collision.unwrap(), second.collision.unwrap());
        assert!(Arc::ptr_eq(&c1.indices, &c2.indices));

        // Resolution change regenerates
        let third = builder
            .build(&DepthFrame::filled(6, 6, 2.0).unwrap(), &k)
            .unwrap();
        assert!(!Arc::ptr_eq(&first.render.indices, &third.render.indices));
    }

    #[test]
    fn test_collision_dimensions_and_shape() {
        let frame = DepthFrame::filled(9, 7, 1.0).unwrap();
        let k = Intrinsics::new(50.0, 50.0, 4.0, 3.0);
        let mut builder = DepthMeshBuilder::new(settings(4));

        assert_eq!(builder.collision_dimensions(9, 7), (3, 2));
        let collision = builder.build_collision_mesh(&frame, &k).unwrap();
        assert_eq!(collision.points.len(), 3 * 2);
        assert_eq!(collision.indices.len(), 6 * 2);
    }

    #[test]
    fn test_collision_geometry_matches_render_at_shared_pixels() {
        // 9 -> 5 keeps every second source pixel; with rescaled intrinsics
        // the collision points coincide with the render points they sample
        let data: Vec<f32> = (0..81).map(|i| 1.0 + (i % 7) as f32 * 0.25).collect();
        let frame = DepthFrame::new(9, 9, data).unwrap();
        let k = Intrinsics::new(80.0, 80.0, 4.0, 4.0);
        let mut builder = DepthMeshBuilder::new(settings(2));

        let mesh = builder.build(&frame, &k).unwrap();
        let collision = mesh.collision.unwrap();
        assert_eq!((collision.width, collision.height), (5, 5));

        for v in 0..5 {
            for u in 0..5 {
                let c = collision.point(u, v).unwrap();
                let r = mesh.render.point(u * 2, v * 2).unwrap();
                assert!((c - r).length() < 1e-5, "({}, {}): {:?} vs {:?}", u, v, c, r);
            }
        }
    }

    #[test]
    fn test_collision_disabled() {
        let frame = DepthFrame::filled(4, 4, 1.0).unwrap();
        let k = Intrinsics::new(50.0, 50.0, 2.0, 2.0);
        let mut builder = DepthMeshBuilder::new(settings(1));
        assert!(!builder.collision_enabled());
        assert!(builder.build(&frame, &k).unwrap().collision.is_none());
    }
}
