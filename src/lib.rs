// SPDX-License-Identifier: GPL-3.0-only

//! depth-mesh - depth image to 3D mesh reconstruction
//!
//! Converts single-channel depth images plus pinhole intrinsics into regular
//! point grids with a fixed triangulation (full detail for rendering,
//! decimated for collision), and smooths noisy tracked signals with a
//! One-Euro filter.
//!
//! # Architecture
//!
//! - [`depth`]: Depth frames, intrinsics and file loaders
//! - [`mesh`]: Unprojection, triangulation and the per-frame builder
//! - [`filters`]: One-Euro low-pass filter
//! - [`pipelines`]: Scene export (GLB, LAS, depth preview)
//! - [`config`]: User configuration
//!
//! # Example
//!
//! ```
//! use depth_mesh::{DepthFrame, DepthMeshBuilder, Intrinsics, config::MeshSettings};
//!
//! let frame = DepthFrame::filled(4, 4, 2.0).unwrap();
//! let intrinsics = Intrinsics::new(100.0, 100.0, 2.0, 2.0);
//! let mut builder = DepthMeshBuilder::new(MeshSettings::default());
//! let mesh = builder.build(&frame, &intrinsics).unwrap();
//! assert_eq!(mesh.render.points.len(), 16);
//! ```

pub mod config;
pub mod constants;
pub mod depth;
pub mod errors;
pub mod filters;
pub mod mesh;
pub mod pipelines;

// Re-export commonly used types
pub use config::Config;
pub use depth::{DepthFrame, Intrinsics};
pub use errors::{AppError, AppResult};
pub use filters::OneEuroFilter;
pub use mesh::{DepthMesh, DepthMeshBuilder, Point3, PointGrid, UnprojectParams, build_point_grid};
