// SPDX-License-Identifier: GPL-3.0-only

//! Output pipelines
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌────────────────┐
//! │ Depth Frame  │ ──▶ │ DepthMeshBuilder  │ ──▶ │ Scene Export   │
//! │  (metres)    │     │  - render grid    │     │  - depth.png   │
//! │              │     │  - collision grid │     │  - *.glb       │
//! │              │     │                   │     │  - *.las       │
//! └──────────────┘     └───────────────────┘     └────────────────┘
//! ```
//!
//! Encoding and file writes run on tokio's blocking pool.
//!
//! - [`scene`]: GLB mesh, LAS point cloud and depth preview export

pub mod scene;
