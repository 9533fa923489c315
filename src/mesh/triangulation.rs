// SPDX-License-Identifier: GPL-3.0-only

//! Regular-grid triangulation
//!
//! The index buffer only depends on the grid resolution, so it is built once
//! and reused across frames until the resolution changes.

use std::sync::Arc;
use tracing::debug;

/// Number of indices for a `width x height` grid (two triangles per cell)
pub fn triangle_index_count(width: usize, height: usize) -> usize {
    6 * width.saturating_sub(1) * height.saturating_sub(1)
}

/// Build the index buffer for a `width x height` point grid
///
/// Cell `(u, v)` with corners `i0 = v*w+u`, `i1 = i0+1`, `i2 = i0+w`,
/// `i3 = i2+1` emits `(i0, i2, i1)` and `(i1, i2, i3)`.
pub fn grid_indices(width: usize, height: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(triangle_index_count(width, height));

    for v in 0..height.saturating_sub(1) {
        for u in 0..width.saturating_sub(1) {
            let i0 = (v * width + u) as u32;
            let i1 = i0 + 1;
            let i2 = i0 + width as u32;
            let i3 = i2 + 1;

            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    indices
}

/// Caches the index buffer for the most recent grid resolution
#[derive(Debug, Default)]
pub struct TriangulationCache {
    width: usize,
    height: usize,
    indices: Option<Arc<[u32]>>,
}

impl TriangulationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index buffer for `width x height`, regenerated only on resolution change
    pub fn get(&mut self, width: usize, height: usize) -> Arc<[u32]> {
        if self.width == width && self.height == height {
            if let Some(indices) = &self.indices {
                return Arc::clone(indices);
            }
        }

        debug!(width, height, "Regenerating grid triangulation");

        let indices: Arc<[u32]> = grid_indices(width, height).into();
        self.width = width;
        self.height = height;
        self.indices = Some(Arc::clone(&indices));
        indices
    }

    /// Resolution of the cached buffer, if any
    pub fn resolution(&self) -> Option<(usize, usize)> {
        self.indices.as_ref().map(|_| (self.width, self.height))
    }
}
