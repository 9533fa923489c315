// SPDX-License-Identifier: GPL-3.0-only

//! Depth grid unprojection
//!
//! Every destination pixel is resampled (nearest neighbour) from the source
//! grid, read through a fixed horizontal mirror, and back-projected through
//! the pinhole model. Pixels are independent, so rows are filled in parallel.

use super::{Point3, PointGrid, triangulation};
use crate::depth::{DepthFrame, Intrinsics};
use crate::errors::MeshError;

/// Invalid-depth handling for unprojection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnprojectParams {
    /// Samples strictly below this depth are invalid
    pub min_valid_depth: f32,
    /// Depth used in place of invalid samples
    pub invalid_replacement: f32,
}

impl Default for UnprojectParams {
    fn default() -> Self {
        Self {
            min_valid_depth: crate::constants::DEFAULT_MIN_VALID_DEPTH,
            invalid_replacement: crate::constants::DEFAULT_INVALID_REPLACEMENT,
        }
    }
}

/// Build a point grid of `dst_width x dst_height` from `source`
///
/// `intrinsics` must already be expressed at the destination resolution.
/// The returned grid carries a freshly built index buffer; use
/// [`DepthMeshBuilder`](super::DepthMeshBuilder) to reuse it across frames.
pub fn build_point_grid(
    source: &DepthFrame,
    dst_width: usize,
    dst_height: usize,
    params: &UnprojectParams,
    intrinsics: &Intrinsics,
) -> Result<PointGrid, MeshError> {
    let point_count = check_grid_dimensions(dst_width, dst_height)?;

    let mut points = vec![Point3::ZERO; point_count];
    unproject_into(source, dst_width, dst_height, params, intrinsics, &mut points)?;

    Ok(PointGrid {
        width: dst_width,
        height: dst_height,
        points,
        indices: triangulation::grid_indices(dst_width, dst_height).into(),
    })
}

/// Unproject `source` into a caller-provided `dst_width * dst_height` buffer
pub fn unproject_into(
    source: &DepthFrame,
    dst_width: usize,
    dst_height: usize,
    params: &UnprojectParams,
    intrinsics: &Intrinsics,
    out: &mut [Point3],
) -> Result<(), MeshError> {
    let point_count = check_grid_dimensions(dst_width, dst_height)?;
    if out.len() != point_count {
        return Err(MeshError::BufferSizeMismatch {
            expected: point_count,
            actual: out.len(),
        });
    }
    intrinsics.validate()?;

    let src_width = source.width();
    let src_height = source.height();
    let data = source.data();
    let k = *intrinsics;
    let params = *params;

    let fill_row = |v: usize, row: &mut [Point3]| {
        let src_v = resample_index(v, src_height, dst_height);
        let row_start = src_v * src_width;

        for (u, point) in row.iter_mut().enumerate() {
            let src_u = resample_index(u, src_width, dst_width);
            // Source rows are stored mirrored relative to the unprojection convention
            let mut depth = data[row_start + (src_width - 1 - src_u)];

            // NaN is treated like any other dropout
            if depth.is_nan() || depth < params.min_valid_depth {
                depth = params.invalid_replacement;
            }

            *point = Point3::new(
                (u as f32 - k.cx) * depth / k.fx,
                (v as f32 - k.cy) * depth / k.fy,
                depth,
            );
        }
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        out.par_chunks_mut(dst_width)
            .enumerate()
            .for_each(|(v, row)| fill_row(v, row));
    }

    #[cfg(not(feature = "parallel"))]
    {
        out.chunks_mut(dst_width)
            .enumerate()
            .for_each(|(v, row)| fill_row(v, row));
    }

    Ok(())
}

/// Map destination coordinate `i` onto the source axis (nearest sample)
///
/// `round(i * (src - 1) / (dst - 1))` with ties rounded to even. The integer
/// product keeps exact ties exact before the division.
fn resample_index(i: usize, src_len: usize, dst_len: usize) -> usize {
    if src_len == dst_len {
        return i;
    }
    let pos = (i * (src_len - 1)) as f64 / (dst_len - 1) as f64;
    (pos.round_ties_even() as usize).min(src_len - 1)
}

/// Validate a destination grid and return its point count
fn check_grid_dimensions(width: usize, height: usize) -> Result<usize, MeshError> {
    if width <= 1 || height <= 1 {
        return Err(MeshError::InvalidDimensions { width, height });
    }
    // Indices are u32
    match width.checked_mul(height) {
        Some(n) if n <= u32::MAX as usize => Ok(n),
        _ => Err(MeshError::InvalidDimensions { width, height }),
    }
}
