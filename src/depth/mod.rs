// SPDX-License-Identifier: GPL-3.0-only

//! Depth frames and pinhole intrinsics
//!
//! A [`DepthFrame`] is a row-major grid of depth samples in metres with the
//! first row at the top of the image. Frames are read-only inputs to the
//! reconstruction and may change resolution from one capture to the next.

mod loader;

pub use loader::{DepthFileFormat, load_depth, load_depth_png, load_depth_raw};

use crate::errors::MeshError;
use serde::{Deserialize, Serialize};

/// Single-channel depth image (metres)
#[derive(Debug, Clone, PartialEq)]
pub struct DepthFrame {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl DepthFrame {
    /// Create a frame from row-major samples
    ///
    /// Rejects grids smaller than 2x2 and buffers that don't hold exactly
    /// `width * height` samples.
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, MeshError> {
        if width <= 1 || height <= 1 {
            return Err(MeshError::InvalidDimensions { width, height });
        }
        let expected = width * height;
        if data.len() != expected {
            return Err(MeshError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Frame with every sample set to `depth`
    pub fn filled(width: usize, height: usize, depth: f32) -> Result<Self, MeshError> {
        Self::new(width, height, vec![depth; width.saturating_mul(height)])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major samples
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Sample at column `x`, row `y`
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Count valid/invalid samples against a validity threshold
    pub fn stats(&self, min_valid_depth: f32) -> DepthStats {
        let mut stats = DepthStats {
            total: self.data.len(),
            ..Default::default()
        };

        for &d in &self.data {
            // NaN compares false and lands in the invalid bucket
            if d >= min_valid_depth {
                stats.valid += 1;
                stats.min_depth = Some(stats.min_depth.map_or(d, |m| m.min(d)));
                stats.max_depth = Some(stats.max_depth.map_or(d, |m| m.max(d)));
            } else {
                stats.invalid += 1;
            }
        }

        stats
    }
}

/// Summary of a depth frame's samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DepthStats {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    /// Nearest valid sample, if any
    pub min_depth: Option<f32>,
    /// Farthest valid sample, if any
    pub max_depth: Option<f32>,
}

impl DepthStats {
    /// Fraction of valid samples in `[0, 1]`
    pub fn valid_ratio(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.valid as f32 / self.total as f32
        }
    }
}

/// Pinhole camera intrinsics in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Intrinsics {
    /// Focal length X
    pub fx: f32,
    /// Focal length Y
    pub fy: f32,
    /// Principal point X
    pub cx: f32,
    /// Principal point Y
    pub cy: f32,
}

impl Intrinsics {
    pub fn new(fx: f32, fy: f32, cx: f32, cy: f32) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Multiply focal length and principal point by per-axis factors
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self {
            fx: self.fx * sx,
            fy: self.fy * sy,
            cx: self.cx * sx,
            cy: self.cy * sy,
        }
    }

    /// Rescale intrinsics calibrated at `src` to a sensor mode of size `dst`
    pub fn for_resolution(
        &self,
        src_width: usize,
        src_height: usize,
        dst_width: usize,
        dst_height: usize,
    ) -> Self {
        self.scaled(
            dst_width as f32 / src_width as f32,
            dst_height as f32 / src_height as f32,
        )
    }

    /// Rescale intrinsics for a grid resampled from `src` to `dst`
    ///
    /// Resampling maps the first and last destination pixel onto the first
    /// and last source pixel, so the pixel pitch scales by
    /// `(dst - 1) / (src - 1)` rather than `dst / src`.
    pub fn for_resampled_grid(
        &self,
        src_width: usize,
        src_height: usize,
        dst_width: usize,
        dst_height: usize,
    ) -> Self {
        let ratio = |dst: usize, src: usize| {
            if src <= 1 {
                1.0
            } else {
                dst.saturating_sub(1) as f32 / (src - 1) as f32
            }
        };
        self.scaled(ratio(dst_width, src_width), ratio(dst_height, src_height))
    }

    /// Reject focal lengths that would blow up the unprojection
    pub fn validate(&self) -> Result<(), MeshError> {
        for (name, f) in [("fx", self.fx), ("fy", self.fy)] {
            if !f.is_finite() || f <= 0.0 {
                return Err(MeshError::InvalidIntrinsics(format!(
                    "{} must be positive and finite, got {}",
                    name, f
                )));
            }
        }
        for (name, c) in [("cx", self.cx), ("cy", self.cy)] {
            if !c.is_finite() {
                return Err(MeshError::InvalidIntrinsics(format!(
                    "{} must be finite, got {}",
                    name, c
                )));
            }
        }
        Ok(())
    }
}
