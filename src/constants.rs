// SPDX-License-Identifier: GPL-3.0-only

//! Crate-wide constants and defaults

/// Depth values strictly below this (metres) are treated as sensor dropout
pub const DEFAULT_MIN_VALID_DEPTH: f32 = 0.01;

/// Depth substituted for invalid samples (metres)
pub const DEFAULT_INVALID_REPLACEMENT: f32 = 5.0;

/// Per-axis decimation factor for the collision mesh (1 = no collision mesh)
pub const DEFAULT_COLLISION_DECIMATION: u32 = 4;

/// Depth range used for the grayscale preview (metres)
pub const PREVIEW_MIN_DEPTH: f32 = 0.4;
pub const PREVIEW_MAX_DEPTH: f32 = 4.0;

/// Millimetres per metre, for 16-bit depth images
pub const MM_PER_METER: f32 = 1000.0;

/// One-Euro filter constants
pub mod one_euro {
    /// Fixed cutoff (Hz) for the derivative low-pass
    pub const D_CUTOFF: f32 = 1.0;
    /// Timestamps closer than this are treated as duplicates
    pub const MIN_DT: f32 = 1e-5;
    /// Default minimum cutoff frequency (Hz)
    pub const DEFAULT_MIN_CUTOFF: f32 = 1.0;
    /// Default speed coefficient
    pub const DEFAULT_BETA: f32 = 0.0;
}

/// Default pinhole intrinsics for a Kinect-class depth sensor
///
/// Reference resolution: 640x480. Rescale with
/// [`Intrinsics::for_resolution`](crate::depth::Intrinsics::for_resolution)
/// for other frame sizes.
pub mod kinect {
    /// Focal length X (pixels) at 640x480 base resolution
    pub const FX: f32 = 594.21;
    /// Focal length Y (pixels) at 640x480 base resolution
    pub const FY: f32 = 591.04;
    /// Principal point X (pixels) at 640x480 base resolution
    pub const CX: f32 = 339.5;
    /// Principal point Y (pixels) at 640x480 base resolution
    pub const CY: f32 = 242.7;

    /// Base width for intrinsics calculation
    pub const BASE_WIDTH: u32 = 640;
    /// Base height for intrinsics calculation
    pub const BASE_HEIGHT: u32 = 480;
}

/// Application information utilities
pub mod app_info {
    /// Version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }

    /// Generator string written into exported files
    pub fn generator() -> String {
        format!("depth-mesh {}", version())
    }
}

/// Output grid dimension for a decimation factor
///
/// Never drops below 2 so the decimated grid can still be triangulated.
pub fn decimated_dimension(source: usize, factor: u32) -> usize {
    let factor = factor.max(1) as usize;
    source.div_ceil(factor).max(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimated_dimension() {
        assert_eq!(decimated_dimension(640, 4), 160);
        assert_eq!(decimated_dimension(641, 4), 161);
        assert_eq!(decimated_dimension(640, 1), 640);
        assert_eq!(decimated_dimension(640, 0), 640);
        // Tiny grids still produce a 2x2 minimum
        assert_eq!(decimated_dimension(3, 8), 2);
    }

    #[test]
    fn test_generator_contains_version() {
        assert!(app_info::generator().contains(app_info::version()));
    }
}
