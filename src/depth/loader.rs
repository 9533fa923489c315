// SPDX-License-Identifier: GPL-3.0-only

//! Depth frame loading
//!
//! Two on-disk layouts are supported:
//! - 16-bit grayscale PNG with depth in millimetres (0 = no return)
//! - headerless little-endian `f32` metres, dimensions supplied by the caller

use super::DepthFrame;
use crate::constants::MM_PER_METER;
use crate::errors::LoadError;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// On-disk depth layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFileFormat {
    /// 16-bit grayscale PNG, millimetres
    Png16,
    /// Raw little-endian f32, metres
    RawF32,
}

impl DepthFileFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png16),
            "raw" | "f32" | "bin" => Some(Self::RawF32),
            _ => None,
        }
    }
}

impl FromStr for DepthFileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" | "png16" => Ok(Self::Png16),
            "raw" | "f32" | "raw-f32" => Ok(Self::RawF32),
            other => Err(format!(
                "unknown depth format '{}' (expected png16 or raw-f32)",
                other
            )),
        }
    }
}

/// Load a depth frame, inferring the format from the extension when not given
pub fn load_depth(
    path: &Path,
    format: Option<DepthFileFormat>,
    dimensions: Option<(usize, usize)>,
) -> Result<DepthFrame, LoadError> {
    let format = match format.or_else(|| DepthFileFormat::from_path(path)) {
        Some(format) => format,
        None => {
            return Err(LoadError::UnsupportedFormat(format!(
                "cannot infer format of {}",
                path.display()
            )));
        }
    };

    debug!(path = %path.display(), ?format, "Loading depth frame");

    let frame = match format {
        DepthFileFormat::Png16 => load_depth_png(path)?,
        DepthFileFormat::RawF32 => {
            let (width, height) = dimensions.ok_or(LoadError::MissingDimensions)?;
            load_depth_raw(path, width, height)?
        }
    };

    info!(
        path = %path.display(),
        width = frame.width(),
        height = frame.height(),
        "Loaded depth frame"
    );

    Ok(frame)
}

/// Load a 16-bit millimetre depth PNG as metres
pub fn load_depth_png(path: &Path) -> Result<DepthFrame, LoadError> {
    let img = image::open(path).map_err(|e| LoadError::Decode(e.to_string()))?;
    let color = img.color();

    let image::DynamicImage::ImageLuma16(gray) = img else {
        return Err(LoadError::UnsupportedFormat(format!(
            "{} is {:?}, expected 16-bit grayscale",
            path.display(),
            color
        )));
    };

    let width = gray.width() as usize;
    let height = gray.height() as usize;
    let data: Vec<f32> = gray
        .into_raw()
        .into_iter()
        .map(|mm| mm as f32 / MM_PER_METER)
        .collect();

    DepthFrame::new(width, height, data).map_err(|e| LoadError::Decode(e.to_string()))
}

/// Load headerless little-endian f32 depth in metres
pub fn load_depth_raw(path: &Path, width: usize, height: usize) -> Result<DepthFrame, LoadError> {
    let bytes = std::fs::read(path)?;

    let expected = width * height * std::mem::size_of::<f32>();
    if bytes.len() != expected {
        return Err(LoadError::SizeMismatch {
            expected,
            actual: bytes.len(),
        });
    }

    let data: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    DepthFrame::new(width, height, data).map_err(|e| LoadError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("depth_mesh_loader_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DepthFileFormat::from_path(Path::new("a/depth.PNG")),
            Some(DepthFileFormat::Png16)
        );
        assert_eq!(
            DepthFileFormat::from_path(Path::new("depth.raw")),
            Some(DepthFileFormat::RawF32)
        );
        assert_eq!(DepthFileFormat::from_path(Path::new("depth.exr")), None);
        assert_eq!(DepthFileFormat::from_path(Path::new("depth")), None);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("png16".parse(), Ok(DepthFileFormat::Png16));
        assert_eq!("RAW-F32".parse(), Ok(DepthFileFormat::RawF32));
        assert!("tiff".parse::<DepthFileFormat>().is_err());
    }

    #[test]
    fn test_load_raw() {
        let path = temp_path("ok.raw");
        let samples = [0.5f32, 1.0, 1.5, 2.0, 2.5, 3.0];
        let bytes: Vec<u8> = samples.iter().flat_map(|f| f.to_le_bytes()).collect();
        std::fs::write(&path, bytes).unwrap();

        let frame = load_depth(&path, None, Some((3, 2))).unwrap();
        assert_eq!(frame.width(), 3);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.data(), &samples);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_raw_size_mismatch() {
        let path = temp_path("short.raw");
        std::fs::write(&path, [0u8; 12]).unwrap();

        match load_depth_raw(&path, 2, 2) {
            Err(LoadError::SizeMismatch { expected, actual }) => {
                assert_eq!(expected, 16);
                assert_eq!(actual, 12);
            }
            other => panic!("expected size mismatch, got {:?}", other),
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_raw_requires_dimensions() {
        let result = load_depth(Path::new("whatever.raw"), None, None);
        assert!(matches!(result, Err(LoadError::MissingDimensions)));
    }

    #[test]
    fn test_load_png16_converts_to_meters() {
        let path = temp_path("depth.png");
        let img = image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::from_raw(
            2,
            2,
            vec![0, 1000, 2500, 400],
        )
        .unwrap();
        img.save(&path).unwrap();

        let frame = load_depth_png(&path).unwrap();
        assert_eq!(frame.data(), &[0.0, 1.0, 2.5, 0.4]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_png8_rejected() {
        let path = temp_path("gray8.png");
        let img = image::GrayImage::from_raw(2, 2, vec![0, 1, 2, 3]).unwrap();
        img.save(&path).unwrap();

        assert!(matches!(
            load_depth_png(&path),
            Err(LoadError::UnsupportedFormat(_))
        ));

        let _ = std::fs::remove_file(&path);
    }
}
