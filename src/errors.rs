// SPDX-License-Identifier: GPL-3.0-only

//! Error types for depth mesh reconstruction, loading and export

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Top-level error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Reconstruction precondition violations
    Mesh(MeshError),
    /// Depth frame loading errors
    Load(LoadError),
    /// Scene export errors
    Export(ExportError),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Precondition violations of the reconstruction core
///
/// These are programming errors on the caller's side. Invalid depth samples
/// are never reported here, they are substituted silently.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Grid needs at least 2x2 samples to be triangulated
    InvalidDimensions { width: usize, height: usize },
    /// Sample buffer does not hold width * height values
    BufferSizeMismatch { expected: usize, actual: usize },
    /// Focal length is zero, negative or not finite
    InvalidIntrinsics(String),
}

/// Depth file loading errors
#[derive(Debug, Clone)]
pub enum LoadError {
    /// File could not be read
    Io(String),
    /// File contents could not be decoded
    Decode(String),
    /// Extension or pixel layout is not a supported depth format
    UnsupportedFormat(String),
    /// Raw file size does not match the requested dimensions
    SizeMismatch { expected: usize, actual: usize },
    /// Raw files carry no header, dimensions must be given
    MissingDimensions,
}

/// Scene export errors
#[derive(Debug, Clone)]
pub enum ExportError {
    /// Filesystem error
    Io(String),
    /// Encoder failure (glTF JSON, LAS, PNG)
    Encode(String),
    /// Nothing to export
    Empty,
    /// Blocking task failed to join
    Task(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Mesh(e) => write!(f, "Mesh error: {}", e),
            AppError::Load(e) => write!(f, "Load error: {}", e),
            AppError::Export(e) => write!(f, "Export error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::InvalidDimensions { width, height } => {
                write!(f, "Grid {}x{} is too small, need at least 2x2", width, height)
            }
            MeshError::BufferSizeMismatch { expected, actual } => write!(
                f,
                "Depth buffer holds {} samples, expected {}",
                actual, expected
            ),
            MeshError::InvalidIntrinsics(msg) => write!(f, "Invalid intrinsics: {}", msg),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(msg) => write!(f, "Failed to read depth file: {}", msg),
            LoadError::Decode(msg) => write!(f, "Failed to decode depth file: {}", msg),
            LoadError::UnsupportedFormat(msg) => write!(f, "Unsupported depth format: {}", msg),
            LoadError::SizeMismatch { expected, actual } => write!(
                f,
                "Raw depth file is {} bytes, expected {}",
                actual, expected
            ),
            LoadError::MissingDimensions => {
                write!(f, "Raw depth files require --width and --height")
            }
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(msg) => write!(f, "I/O error: {}", msg),
            ExportError::Encode(msg) => write!(f, "Encoding failed: {}", msg),
            ExportError::Empty => write!(f, "Nothing to export"),
            ExportError::Task(msg) => write!(f, "Task join error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for MeshError {}
impl std::error::Error for LoadError {}
impl std::error::Error for ExportError {}

impl From<MeshError> for AppError {
    fn from(err: MeshError) -> Self {
        AppError::Mesh(err)
    }
}

impl From<LoadError> for AppError {
    fn from(err: LoadError) -> Self {
        AppError::Load(err)
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Export(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ExportError {
    fn from(err: tokio::task::JoinError) -> Self {
        ExportError::Task(err.to_string())
    }
}
