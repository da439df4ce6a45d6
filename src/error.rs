//! Error types for Tidepool.
//!
//! The simulation itself never fails: a missing source image degrades to a
//! placeholder field and a degenerate surface simply yields no portrait.
//! These errors surface only at the edges, when loading sources and
//! configuration or bringing up the viewer's GPU presenter.

use std::fmt;

/// Errors that can occur while loading a source image.
#[derive(Debug)]
pub enum SourceError {
    /// Failed to read the file from disk.
    Io(std::io::Error),
    /// The bytes could not be decoded as an image.
    Decode(image::ImageError),
    /// The image decoded but has no pixels.
    EmptyImage,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Io(e) => write!(f, "Failed to read source image: {}", e),
            SourceError::Decode(e) => write!(f, "Failed to decode source image: {}", e),
            SourceError::EmptyImage => write!(f, "Source image has zero width or height"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Io(e) => Some(e),
            SourceError::Decode(e) => Some(e),
            SourceError::EmptyImage => None,
        }
    }
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        SourceError::Io(e)
    }
}

impl From<image::ImageError> for SourceError {
    fn from(e: image::ImageError) -> Self {
        // image reports missing files as its own IoError; keep them as Io.
        match e {
            image::ImageError::IoError(io) => SourceError::Io(io),
            other => SourceError::Decode(other),
        }
    }
}

/// Errors that can occur while loading or validating a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the file.
    Io(std::io::Error),
    /// The file is not valid configuration JSON.
    Parse(serde_json::Error),
    /// A value is out of its usable range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Errors that can occur during GPU initialization.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            GpuError::NoAdapter => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur when running the viewer.
#[derive(Debug)]
pub enum ViewerError {
    /// Failed to create the event loop or it exited abnormally.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create the window.
    Window(winit::error::OsError),
    /// GPU initialization failed.
    Gpu(GpuError),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            ViewerError::Window(e) => write!(f, "Failed to create window: {}", e),
            ViewerError::Gpu(e) => write!(f, "GPU error: {}", e),
        }
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::EventLoop(e) => Some(e),
            ViewerError::Window(e) => Some(e),
            ViewerError::Gpu(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for ViewerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ViewerError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for ViewerError {
    fn from(e: winit::error::OsError) -> Self {
        ViewerError::Window(e)
    }
}

impl From<GpuError> for ViewerError {
    fn from(e: GpuError) -> Self {
        ViewerError::Gpu(e)
    }
}
