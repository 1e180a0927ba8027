// error.rs — error taxonomy for the sphere, its textures and its draw calls

use std::path::PathBuf;

use thiserror::Error;

/// Invalid input handed to the core. Never clamped or defaulted.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigurationError {
    #[error("sphere needs at least 2 stacks, got {0}")]
    TooFewStacks(u32),

    #[error("sphere needs at least 3 slices, got {0}")]
    TooFewSlices(u32),

    #[error("sphere radius must be a finite value > 0, got {0}")]
    InvalidRadius(f32),

    #[error("direction vector is zero or not finite, azimuth is undefined")]
    ZeroDirection,

    #[error("image dimensions must be > 0, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Texture acquisition failure, during construction or swap.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("decoded image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("texture upload rejected: {0}")]
    Upload(String),
}

/// Graphics context invalid or draw call rejected. Reported, never retried.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("draw rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum SphereError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
