//! Textured UV sphere for viewing equirectangular panoramas from the inside,
//! with the inverse mapping from a view direction back to a source pixel.

pub mod camera;
pub mod config;
pub mod error;
pub mod mapping;
pub mod mesh;
pub mod renderer;
pub mod sphere;
pub mod texture;

pub use error::{ConfigurationError, RenderError, ResourceError, SphereError};
pub use mapping::{pixel_from_direction, PixelCoord};
pub use mesh::{build_sphere, Mesh, SphereSpec, Vertex};
pub use sphere::{PanoramaSphere, RenderBackend};
pub use texture::{TextureResource, TextureSource};
