// sphere.rs — the panorama sphere: spec + mesh + current texture

use glam::Vec3;
use image::RgbaImage;
use log::info;

use crate::error::{ConfigurationError, RenderError, ResourceError, SphereError};
use crate::mapping::{self, PixelCoord};
use crate::mesh::{build_sphere, Mesh, SphereSpec};
use crate::texture::{self, TextureResource, TextureSource};

/// Device side of the sphere. Owns the graphics context; the sphere only
/// holds the handles it hands out. Dropping a handle releases it.
pub trait RenderBackend {
    type Geometry;
    type Texture;

    fn upload_mesh(&mut self, mesh: &Mesh) -> Result<Self::Geometry, RenderError>;

    fn upload_texture(&mut self, image: &RgbaImage) -> Result<Self::Texture, ResourceError>;

    fn draw(&mut self, geometry: &Self::Geometry, texture: &Self::Texture)
        -> Result<(), RenderError>;
}

pub struct PanoramaSphere<B: RenderBackend> {
    spec: SphereSpec,
    mesh: Mesh,
    geometry: B::Geometry,
    texture: TextureResource<B::Texture>,
}

impl<B: RenderBackend> PanoramaSphere<B> {
    pub fn new(
        backend: &mut B,
        stacks: u32,
        slices: u32,
        radius: f32,
        initial_texture: impl Into<TextureSource>,
    ) -> Result<Self, SphereError> {
        let spec = SphereSpec::new(stacks, slices, radius)?;
        Self::with_spec(backend, spec, initial_texture)
    }

    pub fn with_spec(
        backend: &mut B,
        spec: SphereSpec,
        initial_texture: impl Into<TextureSource>,
    ) -> Result<Self, SphereError> {
        let texture = acquire_texture(backend, initial_texture.into())?;
        let mesh = build_sphere(&spec);
        let geometry = backend.upload_mesh(&mesh)?;

        info!(
            "panorama sphere ready: {}x{} r={}, texture {}x{}",
            spec.stacks(),
            spec.slices(),
            spec.radius(),
            texture.width(),
            texture.height()
        );

        Ok(Self {
            spec,
            mesh,
            geometry,
            texture,
        })
    }

    pub fn render(&self, backend: &mut B) -> Result<(), RenderError> {
        backend.draw(&self.geometry, self.texture.handle())
    }

    /// Replace the texture. On failure the current one stays bound.
    pub fn swap_texture(
        &mut self,
        backend: &mut B,
        source: impl Into<TextureSource>,
    ) -> Result<(), ResourceError> {
        let texture = acquire_texture(backend, source.into())?;
        info!(
            "swapped panorama texture {}x{} -> {}x{}",
            self.texture.width(),
            self.texture.height(),
            texture.width(),
            texture.height()
        );
        self.texture = texture;
        Ok(())
    }

    /// Rebuild and re-upload the geometry. The texture is left alone.
    pub fn retessellate(&mut self, backend: &mut B, spec: SphereSpec) -> Result<(), SphereError> {
        let mesh = build_sphere(&spec);
        let geometry = backend.upload_mesh(&mesh)?;
        self.spec = spec;
        self.mesh = mesh;
        self.geometry = geometry;
        Ok(())
    }

    /// Source image pixel seen along `direction` from the sphere centre.
    pub fn image_pixel_from_vector(&self, direction: Vec3) -> Result<PixelCoord, ConfigurationError> {
        let (width, height) = self.texture.dimensions();
        mapping::pixel_from_direction(direction, width, height)
    }

    /// Direction from the centre through a source image pixel.
    pub fn vector_from_image_pixel(&self, pixel: PixelCoord) -> Result<Vec3, ConfigurationError> {
        let (width, height) = self.texture.dimensions();
        mapping::direction_from_pixel(pixel, width, height)
    }

    pub fn spec(&self) -> &SphereSpec {
        &self.spec
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn texture(&self) -> &TextureResource<B::Texture> {
        &self.texture
    }
}

fn acquire_texture<B: RenderBackend>(
    backend: &mut B,
    source: TextureSource,
) -> Result<TextureResource<B::Texture>, ResourceError> {
    let image = texture::decode(source)?;
    let (width, height) = image.dimensions();
    let handle = backend.upload_texture(&image)?;
    Ok(TextureResource::new(handle, width, height))
}
