// texture.rs — image sources, decoding and the texture handle owned by a sphere

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::io::Reader as ImageReader;
use image::{DynamicImage, RgbaImage};
use log::debug;

use crate::error::ResourceError;

/// Where a panorama comes from: a file on disk or an already decoded image.
#[derive(Debug, Clone)]
pub enum TextureSource {
    FilePath(PathBuf),
    Decoded(RgbaImage),
}

impl From<PathBuf> for TextureSource {
    fn from(path: PathBuf) -> Self {
        TextureSource::FilePath(path)
    }
}

impl From<&Path> for TextureSource {
    fn from(path: &Path) -> Self {
        TextureSource::FilePath(path.to_path_buf())
    }
}

impl From<RgbaImage> for TextureSource {
    fn from(image: RgbaImage) -> Self {
        TextureSource::Decoded(image)
    }
}

impl From<DynamicImage> for TextureSource {
    fn from(image: DynamicImage) -> Self {
        TextureSource::Decoded(image.to_rgba8())
    }
}

/// Produce RGBA8 pixels for `source`, reading and decoding files as needed.
pub fn decode(source: TextureSource) -> Result<RgbaImage, ResourceError> {
    let image = match source {
        TextureSource::FilePath(path) => load_image(&path)?,
        TextureSource::Decoded(image) => image,
    };

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ResourceError::EmptyImage { width, height });
    }
    Ok(image)
}

fn load_image(path: &Path) -> Result<RgbaImage, ResourceError> {
    let open_err = |source| ResourceError::Open {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(open_err)?;
    let mut reader = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(open_err)?;
    // Panoramas routinely exceed the default decoder allocation limit.
    reader.no_limits();

    let image = reader.decode()?;
    debug!(
        "decoded {:?}: {}x{}",
        path,
        image.width(),
        image.height()
    );
    Ok(image.to_rgba8())
}

/// Backend texture handle plus the pixel size of the image it was made from.
///
/// The size is that of the decoded source, even if the backend stored a
/// downscaled copy, so pixel queries always refer to the source image.
#[derive(Debug)]
pub struct TextureResource<T> {
    handle: T,
    width: u32,
    height: u32,
}

impl<T> TextureResource<T> {
    pub fn new(handle: T, width: u32, height: u32) -> Self {
        Self {
            handle,
            width,
            height,
        }
    }

    pub fn handle(&self) -> &T {
        &self.handle
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
