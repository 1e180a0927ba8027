// mapping.rs — equirectangular direction <-> texture/pixel mapping
//
// Same formula family as the mesh builder, evaluated continuously:
//   u = azimuth / 2π   with azimuth = atan2(z, x) in [0, 2π)
//   v = polar / π      with polar   = atan2(hypot(x, z), y), i.e. acos(y) for unit input
// Pixel (0, 0) is the top-left corner of the source image.

use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::error::ConfigurationError;

/// Continuous pixel position in the source image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelCoord {
    pub x: f32,
    pub y: f32,
}

/// Texture coordinate for a direction from the sphere centre.
///
/// Any non-zero finite vector is accepted regardless of its length. Zero or
/// non-finite vectors have no azimuth and are rejected.
pub fn tex_coord_from_direction(direction: Vec3) -> Result<Vec2, ConfigurationError> {
    if direction == Vec3::ZERO || !direction.is_finite() {
        return Err(ConfigurationError::ZeroDirection);
    }

    // Ratios of components only, so no length is ever formed and huge or
    // tiny vectors do not overflow or flush to zero.
    let polar = direction.x.hypot(direction.z).atan2(direction.y);
    let mut azimuth = direction.z.atan2(direction.x);
    if azimuth < 0.0 {
        azimuth += TAU;
    }

    Ok(Vec2::new(azimuth / TAU, polar / PI))
}

/// Unit direction for a texture coordinate. Inverse of [`tex_coord_from_direction`].
pub fn direction_from_tex_coord(tex_coord: Vec2) -> Vec3 {
    let azimuth = tex_coord.x * TAU;
    let polar = tex_coord.y * PI;
    let ring = polar.sin();
    Vec3::new(ring * azimuth.cos(), polar.cos(), ring * azimuth.sin())
}

/// Source image pixel hit by `direction`.
///
/// Both axes clamp into `[0, dimension - 1]`; `u == 1.0` clamps to the last
/// column rather than wrapping to column 0.
pub fn pixel_from_direction(
    direction: Vec3,
    width: u32,
    height: u32,
) -> Result<PixelCoord, ConfigurationError> {
    check_dimensions(width, height)?;
    let uv = tex_coord_from_direction(direction)?;

    let (w, h) = (width as f32, height as f32);
    Ok(PixelCoord {
        x: (uv.x * w).clamp(0.0, w - 1.0),
        y: (uv.y * h).clamp(0.0, h - 1.0),
    })
}

/// Unit direction through a source image pixel, for placing annotations.
pub fn direction_from_pixel(
    pixel: PixelCoord,
    width: u32,
    height: u32,
) -> Result<Vec3, ConfigurationError> {
    check_dimensions(width, height)?;
    let uv = Vec2::new(pixel.x / width as f32, pixel.y / height as f32);
    Ok(direction_from_tex_coord(uv))
}

fn check_dimensions(width: u32, height: u32) -> Result<(), ConfigurationError> {
    if width == 0 || height == 0 {
        return Err(ConfigurationError::EmptyImage { width, height });
    }
    Ok(())
}
