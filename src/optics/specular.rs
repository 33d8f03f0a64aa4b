//! Specular rim highlight for the glass outline.
//!
//! A thin band just inside the outline is lit by a directional light. The
//! band's brightness follows a semicircle across its width and scales with
//! how squarely the outline faces the light (both sides of the glass catch
//! it). The output is an RGBA8 layer composited over the refracted image.

use serde::Deserialize;

use super::Vec2;
use super::raster::{RasterBuffer, RasterError, RoundedRect, byte_len, for_each_row};

/// Options for [`compute_specular_2d`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpecularOptions {
    /// Light direction in radians, counter-clockwise from +x on screen.
    pub angle: f64,
    /// Width of the lit band in pixels.
    pub rim_width: f64,
}

impl Default for SpecularOptions {
    fn default() -> Self {
        Self {
            angle: std::f64::consts::FRAC_PI_3,
            rim_width: 1.5,
        }
    }
}

impl SpecularOptions {
    #[must_use]
    pub const fn angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    #[must_use]
    pub const fn rim_width(mut self, rim_width: f64) -> Self {
        self.rim_width = rim_width;
        self
    }

    /// Screen-space light direction (`y` down).
    #[must_use]
    pub fn light(&self) -> Vec2 {
        Vec2::new(self.angle.cos(), -self.angle.sin())
    }
}

/// Intensity in `[0, 1]` at `p` (relative to the shape's centre).
#[must_use]
pub fn specular_intensity(shape: &RoundedRect, p: Vec2, options: &SpecularOptions) -> f64 {
    if !(options.rim_width > 0.0) {
        return 0.0;
    }
    let (distance, normal) = shape.signed_distance(p);
    if distance >= 0.0 {
        return 0.0;
    }
    let depth = -distance;
    if depth >= options.rim_width {
        return 0.0;
    }

    let s = 2.0 * depth / options.rim_width - 1.0;
    let band = (1.0 - s * s).max(0.0).sqrt();
    (normal.dot(options.light()).abs() * band).clamp(0.0, 1.0)
}

/// Render the rim highlight of `shape` centred in a `width` x `height` raster.
/// Unlit pixels are fully transparent black.
///
/// # Errors
/// Returns [`RasterError::TooLarge`] when the raster size overflows.
pub fn compute_specular_2d(
    width: usize,
    height: usize,
    shape: &RoundedRect,
    options: &SpecularOptions,
) -> Result<RasterBuffer, RasterError> {
    byte_len(width, height)?;
    log::debug!(
        "specular: {width}x{height} raster, angle {} rad, rim {} px",
        options.angle,
        options.rim_width
    );

    let mut raster = RasterBuffer::filled(width, height, [0, 0, 0, 0])?;
    let cx = width as f64 * 0.5;
    let cy = height as f64 * 0.5;

    for_each_row(&mut raster.data, width * 4, |y, row| {
        let py = y as f64 + 0.5 - cy;
        for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
            let intensity = specular_intensity(shape, Vec2::new(x as f64 + 0.5 - cx, py), options);
            if intensity <= 0.0 {
                continue;
            }
            let color = (intensity * 255.0).round() as u8;
            pixel[0] = color;
            pixel[1] = color;
            pixel[2] = color;
            pixel[3] = (intensity * intensity * 255.0).round() as u8;
        }
    });

    Ok(raster)
}
