//! Two-dimensional displacement maps for a rounded-rectangle glass.
//!
//! Building a map is a two-pass operation:
//! 1. [`build_field_2d`] computes a displacement vector per pixel and the
//!    largest vector length over the whole field;
//! 2. [`encode_field`] normalizes every vector against a maximum and writes
//!    an RGBA8 buffer.
//!
//! The encoding is relative, so pass 2 cannot start before pass 1 finished.
//!
//! # Byte layout
//!
//! Row-major RGBA, 4 bytes per pixel. `R = 128 + round(dx / max * 127)`,
//! `G = 128 + round(dy / max * 127)`, both clamped to `[0, 255]`; `B` and
//! `A` are always `255`. A pixel without displacement is `(128, 128, 255, 255)`.

use serde::Serialize;

use super::Vec2;
use super::field::lookup_displacement;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Channel value meaning "no displacement".
pub const NEUTRAL_CHANNEL: u8 = 128;
/// Half range of a signed channel.
pub const CHANNEL_SCALE: f64 = 127.0;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RasterError {
    #[error("raster of {width}x{height} pixels does not fit in memory")]
    TooLarge { width: usize, height: usize },
    #[error("`{field}` must be finite and not negative (got {value})")]
    InvalidShape { field: &'static str, value: f64 },
}

/// Glass outline: a rounded rectangle with a bevel band along its border.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoundedRect {
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
    pub bevel_width: f64,
}

impl RoundedRect {
    /// # Errors
    /// Returns [`RasterError::InvalidShape`] for negative or non-finite sizes.
    pub fn new(
        width: f64,
        height: f64,
        corner_radius: f64,
        bevel_width: f64,
    ) -> Result<Self, RasterError> {
        for (field, value) in [
            ("object_width", width),
            ("object_height", height),
            ("corner_radius", corner_radius),
            ("bevel_width", bevel_width),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(RasterError::InvalidShape { field, value });
            }
        }
        Ok(Self {
            width,
            height,
            corner_radius,
            bevel_width,
        })
    }

    /// Corner radius limited to half of the shorter side.
    #[must_use]
    pub fn effective_radius(&self) -> f64 {
        self.corner_radius
            .min(self.width.min(self.height) * 0.5)
            .max(0.0)
    }

    /// Signed distance from `p` (relative to the centre) to the outline,
    /// negative inside, together with the unit outward normal there.
    #[must_use]
    pub fn signed_distance(&self, p: Vec2) -> (f64, Vec2) {
        let r = self.effective_radius();
        let qx = p.x.abs() - self.width * 0.5 + r;
        let qy = p.y.abs() - self.height * 0.5 + r;

        let outside = Vec2::new(qx.max(0.0), qy.max(0.0)).length();
        let inside = qx.max(qy).min(0.0);
        let distance = outside + inside - r;

        let sx = if p.x < 0.0 { -1.0 } else { 1.0 };
        let sy = if p.y < 0.0 { -1.0 } else { 1.0 };
        let normal = if qx > 0.0 && qy > 0.0 {
            Vec2::new(qx * sx, qy * sy)
                .normalized()
                .unwrap_or(Vec2::new(sx, 0.0))
        } else if qx > qy {
            Vec2::new(sx, 0.0)
        } else {
            Vec2::new(0.0, sy)
        };

        (distance, normal)
    }

    /// Displacement vector at `p` (relative to the centre) from a bevel table
    /// indexed by normalized depth into the bevel.
    #[must_use]
    pub fn displacement_at(&self, p: Vec2, values: &[f64]) -> Vec2 {
        if self.bevel_width <= 0.0 || values.is_empty() {
            return Vec2::ZERO;
        }

        let (distance, normal) = self.signed_distance(p);
        // One antialiasing pixel outside the outline fades to zero.
        if distance > 1.0 {
            return Vec2::ZERO;
        }
        let opacity = if distance <= 0.0 { 1.0 } else { 1.0 - distance };

        let depth = (-distance).max(0.0);
        let value = lookup_displacement(values, depth / self.bevel_width);
        if value == 0.0 {
            return Vec2::ZERO;
        }
        -normal * (value * opacity)
    }
}

/// Per-pixel displacement vectors and their largest length.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplacementField2d {
    pub width: usize,
    pub height: usize,
    /// Row-major, `width * height` entries.
    pub vectors: Vec<Vec2>,
    pub max_magnitude: f64,
}

impl DisplacementField2d {
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<Vec2> {
        if x >= self.width {
            return None;
        }
        self.vectors.get(y * self.width + x).copied()
    }
}

/// An RGBA8 raster, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl RasterBuffer {
    /// A buffer filled with the neutral pixel.
    ///
    /// # Errors
    /// Returns [`RasterError::TooLarge`] when the byte count overflows.
    pub fn neutral(width: usize, height: usize) -> Result<Self, RasterError> {
        Self::filled(width, height, [NEUTRAL_CHANNEL, NEUTRAL_CHANNEL, 255, 255])
    }

    /// # Errors
    /// Returns [`RasterError::TooLarge`] when the byte count overflows.
    pub fn filled(width: usize, height: usize, pixel: [u8; 4]) -> Result<Self, RasterError> {
        let len = byte_len(width, height)?;
        let mut data = try_alloc(len, width, height)?;
        for _ in 0..width * height {
            data.extend_from_slice(&pixel);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Invert the channel encoding for a map normalized against `max`.
    #[must_use]
    pub fn decode_channel(channel: u8, max: f64) -> f64 {
        (f64::from(channel) - f64::from(NEUTRAL_CHANNEL)) / CHANNEL_SCALE * normalizer(max)
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

/// Pass 1: displacement vector for every pixel of a `width` x `height`
/// raster with `shape` centred in it.
///
/// # Errors
/// Returns [`RasterError::TooLarge`] when the raster or its vector field
/// cannot be allocated.
pub fn build_field_2d(
    width: usize,
    height: usize,
    shape: &RoundedRect,
    values: &[f64],
) -> Result<DisplacementField2d, RasterError> {
    byte_len(width, height)?;
    let pixels = width * height;
    let mut vectors = try_alloc(pixels, width, height)?;
    vectors.resize(pixels, Vec2::ZERO);
    log::debug!(
        "2d sweep: {width}x{height} raster, shape {}x{} r={} bevel={}, {} table entries",
        shape.width,
        shape.height,
        shape.corner_radius,
        shape.bevel_width,
        values.len()
    );

    let cx = width as f64 * 0.5;
    let cy = height as f64 * 0.5;

    for_each_row(&mut vectors, width, |y, row| {
        let py = y as f64 + 0.5 - cy;
        for (x, slot) in row.iter_mut().enumerate() {
            let p = Vec2::new(x as f64 + 0.5 - cx, py);
            *slot = shape.displacement_at(p, values);
        }
    });

    let max_magnitude = reduce_max_length(&vectors);
    log::debug!("2d sweep done: max |displacement| = {max_magnitude}");

    Ok(DisplacementField2d {
        width,
        height,
        vectors,
        max_magnitude,
    })
}

/// Pass 2: encode `field` normalized against `max`.
///
/// A `max` that is zero, negative or not finite is replaced by `1`, which
/// leaves an all-zero field at the neutral value everywhere.
///
/// # Errors
/// Returns [`RasterError::TooLarge`] when the raster size overflows.
pub fn encode_field(field: &DisplacementField2d, max: f64) -> Result<RasterBuffer, RasterError> {
    let mut raster = RasterBuffer::neutral(field.width, field.height)?;
    if normalizer(max) != max {
        log::debug!("degenerate displacement maximum {max}, normalizing against 1");
    }
    let max = normalizer(max);

    let vectors = &field.vectors;
    let width = field.width;
    for_each_row(&mut raster.data, width * 4, |y, row| {
        for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
            let v = vectors[y * width + x];
            pixel[0] = encode_component(v.x, max);
            pixel[1] = encode_component(v.y, max);
        }
    });

    Ok(raster)
}

/// Build and encode in one call, normalizing against a caller-supplied
/// maximum (normally the `max_abs` of the 1D table that fed `values_1d`).
///
/// # Errors
/// Returns an error for invalid shape sizes or an oversized raster.
#[allow(clippy::too_many_arguments)]
pub fn compute_displacement_2d(
    width: usize,
    height: usize,
    object_width: f64,
    object_height: f64,
    corner_radius: f64,
    bevel_width: f64,
    max_abs: f64,
    values_1d: &[f64],
) -> Result<RasterBuffer, RasterError> {
    let shape = RoundedRect::new(object_width, object_height, corner_radius, bevel_width)?;
    let field = build_field_2d(width, height, &shape, values_1d)?;
    encode_field(&field, max_abs)
}

/// `128 + round(component / max * 127)`, clamped to a byte.
#[must_use]
pub fn encode_component(component: f64, max: f64) -> u8 {
    let scaled = (component / normalizer(max) * CHANNEL_SCALE).round();
    if scaled.is_nan() {
        return NEUTRAL_CHANNEL;
    }
    (f64::from(NEUTRAL_CHANNEL) + scaled).clamp(0.0, 255.0) as u8
}

fn normalizer(max: f64) -> f64 {
    if max.is_finite() && max > 0.0 { max } else { 1.0 }
}

pub(crate) fn byte_len(width: usize, height: usize) -> Result<usize, RasterError> {
    width
        .checked_mul(height)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(RasterError::TooLarge { width, height })
}

/// Empty buffer with room for `len` elements; allocation failure and
/// capacity overflow both map to [`RasterError::TooLarge`].
fn try_alloc<T>(len: usize, width: usize, height: usize) -> Result<Vec<T>, RasterError> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| RasterError::TooLarge { width, height })?;
    Ok(buffer)
}

#[cfg(feature = "parallel")]
pub(crate) fn for_each_row<T, F>(buffer: &mut [T], row_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if row_len == 0 {
        return;
    }
    buffer
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn for_each_row<T, F>(buffer: &mut [T], row_len: usize, f: F)
where
    F: Fn(usize, &mut [T]),
{
    if row_len == 0 {
        return;
    }
    buffer
        .chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

#[cfg(feature = "parallel")]
fn reduce_max_length(vectors: &[Vec2]) -> f64 {
    vectors
        .par_iter()
        .map(|v| v.length())
        .filter(|len| !len.is_nan())
        .reduce(|| 0.0, f64::max)
}

#[cfg(not(feature = "parallel"))]
fn reduce_max_length(vectors: &[Vec2]) -> f64 {
    vectors
        .iter()
        .map(|v| v.length())
        .filter(|len| !len.is_nan())
        .fold(0.0, f64::max)
}
