//! One-dimensional displacement table across a bevel.
//!
//! The table is sampled from the outer rim (index `0`) to the start of the
//! flat top (last index) and is the lookup used by the 2D raster builder.
//! Positive values point toward the inside of the glass.

use serde::Serialize;

use super::refraction::Medium;
use super::tracer::{GlassGeometry, trace_column};
use super::SurfaceProfile;

/// Signed displacement samples plus the largest absolute value among them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplacementProfile {
    pub values: Vec<f64>,
    pub max_abs: f64,
}

impl DisplacementProfile {
    /// Wrap externally computed values, deriving `max_abs`.
    #[must_use]
    pub fn from_values(values: Vec<f64>) -> Self {
        let max_abs = max_abs(&values);
        Self { values, max_abs }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value for a normalized depth `u` into the bevel (`0` = rim).
    ///
    /// Depths at or past `1` are the flat top and return `0`.
    #[must_use]
    pub fn lookup(&self, u: f64) -> f64 {
        lookup_displacement(&self.values, u)
    }
}

/// Table lookup shared with the raster builder; see [`DisplacementProfile::lookup`].
#[must_use]
pub fn lookup_displacement(values: &[f64], u: f64) -> f64 {
    if values.is_empty() || !(0.0..1.0).contains(&u) {
        return 0.0;
    }
    // Nearest sample; entry `i` was traced at `t = i / (len - 1)`.
    let index = (u * (values.len() - 1) as f64).round() as usize;
    values[index.min(values.len() - 1)]
}

/// Trace `sample_count` columns across a bevel of `bevel_width` rising to
/// `glass_thickness`, entering from air into glass of index `n2`.
///
/// Samples are evenly spaced from the rim (`t = 0`) to the flat-top
/// boundary (`t = 1`) inclusive.
#[must_use]
pub fn compute_displacement_1d<P: SurfaceProfile + ?Sized>(
    profile: &P,
    bevel_width: f64,
    glass_thickness: f64,
    n2: f64,
    sample_count: usize,
) -> DisplacementProfile {
    debug_assert!(bevel_width >= 0.0, "bevel width must not be negative");
    debug_assert!(glass_thickness >= 0.0, "glass thickness must not be negative");
    let bevel_width = sanitize_size(bevel_width);
    let glass_thickness = sanitize_size(glass_thickness);

    log::debug!(
        "1d sweep: bevel {bevel_width}, thickness {glass_thickness}, n2 {n2}, {sample_count} samples"
    );

    if sample_count == 0 {
        return DisplacementProfile::default();
    }

    // Sanitized sizes cannot fail validation.
    let geometry = GlassGeometry {
        left: 0.0,
        width: 2.0 * bevel_width,
        bevel_width,
        thickness: glass_thickness,
        base: glass_thickness,
        aspect_normals: false,
    };

    let last = sample_count.saturating_sub(1).max(1) as f64;
    let values: Vec<f64> = (0..sample_count)
        .map(|i| {
            let x = bevel_width * (i as f64 / last);
            trace_column(profile, &geometry, x, Medium::AIR.index, n2).displacement
        })
        .collect();

    let field = DisplacementProfile::from_values(values);
    log::debug!("1d sweep done: max |displacement| = {}", field.max_abs);
    field
}

/// Largest absolute value, ignoring NaN; `0` for an empty slice.
#[must_use]
pub fn max_abs(values: &[f64]) -> f64 {
    values
        .iter()
        .map(|v| v.abs())
        .filter(|v| !v.is_nan())
        .fold(0.0, f64::max)
}

fn sanitize_size(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
