//! Outward normals along a bevel profile.

use serde::Serialize;

use super::{SurfaceProfile, Tolerance, Vec2};

/// Which edge of the glass a bevel sample belongs to.
///
/// The left bevel rises to the right and the right bevel rises to the left,
/// so their normals lean in opposite horizontal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BevelSide {
    Left,
    Right,
}

/// Unit outward normal of `profile` at `x`, for a bevel drawn at 1:1 aspect.
#[must_use]
pub fn normal_at<P: SurfaceProfile + ?Sized>(profile: &P, x: f64, side: BevelSide) -> Vec2 {
    normal_at_scaled(profile, x, side, 1.0)
}

/// Unit outward normal when the bevel's height is `aspect` times its width.
///
/// At `x >= 1` the surface is the flat top and the normal is `(0, -1)`.
#[must_use]
pub fn normal_at_scaled<P: SurfaceProfile + ?Sized>(
    profile: &P,
    x: f64,
    side: BevelSide,
    aspect: f64,
) -> Vec2 {
    if x >= 1.0 {
        return Vec2::UP;
    }

    let slope = profile_slope(profile, x) * aspect;
    if !slope.is_finite() {
        return Vec2::UP;
    }

    let magnitude = (slope * slope + 1.0).sqrt();
    match side {
        BevelSide::Left => Vec2::new(-slope / magnitude, -1.0 / magnitude),
        BevelSide::Right => Vec2::new(slope / magnitude, -1.0 / magnitude),
    }
}

/// Forward-difference derivative of the profile at `x`.
#[must_use]
pub fn profile_slope<P: SurfaceProfile + ?Sized>(profile: &P, x: f64) -> f64 {
    let dx = Tolerance::PROFILE_STEP.eps;
    (profile.height(x + dx) - profile.height(x)) / dx
}
