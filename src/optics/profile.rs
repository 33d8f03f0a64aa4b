//! Bevel height functions.
//!
//! A surface profile maps the normalized horizontal position inside a bevel
//! (`0` at the outer rim, `1` where the flat top starts) to a normalized
//! height. The functions are evaluated many times per field, so they are
//! plain arithmetic with no allocation.
//!
//! Inputs outside `[0, 1]` never panic or produce NaN, but the result is not
//! guaranteed to stay inside `[0, 1]`; use [`SurfaceProfile::height_clamped`]
//! before turning a height into geometry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A bevel height function `f: [0, 1] -> [0, 1]`.
pub trait SurfaceProfile {
    fn height(&self, x: f64) -> f64;

    /// Height clamped to `[0, 1]`; NaN maps to `0`.
    fn height_clamped(&self, x: f64) -> f64 {
        let h = self.height(x);
        if h.is_nan() { 0.0 } else { h.clamp(0.0, 1.0) }
    }
}

impl<F> SurfaceProfile for F
where
    F: Fn(f64) -> f64,
{
    fn height(&self, x: f64) -> f64 {
        self(x)
    }
}

/// The named bevel shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    /// Quarter-circle bulge.
    ConvexCircle,
    /// Flatter-topped bulge.
    ConvexSquircle,
    /// Inverted quarter circle.
    Concave,
    /// Squircle rim blended into a raised concave dip.
    Lip,
}

impl ProfileKind {
    pub const ALL: [Self; 4] = [
        Self::ConvexCircle,
        Self::ConvexSquircle,
        Self::Concave,
        Self::Lip,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ConvexCircle => "convex_circle",
            Self::ConvexSquircle => "convex_squircle",
            Self::Concave => "concave",
            Self::Lip => "lip",
        }
    }
}

impl SurfaceProfile for ProfileKind {
    fn height(&self, x: f64) -> f64 {
        match self {
            Self::ConvexCircle => convex_circle(x),
            Self::ConvexSquircle => convex_squircle(x),
            Self::Concave => concave(x),
            Self::Lip => lip(x),
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised when a profile is named by string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("unknown surface profile `{0}` (expected convex_circle, convex_squircle, concave or lip)")]
    Unknown(String),
}

impl FromStr for ProfileKind {
    type Err = ProfileError;

    /// Accepts `convex_circle`, `convex-circle`, `ConvexCircle` and friends.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "convexcircle" | "circle" => Ok(Self::ConvexCircle),
            "convexsquircle" | "squircle" => Ok(Self::ConvexSquircle),
            "concave" => Ok(Self::Concave),
            "lip" => Ok(Self::Lip),
            _ => Err(ProfileError::Unknown(s.to_owned())),
        }
    }
}

/// `sqrt(1 - (1 - x)^2)`
#[must_use]
pub fn convex_circle(x: f64) -> f64 {
    let u = 1.0 - x;
    (1.0 - u * u).max(0.0).sqrt()
}

/// `(1 - (1 - x)^4)^(1/4)`
#[must_use]
pub fn convex_squircle(x: f64) -> f64 {
    let u = 1.0 - x;
    let u2 = u * u;
    (1.0 - u2 * u2).max(0.0).powf(0.25)
}

/// `1 - convex_circle(x)`
#[must_use]
pub fn concave(x: f64) -> f64 {
    1.0 - convex_circle(x)
}

/// Smootherstep weight `6x^5 - 15x^4 + 10x^3`.
#[must_use]
pub fn smootherstep(x: f64) -> f64 {
    x * x * x * (x * (x * 6.0 - 15.0) + 10.0)
}

/// Blend of a double-rate squircle and a concave curve lifted by `0.1`.
#[must_use]
pub fn lip(x: f64) -> f64 {
    let w = smootherstep(x);
    convex_squircle(2.0 * x) * (1.0 - w) + (concave(x) + 0.1) * w
}

/// Evaluate `count` evenly spaced heights over `[0, 1]` (both ends included).
#[must_use]
pub fn sample_profile<P: SurfaceProfile + ?Sized>(profile: &P, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![profile.height(0.0)],
        _ => {
            let last = (count - 1) as f64;
            (0..count)
                .map(|i| profile.height(i as f64 / last))
                .collect()
        }
    }
}
