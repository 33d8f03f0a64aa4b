//! Snell's law in vector form.
//!
//! The solver works on unit vectors: `incident` points along the travelling
//! ray, `normal` points out of the surface back into the incident medium.
//! Total internal reflection is an ordinary outcome, not an error.

use serde::{Deserialize, Serialize};

use super::{Tolerance, Vec2};

/// A transparent medium described by its refractive index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Medium {
    pub index: f64,
}

impl Medium {
    pub const AIR: Self = Self { index: 1.0 };
    pub const GLASS: Self = Self { index: 1.5 };

    /// Returns `None` unless `index` is finite and positive.
    #[must_use]
    pub fn new(index: f64) -> Option<Self> {
        (index.is_finite() && index > 0.0).then_some(Self { index })
    }
}

impl Default for Medium {
    fn default() -> Self {
        Self::AIR
    }
}

/// Result of refracting a ray at an interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Refraction {
    /// The transmitted unit direction.
    Refracted(Vec2),
    /// The incidence angle exceeds the critical angle; nothing is transmitted.
    TotalInternalReflection,
}

impl Refraction {
    #[must_use]
    pub const fn direction(self) -> Option<Vec2> {
        match self {
            Self::Refracted(dir) => Some(dir),
            Self::TotalInternalReflection => None,
        }
    }

    #[must_use]
    pub const fn is_total_internal_reflection(self) -> bool {
        matches!(self, Self::TotalInternalReflection)
    }
}

/// Refract `incident` at a surface with outward `normal`, going from index
/// `n1` into index `n2`.
///
/// Both vectors must be unit length and both indices positive; debug builds
/// assert this. Use [`refract_normalized`] for untrusted input. The normal
/// is expected to face the incoming ray (`incident · normal <= 0`).
#[must_use]
pub fn refract(incident: Vec2, normal: Vec2, n1: f64, n2: f64) -> Refraction {
    debug_assert!(
        Tolerance::UNIT.is_unit_vec2(incident),
        "incident must be a unit vector, got {incident:?}"
    );
    debug_assert!(
        Tolerance::UNIT.is_unit_vec2(normal),
        "normal must be a unit vector, got {normal:?}"
    );
    debug_assert!(n1 > 0.0 && n2 > 0.0, "refractive indices must be positive");

    let dot = incident.dot(normal);
    let eta = n1 / n2;
    let k = 1.0 - eta * eta * (1.0 - dot * dot);
    if k < 0.0 {
        return Refraction::TotalInternalReflection;
    }

    Refraction::Refracted(incident * eta - normal * (eta * dot + k.sqrt()))
}

/// Like [`refract`], but normalizes both vectors first.
///
/// Returns `None` when either vector is degenerate or an index is not a
/// positive finite number.
#[must_use]
pub fn refract_normalized(incident: Vec2, normal: Vec2, n1: f64, n2: f64) -> Option<Refraction> {
    let incident = incident.normalized()?;
    let normal = normal.normalized()?;
    let n1 = Medium::new(n1)?.index;
    let n2 = Medium::new(n2)?.index;
    Some(refract(incident, normal, n1, n2))
}

/// Critical angle in radians for a ray leaving `n1` into `n2`, if one exists.
#[must_use]
pub fn critical_angle(n1: f64, n2: f64) -> Option<f64> {
    (n1 > n2 && n2 > 0.0).then(|| (n2 / n1).asin())
}
