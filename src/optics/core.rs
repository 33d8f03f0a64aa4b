use std::ops::{Add, Mul, Neg, Sub};

use serde::Serialize;

// ─────────────────────────────────────────────────────────────────────────────
// Vec2
// ─────────────────────────────────────────────────────────────────────────────

/// A 2D vector in the simulation plane. `y` grows downward, so a ray falling
/// onto the glass travels along [`Vec2::DOWN`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    /// Zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);
    /// Straight down (the incident direction of every traced ray).
    pub const DOWN: Self = Self::new(0.0, 1.0);
    /// Straight up (the outward normal of a flat glass top).
    pub const UP: Self = Self::new(0.0, -1.0);

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub const fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len.is_finite() && len > 0.0 {
            Some(Self::new(self.x / len, self.y / len))
        } else {
            None
        }
    }
}

impl Default for Vec2 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Self::Output {
        Vec2::new(self * rhs.x, self * rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

/// Tolerance configuration for the optics code.
///
/// Use the named constants instead of scattering literals:
/// - `Tolerance::PROFILE_STEP` - Forward-difference step along a profile (1e-4)
/// - `Tolerance::UNIT` - Accepted deviation of a "unit" vector's length (1e-6)
/// - `Tolerance::GRAZING` - Smallest vertical travel of a refracted ray (1e-12)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    /// Default comparison tolerance (1e-9).
    pub const DEFAULT: Self = Self { eps: 1e-9 };

    /// Step for the forward difference used by the normal estimator (1e-4).
    pub const PROFILE_STEP: Self = Self { eps: 1e-4 };

    /// Accepted deviation of a unit vector's length (1e-6).
    pub const UNIT: Self = Self { eps: 1e-6 };

    /// Below this vertical component a refracted ray is treated as grazing (1e-12).
    pub const GRAZING: Self = Self { eps: 1e-12 };

    #[must_use]
    pub fn approx_eq_vec2(self, a: Vec2, b: Vec2) -> bool {
        (a - b).length_squared() <= self.eps * self.eps
    }

    /// Check if a vector has unit length within this tolerance.
    #[must_use]
    pub fn is_unit_vec2(self, v: Vec2) -> bool {
        (v.length() - 1.0).abs() <= self.eps
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
