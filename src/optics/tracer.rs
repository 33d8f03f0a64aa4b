//! Vertical ray tracing through a beveled glass block.
//!
//! The simulation plane has `y` growing downward. Rays start at `y = 0`,
//! travel straight down, refract once at the glass top surface and are
//! followed to the glass's bottom face (`y = base`), where the backdrop is
//! sampled. The horizontal drift at that plane is the displacement.
//!
//! ```text
//!   left                                   right
//!    |<- bevel ->|<----- flat top ----->|<- bevel ->|
//!         .-'''''''''''''''''''''''''''''''''''-.        base - thickness
//!      .'                                        '.
//!    .'__________________________________________'.      base
//! ```

use serde::Serialize;

use super::normal::{BevelSide, normal_at, normal_at_scaled};
use super::refraction::{Refraction, refract};
use super::{SurfaceProfile, Tolerance, Vec2};

/// Placement and size of the glass block in the simulation plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlassGeometry {
    /// Horizontal position of the left edge.
    pub left: f64,
    /// Horizontal span of the glass.
    pub width: f64,
    /// Horizontal size of each bevel.
    pub bevel_width: f64,
    /// Height of the flat top above the bottom face.
    pub thickness: f64,
    /// Vertical position of the bottom face (the backdrop plane).
    pub base: f64,
    /// Scale bevel normals by [`GlassGeometry::aspect`] instead of treating
    /// the profile slope as 1:1. Off unless requested.
    pub aspect_normals: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("glass geometry values must be finite")]
    NonFinite,
    #[error("`{field}` must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },
}

impl GlassGeometry {
    /// Validated constructor.
    ///
    /// # Errors
    /// Returns an error when a value is NaN/infinite or a size is negative.
    pub fn new(
        left: f64,
        width: f64,
        bevel_width: f64,
        thickness: f64,
        base: f64,
    ) -> Result<Self, GeometryError> {
        if ![left, width, bevel_width, thickness, base]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(GeometryError::NonFinite);
        }
        for (field, value) in [
            ("width", width),
            ("bevel_width", bevel_width),
            ("thickness", thickness),
        ] {
            if value < 0.0 {
                return Err(GeometryError::Negative { field, value });
            }
        }

        Ok(Self {
            left,
            width,
            bevel_width,
            thickness,
            base,
            aspect_normals: false,
        })
    }

    /// Same geometry with aspect-scaled bevel normals switched on or off.
    #[must_use]
    pub const fn with_aspect_normals(mut self, on: bool) -> Self {
        self.aspect_normals = on;
        self
    }

    /// Outward surface normal at bevel parameter `t` on `side`.
    #[must_use]
    pub fn bevel_normal<P: SurfaceProfile + ?Sized>(
        &self,
        profile: &P,
        t: f64,
        side: BevelSide,
    ) -> Vec2 {
        if self.aspect_normals {
            normal_at_scaled(profile, t, side, self.aspect())
        } else {
            normal_at(profile, t, side)
        }
    }

    /// A glass resting on `y = thickness` with one bevel on each side and no
    /// flat top in between.
    ///
    /// # Errors
    /// Same as [`GlassGeometry::new`].
    pub fn bevel_pair(bevel_width: f64, thickness: f64) -> Result<Self, GeometryError> {
        Self::new(0.0, 2.0 * bevel_width, bevel_width, thickness, thickness)
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn top(&self) -> f64 {
        self.base - self.thickness
    }

    /// Vertical over horizontal scale of the bevel.
    #[must_use]
    pub fn aspect(&self) -> f64 {
        if self.bevel_width > 0.0 {
            self.thickness / self.bevel_width
        } else {
            1.0
        }
    }

    #[must_use]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.left && x <= self.right()
    }

    /// Region of column `x` together with its bevel parameter `t`.
    #[must_use]
    pub fn classify(&self, x: f64) -> (Region, f64) {
        if !self.contains(x) {
            return (Region::Outside, 0.0);
        }
        if self.bevel_width <= 0.0 {
            return (Region::Flat, 1.0);
        }

        let offset_left = x - self.left;
        let offset_right = self.right() - x;

        if offset_left <= offset_right && offset_left < self.bevel_width {
            (Region::LeftBevel, (offset_left / self.bevel_width).clamp(0.0, 1.0))
        } else if offset_right < self.bevel_width {
            (Region::RightBevel, (offset_right / self.bevel_width).clamp(0.0, 1.0))
        } else {
            (Region::Flat, 1.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Outside,
    LeftBevel,
    Flat,
    RightBevel,
}

impl Region {
    #[must_use]
    pub const fn side(self) -> Option<BevelSide> {
        match self {
            Self::LeftBevel => Some(BevelSide::Left),
            Self::RightBevel => Some(BevelSide::Right),
            Self::Outside | Self::Flat => None,
        }
    }
}

/// Where a ray meets the glass surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceHit {
    pub point: Vec2,
    /// Unit outward normal.
    pub normal: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceOutcome {
    /// The column misses the glass.
    Missed,
    Refracted { direction: Vec2 },
    TotalInternalReflection,
}

/// One traced column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceResult {
    pub origin_x: f64,
    pub region: Region,
    /// Bevel parameter in `[0, 1]`; `1` on the flat top, `0` outside.
    pub t: f64,
    pub hit: Option<SurfaceHit>,
    pub outcome: TraceOutcome,
    /// Where the drawn path ends on the backdrop plane.
    pub exit: Vec2,
    /// Signed horizontal drift at the backdrop plane.
    pub displacement: f64,
}

impl TraceResult {
    /// Polyline of the ray for plotting: start, surface hit, backdrop.
    #[must_use]
    pub fn path(&self) -> Vec<Vec2> {
        let start = Vec2::new(self.origin_x, 0.0);
        match self.hit {
            Some(hit) => vec![start, hit.point, self.exit],
            None => vec![start, self.exit],
        }
    }
}

/// Trace the vertical ray at column `x` from medium `n1` into glass `n2`.
#[must_use]
pub fn trace_column<P: SurfaceProfile + ?Sized>(
    profile: &P,
    geometry: &GlassGeometry,
    x: f64,
    n1: f64,
    n2: f64,
) -> TraceResult {
    let undeviated = Vec2::new(x, geometry.base);
    let (region, t) = geometry.classify(x);

    if region == Region::Outside {
        return TraceResult {
            origin_x: x,
            region,
            t,
            hit: None,
            outcome: TraceOutcome::Missed,
            exit: undeviated,
            displacement: 0.0,
        };
    }

    let height = profile.height_clamped(t);
    let normal = match region.side() {
        Some(side) => geometry.bevel_normal(profile, t, side),
        None => Vec2::UP,
    };
    let hit = SurfaceHit {
        point: Vec2::new(x, geometry.base - geometry.thickness * height),
        normal,
    };

    match refract(Vec2::DOWN, normal, n1, n2) {
        Refraction::TotalInternalReflection => TraceResult {
            origin_x: x,
            region,
            t,
            hit: Some(hit),
            outcome: TraceOutcome::TotalInternalReflection,
            exit: undeviated,
            displacement: 0.0,
        },
        Refraction::Refracted(direction) => {
            let remaining = geometry.base - hit.point.y;
            let displacement = horizontal_drift(direction, remaining);
            TraceResult {
                origin_x: x,
                region,
                t,
                hit: Some(hit),
                outcome: TraceOutcome::Refracted { direction },
                exit: Vec2::new(x + displacement, geometry.base),
                displacement,
            }
        }
    }
}

/// Trace `ray_count` evenly spaced columns over `[span.0, span.1]`.
#[must_use]
pub fn trace_rays<P: SurfaceProfile + ?Sized>(
    profile: &P,
    geometry: &GlassGeometry,
    span: (f64, f64),
    ray_count: usize,
    n1: f64,
    n2: f64,
) -> Vec<TraceResult> {
    log::debug!(
        "tracing {ray_count} rays over [{}, {}] (glass {}..{})",
        span.0,
        span.1,
        geometry.left,
        geometry.right()
    );

    let (start, end) = span;
    let step = if ray_count > 1 {
        (end - start) / (ray_count - 1) as f64
    } else {
        0.0
    };

    (0..ray_count)
        .map(|i| trace_column(profile, geometry, start + step * i as f64, n1, n2))
        .collect()
}

/// Horizontal distance covered while descending `remaining` along `direction`.
///
/// A refracted ray that barely descends would divide by ~0; the result is
/// then saturated at the largest finite value with the sign of `direction.x`.
#[must_use]
pub fn horizontal_drift(direction: Vec2, remaining: f64) -> f64 {
    if remaining <= 0.0 || direction.x == 0.0 {
        return 0.0;
    }
    if direction.y <= Tolerance::GRAZING.eps {
        return f64::MAX.copysign(direction.x);
    }
    (direction.x / direction.y * remaining).clamp(-f64::MAX, f64::MAX)
}
