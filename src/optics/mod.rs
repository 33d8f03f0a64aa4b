mod core;
mod field;
mod metrics;
mod normal;
mod profile;
mod raster;
mod refraction;
mod specular;
mod tracer;

pub use self::core::{Tolerance, Vec2};
pub use field::{DisplacementProfile, compute_displacement_1d, lookup_displacement, max_abs};
pub use metrics::{FieldMetrics, FieldTimingReport, TimingBucket};
pub use normal::{BevelSide, normal_at, normal_at_scaled, profile_slope};
pub use profile::{
    ProfileError, ProfileKind, SurfaceProfile, concave, convex_circle, convex_squircle, lip,
    sample_profile, smootherstep,
};
pub use raster::{
    CHANNEL_SCALE, DisplacementField2d, NEUTRAL_CHANNEL, RasterBuffer, RasterError, RoundedRect,
    build_field_2d, compute_displacement_2d, encode_component, encode_field,
};
pub use refraction::{Medium, Refraction, critical_angle, refract, refract_normalized};
pub use specular::{SpecularOptions, compute_specular_2d, specular_intensity};
pub use tracer::{
    GeometryError, GlassGeometry, Region, SurfaceHit, TraceOutcome, TraceResult,
    horizontal_drift, trace_column, trace_rays,
};

#[cfg(test)]
mod tests;
