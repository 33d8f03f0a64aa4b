//! Opt-in timing hooks for field generation.
//!
//! Timing is only collected when the `field_metrics` feature is enabled and
//! the target is not WASM (`std::time::Instant` is unavailable there).
//! Otherwise every call compiles down to running the closure.
//!
//! ```ignore
//! use glass_engine::optics::{FieldMetrics, TimingBucket};
//!
//! let mut metrics = FieldMetrics::default();
//! metrics.begin();
//! let table = metrics.time(TimingBucket::ProfileSweep, || {
//!     compute_displacement_1d(&ProfileKind::ConvexCircle, 60.0, 50.0, 1.5, 128)
//! });
//! if let Some(report) = metrics.end() {
//!     println!("sweep: {} ns", report.profile_sweep_ns);
//! }
//! ```

/// Phases of displacement map generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// 1D bevel table (ray tracing per column).
    ProfileSweep,
    /// Per-pixel vector field and max reduction.
    FieldSweep,
    /// Normalization into RGBA8.
    Encoding,
    /// Specular rim layer.
    Specular,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldTimingReport {
    pub profile_sweep_ns: u64,
    pub field_sweep_ns: u64,
    pub encoding_ns: u64,
    pub specular_ns: u64,
}

impl FieldTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.profile_sweep_ns
            .saturating_add(self.field_sweep_ns)
            .saturating_add(self.encoding_ns)
            .saturating_add(self.specular_ns)
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing field operations.
///
/// When metrics are disabled all methods are no-ops and
/// [`end`](Self::end) returns `None`.
#[derive(Debug, Default)]
pub struct FieldMetrics {
    #[cfg(all(feature = "field_metrics", not(target_arch = "wasm32")))]
    report: FieldTimingReport,
}

impl FieldMetrics {
    /// Resets all counters.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "field_metrics", not(target_arch = "wasm32")))]
        {
            self.report = FieldTimingReport::default();
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<FieldTimingReport> {
        #[cfg(all(feature = "field_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "field_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f` and adds its elapsed time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "field_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            self.add_to_bucket(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "field_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg(all(feature = "field_metrics", not(target_arch = "wasm32")))]
    fn add_to_bucket(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::ProfileSweep => &mut self.report.profile_sweep_ns,
            TimingBucket::FieldSweep => &mut self.report.field_sweep_ns,
            TimingBucket::Encoding => &mut self.report.encoding_ns,
            TimingBucket::Specular => &mut self.report.specular_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_total_sums_buckets() {
        let report = FieldTimingReport {
            profile_sweep_ns: 1000,
            field_sweep_ns: 2000,
            encoding_ns: 3000,
            specular_ns: 0,
        };
        assert_eq!(report.total_ns(), 6000);
        assert!((report.total_ms() - 0.006).abs() < 1e-9);
    }

    #[test]
    fn time_returns_closure_result() {
        let mut metrics = FieldMetrics::default();
        metrics.begin();
        let result = metrics.time(TimingBucket::Encoding, || 42);
        assert_eq!(result, 42);

        #[cfg(all(feature = "field_metrics", not(target_arch = "wasm32")))]
        assert!(metrics.end().is_some());
        #[cfg(not(all(feature = "field_metrics", not(target_arch = "wasm32"))))]
        assert!(metrics.end().is_none());
    }
}
