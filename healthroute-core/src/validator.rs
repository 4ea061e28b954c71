//! Hard-constraint filtering of candidates.
//!
//! Each configured limit is checked on its own; any failing limit rejects the
//! candidate. With no limits configured every candidate passes.

use thiserror::Error;

use crate::{BaselineMetrics, Candidate, CandidateMetrics, TripConstraints};

/// The first limit a candidate broke.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConstraintViolation {
    /// Total duration exceeds `max_total_time_minutes`.
    #[error("total time {actual:.1} min exceeds limit of {limit:.1} min")]
    TotalTime {
        /// Candidate duration.
        actual: f64,
        /// Configured limit.
        limit: f64,
    },
    /// Extra distance exceeds `max_detour_km`.
    #[error("detour of {actual:.2} km exceeds limit of {limit:.2} km")]
    DetourDistance {
        /// Extra distance over the baseline.
        actual: f64,
        /// Configured limit.
        limit: f64,
    },
    /// Extra duration exceeds `max_detour_percent`.
    #[error("detour of {actual:.1}% exceeds limit of {limit:.1}%")]
    DetourPercent {
        /// Extra duration over the baseline, in percent.
        actual: f64,
        /// Configured limit.
        limit: f64,
    },
}

/// Applies [`TripConstraints`] to candidates.
///
/// # Examples
///
/// ```
/// use healthroute_core::{BaselineMetrics, CandidateMetrics, ConstraintValidator, TripConstraints};
///
/// let validator = ConstraintValidator::new(TripConstraints {
///     max_detour_percent: Some(20.0),
///     ..TripConstraints::default()
/// });
/// let baseline = BaselineMetrics { duration_minutes: 30.0, ..BaselineMetrics::default() };
/// let candidate = CandidateMetrics { total_duration_minutes: 40.0, ..CandidateMetrics::default() };
/// assert!(validator.check(&candidate, &baseline).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstraintValidator {
    constraints: TripConstraints,
}

impl ConstraintValidator {
    /// Validate against `constraints`.
    #[must_use]
    pub const fn new(constraints: TripConstraints) -> Self {
        Self { constraints }
    }

    /// Check one candidate's measures against the limits.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConstraintViolation`] in declaration order.
    pub fn check(
        &self,
        metrics: &CandidateMetrics,
        baseline: &BaselineMetrics,
    ) -> Result<(), ConstraintViolation> {
        if let Some(limit) = self.constraints.max_total_time_minutes {
            let actual = metrics.total_duration_minutes;
            if actual > limit {
                return Err(ConstraintViolation::TotalTime { actual, limit });
            }
        }
        if let Some(limit) = self.constraints.max_detour_km {
            let actual = metrics.total_distance_km - baseline.distance_km;
            if actual > limit {
                return Err(ConstraintViolation::DetourDistance { actual, limit });
            }
        }
        if let Some(limit) = self.constraints.max_detour_percent {
            let actual = detour_percent(metrics.total_duration_minutes, baseline.duration_minutes);
            if actual > limit {
                return Err(ConstraintViolation::DetourPercent { actual, limit });
            }
        }
        Ok(())
    }

    /// Whether `candidate` satisfies every limit.
    #[must_use]
    pub fn accepts(&self, candidate: &Candidate, baseline: &BaselineMetrics) -> bool {
        self.check(&candidate.metrics, baseline).is_ok()
    }

    /// Keep the candidates that satisfy every limit, preserving order.
    #[must_use]
    pub fn filter(&self, candidates: Vec<Candidate>, baseline: &BaselineMetrics) -> Vec<Candidate> {
        if self.constraints.is_unconstrained() {
            return candidates;
        }
        candidates
            .into_iter()
            .filter(|candidate| self.accepts(candidate, baseline))
            .collect()
    }
}

/// Extra duration over the baseline in percent.
///
/// A zero-length baseline makes any positive duration an infinite detour.
fn detour_percent(total: f64, baseline: f64) -> f64 {
    let extra = total - baseline;
    if baseline > 0.0 {
        extra / baseline * 100.0
    } else if extra > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}
