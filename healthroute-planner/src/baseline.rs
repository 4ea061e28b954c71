//! Baseline itinerary retrieval and wait detection.
//!
//! The baseline is the plain TRANSIT itinerary every candidate is compared
//! against. Routing services either publish waits as WAIT segments or leave a
//! gap between a segment's timetable departure and the traveller's arrival;
//! [`BaselineAnalyzer::analyze`] turns the latter into WAIT segments so plan
//! totals include every minute spent at a stop.

use healthroute_core::{
    BaselineConfig, BaselineMetrics, Location, PlanRequest, RoutePlan, RouteSegment,
    RoutingProfile, TravelMode, UpstreamError,
};

use crate::policy::Collaborators;

/// Timing gaps at or below this are rounding noise, not waits.
const GAP_TOLERANCE_MINUTES: f64 = 1e-6;

/// A stop where the baseline traveller waits.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitPeriod {
    /// Where the traveller waits.
    pub stop: Location,
    /// How long.
    pub wait_minutes: f64,
    /// Index of the WAIT segment in the normalised plan.
    pub segment_index: usize,
    /// Minutes after departure at which the traveller reaches the stop.
    pub arrival_offset_minutes: f64,
}

/// The normalised baseline with its derived facts.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineAnalysis {
    /// Baseline itinerary with inferred waits materialised.
    pub plan: RoutePlan,
    /// Totals of `plan`.
    pub metrics: BaselineMetrics,
    /// Waits longer than the configured gap, in travel order.
    pub waits: Vec<WaitPeriod>,
}

/// Fetches and analyses baselines.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineAnalyzer {
    config: BaselineConfig,
}

impl BaselineAnalyzer {
    /// Analyse with `config`.
    #[must_use]
    pub const fn new(config: BaselineConfig) -> Self {
        Self { config }
    }

    /// Request the TRANSIT itinerary for `request` and analyse it.
    ///
    /// The itinerary's ends are pinned to the requested origin and
    /// destination.
    ///
    /// # Errors
    ///
    /// Propagates the collaborator failure, or [`UpstreamError::NoRoute`] when
    /// the itinerary is empty.
    pub async fn fetch(
        &self,
        calls: &Collaborators,
        request: &PlanRequest,
    ) -> Result<BaselineAnalysis, UpstreamError> {
        let plan = calls
            .route(
                RoutingProfile::Transit,
                &request.origin,
                &request.destination,
                request.departure,
            )
            .await?;
        if plan.is_empty() {
            return Err(UpstreamError::NoRoute);
        }
        Ok(self.analyze(plan.pinned(&request.origin, &request.destination)))
    }

    /// Materialise timing gaps and collect waits.
    ///
    /// Every positive gap becomes a WAIT segment and advances the clock; only
    /// gaps above the configured minimum are reported as waits.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "elapsed time is accumulated in floating-point minutes"
    )]
    pub fn analyze(&self, plan: RoutePlan) -> BaselineAnalysis {
        let min_gap = self.config.min_wait_gap_minutes;
        let mut segments = Vec::with_capacity(plan.segments.len());
        let mut waits = Vec::new();
        let mut elapsed = 0.0;
        for segment in plan.segments {
            let gap = segment
                .departs_at
                .map_or(0.0, |departs_at| departs_at - elapsed);
            if segment.mode != TravelMode::Wait && gap > GAP_TOLERANCE_MINUTES {
                if gap > min_gap {
                    waits.push(WaitPeriod {
                        stop: segment.start.clone(),
                        wait_minutes: gap,
                        segment_index: segments.len(),
                        arrival_offset_minutes: elapsed,
                    });
                }
                segments.push(RouteSegment::wait(segment.start.clone(), gap));
                elapsed += gap;
            }
            if segment.mode == TravelMode::Wait && segment.duration_minutes > min_gap {
                waits.push(WaitPeriod {
                    stop: segment.start.clone(),
                    wait_minutes: segment.duration_minutes,
                    segment_index: segments.len(),
                    arrival_offset_minutes: elapsed,
                });
            }
            elapsed += segment.duration_minutes;
            segments.push(segment);
        }
        let normalised = RoutePlan::new(segments);
        BaselineAnalysis {
            metrics: normalised.metrics(),
            plan: normalised,
            waits,
        }
    }
}
