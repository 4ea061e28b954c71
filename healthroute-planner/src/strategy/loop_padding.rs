//! Pad the trip with a walking loop at one end.

use healthroute_core::{
    Candidate, Location, LoopPaddingConfig, Provenance, RoutePlan, RouteSegment, RoutingProfile,
    TravelMode,
};

use super::{StrategyContext, StrategyOutcome, completes_trip};
use crate::policy::is_unavailable;

/// Radius of a there-and-back loop covering `deficit_minutes` of walking.
///
/// # Examples
///
/// ```
/// use healthroute_planner::strategy::loop_radius_km;
///
/// let radius = loop_radius_km(8.0, 5.0);
/// assert!((radius - 0.333).abs() < 1e-3);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the radius is a floating-point distance"
)]
pub fn loop_radius_km(deficit_minutes: f64, walking_speed_kmh: f64) -> f64 {
    deficit_minutes * walking_speed_kmh / 60.0 / 2.0
}

/// Appends a loop at the destination, or prepends one at the origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopPadding {
    config: LoopPaddingConfig,
}

impl LoopPadding {
    /// Generate with `config`.
    #[must_use]
    pub const fn new(config: LoopPaddingConfig) -> Self {
        Self { config }
    }

    /// Walking deficit left by the baseline; non-positive means no work.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "minutes are floating-point")]
    pub fn deficit_minutes(context: &StrategyContext) -> f64 {
        context.request.goals.walk_minutes - context.baseline.metrics.walk_minutes
    }

    /// Up to two candidates, destination-anchored first.
    pub async fn run(&self, context: &StrategyContext) -> StrategyOutcome {
        let deficit = Self::deficit_minutes(context);
        if deficit <= 0.0 {
            return StrategyOutcome::Generated(Vec::new());
        }
        let radius = loop_radius_km(deficit, self.config.walking_speed_kmh);
        let request = &context.request;
        let calls = &context.calls;
        let (at_destination, at_origin) = tokio::join!(
            calls.circular_route(&request.destination, radius, RoutingProfile::Walk),
            calls.circular_route(&request.origin, radius, RoutingProfile::Walk),
        );
        let baseline = &context.baseline;
        let mut candidates = Vec::new();
        let mut failures = Vec::new();
        match at_destination {
            Ok(route) => {
                if let Some(walk) = collapse(&route, &request.destination) {
                    let plan = baseline.plan.clone().then(RoutePlan::new(vec![walk]));
                    if completes_trip(&plan, context) {
                        candidates.push(plan);
                    }
                }
            }
            Err(err) => failures.push(err),
        }
        match at_origin {
            Ok(route) => {
                if let Some(walk) = collapse(&route, &request.origin) {
                    let plan = RoutePlan::new(vec![walk]).then(baseline.plan.clone());
                    if completes_trip(&plan, context) {
                        candidates.push(plan);
                    }
                }
            }
            Err(err) => failures.push(err),
        }
        for err in &failures {
            log::debug!(
                "request_id={} loop_padding loop failed: {err}",
                calls.request_id()
            );
        }
        if candidates.is_empty()
            && let Some(err) = failures.into_iter().find(is_unavailable)
        {
            return StrategyOutcome::Unavailable(err);
        }
        StrategyOutcome::Generated(
            candidates
                .into_iter()
                .enumerate()
                .map(|(ordinal, plan)| {
                    Candidate::new(Provenance::LoopPadding, ordinal, plan, &baseline.metrics)
                })
                .collect(),
        )
    }
}

/// A loop as one WALK segment returning to `anchor`.
fn collapse(route: &RoutePlan, anchor: &Location) -> Option<RouteSegment> {
    let minutes = route.total_duration_minutes();
    if minutes <= 0.0 {
        return None;
    }
    let mut walk = RouteSegment::new(
        TravelMode::Walk,
        anchor.clone(),
        anchor.clone(),
        minutes,
        route.total_distance_km(),
    );
    walk.geometry = route.segments.first().and_then(|s| s.geometry.clone());
    walk.stairs = route.includes_stairs();
    Some(walk)
}
