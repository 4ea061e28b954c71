//! Walk ahead to a later stop instead of waiting at the boarding stop.

use healthroute_core::{
    Candidate, Provenance, RoutePlan, RouteSegment, RoutingProfile, TransitDetails, TransitStop,
    TravelMode, UpstreamError, WaitToWalkConfig,
};

use super::{StrategyContext, StrategyOutcome, completes_trip, departure_after};
use crate::baseline::WaitPeriod;
use crate::policy::is_unavailable;

/// Replaces long waits with walks to stops further along the same line.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaitToWalk {
    config: WaitToWalkConfig,
}

impl WaitToWalk {
    /// Generate with `config`.
    #[must_use]
    pub const fn new(config: WaitToWalkConfig) -> Self {
        Self { config }
    }

    /// One candidate per wait and later stop whose walk beats the wait.
    pub async fn run(&self, context: &StrategyContext) -> StrategyOutcome {
        let mut candidates = Vec::new();
        for wait in &context.baseline.waits {
            if wait.wait_minutes <= self.config.wait_threshold_minutes {
                continue;
            }
            let Some((boarding, transit)) = boarding_after(context, wait) else {
                continue;
            };
            let stops = transit
                .stops
                .iter()
                .enumerate()
                .filter(|(_, stop)| !stop.location.same_place(&wait.stop))
                .take(self.config.max_stops_ahead);
            for (index, stop) in stops {
                let ahead = StopAhead {
                    wait,
                    boarding,
                    transit,
                    index,
                    stop,
                };
                match walk_ahead(context, &ahead).await {
                    Ok(Some(plan)) => candidates.push(Candidate::new(
                        Provenance::WaitToWalk,
                        candidates.len(),
                        plan,
                        &context.baseline.metrics,
                    )),
                    Ok(None) => {}
                    Err(err) if is_unavailable(&err) => return StrategyOutcome::Unavailable(err),
                    Err(err) => log::debug!(
                        "request_id={} wait_to_walk skipped stop {}: {err}",
                        context.calls.request_id(),
                        stop.location.label()
                    ),
                }
            }
        }
        StrategyOutcome::Generated(candidates)
    }
}

/// A later stop considered for one wait.
#[derive(Clone, Copy)]
struct StopAhead<'a> {
    wait: &'a WaitPeriod,
    boarding: &'a RouteSegment,
    transit: &'a TransitDetails,
    index: usize,
    stop: &'a TransitStop,
}

#[expect(
    clippy::float_arithmetic,
    reason = "durations are floating-point minutes"
)]
async fn walk_ahead(
    context: &StrategyContext,
    ahead: &StopAhead<'_>,
) -> Result<Option<RoutePlan>, UpstreamError> {
    let request = &context.request;
    let wait = ahead.wait;
    let target = &ahead.stop.location;
    let walk = context
        .calls
        .route(
            RoutingProfile::Walk,
            &wait.stop,
            target,
            departure_after(request.departure, wait.arrival_offset_minutes),
        )
        .await?
        .pinned(&wait.stop, target);
    let walk_minutes = walk.total_duration_minutes();
    if walk.is_empty() || walk_minutes >= wait.wait_minutes {
        return Ok(None);
    }
    if let Some(continuation) = reuse_continuation(context, ahead, walk_minutes) {
        return Ok(assemble(context, wait, walk, continuation));
    }
    let continuation = context
        .calls
        .route(
            RoutingProfile::Transit,
            target,
            &request.destination,
            departure_after(request.departure, wait.arrival_offset_minutes + walk_minutes),
        )
        .await?
        .pinned(target, &request.destination);
    Ok(assemble(context, wait, walk, continuation))
}

/// Baseline prefix up to the wait, the walk, then the continuation.
fn assemble(
    context: &StrategyContext,
    wait: &WaitPeriod,
    walk: RoutePlan,
    continuation: RoutePlan,
) -> Option<RoutePlan> {
    let prefix = RoutePlan::new(
        context
            .baseline
            .plan
            .segments
            .iter()
            .take(wait.segment_index)
            .cloned()
            .collect(),
    );
    let plan = prefix.then(walk).then(continuation);
    completes_trip(&plan, context).then_some(plan)
}

/// The transit segment boarded right after `wait`, with its stop list.
fn boarding_after<'a>(
    context: &'a StrategyContext,
    wait: &WaitPeriod,
) -> Option<(&'a RouteSegment, &'a TransitDetails)> {
    let boarding = context
        .baseline
        .plan
        .segments
        .get(wait.segment_index + 1)?;
    if boarding.mode != TravelMode::Transit {
        return None;
    }
    boarding
        .transit
        .as_ref()
        .map(|transit| (boarding, transit))
}

/// Catch the same vehicle at the later stop when its timing is known and the
/// traveller arrives before it does.
#[expect(
    clippy::float_arithmetic,
    reason = "durations are floating-point minutes"
)]
fn reuse_continuation(
    context: &StrategyContext,
    ahead: &StopAhead<'_>,
    walk_minutes: f64,
) -> Option<RoutePlan> {
    let StopAhead {
        wait,
        boarding,
        transit,
        index,
        stop,
    } = *ahead;
    let offset = stop.offset_minutes?;
    let new_wait = wait.wait_minutes + offset - walk_minutes;
    if new_wait < 0.0 {
        return None;
    }
    let ridden_km = stop.offset_km.unwrap_or_else(|| {
        if boarding.duration_minutes > 0.0 {
            boarding.distance_km * offset / boarding.duration_minutes
        } else {
            0.0
        }
    });
    let remaining = RouteSegment::new(
        TravelMode::Transit,
        stop.location.clone(),
        boarding.end.clone(),
        boarding.duration_minutes - offset,
        boarding.distance_km - ridden_km,
    )
    .with_transit(TransitDetails {
        line: transit.line.clone(),
        stops: transit
            .stops
            .iter()
            .skip(index + 1)
            .map(|later| TransitStop {
                location: later.location.clone(),
                offset_minutes: later.offset_minutes.map(|m| m - offset),
                offset_km: later.offset_km.map(|km| km - ridden_km),
            })
            .collect(),
    });
    let mut segments = vec![RouteSegment::wait(stop.location.clone(), new_wait), remaining];
    segments.extend(
        context
            .baseline
            .plan
            .segments
            .iter()
            .skip(wait.segment_index + 2)
            .cloned(),
    );
    Some(RoutePlan::new(segments))
}
