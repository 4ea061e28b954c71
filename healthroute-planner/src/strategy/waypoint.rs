//! Insert bike parkings or a farther boarding stop into the trip.
//!
//! Bike mode rides between parkings near each end of the trip. Walk mode
//! boards at a stop roughly a kilometre from the origin that the baseline
//! does not pass. Each sub-mode keeps its own top-N by closeness to the
//! activity goal before the results are merged.

use std::collections::HashMap;

use healthroute_core::{
    ActivityGoals, BikeParking, Candidate, Location, Provenance, RoutePlan, RoutingProfile,
    TransitStopInfo, UpstreamError, WaypointConfig,
};

use super::{StrategyContext, StrategyOutcome, completes_trip, departure_after};
use crate::policy::{Collaborators, is_unavailable};

/// StrategyB.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaypointInsertion {
    config: WaypointConfig,
}

impl WaypointInsertion {
    /// Generate with `config`.
    #[must_use]
    pub const fn new(config: WaypointConfig) -> Self {
        Self { config }
    }

    /// Bike mode when the goals or preferences ask for it, walk mode when
    /// bike mode is inactive or yields nothing.
    pub async fn run(&self, context: &StrategyContext) -> StrategyOutcome {
        let request = &context.request;
        let mut ordinal = 0;
        let mut candidates = Vec::new();
        let mut unavailable = None;
        if request.goals.wants_bike() || request.preferences.prefer_bike_parkings {
            match self.bike_candidates(context, &mut ordinal).await {
                Ok(found) => candidates = self.closest_to_goal(found, &request.goals),
                Err(err) => {
                    log::warn!(
                        "request_id={} waypoint bike mode unavailable: {err}",
                        context.calls.request_id()
                    );
                    unavailable = Some(err);
                }
            }
        }
        if candidates.is_empty() {
            match self.walk_candidates(context, &mut ordinal).await {
                Ok(found) => candidates = self.closest_to_goal(found, &request.goals),
                Err(err) => unavailable = Some(err),
            }
        }
        match unavailable {
            Some(err) if candidates.is_empty() && is_unavailable(&err) => {
                StrategyOutcome::Unavailable(err)
            }
            _ => StrategyOutcome::Generated(candidates),
        }
    }

    async fn bike_candidates(
        &self,
        context: &StrategyContext,
        ordinal: &mut usize,
    ) -> Result<Vec<Candidate>, UpstreamError> {
        let request = &context.request;
        let calls = &context.calls;
        let (near_origin, near_destination) = tokio::try_join!(
            calls.nearby_parkings(
                &request.origin,
                self.config.parking_radius_meters,
                self.config.min_available_bikes,
            ),
            calls.nearby_parkings(
                &request.destination,
                self.config.parking_radius_meters,
                self.config.min_available_bikes,
            ),
        )?;
        let mut legs = WalkLegs::default();
        let mut found = Vec::new();
        for start in near_origin.iter().take(self.config.parkings_per_end) {
            for end in near_destination.iter().take(self.config.parkings_per_end) {
                if start.id == end.id
                    || start.location.distance_km(&end.location) < self.config.min_bike_leg_km
                {
                    continue;
                }
                match bike_plan(context, start, end, &mut legs).await {
                    Ok(plan) if completes_trip(&plan, context) => {
                        found.push(
                            Candidate::new(
                                Provenance::WaypointInsertion,
                                *ordinal,
                                plan,
                                &context.baseline.metrics,
                            )
                            .with_confirmed_parking(),
                        );
                        *ordinal += 1;
                    }
                    Ok(_) => {}
                    Err(err) if is_unavailable(&err) => return Err(err),
                    Err(err) => log::debug!(
                        "request_id={} waypoint skipped parkings {}->{}: {err}",
                        calls.request_id(),
                        start.id,
                        end.id
                    ),
                }
            }
        }
        Ok(found)
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "distances and durations are floating-point"
    )]
    async fn walk_candidates(
        &self,
        context: &StrategyContext,
        ordinal: &mut usize,
    ) -> Result<Vec<Candidate>, UpstreamError> {
        let request = &context.request;
        let baseline = &context.baseline;
        let stops = context
            .calls
            .nearby_stops(&request.origin, meters(self.config.stop_max_km))
            .await?;
        let mut picks: Vec<(f64, &TransitStopInfo)> = stops
            .iter()
            .filter_map(|stop| {
                let km = request.origin.distance_km(&stop.location);
                let in_band = km >= self.config.stop_min_km && km <= self.config.stop_max_km;
                let off_path =
                    off_path(&baseline.plan, &stop.location, self.config.off_path_tolerance_km);
                (in_band && off_path).then_some((km, stop))
            })
            .collect();
        let target = self.config.stop_radius_km;
        picks.sort_by(|(a_km, a), (b_km, b)| {
            (a_km - target)
                .abs()
                .total_cmp(&(b_km - target).abs())
                .then_with(|| a.id.cmp(&b.id))
        });
        let mut found = Vec::new();
        for (_, stop) in picks.into_iter().take(self.config.top_n) {
            match stop_plan(context, &stop.location).await {
                Ok(plan) if completes_trip(&plan, context) => {
                    let candidate = Candidate::new(
                        Provenance::WaypointInsertion,
                        *ordinal,
                        plan,
                        &baseline.metrics,
                    );
                    let added = candidate.metrics.walk_minutes - baseline.metrics.walk_minutes;
                    if added < self.config.min_added_walk_minutes {
                        continue;
                    }
                    found.push(candidate);
                    *ordinal += 1;
                }
                Ok(_) => {}
                Err(err) if is_unavailable(&err) => return Err(err),
                Err(err) => log::debug!(
                    "request_id={} waypoint skipped stop {}: {err}",
                    context.calls.request_id(),
                    stop.id
                ),
            }
        }
        Ok(found)
    }

    /// Keep the `top_n` candidates whose activity is closest to the goal.
    fn closest_to_goal(&self, mut found: Vec<Candidate>, goals: &ActivityGoals) -> Vec<Candidate> {
        found.sort_by(|a, b| {
            goal_gap(a, goals)
                .total_cmp(&goal_gap(b, goals))
                .then_with(|| a.ordinal.cmp(&b.ordinal))
        });
        found.truncate(self.config.top_n);
        found
    }
}

/// Walk legs to and from parkings, keyed by parking id.
#[derive(Debug, Default)]
struct WalkLegs {
    to_parking: HashMap<String, RoutePlan>,
    from_parking: HashMap<String, RoutePlan>,
}

#[expect(
    clippy::float_arithmetic,
    reason = "departures are offset by floating-point minutes"
)]
async fn bike_plan(
    context: &StrategyContext,
    start: &BikeParking,
    end: &BikeParking,
    legs: &mut WalkLegs,
) -> Result<RoutePlan, UpstreamError> {
    let request = &context.request;
    let calls = &context.calls;
    let walk_in = cached_walk(
        calls,
        &mut legs.to_parking,
        &start.id,
        (&request.origin, &start.location),
        request.departure,
    )
    .await?;
    let walk_in_minutes = walk_in.total_duration_minutes();
    let bike = calls
        .route(
            RoutingProfile::Bike,
            &start.location,
            &end.location,
            departure_after(request.departure, walk_in_minutes),
        )
        .await?
        .pinned(&start.location, &end.location);
    let walk_out = cached_walk(
        calls,
        &mut legs.from_parking,
        &end.id,
        (&end.location, &request.destination),
        departure_after(
            request.departure,
            walk_in_minutes + bike.total_duration_minutes(),
        ),
    )
    .await?;
    Ok(walk_in.then(bike).then(walk_out))
}

async fn cached_walk(
    calls: &Collaborators,
    cache: &mut HashMap<String, RoutePlan>,
    key: &str,
    (from, to): (&Location, &Location),
    departure: jiff::Timestamp,
) -> Result<RoutePlan, UpstreamError> {
    if let Some(plan) = cache.get(key) {
        return Ok(plan.clone());
    }
    let plan = calls
        .route(RoutingProfile::Walk, from, to, departure)
        .await?
        .pinned(from, to);
    cache.insert(key.to_owned(), plan.clone());
    Ok(plan)
}

async fn stop_plan(context: &StrategyContext, stop: &Location) -> Result<RoutePlan, UpstreamError> {
    let request = &context.request;
    let walk = context
        .calls
        .route(RoutingProfile::Walk, &request.origin, stop, request.departure)
        .await?
        .pinned(&request.origin, stop);
    let ride = context
        .calls
        .route(
            RoutingProfile::Transit,
            stop,
            &request.destination,
            departure_after(request.departure, walk.total_duration_minutes()),
        )
        .await?
        .pinned(stop, &request.destination);
    Ok(walk.then(ride))
}

/// Whether `at` is farther than `tolerance_km` from every place the baseline
/// passes through.
fn off_path(plan: &RoutePlan, at: &Location, tolerance_km: f64) -> bool {
    plan.segments
        .iter()
        .flat_map(|segment| {
            [&segment.start, &segment.end].into_iter().chain(
                segment
                    .transit
                    .iter()
                    .flat_map(|transit| transit.stops.iter().map(|stop| &stop.location)),
            )
        })
        .all(|place| place.distance_km(at) > tolerance_km)
}

#[expect(
    clippy::float_arithmetic,
    reason = "closeness is a floating-point distance"
)]
fn goal_gap(candidate: &Candidate, goals: &ActivityGoals) -> f64 {
    (candidate.metrics.walk_minutes - goals.walk_minutes).abs()
        + (candidate.metrics.bike_minutes - goals.bike_minutes).abs()
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "search radii are clamped to the u32 range before conversion"
)]
fn meters(km: f64) -> u32 {
    (km * 1000.0).round().clamp(0.0, f64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::BaselineAnalyzer;
    use healthroute_core::test_support::{StubMobilityClient, StubRoutingClient, parking};
    use healthroute_core::{
        PlanRequest, PlannerConfig, Preferences, RequestId, RouteSegment, TravelMode,
    };
    use jiff::Timestamp;
    use rstest::rstest;
    use std::sync::Arc;

    // One kilometre of latitude.
    const KM: f64 = 0.008_993;

    fn origin() -> Location {
        Location::named(47.2000, -1.5500, "origin")
    }

    fn destination() -> Location {
        Location::named(47.2000 + 5.0 * KM, -1.5500, "destination")
    }

    fn east_of_origin(km: f64) -> Location {
        // Longitude degrees shrink with latitude; 47.2° gives ~0.6794.
        Location::new(47.2000, -1.5500 + km * KM / 0.6794)
    }

    fn context(
        goals: ActivityGoals,
        mobility: StubMobilityClient,
        config: PlannerConfig,
    ) -> StrategyContext {
        let request = PlanRequest::new(
            origin(),
            destination(),
            Timestamp::UNIX_EPOCH,
            goals,
            RequestId::new("req-b"),
        );
        let baseline = RoutePlan::new(vec![RouteSegment::new(
            TravelMode::Transit,
            origin(),
            destination(),
            20.0,
            5.0,
        )]);
        StrategyContext {
            baseline: BaselineAnalyzer::new(config.baseline).analyze(baseline),
            calls: Collaborators::new(
                Arc::new(StubRoutingClient::new()),
                Arc::new(mobility),
                config.calls,
                request.request_id.clone(),
            ),
            request,
            config,
        }
    }

    fn bike_mobility() -> StubMobilityClient {
        StubMobilityClient::new()
            .with_parkings(
                &origin(),
                vec![
                    parking("p-origin", Location::new(47.2000 + 0.3 * KM, -1.5500), 4),
                    parking("p-empty", Location::new(47.2000 + 0.2 * KM, -1.5500), 0),
                ],
            )
            .with_parkings(
                &destination(),
                vec![parking("p-dest", Location::new(47.2000 + 4.7 * KM, -1.5500), 6)],
            )
    }

    fn modes(candidate: &Candidate) -> Vec<TravelMode> {
        candidate.plan.segments.iter().map(|s| s.mode).collect()
    }

    #[rstest]
    #[tokio::test]
    async fn bike_mode_rides_between_parkings() {
        let config = PlannerConfig::default();
        let ctx = context(ActivityGoals::new(10.0, 15.0), bike_mobility(), config);
        let candidates = WaypointInsertion::new(config.waypoint)
            .run(&ctx)
            .await
            .into_candidates();
        assert_eq!(candidates.len(), 1);
        let candidate = candidates.first().expect("bike candidate");
        assert_eq!(
            modes(candidate),
            vec![TravelMode::Walk, TravelMode::Bike, TravelMode::Walk]
        );
        assert!(candidate.comfort.uses_confirmed_parking);
        assert!(candidate.plan.is_chained());
        assert!(candidate.plan.reaches(&destination()));
        assert!(candidate.metrics.bike_minutes > 15.0);
    }

    #[rstest]
    #[tokio::test]
    async fn identical_parkings_are_not_paired() {
        let shared = parking("shared", Location::new(47.2000 + 2.5 * KM, -1.5500), 3);
        let mobility = StubMobilityClient::new()
            .with_parkings(&origin(), vec![shared.clone()])
            .with_parkings(&destination(), vec![shared]);
        let config = PlannerConfig::default();
        let ctx = context(ActivityGoals::new(10.0, 15.0), mobility, config);
        let candidates = WaypointInsertion::new(config.waypoint)
            .run(&ctx)
            .await
            .into_candidates();
        assert!(candidates.is_empty(), "no stops are known either");
    }

    #[rstest]
    #[tokio::test]
    async fn walk_mode_boards_at_a_farther_stop() {
        let mobility = StubMobilityClient::new().with_stops(
            &origin(),
            vec![
                TransitStopInfo {
                    id: "near".to_owned(),
                    location: east_of_origin(0.2),
                    lines: vec!["C3".to_owned()],
                },
                TransitStopInfo {
                    id: "far".to_owned(),
                    location: east_of_origin(1.3),
                    lines: vec!["4".to_owned()],
                },
                TransitStopInfo {
                    id: "kilometre".to_owned(),
                    location: east_of_origin(1.0),
                    lines: vec!["C1".to_owned()],
                },
            ],
        );
        let config = PlannerConfig::default();
        let ctx = context(ActivityGoals::walking(12.0), mobility, config);
        let candidates = WaypointInsertion::new(config.waypoint)
            .run(&ctx)
            .await
            .into_candidates();
        assert_eq!(candidates.len(), 2, "the 0.2 km stop is outside the band");
        let best = candidates.first().expect("closest to goal");
        assert_eq!(best.ordinal, 0);
        assert_eq!(modes(best), vec![TravelMode::Walk, TravelMode::Transit]);
        assert!((best.metrics.walk_minutes - 12.0).abs() < 0.5);
    }

    #[rstest]
    #[tokio::test]
    async fn negligible_added_walks_are_rejected() {
        let mobility = StubMobilityClient::new().with_stops(
            &origin(),
            vec![TransitStopInfo {
                id: "kilometre".to_owned(),
                location: east_of_origin(1.0),
                lines: Vec::new(),
            }],
        );
        let mut config = PlannerConfig::default();
        config.waypoint.min_added_walk_minutes = 15.0;
        let ctx = context(ActivityGoals::walking(12.0), mobility, config);
        assert_eq!(
            WaypointInsertion::new(config.waypoint).run(&ctx).await,
            StrategyOutcome::Generated(Vec::new())
        );
    }

    #[rstest]
    #[tokio::test]
    async fn top_n_bounds_each_sub_mode() {
        let mobility = StubMobilityClient::new()
            .with_parkings(
                &origin(),
                vec![
                    parking("o1", Location::new(47.2000 + 0.3 * KM, -1.5500), 4),
                    parking("o2", east_of_origin(0.4), 4),
                ],
            )
            .with_parkings(
                &destination(),
                vec![
                    parking("d1", Location::new(47.2000 + 4.7 * KM, -1.5500), 4),
                    parking("d2", Location::new(47.2000 + 4.6 * KM, -1.5500), 4),
                ],
            );
        let mut config = PlannerConfig::default();
        config.waypoint.top_n = 3;
        let ctx = context(ActivityGoals::new(8.0, 15.0), mobility, config);
        let candidates = WaypointInsertion::new(config.waypoint)
            .run(&ctx)
            .await
            .into_candidates();
        assert_eq!(candidates.len(), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn unavailable_mobility_makes_the_strategy_unavailable() {
        let config = PlannerConfig::default();
        let ctx = context(
            ActivityGoals::new(10.0, 15.0),
            StubMobilityClient::new().failing(),
            config,
        );
        let outcome = WaypointInsertion::new(config.waypoint).run(&ctx).await;
        assert!(matches!(outcome, StrategyOutcome::Unavailable(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn bike_preference_enables_bike_mode_without_a_goal() {
        let config = PlannerConfig::default();
        let mut ctx = context(ActivityGoals::walking(10.0), bike_mobility(), config);
        ctx.request.preferences = Preferences {
            prefer_bike_parkings: true,
            ..Preferences::default()
        };
        let candidates = WaypointInsertion::new(config.waypoint)
            .run(&ctx)
            .await
            .into_candidates();
        assert!(candidates.first().is_some_and(|c| c.comfort.uses_confirmed_parking));
    }

    #[rstest]
    #[case(1.5, 1500)]
    #[case(0.0, 0)]
    #[case(-2.0, 0)]
    fn radii_convert_to_meters(#[case] km: f64, #[case] expected: u32) {
        assert_eq!(meters(km), expected);
    }
}
