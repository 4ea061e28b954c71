//! Behavioural tests for `Planner::generate_plan` using rstest-bdd.

use std::cell::RefCell;
use std::sync::Arc;

use healthroute_core::test_support::{StubMobilityClient, StubRoutingClient};
use healthroute_core::{
    ActivityGoals, Location, PlanOutcome, PlanRequest, PlanResponse, PlanType, Provenance,
    RequestId, RoutePlan, RouteSegment, RoutingProfile, TransitDetails, TransitStop, TravelMode,
    TripConstraints,
};
use healthroute_planner::{PlanError, Planner};
use jiff::Timestamp;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Trip {
    #[default]
    Direct,
    Waiting,
    TransitDown,
}

#[derive(Debug, Default)]
struct PlanWorld {
    trip: RefCell<Trip>,
    baseline_walk_minutes: RefCell<f64>,
    walk_goal: RefCell<f64>,
    constraints: RefCell<TripConstraints>,
    outcome: RefCell<Option<Result<PlanResponse, PlanError>>>,
}

fn origin() -> Location {
    Location::named(47.2000, -1.5500, "origin")
}

fn later_stop() -> Location {
    Location::named(47.2072, -1.5500, "later stop")
}

fn destination() -> Location {
    Location::named(47.2450, -1.5500, "destination")
}

fn ride(from: Location, to: Location, minutes: f64, km: f64) -> RouteSegment {
    RouteSegment::new(TravelMode::Transit, from, to, minutes, km)
}

impl PlanWorld {
    fn routing(&self) -> StubRoutingClient {
        let walk = *self.baseline_walk_minutes.borrow();
        match *self.trip.borrow() {
            Trip::Direct => {
                let mut segments = Vec::new();
                if walk > 0.0 {
                    segments.push(RouteSegment::new(
                        TravelMode::Walk,
                        origin(),
                        origin(),
                        walk,
                        0.4,
                    ));
                }
                segments.push(ride(origin(), destination(), 30.0 - walk, 4.6));
                StubRoutingClient::new().with_route(
                    RoutingProfile::Transit,
                    &origin(),
                    &destination(),
                    RoutePlan::new(segments),
                )
            }
            Trip::Waiting => StubRoutingClient::new()
                .with_route(
                    RoutingProfile::Transit,
                    &origin(),
                    &destination(),
                    RoutePlan::new(vec![
                        RouteSegment::wait(origin(), 15.0),
                        ride(origin(), destination(), 15.0, 5.0).with_transit(TransitDetails {
                            line: "C3".to_owned(),
                            stops: vec![
                                TransitStop::untimed(later_stop()),
                                TransitStop::untimed(destination()),
                            ],
                        }),
                    ]),
                )
                .with_route(
                    RoutingProfile::Walk,
                    &origin(),
                    &later_stop(),
                    RoutePlan::new(vec![RouteSegment::new(
                        TravelMode::Walk,
                        origin(),
                        later_stop(),
                        10.0,
                        0.8,
                    )]),
                )
                .with_route(
                    RoutingProfile::Transit,
                    &later_stop(),
                    &destination(),
                    RoutePlan::new(vec![
                        RouteSegment::wait(later_stop(), 2.0),
                        ride(later_stop(), destination(), 15.0, 4.2),
                    ]),
                ),
            Trip::TransitDown => StubRoutingClient::new().failing(RoutingProfile::Transit),
        }
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn expect_response(&self) -> PlanResponse {
        self.outcome
            .borrow()
            .as_ref()
            .expect("a plan should be generated before assertions")
            .as_ref()
            .cloned()
            .expect("plan generation should succeed")
    }
}

#[fixture]
fn world() -> PlanWorld {
    PlanWorld::default()
}

#[given("a trip with a 15 minute wait at the boarding stop")]
fn given_waiting_trip(world: &PlanWorld) {
    world.trip.replace(Trip::Waiting);
}

#[given("a trip whose transit routing is unavailable")]
fn given_transit_down(world: &PlanWorld) {
    world.trip.replace(Trip::TransitDown);
}

#[given("a direct trip of 30 minutes")]
fn given_direct_trip(world: &PlanWorld) {
    world.trip.replace(Trip::Direct);
}

#[given("a baseline that already walks {minutes:f64} minutes")]
fn given_baseline_walk(world: &PlanWorld, minutes: f64) {
    world.baseline_walk_minutes.replace(minutes);
}

#[given("a walk goal of {minutes:f64} minutes")]
fn given_walk_goal(world: &PlanWorld, minutes: f64) {
    world.walk_goal.replace(minutes);
}

#[given("a maximum detour of {percent:f64} percent")]
fn given_max_percent(world: &PlanWorld, percent: f64) {
    world.constraints.borrow_mut().max_detour_percent = Some(percent);
}

#[when("a plan is generated")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn when_generated(world: &PlanWorld) {
    let planner = Planner::new(
        Arc::new(world.routing()),
        Arc::new(StubMobilityClient::new()),
    );
    let request = PlanRequest::new(
        origin(),
        destination(),
        Timestamp::UNIX_EPOCH,
        ActivityGoals::walking(*world.walk_goal.borrow()),
        RequestId::new("req-bdd"),
    )
    .with_constraints(*world.constraints.borrow());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime should build");
    let outcome = runtime.block_on(planner.generate_plan(&request));
    world.outcome.replace(Some(outcome));
}

#[then("the recommended plan comes from {strategy:word}")]
fn then_recommended_from(world: &PlanWorld, strategy: String) {
    let response = world.expect_response();
    assert_eq!(response.outcome, PlanOutcome::Enriched);
    let provenance = response.recommended.and_then(|plan| plan.provenance);
    assert_eq!(provenance.map(Provenance::as_str), Some(strategy.as_str()));
}

#[then("the recommended plan takes {minutes:f64} minutes")]
fn then_recommended_takes(world: &PlanWorld, minutes: f64) {
    let response = world.expect_response();
    let total = response
        .recommended
        .map(|plan| plan.total_duration_minutes)
        .unwrap_or_default();
    assert!((total - minutes).abs() < 1e-9, "took {total} minutes");
}

#[then("only a fallback plan is returned")]
fn then_fallback_only(world: &PlanWorld) {
    let response = world.expect_response();
    assert_eq!(response.outcome, PlanOutcome::EnrichmentUnavailable);
    assert!(response.recommended.is_none());
    assert!(response.alternatives.is_empty());
    assert_eq!(response.fallback.plan_type, PlanType::Normal);
}

#[then("the fallback plan is recommended")]
fn then_fallback_recommended(world: &PlanWorld) {
    let response = world.expect_response();
    assert_eq!(response.outcome, PlanOutcome::NoViableCandidate);
    assert!(response.alternatives.is_empty());
    assert_eq!(
        response.recommended.map(|plan| plan.segments),
        Some(response.fallback.segments)
    );
}

#[then("the explanation mentions {word:word}")]
fn then_explanation_mentions(world: &PlanWorld, word: String) {
    let response = world.expect_response();
    assert!(
        response.explanation.contains(&word),
        "explanation was {:?}",
        response.explanation
    );
}

#[then("loop padding contributes no candidates")]
fn then_no_loops(world: &PlanWorld) {
    let response = world.expect_response();
    let report = response
        .diagnostics
        .strategies
        .iter()
        .find(|report| report.strategy == Provenance::LoopPadding);
    assert_eq!(report.map(|r| r.candidates), Some(0));
}

#[scenario(path = "tests/features/plan_generation.feature", index = 0)]
fn long_wait_becomes_walk(world: PlanWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/plan_generation.feature", index = 1)]
fn unavailable_baseline_falls_back(world: PlanWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/plan_generation.feature", index = 2)]
fn constraints_leave_no_candidate(world: PlanWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/plan_generation.feature", index = 3)]
fn no_deficit_no_loop(world: PlanWorld) {
    let _ = world;
}
