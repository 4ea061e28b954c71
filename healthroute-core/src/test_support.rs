//! Scripted collaborator doubles for unit and behaviour tests.
//!
//! [`StubRoutingClient`] answers from keyed stubs and falls back to a
//! straight-line itinerary for anything unscripted, so tests only describe
//! the legs they care about. Failures and latency can be injected per
//! profile; every call is recorded.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;

use crate::{
    BikeParking, Location, MobilityClient, RequestId, RoutePlan, RouteSegment, RoutingClient,
    RoutingProfile, TransitStopInfo, TravelMode, UpstreamError,
};

/// Walking speed of synthetic itineraries.
pub const STUB_WALK_KMH: f64 = 5.0;
/// Cycling speed of synthetic itineraries.
pub const STUB_BIKE_KMH: f64 = 15.0;
/// Transit speed of synthetic itineraries.
pub const STUB_TRANSIT_KMH: f64 = 20.0;

/// A `route` call observed by [`StubRoutingClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RouteCall {
    /// Requested profile.
    pub profile: RoutingProfile,
    /// Requested start.
    pub from: Location,
    /// Requested end.
    pub to: Location,
    /// Requested departure.
    pub departure: Timestamp,
    /// Forwarded request id.
    pub request_id: RequestId,
}

/// A `circular_route` call observed by [`StubRoutingClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoopCall {
    /// Loop anchor.
    pub center: Location,
    /// Requested radius.
    pub radius_km: f64,
    /// Requested profile.
    pub profile: RoutingProfile,
    /// Forwarded request id.
    pub request_id: RequestId,
}

#[derive(Debug, Clone)]
struct RouteStub {
    profile: RoutingProfile,
    from: Location,
    to: Location,
    response: Result<RoutePlan, UpstreamError>,
}

#[derive(Debug, Clone)]
struct LoopStub {
    center: Location,
    response: Result<RoutePlan, UpstreamError>,
}

/// Scripted [`RoutingClient`].
#[derive(Debug, Default)]
pub struct StubRoutingClient {
    routes: Vec<RouteStub>,
    loops: Vec<LoopStub>,
    always_failing: HashSet<RoutingProfile>,
    loops_failing: bool,
    failures_left: Mutex<HashMap<RoutingProfile, u32>>,
    latency: HashMap<RoutingProfile, Duration>,
    loop_latency: Option<Duration>,
    route_calls: Mutex<Vec<RouteCall>>,
    loop_calls: Mutex<Vec<LoopCall>>,
}

impl StubRoutingClient {
    /// A client answering every call synthetically.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `profile` calls between `from` and `to` with `plan`.
    #[must_use]
    pub fn with_route(
        mut self,
        profile: RoutingProfile,
        from: &Location,
        to: &Location,
        plan: RoutePlan,
    ) -> Self {
        self.routes.push(RouteStub {
            profile,
            from: from.clone(),
            to: to.clone(),
            response: Ok(plan),
        });
        self
    }

    /// Answer `profile` calls between `from` and `to` with `error`.
    #[must_use]
    pub fn with_route_error(
        mut self,
        profile: RoutingProfile,
        from: &Location,
        to: &Location,
        error: UpstreamError,
    ) -> Self {
        self.routes.push(RouteStub {
            profile,
            from: from.clone(),
            to: to.clone(),
            response: Err(error),
        });
        self
    }

    /// Answer loops anchored at `center` with `plan`.
    #[must_use]
    pub fn with_loop(mut self, center: &Location, plan: RoutePlan) -> Self {
        self.loops.push(LoopStub {
            center: center.clone(),
            response: Ok(plan),
        });
        self
    }

    /// Answer loops anchored at `center` with `error`.
    #[must_use]
    pub fn with_loop_error(mut self, center: &Location, error: UpstreamError) -> Self {
        self.loops.push(LoopStub {
            center: center.clone(),
            response: Err(error),
        });
        self
    }

    /// Fail every `profile` call with a retryable timeout.
    #[must_use]
    pub fn failing(mut self, profile: RoutingProfile) -> Self {
        self.always_failing.insert(profile);
        self
    }

    /// Fail every loop call with a retryable timeout.
    #[must_use]
    pub const fn failing_loops(mut self) -> Self {
        self.loops_failing = true;
        self
    }

    /// Fail the first `count` calls for `profile` with a retryable network
    /// error, then answer normally.
    #[must_use]
    pub fn failing_first(self, profile: RoutingProfile, count: u32) -> Self {
        self.failures_left
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(profile, count);
        self
    }

    /// Delay every `profile` call by `delay`.
    #[must_use]
    pub fn with_latency(mut self, profile: RoutingProfile, delay: Duration) -> Self {
        self.latency.insert(profile, delay);
        self
    }

    /// Delay every loop call by `delay`.
    #[must_use]
    pub const fn with_loop_latency(mut self, delay: Duration) -> Self {
        self.loop_latency = Some(delay);
        self
    }

    /// Every `route` call so far, in arrival order.
    #[must_use]
    pub fn route_calls(&self) -> Vec<RouteCall> {
        self.route_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Every `circular_route` call so far, in arrival order.
    #[must_use]
    pub fn loop_calls(&self) -> Vec<LoopCall> {
        self.loop_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `route` calls made for `profile`.
    #[must_use]
    pub fn call_count(&self, profile: RoutingProfile) -> usize {
        self.route_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| call.profile == profile)
            .count()
    }

    fn take_scripted_failure(&self, profile: RoutingProfile) -> bool {
        let mut failures = self
            .failures_left
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match failures.get_mut(&profile) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl RoutingClient for StubRoutingClient {
    async fn route(
        &self,
        profile: RoutingProfile,
        from: &Location,
        to: &Location,
        departure: Timestamp,
        request_id: &RequestId,
    ) -> Result<RoutePlan, UpstreamError> {
        self.route_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RouteCall {
                profile,
                from: from.clone(),
                to: to.clone(),
                departure,
                request_id: request_id.clone(),
            });
        if let Some(delay) = self.latency.get(&profile) {
            tokio::time::sleep(*delay).await;
        }
        if self.always_failing.contains(&profile) {
            return Err(timeout("routing"));
        }
        if self.take_scripted_failure(profile) {
            return Err(UpstreamError::Network {
                url: format!("stub://routing/{}", profile.as_str()),
                message: "scripted failure".to_owned(),
            });
        }
        self.routes
            .iter()
            .find(|stub| stub.profile == profile && stub.from.same_place(from) && stub.to.same_place(to))
            .map_or_else(
                || Ok(straight_line(profile, from, to)),
                |stub| stub.response.clone(),
            )
    }

    async fn circular_route(
        &self,
        center: &Location,
        radius_km: f64,
        profile: RoutingProfile,
        request_id: &RequestId,
    ) -> Result<RoutePlan, UpstreamError> {
        self.loop_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LoopCall {
                center: center.clone(),
                radius_km,
                profile,
                request_id: request_id.clone(),
            });
        if let Some(delay) = self.loop_latency {
            tokio::time::sleep(delay).await;
        }
        if self.loops_failing {
            return Err(timeout("routing"));
        }
        self.loops
            .iter()
            .find(|stub| stub.center.same_place(center))
            .map_or_else(
                || Ok(synthetic_loop(center, radius_km)),
                |stub| stub.response.clone(),
            )
    }
}

/// Scripted [`MobilityClient`] keyed by query location.
#[derive(Debug, Default)]
pub struct StubMobilityClient {
    parkings: Vec<(Location, Vec<BikeParking>)>,
    stops: Vec<(Location, Vec<TransitStopInfo>)>,
    failing: bool,
    latency: Option<Duration>,
    calls: Mutex<usize>,
}

impl StubMobilityClient {
    /// A client knowing no infrastructure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `parkings` for queries at `at`.
    #[must_use]
    pub fn with_parkings(mut self, at: &Location, parkings: Vec<BikeParking>) -> Self {
        self.parkings.push((at.clone(), parkings));
        self
    }

    /// Return `stops` for queries at `at`.
    #[must_use]
    pub fn with_stops(mut self, at: &Location, stops: Vec<TransitStopInfo>) -> Self {
        self.stops.push((at.clone(), stops));
        self
    }

    /// Fail every call with a retryable timeout.
    #[must_use]
    pub const fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Delay every call by `delay`.
    #[must_use]
    pub const fn with_latency(mut self, delay: Duration) -> Self {
        self.latency = Some(delay);
        self
    }

    /// Number of calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn enter(&self) -> Result<(), UpstreamError> {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        if let Some(delay) = self.latency {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            Err(timeout("mobility"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MobilityClient for StubMobilityClient {
    async fn nearby_parkings(
        &self,
        at: &Location,
        _radius_meters: u32,
        min_available: u32,
        _request_id: &RequestId,
    ) -> Result<Vec<BikeParking>, UpstreamError> {
        self.enter().await?;
        Ok(self
            .parkings
            .iter()
            .find(|(anchor, _)| anchor.same_place(at))
            .map(|(_, parkings)| {
                parkings
                    .iter()
                    .filter(|p| p.available >= min_available)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn nearby_stops(
        &self,
        at: &Location,
        _radius_meters: u32,
        _request_id: &RequestId,
    ) -> Result<Vec<TransitStopInfo>, UpstreamError> {
        self.enter().await?;
        Ok(self
            .stops
            .iter()
            .find(|(anchor, _)| anchor.same_place(at))
            .map(|(_, stops)| stops.clone())
            .unwrap_or_default())
    }
}

/// Single-segment itinerary at the stub speed for `profile`.
#[must_use]
pub fn straight_line(profile: RoutingProfile, from: &Location, to: &Location) -> RoutePlan {
    let (mode, speed) = match profile {
        RoutingProfile::Walk => (TravelMode::Walk, STUB_WALK_KMH),
        RoutingProfile::Bike => (TravelMode::Bike, STUB_BIKE_KMH),
        RoutingProfile::Transit => (TravelMode::Transit, STUB_TRANSIT_KMH),
    };
    let km = from.distance_km(to);
    RoutePlan::new(vec![RouteSegment::new(
        mode,
        from.clone(),
        to.clone(),
        km / speed * 60.0,
        km,
    )])
}

/// Walking loop of length `2 * radius_km` returning to `center`.
#[must_use]
pub fn synthetic_loop(center: &Location, radius_km: f64) -> RoutePlan {
    let km = 2.0 * radius_km;
    RoutePlan::new(vec![RouteSegment::new(
        TravelMode::Walk,
        center.clone(),
        center.clone(),
        km / STUB_WALK_KMH * 60.0,
        km,
    )])
}

fn timeout(service: &str) -> UpstreamError {
    UpstreamError::Timeout {
        service: service.to_owned(),
        timeout_ms: 0,
    }
}

/// Bike parking fixture with `available` free spaces.
#[must_use]
pub fn parking(id: &str, location: Location, available: u32) -> BikeParking {
    BikeParking {
        id: id.to_owned(),
        name: format!("Parking {id}"),
        location,
        capacity: available.max(10),
        available,
    }
}
