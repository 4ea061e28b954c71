//! Facade crate for the healthroute trip-enrichment engine.
//!
//! This crate re-exports the core domain types and exposes the planner and
//! the HTTP collaborators behind feature flags.

#![forbid(unsafe_code)]

pub use healthroute_core::{
    ActivityGoals, BikeParking, Location, MobilityClient, Plan, PlanOutcome, PlanRequest,
    PlanRequestInput, PlanResponse, PlannerConfig, RequestId, RequestValidationError, RoutePlan,
    RouteSegment, RoutingClient, RoutingProfile, TravelMode, UpstreamError,
};

#[cfg(feature = "test-support")]
pub use healthroute_core::test_support;

#[cfg(feature = "planner")]
pub use healthroute_planner::{PlanError, Planner};

#[cfg(feature = "http")]
pub use healthroute_data::{HttpClientConfig, HttpMobilityClient, HttpRoutingClient};
