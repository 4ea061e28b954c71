//! Core domain types for the healthroute trip-enrichment engine.
//!
//! The crate is pure: it performs no I/O and never reads the clock. It
//! defines itineraries ([`RoutePlan`]), requests ([`PlanRequest`]), the
//! collaborator seams ([`RoutingClient`], [`MobilityClient`]), and the
//! deterministic post-generation pipeline:
//! [`ConstraintValidator`], [`ScoringEngine`], [`Ranker`] and
//! [`ExplanationGenerator`].

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod candidate;
pub mod collaborator;
mod config;
pub mod explanation;
mod location;
mod ranker;
mod request;
mod response;
mod route;
mod scoring;
mod validator;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use candidate::{
    Candidate, CandidateMetrics, ComfortFlags, EvaluationMetrics, Provenance, ScoreBreakdown,
    ScoredCandidate,
};
pub use collaborator::{
    BikeParking, MobilityClient, RoutingClient, RoutingProfile, TransitStopInfo, UpstreamError,
};
pub use config::{
    BaselineConfig, CallPolicy, LoopPaddingConfig, PlannerConfig, ScoringConfig,
    WaitToWalkConfig, WaypointConfig,
};
pub use explanation::ExplanationGenerator;
pub use location::{Location, LocationInput};
pub use ranker::{Ranker, Ranking};
pub use request::{
    ActivityGoals, PlanRequest, PlanRequestInput, Preferences, RequestId, RequestValidationError,
    TripConstraints,
};
pub use response::{
    ActivityMetrics, GenerationDiagnostics, Plan, PlanOutcome, PlanResponse, PlanType,
    StrategyReport, StrategyStatus,
};
pub use route::{
    BaselineMetrics, PlanMetrics, RoutePlan, RouteSegment, TransitDetails, TransitStop, TravelMode,
};
pub use scoring::ScoringEngine;
pub use validator::{ConstraintValidator, ConstraintViolation};
