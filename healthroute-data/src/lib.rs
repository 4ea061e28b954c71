//! HTTP collaborators for the healthroute engine.
//!
//! Responsibilities:
//! - Implement [`healthroute_core::RoutingClient`] and
//!   [`healthroute_core::MobilityClient`] over the services' JSON APIs.
//! - Forward the request's correlation identifier on every call.
//! - Map transport failures onto [`healthroute_core::UpstreamError`].
//!
//! Boundaries:
//! - No retries or per-call budgets; the planner applies its call policy on
//!   top of these clients.
//! - No domain rules (live in `healthroute-core`).

#![forbid(unsafe_code)]

mod config;
pub mod mobility;
pub mod routing;
mod service;

pub use config::{ClientBuildError, DEFAULT_USER_AGENT, HttpClientConfig, REQUEST_ID_HEADER};
pub use mobility::HttpMobilityClient;
pub use routing::HttpRoutingClient;
