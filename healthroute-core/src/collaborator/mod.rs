//! Seams to the external routing and mobility services.
//!
//! The engine never talks to a network directly. It calls a
//! [`RoutingClient`] for itineraries and a [`MobilityClient`] for bike
//! parkings and transit stops, forwarding the request's [`RequestId`] on
//! every call. Implementations live in adapter crates; deterministic stubs
//! live in [`crate::test_support`].
//!
//! [`RequestId`]: crate::RequestId

mod error;
mod mobility;
mod routing;

pub use error::UpstreamError;
pub use mobility::{BikeParking, MobilityClient, TransitStopInfo};
pub use routing::{RoutingClient, RoutingProfile};
