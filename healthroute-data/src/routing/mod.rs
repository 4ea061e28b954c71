//! HTTP adapter for the routing service.
//!
//! [`HttpRoutingClient`] implements [`healthroute_core::RoutingClient`]
//! against `GET /route` and `GET /route/circular`, forwarding the caller's
//! request identifier in the `X-Request-Id` header.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use healthroute_core::{Location, RequestId, RoutingClient, RoutingProfile};
//! use healthroute_data::{HttpClientConfig, routing::HttpRoutingClient};
//! use jiff::Timestamp;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpClientConfig::new("http://localhost:8002")
//!     .with_timeout(Duration::from_secs(5));
//! let client = HttpRoutingClient::with_config(config)?;
//!
//! let plan = client
//!     .route(
//!         RoutingProfile::Transit,
//!         &Location::new(47.2184, -1.5536),
//!         &Location::new(47.2065, -1.5390),
//!         Timestamp::now(),
//!         &RequestId::new("demo"),
//!     )
//!     .await?;
//! println!("{} segments", plan.segments.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod wire;

pub use client::HttpRoutingClient;
pub use wire::{RouteResponse, SegmentDto, StopDto};
