//! HTTP adapter for the mobility service.
//!
//! [`HttpMobilityClient`] implements [`healthroute_core::MobilityClient`]
//! against `GET /bike-parkings/nearby` and `GET /stops/nearby`.

mod client;
mod wire;

pub use client::HttpMobilityClient;
pub use wire::{NearbyStopDto, ParkingDto};
