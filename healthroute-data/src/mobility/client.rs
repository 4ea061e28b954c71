//! `MobilityClient` over the mobility service's HTTP API.

use async_trait::async_trait;
use healthroute_core::{
    BikeParking, Location, MobilityClient, RequestId, TransitStopInfo, UpstreamError,
};
use log::debug;
use url::Url;

use super::wire::{NearbyStopDto, ParkingDto};
use crate::{ClientBuildError, HttpClientConfig, service::JsonService};

/// HTTP mobility collaborator.
#[derive(Debug, Clone)]
pub struct HttpMobilityClient {
    service: JsonService,
}

impl HttpMobilityClient {
    /// Create a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable or the HTTP client fails
    /// to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(HttpClientConfig::new(base_url))
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is unusable or the HTTP client fails
    /// to build.
    pub fn with_config(config: HttpClientConfig) -> Result<Self, ClientBuildError> {
        Ok(Self {
            service: JsonService::new("mobility", config)?,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpClientConfig {
        self.service.config()
    }

    fn build_parkings_url(&self, at: &Location, radius_meters: u32, min_available: u32) -> Url {
        self.service.endpoint(
            &["bike-parkings", "nearby"],
            &[
                ("lat", at.lat.to_string()),
                ("lon", at.lon.to_string()),
                ("radius", radius_meters.to_string()),
                ("min_available", min_available.to_string()),
            ],
        )
    }

    fn build_stops_url(&self, at: &Location, radius_meters: u32) -> Url {
        self.service.endpoint(
            &["stops", "nearby"],
            &[
                ("lat", at.lat.to_string()),
                ("lon", at.lon.to_string()),
                ("radius", radius_meters.to_string()),
            ],
        )
    }
}

#[async_trait]
impl MobilityClient for HttpMobilityClient {
    async fn nearby_parkings(
        &self,
        at: &Location,
        radius_meters: u32,
        min_available: u32,
        request_id: &RequestId,
    ) -> Result<Vec<BikeParking>, UpstreamError> {
        let url = self.build_parkings_url(at, radius_meters, min_available);
        let listed: Vec<ParkingDto> = self.service.get_json(url, request_id).await?;
        let parkings = usable_parkings(listed, min_available);
        debug!(
            "request_id={request_id} found {} bike parkings within {radius_meters}m",
            parkings.len()
        );
        Ok(parkings)
    }

    async fn nearby_stops(
        &self,
        at: &Location,
        radius_meters: u32,
        request_id: &RequestId,
    ) -> Result<Vec<TransitStopInfo>, UpstreamError> {
        let url = self.build_stops_url(at, radius_meters);
        let listed: Vec<NearbyStopDto> = self.service.get_json(url, request_id).await?;
        Ok(listed.into_iter().map(Into::into).collect())
    }
}

/// Drop closed parkings and those below `min_available`, keeping the
/// service's nearest-first order.
fn usable_parkings(listed: Vec<ParkingDto>, min_available: u32) -> Vec<BikeParking> {
    listed
        .into_iter()
        .filter(|dto| !dto.is_closed())
        .map(BikeParking::from)
        .filter(|parking| parking.available >= min_available)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn client() -> HttpMobilityClient {
        HttpMobilityClient::new("http://mobility.example.com").expect("client should build")
    }

    fn dto(id: &str, available: u32, status: Option<&str>) -> ParkingDto {
        ParkingDto {
            id: id.to_owned(),
            name: None,
            lat: 47.2,
            lon: -1.55,
            capacity: 10,
            available: Some(available),
            distance_meters: None,
            status: status.map(str::to_owned),
        }
    }

    #[rstest]
    fn build_parkings_url_lists_search_parameters(client: HttpMobilityClient) {
        let url = client.build_parkings_url(&Location::new(47.2184, -1.5536), 500, 1);

        assert_eq!(
            url.as_str(),
            "http://mobility.example.com/bike-parkings/nearby?lat=47.2184&lon=-1.5536&radius=500&min_available=1"
        );
    }

    #[rstest]
    fn build_stops_url_lists_search_parameters(client: HttpMobilityClient) {
        let url = client.build_stops_url(&Location::new(47.2184, -1.5536), 1500);

        assert_eq!(
            url.as_str(),
            "http://mobility.example.com/stops/nearby?lat=47.2184&lon=-1.5536&radius=1500"
        );
    }

    #[rstest]
    fn usable_parkings_filters_closed_and_empty() {
        let parkings = usable_parkings(
            vec![
                dto("P1", 3, Some("open")),
                dto("P2", 0, None),
                dto("P3", 5, Some("closed")),
                dto("P4", 1, None),
            ],
            1,
        );

        let ids: Vec<&str> = parkings.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P4"]);
    }
}
