//! `RoutingClient` over the routing service's HTTP API.

use async_trait::async_trait;
use healthroute_core::{
    Location, RequestId, RoutePlan, RouteSegment, RoutingClient, RoutingProfile, TransitDetails,
    TravelMode, UpstreamError,
};
use jiff::Timestamp;
use url::Url;

use super::wire::{RouteResponse, SegmentDto, parse_mode};
use crate::{ClientBuildError, HttpClientConfig, service::JsonService};

/// HTTP routing collaborator.
///
/// The client is cheap to clone and safe to share between concurrent
/// strategy tasks.
#[derive(Debug, Clone)]
pub struct HttpRoutingClient {
    service: JsonService,
}

impl HttpRoutingClient {
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
            service: JsonService::new("routing", config)?,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpClientConfig {
        self.service.config()
    }

    /// `{base_url}/route?mode=..&from_lat=..&from_lon=..&to_lat=..&to_lon=..&time=..`
    fn build_route_url(
        &self,
        profile: RoutingProfile,
        from: &Location,
        to: &Location,
        departure: Timestamp,
    ) -> Url {
        self.service.endpoint(
            &["route"],
            &[
                ("mode", profile.as_str().to_owned()),
                ("from_lat", from.lat.to_string()),
                ("from_lon", from.lon.to_string()),
                ("to_lat", to.lat.to_string()),
                ("to_lon", to.lon.to_string()),
                ("time", departure.to_string()),
            ],
        )
    }

    /// `{base_url}/route/circular?center_lat=..&center_lon=..&radius_km=..&mode=..`
    fn build_circular_url(
        &self,
        center: &Location,
        radius_km: f64,
        profile: RoutingProfile,
    ) -> Url {
        self.service.endpoint(
            &["route", "circular"],
            &[
                ("center_lat", center.lat.to_string()),
                ("center_lon", center.lon.to_string()),
                ("radius_km", radius_km.to_string()),
                ("mode", profile.as_str().to_owned()),
            ],
        )
    }
}

#[async_trait]
impl RoutingClient for HttpRoutingClient {
    async fn route(
        &self,
        profile: RoutingProfile,
        from: &Location,
        to: &Location,
        departure: Timestamp,
        request_id: &RequestId,
    ) -> Result<RoutePlan, UpstreamError> {
        let url = self.build_route_url(profile, from, to, departure);
        let response: RouteResponse = self.service.get_json(url, request_id).await?;
        convert_response(response, profile, from, to)
    }

    async fn circular_route(
        &self,
        center: &Location,
        radius_km: f64,
        profile: RoutingProfile,
        request_id: &RequestId,
    ) -> Result<RoutePlan, UpstreamError> {
        let url = self.build_circular_url(center, radius_km, profile);
        let response: RouteResponse = self.service.get_json(url, request_id).await?;
        convert_response(response, profile, center, center)
    }
}

const fn profile_mode(profile: RoutingProfile) -> TravelMode {
    match profile {
        RoutingProfile::Walk => TravelMode::Walk,
        RoutingProfile::Bike => TravelMode::Bike,
        RoutingProfile::Transit => TravelMode::Transit,
    }
}

/// Convert a routing response into a plan between `from` and `to`.
///
/// A response without segments becomes one segment in the profile's mode,
/// unless its totals are empty, which means the service found nothing.
fn convert_response(
    response: RouteResponse,
    profile: RoutingProfile,
    from: &Location,
    to: &Location,
) -> Result<RoutePlan, UpstreamError> {
    if response.segments.is_empty() {
        if response.duration_minutes <= 0.0 && response.distance_km <= 0.0 {
            return Err(UpstreamError::NoRoute);
        }
        let mut segment = RouteSegment::new(
            profile_mode(profile),
            from.clone(),
            to.clone(),
            response.duration_minutes,
            response.distance_km,
        );
        segment.geometry = response.geometry;
        return Ok(RoutePlan::new(vec![segment]));
    }

    let segments = response
        .segments
        .into_iter()
        .map(convert_segment)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RoutePlan::new(segments))
}

fn convert_segment(dto: SegmentDto) -> Result<RouteSegment, UpstreamError> {
    let mode = parse_mode(&dto.mode).ok_or_else(|| UpstreamError::Parse {
        message: format!("unknown segment mode {:?}", dto.mode),
    })?;
    let mut segment =
        RouteSegment::new(mode, dto.from, dto.to, dto.duration_minutes, dto.distance_km);
    segment.geometry = dto.geometry;
    segment.departs_at = dto.departs_at_minutes.filter(|m| m.is_finite());
    segment.stairs = dto.stairs;
    if mode == TravelMode::Transit && (dto.line.is_some() || !dto.stops.is_empty()) {
        segment.transit = Some(TransitDetails {
            line: dto.line.unwrap_or_default(),
            stops: dto.stops.into_iter().map(Into::into).collect(),
        });
    }
    Ok(segment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::StopDto;
    use rstest::{fixture, rstest};

    #[fixture]
    fn client() -> HttpRoutingClient {
        HttpRoutingClient::new("http://routing.example.com/").expect("client should build")
    }

    fn origin() -> Location {
        Location::new(47.2184, -1.5536)
    }

    fn destination() -> Location {
        Location::new(47.2065, -1.539)
    }

    fn query(url: &Url) -> Vec<(String, String)> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    fn segment(mode: &str, minutes: f64) -> SegmentDto {
        SegmentDto {
            mode: mode.to_owned(),
            from: origin(),
            to: destination(),
            duration_minutes: minutes,
            distance_km: 1.0,
            geometry: None,
            departs_at_minutes: None,
            line: None,
            stops: Vec::new(),
            stairs: false,
        }
    }

    #[rstest]
    fn build_route_url_lists_endpoints_and_time(client: HttpRoutingClient) {
        let departure: Timestamp = "2024-05-01T08:00:00Z".parse().expect("timestamp");

        let url = client.build_route_url(RoutingProfile::Transit, &origin(), &destination(), departure);

        assert_eq!(url.path(), "/route");
        assert_eq!(
            query(&url),
            vec![
                ("mode".to_owned(), "transit".to_owned()),
                ("from_lat".to_owned(), "47.2184".to_owned()),
                ("from_lon".to_owned(), "-1.5536".to_owned()),
                ("to_lat".to_owned(), "47.2065".to_owned()),
                ("to_lon".to_owned(), "-1.539".to_owned()),
                ("time".to_owned(), "2024-05-01T08:00:00Z".to_owned()),
            ]
        );
    }

    #[rstest]
    fn build_circular_url_uses_center_and_radius(client: HttpRoutingClient) {
        let url = client.build_circular_url(&origin(), 0.5, RoutingProfile::Walk);

        assert_eq!(url.path(), "/route/circular");
        assert!(query(&url).contains(&("radius_km".to_owned(), "0.5".to_owned())));
        assert!(query(&url).contains(&("mode".to_owned(), "walk".to_owned())));
    }

    #[rstest]
    fn convert_response_keeps_segment_details() {
        let mut tram = segment("TRAM", 20.0);
        tram.line = Some("1".to_owned());
        tram.departs_at_minutes = Some(7.0);
        tram.stops = vec![StopDto {
            lat: 47.2065,
            lon: -1.539,
            name: Some("Gare".to_owned()),
            offset_minutes: Some(20.0),
            offset_km: Some(4.0),
        }];
        let response = RouteResponse {
            distance_km: 1.0,
            duration_minutes: 20.0,
            geometry: None,
            segments: vec![tram],
        };

        let plan = convert_response(response, RoutingProfile::Transit, &origin(), &destination())
            .expect("should convert");

        let converted = plan.segments.first().expect("one segment");
        assert_eq!(converted.mode, TravelMode::Transit);
        assert_eq!(converted.departs_at, Some(7.0));
        let transit = converted.transit.as_ref().expect("transit details");
        assert_eq!(transit.line, "1");
        assert_eq!(transit.stops.len(), 1);
    }

    #[rstest]
    fn convert_response_synthesises_single_segment() {
        let response = RouteResponse {
            distance_km: 1.2,
            duration_minutes: 15.0,
            geometry: Some("encoded".to_owned()),
            segments: Vec::new(),
        };

        let plan = convert_response(response, RoutingProfile::Walk, &origin(), &destination())
            .expect("should convert");

        assert_eq!(plan.segments.len(), 1);
        let only = plan.segments.first().expect("one segment");
        assert_eq!(only.mode, TravelMode::Walk);
        assert_eq!(only.geometry.as_deref(), Some("encoded"));
        assert!(plan.reaches(&destination()));
    }

    #[rstest]
    fn convert_response_reports_empty_route() {
        let response = RouteResponse {
            distance_km: 0.0,
            duration_minutes: 0.0,
            geometry: None,
            segments: Vec::new(),
        };

        let err = convert_response(response, RoutingProfile::Walk, &origin(), &destination())
            .expect_err("should fail");

        assert_eq!(err, UpstreamError::NoRoute);
    }

    #[rstest]
    fn convert_response_rejects_unknown_modes() {
        let response = RouteResponse {
            distance_km: 1.0,
            duration_minutes: 10.0,
            geometry: None,
            segments: vec![segment("HOVERCRAFT", 10.0)],
        };

        let err = convert_response(response, RoutingProfile::Walk, &origin(), &destination())
            .expect_err("should fail");

        assert!(matches!(err, UpstreamError::Parse { .. }));
    }

    #[rstest]
    fn convert_response_clamps_negative_measures() {
        let response = RouteResponse {
            distance_km: 1.0,
            duration_minutes: 10.0,
            geometry: None,
            segments: vec![segment("WALK", -4.0)],
        };

        let plan = convert_response(response, RoutingProfile::Walk, &origin(), &destination())
            .expect("should convert");

        assert!(plan.segments.iter().all(|s| s.duration_minutes >= 0.0));
    }
}
