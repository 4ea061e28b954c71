//! JSON-over-HTTP plumbing shared by the collaborators.

use std::time::Duration;

use healthroute_core::{RequestId, UpstreamError};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{ClientBuildError, HttpClientConfig, REQUEST_ID_HEADER};

/// A configured client bound to one service's base URL.
#[derive(Debug, Clone)]
pub(crate) struct JsonService {
    service: &'static str,
    client: Client,
    base: Url,
    config: HttpClientConfig,
}

impl JsonService {
    /// `service` names the collaborator in timeout errors.
    pub(crate) fn new(
        service: &'static str,
        config: HttpClientConfig,
    ) -> Result<Self, ClientBuildError> {
        let base = parse_base_url(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        Ok(Self {
            service,
            client,
            base,
            config,
        })
    }

    pub(crate) const fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Build `{base_url}/{segments}?{params}`.
    ///
    /// A trailing slash on the base URL does not produce an empty segment.
    pub(crate) fn endpoint(&self, segments: &[&str], params: &[(&str, String)]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        url
    }

    /// GET `url` with the correlation header and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        request_id: &RequestId,
    ) -> Result<T, UpstreamError> {
        let target = url.to_string();
        debug!(
            "request_id={request_id} service={} GET {target}",
            self.service
        );

        let response = self
            .client
            .get(url)
            .header(REQUEST_ID_HEADER, request_id.as_str())
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &target))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &target))?;

        response.json().await.map_err(|err| {
            if err.is_decode() {
                UpstreamError::Parse {
                    message: err.to_string(),
                }
            } else {
                self.convert_reqwest_error(&err, &target)
            }
        })
    }

    /// Convert a reqwest error to an [`UpstreamError`].
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> UpstreamError {
        if error.is_timeout() {
            return UpstreamError::Timeout {
                service: self.service.to_owned(),
                timeout_ms: millis(self.config.timeout),
            };
        }

        if let Some(status) = error.status() {
            return UpstreamError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        UpstreamError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, ClientBuildError> {
    let url = Url::parse(base_url).map_err(|err| ClientBuildError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        message: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientBuildError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            message: "URL cannot carry a path".to_owned(),
        });
    }
    Ok(url)
}

fn millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn service(base_url: &str) -> JsonService {
        JsonService::new("routing", HttpClientConfig::new(base_url)).expect("service should build")
    }

    #[rstest]
    #[case("http://routing.example.com", "http://routing.example.com/route/circular")]
    #[case("http://routing.example.com/", "http://routing.example.com/route/circular")]
    #[case("http://gateway.example.com/api/", "http://gateway.example.com/api/route/circular")]
    fn endpoint_appends_segments(#[case] base: &str, #[case] expected: &str) {
        let url = service(base).endpoint(&["route", "circular"], &[]);
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    fn endpoint_encodes_query_parameters() {
        let url = service("http://routing.example.com").endpoint(
            &["route"],
            &[("time", "2024-05-01T08:00:00Z".to_owned())],
        );
        assert_eq!(
            url.as_str(),
            "http://routing.example.com/route?time=2024-05-01T08%3A00%3A00Z"
        );
    }

    #[rstest]
    #[case("not a url")]
    #[case("mailto:routing@example.com")]
    fn rejects_unusable_base_urls(#[case] base: &str) {
        let err = JsonService::new("routing", HttpClientConfig::new(base))
            .expect_err("base URL should be rejected");
        assert!(matches!(err, ClientBuildError::InvalidBaseUrl { .. }));
    }
}
