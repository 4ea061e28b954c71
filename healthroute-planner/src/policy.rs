//! Per-call timeout and retry around collaborator calls.
//!
//! Every outbound call made on behalf of a request goes through
//! [`Collaborators`], which applies the request's [`CallPolicy`] and forwards
//! its [`RequestId`].

use std::future::Future;
use std::sync::Arc;

use healthroute_core::{
    BikeParking, CallPolicy, Location, MobilityClient, RequestId, RoutePlan, RoutingClient,
    RoutingProfile, TransitStopInfo, UpstreamError,
};
use jiff::Timestamp;

/// Run `call` under `policy`.
///
/// Each attempt is bounded by the policy timeout. Retryable failures are
/// retried until the attempt budget is spent, after which
/// [`UpstreamError::Exhausted`] wraps the last failure. Non-retryable
/// failures are returned immediately.
///
/// # Errors
///
/// Returns the first non-retryable failure, or `Exhausted` once every
/// attempt has failed.
pub async fn call_with_retry<T, F, Fut>(
    policy: CallPolicy,
    service: &'static str,
    request_id: &RequestId,
    mut call: F,
) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let attempts = policy.attempts();
    let mut attempt = 1_u32;
    loop {
        let failure = match tokio::time::timeout(policy.timeout(), call()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => err,
            Err(_elapsed) => UpstreamError::Timeout {
                service: service.to_owned(),
                timeout_ms: policy.timeout_ms,
            },
        };
        if !failure.is_retryable() {
            return Err(failure);
        }
        if attempt >= attempts {
            return Err(UpstreamError::Exhausted {
                attempts,
                last: Box::new(failure),
            });
        }
        log::debug!(
            "request_id={request_id} {service} attempt {attempt}/{attempts} failed: {failure}"
        );
        attempt += 1;
    }
}

/// Whether `err` means the collaborator is down rather than that this one
/// query had no answer.
#[must_use]
pub const fn is_unavailable(err: &UpstreamError) -> bool {
    matches!(
        err,
        UpstreamError::Exhausted { .. } | UpstreamError::Timeout { .. }
    )
}

/// Request-scoped handles on the collaborators.
#[derive(Clone)]
pub struct Collaborators {
    routing: Arc<dyn RoutingClient>,
    mobility: Arc<dyn MobilityClient>,
    policy: CallPolicy,
    request_id: RequestId,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("policy", &self.policy)
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

impl Collaborators {
    /// Bind the clients to one request.
    #[must_use]
    pub const fn new(
        routing: Arc<dyn RoutingClient>,
        mobility: Arc<dyn MobilityClient>,
        policy: CallPolicy,
        request_id: RequestId,
    ) -> Self {
        Self {
            routing,
            mobility,
            policy,
            request_id,
        }
    }

    /// The same clients with a different policy.
    #[must_use]
    pub fn with_policy(&self, policy: CallPolicy) -> Self {
        Self {
            policy,
            ..self.clone()
        }
    }

    /// Correlation identifier forwarded on every call.
    #[must_use]
    pub const fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Guarded [`RoutingClient::route`].
    ///
    /// # Errors
    ///
    /// See [`call_with_retry`].
    pub async fn route(
        &self,
        profile: RoutingProfile,
        from: &Location,
        to: &Location,
        departure: Timestamp,
    ) -> Result<RoutePlan, UpstreamError> {
        call_with_retry(self.policy, "routing", &self.request_id, move || {
            self.routing
                .route(profile, from, to, departure, &self.request_id)
        })
        .await
    }

    /// Guarded [`RoutingClient::circular_route`].
    ///
    /// # Errors
    ///
    /// See [`call_with_retry`].
    pub async fn circular_route(
        &self,
        center: &Location,
        radius_km: f64,
        profile: RoutingProfile,
    ) -> Result<RoutePlan, UpstreamError> {
        call_with_retry(self.policy, "routing", &self.request_id, move || {
            self.routing
                .circular_route(center, radius_km, profile, &self.request_id)
        })
        .await
    }

    /// Guarded [`MobilityClient::nearby_parkings`].
    ///
    /// # Errors
    ///
    /// See [`call_with_retry`].
    pub async fn nearby_parkings(
        &self,
        at: &Location,
        radius_meters: u32,
        min_available: u32,
    ) -> Result<Vec<BikeParking>, UpstreamError> {
        call_with_retry(self.policy, "mobility", &self.request_id, move || {
            self.mobility
                .nearby_parkings(at, radius_meters, min_available, &self.request_id)
        })
        .await
    }

    /// Guarded [`MobilityClient::nearby_stops`].
    ///
    /// # Errors
    ///
    /// See [`call_with_retry`].
    pub async fn nearby_stops(
        &self,
        at: &Location,
        radius_meters: u32,
    ) -> Result<Vec<TransitStopInfo>, UpstreamError> {
        call_with_retry(self.policy, "mobility", &self.request_id, move || {
            self.mobility
                .nearby_stops(at, radius_meters, &self.request_id)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthroute_core::test_support::{StubMobilityClient, StubRoutingClient};
    use rstest::rstest;
    use std::time::Duration;

    fn collaborators(routing: Arc<StubRoutingClient>, policy: CallPolicy) -> Collaborators {
        Collaborators::new(
            routing,
            Arc::new(StubMobilityClient::new()),
            policy,
            RequestId::new("req-1"),
        )
    }

    fn here() -> Location {
        Location::new(47.2184, -1.5536)
    }

    fn there() -> Location {
        Location::new(47.2065, -1.5394)
    }

    #[rstest]
    #[tokio::test]
    async fn retries_once_then_succeeds() {
        let routing = Arc::new(StubRoutingClient::new().failing_first(RoutingProfile::Walk, 1));
        let calls = collaborators(Arc::clone(&routing), CallPolicy::default());
        let plan = calls
            .route(RoutingProfile::Walk, &here(), &there(), Timestamp::UNIX_EPOCH)
            .await;
        assert!(plan.is_ok());
        assert_eq!(routing.call_count(RoutingProfile::Walk), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn exhausts_after_retry_budget() {
        let routing = Arc::new(StubRoutingClient::new().failing(RoutingProfile::Transit));
        let calls = collaborators(Arc::clone(&routing), CallPolicy::default());
        let err = calls
            .route(RoutingProfile::Transit, &here(), &there(), Timestamp::UNIX_EPOCH)
            .await
            .expect_err("every attempt fails");
        assert!(matches!(err, UpstreamError::Exhausted { attempts: 2, .. }));
        assert_eq!(routing.call_count(RoutingProfile::Transit), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn non_retryable_failures_are_not_retried() {
        let routing = Arc::new(StubRoutingClient::new().with_route_error(
            RoutingProfile::Walk,
            &here(),
            &there(),
            UpstreamError::NoRoute,
        ));
        let calls = collaborators(Arc::clone(&routing), CallPolicy::default());
        let err = calls
            .route(RoutingProfile::Walk, &here(), &there(), Timestamp::UNIX_EPOCH)
            .await
            .expect_err("no route");
        assert_eq!(err, UpstreamError::NoRoute);
        assert_eq!(routing.call_count(RoutingProfile::Walk), 1);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn slow_calls_time_out() {
        let routing = Arc::new(
            StubRoutingClient::new().with_latency(RoutingProfile::Bike, Duration::from_secs(10)),
        );
        let policy = CallPolicy {
            timeout_ms: 100,
            retries: 1,
        };
        let calls = collaborators(Arc::clone(&routing), policy);
        let err = calls
            .route(RoutingProfile::Bike, &here(), &there(), Timestamp::UNIX_EPOCH)
            .await
            .expect_err("timed out");
        let UpstreamError::Exhausted { last, .. } = err else {
            panic!("expected exhaustion, got {err:?}");
        };
        assert!(matches!(*last, UpstreamError::Timeout { timeout_ms: 100, .. }));
    }
}
