use thiserror::Error;

/// Failure of a single collaborator call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// The call did not complete within its time budget.
    #[error("request to {service} timed out after {timeout_ms} ms")]
    Timeout {
        /// Logical service name, e.g. `"routing"`.
        service: String,
        /// Budget that elapsed.
        timeout_ms: u64,
    },
    /// The service could not be reached.
    #[error("network error calling {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Transport message.
        message: String,
    },
    /// The service answered with a non-success status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// Status code.
        status: u16,
        /// Body or status text.
        message: String,
    },
    /// The service reported an application-level error.
    #[error("service error {code}: {message}")]
    Service {
        /// Service error code.
        code: String,
        /// Service message.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse response: {message}")]
    Parse {
        /// Decoder message.
        message: String,
    },
    /// The service found no itinerary between the requested places.
    #[error("no route found")]
    NoRoute,
    /// Every attempt failed; `last` is the final failure.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// Final failure.
        last: Box<UpstreamError>,
    },
}

impl UpstreamError {
    /// Whether retrying the same call could succeed.
    ///
    /// Timeouts, transport failures and 5xx/429 answers are transient. Parse
    /// failures, 4xx answers and missing routes are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            Self::Service { .. } | Self::Parse { .. } | Self::NoRoute | Self::Exhausted { .. } => {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn http(status: u16) -> UpstreamError {
        UpstreamError::Http {
            url: "http://routing/route".to_owned(),
            status,
            message: String::new(),
        }
    }

    #[rstest]
    #[case(http(503), true)]
    #[case(http(429), true)]
    #[case(http(404), false)]
    #[case(UpstreamError::NoRoute, false)]
    #[case(UpstreamError::Timeout { service: "routing".to_owned(), timeout_ms: 2000 }, true)]
    #[case(UpstreamError::Parse { message: "eof".to_owned() }, false)]
    fn classifies_retryable_failures(#[case] err: UpstreamError, #[case] retryable: bool) {
        assert_eq!(err.is_retryable(), retryable);
    }

    #[rstest]
    fn exhausted_reports_last_failure() {
        let err = UpstreamError::Exhausted {
            attempts: 2,
            last: Box::new(http(502)),
        };
        assert!(err.to_string().contains("HTTP 502"));
    }
}
