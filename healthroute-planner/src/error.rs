//! Errors surfaced by [`Planner::generate_plan`](crate::Planner::generate_plan).

use healthroute_core::{RequestValidationError, UpstreamError};
use thiserror::Error;

/// Caller-visible planning failures.
///
/// Strategy failures never appear here: they degrade the response instead.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The request failed validation.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestValidationError),
    /// Neither the baseline nor a best-effort fallback could be obtained.
    #[error("baseline itinerary unavailable")]
    BaselineUnavailable {
        /// Failure of the baseline call.
        #[source]
        source: UpstreamError,
    },
}
