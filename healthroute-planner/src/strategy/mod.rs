//! Candidate generation strategies.
//!
//! Each strategy reads the shared [`StrategyContext`] and returns its own
//! [`StrategyOutcome`]; strategies never share mutable state.

mod loop_padding;
mod wait_to_walk;
mod waypoint;

pub use loop_padding::{LoopPadding, loop_radius_km};
pub use wait_to_walk::WaitToWalk;
pub use waypoint::WaypointInsertion;

use healthroute_core::{
    Candidate, PlanRequest, PlannerConfig, Provenance, RoutePlan, UpstreamError,
};
use jiff::{SignedDuration, Timestamp};

use crate::baseline::BaselineAnalysis;
use crate::policy::Collaborators;

/// Everything a strategy may read.
#[derive(Debug, Clone)]
pub struct StrategyContext {
    /// The validated request.
    pub request: PlanRequest,
    /// The analysed baseline.
    pub baseline: BaselineAnalysis,
    /// Engine tuning.
    pub config: PlannerConfig,
    /// Request-scoped collaborator handles.
    pub calls: Collaborators,
}

/// How a strategy run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    /// Ran to completion, possibly without candidates.
    Generated(Vec<Candidate>),
    /// A collaborator the strategy depends on is unavailable.
    Unavailable(UpstreamError),
    /// Stopped by the generation deadline.
    Cancelled,
}

impl StrategyOutcome {
    /// Candidates produced; empty for degraded outcomes.
    #[must_use]
    pub fn into_candidates(self) -> Vec<Candidate> {
        match self {
            Self::Generated(candidates) => candidates,
            Self::Unavailable(_) | Self::Cancelled => Vec::new(),
        }
    }
}

/// Run the strategy identified by `provenance`.
pub async fn run(provenance: Provenance, context: &StrategyContext) -> StrategyOutcome {
    match provenance {
        Provenance::WaitToWalk => WaitToWalk::new(context.config.wait_to_walk).run(context).await,
        Provenance::WaypointInsertion => {
            WaypointInsertion::new(context.config.waypoint)
                .run(context)
                .await
        }
        Provenance::LoopPadding => {
            LoopPadding::new(context.config.loop_padding)
                .run(context)
                .await
        }
    }
}

/// Whether `plan` is a non-empty chain ending at the requested destination.
fn completes_trip(plan: &RoutePlan, context: &StrategyContext) -> bool {
    !plan.is_empty() && plan.is_chained() && plan.reaches(&context.request.destination)
}

/// `start` shifted by `minutes`, or `start` when the shift is not
/// representable.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "offsets are floating-point minutes"
)]
pub fn departure_after(start: Timestamp, minutes: f64) -> Timestamp {
    SignedDuration::try_from_secs_f64(minutes * 60.0)
        .ok()
        .and_then(|offset| start.checked_add(offset).ok())
        .unwrap_or(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0)]
    #[case(1.5, 90)]
    #[case(30.0, 1800)]
    fn departures_shift_by_minutes(#[case] minutes: f64, #[case] seconds: i64) {
        let start = Timestamp::UNIX_EPOCH;
        assert_eq!(departure_after(start, minutes).as_second(), seconds);
    }

    #[rstest]
    fn unrepresentable_shifts_keep_the_start() {
        let start = Timestamp::UNIX_EPOCH;
        assert_eq!(departure_after(start, f64::NAN), start);
        assert_eq!(departure_after(start, f64::INFINITY), start);
    }
}
