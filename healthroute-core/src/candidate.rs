//! Candidate itineraries produced by enrichment strategies.

use serde::{Deserialize, Serialize};

use crate::{BaselineMetrics, RoutePlan};

/// Which strategy produced a candidate.
///
/// The declaration order is the ranking tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Walk to a later stop instead of waiting.
    WaitToWalk,
    /// Route through a bike parking or a farther stop.
    WaypointInsertion,
    /// Add a walking loop at one end of the trip.
    LoopPadding,
}

impl Provenance {
    /// Every strategy in tie-break order.
    pub const ALL: [Self; 3] = [Self::WaitToWalk, Self::WaypointInsertion, Self::LoopPadding];

    /// Short identifier used in logs and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WaitToWalk => "wait_to_walk",
            Self::WaypointInsertion => "waypoint_insertion",
            Self::LoopPadding => "loop_padding",
        }
    }
}

/// Comfort-related facts about a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComfortFlags {
    /// Some segment includes stairs.
    pub includes_stairs: bool,
    /// The plan goes through a bike parking with confirmed availability.
    pub uses_confirmed_parking: bool,
}

/// Derived measures of a candidate, relative to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CandidateMetrics {
    /// Total itinerary duration.
    pub total_duration_minutes: f64,
    /// Total itinerary distance.
    pub total_distance_km: f64,
    /// Minutes spent walking.
    pub walk_minutes: f64,
    /// Minutes spent cycling.
    pub bike_minutes: f64,
    /// Extra duration over the baseline; negative when faster.
    pub detour_minutes: f64,
    /// Extra distance over the baseline; negative when shorter.
    pub detour_km: f64,
}

impl CandidateMetrics {
    /// Measure `plan` against `baseline`.
    #[must_use]
    pub fn measure(plan: &RoutePlan, baseline: &BaselineMetrics) -> Self {
        let totals = plan.metrics();
        Self {
            total_duration_minutes: totals.duration_minutes,
            total_distance_km: totals.distance_km,
            walk_minutes: totals.walk_minutes,
            bike_minutes: totals.bike_minutes,
            detour_minutes: totals.duration_minutes - baseline.duration_minutes,
            detour_km: totals.distance_km - baseline.distance_km,
        }
    }
}

/// A complete origin-to-destination plan proposed by a strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Producing strategy.
    pub provenance: Provenance,
    /// Generation order within the strategy, used as the final tie-break.
    pub ordinal: usize,
    /// The itinerary.
    pub plan: RoutePlan,
    /// Comfort facts.
    pub comfort: ComfortFlags,
    /// Derived measures.
    pub metrics: CandidateMetrics,
}

impl Candidate {
    /// Wrap `plan`, deriving metrics and stair information.
    #[must_use]
    pub fn new(
        provenance: Provenance,
        ordinal: usize,
        plan: RoutePlan,
        baseline: &BaselineMetrics,
    ) -> Self {
        let metrics = CandidateMetrics::measure(&plan, baseline);
        let comfort = ComfortFlags {
            includes_stairs: plan.includes_stairs(),
            uses_confirmed_parking: false,
        };
        Self {
            provenance,
            ordinal,
            plan,
            comfort,
            metrics,
        }
    }

    /// Mark the candidate as going through confirmed bike parking.
    #[must_use]
    pub const fn with_confirmed_parking(mut self) -> Self {
        self.comfort.uses_confirmed_parking = true;
        self
    }
}

/// Per-component score contributions; `total` is rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Goal achievement component.
    pub goal: f64,
    /// Total-time component.
    pub time: f64,
    /// Detour component.
    pub detour: f64,
    /// Comfort component.
    pub comfort: f64,
    /// Clamped sum in `[0, 100]`.
    pub total: f64,
}

/// Reporting metrics for the recommended plan.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Walking met the walking goal.
    pub walk_goal_achieved: bool,
    /// Cycling met the cycling goal; true when no cycling goal was set.
    pub bike_goal_achieved: bool,
    /// Extra duration over the baseline.
    pub total_detour_minutes: f64,
    /// Extra distance over the baseline.
    pub total_detour_km: f64,
    /// Overall score.
    pub score: f64,
}

/// A candidate with its score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// The candidate.
    pub candidate: Candidate,
    /// Component breakdown.
    pub breakdown: ScoreBreakdown,
    /// Reporting metrics.
    pub evaluation: EvaluationMetrics,
}

impl ScoredCandidate {
    /// Overall score.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.breakdown.total
    }
}
