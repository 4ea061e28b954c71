//! The planner's response shape.

use serde::{Deserialize, Serialize};

use crate::{
    ComfortFlags, EvaluationMetrics, Provenance, RequestId, RoutePlan, RouteSegment,
    ScoredCandidate, explanation::FALLBACK_WHY,
};

/// Whether a plan carries added activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    /// Activity-enriched plan.
    Health,
    /// Plain itinerary.
    Normal,
}

/// Active minutes of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityMetrics {
    /// Minutes spent walking.
    pub walk_minutes: f64,
    /// Minutes spent cycling.
    pub bike_minutes: f64,
}

/// A returned itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Enriched or plain.
    pub plan_type: PlanType,
    /// Producing strategy for enriched plans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
    /// Sum of segment durations.
    pub total_duration_minutes: f64,
    /// Sum of segment distances.
    pub total_distance_km: f64,
    /// Active minutes.
    pub activity: ActivityMetrics,
    /// Segments in travel order.
    pub segments: Vec<RouteSegment>,
    /// Short rationale.
    pub why: String,
    /// Overall score, when scored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Comfort facts, for enriched plans.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comfort: Option<ComfortFlags>,
}

impl Plan {
    /// A plain itinerary, used for the fallback.
    #[must_use]
    pub fn normal(plan: &RoutePlan) -> Self {
        let metrics = plan.metrics();
        Self {
            plan_type: PlanType::Normal,
            provenance: None,
            total_duration_minutes: metrics.duration_minutes,
            total_distance_km: metrics.distance_km,
            activity: ActivityMetrics {
                walk_minutes: metrics.walk_minutes,
                bike_minutes: metrics.bike_minutes,
            },
            segments: plan.segments.clone(),
            why: FALLBACK_WHY.to_owned(),
            score: None,
            comfort: None,
        }
    }

    /// An enriched plan from a scored candidate.
    #[must_use]
    pub fn enriched(scored: &ScoredCandidate, why: String) -> Self {
        let candidate = &scored.candidate;
        Self {
            plan_type: PlanType::Health,
            provenance: Some(candidate.provenance),
            total_duration_minutes: candidate.metrics.total_duration_minutes,
            total_distance_km: candidate.metrics.total_distance_km,
            activity: ActivityMetrics {
                walk_minutes: candidate.metrics.walk_minutes,
                bike_minutes: candidate.metrics.bike_minutes,
            },
            segments: candidate.plan.segments.clone(),
            why,
            score: Some(scored.score()),
            comfort: Some(candidate.comfort),
        }
    }
}

/// How the response was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanOutcome {
    /// At least one enriched plan survived.
    Enriched,
    /// No candidate survived; the fallback is recommended.
    NoViableCandidate,
    /// The baseline could not be analysed; only the fallback is returned.
    EnrichmentUnavailable,
}

/// How a strategy task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyStatus {
    /// The strategy ran to completion.
    Generated,
    /// A collaborator call exhausted its budget.
    Unavailable,
    /// The generation deadline elapsed first.
    Cancelled,
}

/// Per-strategy summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyReport {
    /// Which strategy.
    pub strategy: Provenance,
    /// How it ended.
    pub status: StrategyStatus,
    /// Candidates produced.
    pub candidates: usize,
    /// Failure message, when unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Generation statistics attached to every response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationDiagnostics {
    /// Candidates produced by all strategies.
    pub candidates_generated: usize,
    /// Candidates dropped by the constraint validator.
    pub candidates_rejected: usize,
    /// One entry per strategy, in provenance order.
    pub strategies: Vec<StrategyReport>,
    /// Whether the generation deadline cut strategies short.
    pub deadline_expired: bool,
}

/// Result of one planning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResponse {
    /// Correlation identifier.
    pub request_id: RequestId,
    /// How the response was reached.
    pub outcome: PlanOutcome,
    /// Recommended plan; the fallback when nothing survived, absent when
    /// enrichment was unavailable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended: Option<Plan>,
    /// Up to the configured number of runners-up.
    pub alternatives: Vec<Plan>,
    /// Plain itinerary, always present.
    pub fallback: Plan,
    /// Metrics for the recommended plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_metrics: Option<EvaluationMetrics>,
    /// Rationale for the recommendation.
    pub explanation: String,
    /// Generation statistics.
    pub diagnostics: GenerationDiagnostics,
}
