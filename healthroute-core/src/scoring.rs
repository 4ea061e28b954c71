//! Composite 0–100 scoring of validated candidates.
//!
//! The score blends four components: activity-goal achievement, total-time
//! overrun, extra distance, and comfort. Each component is bounded by its
//! weight in [`ScoringConfig`]; the goal component may exceed its weight by
//! the configured bonus fraction when the goal is met with a modest surplus.

use crate::{
    ActivityGoals, BaselineMetrics, Candidate, CandidateMetrics, ComfortFlags, EvaluationMetrics,
    Preferences, ScoreBreakdown, ScoredCandidate, ScoringConfig,
};

/// Deterministic scorer for one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringEngine {
    config: ScoringConfig,
    goals: ActivityGoals,
    preferences: Preferences,
}

impl ScoringEngine {
    /// Score against `goals` and `preferences` using `config`.
    #[must_use]
    pub const fn new(config: ScoringConfig, goals: ActivityGoals, preferences: Preferences) -> Self {
        Self {
            config,
            goals,
            preferences,
        }
    }

    /// Upper bound of the goal component, bonus included.
    #[must_use]
    pub fn max_goal_points(&self) -> f64 {
        self.config.goal_weight * (1.0 + self.config.goal_bonus_fraction)
    }

    /// Score every candidate, preserving order.
    #[must_use]
    pub fn score_all(
        &self,
        candidates: Vec<Candidate>,
        baseline: &BaselineMetrics,
    ) -> Vec<ScoredCandidate> {
        candidates
            .into_iter()
            .map(|candidate| self.score(candidate, baseline))
            .collect()
    }

    /// Score one candidate.
    #[must_use]
    pub fn score(&self, candidate: Candidate, baseline: &BaselineMetrics) -> ScoredCandidate {
        let breakdown = self.breakdown(&candidate.metrics, candidate.comfort, baseline);
        let evaluation = self.evaluate(&candidate.metrics, &breakdown);
        ScoredCandidate {
            candidate,
            breakdown,
            evaluation,
        }
    }

    /// Component breakdown for arbitrary measures.
    ///
    /// Exposed separately so plain itineraries, such as the fallback, can be
    /// scored without wrapping them in a [`Candidate`].
    #[must_use]
    pub fn breakdown(
        &self,
        metrics: &CandidateMetrics,
        comfort: ComfortFlags,
        baseline: &BaselineMetrics,
    ) -> ScoreBreakdown {
        let goal = self.goal_points(metrics);
        let time = self.time_points(metrics.total_duration_minutes, baseline.duration_minutes);
        let detour = self.detour_points(metrics.total_distance_km, baseline.distance_km);
        let comfort_points = self.comfort_points(comfort);
        let total = round2(goal + time + detour + comfort_points).clamp(0.0, 100.0);
        ScoreBreakdown {
            goal,
            time,
            detour,
            comfort: comfort_points,
            total,
        }
    }

    /// Reporting metrics for measures already scored as `breakdown`.
    #[must_use]
    pub fn evaluate(
        &self,
        metrics: &CandidateMetrics,
        breakdown: &ScoreBreakdown,
    ) -> EvaluationMetrics {
        EvaluationMetrics {
            walk_goal_achieved: metrics.walk_minutes >= self.goals.walk_minutes,
            bike_goal_achieved: !self.goals.wants_bike()
                || metrics.bike_minutes >= self.goals.bike_minutes,
            total_detour_minutes: round2(metrics.detour_minutes),
            total_detour_km: round2(metrics.detour_km),
            score: breakdown.total,
        }
    }

    fn goal_points(&self, metrics: &CandidateMetrics) -> f64 {
        let walk = raw_ratio(metrics.walk_minutes, self.goals.walk_minutes);
        let bike = self
            .goals
            .wants_bike()
            .then(|| raw_ratio(metrics.bike_minutes, self.goals.bike_minutes));
        let base = bike.map_or(walk.min(1.0), |b| (walk.min(1.0) + b.min(1.0)) / 2.0);
        let modest = |ratio: f64| (1.0..=1.0 + self.config.modest_surplus_ratio).contains(&ratio);
        let bonus = if modest(walk) && bike.is_none_or(modest) {
            self.config.goal_weight * self.config.goal_bonus_fraction
        } else {
            0.0
        };
        base * self.config.goal_weight + bonus
    }

    fn time_points(&self, total: f64, baseline: f64) -> f64 {
        let weight = self.config.time_weight;
        if baseline <= 0.0 {
            return if total <= 0.0 { weight } else { 0.0 };
        }
        let ratio = total / baseline;
        if ratio <= 1.0 {
            return weight;
        }
        let overrun_percent = (ratio - 1.0) * 100.0;
        (weight * (1.0 - overrun_percent / self.config.time_zero_overrun_percent)).max(0.0)
    }

    fn detour_points(&self, total: f64, baseline: f64) -> f64 {
        let weight = self.config.detour_weight;
        let extra = total - baseline;
        if baseline <= 0.0 {
            return if extra <= 0.0 { weight } else { 0.0 };
        }
        let ratio = extra / baseline;
        if ratio <= self.config.detour_free_ratio {
            return weight;
        }
        (weight * (1.0 - ratio / self.config.detour_zero_ratio)).max(0.0)
    }

    fn comfort_points(&self, comfort: ComfortFlags) -> f64 {
        let mut points = self.config.comfort_weight;
        if comfort.includes_stairs && self.preferences.avoid_stairs {
            points -= self.config.stairs_penalty;
        }
        if comfort.uses_confirmed_parking {
            points += self.config.confirmed_parking_bonus;
        }
        points.clamp(0.0, self.config.comfort_weight)
    }
}

/// Achieved over target; a non-positive target counts as met.
fn raw_ratio(achieved: f64, target: f64) -> f64 {
    if target > 0.0 {
        (achieved / target).max(0.0)
    } else {
        1.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
