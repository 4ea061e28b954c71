//! Tunable engine parameters.
//!
//! Every field has a default, so a partial JSON document deserialises into a
//! complete [`PlannerConfig`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Weights and thresholds used by [`ScoringEngine`](crate::ScoringEngine).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Weight of the goal-achievement component.
    pub goal_weight: f64,
    /// Weight of the total-time component.
    pub time_weight: f64,
    /// Weight of the detour component.
    pub detour_weight: f64,
    /// Weight of the comfort component.
    pub comfort_weight: f64,
    /// Goal bonus as a fraction of `goal_weight`.
    pub goal_bonus_fraction: f64,
    /// Largest surplus over the goal, as a ratio, that still earns the bonus.
    pub modest_surplus_ratio: f64,
    /// Time overrun in percent that drives the time component to zero.
    pub time_zero_overrun_percent: f64,
    /// Extra-distance ratio up to which the detour component is not reduced.
    pub detour_free_ratio: f64,
    /// Extra-distance ratio that drives the detour component to zero.
    pub detour_zero_ratio: f64,
    /// Points removed when stairs are present and undesired.
    pub stairs_penalty: f64,
    /// Points added when the plan uses a confirmed bike parking.
    pub confirmed_parking_bonus: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            goal_weight: 40.0,
            time_weight: 30.0,
            detour_weight: 20.0,
            comfort_weight: 10.0,
            goal_bonus_fraction: 0.10,
            modest_surplus_ratio: 0.25,
            time_zero_overrun_percent: 50.0,
            detour_free_ratio: 0.10,
            detour_zero_ratio: 0.50,
            stairs_penalty: 5.0,
            confirmed_parking_bonus: 5.0,
        }
    }
}

/// Parameters for the wait-to-walk strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitToWalkConfig {
    /// Waits at or below this many minutes are left alone.
    pub wait_threshold_minutes: f64,
    /// How many downstream stops are tried per wait.
    pub max_stops_ahead: usize,
}

impl Default for WaitToWalkConfig {
    fn default() -> Self {
        Self {
            wait_threshold_minutes: 5.0,
            max_stops_ahead: 3,
        }
    }
}

/// Parameters for the waypoint-insertion strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaypointConfig {
    /// Parking search radius around each trip end.
    pub parking_radius_meters: u32,
    /// Minimum free spaces for a parking to qualify.
    pub min_available_bikes: u32,
    /// Nearest parkings considered at each end.
    pub parkings_per_end: usize,
    /// Bike legs shorter than this are not worth the change of mode.
    pub min_bike_leg_km: f64,
    /// Preferred distance from the origin to the inserted stop.
    pub stop_radius_km: f64,
    /// Closest accepted stop distance.
    pub stop_min_km: f64,
    /// Farthest accepted stop distance.
    pub stop_max_km: f64,
    /// Stops closer than this to any baseline segment endpoint are on the
    /// baseline path.
    pub off_path_tolerance_km: f64,
    /// Candidates adding less walking than this are dropped.
    pub min_added_walk_minutes: f64,
    /// Candidates kept per sub-mode.
    pub top_n: usize,
}

impl Default for WaypointConfig {
    fn default() -> Self {
        Self {
            parking_radius_meters: 500,
            min_available_bikes: 1,
            parkings_per_end: 3,
            min_bike_leg_km: 0.3,
            stop_radius_km: 1.0,
            stop_min_km: 0.5,
            stop_max_km: 1.5,
            off_path_tolerance_km: 0.05,
            min_added_walk_minutes: 3.0,
            top_n: 5,
        }
    }
}

/// Parameters for the loop-padding strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopPaddingConfig {
    /// Walking speed used to size loops.
    pub walking_speed_kmh: f64,
}

impl Default for LoopPaddingConfig {
    fn default() -> Self {
        Self {
            walking_speed_kmh: 5.0,
        }
    }
}

/// Parameters for baseline analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineConfig {
    /// Timing gaps at or below this many minutes are not waits.
    pub min_wait_gap_minutes: f64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            min_wait_gap_minutes: 1.0,
        }
    }
}

/// Timeout and retry budget for each collaborator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallPolicy {
    /// Per-attempt timeout.
    pub timeout_ms: u64,
    /// Retries after the first attempt.
    pub retries: u32,
}

impl CallPolicy {
    /// Per-attempt timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Total attempts including the first.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: 2_000,
            retries: 1,
        }
    }
}

/// Complete engine configuration.
///
/// # Examples
///
/// ```
/// use healthroute_core::PlannerConfig;
///
/// let config: PlannerConfig =
///     serde_json::from_str(r#"{"waypoint": {"top_n": 3}, "alternatives": 1}"#)?;
/// assert_eq!(config.waypoint.top_n, 3);
/// assert_eq!(config.waypoint.parkings_per_end, 3);
/// assert_eq!(config.alternatives, 1);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Scoring weights.
    pub scoring: ScoringConfig,
    /// Wait-to-walk parameters.
    pub wait_to_walk: WaitToWalkConfig,
    /// Waypoint-insertion parameters.
    pub waypoint: WaypointConfig,
    /// Loop-padding parameters.
    pub loop_padding: LoopPaddingConfig,
    /// Baseline analysis parameters.
    pub baseline: BaselineConfig,
    /// Collaborator call budget.
    pub calls: CallPolicy,
    /// Overall budget for the strategy phase.
    pub generation_deadline_ms: u64,
    /// Maximum alternatives returned beside the recommendation.
    pub alternatives: usize,
    /// Time deltas above this many minutes are reported as a detour.
    pub significant_detour_minutes: f64,
}

impl PlannerConfig {
    /// Strategy-phase budget as a [`Duration`].
    #[must_use]
    pub const fn generation_deadline(&self) -> Duration {
        Duration::from_millis(self.generation_deadline_ms)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            wait_to_walk: WaitToWalkConfig::default(),
            waypoint: WaypointConfig::default(),
            loop_padding: LoopPaddingConfig::default(),
            baseline: BaselineConfig::default(),
            calls: CallPolicy::default(),
            generation_deadline_ms: 5_000,
            alternatives: 2,
            significant_detour_minutes: 2.0,
        }
    }
}
