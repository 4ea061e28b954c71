//! Human-readable rationale for returned plans.

use crate::{BaselineMetrics, Candidate, Provenance};

/// Rationale attached to the fallback plan.
pub const FALLBACK_WHY: &str = "Normal itinerary without added activity.";

/// Renders explanation sentences.
///
/// # Examples
///
/// ```
/// use healthroute_core::{
///     BaselineMetrics, Candidate, ExplanationGenerator, Location, Provenance, RoutePlan,
///     RouteSegment, TravelMode,
/// };
///
/// let baseline = BaselineMetrics { duration_minutes: 30.0, ..BaselineMetrics::default() };
/// let plan = RoutePlan::new(vec![RouteSegment::new(
///     TravelMode::Walk,
///     Location::new(47.21, -1.55),
///     Location::new(47.22, -1.55),
///     10.0,
///     0.8,
/// )]);
/// let candidate = Candidate::new(Provenance::WaitToWalk, 0, plan, &baseline);
/// let text = ExplanationGenerator::new(2.0).explain(&candidate, &baseline);
/// assert_eq!(
///     text,
///     "Walks to a later stop instead of waiting. Adds 10 minutes of walking with no significant detour."
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplanationGenerator {
    significant_detour_minutes: f64,
}

impl ExplanationGenerator {
    /// Report detours longer than `significant_detour_minutes`.
    #[must_use]
    pub const fn new(significant_detour_minutes: f64) -> Self {
        Self {
            significant_detour_minutes,
        }
    }

    /// Full explanation for the recommended candidate.
    #[must_use]
    pub fn explain(&self, candidate: &Candidate, baseline: &BaselineMetrics) -> String {
        let headline = headline(candidate);
        let added_walk = whole_minutes(candidate.metrics.walk_minutes - baseline.walk_minutes);
        let added_bike = whole_minutes(candidate.metrics.bike_minutes - baseline.bike_minutes);
        let mut activity = format!("Adds {} of walking", minutes(added_walk));
        if added_bike > 0 {
            activity.push_str(&format!(" and {} of biking", minutes(added_bike)));
        }
        let detour = candidate.metrics.total_duration_minutes - baseline.duration_minutes;
        let cost = if detour > self.significant_detour_minutes {
            format!("for a detour of {}", minutes(whole_minutes(detour)))
        } else {
            "with no significant detour".to_owned()
        };
        format!("{headline}. {activity} {cost}.")
    }

    /// Short per-plan rationale.
    #[must_use]
    pub fn why(&self, candidate: &Candidate) -> String {
        format!("{}.", headline(candidate))
    }

    /// Explanation when the baseline could not be analysed.
    #[must_use]
    pub fn enrichment_unavailable(&self) -> String {
        "Activity enrichment is temporarily unavailable; showing the normal itinerary.".to_owned()
    }

    /// Explanation when no candidate survived.
    ///
    /// `generated` distinguishes "nothing to propose" from "everything was
    /// rejected by the trip constraints".
    #[must_use]
    pub fn no_viable_candidate(&self, generated: usize) -> String {
        if generated == 0 {
            "No activity-enriched alternative was found for this trip; showing the normal itinerary."
                .to_owned()
        } else {
            "The activity goal could not be met under the given constraints; showing the normal itinerary."
                .to_owned()
        }
    }
}

impl Default for ExplanationGenerator {
    fn default() -> Self {
        Self::new(2.0)
    }
}

fn headline(candidate: &Candidate) -> &'static str {
    match candidate.provenance {
        Provenance::WaitToWalk => "Walks to a later stop instead of waiting",
        Provenance::WaypointInsertion
            if candidate.comfort.uses_confirmed_parking || candidate.metrics.bike_minutes > 0.0 =>
        {
            "Cycles between bike parkings near each end of the trip"
        }
        Provenance::WaypointInsertion => "Walks to a farther stop before boarding",
        Provenance::LoopPadding => "Adds a short walking loop",
    }
}

// Rounded and clamped before the cast.
fn whole_minutes(value: f64) -> i64 {
    if value.is_finite() {
        value.round().clamp(0.0, 1e9) as i64
    } else {
        0
    }
}

fn minutes(count: i64) -> String {
    if count == 1 {
        "1 minute".to_owned()
    } else {
        format!("{count} minutes")
    }
}
