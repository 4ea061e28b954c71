//! Itineraries as ordered sequences of travel segments.
//!
//! A [`RoutePlan`] is contiguous when every segment ends where the next one
//! starts. Totals are always derived from the segments, never stored.

use serde::{Deserialize, Serialize};

use crate::Location;

/// How a segment is travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelMode {
    /// On foot.
    Walk,
    /// By bicycle.
    Bike,
    /// On public transport.
    Transit,
    /// Standing at a stop.
    Wait,
}

impl TravelMode {
    /// Whether time spent in this mode counts as physical activity.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Walk | Self::Bike)
    }
}

/// A downstream stop served by a transit segment.
///
/// Offsets measure progress from the segment's boarding stop and are only
/// known when the routing service publishes per-stop timings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitStop {
    /// Where the stop is.
    pub location: Location,
    /// Minutes after departure from the boarding stop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_minutes: Option<f64>,
    /// Kilometres travelled from the boarding stop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_km: Option<f64>,
}

impl TransitStop {
    /// A stop with known timing and distance offsets.
    #[must_use]
    pub const fn timed(location: Location, offset_minutes: f64, offset_km: f64) -> Self {
        Self {
            location,
            offset_minutes: Some(offset_minutes),
            offset_km: Some(offset_km),
        }
    }

    /// A stop whose offsets are unknown.
    #[must_use]
    pub const fn untimed(location: Location) -> Self {
        Self {
            location,
            offset_minutes: None,
            offset_km: None,
        }
    }
}

/// Line and stop information attached to transit segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitDetails {
    /// Line identifier, e.g. `"C3"`.
    pub line: String,
    /// Stops after the boarding stop, in travel order, ending at the alighting
    /// stop.
    #[serde(default)]
    pub stops: Vec<TransitStop>,
}

/// One leg of an itinerary.
///
/// # Examples
///
/// ```
/// use healthroute_core::{Location, RouteSegment, TravelMode};
///
/// let walk = RouteSegment::new(
///     TravelMode::Walk,
///     Location::new(47.21, -1.55),
///     Location::new(47.22, -1.55),
///     13.0,
///     1.1,
/// );
/// assert!(walk.mode.is_active());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    /// Travel mode.
    pub mode: TravelMode,
    /// Where the segment starts.
    #[serde(rename = "from")]
    pub start: Location,
    /// Where the segment ends.
    #[serde(rename = "to")]
    pub end: Location,
    /// Duration in minutes, never negative.
    pub duration_minutes: f64,
    /// Distance in kilometres, never negative.
    pub distance_km: f64,
    /// Encoded polyline handle from the routing service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<String>,
    /// Departure as minutes after the trip's departure time, when the routing
    /// service publishes a timetable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departs_at: Option<f64>,
    /// Line and stop details for transit segments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transit: Option<TransitDetails>,
    /// Whether the segment includes stairs.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stairs: bool,
}

impl RouteSegment {
    /// Construct a segment, clamping negative or non-finite measures to zero.
    #[must_use]
    pub fn new(
        mode: TravelMode,
        start: Location,
        end: Location,
        duration_minutes: f64,
        distance_km: f64,
    ) -> Self {
        Self {
            mode,
            start,
            end,
            duration_minutes: non_negative(duration_minutes),
            distance_km: non_negative(distance_km),
            geometry: None,
            departs_at: None,
            transit: None,
            stairs: false,
        }
    }

    /// A wait of `minutes` at `stop`.
    #[must_use]
    pub fn wait(stop: Location, minutes: f64) -> Self {
        Self::new(TravelMode::Wait, stop.clone(), stop, minutes, 0.0)
    }

    /// Attach a geometry handle.
    #[must_use]
    pub fn with_geometry(mut self, geometry: impl Into<String>) -> Self {
        self.geometry = Some(geometry.into());
        self
    }

    /// Attach a timetable departure offset.
    #[must_use]
    pub const fn with_departs_at(mut self, minutes: f64) -> Self {
        self.departs_at = Some(minutes);
        self
    }

    /// Attach transit details.
    #[must_use]
    pub fn with_transit(mut self, transit: TransitDetails) -> Self {
        self.transit = Some(transit);
        self
    }

    /// Mark the segment as including stairs.
    #[must_use]
    pub const fn with_stairs(mut self) -> Self {
        self.stairs = true;
        self
    }
}

/// Aggregate measures of a plan, threaded through validation, scoring and
/// explanation so they are computed once.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanMetrics {
    /// Sum of segment durations.
    pub duration_minutes: f64,
    /// Sum of segment distances.
    pub distance_km: f64,
    /// Minutes spent walking.
    pub walk_minutes: f64,
    /// Minutes spent cycling.
    pub bike_minutes: f64,
}

/// Metrics of the baseline plan; every detour is measured against these.
pub type BaselineMetrics = PlanMetrics;

/// An ordered sequence of segments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoutePlan {
    /// Segments in travel order.
    pub segments: Vec<RouteSegment>,
}

impl RoutePlan {
    /// Construct a plan from segments.
    #[must_use]
    pub const fn new(segments: Vec<RouteSegment>) -> Self {
        Self { segments }
    }

    /// Whether the plan has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sum of segment durations in minutes.
    #[must_use]
    pub fn total_duration_minutes(&self) -> f64 {
        self.segments.iter().map(|s| s.duration_minutes).sum()
    }

    /// Sum of segment distances in kilometres.
    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        self.segments.iter().map(|s| s.distance_km).sum()
    }

    /// Minutes spent in `mode`.
    #[must_use]
    pub fn minutes_in(&self, mode: TravelMode) -> f64 {
        self.segments
            .iter()
            .filter(|s| s.mode == mode)
            .map(|s| s.duration_minutes)
            .sum()
    }

    /// Minutes spent walking.
    #[must_use]
    pub fn walk_minutes(&self) -> f64 {
        self.minutes_in(TravelMode::Walk)
    }

    /// Minutes spent cycling.
    #[must_use]
    pub fn bike_minutes(&self) -> f64 {
        self.minutes_in(TravelMode::Bike)
    }

    /// All derived totals at once.
    #[must_use]
    pub fn metrics(&self) -> PlanMetrics {
        PlanMetrics {
            duration_minutes: self.total_duration_minutes(),
            distance_km: self.total_distance_km(),
            walk_minutes: self.walk_minutes(),
            bike_minutes: self.bike_minutes(),
        }
    }

    /// Where the plan starts.
    #[must_use]
    pub fn start(&self) -> Option<&Location> {
        self.segments.first().map(|s| &s.start)
    }

    /// Where the plan ends.
    #[must_use]
    pub fn end(&self) -> Option<&Location> {
        self.segments.last().map(|s| &s.end)
    }

    /// Whether the plan ends at `destination`.
    #[must_use]
    pub fn reaches(&self, destination: &Location) -> bool {
        self.end().is_some_and(|end| end.same_place(destination))
    }

    /// Whether every segment ends where the next one starts.
    #[must_use]
    pub fn is_chained(&self) -> bool {
        self.segments
            .windows(2)
            .all(|pair| match pair {
                [current, next] => current.end.same_place(&next.start),
                _ => true,
            })
    }

    /// Whether any segment includes stairs.
    #[must_use]
    pub fn includes_stairs(&self) -> bool {
        self.segments.iter().any(|s| s.stairs)
    }

    /// Append `next` after this plan.
    #[must_use]
    pub fn then(mut self, next: Self) -> Self {
        self.segments.extend(next.segments);
        self
    }

    /// Pin the plan's endpoints to the requested places.
    ///
    /// Routing services snap endpoints to the street network; pinning keeps
    /// stitched legs contiguous at their junctions.
    #[must_use]
    pub fn pinned(mut self, from: &Location, to: &Location) -> Self {
        if let Some(first) = self.segments.first_mut() {
            first.start = from.clone();
        }
        if let Some(last) = self.segments.last_mut() {
            last.end = to.clone();
        }
        self
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
