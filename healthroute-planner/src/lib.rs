//! Trip-enrichment planner for healthroute.
//!
//! [`Planner::generate_plan`] fetches the baseline TRANSIT itinerary, runs
//! the wait-to-walk, waypoint-insertion and loop-padding strategies
//! concurrently under a generation deadline, then validates, scores, ranks
//! and explains the merged candidates using the pure pipeline from
//! [`healthroute_core`].
//!
//! Every collaborator call is bounded by the configured
//! [`CallPolicy`](healthroute_core::CallPolicy): a per-call timeout and a
//! retry budget. Strategy failures degrade the response; only request
//! validation and a baseline that cannot even be replaced by a fallback
//! become errors.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod baseline;
mod error;
mod planner;
mod policy;
pub mod strategy;

pub use baseline::{BaselineAnalysis, BaselineAnalyzer, WaitPeriod};
pub use error::PlanError;
pub use planner::Planner;
pub use policy::{Collaborators, call_with_retry, is_unavailable};
