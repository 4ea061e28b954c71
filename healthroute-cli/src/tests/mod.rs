//! Shared test harness modules for the healthroute CLI.

mod helpers;
mod plan_unit;
