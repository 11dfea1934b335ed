//! Forecast cycle discovery and ensemble aggregation.
//!
//! The pipeline for one query is: locate the cycle's member files, resolve the
//! reach's column index, then aggregate that column across members.

mod aggregate;
mod cycle;
mod locator;
mod member;
mod reach_index;
mod series;

pub use aggregate::{
    aggregate, read_discharge, AggregatedSeries, EnsembleSeries, EnsembleStatistics,
    SkippedMember,
};
pub use cycle::ForecastCycle;
pub use locator::{
    cycle_directories, enumerate_cycles, locate, scan_candidate, CandidateOutcome, CycleFiles,
    SkipReason,
};
pub use member::{member_token, MemberKind};
pub use reach_index::{reach_id_variable, resolve_in_files, resolve_index};
pub use series::{split_axis, uniform_axis, TimeSeries};
