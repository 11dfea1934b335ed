//! Query entry points.
//!
//! These are the two operations a request layer calls: listing the cycles
//! available for a reach, and building a reach's hydrograph for one cycle.
//! Both take every input explicitly and answer with a [`Response`], which
//! serializes to either the success payload or `{"error": "..."}`.

use crate::config::{EnumerateOptions, ProductConfig};
use crate::error::{FlowcastError, Result};
use crate::forecast::{
    aggregate, enumerate_cycles, locate, resolve_in_files, ForecastCycle, SkippedMember,
    TimeSeries,
};
use crate::util::format_name;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Message attached to successful responses.
pub const SUCCESS_MESSAGE: &str = "Data analysis complete!";

/// Tagged outcome of a query.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response<T> {
    /// The query produced a payload.
    Success(T),
    /// The query failed.
    Error(ErrorBody),
}

/// Body of a failed query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub error: String,
}

impl<T> Response<T> {
    /// Wrap a typed result.
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(payload) => Response::Success(payload),
            Err(e) => Response::Error(ErrorBody {
                error: e.to_string(),
            }),
        }
    }

    /// Whether the query succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    /// The payload, if any.
    pub fn success(self) -> Option<T> {
        match self {
            Response::Success(payload) => Some(payload),
            Response::Error(_) => None,
        }
    }

    /// The error message, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Response::Success(_) => None,
            Response::Error(body) => Some(&body.error),
        }
    }
}

/// One selectable cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleEntry {
    /// Cycle directory name, usable as a selector.
    pub id: String,
    /// Start time, `YYYY-MM-DD HH:MM:SS`.
    pub text: String,
}

impl From<&ForecastCycle> for CycleEntry {
    fn from(cycle: &ForecastCycle) -> Self {
        Self {
            id: cycle.token.clone(),
            text: cycle.display_text(),
        }
    }
}

/// Cycles available for a reach, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct CycleListing {
    /// Success message.
    pub success: String,
    /// Available cycles.
    pub output_directories: Vec<CycleEntry>,
}

/// Hydrograph series for one reach and cycle.
#[derive(Debug, Clone, Serialize)]
pub struct Hydrograph {
    /// Success message.
    pub success: String,
    /// Ensemble maximum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<TimeSeries>,
    /// Ensemble minimum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<TimeSeries>,
    /// Ensemble mean.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<TimeSeries>,
    /// Mean plus one standard deviation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_plus_std: Option<TimeSeries>,
    /// Mean minus one standard deviation, floored at zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_minus_std: Option<TimeSeries>,
    /// Deterministic high-resolution run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_res: Option<TimeSeries>,
    /// Auxiliary nowcast in ensemble units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hrrr_data: Option<TimeSeries>,
    /// Cycle the series came from.
    #[serde(skip)]
    pub cycle: Option<ForecastCycle>,
    /// Resolved reach index, reusable as the next query's guess.
    #[serde(skip)]
    pub reach_index: usize,
    /// Member files left out of the aggregate.
    #[serde(skip)]
    pub skipped: Vec<SkippedMember>,
}

impl Hydrograph {
    /// Number of named series present.
    pub fn series_count(&self) -> usize {
        [
            &self.max,
            &self.min,
            &self.mean,
            &self.mean_plus_std,
            &self.mean_minus_std,
            &self.high_res,
            &self.hrrr_data,
        ]
        .iter()
        .filter(|s| s.is_some())
        .count()
    }
}

/// List the cycles with data for a reach, as a tagged response.
pub fn list_available_cycles(
    output_root: &Path,
    watershed_name: &str,
    subbasin_name: &str,
    reach_id: &str,
    options: &EnumerateOptions,
    config: &ProductConfig,
) -> Response<CycleListing> {
    Response::from_result(find_cycles(
        output_root,
        watershed_name,
        subbasin_name,
        reach_id,
        options,
        config,
    ))
}

/// Build a reach's hydrograph for one cycle, as a tagged response.
pub fn get_hydrograph(
    output_root: &Path,
    watershed_name: &str,
    subbasin_name: &str,
    reach_id: &str,
    cycle_selector: &str,
    reach_index_guess: Option<usize>,
    config: &ProductConfig,
) -> Response<Hydrograph> {
    Response::from_result(build_hydrograph(
        output_root,
        watershed_name,
        subbasin_name,
        reach_id,
        cycle_selector,
        reach_index_guess,
        config,
    ))
}

/// List the cycles with data for a reach.
pub fn find_cycles(
    output_root: &Path,
    watershed_name: &str,
    subbasin_name: &str,
    reach_id: &str,
    options: &EnumerateOptions,
    config: &ProductConfig,
) -> Result<CycleListing> {
    if options.max_results == 0 {
        return Err(FlowcastError::invalid_input("max results must be positive"));
    }
    let target = Target::resolve(output_root, watershed_name, subbasin_name, reach_id)?;

    let cycles = enumerate_cycles(
        &target.watershed_dir,
        &target.subbasin,
        target.reach_id,
        options,
        config,
    )?;
    info!(
        watershed = %target.watershed,
        subbasin = %target.subbasin,
        count = cycles.len(),
        "Listed forecast cycles"
    );

    Ok(CycleListing {
        success: SUCCESS_MESSAGE.to_string(),
        output_directories: cycles.iter().map(CycleEntry::from).collect(),
    })
}

/// Build a reach's hydrograph for one cycle.
pub fn build_hydrograph(
    output_root: &Path,
    watershed_name: &str,
    subbasin_name: &str,
    reach_id: &str,
    cycle_selector: &str,
    reach_index_guess: Option<usize>,
    config: &ProductConfig,
) -> Result<Hydrograph> {
    let selector = cycle_selector.trim();
    if selector.is_empty() {
        return Err(FlowcastError::invalid_input("cycle selector missing"));
    }
    let target = Target::resolve(output_root, watershed_name, subbasin_name, reach_id)?;

    let found = locate(&target.watershed_dir, &target.subbasin, selector, config).map_err(
        |e| match e {
            FlowcastError::NotFound(_) => target.forecast_not_found(),
            other => other,
        },
    )?;

    let reach_index =
        resolve_in_files(&found.files, target.reach_id, reach_index_guess, config)?;
    let series = aggregate(&found.files, reach_index, found.cycle.start_time, config)?;

    info!(
        cycle = %found.cycle,
        reach_id = target.reach_id,
        reach_index,
        skipped = series.skipped.len(),
        "Built hydrograph"
    );

    let ensemble = series.ensemble;
    Ok(Hydrograph {
        success: SUCCESS_MESSAGE.to_string(),
        max: ensemble.as_ref().map(|e| e.max.clone()),
        min: ensemble.as_ref().map(|e| e.min.clone()),
        mean: ensemble.as_ref().map(|e| e.mean.clone()),
        mean_plus_std: ensemble.as_ref().map(|e| e.mean_plus_spread.clone()),
        mean_minus_std: ensemble.map(|e| e.mean_minus_spread),
        high_res: series.high_res,
        hrrr_data: series.auxiliary,
        cycle: Some(found.cycle),
        reach_index,
        skipped: series.skipped,
    })
}

/// Validated query target.
#[derive(Debug)]
struct Target {
    watershed: String,
    subbasin: String,
    reach_id: i64,
    watershed_dir: PathBuf,
}

impl Target {
    fn resolve(
        output_root: &Path,
        watershed_name: &str,
        subbasin_name: &str,
        reach_id: &str,
    ) -> Result<Self> {
        let watershed = format_name(watershed_name);
        if watershed.is_empty() {
            return Err(FlowcastError::invalid_input("watershed name missing"));
        }
        let subbasin = format_name(subbasin_name);
        if subbasin.is_empty() {
            return Err(FlowcastError::invalid_input("subbasin name missing"));
        }
        let reach_id = reach_id.trim().parse::<i64>().map_err(|_| {
            FlowcastError::invalid_input(format!("reach id '{}' is not an integer", reach_id))
        })?;

        if !output_root.is_dir() {
            return Err(FlowcastError::io(
                output_root,
                io::Error::new(
                    io::ErrorKind::NotFound,
                    "location of forecast output files faulty, please check settings",
                ),
            ));
        }

        let target = Self {
            watershed_dir: output_root.join(&watershed),
            watershed,
            subbasin,
            reach_id,
        };
        if !target.watershed_dir.is_dir() {
            return Err(target.forecast_not_found());
        }

        Ok(target)
    }

    fn forecast_not_found(&self) -> FlowcastError {
        FlowcastError::not_found(format!(
            "Forecast for {} ({}) not found.",
            self.watershed, self.subbasin
        ))
    }
}
